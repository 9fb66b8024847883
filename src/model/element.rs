//! Slide element model: shapes, text boxes, pictures, groups and lines.

use super::TextBody;
use crate::color::ColorInfo;
use serde::{Deserialize, Serialize};

/// A point in slide pixel space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Direction of a block arrow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ArrowDirection {
    Right,
    Left,
    Up,
    Down,
    LeftRight,
    UpDown,
    Quad,
    Bent,
    UTurn,
    Curved,
    Circular,
}

/// Geometry of a shape, from its preset name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ShapeType {
    Rectangle,
    RoundedRectangle,
    SnippedRectangle,
    Ellipse,
    Triangle,
    RightTriangle,
    Diamond,
    Parallelogram,
    Trapezoid,
    /// Regular polygon with the given number of sides
    Polygon { sides: u8 },
    Line,
    Arrow { direction: ArrowDirection },
    Chevron,
    HomePlate,
    Star { points: u8 },
    /// Custom geometry (`a:custGeom`)
    Freeform,
    Heart,
    Cloud,
    Moon,
    Sun,
    SmileyFace,
    LightningBolt,
    Donut,
    NoSymbol,
    Plus,
    Cube,
    Can,
    Frame,
    Plaque,
    Bevel,
    FoldedCorner,
    Teardrop,
    Arc,
    Pie,
    Chord,
    BlockArc,
    Wave,
    DoubleWave,
    Ribbon,
    Callout,
    Bracket,
    Brace,
    Flowchart,
    ActionButton,
}

impl Default for ShapeType {
    fn default() -> Self {
        ShapeType::Rectangle
    }
}

/// Gradient geometry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum GradientKind {
    /// Linear gradient at `angle` degrees clockwise from left-to-right
    Linear { angle: f64 },
    Radial,
    Rectangular,
    Path,
}

/// A gradient stop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientStop {
    /// Position from 0.0 to 1.0
    pub position: f64,
    pub color: ColorInfo,
}

/// Gradient fill parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientFill {
    pub kind: GradientKind,
    pub stops: Vec<GradientStop>,
}

/// Fill of a shape or background.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Fill {
    #[default]
    None,
    Solid { color: ColorInfo },
    Gradient(GradientFill),
    Image {
        source: ImageSource,
        /// Tiled rather than stretched
        tile: bool,
    },
}

impl Fill {
    pub fn is_none(&self) -> bool {
        matches!(self, Fill::None)
    }

    /// Colors referenced by this fill.
    pub fn colors_mut(&mut self) -> Vec<&mut ColorInfo> {
        match self {
            Fill::Solid { color } => vec![color],
            Fill::Gradient(g) => g.stops.iter_mut().map(|s| &mut s.color).collect(),
            Fill::None | Fill::Image { .. } => Vec::new(),
        }
    }
}

/// Dash pattern of a stroke.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DashType {
    #[default]
    Solid,
    Dot,
    Dash,
    DashDot,
    LongDash,
    LongDashDot,
    LongDashDotDot,
    SysDot,
    SysDash,
    SysDashDot,
    SysDashDotDot,
}

impl DashType {
    /// Map a DrawingML `prstDash@val`.
    pub fn from_ooxml(value: &str) -> Self {
        match value {
            "dot" => DashType::Dot,
            "dash" => DashType::Dash,
            "dashDot" => DashType::DashDot,
            "lgDash" => DashType::LongDash,
            "lgDashDot" => DashType::LongDashDot,
            "lgDashDotDot" => DashType::LongDashDotDot,
            "sysDot" => DashType::SysDot,
            "sysDash" => DashType::SysDash,
            "sysDashDot" => DashType::SysDashDot,
            "sysDashDotDot" => DashType::SysDashDotDot,
            _ => DashType::Solid,
        }
    }
}

/// Line end cap.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineCap {
    #[default]
    Flat,
    Round,
    Square,
}

impl LineCap {
    /// Map a DrawingML `ln@cap`.
    pub fn from_ooxml(value: &str) -> Self {
        match value {
            "rnd" => LineCap::Round,
            "sq" => LineCap::Square,
            _ => LineCap::Flat,
        }
    }
}

/// Line join.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineJoin {
    #[default]
    Round,
    Bevel,
    Miter,
}

/// Stroke (outline) of a shape or line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub dash: DashType,
    pub color: ColorInfo,
    /// Width in pixels
    pub width: f64,
    pub cap: LineCap,
    pub join: LineJoin,
}

impl Default for Stroke {
    /// A 0.75pt solid black line (DrawingML's implied width).
    fn default() -> Self {
        Self {
            dash: DashType::Solid,
            color: ColorInfo::default(),
            width: 1.0,
            cap: LineCap::Flat,
            join: LineJoin::Round,
        }
    }
}

/// Shape of an arrowhead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArrowType {
    Triangle,
    Stealth,
    Diamond,
    Oval,
    Arrow,
}

impl ArrowType {
    /// Map a DrawingML `headEnd@type`; `none` and unknown values yield `None`.
    pub fn from_ooxml(value: &str) -> Option<Self> {
        match value {
            "triangle" => Some(ArrowType::Triangle),
            "stealth" => Some(ArrowType::Stealth),
            "diamond" => Some(ArrowType::Diamond),
            "oval" => Some(ArrowType::Oval),
            "arrow" => Some(ArrowType::Arrow),
            _ => None,
        }
    }
}

/// Relative size of an arrowhead.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArrowSize {
    Small,
    #[default]
    Medium,
    Large,
}

impl ArrowSize {
    pub fn from_ooxml(value: &str) -> Self {
        match value {
            "sm" => ArrowSize::Small,
            "lg" => ArrowSize::Large,
            _ => ArrowSize::Medium,
        }
    }
}

/// An arrowhead at one end of a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArrowHead {
    pub kind: ArrowType,
    pub width: ArrowSize,
    pub length: ArrowSize,
}

/// Where an image's bytes come from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageSource {
    /// Relationship id in the owning part (`r:embed` or `r:link`)
    pub rel_id: String,
    /// Canonical media id, when the target is a package media part
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_id: Option<String>,
    /// Resolved package path of the target
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Target URL for externally linked images
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_url: Option<String>,
}

/// Fractions cropped from each edge of an image.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Crop {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Crop {
    pub fn is_empty(&self) -> bool {
        self.left == 0.0 && self.top == 0.0 && self.right == 0.0 && self.bottom == 0.0
    }
}

/// Color adjustments applied to an image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImageAdjustments {
    /// -1.0 (black) to 1.0 (white), 0.0 unchanged
    pub brightness: f64,
    /// -1.0 to 1.0, 0.0 unchanged
    pub contrast: f64,
    /// Saturation multiplier, 1.0 unchanged, 0.0 grayscale
    pub saturation: f64,
}

impl Default for ImageAdjustments {
    fn default() -> Self {
        Self {
            brightness: 0.0,
            contrast: 0.0,
            saturation: 1.0,
        }
    }
}

/// Payload of a text box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextElement {
    pub body: TextBody,
}

/// Payload of a geometric shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeElement {
    pub shape_type: ShapeType,
    /// Preset name as written in the part, for renderers with richer
    /// geometry support
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preset: Option<String>,
    pub fill: Fill,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke: Option<Stroke>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<TextBody>,
}

/// Payload of a picture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageElement {
    pub source: ImageSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crop: Option<Crop>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adjustments: Option<ImageAdjustments>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Payload of a group.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupElement {
    pub children: Vec<Element>,
}

/// Payload of a straight line or connector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineElement {
    pub start: Point,
    pub end: Point,
    /// `None` when the outline is explicitly unfilled
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke: Option<Stroke>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub head: Option<ArrowHead>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tail: Option<ArrowHead>,
    /// Whether the line came from a connector (`p:cxnSp`)
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub connector: bool,
}

/// Variant payload of an element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ElementKind {
    Text(TextElement),
    Shape(ShapeElement),
    Image(ImageElement),
    Group(GroupElement),
    Line(LineElement),
}

/// A positioned element on a slide.
///
/// Geometry is in slide pixels with the import scale already applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Clockwise rotation in degrees
    #[serde(default)]
    pub rotation: f64,
    /// 0.0 (transparent) to 1.0 (opaque)
    pub opacity: f64,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub locked: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub flip_h: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub flip_v: bool,
    /// Placeholder type (e.g., "title", "body") when the element is a
    /// layout placeholder
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(flatten)]
    pub kind: ElementKind,
}

impl Element {
    /// Short name of the element variant.
    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            ElementKind::Text(_) => "text",
            ElementKind::Shape(_) => "shape",
            ElementKind::Image(_) => "image",
            ElementKind::Group(_) => "group",
            ElementKind::Line(_) => "line",
        }
    }

    /// Child elements of a group; empty for other variants.
    pub fn children(&self) -> &[Element] {
        match &self.kind {
            ElementKind::Group(g) => &g.children,
            _ => &[],
        }
    }

    /// Number of elements in this subtree, including this one.
    pub fn count(&self) -> usize {
        1 + self.children().iter().map(Element::count).sum::<usize>()
    }

    /// Visit this element and every descendant, depth first.
    pub fn walk_mut(&mut self, f: &mut impl FnMut(&mut Element)) {
        f(self);
        if let ElementKind::Group(g) = &mut self.kind {
            for child in &mut g.children {
                child.walk_mut(f);
            }
        }
    }

    /// Text body carried by this element, if any.
    pub fn text_body(&self) -> Option<&TextBody> {
        match &self.kind {
            ElementKind::Text(t) => Some(&t.body),
            ElementKind::Shape(s) => s.text.as_ref(),
            _ => None,
        }
    }

    /// Plain text of this element and its descendants.
    pub fn plain_text(&self) -> String {
        let mut parts = Vec::new();
        if let Some(body) = self.text_body() {
            if !body.is_empty() {
                parts.push(body.plain_text());
            }
        }
        for child in self.children() {
            let text = child.plain_text();
            if !text.is_empty() {
                parts.push(text);
            }
        }
        parts.join("\n")
    }
}
