//! Element mapper: shape trees to model elements.
//!
//! [`ElementMapper::map`] walks a `p:spTree` and produces [`Element`]s in
//! document order. Each element is mapped independently; one that fails is
//! reported and left out while the rest of the tree continues.
//!
//! Coordinates inside groups are expressed in the group's child space
//! (`chOff`/`chExt`). The mapper composes those transforms so every element,
//! group children included, carries absolute slide geometry.

use super::geometry::{is_line_preset, shape_type_for_preset};
use super::style::{
    parse_arrow_head, parse_fill, parse_stroke, style_fill, style_stroke, PartContext,
};
use super::text::TextParser;
use crate::error::{Error, Result};
use crate::model::{
    Crop, Element, ElementKind, Fill, GroupElement, ImageAdjustments, ImageElement, LineElement,
    Point, ShapeElement, ShapeType, Stroke, TextBody, TextElement, Theme,
};
use crate::settings::ImportSettings;
use crate::units::{angle_to_degrees, percent_fraction, percent_signed, EMU_PER_PIXEL};
use crate::xml::XmlElement;
use std::collections::HashMap;
use std::fmt;

/// Which element kinds the mapper emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapperOptions {
    /// Shapes and lines
    pub shapes: bool,
    /// Text boxes and text inside shapes
    pub text: bool,
    pub images: bool,
}

impl Default for MapperOptions {
    fn default() -> Self {
        Self {
            shapes: true,
            text: true,
            images: true,
        }
    }
}

impl From<&ImportSettings> for MapperOptions {
    fn from(settings: &ImportSettings) -> Self {
        Self {
            shapes: settings.import_shapes,
            text: settings.import_text,
            images: settings.import_images,
        }
    }
}

/// Kind of part whose shape tree is being mapped, for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartKind {
    Slide,
    Layout,
    Master,
}

impl PartKind {
    pub fn label(&self) -> &'static str {
        match self {
            PartKind::Slide => "slide",
            PartKind::Layout => "layout",
            PartKind::Master => "master",
        }
    }
}

/// A single element that could not be mapped.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementError {
    /// Part label, e.g. "slide 3"
    pub part: String,
    pub element_id: Option<String>,
    pub element_name: Option<String>,
    pub message: String,
}

impl fmt::Display for ElementError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: element '{}' (id {}) skipped: {}",
            self.part,
            self.element_name.as_deref().unwrap_or(""),
            self.element_id.as_deref().unwrap_or("?"),
            self.message
        )
    }
}

/// Result of mapping one shape tree.
#[derive(Debug, Clone, Default)]
pub struct MapOutput {
    pub elements: Vec<Element>,
    /// Human-readable warnings, including one per entry in `errors`
    pub warnings: Vec<String>,
    pub errors: Vec<ElementError>,
}

/// Rectangle in slide EMU.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmuRect {
    pub x: i64,
    pub y: i64,
    pub cx: i64,
    pub cy: i64,
}

/// Placeholder geometry declared by layouts and masters.
///
/// Slide placeholders routinely omit `a:xfrm` and inherit position from the
/// matching layout placeholder (by `idx`, then by type), which in turn may
/// inherit from the master.
#[derive(Debug, Clone, Default)]
pub struct PlaceholderFrames {
    by_idx: HashMap<u32, EmuRect>,
    by_type: HashMap<String, EmuRect>,
}

impl PlaceholderFrames {
    /// Collect placeholder frames from a layout or master shape tree.
    pub fn collect(sp_tree: &XmlElement) -> Self {
        let mut frames = Self::default();
        for node in sp_tree.elements() {
            let Some((ph_type, idx)) = placeholder_key(node) else {
                continue;
            };
            let Some(xfrm) = node.child("spPr").and_then(|p| p.child("xfrm")) else {
                continue;
            };
            let Ok(xfrm) = Xfrm::parse(xfrm) else {
                continue;
            };
            let rect = EmuRect {
                x: xfrm.x,
                y: xfrm.y,
                cx: xfrm.cx,
                cy: xfrm.cy,
            };
            if let Some(idx) = idx {
                frames.by_idx.entry(idx).or_insert(rect);
            }
            frames.by_type.entry(ph_type).or_insert(rect);
        }
        frames
    }

    /// Fill gaps from a lower-priority source (a master under a layout).
    pub fn merge_fallback(&mut self, other: &PlaceholderFrames) {
        for (k, v) in &other.by_idx {
            self.by_idx.entry(*k).or_insert(*v);
        }
        for (k, v) in &other.by_type {
            self.by_type.entry(k.clone()).or_insert(*v);
        }
    }

    /// Frame for a placeholder with the given type and index.
    pub fn lookup(&self, ph_type: &str, idx: Option<u32>) -> Option<EmuRect> {
        if let Some(rect) = idx.and_then(|i| self.by_idx.get(&i)) {
            return Some(*rect);
        }
        self.by_type.get(ph_type).copied().or_else(|| match ph_type {
            "ctrTitle" => self.by_type.get("title").copied(),
            "subTitle" => self.by_type.get("body").copied(),
            _ => None,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.by_idx.is_empty() && self.by_type.is_empty()
    }
}

fn placeholder_key(node: &XmlElement) -> Option<(String, Option<u32>)> {
    let nv = non_visual(node)?;
    let ph = nv.child("nvPr")?.child("ph")?;
    let ph_type = ph.attr("type").unwrap_or("body").to_string();
    let idx = ph.attr("idx").and_then(|v| v.parse::<u32>().ok());
    Some((ph_type, idx))
}

fn non_visual(node: &XmlElement) -> Option<&XmlElement> {
    node.elements().find(|e| e.local_name().starts_with("nv"))
}

/// An `a:xfrm` in its parent's coordinate space.
#[derive(Debug, Clone, Copy, Default)]
struct Xfrm {
    x: i64,
    y: i64,
    cx: i64,
    cy: i64,
    rot: i64,
    flip_h: bool,
    flip_v: bool,
    child_x: i64,
    child_y: i64,
    child_cx: i64,
    child_cy: i64,
}

impl Xfrm {
    fn parse(xfrm: &XmlElement) -> Result<Self> {
        let pair = |name: &str, a: &str, b: &str| -> Result<(i64, i64)> {
            match xfrm.child(name) {
                Some(node) => Ok((node.attr_i64(a)?.unwrap_or(0), node.attr_i64(b)?.unwrap_or(0))),
                None => Ok((0, 0)),
            }
        };
        let (x, y) = pair("off", "x", "y")?;
        let (cx, cy) = pair("ext", "cx", "cy")?;
        let (child_x, child_y) = pair("chOff", "x", "y")?;
        let (child_cx, child_cy) = pair("chExt", "cx", "cy")?;
        Ok(Self {
            x,
            y,
            cx: cx.max(0),
            cy: cy.max(0),
            rot: xfrm.attr_i64("rot")?.unwrap_or(0),
            flip_h: xfrm.attr_bool("flipH")?.unwrap_or(false),
            flip_v: xfrm.attr_bool("flipV")?.unwrap_or(false),
            child_x,
            child_y,
            child_cx,
            child_cy,
        })
    }
}

/// Affine map from a child coordinate space to slide EMU.
///
/// `x' = a*x + c*y + tx`, `y' = b*x + d*y + ty`. Extent scales, rotation and
/// flips are tracked separately so element frames can be rebuilt around
/// their mapped centers.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Frame {
    a: f64,
    b: f64,
    c: f64,
    d: f64,
    tx: f64,
    ty: f64,
    sx: f64,
    sy: f64,
    rotation: f64,
    flip_h: bool,
    flip_v: bool,
}

impl Frame {
    const IDENTITY: Frame = Frame {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        tx: 0.0,
        ty: 0.0,
        sx: 1.0,
        sy: 1.0,
        rotation: 0.0,
        flip_h: false,
        flip_v: false,
    };

    fn point(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.a * x + self.c * y + self.tx,
            self.b * x + self.d * y + self.ty,
        )
    }

    /// `self` applied after `inner`.
    fn compose(&self, inner: &Frame) -> Frame {
        Frame {
            a: self.a * inner.a + self.c * inner.b,
            b: self.b * inner.a + self.d * inner.b,
            c: self.a * inner.c + self.c * inner.d,
            d: self.b * inner.c + self.d * inner.d,
            tx: self.a * inner.tx + self.c * inner.ty + self.tx,
            ty: self.b * inner.tx + self.d * inner.ty + self.ty,
            ..*self
        }
    }

    /// Whether the frame mirrors its content, which reverses rotation.
    fn mirrored(&self) -> bool {
        self.flip_h != self.flip_v
    }

    /// Rotation of an element in this frame, in degrees.
    fn rotate(&self, degrees: f64) -> f64 {
        let local = if self.mirrored() { -degrees } else { degrees };
        (self.rotation + local).rem_euclid(360.0)
    }

    /// Frame of a group's children, given the group's transform.
    ///
    /// Children are scaled from `chOff`/`chExt` into `off`/`ext`, then
    /// flipped and rotated about the group's center.
    fn enter_group(&self, group: &Xfrm) -> Frame {
        let ratio = |ext: i64, ch: i64| if ch == 0 { 1.0 } else { ext as f64 / ch as f64 };
        let gsx = ratio(group.cx, group.child_cx);
        let gsy = ratio(group.cy, group.child_cy);
        let place = Frame {
            a: gsx,
            d: gsy,
            tx: group.x as f64 - group.child_x as f64 * gsx,
            ty: group.y as f64 - group.child_y as f64 * gsy,
            ..Frame::IDENTITY
        };

        let cx = group.x as f64 + group.cx as f64 / 2.0;
        let cy = group.y as f64 + group.cy as f64 / 2.0;
        let fx = if group.flip_h { -1.0 } else { 1.0 };
        let fy = if group.flip_v { -1.0 } else { 1.0 };
        let theta = angle_to_degrees(group.rot).to_radians();
        let (sin, cos) = if group.rot == 0 { (0.0, 1.0) } else { theta.sin_cos() };
        // T(center) * R * F * T(-center)
        let a = cos * fx;
        let b = sin * fx;
        let c = -sin * fy;
        let d = cos * fy;
        let orient = Frame {
            a,
            b,
            c,
            d,
            tx: cx - a * cx - c * cy,
            ty: cy - b * cx - d * cy,
            ..Frame::IDENTITY
        };

        let local = orient.compose(&place);
        let mut frame = self.compose(&local);
        frame.sx = self.sx * gsx;
        frame.sy = self.sy * gsy;
        frame.rotation = self.rotate(angle_to_degrees(group.rot));
        frame.flip_h = self.flip_h != group.flip_h;
        frame.flip_v = self.flip_v != group.flip_v;
        frame
    }
}

/// Geometry in target pixels.
#[derive(Debug, Clone, Copy, Default)]
struct Placement {
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    rotation: f64,
    flip_h: bool,
    flip_v: bool,
}

/// Non-visual properties shared by every element kind.
#[derive(Debug, Clone, Default)]
struct Common {
    id: String,
    name: String,
    description: Option<String>,
    hidden: bool,
    locked: bool,
    placeholder: Option<(String, Option<u32>)>,
}

/// Shape tree children that become elements (or element warnings).
const ELEMENT_TAGS: [&str; 6] = ["sp", "cxnSp", "grpSp", "pic", "graphicFrame", "contentPart"];

/// Maps shape trees of one part into elements.
pub struct ElementMapper<'a> {
    options: MapperOptions,
    ctx: PartContext<'a>,
    kind: PartKind,
    placeholders: Option<&'a PlaceholderFrames>,
}

/// Per-call state of one [`ElementMapper::map`] run.
struct Pass<'p> {
    label: String,
    id_prefix: &'p str,
    out: MapOutput,
    next_anonymous: usize,
}

impl<'a> ElementMapper<'a> {
    pub fn new(options: MapperOptions, ctx: PartContext<'a>) -> Self {
        Self {
            options,
            ctx,
            kind: PartKind::Slide,
            placeholders: None,
        }
    }

    /// Set the part kind used in diagnostics.
    pub fn with_kind(mut self, kind: PartKind) -> Self {
        self.kind = kind;
        self
    }

    /// Provide inherited placeholder geometry.
    pub fn with_placeholders(mut self, frames: &'a PlaceholderFrames) -> Self {
        self.placeholders = Some(frames);
        self
    }

    /// Map a shape tree.
    ///
    /// `slide_index` is 0-based; `slide_id` prefixes element ids so they are
    /// unique across the presentation.
    pub fn map(&self, sp_tree: &XmlElement, slide_index: usize, slide_id: &str) -> MapOutput {
        let mut pass = Pass {
            label: format!("{} {}", self.kind.label(), slide_index + 1),
            id_prefix: slide_id,
            out: MapOutput::default(),
            next_anonymous: 0,
        };
        let elements = self.map_children(sp_tree, Frame::IDENTITY, None, &mut pass);
        pass.out.elements = elements;
        log::debug!(
            "{}: mapped {} elements, {} skipped",
            pass.label,
            pass.out.elements.len(),
            pass.out.errors.len()
        );
        pass.out
    }

    fn map_children(
        &self,
        parent: &XmlElement,
        frame: Frame,
        group_fill: Option<&Fill>,
        pass: &mut Pass<'_>,
    ) -> Vec<Element> {
        let mut elements = Vec::new();
        for node in parent.elements() {
            if node.is("AlternateContent") {
                // Prefer the Fallback branch; it uses the baseline schema
                let branch = node.child("Fallback").or_else(|| node.child("Choice"));
                if let Some(branch) = branch {
                    elements.extend(self.map_children(branch, frame, group_fill, pass));
                }
                continue;
            }
            if !ELEMENT_TAGS.contains(&node.local_name()) {
                continue;
            }

            let common = self.common(node, pass);
            match self.map_node(node, &common, frame, group_fill, pass) {
                Ok(Some(element)) => elements.push(element),
                Ok(None) => {}
                Err(err) => {
                    let error = ElementError {
                        part: pass.label.clone(),
                        element_id: Some(common.id.clone()),
                        element_name: Some(common.name.clone()),
                        message: err.to_string(),
                    };
                    log::warn!("{}", error);
                    pass.out.warnings.push(error.to_string());
                    pass.out.errors.push(error);
                }
            }
        }
        elements
    }

    fn map_node(
        &self,
        node: &XmlElement,
        common: &Common,
        frame: Frame,
        group_fill: Option<&Fill>,
        pass: &mut Pass<'_>,
    ) -> Result<Option<Element>> {
        match node.local_name() {
            "sp" => self.map_shape(node, common, frame, group_fill),
            "cxnSp" => {
                if !self.options.shapes {
                    return Ok(None);
                }
                self.map_line(node, common, frame, true).map(Some)
            }
            "grpSp" => self.map_group(node, common, frame, group_fill, pass),
            "pic" => {
                if !self.options.images {
                    return Ok(None);
                }
                self.map_picture(node, common, frame).map(Some)
            }
            "graphicFrame" => {
                self.unsupported(graphic_frame_kind(node), common, pass);
                Ok(None)
            }
            "contentPart" => {
                self.unsupported("ink content", common, pass);
                Ok(None)
            }
            _ => Ok(None),
        }
    }

    fn unsupported(&self, what: &str, common: &Common, pass: &mut Pass<'_>) {
        let warning = format!(
            "{}: unsupported {} '{}' skipped",
            pass.label, what, common.name
        );
        log::warn!("{}", warning);
        pass.out.warnings.push(warning);
    }

    fn common(&self, node: &XmlElement, pass: &mut Pass<'_>) -> Common {
        let nv = non_visual(node);
        let c_nv_pr = nv.and_then(|n| n.child("cNvPr"));

        let raw_id = c_nv_pr
            .and_then(|c| c.attr("id"))
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| {
                pass.next_anonymous += 1;
                format!("x{}", pass.next_anonymous)
            });

        let locked = nv.is_some_and(|n| {
            n.elements()
                .filter(|e| e.local_name().starts_with("cNv") && !e.is("cNvPr"))
                .flat_map(|e| e.elements())
                .filter(|l| l.local_name().ends_with("Locks"))
                .any(|l| l.flag("noMove") || l.flag("noResize") || l.flag("noSelect"))
        });

        Common {
            id: format!("{}:{}", pass.id_prefix, raw_id),
            name: c_nv_pr
                .and_then(|c| c.attr("name"))
                .unwrap_or_default()
                .to_string(),
            description: c_nv_pr
                .and_then(|c| c.attr("descr"))
                .filter(|d| !d.is_empty())
                .map(str::to_string),
            hidden: c_nv_pr.is_some_and(|c| c.flag("hidden")),
            locked,
            placeholder: placeholder_key(node),
        }
    }

    /// Resolve an element's geometry in target pixels.
    fn place(&self, xfrm: Option<&XmlElement>, common: &Common, frame: Frame) -> Result<Placement> {
        let (xfrm, frame) = match xfrm {
            Some(node) => (Xfrm::parse(node)?, frame),
            None => match self.inherited_frame(common) {
                // Layout geometry is already in slide space
                Some(rect) => (
                    Xfrm {
                        x: rect.x,
                        y: rect.y,
                        cx: rect.cx,
                        cy: rect.cy,
                        ..Default::default()
                    },
                    Frame::IDENTITY,
                ),
                None => (Xfrm::default(), frame),
            },
        };

        let width = xfrm.cx as f64 * frame.sx;
        let height = xfrm.cy as f64 * frame.sy;
        let (center_x, center_y) = frame.point(
            xfrm.x as f64 + xfrm.cx as f64 / 2.0,
            xfrm.y as f64 + xfrm.cy as f64 / 2.0,
        );
        let to_px = |emu: f64| emu / EMU_PER_PIXEL * self.ctx.scale;
        Ok(Placement {
            x: to_px(center_x - width / 2.0),
            y: to_px(center_y - height / 2.0),
            width: to_px(width),
            height: to_px(height),
            rotation: frame.rotate(angle_to_degrees(xfrm.rot)),
            flip_h: xfrm.flip_h != frame.flip_h,
            flip_v: xfrm.flip_v != frame.flip_v,
        })
    }

    fn inherited_frame(&self, common: &Common) -> Option<EmuRect> {
        let (ph_type, idx) = common.placeholder.as_ref()?;
        self.placeholders?.lookup(ph_type, *idx)
    }

    fn element(&self, common: &Common, placement: Placement, kind: ElementKind) -> Element {
        Element {
            id: common.id.clone(),
            name: common.name.clone(),
            x: placement.x,
            y: placement.y,
            width: placement.width,
            height: placement.height,
            rotation: placement.rotation,
            opacity: 1.0,
            hidden: common.hidden,
            locked: common.locked,
            flip_h: placement.flip_h,
            flip_v: placement.flip_v,
            placeholder: common.placeholder.as_ref().map(|(t, _)| t.clone()),
            kind,
        }
    }

    fn map_shape(
        &self,
        node: &XmlElement,
        common: &Common,
        frame: Frame,
        group_fill: Option<&Fill>,
    ) -> Result<Option<Element>> {
        let sp_pr = node.child("spPr");
        let preset = sp_pr
            .and_then(|p| p.child("prstGeom"))
            .and_then(|g| g.attr("prst"));

        if preset.is_some_and(is_line_preset) {
            if !self.options.shapes {
                return Ok(None);
            }
            return self.map_line(node, common, frame, false).map(Some);
        }

        let text = match node.child("txBody") {
            Some(tx) if self.options.text => Some(self.text_parser().parse_body(tx)?),
            _ => None,
        };

        let placement = self.place(sp_pr.and_then(|p| p.child("xfrm")), common, frame)?;
        let style = node.child("style");

        let fill = match sp_pr {
            Some(props) => parse_fill(props, &self.ctx, group_fill)?,
            None => None,
        };
        let stroke = match sp_pr.and_then(|p| p.child("ln")) {
            Some(ln) => parse_stroke(ln, &self.ctx)?,
            None => style_stroke(style, &self.ctx)?,
        };
        let fill = match fill {
            Some(fill) => fill,
            None => style_fill(style)?.unwrap_or_default(),
        };

        let is_text_box = node
            .path(&["nvSpPr", "cNvSpPr"])
            .is_some_and(|c| c.flag("txBox"));
        let has_custom_geometry = sp_pr.is_some_and(|p| p.has_child("custGeom"));
        let plain_frame = fill.is_none()
            && stroke.is_none()
            && !has_custom_geometry
            && preset.map_or(true, |p| p == "rect");
        let has_text = text.as_ref().is_some_and(|t| !t.is_empty());

        if is_text_box || (plain_frame && has_text) {
            if !self.options.text {
                return Ok(None);
            }
            let body = text.unwrap_or_default();
            return Ok(Some(self.element(
                common,
                placement,
                ElementKind::Text(TextElement { body }),
            )));
        }

        if !self.options.shapes {
            return Ok(None);
        }

        let shape_type = if has_custom_geometry {
            ShapeType::Freeform
        } else {
            preset.map(shape_type_for_preset).unwrap_or_default()
        };

        Ok(Some(self.element(
            common,
            placement,
            ElementKind::Shape(ShapeElement {
                shape_type,
                preset: preset.map(str::to_string),
                fill,
                stroke,
                text: text.filter(|t| !t.is_empty()),
            }),
        )))
    }

    fn map_line(
        &self,
        node: &XmlElement,
        common: &Common,
        frame: Frame,
        connector: bool,
    ) -> Result<Element> {
        let sp_pr = node.child("spPr");
        let placement = self.place(sp_pr.and_then(|p| p.child("xfrm")), common, frame)?;
        let ln = sp_pr.and_then(|p| p.child("ln"));

        let stroke = match (ln, node.child("style")) {
            (Some(ln), _) => parse_stroke(ln, &self.ctx)?,
            (None, Some(style)) => style_stroke(Some(style), &self.ctx)?,
            // Bare lines render as a thin black stroke
            (None, None) => Some(Stroke {
                width: self.ctx.scale,
                ..Default::default()
            }),
        };

        let (mut x1, mut x2) = (placement.x, placement.x + placement.width);
        let (mut y1, mut y2) = (placement.y, placement.y + placement.height);
        if placement.flip_h {
            std::mem::swap(&mut x1, &mut x2);
        }
        if placement.flip_v {
            std::mem::swap(&mut y1, &mut y2);
        }

        Ok(self.element(
            common,
            placement,
            ElementKind::Line(LineElement {
                start: Point::new(x1, y1),
                end: Point::new(x2, y2),
                stroke,
                head: parse_arrow_head(ln.and_then(|l| l.child("headEnd"))),
                tail: parse_arrow_head(ln.and_then(|l| l.child("tailEnd"))),
                connector,
            }),
        ))
    }

    fn map_group(
        &self,
        node: &XmlElement,
        common: &Common,
        frame: Frame,
        group_fill: Option<&Fill>,
        pass: &mut Pass<'_>,
    ) -> Result<Option<Element>> {
        let grp_pr = node.child("grpSpPr");
        let xfrm_node = grp_pr.and_then(|p| p.child("xfrm"));
        let xfrm = match xfrm_node {
            Some(x) => Xfrm::parse(x)?,
            None => Xfrm::default(),
        };
        let placement = self.place(xfrm_node, common, frame)?;
        let own_fill = match grp_pr {
            Some(props) => parse_fill(props, &self.ctx, group_fill)?,
            None => None,
        };
        let inherited = own_fill.as_ref().or(group_fill);

        let children = self.map_children(node, frame.enter_group(&xfrm), inherited, pass);
        if children.is_empty() {
            return Ok(None);
        }
        Ok(Some(self.element(
            common,
            placement,
            ElementKind::Group(GroupElement { children }),
        )))
    }

    fn map_picture(&self, node: &XmlElement, common: &Common, frame: Frame) -> Result<Element> {
        let blip_fill = node
            .child("blipFill")
            .ok_or_else(|| Error::InvalidStructure("picture without blipFill".into()))?;
        let blip = blip_fill
            .child("blip")
            .ok_or_else(|| Error::InvalidStructure("picture without blip".into()))?;
        let source = self.ctx.image_source(blip)?;

        let crop = match blip_fill.child("srcRect") {
            Some(rect) => {
                let edge = |name: &str| -> Result<f64> {
                    Ok(percent_fraction(rect.attr_percent(name)?.unwrap_or(0)))
                };
                let crop = Crop {
                    left: edge("l")?,
                    top: edge("t")?,
                    right: edge("r")?,
                    bottom: edge("b")?,
                };
                Some(crop).filter(|c| !c.is_empty())
            }
            None => None,
        };

        let mut adjustments = ImageAdjustments::default();
        let mut opacity = 1.0;
        for effect in blip.elements() {
            match effect.local_name() {
                "lum" => {
                    adjustments.brightness = percent_signed(effect.attr_percent("bright")?.unwrap_or(0));
                    adjustments.contrast = percent_signed(effect.attr_percent("contrast")?.unwrap_or(0));
                }
                "grayscl" => adjustments.saturation = 0.0,
                "hsl" => {
                    let sat = percent_signed(effect.attr_percent("sat")?.unwrap_or(0));
                    adjustments.saturation = (1.0 + sat).max(0.0);
                }
                "alphaModFix" => {
                    opacity = percent_fraction(effect.attr_percent("amt")?.unwrap_or(100_000));
                }
                _ => {}
            }
        }

        let placement = self.place(node.path(&["spPr", "xfrm"]), common, frame)?;
        let mut element = self.element(
            common,
            placement,
            ElementKind::Image(ImageElement {
                source,
                crop,
                adjustments: Some(adjustments).filter(|a| *a != ImageAdjustments::default()),
                description: common.description.clone(),
            }),
        );
        element.opacity = opacity;
        Ok(element)
    }

    fn text_parser(&self) -> TextParser<'_> {
        TextParser::new(self.ctx.rels, self.ctx.scale)
    }
}

fn graphic_frame_kind(node: &XmlElement) -> &'static str {
    let uri = node
        .path(&["graphic", "graphicData"])
        .and_then(|d| d.attr("uri"))
        .unwrap_or_default();
    if uri.ends_with("/table") {
        "table"
    } else if uri.contains("chart") {
        "chart"
    } else if uri.contains("diagram") {
        "SmartArt diagram"
    } else if uri.contains("ole") {
        "OLE object"
    } else {
        "graphic frame"
    }
}

/// Replace theme references in elements with the theme's concrete values.
///
/// Scheme colors become RGB (modifiers kept) and `+mj-*` / `+mn-*` font
/// references become typefaces. Recurses into groups.
pub fn apply_theme(elements: &mut [Element], theme: &Theme) {
    for element in elements.iter_mut() {
        element.walk_mut(&mut |e| apply_theme_to_element(e, theme));
    }
}

fn apply_theme_to_element(element: &mut Element, theme: &Theme) {
    let scheme = &theme.color_scheme;
    match &mut element.kind {
        ElementKind::Text(t) => apply_theme_to_text(&mut t.body, theme),
        ElementKind::Shape(s) => {
            apply_theme_to_fill(&mut s.fill, theme);
            if let Some(stroke) = &mut s.stroke {
                stroke.color.substitute_scheme(scheme);
            }
            if let Some(body) = &mut s.text {
                apply_theme_to_text(body, theme);
            }
        }
        ElementKind::Line(l) => {
            if let Some(stroke) = &mut l.stroke {
                stroke.color.substitute_scheme(scheme);
            }
        }
        ElementKind::Image(_) | ElementKind::Group(_) => {}
    }
}

/// Substitute scheme colors in a fill.
pub fn apply_theme_to_fill(fill: &mut Fill, theme: &Theme) {
    for color in fill.colors_mut() {
        color.substitute_scheme(&theme.color_scheme);
    }
}

fn apply_theme_to_text(body: &mut TextBody, theme: &Theme) {
    let fonts = &theme.font_scheme;
    let resolve = |font: &mut Option<String>| {
        let Some(current) = font.as_deref() else {
            return;
        };
        if let Some(resolved) = fonts.resolve_reference(current) {
            // Empty script typefaces mean "same as Latin"
            let resolved = if resolved.is_empty() {
                let group = if current.starts_with("+mj") {
                    &fonts.major
                } else {
                    &fonts.minor
                };
                group.latin.typeface.as_str()
            } else {
                resolved
            };
            *font = Some(resolved.to_string());
        }
    };

    for para in &mut body.paragraphs {
        for run in &mut para.runs {
            resolve(&mut run.style.font_family);
            resolve(&mut run.style.east_asian_font);
            resolve(&mut run.style.complex_script_font);
            if let Some(color) = &mut run.style.color {
                color.substitute_scheme(&theme.color_scheme);
            }
        }
    }
}
