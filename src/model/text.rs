//! Text body, paragraph and run models.

use crate::color::ColorInfo;
use serde::{Deserialize, Serialize};

/// Horizontal alignment of a paragraph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlignment {
    #[default]
    Left,
    Center,
    Right,
    Justify,
    Distributed,
}

impl TextAlignment {
    /// Map a DrawingML `algn` value.
    pub fn from_ooxml(value: &str) -> Self {
        match value {
            "ctr" => TextAlignment::Center,
            "r" => TextAlignment::Right,
            "just" | "justLow" => TextAlignment::Justify,
            "dist" | "thaiDist" => TextAlignment::Distributed,
            _ => TextAlignment::Left,
        }
    }
}

/// Vertical anchoring of text inside its box.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerticalAlign {
    #[default]
    Top,
    Middle,
    Bottom,
}

impl VerticalAlign {
    /// Map a DrawingML `anchor` value.
    pub fn from_ooxml(value: &str) -> Self {
        match value {
            "ctr" => VerticalAlign::Middle,
            "b" => VerticalAlign::Bottom,
            _ => VerticalAlign::Top,
        }
    }
}

/// How text is fitted to its box.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum Autofit {
    #[default]
    None,
    /// Shrink text on overflow; `font_scale` is the producer's last scale
    Normal { font_scale: f64 },
    /// Resize the shape to fit the text
    Shape,
}

/// Inner margins of a text box, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Insets {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Default for Insets {
    /// DrawingML defaults: 0.1" left/right, 0.05" top/bottom.
    fn default() -> Self {
        Self {
            left: 9.6,
            top: 4.8,
            right: 9.6,
            bottom: 4.8,
        }
    }
}

/// Font weight.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    #[default]
    Normal,
    Bold,
}

/// Font style.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
}

/// Vertical baseline shift of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Baseline {
    #[default]
    Normal,
    Superscript,
    Subscript,
}

/// Run-level text style.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunStyle {
    /// Latin font family (may be a theme reference like `+mn-lt` until the
    /// theme pass runs)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,

    /// East Asian font family
    #[serde(skip_serializing_if = "Option::is_none")]
    pub east_asian_font: Option<String>,

    /// Complex script font family
    #[serde(skip_serializing_if = "Option::is_none")]
    pub complex_script_font: Option<String>,

    /// Font size in points
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,

    #[serde(default)]
    pub weight: FontWeight,

    #[serde(default)]
    pub style: FontStyle,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub underline: bool,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub strikethrough: bool,

    #[serde(default)]
    pub baseline: Baseline,

    /// Text color
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<ColorInfo>,
}

impl RunStyle {
    /// Check if style has any emphasis.
    pub fn has_formatting(&self) -> bool {
        self.weight == FontWeight::Bold
            || self.style == FontStyle::Italic
            || self.underline
            || self.strikethrough
            || self.baseline != Baseline::Normal
    }
}

/// A hyperlink attached to a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hyperlink {
    /// Relationship id in the owning part
    pub rel_id: String,
    /// Target URL, when the relationship table resolves it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<String>,
}

/// A run of text with consistent styling.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextRun {
    /// The text content (`"\n"` for a line break)
    pub text: String,

    #[serde(default, skip_serializing_if = "is_default_style")]
    pub style: RunStyle,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub hyperlink: Option<Hyperlink>,

    /// Whether this run is a field (slide number, date) whose text is the
    /// producer's cached value
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub field: bool,
}

fn is_default_style(style: &RunStyle) -> bool {
    *style == RunStyle::default()
}

impl TextRun {
    /// Create a plain text run with no styling.
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    /// Create a styled text run.
    pub fn styled(text: impl Into<String>, style: RunStyle) -> Self {
        Self {
            text: text.into(),
            style,
            ..Default::default()
        }
    }

    /// A line break run.
    pub fn line_break(style: RunStyle) -> Self {
        Self::styled("\n", style)
    }

    /// Check if this run is a hyperlink.
    pub fn is_link(&self) -> bool {
        self.hyperlink.is_some()
    }

    /// Check if this run is empty.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Kind of list marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ListType {
    /// Bulleted, with the bullet character
    Bullet { character: String },
    /// Auto-numbered, with the numbering scheme (e.g., "arabicPeriod")
    Numbered { scheme: String, start_at: u32 },
}

/// List information for a paragraph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListInfo {
    pub list_type: ListType,
    /// Nesting level (0 = top level)
    pub level: u8,
}

/// Line spacing of a paragraph.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "unit", content = "value", rename_all = "lowercase")]
pub enum LineSpacing {
    /// Multiple of single spacing (1.0 = single)
    Percent(f64),
    /// Exact spacing in points
    Points(f64),
}

/// A paragraph of text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Paragraph {
    #[serde(default)]
    pub runs: Vec<TextRun>,

    #[serde(default)]
    pub alignment: TextAlignment,

    /// Outline level (0-8)
    #[serde(default, skip_serializing_if = "is_zero")]
    pub level: u8,

    /// Left margin in pixels
    #[serde(default)]
    pub margin_left: f64,

    /// First-line indent in pixels (negative for hanging indents)
    #[serde(default)]
    pub indent: f64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub list_info: Option<ListInfo>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_spacing: Option<LineSpacing>,
}

fn is_zero(n: &u8) -> bool {
    *n == 0
}

impl Paragraph {
    /// Create a paragraph with the given text.
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            runs: vec![TextRun::plain(text)],
            ..Default::default()
        }
    }

    /// Add a text run to this paragraph.
    pub fn add_run(&mut self, run: TextRun) {
        self.runs.push(run);
    }

    /// Get the plain text content.
    pub fn plain_text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }

    /// Check if this paragraph is empty.
    pub fn is_empty(&self) -> bool {
        self.runs.iter().all(|r| r.is_empty())
    }

    /// Check if this paragraph is a list item.
    pub fn is_list_item(&self) -> bool {
        self.list_info.is_some()
    }

    /// Merge consecutive runs with the same style and hyperlink.
    ///
    /// Producers frequently split a word across runs (spell-check and
    /// revision marks); merging keeps the model compact. Fields and line
    /// breaks are never merged.
    pub fn merge_adjacent_runs(&mut self) {
        if self.runs.len() <= 1 {
            return;
        }

        let mut merged: Vec<TextRun> = Vec::with_capacity(self.runs.len());
        for run in self.runs.drain(..) {
            let should_merge = merged.last().is_some_and(|last: &TextRun| {
                !last.field
                    && !run.field
                    && last.text != "\n"
                    && run.text != "\n"
                    && last.style == run.style
                    && last.hyperlink == run.hyperlink
            });

            match merged.last_mut() {
                Some(last) if should_merge => last.text.push_str(&run.text),
                _ => merged.push(run),
            }
        }
        self.runs = merged;
    }
}

/// The text content of a shape or text box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBody {
    #[serde(default)]
    pub paragraphs: Vec<Paragraph>,

    /// Whether lines wrap at the box edge
    #[serde(default = "default_wrap")]
    pub wrap: bool,

    #[serde(default)]
    pub autofit: Autofit,

    #[serde(default)]
    pub vertical_align: VerticalAlign,

    #[serde(default)]
    pub insets: Insets,
}

fn default_wrap() -> bool {
    true
}

impl Default for TextBody {
    fn default() -> Self {
        Self {
            paragraphs: Vec::new(),
            wrap: true,
            autofit: Autofit::None,
            vertical_align: VerticalAlign::Top,
            insets: Insets::default(),
        }
    }
}

impl TextBody {
    /// Plain text with paragraphs separated by newlines.
    pub fn plain_text(&self) -> String {
        self.paragraphs
            .iter()
            .map(Paragraph::plain_text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Check if the body carries no text at all.
    pub fn is_empty(&self) -> bool {
        self.paragraphs.iter().all(Paragraph::is_empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alignment_mapping() {
        assert_eq!(TextAlignment::from_ooxml("ctr"), TextAlignment::Center);
        assert_eq!(TextAlignment::from_ooxml("just"), TextAlignment::Justify);
        assert_eq!(TextAlignment::from_ooxml("unknown"), TextAlignment::Left);
        assert_eq!(VerticalAlign::from_ooxml("b"), VerticalAlign::Bottom);
    }

    #[test]
    fn test_merge_adjacent_runs() {
        let bold = RunStyle {
            weight: FontWeight::Bold,
            ..Default::default()
        };
        let mut para = Paragraph::default();
        para.add_run(TextRun::styled("Hel", bold.clone()));
        para.add_run(TextRun::styled("lo", bold.clone()));
        para.add_run(TextRun::line_break(bold.clone()));
        para.add_run(TextRun::plain("world"));
        para.merge_adjacent_runs();

        assert_eq!(para.runs.len(), 3);
        assert_eq!(para.runs[0].text, "Hello");
        assert_eq!(para.plain_text(), "Hello\nworld");
    }

    #[test]
    fn test_body_plain_text() {
        let body = TextBody {
            paragraphs: vec![Paragraph::with_text("One"), Paragraph::with_text("Two")],
            ..Default::default()
        };
        assert_eq!(body.plain_text(), "One\nTwo");
        assert!(!body.is_empty());
        assert!(TextBody::default().is_empty());
    }

    #[test]
    fn test_run_serialization_skips_defaults() {
        let run = TextRun::plain("Test");
        let json = serde_json::to_string(&run).unwrap();
        assert!(!json.contains("style"));
        assert!(!json.contains("hyperlink"));
    }
}
