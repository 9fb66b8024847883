//! Presentation, slide and master models.

use super::{Element, Fill, MediaFile, Theme};
use serde::{Deserialize, Serialize};

/// Presentation metadata extracted from docProps/core.xml.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Presentation author/creator
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub keywords: Vec<String>,

    /// Creation date (ISO 8601)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,

    /// Last modification date (ISO 8601)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified_by: Option<String>,
}

/// Background of a slide or master.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Background {
    pub fill: Fill,
    /// Whether this background was inherited from the slide's master
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub from_master: bool,
}

/// A slide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slide {
    /// Slide id (from presentation.xml when declared, else "slideN")
    pub id: String,

    /// Display name (`cSld@name`, else "Slide N")
    pub name: String,

    /// 1-based sequence number from the part's file name
    pub number: u32,

    #[serde(default)]
    pub elements: Vec<Element>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<Background>,

    /// Package path of the slide's layout
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout_ref: Option<String>,

    /// Id of the master the layout belongs to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub master_ref: Option<String>,

    /// Slide is hidden in slide show
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub hidden: bool,
}

impl Slide {
    /// Plain text of every element on the slide.
    pub fn plain_text(&self) -> String {
        self.elements
            .iter()
            .map(Element::plain_text)
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Number of elements including group descendants.
    pub fn element_count(&self) -> usize {
        self.elements.iter().map(Element::count).sum()
    }
}

/// A slide master.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MasterSlide {
    /// Master id ("masterN")
    pub id: String,
    pub name: String,
    /// 1-based sequence number from the part's file name
    pub number: u32,
    #[serde(default)]
    pub elements: Vec<Element>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<Background>,
    /// Id of the theme the master uses
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme_ref: Option<String>,
}

/// Slide dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SlideSize {
    /// Natural width in EMU
    pub width_emu: i64,
    /// Natural height in EMU
    pub height_emu: i64,
    /// Target canvas width in pixels (natural size times scale)
    pub width: f64,
    /// Target canvas height in pixels
    pub height: f64,
    /// Scale applied to every element's geometry
    pub scale: f64,
}

/// A decoded presentation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Presentation {
    /// Name of the source file, for diagnostics
    pub file_name: String,

    #[serde(default)]
    pub metadata: Metadata,

    pub slide_size: SlideSize,

    /// Number of decoded slides; equals `slides.len()`
    pub slide_count: usize,

    #[serde(default)]
    pub slides: Vec<Slide>,

    #[serde(default)]
    pub masters: Vec<MasterSlide>,

    #[serde(default)]
    pub themes: Vec<Theme>,

    #[serde(default)]
    pub media: Vec<MediaFile>,
}

impl Presentation {
    /// Get a slide by 1-based number.
    pub fn slide(&self, number: u32) -> Option<&Slide> {
        self.slides.iter().find(|s| s.number == number)
    }

    /// Get a media file by id.
    pub fn media_file(&self, id: &str) -> Option<&MediaFile> {
        self.media.iter().find(|m| m.id == id)
    }

    /// Get a theme by id.
    pub fn theme(&self, id: &str) -> Option<&Theme> {
        self.themes.iter().find(|t| t.id == id)
    }

    /// Plain text of all slides, separated by blank lines.
    pub fn plain_text(&self) -> String {
        self.slides
            .iter()
            .map(Slide::plain_text)
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}
