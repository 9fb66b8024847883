//! Theme model: color scheme and font scheme.

use crate::color::{ColorInfo, Rgb, SchemeSlot};
use serde::{Deserialize, Serialize};

/// Typeface used by the default theme for every script.
pub const DEFAULT_TYPEFACE: &str = "Arial";

/// The twelve-slot color scheme of a theme.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorScheme {
    /// Scheme name (e.g., "Office")
    pub name: String,
    pub dk1: ColorInfo,
    pub lt1: ColorInfo,
    pub dk2: ColorInfo,
    pub lt2: ColorInfo,
    pub accent1: ColorInfo,
    pub accent2: ColorInfo,
    pub accent3: ColorInfo,
    pub accent4: ColorInfo,
    pub accent5: ColorInfo,
    pub accent6: ColorInfo,
    pub hlink: ColorInfo,
    pub fol_hlink: ColorInfo,
}

impl ColorScheme {
    /// Color stored in a slot.
    pub fn get(&self, slot: SchemeSlot) -> &ColorInfo {
        match slot {
            SchemeSlot::Dk1 => &self.dk1,
            SchemeSlot::Lt1 => &self.lt1,
            SchemeSlot::Dk2 => &self.dk2,
            SchemeSlot::Lt2 => &self.lt2,
            SchemeSlot::Accent1 => &self.accent1,
            SchemeSlot::Accent2 => &self.accent2,
            SchemeSlot::Accent3 => &self.accent3,
            SchemeSlot::Accent4 => &self.accent4,
            SchemeSlot::Accent5 => &self.accent5,
            SchemeSlot::Accent6 => &self.accent6,
            SchemeSlot::Hlink => &self.hlink,
            SchemeSlot::FolHlink => &self.fol_hlink,
        }
    }

    /// Mutable access to a slot.
    pub fn get_mut(&mut self, slot: SchemeSlot) -> &mut ColorInfo {
        match slot {
            SchemeSlot::Dk1 => &mut self.dk1,
            SchemeSlot::Lt1 => &mut self.lt1,
            SchemeSlot::Dk2 => &mut self.dk2,
            SchemeSlot::Lt2 => &mut self.lt2,
            SchemeSlot::Accent1 => &mut self.accent1,
            SchemeSlot::Accent2 => &mut self.accent2,
            SchemeSlot::Accent3 => &mut self.accent3,
            SchemeSlot::Accent4 => &mut self.accent4,
            SchemeSlot::Accent5 => &mut self.accent5,
            SchemeSlot::Accent6 => &mut self.accent6,
            SchemeSlot::Hlink => &mut self.hlink,
            SchemeSlot::FolHlink => &mut self.fol_hlink,
        }
    }

    /// Resolved RGB of a slot.
    pub fn rgb(&self, slot: SchemeSlot) -> Rgb {
        self.get(slot).resolve(None)
    }
}

impl Default for ColorScheme {
    /// The default Office palette. `dk1`/`lt1` are the usual system color
    /// references with their cached values.
    fn default() -> Self {
        let literal = |slot: SchemeSlot| ColorInfo::rgb(slot.default_rgb());
        Self {
            name: "Office".to_string(),
            dk1: ColorInfo::system("windowText", Some(Rgb::BLACK)),
            lt1: ColorInfo::system("window", Some(Rgb::WHITE)),
            dk2: literal(SchemeSlot::Dk2),
            lt2: literal(SchemeSlot::Lt2),
            accent1: literal(SchemeSlot::Accent1),
            accent2: literal(SchemeSlot::Accent2),
            accent3: literal(SchemeSlot::Accent3),
            accent4: literal(SchemeSlot::Accent4),
            accent5: literal(SchemeSlot::Accent5),
            accent6: literal(SchemeSlot::Accent6),
            hlink: literal(SchemeSlot::Hlink),
            fol_hlink: literal(SchemeSlot::FolHlink),
        }
    }
}

/// A typeface reference for one script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontInfo {
    /// Typeface name; empty means "use the application default"
    pub typeface: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub panose: Option<String>,
}

impl FontInfo {
    pub fn new(typeface: impl Into<String>) -> Self {
        Self {
            typeface: typeface.into(),
            panose: None,
        }
    }
}

/// Typefaces for the Latin, East Asian and complex scripts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontCollection {
    pub latin: FontInfo,
    pub east_asian: FontInfo,
    pub complex_script: FontInfo,
}

impl Default for FontCollection {
    fn default() -> Self {
        Self {
            latin: FontInfo::new(DEFAULT_TYPEFACE),
            east_asian: FontInfo::new(DEFAULT_TYPEFACE),
            complex_script: FontInfo::new(DEFAULT_TYPEFACE),
        }
    }
}

/// Major (headings) and minor (body) font collections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontScheme {
    pub name: String,
    pub major: FontCollection,
    pub minor: FontCollection,
}

impl Default for FontScheme {
    fn default() -> Self {
        Self {
            name: "Office".to_string(),
            major: FontCollection::default(),
            minor: FontCollection::default(),
        }
    }
}

impl FontScheme {
    /// Resolve a theme font reference such as `+mj-lt` or `+mn-ea`.
    ///
    /// Returns `None` for anything that is not a theme reference.
    pub fn resolve_reference(&self, reference: &str) -> Option<&str> {
        let rest = reference.strip_prefix('+')?;
        let (group, script) = rest.split_once('-')?;
        let collection = match group {
            "mj" => &self.major,
            "mn" => &self.minor,
            _ => return None,
        };
        let font = match script {
            "lt" => &collection.latin,
            "ea" => &collection.east_asian,
            "cs" => &collection.complex_script,
            _ => return None,
        };
        Some(font.typeface.as_str())
    }
}

/// A presentation theme.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    /// Theme id derived from its part name (e.g., "theme1")
    pub id: String,
    /// Theme display name
    pub name: String,
    pub color_scheme: ColorScheme,
    pub font_scheme: FontScheme,
}

impl Theme {
    /// The fallback theme used when a deck has none or its theme is broken.
    pub fn default_theme(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: "Office Theme".to_string(),
            color_scheme: ColorScheme::default(),
            font_scheme: FontScheme::default(),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::default_theme("default")
    }
}
