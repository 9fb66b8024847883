//! Theme part parsing (`ppt/theme/themeN.xml`).
//!
//! Theme parsing never fails: a missing or broken subtree is replaced by
//! the default theme's counterpart and reported as a warning, so one bad
//! theme cannot take the deck down with it.

use crate::color::{parse_color, SchemeSlot};
use crate::model::{ColorScheme, FontCollection, FontInfo, FontScheme, Theme};
use crate::xml::{self, XmlElement};

/// A parsed theme and the warnings raised while parsing it.
#[derive(Debug, Clone)]
pub struct ThemeOutcome {
    pub theme: Theme,
    pub warnings: Vec<String>,
}

/// Parse theme XML text.
pub fn parse_theme_xml(text: &str, id: &str) -> ThemeOutcome {
    match xml::decode(text) {
        Ok(root) => parse_theme(&root, id),
        Err(err) => {
            let warning = format!("theme {}: {}; using default theme", id, err);
            log::warn!("{}", warning);
            ThemeOutcome {
                theme: Theme::default_theme(id),
                warnings: vec![warning],
            }
        }
    }
}

/// Parse a decoded `a:theme` element.
pub fn parse_theme(root: &XmlElement, id: &str) -> ThemeOutcome {
    let mut theme = Theme::default_theme(id);
    let mut warnings = Vec::new();
    let mut warn = |message: String| {
        let warning = format!("theme {}: {}", id, message);
        log::warn!("{}", warning);
        warnings.push(warning);
    };

    if !root.is("theme") {
        warn(format!(
            "unexpected root element <{}>; using default theme",
            root.name
        ));
        return ThemeOutcome { theme, warnings };
    }
    if let Some(name) = root.attr("name") {
        theme.name = name.to_string();
    }

    let elements = root.child("themeElements");

    match elements.and_then(|e| e.child("clrScheme")) {
        Some(scheme) => {
            let (colors, missing) = parse_color_scheme(scheme);
            theme.color_scheme = colors;
            if !missing.is_empty() {
                warn(format!(
                    "color scheme missing {}; using defaults for them",
                    missing.join(", ")
                ));
            }
        }
        None => warn("no color scheme; using default palette".to_string()),
    }

    match elements.and_then(|e| e.child("fontScheme")) {
        Some(fonts) => theme.font_scheme = parse_font_scheme(fonts),
        None => warn("no font scheme; using default fonts".to_string()),
    }

    log::debug!(
        "theme {} '{}': accent1 {}, minor latin {}",
        id,
        theme.name,
        theme.color_scheme.rgb(SchemeSlot::Accent1).to_hex(),
        theme.font_scheme.minor.latin.typeface
    );
    ThemeOutcome { theme, warnings }
}

/// Decode `a:clrScheme`. Returns the scheme and the slots that were missing
/// or unreadable.
fn parse_color_scheme(node: &XmlElement) -> (ColorScheme, Vec<&'static str>) {
    let mut scheme = ColorScheme::default();
    if let Some(name) = node.attr("name") {
        scheme.name = name.to_string();
    }

    let mut missing = Vec::new();
    for slot in SchemeSlot::ALL {
        let color = node
            .child(slot.name())
            .and_then(|container| parse_color(container).ok().flatten());
        match color {
            Some(color) => *scheme.get_mut(slot) = color,
            None => missing.push(slot.name()),
        }
    }
    (scheme, missing)
}

fn parse_font_scheme(node: &XmlElement) -> FontScheme {
    let defaults = FontScheme::default();
    FontScheme {
        name: node.attr("name").unwrap_or(&defaults.name).to_string(),
        major: node
            .child("majorFont")
            .map(parse_font_collection)
            .unwrap_or(defaults.major),
        minor: node
            .child("minorFont")
            .map(parse_font_collection)
            .unwrap_or(defaults.minor),
    }
}

fn parse_font_collection(node: &XmlElement) -> FontCollection {
    let defaults = FontCollection::default();
    let font = |name: &str, fallback: FontInfo| match node.child(name) {
        Some(f) => FontInfo {
            typeface: f.attr("typeface").unwrap_or_default().to_string(),
            panose: f.attr("panose").map(str::to_string),
        },
        None => fallback,
    };
    FontCollection {
        latin: font("latin", defaults.latin),
        east_asian: font("ea", defaults.east_asian),
        complex_script: font("cs", defaults.complex_script),
    }
}
