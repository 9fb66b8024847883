//! Color decoding and theme-relative resolution.
//!
//! A DrawingML color node is one of several literal or indirect forms, each
//! optionally carrying modifier children (`tint`, `shade`, `alpha`,
//! `lumMod`, `lumOff`). [`parse_color`] captures the node as a
//! [`ColorInfo`]; [`ColorInfo::resolve`] turns it into concrete RGB against
//! a theme color scheme, or against the built-in default palette when no
//! scheme is available.

use crate::error::Result;
use crate::model::ColorScheme;
use crate::units::{percent_fraction, percent_ratio};
use crate::xml::XmlElement;
use serde::{Deserialize, Serialize};

/// An RGB color with channels normalized to [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0.0, 0.0, 0.0);
    pub const WHITE: Rgb = Rgb::new(1.0, 1.0, 1.0);

    /// Create a color from normalized channels.
    pub const fn new(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    /// Create a color from 8-bit channels.
    pub fn from_u8(r: u8, g: u8, b: u8) -> Self {
        Self::new(r as f64 / 255.0, g as f64 / 255.0, b as f64 / 255.0)
    }

    /// Parse a six-digit hex string, with or without a leading `#`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
        Some(Self::from_u8(r, g, b))
    }

    /// Format as an uppercase `RRGGBB` hex string.
    pub fn to_hex(&self) -> String {
        let to_byte = |c: f64| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        format!(
            "{:02X}{:02X}{:02X}",
            to_byte(self.r),
            to_byte(self.g),
            to_byte(self.b)
        )
    }

    fn map(self, f: impl Fn(f64) -> f64) -> Self {
        Self::new(
            f(self.r).clamp(0.0, 1.0),
            f(self.g).clamp(0.0, 1.0),
            f(self.b).clamp(0.0, 1.0),
        )
    }

    /// Lighten toward white: `c + (1 - c) * tint`.
    pub fn tinted(self, tint: f64) -> Self {
        let t = tint.clamp(0.0, 1.0);
        self.map(|c| c + (1.0 - c) * t)
    }

    /// Darken toward black: `c * (1 - shade)`.
    pub fn shaded(self, shade: f64) -> Self {
        let s = shade.clamp(0.0, 1.0);
        self.map(|c| c * (1.0 - s))
    }

    /// Scale and offset HSL luminance.
    pub fn with_luminance(self, lum_mod: f64, lum_off: f64) -> Self {
        let (h, s, l) = rgb_to_hsl(self);
        hsl_to_rgb(h, s, (l * lum_mod + lum_off).clamp(0.0, 1.0))
    }
}

impl Default for Rgb {
    fn default() -> Self {
        Self::BLACK
    }
}

fn rgb_to_hsl(c: Rgb) -> (f64, f64, f64) {
    let max = c.r.max(c.g).max(c.b);
    let min = c.r.min(c.g).min(c.b);
    let l = (max + min) / 2.0;
    if (max - min).abs() < f64::EPSILON {
        return (0.0, 0.0, l);
    }
    let d = max - min;
    let s = if l > 0.5 {
        d / (2.0 - max - min)
    } else {
        d / (max + min)
    };
    let h = if max == c.r {
        ((c.g - c.b) / d).rem_euclid(6.0)
    } else if max == c.g {
        (c.b - c.r) / d + 2.0
    } else {
        (c.r - c.g) / d + 4.0
    };
    (h * 60.0, s, l)
}

fn hsl_to_rgb(h: f64, s: f64, l: f64) -> Rgb {
    if s <= 0.0 {
        return Rgb::new(l, l, l);
    }
    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let hp = h.rem_euclid(360.0) / 60.0;
    let x = c * (1.0 - (hp.rem_euclid(2.0) - 1.0).abs());
    let (r, g, b) = match hp as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = l - c / 2.0;
    Rgb::new(
        (r + m).clamp(0.0, 1.0),
        (g + m).clamp(0.0, 1.0),
        (b + m).clamp(0.0, 1.0),
    )
}

/// The twelve named slots of a theme color scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SchemeSlot {
    Dk1,
    Lt1,
    Dk2,
    Lt2,
    Accent1,
    Accent2,
    Accent3,
    Accent4,
    Accent5,
    Accent6,
    Hlink,
    FolHlink,
}

impl SchemeSlot {
    /// All slots in scheme document order.
    pub const ALL: [SchemeSlot; 12] = [
        SchemeSlot::Dk1,
        SchemeSlot::Lt1,
        SchemeSlot::Dk2,
        SchemeSlot::Lt2,
        SchemeSlot::Accent1,
        SchemeSlot::Accent2,
        SchemeSlot::Accent3,
        SchemeSlot::Accent4,
        SchemeSlot::Accent5,
        SchemeSlot::Accent6,
        SchemeSlot::Hlink,
        SchemeSlot::FolHlink,
    ];

    /// Resolve a `schemeClr@val` name, including the background/text
    /// aliases used inside slides.
    pub fn from_name(name: &str) -> Option<Self> {
        let slot = match name {
            "dk1" | "tx1" => SchemeSlot::Dk1,
            "lt1" | "bg1" => SchemeSlot::Lt1,
            "dk2" | "tx2" => SchemeSlot::Dk2,
            "lt2" | "bg2" => SchemeSlot::Lt2,
            "accent1" => SchemeSlot::Accent1,
            "accent2" => SchemeSlot::Accent2,
            "accent3" => SchemeSlot::Accent3,
            "accent4" => SchemeSlot::Accent4,
            "accent5" => SchemeSlot::Accent5,
            "accent6" => SchemeSlot::Accent6,
            "hlink" => SchemeSlot::Hlink,
            "folHlink" => SchemeSlot::FolHlink,
            _ => return None,
        };
        Some(slot)
    }

    /// Element name of this slot inside `a:clrScheme`.
    pub fn name(&self) -> &'static str {
        match self {
            SchemeSlot::Dk1 => "dk1",
            SchemeSlot::Lt1 => "lt1",
            SchemeSlot::Dk2 => "dk2",
            SchemeSlot::Lt2 => "lt2",
            SchemeSlot::Accent1 => "accent1",
            SchemeSlot::Accent2 => "accent2",
            SchemeSlot::Accent3 => "accent3",
            SchemeSlot::Accent4 => "accent4",
            SchemeSlot::Accent5 => "accent5",
            SchemeSlot::Accent6 => "accent6",
            SchemeSlot::Hlink => "hlink",
            SchemeSlot::FolHlink => "folHlink",
        }
    }

    /// Base color of this slot in the default Office palette.
    pub fn default_rgb(&self) -> Rgb {
        let hex = match self {
            SchemeSlot::Dk1 => "000000",
            SchemeSlot::Lt1 => "FFFFFF",
            SchemeSlot::Dk2 => "44546A",
            SchemeSlot::Lt2 => "E7E6E6",
            SchemeSlot::Accent1 => "4472C4",
            SchemeSlot::Accent2 => "ED7D31",
            SchemeSlot::Accent3 => "A5A5A5",
            SchemeSlot::Accent4 => "FFC000",
            SchemeSlot::Accent5 => "5B9BD5",
            SchemeSlot::Accent6 => "70AD47",
            SchemeSlot::Hlink => "0563C1",
            SchemeSlot::FolHlink => "954F72",
        };
        Rgb::from_hex(hex).unwrap_or_default()
    }
}

static SYSTEM_COLORS: phf::Map<&'static str, &'static str> = phf::phf_map! {
    "windowText" => "000000",
    "window" => "FFFFFF",
    "menu" => "F0F0F0",
    "menuText" => "000000",
    "btnFace" => "F0F0F0",
    "btnText" => "000000",
    "highlight" => "0078D7",
    "highlightText" => "FFFFFF",
    "grayText" => "6D6D6D",
};

static PRESET_COLORS: phf::Map<&'static str, &'static str> = phf::phf_map! {
    "black" => "000000",
    "white" => "FFFFFF",
    "red" => "FF0000",
    "green" => "008000",
    "lime" => "00FF00",
    "blue" => "0000FF",
    "yellow" => "FFFF00",
    "cyan" => "00FFFF",
    "magenta" => "FF00FF",
    "gray" => "808080",
    "silver" => "C0C0C0",
    "orange" => "FFA500",
    "purple" => "800080",
    "navy" => "000080",
    "maroon" => "800000",
    "olive" => "808000",
    "teal" => "008080",
    "brown" => "A52A2A",
    "pink" => "FFC0CB",
    "gold" => "FFD700",
};

/// Base RGB of a system color name, if known.
pub fn system_color(name: &str) -> Option<Rgb> {
    SYSTEM_COLORS.get(name).and_then(|hex| Rgb::from_hex(hex))
}

/// How a color refers to its base value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ColorKind {
    /// A literal RGB value
    Rgb { value: Rgb },
    /// A theme scheme slot reference (e.g., "accent1", "tx1")
    Scheme { name: String },
    /// A system color reference, with the producer's cached value if any
    System {
        name: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        last: Option<Rgb>,
    },
}

/// A decoded color with its modifiers.
///
/// Modifiers are stored as fractions and always clamped: `tint`, `shade`
/// and `alpha` to [0, 1]; `lum_off` to [-1, 1]; `lum_mod` to be
/// non-negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorInfo {
    pub kind: ColorKind,
    #[serde(default)]
    pub tint: f64,
    #[serde(default)]
    pub shade: f64,
    #[serde(default = "default_one")]
    pub alpha: f64,
    #[serde(default = "default_one")]
    pub lum_mod: f64,
    #[serde(default)]
    pub lum_off: f64,
}

fn default_one() -> f64 {
    1.0
}

impl Default for ColorInfo {
    fn default() -> Self {
        Self::rgb(Rgb::BLACK)
    }
}

impl ColorInfo {
    fn with_kind(kind: ColorKind) -> Self {
        Self {
            kind,
            tint: 0.0,
            shade: 0.0,
            alpha: 1.0,
            lum_mod: 1.0,
            lum_off: 0.0,
        }
    }

    /// A literal RGB color with no modifiers.
    pub fn rgb(value: Rgb) -> Self {
        Self::with_kind(ColorKind::Rgb { value })
    }

    /// A scheme slot reference with no modifiers.
    pub fn scheme(name: impl Into<String>) -> Self {
        Self::with_kind(ColorKind::Scheme { name: name.into() })
    }

    /// A system color reference with no modifiers.
    pub fn system(name: impl Into<String>, last: Option<Rgb>) -> Self {
        Self::with_kind(ColorKind::System {
            name: name.into(),
            last,
        })
    }

    /// Set the tint modifier (clamped to [0, 1]).
    pub fn with_tint(mut self, tint: f64) -> Self {
        self.tint = tint.clamp(0.0, 1.0);
        self
    }

    /// Set the shade modifier (clamped to [0, 1]).
    pub fn with_shade(mut self, shade: f64) -> Self {
        self.shade = shade.clamp(0.0, 1.0);
        self
    }

    /// Set the alpha modifier (clamped to [0, 1]).
    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha.clamp(0.0, 1.0);
        self
    }

    /// Whether this color depends on a theme scheme.
    pub fn is_scheme(&self) -> bool {
        matches!(self.kind, ColorKind::Scheme { .. })
    }

    /// Base color before modifiers.
    ///
    /// Scheme references resolve through `scheme` when given, otherwise
    /// through the default palette. Unknown names fall back to black.
    pub fn base(&self, scheme: Option<&ColorScheme>) -> Rgb {
        match &self.kind {
            ColorKind::Rgb { value } => *value,
            ColorKind::Scheme { name } => match SchemeSlot::from_name(name) {
                Some(slot) => match scheme {
                    Some(scheme) => scheme.get(slot).resolve(None),
                    None => slot.default_rgb(),
                },
                None => Rgb::BLACK,
            },
            ColorKind::System { name, last } => last
                .or_else(|| system_color(name))
                .unwrap_or(Rgb::BLACK),
        }
    }

    /// Final RGB after luminance, tint and shade modifiers.
    pub fn resolve(&self, scheme: Option<&ColorScheme>) -> Rgb {
        let mut rgb = self.base(scheme);
        if self.lum_mod != 1.0 || self.lum_off != 0.0 {
            rgb = rgb.with_luminance(self.lum_mod, self.lum_off);
        }
        if self.tint > 0.0 {
            rgb = rgb.tinted(self.tint);
        }
        if self.shade > 0.0 {
            rgb = rgb.shaded(self.shade);
        }
        rgb
    }

    /// Replace a scheme reference with the scheme's concrete base color.
    ///
    /// Modifiers are kept so that [`ColorInfo::resolve`] gives the same
    /// result afterwards without needing the scheme.
    pub fn substitute_scheme(&mut self, scheme: &ColorScheme) {
        if self.is_scheme() {
            let value = self.base(Some(scheme));
            self.kind = ColorKind::Rgb { value };
        }
    }
}

const COLOR_ELEMENTS: [&str; 6] = ["srgbClr", "scrgbClr", "prstClr", "hslClr", "schemeClr", "sysClr"];

/// Decode the color held by a fill-like container (e.g., `a:solidFill`).
///
/// Precedence when several color children are present: RGB literal, then
/// scheme reference, then system color. Returns `Ok(None)` when the
/// container holds no color; a color whose values do not parse is an error.
pub fn parse_color(container: &XmlElement) -> Result<Option<ColorInfo>> {
    for name in COLOR_ELEMENTS {
        if let Some(node) = container.child(name) {
            return parse_color_element(node).map(Some);
        }
    }
    Ok(None)
}

/// Decode one color element (`a:srgbClr`, `a:schemeClr`, ...).
pub fn parse_color_element(node: &XmlElement) -> Result<ColorInfo> {
    let kind = match node.local_name() {
        "srgbClr" => ColorKind::Rgb {
            value: node.attr("val").and_then(Rgb::from_hex).unwrap_or_default(),
        },
        "scrgbClr" => ColorKind::Rgb {
            value: Rgb::new(
                percent_fraction(node.attr_percent("r")?.unwrap_or(0)),
                percent_fraction(node.attr_percent("g")?.unwrap_or(0)),
                percent_fraction(node.attr_percent("b")?.unwrap_or(0)),
            ),
        },
        "prstClr" => ColorKind::Rgb {
            value: node
                .attr("val")
                .and_then(|v| PRESET_COLORS.get(v))
                .and_then(|hex| Rgb::from_hex(hex))
                .unwrap_or_default(),
        },
        "hslClr" => ColorKind::Rgb {
            value: hsl_to_rgb(
                node.attr_i64("hue")?.unwrap_or(0) as f64 / crate::units::ANGLE_SCALE,
                percent_fraction(node.attr_percent("sat")?.unwrap_or(0)),
                percent_fraction(node.attr_percent("lum")?.unwrap_or(0)),
            ),
        },
        "schemeClr" => ColorKind::Scheme {
            name: node.attr("val").unwrap_or("dk1").to_string(),
        },
        "sysClr" => ColorKind::System {
            name: node.attr("val").unwrap_or("windowText").to_string(),
            last: node.attr("lastClr").and_then(Rgb::from_hex),
        },
        _ => ColorKind::Rgb { value: Rgb::BLACK },
    };

    let mut color = ColorInfo::with_kind(kind);
    for modifier in node.elements() {
        let Some(val) = modifier.attr_percent("val")? else {
            continue;
        };
        match modifier.local_name() {
            "tint" => color.tint = percent_fraction(val),
            "shade" => color.shade = percent_fraction(val),
            "alpha" => color.alpha = percent_fraction(val),
            "lumMod" => color.lum_mod = percent_ratio(val).max(0.0),
            "lumOff" => color.lum_off = crate::units::percent_signed(val),
            _ => {}
        }
    }
    Ok(color)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::decode;
    use proptest::prelude::*;

    fn close(a: Rgb, b: Rgb) -> bool {
        (a.r - b.r).abs() < 1e-9 && (a.g - b.g).abs() < 1e-9 && (a.b - b.b).abs() < 1e-9
    }

    #[test]
    fn test_srgb_literal() {
        let node = decode(r#"<a:solidFill><a:srgbClr val="FF0000"/></a:solidFill>"#).unwrap();
        let color = parse_color(&node).unwrap().unwrap();
        assert_eq!(color.resolve(None), Rgb::new(1.0, 0.0, 0.0));
        assert_eq!(color.alpha, 1.0);
    }

    #[test]
    fn test_scheme_with_tint() {
        let node = decode(
            r#"<a:solidFill><a:schemeClr val="accent1"><a:tint val="50000"/></a:schemeClr></a:solidFill>"#,
        )
        .unwrap();
        let color = parse_color(&node).unwrap().unwrap();
        assert_eq!(color.tint, 0.5);

        let base = SchemeSlot::Accent1.default_rgb();
        let expected = Rgb::new(
            base.r + (1.0 - base.r) * 0.5,
            base.g + (1.0 - base.g) * 0.5,
            base.b + (1.0 - base.b) * 0.5,
        );
        assert!(close(color.resolve(None), expected));
    }

    #[test]
    fn test_precedence_rgb_over_scheme() {
        let node = decode(
            r#"<a:solidFill><a:schemeClr val="accent2"/><a:srgbClr val="00FF00"/></a:solidFill>"#,
        )
        .unwrap();
        let color = parse_color(&node).unwrap().unwrap();
        assert_eq!(color.resolve(None), Rgb::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn test_system_color_prefers_last_clr() {
        let node = decode(r#"<a:sysClr val="windowText" lastClr="112233"/>"#).unwrap();
        let color = parse_color_element(&node).unwrap();
        assert_eq!(color.resolve(None).to_hex(), "112233");

        let node = decode(r#"<a:sysClr val="window"/>"#).unwrap();
        assert_eq!(parse_color_element(&node).unwrap().resolve(None), Rgb::WHITE);
    }

    #[test]
    fn test_missing_color_and_default_black() {
        let node = decode("<a:solidFill/>").unwrap();
        assert!(parse_color(&node).unwrap().is_none());
        assert_eq!(ColorInfo::default().resolve(None), Rgb::BLACK);
    }

    #[test]
    fn test_shade_darkens() {
        let color = ColorInfo::rgb(Rgb::WHITE).with_shade(0.25);
        assert!(close(color.resolve(None), Rgb::new(0.75, 0.75, 0.75)));
    }

    #[test]
    fn test_lum_mod_off() {
        let node = decode(
            r#"<a:schemeClr val="bg1"><a:lumMod val="50000"/><a:lumOff val="0"/></a:schemeClr>"#,
        )
        .unwrap();
        let color = parse_color_element(&node).unwrap();
        assert!(close(color.resolve(None), Rgb::new(0.5, 0.5, 0.5)));
    }

    #[test]
    fn test_strict_percent_modifiers() {
        let node = decode(
            r#"<a:srgbClr val="000000"><a:tint val="50%"/><a:alpha val="25%"/></a:srgbClr>"#,
        )
        .unwrap();
        let color = parse_color_element(&node).unwrap();
        assert_eq!(color.tint, 0.5);
        assert_eq!(color.alpha, 0.25);
        assert!(close(color.resolve(None), Rgb::new(0.5, 0.5, 0.5)));
    }

    #[test]
    fn test_invalid_modifier_is_error() {
        let node = decode(r#"<a:srgbClr val="FFFFFF"><a:alpha val="half"/></a:srgbClr>"#).unwrap();
        assert!(parse_color_element(&node).is_err());
    }

    #[test]
    fn test_hex_round_trip() {
        assert_eq!(Rgb::from_hex("4472C4").unwrap().to_hex(), "4472C4");
        assert!(Rgb::from_hex("XYZ").is_none());
        assert!(Rgb::from_hex("12345").is_none());
    }

    proptest! {
        #[test]
        fn prop_modifiers_clamped(tint in any::<i32>(), shade in any::<i32>(), alpha in any::<i32>()) {
            let xml = format!(
                r#"<a:srgbClr val="808080"><a:tint val="{}"/><a:shade val="{}"/><a:alpha val="{}"/></a:srgbClr>"#,
                tint, shade, alpha
            );
            let node = decode(&xml).unwrap();
            let color = parse_color_element(&node).unwrap();
            prop_assert!((0.0..=1.0).contains(&color.tint));
            prop_assert!((0.0..=1.0).contains(&color.shade));
            prop_assert!((0.0..=1.0).contains(&color.alpha));
            let rgb = color.resolve(None);
            for c in [rgb.r, rgb.g, rgb.b] {
                prop_assert!((0.0..=1.0).contains(&c));
            }
        }
    }
}
