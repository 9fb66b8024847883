//! OOXML unit conversions.
//!
//! DrawingML stores lengths in EMU (914400 per inch), angles in 1/60000 of a
//! degree, percentages scaled so that 100000 means 100%, and font sizes in
//! hundredths of a point. Pixels here are CSS pixels at 96 DPI.

/// EMU per inch.
pub const EMU_PER_INCH: i64 = 914_400;

/// Pixels per inch.
pub const PIXELS_PER_INCH: f64 = 96.0;

/// EMU per pixel at 96 DPI.
pub const EMU_PER_PIXEL: f64 = EMU_PER_INCH as f64 / PIXELS_PER_INCH;

/// Encoded value for 100% in percentage attributes.
pub const PERCENT_SCALE: f64 = 100_000.0;

/// Encoded units per degree in angle attributes.
pub const ANGLE_SCALE: f64 = 60_000.0;

/// Convert EMU to pixels.
pub fn emu_to_pixels(emu: i64) -> f64 {
    emu as f64 * PIXELS_PER_INCH / EMU_PER_INCH as f64
}

/// Convert pixels back to EMU, rounding to the nearest unit.
pub fn pixels_to_emu(px: f64) -> i64 {
    (px * EMU_PER_INCH as f64 / PIXELS_PER_INCH).round() as i64
}

/// Convert typographic points to pixels.
pub fn points_to_pixels(pt: f64) -> f64 {
    pt * PIXELS_PER_INCH / 72.0
}

/// Convert an encoded angle to degrees.
pub fn angle_to_degrees(value: i64) -> f64 {
    value as f64 / ANGLE_SCALE
}

/// Convert an encoded percentage to a fraction clamped to [0, 1].
pub fn percent_fraction(value: i64) -> f64 {
    (value as f64 / PERCENT_SCALE).clamp(0.0, 1.0)
}

/// Convert an encoded signed percentage to a fraction clamped to [-1, 1].
pub fn percent_signed(value: i64) -> f64 {
    (value as f64 / PERCENT_SCALE).clamp(-1.0, 1.0)
}

/// Convert an encoded percentage to an unclamped fraction.
///
/// Used for multipliers such as `lumMod` where values above 100% are legal.
pub fn percent_ratio(value: i64) -> f64 {
    value as f64 / PERCENT_SCALE
}

/// Convert a font size in hundredths of a point to points.
pub fn font_size_to_points(value: i64) -> f64 {
    value as f64 / 100.0
}
