//! Fill, stroke and image source decoding shared by shapes and backgrounds.

use crate::cache::MediaIndex;
use crate::color::{parse_color, ColorInfo};
use crate::container::{resolve_path, Relationships};
use crate::error::{Error, Result};
use crate::model::{
    ArrowHead, ArrowSize, ArrowType, DashType, Fill, GradientFill, GradientKind, GradientStop,
    ImageSource, LineCap, LineJoin, Stroke,
};
use crate::units::{angle_to_degrees, emu_to_pixels, percent_fraction};
use crate::xml::XmlElement;

/// Implied outline width: 0.75pt.
pub const DEFAULT_LINE_WIDTH_EMU: i64 = 9525;

/// What a part parser needs to resolve references and lengths.
#[derive(Clone, Copy)]
pub struct PartContext<'a> {
    /// Package path of the part being decoded
    pub part_path: &'a str,
    /// Relationships of that part
    pub rels: &'a Relationships,
    pub media: &'a MediaIndex,
    /// Factor from natural slide pixels to target pixels
    pub scale: f64,
}

impl<'a> PartContext<'a> {
    /// Convert EMU to scaled pixels.
    pub fn px(&self, emu: i64) -> f64 {
        emu_to_pixels(emu) * self.scale
    }

    /// Resolve a `blip` element's relationship into an image source.
    pub fn image_source(&self, blip: &XmlElement) -> Result<ImageSource> {
        let rel_id = blip
            .attr("r:embed")
            .or_else(|| blip.attr("r:link"))
            .filter(|id| !id.is_empty())
            .ok_or_else(|| Error::InvalidStructure("blip without relationship id".into()))?;

        let mut source = ImageSource {
            rel_id: rel_id.to_string(),
            ..Default::default()
        };
        match self.rels.get(rel_id) {
            Some(rel) if rel.external => source.external_url = Some(rel.target.clone()),
            Some(rel) => {
                let path = resolve_path(self.part_path, &rel.target);
                source.media_id = self.media.media_id(&path).map(str::to_string);
                source.path = Some(path);
            }
            None => log::debug!(
                "{}: image relationship {} not found",
                self.part_path,
                rel_id
            ),
        }
        Ok(source)
    }
}

/// Decode the fill held by a properties element (`spPr`, `bgPr`, `grpSpPr`).
///
/// Returns `Ok(None)` when no fill child is present, so callers can fall
/// back to style references. `grpFill` takes the enclosing group's fill.
pub fn parse_fill(
    props: &XmlElement,
    ctx: &PartContext<'_>,
    group_fill: Option<&Fill>,
) -> Result<Option<Fill>> {
    for node in props.elements() {
        let fill = match node.local_name() {
            "noFill" => Fill::None,
            "solidFill" => Fill::Solid {
                color: parse_color(node)?.unwrap_or_default(),
            },
            "gradFill" => Fill::Gradient(parse_gradient(node)?),
            "blipFill" => match node.child("blip") {
                Some(blip) => Fill::Image {
                    source: ctx.image_source(blip)?,
                    tile: node.has_child("tile"),
                },
                None => Fill::None,
            },
            // Patterns degrade to their foreground color
            "pattFill" => Fill::Solid {
                color: match node.child("fgClr") {
                    Some(fg) => parse_color(fg)?.unwrap_or_default(),
                    None => ColorInfo::default(),
                },
            },
            "grpFill" => group_fill.cloned().unwrap_or_default(),
            _ => continue,
        };
        return Ok(Some(fill));
    }
    Ok(None)
}

fn parse_gradient(grad: &XmlElement) -> Result<GradientFill> {
    let mut stops = Vec::new();
    if let Some(list) = grad.child("gsLst") {
        for gs in list.children_named("gs") {
            let position = percent_fraction(gs.attr_percent("pos")?.unwrap_or(0));
            let color = parse_color(gs)?.unwrap_or_default();
            stops.push(GradientStop { position, color });
        }
    }
    stops.sort_by(|a, b| a.position.total_cmp(&b.position));

    let kind = if let Some(lin) = grad.child("lin") {
        GradientKind::Linear {
            angle: angle_to_degrees(lin.attr_i64("ang")?.unwrap_or(0)),
        }
    } else if let Some(path) = grad.child("path") {
        match path.attr("path") {
            Some("circle") => GradientKind::Radial,
            Some("rect") => GradientKind::Rectangular,
            _ => GradientKind::Path,
        }
    } else {
        GradientKind::Linear { angle: 0.0 }
    };

    Ok(GradientFill { kind, stops })
}

/// Decode an `a:ln` outline. `Ok(None)` when the line is explicitly
/// unfilled.
pub fn parse_stroke(ln: &XmlElement, ctx: &PartContext<'_>) -> Result<Option<Stroke>> {
    if ln.has_child("noFill") {
        return Ok(None);
    }

    let mut stroke = Stroke {
        width: ctx.px(ln.attr_i64("w")?.unwrap_or(DEFAULT_LINE_WIDTH_EMU).max(0)),
        ..Default::default()
    };
    if let Some(cap) = ln.attr("cap") {
        stroke.cap = LineCap::from_ooxml(cap);
    }
    if let Some(fill) = ln.child("solidFill") {
        if let Some(color) = parse_color(fill)? {
            stroke.color = color;
        }
    } else if let Some(grad) = ln.child("gradFill") {
        // Outlines have a single color; use the first stop
        if let Some(first) = parse_gradient(grad)?.stops.into_iter().next() {
            stroke.color = first.color;
        }
    }
    if let Some(dash) = ln.child("prstDash").and_then(|d| d.attr("val")) {
        stroke.dash = DashType::from_ooxml(dash);
    }
    stroke.join = if ln.has_child("bevel") {
        LineJoin::Bevel
    } else if ln.has_child("miter") {
        LineJoin::Miter
    } else {
        LineJoin::Round
    };

    Ok(Some(stroke))
}

/// Decode `a:headEnd` / `a:tailEnd`.
pub fn parse_arrow_head(end: Option<&XmlElement>) -> Option<ArrowHead> {
    let end = end?;
    let kind = ArrowType::from_ooxml(end.attr("type")?)?;
    Some(ArrowHead {
        kind,
        width: end.attr("w").map(ArrowSize::from_ooxml).unwrap_or_default(),
        length: end.attr("len").map(ArrowSize::from_ooxml).unwrap_or_default(),
    })
}

/// Fill from a shape style's `a:fillRef`, when it references a theme fill.
pub fn style_fill(style: Option<&XmlElement>) -> Result<Option<Fill>> {
    let Some(fill_ref) = style.and_then(|s| s.child("fillRef")) else {
        return Ok(None);
    };
    if fill_ref.attr_i64("idx")?.unwrap_or(0) == 0 {
        return Ok(None);
    }
    Ok(parse_color(fill_ref)?.map(|color| Fill::Solid { color }))
}

/// Outline from a shape style's `a:lnRef`, when it references a theme line.
pub fn style_stroke(style: Option<&XmlElement>, ctx: &PartContext<'_>) -> Result<Option<Stroke>> {
    let Some(ln_ref) = style.and_then(|s| s.child("lnRef")) else {
        return Ok(None);
    };
    if ln_ref.attr_i64("idx")?.unwrap_or(0) == 0 {
        return Ok(None);
    }
    Ok(parse_color(ln_ref)?.map(|color| Stroke {
        color,
        width: ctx.px(DEFAULT_LINE_WIDTH_EMU),
        ..Default::default()
    }))
}
