//! Slide, layout and master part parsing.

use super::mapper::{ElementMapper, MapOutput, PartKind};
use super::style::{parse_fill, PartContext};
use crate::color::parse_color;
use crate::error::{Error, Result};
use crate::model::Fill;
use crate::xml::XmlElement;

/// Root element name each part kind must have.
pub fn expected_root(kind: PartKind) -> &'static str {
    match kind {
        PartKind::Slide => "sld",
        PartKind::Layout => "sldLayout",
        PartKind::Master => "sldMaster",
    }
}

/// Decoded content of a slide-like part.
#[derive(Debug, Clone, Default)]
pub struct SlideContent {
    /// `p:cSld@name`
    pub name: Option<String>,
    /// `p:sld@show="0"`
    pub hidden: bool,
    pub background: Option<Fill>,
    /// Elements, warnings and element errors from the shape tree
    pub output: MapOutput,
}

/// Check the root element of a slide-like part.
pub fn check_root(root: &XmlElement, kind: PartKind, path: &str) -> Result<()> {
    let expected = expected_root(kind);
    if root.is(expected) {
        Ok(())
    } else {
        Err(Error::InvalidStructure(format!(
            "{}: expected <{}> root, found <{}>",
            path, expected, root.name
        )))
    }
}

/// Parse a slide-like part: root check, name, background and shape tree.
///
/// Fails only when the root element is wrong; problems inside the part end
/// up as warnings in [`SlideContent::output`].
pub fn parse_slide_part(
    root: &XmlElement,
    kind: PartKind,
    mapper: &ElementMapper<'_>,
    ctx: &PartContext<'_>,
    index: usize,
    id: &str,
) -> Result<SlideContent> {
    check_root(root, kind, ctx.part_path)?;

    let c_sld = root.child("cSld");
    let mut content = SlideContent {
        name: c_sld
            .and_then(|c| c.attr("name"))
            .filter(|n| !n.is_empty())
            .map(str::to_string),
        hidden: root.attr("show").is_some_and(|s| s == "0" || s == "false"),
        ..Default::default()
    };

    if let Some(sp_tree) = c_sld.and_then(|c| c.child("spTree")) {
        content.output = mapper.map(sp_tree, index, id);
    }

    if let Some(bg) = c_sld.and_then(|c| c.child("bg")) {
        match parse_background(bg, ctx) {
            Ok(fill) => content.background = fill,
            Err(err) => {
                let warning = format!("{} {}: background skipped: {}", kind.label(), index + 1, err);
                log::warn!("{}", warning);
                content.output.warnings.push(warning);
            }
        }
    }

    Ok(content)
}

/// Decode `p:bg`: explicit properties (`p:bgPr`) or a theme reference
/// (`p:bgRef`) carrying a color.
pub fn parse_background(bg: &XmlElement, ctx: &PartContext<'_>) -> Result<Option<Fill>> {
    if let Some(bg_pr) = bg.child("bgPr") {
        return parse_fill(bg_pr, ctx, None);
    }
    if let Some(bg_ref) = bg.child("bgRef") {
        return Ok(parse_color(bg_ref)?.map(|color| Fill::Solid { color }));
    }
    Ok(None)
}
