//! Presentation part parsing (`ppt/presentation.xml`).

use crate::container::{resolve_path, Relationships};
use crate::error::{Error, Result};
use crate::xml::XmlElement;

/// Path of the presentation part.
pub const PRESENTATION_PART: &str = "ppt/presentation.xml";

/// Natural slide width when `p:sldSz` is absent: 10 inches.
pub const DEFAULT_SLIDE_WIDTH_EMU: i64 = 9_144_000;
/// Natural slide height when `p:sldSz` is absent: 7.5 inches.
pub const DEFAULT_SLIDE_HEIGHT_EMU: i64 = 6_858_000;

/// A slide declared in `p:sldIdLst`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlideRef {
    /// Numeric slide id (`p:sldId@id`)
    pub id: u32,
    pub rel_id: String,
    /// Resolved part path, when the relationship exists
    pub path: Option<String>,
}

/// A master declared in `p:sldMasterIdLst`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MasterRef {
    pub rel_id: String,
    pub path: Option<String>,
}

/// Contents of the presentation part.
#[derive(Debug, Clone)]
pub struct PresentationInfo {
    pub slides: Vec<SlideRef>,
    pub masters: Vec<MasterRef>,
    /// Theme paths referenced by the presentation part
    pub themes: Vec<String>,
    pub slide_width_emu: i64,
    pub slide_height_emu: i64,
    pub warnings: Vec<String>,
}

impl PresentationInfo {
    /// Slide id declared for a slide part path.
    pub fn slide_id_for(&self, path: &str) -> Option<u32> {
        self.slides
            .iter()
            .find(|s| s.path.as_deref() == Some(path))
            .map(|s| s.id)
    }
}

/// Parse the presentation part.
///
/// The root must be `p:presentation`. Absent lists and sizes take their
/// defaults; a slide size that does not parse is replaced by the default
/// with a warning.
pub fn parse_presentation(root: &XmlElement, rels: &Relationships) -> Result<PresentationInfo> {
    if !root.is("presentation") {
        return Err(Error::InvalidStructure(format!(
            "{}: expected <presentation> root, found <{}>",
            PRESENTATION_PART, root.name
        )));
    }

    let target = |rel_id: &str| {
        rels.get(rel_id)
            .filter(|r| !r.external)
            .map(|r| resolve_path(PRESENTATION_PART, &r.target))
    };
    let mut warnings = Vec::new();

    let mut slides = Vec::new();
    if let Some(list) = root.child("sldIdLst") {
        for sld in list.children_named("sldId") {
            let rel_id = sld.attr("r:id").unwrap_or_default().to_string();
            let id = match sld.attr_i64("id") {
                Ok(Some(id)) => u32::try_from(id).unwrap_or(0),
                Ok(None) => 0,
                Err(err) => {
                    warnings.push(format!("presentation: {}", err));
                    0
                }
            };
            slides.push(SlideRef {
                id,
                path: target(&rel_id),
                rel_id,
            });
        }
    }

    let masters: Vec<MasterRef> = root
        .child("sldMasterIdLst")
        .map(|list| {
            list.children_named("sldMasterId")
                .map(|m| {
                    let rel_id = m.attr("r:id").unwrap_or_default().to_string();
                    MasterRef {
                        path: target(&rel_id),
                        rel_id,
                    }
                })
                .collect()
        })
        .unwrap_or_default();

    let themes: Vec<String> = rels
        .all_of("theme")
        .into_iter()
        .filter(|r| !r.external)
        .map(|r| resolve_path(PRESENTATION_PART, &r.target))
        .collect();

    let (mut width, mut height) = (DEFAULT_SLIDE_WIDTH_EMU, DEFAULT_SLIDE_HEIGHT_EMU);
    if let Some(size) = root.child("sldSz") {
        match (size.attr_i64("cx"), size.attr_i64("cy")) {
            (Ok(cx), Ok(cy)) => {
                width = cx.filter(|v| *v > 0).unwrap_or(DEFAULT_SLIDE_WIDTH_EMU);
                height = cy.filter(|v| *v > 0).unwrap_or(DEFAULT_SLIDE_HEIGHT_EMU);
            }
            (Err(err), _) | (_, Err(err)) => {
                warnings.push(format!("presentation: {}; using default slide size", err));
            }
        }
    }

    for warning in &warnings {
        log::warn!("{}", warning);
    }
    log::debug!(
        "presentation: {} slides, {} masters, size {}x{} EMU",
        slides.len(),
        masters.len(),
        width,
        height
    );

    Ok(PresentationInfo {
        slides,
        masters,
        themes,
        slide_width_emu: width,
        slide_height_emu: height,
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::Relationship;
    use crate::xml::decode;

    fn rels() -> Relationships {
        let mut rels = Relationships::new();
        for (id, kind, target) in [
            ("rId1", "slideMaster", "slideMasters/slideMaster1.xml"),
            ("rId2", "slide", "slides/slide1.xml"),
            ("rId3", "slide", "slides/slide2.xml"),
            ("rId5", "theme", "theme/theme1.xml"),
        ] {
            rels.add(Relationship {
                id: id.into(),
                rel_type: format!(
                    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/{}",
                    kind
                ),
                target: target.into(),
                external: false,
            });
        }
        rels
    }

    #[test]
    fn test_parse_presentation() {
        let root = decode(
            r#"<p:presentation xmlns:p="p" xmlns:r="r">
                <p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst>
                <p:sldIdLst><p:sldId id="256" r:id="rId2"/><p:sldId id="257" r:id="rId3"/></p:sldIdLst>
                <p:sldSz cx="12192000" cy="6858000"/>
              </p:presentation>"#,
        )
        .unwrap();
        let info = parse_presentation(&root, &rels()).unwrap();

        assert_eq!(info.slides.len(), 2);
        assert_eq!(info.slides[0].id, 256);
        assert_eq!(info.slides[1].path.as_deref(), Some("ppt/slides/slide2.xml"));
        assert_eq!(info.slide_id_for("ppt/slides/slide1.xml"), Some(256));
        assert_eq!(
            info.masters[0].path.as_deref(),
            Some("ppt/slideMasters/slideMaster1.xml")
        );
        assert_eq!(info.themes, vec!["ppt/theme/theme1.xml".to_string()]);
        assert_eq!(info.slide_width_emu, 12_192_000);
        assert!(info.warnings.is_empty());
    }

    #[test]
    fn test_defaults_and_bad_size() {
        let root = decode(r#"<p:presentation xmlns:p="p"/>"#).unwrap();
        let info = parse_presentation(&root, &Relationships::new()).unwrap();
        assert!(info.slides.is_empty());
        assert_eq!(info.slide_width_emu, DEFAULT_SLIDE_WIDTH_EMU);
        assert_eq!(info.slide_height_emu, DEFAULT_SLIDE_HEIGHT_EMU);

        let root = decode(r#"<p:presentation xmlns:p="p"><p:sldSz cx="wide" cy="6858000"/></p:presentation>"#).unwrap();
        let info = parse_presentation(&root, &Relationships::new()).unwrap();
        assert_eq!(info.slide_width_emu, DEFAULT_SLIDE_WIDTH_EMU);
        assert_eq!(info.warnings.len(), 1);
    }

    #[test]
    fn test_wrong_root() {
        let root = decode(r#"<p:sld xmlns:p="p"/>"#).unwrap();
        assert!(matches!(
            parse_presentation(&root, &Relationships::new()),
            Err(Error::InvalidStructure(_))
        ));
    }
}
