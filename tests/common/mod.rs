//! In-memory PPTX fixtures for integration tests.

#![allow(dead_code)]

use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

const NS: &str = r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main""#;
const REL_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

pub const THEME_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<a:theme xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" name="Office Theme">
  <a:themeElements>
    <a:clrScheme name="Office">
      <a:dk1><a:sysClr val="windowText" lastClr="000000"/></a:dk1>
      <a:lt1><a:sysClr val="window" lastClr="FFFFFF"/></a:lt1>
      <a:dk2><a:srgbClr val="44546A"/></a:dk2>
      <a:lt2><a:srgbClr val="E7E6E6"/></a:lt2>
      <a:accent1><a:srgbClr val="FF0000"/></a:accent1>
      <a:accent2><a:srgbClr val="ED7D31"/></a:accent2>
      <a:accent3><a:srgbClr val="A5A5A5"/></a:accent3>
      <a:accent4><a:srgbClr val="FFC000"/></a:accent4>
      <a:accent5><a:srgbClr val="5B9BD5"/></a:accent5>
      <a:accent6><a:srgbClr val="70AD47"/></a:accent6>
      <a:hlink><a:srgbClr val="0563C1"/></a:hlink>
      <a:folHlink><a:srgbClr val="954F72"/></a:folHlink>
    </a:clrScheme>
    <a:fontScheme name="Office">
      <a:majorFont><a:latin typeface="Calibri Light"/><a:ea typeface=""/><a:cs typeface=""/></a:majorFont>
      <a:minorFont><a:latin typeface="Calibri"/><a:ea typeface=""/><a:cs typeface=""/></a:minorFont>
    </a:fontScheme>
  </a:themeElements>
</a:theme>"#;

/// A 1x1 PNG.
pub const PNG: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
    0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F,
    0x15, 0xC4, 0x89, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0x00,
    0x01, 0x00, 0x00, 0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00, 0x00, 0x00, 0x00, 0x49,
    0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
];

struct SlideFixture {
    number: u32,
    body: SlideBody,
    /// Extra relationships: (id, short type, target)
    rels: Vec<(String, String, String)>,
    /// Whether the slide links `slideLayout1`
    layout: bool,
}

enum SlideBody {
    Shapes { shapes: String, background: Option<String> },
    Raw(String),
}

/// Builds a minimal but well-formed PPTX package.
///
/// Every slide uses `slideLayout1`, which belongs to `slideMaster1`, which
/// uses `theme1`. Parts are written to the archive in the order slides were
/// added.
pub struct DeckBuilder {
    slides: Vec<SlideFixture>,
    media: Vec<(String, Vec<u8>)>,
    theme: Option<String>,
    master_background: Option<String>,
    layout_shapes: String,
    slide_size: Option<(i64, i64)>,
    extra_declared: usize,
    missing_master: bool,
    master_xml: Option<String>,
    core: Option<String>,
}

impl Default for DeckBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DeckBuilder {
    pub fn new() -> Self {
        Self {
            slides: Vec::new(),
            media: Vec::new(),
            theme: Some(THEME_XML.to_string()),
            master_background: None,
            layout_shapes: String::new(),
            slide_size: None,
            extra_declared: 0,
            missing_master: false,
            master_xml: None,
            core: None,
        }
    }

    /// Add a slide whose shape tree holds `shapes`.
    pub fn slide(mut self, number: u32, shapes: &str) -> Self {
        self.slides.push(SlideFixture {
            number,
            body: SlideBody::Shapes {
                shapes: shapes.to_string(),
                background: None,
            },
            rels: Vec::new(),
            layout: true,
        });
        self
    }

    /// Add a slide with its own `p:bg` content.
    pub fn slide_with_background(mut self, number: u32, shapes: &str, bg: &str) -> Self {
        self.slides.push(SlideFixture {
            number,
            body: SlideBody::Shapes {
                shapes: shapes.to_string(),
                background: Some(bg.to_string()),
            },
            rels: Vec::new(),
            layout: true,
        });
        self
    }

    /// Add a slide part with arbitrary content.
    pub fn raw_slide(mut self, number: u32, xml: &str) -> Self {
        self.slides.push(SlideFixture {
            number,
            body: SlideBody::Raw(xml.to_string()),
            rels: Vec::new(),
            layout: true,
        });
        self
    }

    /// Add a relationship to the most recently added slide.
    pub fn rel(mut self, id: &str, short_type: &str, target: &str) -> Self {
        if let Some(slide) = self.slides.last_mut() {
            slide
                .rels
                .push((id.to_string(), short_type.to_string(), target.to_string()));
        }
        self
    }

    /// Drop the layout relationship of the most recently added slide.
    pub fn without_layout(mut self) -> Self {
        if let Some(slide) = self.slides.last_mut() {
            slide.layout = false;
        }
        self
    }

    /// Replace the master part with arbitrary content.
    pub fn raw_master(mut self, xml: &str) -> Self {
        self.master_xml = Some(xml.to_string());
        self
    }

    /// Declare a second master in the presentation part that has no part.
    pub fn declare_missing_master(mut self) -> Self {
        self.missing_master = true;
        self
    }

    pub fn media(mut self, name: &str, bytes: &[u8]) -> Self {
        self.media.push((name.to_string(), bytes.to_vec()));
        self
    }

    /// Replace the theme part; `None` leaves it out of the package.
    pub fn theme(mut self, xml: Option<&str>) -> Self {
        self.theme = xml.map(str::to_string);
        self
    }

    /// `p:bg` content of the master.
    pub fn master_background(mut self, bg: &str) -> Self {
        self.master_background = Some(bg.to_string());
        self
    }

    /// Shapes of the layout, typically placeholders.
    pub fn layout_shapes(mut self, shapes: &str) -> Self {
        self.layout_shapes = shapes.to_string();
        self
    }

    pub fn slide_size(mut self, cx: i64, cy: i64) -> Self {
        self.slide_size = Some((cx, cy));
        self
    }

    /// Declare slides in the presentation part that have no part.
    pub fn declare_missing_slides(mut self, count: usize) -> Self {
        self.extra_declared = count;
        self
    }

    pub fn core_properties(mut self, xml: &str) -> Self {
        self.core = Some(xml.to_string());
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut parts: Vec<(String, Vec<u8>)> = Vec::new();
        let mut add = |path: &str, content: String| parts.push((path.to_string(), content.into_bytes()));

        add(
            "[Content_Types].xml",
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="xml" ContentType="application/xml"/>
  <Default Extension="png" ContentType="image/png"/>
</Types>"#
                .to_string(),
        );
        add(
            "_rels/.rels",
            rels_xml(&[("rId1", "officeDocument", "ppt/presentation.xml")]),
        );
        if let Some(core) = &self.core {
            add("docProps/core.xml", core.clone());
        }

        // Presentation part, declaring slides in numeric order
        let mut ordered: Vec<u32> = self.slides.iter().map(|s| s.number).collect();
        ordered.sort_unstable();
        let mut pres_rels: Vec<(String, String, String)> = vec![
            ("rId1".into(), "slideMaster".into(), "slideMasters/slideMaster1.xml".into()),
            ("rId2".into(), "theme".into(), "theme/theme1.xml".into()),
        ];
        let mut master_ids =
            r#"<p:sldMasterId id="2147483648" r:id="rId1"/>"#.to_string();
        if self.missing_master {
            master_ids.push_str(r#"<p:sldMasterId id="2147483660" r:id="rId3"/>"#);
            pres_rels.push(("rId3".into(), "slideMaster".into(), "slideMasters/slideMaster9.xml".into()));
        }
        let mut sld_ids = String::new();
        let declared = ordered
            .iter()
            .copied()
            .chain((0..self.extra_declared).map(|i| 900 + i as u32));
        for (i, number) in declared.enumerate() {
            let rel_id = format!("rId{}", 10 + i);
            sld_ids.push_str(&format!(r#"<p:sldId id="{}" r:id="{}"/>"#, 256 + i, rel_id));
            pres_rels.push((rel_id, "slide".into(), format!("slides/slide{}.xml", number)));
        }
        let size = self
            .slide_size
            .map(|(cx, cy)| format!(r#"<p:sldSz cx="{}" cy="{}"/>"#, cx, cy))
            .unwrap_or_default();
        add(
            "ppt/presentation.xml",
            format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:presentation {NS}><p:sldMasterIdLst>{master_ids}</p:sldMasterIdLst><p:sldIdLst>{sld_ids}</p:sldIdLst>{size}<p:notesSz cx="6858000" cy="9144000"/></p:presentation>"#
            ),
        );
        add("ppt/_rels/presentation.xml.rels", rels_owned(&pres_rels));

        if let Some(theme) = &self.theme {
            add("ppt/theme/theme1.xml", theme.clone());
        }

        let master_bg = self
            .master_background
            .as_deref()
            .map(|bg| format!("<p:bg>{}</p:bg>", bg))
            .unwrap_or_default();
        let master = self.master_xml.clone().unwrap_or_else(|| {
            format!(
                r#"<p:sldMaster {NS}><p:cSld>{master_bg}{}</p:cSld></p:sldMaster>"#,
                sp_tree(
                    r#"<p:sp><p:nvSpPr><p:cNvPr id="2" name="Title Placeholder 1"/><p:cNvSpPr/><p:nvPr><p:ph type="title"/></p:nvPr></p:nvSpPr><p:spPr><a:xfrm><a:off x="838200" y="365125"/><a:ext cx="10515600" cy="1325563"/></a:xfrm><a:prstGeom prst="rect"/></p:spPr></p:sp>"#
                )
            )
        });
        add("ppt/slideMasters/slideMaster1.xml", master);
        add(
            "ppt/slideMasters/_rels/slideMaster1.xml.rels",
            rels_xml(&[
                ("rId1", "slideLayout", "../slideLayouts/slideLayout1.xml"),
                ("rId2", "theme", "../theme/theme1.xml"),
            ]),
        );
        add(
            "ppt/slideLayouts/slideLayout1.xml",
            format!(
                r#"<p:sldLayout {NS}><p:cSld name="Title and Content">{}</p:cSld></p:sldLayout>"#,
                sp_tree(&self.layout_shapes)
            ),
        );
        add(
            "ppt/slideLayouts/_rels/slideLayout1.xml.rels",
            rels_xml(&[("rId1", "slideMaster", "../slideMasters/slideMaster1.xml")]),
        );

        for slide in &self.slides {
            let path = format!("ppt/slides/slide{}.xml", slide.number);
            let content = match &slide.body {
                SlideBody::Shapes { shapes, background } => {
                    let bg = background
                        .as_deref()
                        .map(|bg| format!("<p:bg>{}</p:bg>", bg))
                        .unwrap_or_default();
                    format!(
                        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sld {NS}><p:cSld>{bg}{}</p:cSld></p:sld>"#,
                        sp_tree(shapes)
                    )
                }
                SlideBody::Raw(xml) => xml.clone(),
            };
            add(&path, content);

            let mut rels = Vec::new();
            if slide.layout {
                rels.push((
                    "rId1".to_string(),
                    "slideLayout".to_string(),
                    "../slideLayouts/slideLayout1.xml".to_string(),
                ));
            }
            rels.extend(slide.rels.iter().cloned());
            add(
                &format!("ppt/slides/_rels/slide{}.xml.rels", slide.number),
                rels_owned(&rels),
            );
        }

        let mut buffer = Vec::new();
        {
            let mut zip = ZipWriter::new(Cursor::new(&mut buffer));
            let options = SimpleFileOptions::default();
            for (path, bytes) in &parts {
                zip.start_file(path.as_str(), options).unwrap();
                zip.write_all(bytes).unwrap();
            }
            for (name, bytes) in &self.media {
                zip.start_file(format!("ppt/media/{}", name), options).unwrap();
                zip.write_all(bytes).unwrap();
            }
            zip.finish().unwrap();
        }
        buffer
    }
}

fn sp_tree(shapes: &str) -> String {
    format!(
        r#"<p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/>{}</p:spTree>"#,
        shapes
    )
}

fn rels_xml(rels: &[(&str, &str, &str)]) -> String {
    let owned: Vec<(String, String, String)> = rels
        .iter()
        .map(|(a, b, c)| (a.to_string(), b.to_string(), c.to_string()))
        .collect();
    rels_owned(&owned)
}

fn rels_owned(rels: &[(String, String, String)]) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    );
    for (id, kind, target) in rels {
        let mode = if target.starts_with("http") {
            r#" TargetMode="External""#
        } else {
            ""
        };
        xml.push_str(&format!(
            r#"<Relationship Id="{}" Type="{}/{}" Target="{}"{}/>"#,
            id, REL_NS, kind, target, mode
        ));
    }
    xml.push_str("</Relationships>");
    xml
}

/// A preset-geometry shape with a solid fill given as inner color XML.
pub fn shape(id: u32, name: &str, rect: (i64, i64, i64, i64), prst: &str, fill: &str) -> String {
    let (x, y, cx, cy) = rect;
    format!(
        r#"<p:sp><p:nvSpPr><p:cNvPr id="{id}" name="{name}"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr><p:spPr><a:xfrm><a:off x="{x}" y="{y}"/><a:ext cx="{cx}" cy="{cy}"/></a:xfrm><a:prstGeom prst="{prst}"><a:avLst/></a:prstGeom><a:solidFill>{fill}</a:solidFill></p:spPr></p:sp>"#
    )
}

/// A red rectangle.
pub fn rect(id: u32, rect: (i64, i64, i64, i64)) -> String {
    shape(id, &format!("Rectangle {}", id), rect, "rect", r#"<a:srgbClr val="FF0000"/>"#)
}

/// A text box with one paragraph.
pub fn text_box(id: u32, text: &str) -> String {
    format!(
        r#"<p:sp><p:nvSpPr><p:cNvPr id="{id}" name="TextBox {id}"/><p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr><p:spPr><a:xfrm><a:off x="914400" y="914400"/><a:ext cx="3657600" cy="457200"/></a:xfrm><a:prstGeom prst="rect"><a:avLst/></a:prstGeom><a:noFill/></p:spPr><p:txBody><a:bodyPr wrap="square"/><a:lstStyle/><a:p><a:r><a:rPr lang="en-US" sz="2400"/><a:t>{text}</a:t></a:r></a:p></p:txBody></p:sp>"#
    )
}

/// A picture referencing relationship `rel_id`.
pub fn picture(id: u32, rel_id: &str) -> String {
    format!(
        r#"<p:pic><p:nvPicPr><p:cNvPr id="{id}" name="Picture {id}" descr="logo"/><p:cNvPicPr/><p:nvPr/></p:nvPicPr><p:blipFill><a:blip r:embed="{rel_id}"/><a:stretch><a:fillRect/></a:stretch></p:blipFill><p:spPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="952500" cy="952500"/></a:xfrm><a:prstGeom prst="rect"/></p:spPr></p:pic>"#
    )
}

/// A title placeholder with text and no geometry of its own.
pub fn title_placeholder(id: u32, text: &str) -> String {
    format!(
        r#"<p:sp><p:nvSpPr><p:cNvPr id="{id}" name="Title {id}"/><p:cNvSpPr><a:spLocks noGrp="1"/></p:cNvSpPr><p:nvPr><p:ph type="title"/></p:nvPr></p:nvSpPr><p:spPr/><p:txBody><a:bodyPr/><a:lstStyle/><a:p><a:r><a:rPr lang="en-US"/><a:t>{text}</a:t></a:r></a:p></p:txBody></p:sp>"#
    )
}
