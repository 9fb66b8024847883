//! Text body parsing (`p:txBody` / `a:txBody`).

use crate::color::parse_color;
use crate::container::Relationships;
use crate::error::Result;
use crate::model::{
    Autofit, Baseline, FontStyle, FontWeight, Hyperlink, Insets, LineSpacing, ListInfo, ListType,
    Paragraph, RunStyle, TextAlignment, TextBody, TextRun, VerticalAlign,
};
use crate::units::{emu_to_pixels, font_size_to_points, percent_ratio};
use crate::xml::XmlElement;

/// Parses text bodies of one part.
///
/// Hyperlinks resolve through the owning part's relationships; lengths are
/// converted to pixels and multiplied by `scale`.
pub struct TextParser<'a> {
    rels: &'a Relationships,
    scale: f64,
}

impl<'a> TextParser<'a> {
    pub fn new(rels: &'a Relationships, scale: f64) -> Self {
        Self { rels, scale }
    }

    fn px(&self, emu: i64) -> f64 {
        emu_to_pixels(emu) * self.scale
    }

    /// Parse a `txBody` element.
    pub fn parse_body(&self, tx_body: &XmlElement) -> Result<TextBody> {
        let mut body = TextBody::default();

        if let Some(body_pr) = tx_body.child("bodyPr") {
            if body_pr.attr("wrap") == Some("none") {
                body.wrap = false;
            }
            if let Some(anchor) = body_pr.attr("anchor") {
                body.vertical_align = VerticalAlign::from_ooxml(anchor);
            }

            let defaults = Insets::default();
            body.insets = Insets {
                left: self.inset(body_pr, "lIns", defaults.left)?,
                top: self.inset(body_pr, "tIns", defaults.top)?,
                right: self.inset(body_pr, "rIns", defaults.right)?,
                bottom: self.inset(body_pr, "bIns", defaults.bottom)?,
            };

            body.autofit = if let Some(norm) = body_pr.child("normAutofit") {
                let font_scale = norm.attr_i64("fontScale")?.map(percent_ratio).unwrap_or(1.0);
                Autofit::Normal { font_scale }
            } else if body_pr.has_child("spAutoFit") {
                Autofit::Shape
            } else {
                Autofit::None
            };
        }

        for p in tx_body.children_named("p") {
            body.paragraphs.push(self.parse_paragraph(p)?);
        }

        Ok(body)
    }

    fn inset(&self, body_pr: &XmlElement, name: &str, default_px: f64) -> Result<f64> {
        Ok(match body_pr.attr_i64(name)? {
            Some(emu) => self.px(emu),
            None => default_px * self.scale,
        })
    }

    /// Parse an `a:p` paragraph.
    pub fn parse_paragraph(&self, p: &XmlElement) -> Result<Paragraph> {
        let mut para = Paragraph::default();

        if let Some(ppr) = p.child("pPr") {
            if let Some(algn) = ppr.attr("algn") {
                para.alignment = TextAlignment::from_ooxml(algn);
            }
            para.level = ppr.attr_i64("lvl")?.unwrap_or(0).clamp(0, 8) as u8;
            para.margin_left = ppr.attr_i64("marL")?.map(|v| self.px(v)).unwrap_or(0.0);
            para.indent = ppr.attr_i64("indent")?.map(|v| self.px(v)).unwrap_or(0.0);
            para.list_info = parse_bullet(ppr, para.level)?;
            para.line_spacing = parse_line_spacing(ppr)?;
        }

        for node in p.elements() {
            match node.local_name() {
                "r" => {
                    let style = self.run_style(node.child("rPr"))?;
                    let hyperlink = self.hyperlink(node.child("rPr"));
                    let text = node.child("t").map(XmlElement::text).unwrap_or_default();
                    para.add_run(TextRun {
                        text,
                        style,
                        hyperlink,
                        field: false,
                    });
                }
                "br" => {
                    para.add_run(TextRun::line_break(self.run_style(node.child("rPr"))?));
                }
                "fld" => {
                    let style = self.run_style(node.child("rPr"))?;
                    let text = node.child("t").map(XmlElement::text).unwrap_or_default();
                    para.add_run(TextRun {
                        text,
                        style,
                        hyperlink: None,
                        field: true,
                    });
                }
                _ => {}
            }
        }

        para.merge_adjacent_runs();
        Ok(para)
    }

    /// Decode run properties (`a:rPr`, `a:defRPr`, `a:endParaRPr`).
    pub fn run_style(&self, rpr: Option<&XmlElement>) -> Result<RunStyle> {
        let Some(rpr) = rpr else {
            return Ok(RunStyle::default());
        };

        let mut style = RunStyle {
            font_size: rpr.attr_i64("sz")?.map(font_size_to_points),
            ..Default::default()
        };
        if rpr.attr_bool("b")?.unwrap_or(false) {
            style.weight = FontWeight::Bold;
        }
        if rpr.attr_bool("i")?.unwrap_or(false) {
            style.style = FontStyle::Italic;
        }
        style.underline = rpr.attr("u").is_some_and(|u| u != "none");
        style.strikethrough = rpr.attr("strike").is_some_and(|s| s != "noStrike");
        style.baseline = match rpr.attr_i64("baseline")? {
            Some(v) if v > 0 => Baseline::Superscript,
            Some(v) if v < 0 => Baseline::Subscript,
            _ => Baseline::Normal,
        };

        let typeface = |name: &str| {
            rpr.child(name)
                .and_then(|f| f.attr("typeface"))
                .filter(|t| !t.is_empty())
                .map(str::to_string)
        };
        style.font_family = typeface("latin");
        style.east_asian_font = typeface("ea");
        style.complex_script_font = typeface("cs");

        if let Some(fill) = rpr.child("solidFill") {
            style.color = parse_color(fill)?;
        }

        Ok(style)
    }

    fn hyperlink(&self, rpr: Option<&XmlElement>) -> Option<Hyperlink> {
        let click = rpr?.child("hlinkClick")?;
        let rel_id = click.attr("r:id").unwrap_or_default().to_string();
        let url = self.rels.get(&rel_id).map(|r| r.target.clone());
        if rel_id.is_empty() && url.is_none() {
            return None;
        }
        Some(Hyperlink {
            rel_id,
            url,
            tooltip: click.attr("tooltip").map(str::to_string),
        })
    }
}

fn parse_bullet(ppr: &XmlElement, level: u8) -> Result<Option<ListInfo>> {
    if ppr.has_child("buNone") {
        return Ok(None);
    }
    let list_type = if let Some(bu) = ppr.child("buChar") {
        ListType::Bullet {
            character: bu.attr("char").unwrap_or("\u{2022}").to_string(),
        }
    } else if let Some(bu) = ppr.child("buAutoNum") {
        ListType::Numbered {
            scheme: bu.attr("type").unwrap_or("arabicPeriod").to_string(),
            start_at: bu.attr_i64("startAt")?.unwrap_or(1).max(1) as u32,
        }
    } else {
        return Ok(None);
    };
    Ok(Some(ListInfo { list_type, level }))
}

fn parse_line_spacing(ppr: &XmlElement) -> Result<Option<LineSpacing>> {
    let Some(ln) = ppr.child("lnSpc") else {
        return Ok(None);
    };
    if let Some(pct) = ln.child("spcPct") {
        return Ok(pct.attr_i64("val")?.map(|v| LineSpacing::Percent(percent_ratio(v))));
    }
    if let Some(pts) = ln.child("spcPts") {
        return Ok(pts
            .attr_i64("val")?
            .map(|v| LineSpacing::Points(font_size_to_points(v))));
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{ColorKind, Rgb};
    use crate::container::Relationship;
    use crate::xml::decode;

    fn parse(xml: &str) -> Result<TextBody> {
        let mut rels = Relationships::new();
        rels.add(Relationship {
            id: "rId5".into(),
            rel_type: "http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink".into(),
            target: "https://example.com".into(),
            external: true,
        });
        let root = decode(xml).unwrap();
        TextParser::new(&rels, 1.0).parse_body(&root)
    }

    #[test]
    fn test_runs_and_styles() {
        let body = parse(
            r#"<p:txBody xmlns:a="a" xmlns:p="p" xmlns:r="r">
                <a:bodyPr wrap="none" anchor="ctr" lIns="0"><a:normAutofit fontScale="85000"/></a:bodyPr>
                <a:p>
                  <a:pPr algn="ctr"/>
                  <a:r><a:rPr lang="en-US" sz="2400" b="1"><a:solidFill><a:srgbClr val="FF0000"/></a:solidFill><a:latin typeface="Calibri"/></a:rPr><a:t>Hello</a:t></a:r>
                  <a:br/>
                  <a:r><a:rPr i="1" u="sng"><a:hlinkClick r:id="rId5"/></a:rPr><a:t>link</a:t></a:r>
                  <a:fld type="slidenum"><a:t>3</a:t></a:fld>
                </a:p>
              </p:txBody>"#,
        )
        .unwrap();

        assert!(!body.wrap);
        assert_eq!(body.vertical_align, VerticalAlign::Middle);
        assert_eq!(body.insets.left, 0.0);
        assert_eq!(body.insets.top, 4.8);
        assert!(matches!(body.autofit, Autofit::Normal { font_scale } if (font_scale - 0.85).abs() < 1e-9));

        let para = &body.paragraphs[0];
        assert_eq!(para.alignment, TextAlignment::Center);
        assert_eq!(para.runs.len(), 4);

        let first = &para.runs[0];
        assert_eq!(first.text, "Hello");
        assert_eq!(first.style.font_size, Some(24.0));
        assert_eq!(first.style.weight, FontWeight::Bold);
        assert_eq!(first.style.font_family.as_deref(), Some("Calibri"));
        let color = first.style.color.as_ref().unwrap();
        assert_eq!(color.kind, ColorKind::Rgb { value: Rgb::new(1.0, 0.0, 0.0) });

        assert_eq!(para.runs[1].text, "\n");
        let link = &para.runs[2];
        assert!(link.style.underline);
        assert_eq!(link.style.style, FontStyle::Italic);
        assert_eq!(
            link.hyperlink.as_ref().and_then(|h| h.url.as_deref()),
            Some("https://example.com")
        );
        assert!(para.runs[3].field);
        assert_eq!(body.plain_text(), "Hello\nlink3");
    }

    #[test]
    fn test_bullets_and_spacing() {
        let body = parse(
            r#"<p:txBody xmlns:a="a" xmlns:p="p">
                <a:bodyPr/>
                <a:p><a:pPr lvl="1" marL="457200" indent="-228600"><a:lnSpc><a:spcPct val="150000"/></a:lnSpc><a:buChar char="-"/></a:pPr><a:r><a:t>one</a:t></a:r></a:p>
                <a:p><a:pPr><a:buAutoNum type="romanUcPeriod" startAt="3"/></a:pPr><a:r><a:t>two</a:t></a:r></a:p>
                <a:p><a:pPr><a:buNone/></a:pPr></a:p>
              </p:txBody>"#,
        )
        .unwrap();

        let first = &body.paragraphs[0];
        assert_eq!(first.level, 1);
        assert_eq!(first.margin_left, 48.0);
        assert_eq!(first.indent, -24.0);
        assert_eq!(first.line_spacing, Some(LineSpacing::Percent(1.5)));
        assert_eq!(
            first.list_info.as_ref().map(|l| &l.list_type),
            Some(&ListType::Bullet {
                character: "-".into()
            })
        );

        let second = &body.paragraphs[1];
        assert_eq!(
            second.list_info.as_ref().map(|l| &l.list_type),
            Some(&ListType::Numbered {
                scheme: "romanUcPeriod".into(),
                start_at: 3
            })
        );
        assert!(body.paragraphs[2].list_info.is_none());
        assert!(body.paragraphs[2].is_empty());
    }

    #[test]
    fn test_invalid_size_is_error() {
        let result = parse(
            r#"<p:txBody xmlns:a="a" xmlns:p="p"><a:p><a:r><a:rPr sz="big"/><a:t>x</a:t></a:r></a:p></p:txBody>"#,
        );
        assert!(result.is_err());
    }
}
