//! End-to-end decode tests over in-memory packages.

mod common;

use common::{picture, rect, shape, text_box, title_placeholder, DeckBuilder, PNG, THEME_XML};
use pptxdom::color::{ColorKind, Rgb};
use pptxdom::model::{ElementKind, Fill, ShapeType, Theme};
use pptxdom::{
    CancellationToken, Decoder, ImportSettings, ParseResult, ProgressEvent, ProgressStage,
    TargetSlideSize,
};
use std::io::{Cursor, Write};
use std::sync::Mutex;

/// Settings whose target canvas equals the natural 4:3 slide, so the scale
/// is exactly 1.
fn natural() -> ImportSettings {
    ImportSettings::default().with_target_size(TargetSlideSize::Custom {
        width: 960,
        height: 720,
    })
}

fn decode(bytes: Vec<u8>, settings: ImportSettings) -> ParseResult {
    Decoder::new(settings).decode(bytes, "test.pptx")
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}

#[test]
fn test_rectangle_geometry_at_natural_scale() {
    let deck = DeckBuilder::new()
        .slide(1, &rect(2, (914_400, 914_400, 1_828_800, 1_828_800)))
        .build();
    let result = decode(deck, natural());

    assert!(result.success, "{:?}", result.errors);
    assert!(result.warnings.is_empty(), "{:?}", result.warnings);
    let pres = result.data.unwrap();
    assert!(approx(pres.slide_size.scale, 1.0));
    assert!(approx(pres.slide_size.width, 960.0));

    let element = &pres.slides[0].elements[0];
    assert_eq!(element.id, "256:2");
    assert!(approx(element.x, 96.0));
    assert!(approx(element.y, 96.0));
    assert!(approx(element.width, 192.0));
    assert!(approx(element.height, 192.0));

    let ElementKind::Shape(shape) = &element.kind else {
        panic!("expected a shape, got {}", element.kind_name());
    };
    assert_eq!(shape.shape_type, ShapeType::Rectangle);
    let Fill::Solid { color } = &shape.fill else {
        panic!("expected a solid fill");
    };
    assert_eq!(color.resolve(None), Rgb::new(1.0, 0.0, 0.0));
}

#[test]
fn test_default_target_scales_geometry() {
    let deck = DeckBuilder::new()
        .slide(1, &rect(2, (914_400, 914_400, 1_828_800, 1_828_800)))
        .build();
    let pres = decode(deck, ImportSettings::default()).data.unwrap();

    // 960x720 fitted into 1920x1080 is limited by height: 1.5
    assert!(approx(pres.slide_size.scale, 1.5));
    assert!(approx(pres.slide_size.height, 1080.0));
    let element = &pres.slides[0].elements[0];
    assert!(approx(element.x, 144.0));
    assert!(approx(element.width, 288.0));
}

#[test]
fn test_scheme_colors_resolved_through_theme() {
    let deck = DeckBuilder::new()
        .slide(
            1,
            &shape(
                2,
                "Accent",
                (0, 0, 952_500, 952_500),
                "ellipse",
                r#"<a:schemeClr val="accent1"><a:tint val="50000"/></a:schemeClr>"#,
            ),
        )
        .build();
    let pres = decode(deck, natural()).data.unwrap();

    let ElementKind::Shape(shape) = &pres.slides[0].elements[0].kind else {
        panic!("expected a shape");
    };
    assert_eq!(shape.shape_type, ShapeType::Ellipse);
    let Fill::Solid { color } = &shape.fill else {
        panic!("expected a solid fill");
    };
    // Theme accent1 is FF0000; the tint modifier survives substitution
    assert_eq!(
        color.kind,
        ColorKind::Rgb {
            value: Rgb::new(1.0, 0.0, 0.0)
        }
    );
    assert!(approx(color.tint, 0.5));
}

#[test]
fn test_malformed_slide_is_skipped_with_one_warning() {
    let deck = DeckBuilder::new()
        .slide(1, &text_box(2, "Hello"))
        .raw_slide(2, "<p:sld><p:cSld><p:spTree>")
        .build();
    let result = decode(deck, natural());

    assert!(result.success);
    let pres = result.data.unwrap();
    assert_eq!(pres.slide_count, 1);
    assert_eq!(pres.slides[0].number, 1);
    assert_eq!(pres.slides[0].plain_text(), "Hello");

    let about_slide_2: Vec<_> = result
        .warnings
        .iter()
        .filter(|w| w.contains("slide 2"))
        .collect();
    assert_eq!(about_slide_2.len(), 1, "{:?}", result.warnings);
    assert_eq!(result.warnings.len(), 1, "{:?}", result.warnings);
}

#[test]
fn test_wrong_root_slide_is_skipped() {
    let deck = DeckBuilder::new()
        .raw_slide(1, r#"<p:notes xmlns:p="p"/>"#)
        .slide(2, &text_box(2, "Kept"))
        .build();
    let result = decode(deck, natural());

    let pres = result.data.unwrap();
    assert_eq!(pres.slide_count, 1);
    assert_eq!(pres.slides[0].number, 2);
    assert_eq!(
        result.warnings.iter().filter(|w| w.contains("slide 1")).count(),
        1
    );
}

#[test]
fn test_slides_ordered_by_numeric_suffix() {
    let deck = DeckBuilder::new()
        .slide(10, &text_box(2, "ten"))
        .slide(2, &text_box(2, "two"))
        .slide(1, &text_box(2, "one"))
        .build();
    let pres = decode(deck, natural()).data.unwrap();

    let numbers: Vec<u32> = pres.slides.iter().map(|s| s.number).collect();
    assert_eq!(numbers, vec![1, 2, 10]);
    assert_eq!(pres.slides[2].plain_text(), "ten");
    assert_eq!(pres.slides[0].name, "Slide 1");
}

#[test]
fn test_decode_is_idempotent() {
    let deck = DeckBuilder::new()
        .slide(1, &rect(2, (0, 0, 9525, 9525)))
        .slide(2, &text_box(3, "Same"))
        .build();

    let first = decode(deck.clone(), natural());
    let second = decode(deck, natural());
    assert_eq!(first.warnings, second.warnings);
    assert_eq!(
        serde_json::to_value(first.data.unwrap()).unwrap(),
        serde_json::to_value(second.data.unwrap()).unwrap()
    );
}

#[test]
fn test_parallel_matches_sequential() {
    let mut builder = DeckBuilder::new();
    for n in 1..=6 {
        builder = builder.slide(
            n,
            &format!(
                "{}{}",
                rect(2, (n as i64 * 9525, 0, 95_250, 95_250)),
                text_box(3, &format!("Slide text {}", n))
            ),
        );
    }
    let deck = builder.raw_slide(7, "not xml at all").build();

    let sequential = decode(deck.clone(), natural());
    let parallel = decode(deck, natural().with_parallel(true));
    assert_eq!(sequential.warnings, parallel.warnings);
    assert_eq!(
        serde_json::to_value(sequential.data.unwrap()).unwrap(),
        serde_json::to_value(parallel.data.unwrap()).unwrap()
    );
}

#[test]
fn test_malformed_theme_falls_back_to_default() {
    let deck = DeckBuilder::new()
        .theme(Some("<a:theme><a:themeElements>"))
        .slide(1, &text_box(2, "Hi"))
        .build();
    let result = decode(deck, natural());

    assert!(result.success);
    assert!(result.warnings.iter().any(|w| w.starts_with("theme theme1")));
    let pres = result.data.unwrap();
    assert_eq!(pres.themes, vec![Theme::default_theme("theme1")]);
    assert_eq!(pres.slide_count, 1);
}

#[test]
fn test_missing_theme_uses_default_quietly() {
    let deck = DeckBuilder::new()
        .theme(None)
        .slide(
            1,
            &shape(2, "S", (0, 0, 9525, 9525), "rect", r#"<a:schemeClr val="accent1"/>"#),
        )
        .build();
    let result = decode(deck, natural());

    assert!(result.warnings.is_empty(), "{:?}", result.warnings);
    let pres = result.data.unwrap();
    assert!(pres.themes.is_empty());
    let ElementKind::Shape(shape) = &pres.slides[0].elements[0].kind else {
        panic!("expected a shape");
    };
    let Fill::Solid { color } = &shape.fill else {
        panic!("expected a solid fill");
    };
    assert!(!color.is_scheme());
    let default_accent = Theme::default_theme("x").color_scheme.accent1.resolve(None);
    assert_eq!(color.resolve(None), default_accent);
}

fn accent1_fill(pres: &pptxdom::Presentation) -> Rgb {
    let ElementKind::Shape(shape) = &pres.slides[0].elements[0].kind else {
        panic!("expected a shape");
    };
    let Fill::Solid { color } = &shape.fill else {
        panic!("expected a solid fill");
    };
    assert!(!color.is_scheme());
    color.resolve(None)
}

fn accent1_shape() -> String {
    shape(2, "S", (0, 0, 9525, 9525), "rect", r#"<a:schemeClr val="accent1"/>"#)
}

#[test]
fn test_slide_without_layout_uses_deck_theme() {
    let deck = DeckBuilder::new()
        .slide(1, &accent1_shape())
        .without_layout()
        .build();
    let result = decode(deck, natural());

    assert!(result.success, "{:?}", result.errors);
    let pres = result.data.unwrap();
    assert!(pres.slides[0].layout_ref.is_none());
    assert!(pres.slides[0].master_ref.is_none());
    // theme1 declares accent1 as FF0000, not the Office blue
    assert_eq!(accent1_fill(&pres), Rgb::new(1.0, 0.0, 0.0));
}

#[test]
fn test_broken_master_keeps_deck_theme() {
    let deck = DeckBuilder::new()
        .raw_master("<p:sldMaster><p:cSld>")
        .slide(1, &accent1_shape())
        .build();
    let result = decode(deck, natural());

    assert!(result.success, "{:?}", result.errors);
    assert!(
        result.warnings.iter().any(|w| w.starts_with("master 1: skipped")),
        "{:?}",
        result.warnings
    );
    let pres = result.data.unwrap();
    assert!(pres.masters.is_empty());
    assert_eq!(pres.slide_count, 1);
    assert_eq!(accent1_fill(&pres), Rgb::new(1.0, 0.0, 0.0));
}

#[test]
fn test_declared_master_without_part_warns() {
    let deck = DeckBuilder::new()
        .declare_missing_master()
        .slide(1, &text_box(2, "Hi"))
        .build();
    let result = decode(deck, natural());

    assert!(result.success);
    assert_eq!(
        result.warnings,
        vec![
            "presentation declares master ppt/slideMasters/slideMaster9.xml but the part is missing"
                .to_string()
        ]
    );
    assert_eq!(result.data.unwrap().masters.len(), 1);
}

#[test]
fn test_unfilled_outlines_stay_invisible() {
    let deck = DeckBuilder::new()
        .slide(
            1,
            r#"<p:cxnSp><p:nvCxnSpPr><p:cNvPr id="2" name="Hidden Connector"/><p:cNvCxnSpPr/><p:nvPr/></p:nvCxnSpPr>
                 <p:spPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="914400" cy="0"/></a:xfrm><a:prstGeom prst="straightConnector1"/>
                 <a:ln w="12700"><a:noFill/></a:ln></p:spPr></p:cxnSp>
               <p:sp><p:nvSpPr><p:cNvPr id="3" name="Borderless"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr>
                 <p:spPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="914400" cy="914400"/></a:xfrm><a:prstGeom prst="ellipse"/>
                 <a:solidFill><a:srgbClr val="00FF00"/></a:solidFill><a:ln><a:noFill/></a:ln></p:spPr></p:sp>"#,
        )
        .build();
    let pres = decode(deck, natural()).data.unwrap();
    let elements = &pres.slides[0].elements;
    assert_eq!(elements.len(), 2);

    let ElementKind::Line(line) = &elements[0].kind else {
        panic!("expected a line, got {}", elements[0].kind_name());
    };
    assert!(line.stroke.is_none());
    let ElementKind::Shape(shape) = &elements[1].kind else {
        panic!("expected a shape, got {}", elements[1].kind_name());
    };
    assert!(shape.stroke.is_none());

    let json = serde_json::to_value(&elements[0]).unwrap();
    assert!(json.get("stroke").is_none());
}

#[test]
fn test_theme_fonts_resolved() {
    let deck = DeckBuilder::new()
        .slide(
            1,
            r#"<p:sp><p:nvSpPr><p:cNvPr id="2" name="T"/><p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr>
               <p:spPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="9525" cy="9525"/></a:xfrm></p:spPr>
               <p:txBody><a:bodyPr/><a:p><a:r><a:rPr><a:latin typeface="+mj-lt"/></a:rPr><a:t>Heading</a:t></a:r></a:p></p:txBody></p:sp>"#,
        )
        .build();
    let pres = decode(deck, natural()).data.unwrap();
    let body = pres.slides[0].elements[0].text_body().unwrap();
    assert_eq!(
        body.paragraphs[0].runs[0].style.font_family.as_deref(),
        Some("Calibri Light")
    );
}

#[test]
fn test_placeholder_inherits_master_geometry() {
    let deck = DeckBuilder::new()
        .slide(1, &title_placeholder(2, "Agenda"))
        .build();
    let pres = decode(deck, natural()).data.unwrap();

    let element = &pres.slides[0].elements[0];
    assert_eq!(element.placeholder.as_deref(), Some("title"));
    assert!(approx(element.x, 838_200.0 / 9525.0));
    assert!(approx(element.width, 10_515_600.0 / 9525.0));
    assert_eq!(element.plain_text(), "Agenda");
}

#[test]
fn test_layout_geometry_wins_over_master() {
    let layout_title = r#"<p:sp><p:nvSpPr><p:cNvPr id="2" name="Title 1"/><p:cNvSpPr/><p:nvPr><p:ph type="title"/></p:nvPr></p:nvSpPr><p:spPr><a:xfrm><a:off x="95250" y="190500"/><a:ext cx="952500" cy="95250"/></a:xfrm></p:spPr></p:sp>"#;
    let deck = DeckBuilder::new()
        .layout_shapes(layout_title)
        .slide(1, &title_placeholder(2, "Agenda"))
        .build();
    let pres = decode(deck, natural()).data.unwrap();

    let element = &pres.slides[0].elements[0];
    assert!(approx(element.x, 10.0));
    assert!(approx(element.y, 20.0));
    assert!(approx(element.width, 100.0));
    assert_eq!(
        pres.slides[0].layout_ref.as_deref(),
        Some("ppt/slideLayouts/slideLayout1.xml")
    );
    assert_eq!(pres.slides[0].master_ref.as_deref(), Some("master1"));
}

#[test]
fn test_master_background_inheritance() {
    let bg = r#"<p:bgPr><a:solidFill><a:schemeClr val="accent1"/></a:solidFill><a:effectLst/></p:bgPr>"#;
    let own = r#"<p:bgPr><a:solidFill><a:srgbClr val="00FF00"/></a:solidFill></p:bgPr>"#;
    let build = || {
        DeckBuilder::new()
            .master_background(bg)
            .slide(1, "")
            .slide_with_background(2, "", own)
            .build()
    };

    let pres = decode(build(), natural()).data.unwrap();
    let inherited = pres.slides[0].background.as_ref().unwrap();
    assert!(inherited.from_master);
    let Fill::Solid { color } = &inherited.fill else {
        panic!("expected a solid background");
    };
    assert_eq!(color.resolve(None), Rgb::new(1.0, 0.0, 0.0));

    let own_bg = pres.slides[1].background.as_ref().unwrap();
    assert!(!own_bg.from_master);

    assert!(pres.masters[0].background.is_some());
    assert_eq!(pres.masters[0].theme_ref.as_deref(), Some("theme1"));

    let pres = decode(build(), natural().with_master_background(false))
        .data
        .unwrap();
    assert!(pres.slides[0].background.is_none());
    assert!(pres.slides[1].background.is_some());
}

#[test]
fn test_media_deduplicated_by_content() {
    let deck = DeckBuilder::new()
        .media("image1.png", PNG)
        .media("image2.png", PNG)
        .slide(1, &picture(4, "rId2"))
        .rel("rId2", "image", "../media/image2.png")
        .build();
    let pres = decode(deck, natural()).data.unwrap();

    assert_eq!(pres.media.len(), 1);
    let media = &pres.media[0];
    assert_eq!(media.id, "image1.png");
    assert_eq!(media.duplicates, vec!["image2.png".to_string()]);
    assert_eq!(media.mime_type, "image/png");
    assert!(media.has_data());

    let ElementKind::Image(image) = &pres.slides[0].elements[0].kind else {
        panic!("expected an image");
    };
    assert_eq!(image.source.media_id.as_deref(), Some("image1.png"));
    assert_eq!(image.source.path.as_deref(), Some("ppt/media/image2.png"));
    assert_eq!(image.description.as_deref(), Some("logo"));
}

#[test]
fn test_import_gates() {
    let shapes = format!(
        "{}{}{}",
        rect(2, (0, 0, 9525, 9525)),
        text_box(3, "Words"),
        picture(4, "rId2")
    );
    let build = || {
        DeckBuilder::new()
            .media("image1.png", PNG)
            .slide(1, &shapes)
            .rel("rId2", "image", "../media/image1.png")
            .build()
    };
    let kinds = |settings: ImportSettings| {
        let pres = decode(build(), settings).data.unwrap();
        let kinds: Vec<&'static str> = pres.slides[0]
            .elements
            .iter()
            .map(|e| e.kind_name())
            .collect();
        (kinds, pres.media)
    };

    let (all, media) = kinds(natural());
    assert_eq!(all, vec!["shape", "text", "image"]);
    assert!(media[0].has_data());

    let (no_shapes, _) = kinds(natural().with_shapes(false));
    assert_eq!(no_shapes, vec!["text", "image"]);

    let (no_text, _) = kinds(natural().with_text(false));
    assert_eq!(no_text, vec!["shape", "image"]);

    let (no_images, media) = kinds(natural().with_images(false));
    assert_eq!(no_images, vec!["shape", "text"]);
    assert_eq!(media.len(), 1);
    assert!(!media[0].has_data());
}

#[test]
fn test_declared_slide_without_part_warns() {
    let deck = DeckBuilder::new()
        .slide(1, "")
        .declare_missing_slides(1)
        .build();
    let result = decode(deck, natural());

    assert!(result.success);
    assert_eq!(result.data.unwrap().slide_count, 1);
    assert!(
        result.warnings.iter().any(|w| w.contains("declares 2 slides")),
        "{:?}",
        result.warnings
    );
}

#[test]
fn test_metadata_from_core_properties() {
    let deck = DeckBuilder::new()
        .core_properties(
            r#"<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/">
                 <dc:title>Quarterly Review</dc:title><dc:creator>Finance</dc:creator>
               </cp:coreProperties>"#,
        )
        .slide(1, "")
        .build();
    let pres = decode(deck, natural()).data.unwrap();
    assert_eq!(pres.metadata.title.as_deref(), Some("Quarterly Review"));
    assert_eq!(pres.metadata.author.as_deref(), Some("Finance"));
    assert_eq!(pres.file_name, "test.pptx");
}

#[test]
fn test_custom_slide_size() {
    // 16:9 widescreen: 1280x720 natural pixels
    let deck = DeckBuilder::new()
        .slide_size(12_192_000, 6_858_000)
        .slide(1, "")
        .build();
    let pres = decode(deck, ImportSettings::default()).data.unwrap();
    assert_eq!(pres.slide_size.width_emu, 12_192_000);
    assert!(approx(pres.slide_size.scale, 1.5));
    assert!(approx(pres.slide_size.width, 1920.0));
    assert!(approx(pres.slide_size.height, 1080.0));
}

#[test]
fn test_cancel_before_start() {
    let token = CancellationToken::new();
    token.cancel();
    let deck = DeckBuilder::new().slide(1, "").slide(2, "").build();
    let result = Decoder::new(natural())
        .with_cancellation(token)
        .decode(deck, "test.pptx");

    assert!(result.success);
    assert!(result.cancelled);
    let pres = result.data.unwrap();
    assert_eq!(pres.slide_count, 0);
    assert!(pres.slides.is_empty());
}

#[test]
fn test_cancel_during_slides_keeps_decoded_prefix() {
    let token = CancellationToken::new();
    let trigger = token.clone();
    let sink = move |event: &ProgressEvent| {
        if event.current_slide == Some(2) {
            trigger.cancel();
        }
    };
    let deck = DeckBuilder::new()
        .slide(1, &text_box(2, "a"))
        .slide(2, &text_box(2, "b"))
        .slide(3, &text_box(2, "c"))
        .build();
    let result = Decoder::new(natural())
        .with_progress(&sink)
        .with_cancellation(token)
        .decode(deck, "test.pptx");

    assert!(result.cancelled);
    let pres = result.data.unwrap();
    let numbers: Vec<u32> = pres.slides.iter().map(|s| s.number).collect();
    assert_eq!(numbers, vec![1, 2]);
    assert_eq!(pres.slide_count, 2);
    assert!(!result.warnings.iter().any(|w| w.contains("declares")));
}

#[test]
fn test_progress_is_monotonic() {
    let events = Mutex::new(Vec::new());
    let sink = |event: &ProgressEvent| events.lock().unwrap().push(event.clone());
    let deck = DeckBuilder::new()
        .slide(1, "")
        .slide(2, "")
        .slide(3, "")
        .build();
    let result = Decoder::new(natural())
        .with_progress(&sink)
        .decode(deck, "test.pptx");
    assert!(result.success);

    let events = events.into_inner().unwrap();
    assert_eq!(events.first().unwrap().stage, ProgressStage::Initializing);
    let last = events.last().unwrap();
    assert_eq!(last.stage, ProgressStage::Completed);
    assert_eq!(last.progress, 100);
    for pair in events.windows(2) {
        assert!(pair[0].stage <= pair[1].stage);
        assert!(pair[0].progress <= pair[1].progress);
    }
    assert!(events
        .iter()
        .any(|e| e.stage == ProgressStage::Parsing && e.total_slides == Some(3)));
}

#[test]
fn test_invalid_settings_fail_fast() {
    let settings = ImportSettings::default().with_target_size(TargetSlideSize::Custom {
        width: 50,
        height: 720,
    });
    let result = decode(DeckBuilder::new().slide(1, "").build(), settings);
    assert!(!result.success);
    assert!(result.data.is_none());
    assert!(result.errors[0].contains("Invalid settings"));
}

#[test]
fn test_not_a_zip_is_fatal() {
    let events = Mutex::new(Vec::new());
    let sink = |event: &ProgressEvent| events.lock().unwrap().push(event.stage);
    let result = Decoder::new(natural())
        .with_progress(&sink)
        .decode(b"PK\x03\x04 definitely not a zip".to_vec(), "bad.pptx");

    assert!(!result.success);
    assert!(result.data.is_none());
    assert_eq!(result.errors.len(), 1);
    assert_eq!(
        events.into_inner().unwrap().last(),
        Some(&ProgressStage::Error)
    );
}

#[test]
fn test_missing_presentation_part_is_fatal() {
    let mut buffer = Vec::new();
    {
        let mut zip = zip::ZipWriter::new(Cursor::new(&mut buffer));
        zip.start_file("ppt/slides/slide1.xml", zip::write::SimpleFileOptions::default())
            .unwrap();
        zip.write_all(b"<p:sld/>").unwrap();
        zip.finish().unwrap();
    }
    let result = decode(buffer, natural());
    assert!(!result.success);
    assert!(result.errors[0].contains("ppt/presentation.xml"));
}

#[test]
fn test_theme_xml_fixture_is_valid() {
    let outcome = pptxdom::pptx::parse_theme_xml(THEME_XML, "theme1");
    assert!(outcome.warnings.is_empty());
}
