//! JSON renderer implementation.

use crate::error::Result;
use crate::model::Presentation;
use crate::pptx::ParseResult;
use serde::Serialize;

/// JSON output format options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum JsonFormat {
    /// Compact single-line JSON
    Compact,
    /// Pretty-printed with 2-space indentation
    #[default]
    Pretty,
}

fn serialize<T: Serialize>(value: &T, format: JsonFormat) -> Result<String> {
    Ok(match format {
        JsonFormat::Compact => serde_json::to_string(value)?,
        JsonFormat::Pretty => serde_json::to_string_pretty(value)?,
    })
}

/// Convert a presentation to JSON. Media bytes are never included.
pub fn to_json(presentation: &Presentation, format: JsonFormat) -> Result<String> {
    serialize(presentation, format)
}

/// Convert a presentation to pretty-printed JSON.
pub fn to_json_default(presentation: &Presentation) -> Result<String> {
    to_json(presentation, JsonFormat::Pretty)
}

/// Convert a whole decode outcome, warnings and errors included, to JSON.
pub fn result_to_json(result: &ParseResult, format: JsonFormat) -> Result<String> {
    serialize(result, format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Metadata, Slide, SlideSize};

    fn presentation() -> Presentation {
        Presentation {
            file_name: "deck.pptx".into(),
            metadata: Metadata {
                title: Some("Test".into()),
                ..Default::default()
            },
            slide_size: SlideSize {
                width_emu: 9_144_000,
                height_emu: 6_858_000,
                width: 960.0,
                height: 720.0,
                scale: 1.0,
            },
            slide_count: 1,
            slides: vec![Slide {
                id: "256".into(),
                name: "Intro".into(),
                number: 1,
                elements: Vec::new(),
                background: None,
                layout_ref: None,
                master_ref: None,
                hidden: false,
            }],
            masters: Vec::new(),
            themes: Vec::new(),
            media: Vec::new(),
        }
    }

    #[test]
    fn test_to_json_pretty() {
        let json = to_json(&presentation(), JsonFormat::Pretty).unwrap();
        assert!(json.contains("\"title\": \"Test\""));
        assert!(json.contains("\"name\": \"Intro\""));
        // Default-valued flags are omitted
        assert!(!json.contains("\"hidden\""));
    }

    #[test]
    fn test_to_json_compact() {
        let json = to_json(&presentation(), JsonFormat::Compact).unwrap();
        assert!(!json.contains('\n'));
        assert!(json.contains("\"slide_count\":1"));
    }

    #[test]
    fn test_presentation_roundtrip() {
        let json = to_json_default(&presentation()).unwrap();
        let parsed: Presentation = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.slide_count, 1);
        assert_eq!(parsed.slides[0].id, "256");
        assert_eq!(parsed.metadata.title.as_deref(), Some("Test"));
    }

    #[test]
    fn test_failed_result_json() {
        let result = ParseResult {
            success: false,
            data: None,
            errors: vec!["Package is corrupt: invalid Zip archive".into()],
            warnings: Vec::new(),
            processing_time_ms: 3,
            cancelled: false,
        };
        let json = result_to_json(&result, JsonFormat::Compact).unwrap();
        assert!(json.contains("\"success\":false"));
        assert!(!json.contains("\"data\""));
        assert!(!json.contains("\"cancelled\""));
    }
}
