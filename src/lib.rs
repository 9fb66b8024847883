//! # pptxdom
//!
//! Decode PowerPoint (PPTX) packages into a normalized, render-agnostic
//! presentation model.
//!
//! The pipeline unzips the package, parses each XML part into a generic
//! tree and maps that tree into typed slides, shapes, text runs, images and
//! themes with resolved units and colors. Malformed or unsupported content
//! degrades to warnings instead of failing the whole decode.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pptxdom::{parse_file, ImportSettings};
//!
//! let result = parse_file("deck.pptx", ImportSettings::default())?;
//! for warning in &result.warnings {
//!     eprintln!("warning: {}", warning);
//! }
//!
//! let presentation = result.into_result()?;
//! println!("{} slides", presentation.slide_count);
//! for slide in &presentation.slides {
//!     println!("{}: {} elements", slide.name, slide.element_count());
//! }
//! # Ok::<(), pptxdom::Error>(())
//! ```
//!
//! ## Progress and Cancellation
//!
//! ```no_run
//! use pptxdom::{CancellationToken, Decoder, ImportSettings, ProgressEvent};
//!
//! let token = CancellationToken::new();
//! let report = |event: &ProgressEvent| println!("{:?} {}%", event.stage, event.progress);
//!
//! let bytes = std::fs::read("deck.pptx")?;
//! let result = Decoder::new(ImportSettings::default().with_parallel(true))
//!     .with_progress(&report)
//!     .with_cancellation(token.clone())
//!     .decode(bytes, "deck.pptx");
//! assert!(result.success);
//! # Ok::<(), std::io::Error>(())
//! ```
//!
//! ## Features
//!
//! - `parallel` (default): map slides on the rayon thread pool when
//!   [`ImportSettings::parallel`] is set
//! - `async`: [`decode_file_async`] for Tokio hosts

pub mod cache;
pub mod color;
pub mod container;
pub mod error;
pub mod model;
pub mod pptx;
pub mod progress;
pub mod render;
pub mod settings;
pub mod units;
pub mod xml;

// Re-exports
pub use cache::{MediaIndex, ThemeCache};
pub use color::{ColorInfo, ColorKind, Rgb, SchemeSlot};
pub use container::{Package, Relationship, Relationships};
pub use error::{Error, Result};
pub use model::{
    Background, Element, ElementKind, Fill, MasterSlide, MediaFile, MediaKind, Metadata,
    Paragraph, Presentation, Slide, SlideSize, TextBody, TextRun, Theme,
};
#[cfg(feature = "async")]
pub use pptx::decode_file_async;
pub use pptx::{parse_bytes, parse_file, Decoder, ParseResult};
pub use progress::{CancellationToken, ProgressEvent, ProgressSink, ProgressStage};
pub use settings::{ImportSettings, TargetSlideSize};

use std::path::Path;

/// Extract the plain text of every slide in a file.
///
/// # Example
///
/// ```no_run
/// let text = pptxdom::extract_text("deck.pptx")?;
/// println!("{}", text);
/// # Ok::<(), pptxdom::Error>(())
/// ```
pub fn extract_text(path: impl AsRef<Path>) -> Result<String> {
    let presentation = parse_file(path, ImportSettings::default())?.into_result()?;
    Ok(presentation.plain_text())
}

/// Decode a file and render it as pretty-printed JSON.
///
/// # Example
///
/// ```no_run
/// let json = pptxdom::to_json("deck.pptx")?;
/// std::fs::write("deck.json", json)?;
/// # Ok::<(), pptxdom::Error>(())
/// ```
pub fn to_json(path: impl AsRef<Path>) -> Result<String> {
    let presentation = parse_file(path, ImportSettings::default())?.into_result()?;
    render::to_json(&presentation, render::JsonFormat::Pretty)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_io_error() {
        let err = parse_file("does-not-exist.pptx", ImportSettings::default()).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_extract_text_from_sample() {
        let path = "test-files/sample.pptx";
        if Path::new(path).exists() {
            let text = extract_text(path).unwrap();
            assert!(!text.is_empty());
        }
    }
}
