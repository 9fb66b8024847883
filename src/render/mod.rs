//! Output rendering for decoded presentations.
//!
//! # Example
//!
//! ```no_run
//! use pptxdom::render::{to_json, to_text, JsonFormat, TextOptions};
//!
//! let result = pptxdom::parse_file("deck.pptx", Default::default())?;
//! let presentation = result.into_result()?;
//!
//! let json = to_json(&presentation, JsonFormat::Pretty)?;
//! let outline = to_text(&presentation, &TextOptions::default().with_slide_headers(true));
//! # Ok::<(), pptxdom::Error>(())
//! ```

mod json;
mod text;

pub use json::{result_to_json, to_json, to_json_default, JsonFormat};
pub use text::{to_text, TextOptions};
