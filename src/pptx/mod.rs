//! PPTX (PowerPoint) decoding.
//!
//! Part parsers turn individual package parts into intermediate structures;
//! the [`ElementMapper`] turns shape trees into model elements; the
//! [`Decoder`] drives the whole pipeline.

pub mod geometry;
pub mod mapper;
pub mod parser;
pub mod presentation;
pub mod slide;
pub mod style;
pub mod text;
pub mod theme;

pub use mapper::{apply_theme, ElementError, ElementMapper, MapOutput, MapperOptions, PartKind};
#[cfg(feature = "async")]
pub use parser::decode_file_async;
pub use parser::{parse_bytes, parse_file, Decoder, ParseResult};
pub use presentation::{parse_presentation, PresentationInfo};
pub use style::PartContext;
pub use theme::{parse_theme_xml, ThemeOutcome};
