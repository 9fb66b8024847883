//! Presentation model.
//!
//! These structures are the render-agnostic output of the decoder: every
//! geometry value is in target-canvas pixels, every color either carries a
//! concrete RGB or (before the theme pass) a theme reference. Parsers build
//! them; hosts and renderers only read them.

mod element;
mod media;
mod presentation;
mod text;
mod theme;

pub use element::*;
pub use media::*;
pub use presentation::*;
pub use text::*;
pub use theme::*;
