//! Import settings.
//!
//! Settings travel with a decode request. They are serde-friendly so hosts
//! can persist them (the CLI reads them from a JSON file) and expose
//! `with_*` builders for programmatic use.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Smallest accepted custom target dimension, in pixels.
pub const MIN_TARGET_DIMENSION: u32 = 100;
/// Largest accepted custom target dimension, in pixels.
pub const MAX_TARGET_DIMENSION: u32 = 4000;

/// Pixel canvas the natural slide size is fitted into.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "preset", rename_all = "lowercase")]
pub enum TargetSlideSize {
    /// 1920×1080 (16:9 full HD)
    #[default]
    #[serde(rename = "1920x1080")]
    Preset1920x1080,
    /// 1280×720 (16:9 HD)
    #[serde(rename = "1280x720")]
    Preset1280x720,
    Custom { width: u32, height: u32 },
}

impl TargetSlideSize {
    /// Target width and height in pixels.
    pub fn dimensions(&self) -> (u32, u32) {
        match *self {
            TargetSlideSize::Preset1920x1080 => (1920, 1080),
            TargetSlideSize::Preset1280x720 => (1280, 720),
            TargetSlideSize::Custom { width, height } => (width, height),
        }
    }

    /// Parse "1920x1080", "1280x720" or "WxH".
    pub fn parse(value: &str) -> Result<Self> {
        let (w, h) = value
            .trim()
            .to_lowercase()
            .split_once('x')
            .map(|(w, h)| (w.trim().parse::<u32>(), h.trim().parse::<u32>()))
            .ok_or_else(|| Error::InvalidSettings(format!("invalid slide size: {}", value)))?;
        let (width, height) = match (w, h) {
            (Ok(w), Ok(h)) => (w, h),
            _ => {
                return Err(Error::InvalidSettings(format!(
                    "invalid slide size: {}",
                    value
                )))
            }
        };
        Ok(match (width, height) {
            (1920, 1080) => TargetSlideSize::Preset1920x1080,
            (1280, 720) => TargetSlideSize::Preset1280x720,
            _ => TargetSlideSize::Custom { width, height },
        })
    }

    /// Uniform scale that fits a natural size (in pixels) into this target.
    pub fn scale_for(&self, natural_width: f64, natural_height: f64) -> f64 {
        if natural_width <= 0.0 || natural_height <= 0.0 {
            return 1.0;
        }
        let (tw, th) = self.dimensions();
        (tw as f64 / natural_width).min(th as f64 / natural_height)
    }
}

/// Settings controlling what a decode imports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportSettings {
    /// Give slides without their own background the master's background
    pub include_master_background: bool,

    /// Emit image elements and load media bytes
    pub import_images: bool,

    /// Emit shape and line elements
    pub import_shapes: bool,

    /// Emit text boxes and text inside shapes
    pub import_text: bool,

    pub target_slide_size: TargetSlideSize,

    /// Map slides on the rayon thread pool
    pub parallel: bool,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            include_master_background: true,
            import_images: true,
            import_shapes: true,
            import_text: true,
            target_slide_size: TargetSlideSize::default(),
            parallel: false,
        }
    }
}

impl ImportSettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load settings from a JSON file. Missing fields take defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        serde_json::from_str(&content)
            .map_err(|e| Error::InvalidSettings(format!("{}: {}", path.as_ref().display(), e)))
    }

    pub fn with_master_background(mut self, include: bool) -> Self {
        self.include_master_background = include;
        self
    }

    pub fn with_images(mut self, import: bool) -> Self {
        self.import_images = import;
        self
    }

    pub fn with_shapes(mut self, import: bool) -> Self {
        self.import_shapes = import;
        self
    }

    pub fn with_text(mut self, import: bool) -> Self {
        self.import_text = import;
        self
    }

    /// Set the target canvas.
    pub fn with_target_size(mut self, size: TargetSlideSize) -> Self {
        self.target_slide_size = size;
        self
    }

    /// Enable parallel slide mapping.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Reject custom target dimensions outside 100-4000 px.
    pub fn validate(&self) -> Result<()> {
        if let TargetSlideSize::Custom { width, height } = self.target_slide_size {
            for (label, value) in [("width", width), ("height", height)] {
                if !(MIN_TARGET_DIMENSION..=MAX_TARGET_DIMENSION).contains(&value) {
                    return Err(Error::InvalidSettings(format!(
                        "target {} {} outside {}-{} px",
                        label, value, MIN_TARGET_DIMENSION, MAX_TARGET_DIMENSION
                    )));
                }
            }
        }
        Ok(())
    }
}
