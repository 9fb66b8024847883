//! Media file (image, video, audio) model.

use serde::{Deserialize, Serialize};

/// Kind of media file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    /// Image (PNG, JPEG, GIF, BMP, TIFF, WMF, EMF, SVG)
    Image,
    /// Video file
    Video,
    /// Audio file
    Audio,
}

impl MediaKind {
    /// Determine media kind from file extension.
    ///
    /// Returns `None` for extensions that are not media (e.g., embedded
    /// `.bin` OLE payloads), which the decoder does not list.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "png" | "jpg" | "jpeg" | "jpe" | "gif" | "bmp" | "tiff" | "tif" | "wmf" | "emf"
            | "svg" | "webp" | "ico" => Some(MediaKind::Image),
            "mp4" | "m4v" | "avi" | "mov" | "wmv" | "webm" | "mpg" | "mpeg" => {
                Some(MediaKind::Video)
            }
            "mp3" | "wav" | "ogg" | "m4a" | "wma" | "aac" | "mid" | "midi" => {
                Some(MediaKind::Audio)
            }
            _ => None,
        }
    }
}

/// A media part of the package.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaFile {
    /// Media id (canonical across duplicates)
    pub id: String,

    /// File name within `ppt/media/`
    pub name: String,

    /// Full package path
    pub path: String,

    pub kind: MediaKind,

    /// Size in bytes
    pub size: usize,

    /// MIME type
    pub mime_type: String,

    /// Hex SHA-256 of the full content
    pub digest: String,

    /// Ids of other media parts with identical content
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub duplicates: Vec<String>,

    /// Binary data; empty when images were not imported
    #[serde(skip)]
    pub data: Vec<u8>,
}

impl MediaFile {
    /// Get the file extension for this media file.
    pub fn extension(&self) -> Option<&str> {
        self.name
            .rsplit_once('.')
            .map(|(_, ext)| ext)
            .filter(|ext| ext.len() <= 5 && ext.chars().all(|c| c.is_alphanumeric()))
    }

    /// Determine MIME type from a file name.
    pub fn mime_from_filename(filename: &str) -> String {
        let ext = filename
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_lowercase())
            .unwrap_or_default();
        let mime = match ext.as_str() {
            "png" => "image/png",
            "jpg" | "jpeg" | "jpe" => "image/jpeg",
            "gif" => "image/gif",
            "bmp" => "image/bmp",
            "tiff" | "tif" => "image/tiff",
            "svg" => "image/svg+xml",
            "webp" => "image/webp",
            "ico" => "image/x-icon",
            "wmf" => "image/x-wmf",
            "emf" => "image/x-emf",
            "mp3" => "audio/mpeg",
            "wav" => "audio/wav",
            "ogg" => "audio/ogg",
            "m4a" | "aac" => "audio/mp4",
            "wma" => "audio/x-ms-wma",
            "mid" | "midi" => "audio/midi",
            "mp4" | "m4v" => "video/mp4",
            "avi" => "video/x-msvideo",
            "mov" => "video/quicktime",
            "wmv" => "video/x-ms-wmv",
            "webm" => "video/webm",
            "mpg" | "mpeg" => "video/mpeg",
            _ => "application/octet-stream",
        };
        mime.to_string()
    }

    /// Whether the bytes were loaded.
    pub fn has_data(&self) -> bool {
        !self.data.is_empty()
    }

    /// Save media bytes to a file.
    pub fn save_to(&self, path: impl AsRef<std::path::Path>) -> std::io::Result<()> {
        std::fs::write(path, &self.data)
    }
}
