//! Boundary check for accepted input formats.

use std::ffi::OsStr;
use std::path::Path;

use image::ImageFormat;

use crate::error::CutError;

use super::Result;

pub const MIME_JPEG: &str = "image/jpeg";
pub const MIME_PNG: &str = "image/png";

/// The two encoded formats accepted as tiling input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Jpeg,
    Png,
}

impl SourceFormat {
    /// Accept an input by its declared MIME type, rejecting anything but JPEG and PNG.
    pub fn from_mime(name: &str, mime: &str) -> Result<Self> {
        match mime.trim().to_ascii_lowercase().as_str() {
            MIME_JPEG => Ok(Self::Jpeg),
            MIME_PNG => Ok(Self::Png),
            other => Err(CutError::UnsupportedFormat {
                name: name.to_string(),
                mime: if other.is_empty() { "unknown".to_string() } else { other.to_string() },
            }),
        }
    }

    /// Format implied by a file extension, compared case-insensitively.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            _ => None,
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            Self::Jpeg => MIME_JPEG,
            Self::Png => MIME_PNG,
        }
    }

    pub(crate) fn image_format(self) -> ImageFormat {
        match self {
            Self::Jpeg => ImageFormat::Jpeg,
            Self::Png => ImageFormat::Png,
        }
    }
}

/// MIME type implied by a file extension, the way a file picker reports it.
pub fn guess_mime(path: &Path) -> &'static str {
    let ext = path.extension().and_then(OsStr::to_str).map(|ext| ext.to_ascii_lowercase());
    if let Some(format) = ext.as_deref().and_then(SourceFormat::from_extension) {
        return format.mime();
    }
    match ext {
        Some(ext) if ext == "webp" => "image/webp",
        Some(ext) if ext == "gif" => "image/gif",
        Some(ext) if ext == "bmp" => "image/bmp",
        _ => "application/octet-stream",
    }
}

/// Whether the path names a file the input gate would accept.
pub fn is_accepted_path(path: &Path) -> bool {
    SourceFormat::from_mime("", guess_mime(path)).is_ok()
}
