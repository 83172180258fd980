//! Error taxonomy shared by every core operation.

use std::path::PathBuf;

use thiserror::Error;

/// Failure of a single user-level operation (crop, batch crop, download, compress).
#[derive(Debug, Error)]
pub enum CutError {
    /// Rejected at the input boundary before any decoding.
    #[error("unsupported format for {name}: {mime} (expected image/jpeg or image/png)")]
    UnsupportedFormat { name: String, mime: String },

    /// The bytes could not be decoded as the declared raster format.
    #[error("failed to decode {name}: {message}")]
    Decode { name: String, message: String },

    /// The drawing surface for a tile could not be allocated.
    #[error("cannot allocate a {width}x{height} drawing surface: {message}")]
    Surface { width: u32, height: u32, message: String },

    #[error("failed to encode tile {index}: {message}")]
    Encode { index: u32, message: String },

    /// `index` is the tile's position in the current result; `file` is the name it saves under.
    #[error("failed to compress {file}: {message}")]
    Compression { index: u32, file: String, message: String },

    #[error("failed to package archive: {0}")]
    Packaging(String),

    /// One source of a batch failed; nothing from the batch is kept.
    #[error("batch aborted at image {position} ({name}): {source}")]
    Batch {
        position: usize,
        name: String,
        #[source]
        source: Box<CutError>,
    },

    #[error("i/o error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no source image loaded")]
    NoSource,

    #[error("no cropped tiles available")]
    NoTiles,

    #[error("tile {index} out of range ({len} tiles)")]
    TileOutOfRange { index: usize, len: usize },
}

impl CutError {
    pub(crate) fn decode(name: &str, err: impl std::fmt::Display) -> Self {
        Self::Decode { name: name.to_string(), message: err.to_string() }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }

    /// The 1-based batch position, when the error came out of a batch.
    pub fn batch_position(&self) -> Option<usize> {
        match self {
            Self::Batch { position, .. } => Some(*position),
            _ => None,
        }
    }
}

impl From<zip::result::ZipError> for CutError {
    fn from(err: zip::result::ZipError) -> Self {
        Self::Packaging(err.to_string())
    }
}
