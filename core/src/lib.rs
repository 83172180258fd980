//! Core library for cutting images into fixed-height tiles.

#![deny(missing_debug_implementations)]

pub mod codec;
pub mod compress;
pub mod error;
pub mod export;
pub mod fs;
pub mod log;
pub mod pipeline;
pub mod session;
pub mod settings;
pub mod stats;
pub mod types;

pub type Result<T> = std::result::Result<T, error::CutError>;

pub use compress::{CompressOptions, CompressedTile};
pub use error::CutError;
pub use pipeline::{EncodedTile, SourceInput};
pub use session::Session;
pub use settings::CropSettings;
pub use types::{Band, ImageDimensions, TileSpec};

/// Returns the version of the core crate for diagnostics.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exposes_semver_version() {
        assert!(version().contains('.'));
    }

    #[test]
    fn default_spec_covers_a_tall_page() {
        let spec = TileSpec::covering(1200, settings::DEFAULT_TILE_HEIGHT, 1000);
        assert_eq!(spec.tile_count, 4);
    }
}
