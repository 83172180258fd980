//! Lossy recompression of cropped tiles into size-bounded JPEG files.
//!
//! A tile is downscaled so its longer side fits `max_width_or_height`, flattened onto white,
//! and JPEG-encoded. While the output is above `max_size_mb`, each further attempt lowers the
//! quality and shrinks both sides by 5%, for at most `max_iterations` attempts. The smallest
//! attempt wins even if it never got under the limit.

use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info};

use crate::codec::{self, DecodedImage};
use crate::error::CutError;
use crate::export;
use crate::pipeline::EncodedTile;
use crate::pipeline::resize::{self, ResizeFilter};
use crate::Result;
use crate::types::ImageDimensions;

const SHRINK_FACTOR: f64 = 0.95;
const MIN_QUALITY: u8 = 10;

/// Settings for [`compress_tile`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CompressOptions {
    pub max_size_mb: f64,
    pub max_width_or_height: u32,
    pub initial_quality: u8,
    pub max_iterations: u32,
}

impl Default for CompressOptions {
    fn default() -> Self {
        Self {
            max_size_mb: 1.0,
            max_width_or_height: 1920,
            initial_quality: 92,
            max_iterations: 10,
        }
    }
}

impl CompressOptions {
    pub fn max_size_bytes(&self) -> usize {
        (self.max_size_mb.max(0.0) * 1024.0 * 1024.0) as usize
    }
}

/// A recompressed tile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressedTile {
    /// Position of the source tile in the current result.
    pub index: u32,
    pub dimensions: ImageDimensions,
    pub quality: u8,
    /// JPEG bytes.
    pub bytes: Vec<u8>,
}

/// Recompress one tile from its stored PNG bytes.
///
/// `position` is the tile's place in the current result, which names the output file and
/// labels any error.
pub fn compress_tile(
    tile: &EncodedTile,
    position: u32,
    options: CompressOptions,
) -> Result<CompressedTile> {
    let started = Instant::now();
    let file = export::compressed_file_name(position);
    let failed =
        |message: String| CutError::Compression { index: position, file: file.clone(), message };

    let decoded =
        codec::image::decode_png(&file, &tile.bytes).map_err(|err| failed(err.to_string()))?;
    let budget = options.max_size_bytes();

    let mut dimensions = resize::fit_within(decoded.dimensions, options.max_width_or_height);
    let mut quality = options.initial_quality.clamp(MIN_QUALITY, codec::encode::MAX_JPEG_QUALITY);
    let mut best: Option<CompressedTile> = None;

    for attempt in 0..options.max_iterations.max(1) {
        let bytes = encode_attempt(&decoded, dimensions, quality).map_err(failed)?;
        debug!(
            target: "compress",
            index = position,
            attempt,
            quality,
            width = dimensions.width,
            height = dimensions.height,
            bytes = bytes.len(),
            "compression attempt"
        );

        let fits = bytes.len() <= budget;
        if best.as_ref().is_none_or(|current| bytes.len() < current.bytes.len()) {
            best = Some(CompressedTile { index: position, dimensions, quality, bytes });
        }
        if fits {
            break;
        }

        quality = ((quality as f64 * SHRINK_FACTOR) as u8).max(MIN_QUALITY);
        dimensions = resize::scale_dimensions(dimensions, SHRINK_FACTOR);
    }

    let best = best.ok_or_else(|| failed("no compression attempt ran".into()))?;
    info!(
        target: "compress",
        index = position,
        original = tile.bytes.len(),
        compressed = best.bytes.len(),
        quality = best.quality,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "compressed tile"
    );
    Ok(best)
}

fn encode_attempt(
    source: &DecodedImage,
    dimensions: ImageDimensions,
    quality: u8,
) -> std::result::Result<Vec<u8>, String> {
    let scaled = if dimensions == source.dimensions {
        None
    } else {
        Some(
            resize::resize_rgba(source, dimensions, ResizeFilter::Lanczos3)
                .map_err(|err| err.to_string())?,
        )
    };
    let frame = scaled.as_ref().unwrap_or(source);
    let rgb = codec::flatten_onto_white(frame.dimensions, frame.pixels());
    codec::encode_jpeg(&rgb, quality).map_err(|err| err.to_string())
}
