//! Cut a source image into fixed-height horizontal bands encoded as PNG tiles.

use std::time::Instant;

use tracing::{debug, info};

use crate::codec::{self, DecodedImage, SourceFormat};
use crate::error::CutError;
use crate::types::{Band, ImageDimensions, TileSpec};

use super::Result;

/// One lossless output tile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedTile {
    /// 0-based position in the cut sequence.
    pub index: u32,
    /// First source row copied into this tile.
    pub offset_y: u32,
    /// Size of the tile; the last one may be shorter than the requested height.
    pub dimensions: ImageDimensions,
    /// PNG bytes.
    pub bytes: Vec<u8>,
}

impl EncodedTile {
    /// The planned band this tile was cut from.
    pub fn band(&self) -> Band {
        Band {
            index: self.index,
            offset_y: self.offset_y,
            width: self.dimensions.width,
            height: self.dimensions.height,
        }
    }
}

/// Plan the bands `cut` will produce for a source of `dimensions`.
///
/// Width and height are clamped to the source; tiles stop as soon as the next offset would
/// start at or below the bottom edge, even when `spec.tile_count` asks for more. Every band,
/// including one cut short by the bottom edge, is exactly as tall as the rows it copies.
pub fn plan(dimensions: ImageDimensions, spec: TileSpec) -> Vec<Band> {
    if dimensions.is_empty() {
        return Vec::new();
    }

    let width = spec.tile_width.max(1).min(dimensions.width);
    let step = spec.tile_height.max(1).min(dimensions.height);

    let mut bands = Vec::new();
    for index in 0..spec.tile_count {
        let Some(offset_y) = index.checked_mul(step) else {
            break;
        };
        if offset_y >= dimensions.height {
            break;
        }
        let height = step.min(dimensions.height - offset_y);
        bands.push(Band { index, offset_y, width, height });
    }
    bands
}

/// Cut `source` into PNG tiles following [`plan`].
///
/// One drawing surface is reused for every band. Allocation or encoding failures abort the
/// whole call; no partial result is returned.
pub fn cut(source: &DecodedImage, spec: TileSpec) -> Result<Vec<EncodedTile>> {
    let started = Instant::now();
    let bands = plan(source.dimensions, spec);
    let mut surface = Surface::default();
    let mut tiles = Vec::with_capacity(bands.len());

    for band in bands {
        surface.resize(band.dimensions())?;
        surface.draw_region(source, &band);

        let bytes = codec::encode_png(surface.dimensions, surface.pixels())
            .map_err(|err| CutError::Encode { index: band.index, message: err.to_string() })?;
        debug!(
            target: "pipeline::tile",
            index = band.index,
            offset_y = band.offset_y,
            height = band.height,
            bytes = bytes.len(),
            "encoded tile"
        );
        tiles.push(EncodedTile {
            index: band.index,
            offset_y: band.offset_y,
            dimensions: band.dimensions(),
            bytes,
        });
    }

    info!(
        target: "pipeline::tile",
        width = source.width(),
        height = source.height(),
        requested = spec.tile_count,
        produced = tiles.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "cut source into tiles"
    );
    Ok(tiles)
}

/// Decode `data` and cut it in one step.
pub fn cut_encoded(
    name: &str,
    format: SourceFormat,
    data: &[u8],
    spec: TileSpec,
) -> Result<Vec<EncodedTile>> {
    let source = codec::decode_source(name, format, data)?;
    cut(&source, spec)
}

/// Reusable RGBA drawing surface.
#[derive(Debug, Default)]
struct Surface {
    dimensions: ImageDimensions,
    pixels: Vec<u8>,
}

impl Surface {
    /// Resize to `dimensions` and clear, keeping the existing allocation when it is big enough.
    fn resize(&mut self, dimensions: ImageDimensions) -> Result<()> {
        let surface_error = |message: String| CutError::Surface {
            width: dimensions.width,
            height: dimensions.height,
            message,
        };
        let len = dimensions.rgba_len().ok_or_else(|| surface_error("size overflow".into()))?;

        if len > self.pixels.capacity() {
            self.pixels
                .try_reserve_exact(len - self.pixels.len())
                .map_err(|err| surface_error(err.to_string()))?;
        }
        self.pixels.clear();
        self.pixels.resize(len, 0);
        self.dimensions = dimensions;
        Ok(())
    }

    /// Copy the band's rows from `source` into the surface at the origin.
    fn draw_region(&mut self, source: &DecodedImage, band: &Band) {
        let row_len = band.width as usize * 4;
        for (row, dst) in self.pixels.chunks_exact_mut(row_len).enumerate() {
            dst.copy_from_slice(source.row(band.offset_y + row as u32, band.width));
        }
    }

    fn pixels(&self) -> &[u8] {
        &self.pixels
    }
}
