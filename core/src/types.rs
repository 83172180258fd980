//! Shared value types exchanged between the core, the command shell, and tests.

use serde::Serialize;

/// Pixel dimensions of a decoded source or an output tile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImageDimensions {
    pub width: u32,
    pub height: u32,
}

impl ImageDimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Number of bytes needed to hold these dimensions as RGBA8888, if it fits in `usize`.
    pub fn rgba_len(&self) -> Option<usize> {
        (self.width as usize).checked_mul(self.height as usize)?.checked_mul(4)
    }
}

/// Requested tile geometry.
///
/// Width and height are the requested output size; the tiler clamps them to the source
/// bounds when it renders, not here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TileSpec {
    pub tile_width: u32,
    pub tile_height: u32,
    pub tile_count: u32,
}

impl TileSpec {
    /// Spec with an explicit count. Zero width or height is treated as 1 when cutting.
    pub fn new(tile_width: u32, tile_height: u32, tile_count: u32) -> Self {
        Self { tile_width, tile_height, tile_count }
    }

    /// Build a spec whose count covers `source_height` exactly.
    pub fn covering(tile_width: u32, tile_height: u32, source_height: u32) -> Self {
        Self::new(tile_width, tile_height, derive_count(source_height, tile_height))
    }

    /// A spec that keeps cutting until each source is covered.
    ///
    /// Width and count are saturated so the render-time clamps pick the source's own width
    /// and early termination decides the number of tiles. Used when one spec is shared by
    /// sources of different sizes.
    pub fn unbounded(tile_height: u32) -> Self {
        Self::new(u32::MAX, tile_height, u32::MAX)
    }

    /// Recompute `tile_count` for a new source height.
    pub fn derive_count(&mut self, source_height: u32) {
        self.tile_count = derive_count(source_height, self.tile_height);
    }
}

/// `ceil(source_height / tile_height)`, treating a zero tile height as 1.
pub fn derive_count(source_height: u32, tile_height: u32) -> u32 {
    source_height.div_ceil(tile_height.max(1))
}

/// One planned horizontal band of the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Band {
    pub index: u32,
    pub offset_y: u32,
    pub width: u32,
    pub height: u32,
}

impl Band {
    /// First row below this band.
    pub fn end_y(&self) -> u32 {
        self.offset_y + self.height
    }

    pub fn dimensions(&self) -> ImageDimensions {
        ImageDimensions { width: self.width, height: self.height }
    }
}
