//! Crop settings as edited by the user, validated once at the input boundary.

use serde::Serialize;

use crate::types::{ImageDimensions, TileSpec, derive_count};

pub const DEFAULT_TILE_HEIGHT: u32 = 300;

/// Width used before any source is loaded.
pub const DEFAULT_TILE_WIDTH: u32 = 300;

/// Fixed-shape crop settings.
///
/// `count` is never set directly: it follows the tile height and the source height. While
/// `use_original_width` is on, `width` tracks the source width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CropSettings {
    width: u32,
    height: u32,
    count: u32,
    use_original_width: bool,
    source: ImageDimensions,
}

impl Default for CropSettings {
    fn default() -> Self {
        Self {
            width: DEFAULT_TILE_WIDTH,
            height: DEFAULT_TILE_HEIGHT,
            count: 1,
            use_original_width: true,
            source: ImageDimensions::default(),
        }
    }
}

impl CropSettings {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn use_original_width(&self) -> bool {
        self.use_original_width
    }

    pub fn source(&self) -> ImageDimensions {
        self.source
    }

    /// Reset to defaults for a freshly loaded source, keeping the original-width toggle.
    pub fn attach_source(&mut self, source: ImageDimensions) {
        self.source = source;
        self.height = DEFAULT_TILE_HEIGHT;
        if self.use_original_width {
            self.width = source.width.max(1);
        }
        self.recount();
    }

    /// Set the width; values below 1 become 1. Ignored while the original width is in use.
    pub fn set_width(&mut self, width: u32) {
        if !self.use_original_width {
            self.width = width.max(1);
        }
    }

    /// Set the height (values below 1 become 1) and re-derive the count.
    pub fn set_height(&mut self, height: u32) {
        self.height = height.max(1);
        self.recount();
    }

    /// Apply raw text from a width field. Empty or unparsable input counts as 1.
    pub fn set_width_text(&mut self, text: &str) {
        self.set_width(parse_dimension(text));
    }

    /// Apply raw text from a height field. Empty or unparsable input counts as 1.
    pub fn set_height_text(&mut self, text: &str) {
        self.set_height(parse_dimension(text));
    }

    /// Toggle "use original width"; turning it on snaps the width back to the source width.
    pub fn set_use_original_width(&mut self, enabled: bool) {
        self.use_original_width = enabled;
        if enabled && !self.source.is_empty() {
            self.width = self.source.width;
        }
    }

    pub fn tile_spec(&self) -> TileSpec {
        TileSpec::new(self.width, self.height, self.count)
    }

    fn recount(&mut self) {
        self.count = derive_count(self.source.height, self.height);
    }
}

/// Leading-digit parse of a dimension field, clamped to at least 1.
///
/// `"250px"` reads as 250, `""`, `"-5"` and `"abc"` read as 1.
pub fn parse_dimension(text: &str) -> u32 {
    let digits: String = text.trim().chars().take_while(char::is_ascii_digit).collect();
    digits.parse::<u32>().map(|value| value.max(1)).unwrap_or(if digits.is_empty() {
        1
    } else {
        u32::MAX
    })
}
