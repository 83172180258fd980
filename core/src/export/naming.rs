//! File names use the 1-based tile position.

pub const TILE_ARCHIVE_NAME: &str = "cropped-images.zip";
pub const COMPRESSED_ARCHIVE_NAME: &str = "compressed-cropped-images.zip";

/// Name of the lossless file for 0-based tile `index`.
pub fn tile_file_name(index: u32) -> String {
    format!("cropped-image-{}.png", index as u64 + 1)
}

/// Name of the recompressed file for 0-based tile `index`.
pub fn compressed_file_name(index: u32) -> String {
    format!("compressed-cropped-image-{}.jpg", index as u64 + 1)
}
