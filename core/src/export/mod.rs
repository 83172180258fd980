//! Output naming, zip packaging, and saving files to a target directory.

pub mod archive;
pub mod naming;
mod save;

pub use archive::{ArchiveEntry, list_entries, pack};
pub use naming::{
    COMPRESSED_ARCHIVE_NAME, TILE_ARCHIVE_NAME, compressed_file_name, tile_file_name,
};
pub use save::save_file;

pub type Result<T> = crate::Result<T>;
