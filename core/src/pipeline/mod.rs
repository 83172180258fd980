//! Band planning, tiling, batch orchestration, and resize helpers.

pub mod batch;
pub mod resize;
pub mod tile;

pub use batch::{SourceInput, cut_batch};
pub use tile::{EncodedTile, cut, cut_encoded, plan};

pub type Result<T> = crate::Result<T>;
