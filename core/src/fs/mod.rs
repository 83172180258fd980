//! File system side of input gathering: expanding directories and reading uploads.

pub mod inputs;
mod order;

pub use inputs::{collect_inputs, read_input};
pub use order::natural_cmp;

pub type Result<T> = crate::Result<T>;
