//! Input format gate, decoding, and tile encoders.

pub mod encode;
pub mod format;
pub mod image;

pub use encode::{encode_jpeg, encode_png, flatten_onto_white};
pub use format::SourceFormat;
pub use self::image::{DecodedImage, decode_source};

pub type Result<T> = crate::Result<T>;
