//! Source decoding into an immutable RGBA buffer.

use std::io::Cursor;

use image::metadata::Orientation;
use image::{DynamicImage, ImageDecoder as _, ImageReader, RgbaImage};
use moxcms::{CmsError, ColorProfile, Layout, TransformOptions};
use tracing::{debug, warn};

use crate::error::CutError;
use crate::types::ImageDimensions;

use super::{Result, SourceFormat};

/// Decoded source raster: straight-alpha RGBA8888, row-major from the top-left corner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub dimensions: ImageDimensions,
    pub pixels: Vec<u8>,
}

impl DecodedImage {
    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.dimensions.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.dimensions.height
    }

    /// Raw RGBA bytes, `stride()` bytes per row.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Bytes per row.
    pub fn stride(&self) -> usize {
        self.dimensions.width as usize * 4
    }

    /// Borrow row `y`, clipped to the first `width` pixels.
    ///
    /// Callers keep `y < height` and `width <= self.width()`.
    pub fn row(&self, y: u32, width: u32) -> &[u8] {
        let start = y as usize * self.stride();
        &self.pixels[start..start + width as usize * 4]
    }

    /// Copy the region `[x, y, width, height]` into a new image.
    ///
    /// Returns `None` when the region falls outside the image.
    pub fn region(&self, x: u32, y: u32, width: u32, height: u32) -> Option<DecodedImage> {
        if x.checked_add(width)? > self.width() || y.checked_add(height)? > self.height() {
            return None;
        }
        let mut pixels = Vec::with_capacity(width as usize * height as usize * 4);
        for row in y..y + height {
            let start = row as usize * self.stride() + x as usize * 4;
            pixels.extend_from_slice(&self.pixels[start..start + width as usize * 4]);
        }
        Some(DecodedImage { dimensions: ImageDimensions { width, height }, pixels })
    }

    pub(crate) fn from_rgba_image(image: RgbaImage) -> Self {
        let dimensions = ImageDimensions { width: image.width(), height: image.height() };
        Self { dimensions, pixels: image.into_raw() }
    }
}

/// Decode user-supplied bytes that passed the format gate.
///
/// EXIF orientation is applied and embedded ICC profiles are converted to sRGB, so the
/// pixels match what a browser would draw for the same file. A failed colour conversion is
/// logged and the unconverted pixels are kept.
pub fn decode_source(name: &str, format: SourceFormat, data: &[u8]) -> Result<DecodedImage> {
    if data.is_empty() {
        return Err(CutError::decode(name, "empty image data"));
    }

    let mut decoder = ImageReader::with_format(Cursor::new(data), format.image_format())
        .into_decoder()
        .map_err(|err| CutError::decode(name, err))?;

    let orientation = decoder.orientation().unwrap_or(Orientation::NoTransforms);
    let icc_profile = decoder.icc_profile().unwrap_or(None);

    let mut image = DynamicImage::from_decoder(decoder).map_err(|err| CutError::decode(name, err))?;
    if orientation != Orientation::NoTransforms {
        image.apply_orientation(orientation);
    }

    let mut rgba = image.into_rgba8();
    if let Some(profile) = icc_profile {
        if let Err(err) = to_srgb(&mut rgba, &profile) {
            warn!(target: "codec::image", "keeping unconverted colours for {name}: {err}");
        }
    }

    debug!(
        target: "codec::image",
        name,
        width = rgba.width(),
        height = rgba.height(),
        "decoded source"
    );
    Ok(DecodedImage::from_rgba_image(rgba))
}

/// Decode one of our own PNG tiles back into pixels.
pub(crate) fn decode_png(name: &str, data: &[u8]) -> Result<DecodedImage> {
    let image = image::load_from_memory_with_format(data, image::ImageFormat::Png)
        .map_err(|err| CutError::decode(name, err))?;
    Ok(DecodedImage::from_rgba_image(image.into_rgba8()))
}

fn to_srgb(image: &mut RgbaImage, profile_bytes: &[u8]) -> std::result::Result<(), String> {
    let source = ColorProfile::new_from_slice(profile_bytes).map_err(|err| err.to_string())?;
    let target = ColorProfile::new_srgb();
    let raw = image.as_mut();
    let options = TransformOptions::default();

    match source.create_transform_8bit(Layout::Rgba, &target, Layout::Rgba, options) {
        Ok(transform) => {
            let mut converted = vec![0u8; raw.len()];
            transform.transform(&*raw, &mut converted).map_err(|err| err.to_string())?;
            raw.copy_from_slice(&converted);
            Ok(())
        }
        // Gray and some RGB-only profiles refuse RGBA layouts; run the colour channels alone.
        Err(CmsError::InvalidLayout) => {
            let rgb: Vec<u8> = raw.chunks_exact(4).flat_map(|px| [px[0], px[1], px[2]]).collect();
            let mut converted = vec![0u8; rgb.len()];
            let options = TransformOptions::default();
            source
                .create_transform_8bit(Layout::Rgb, &target, Layout::Rgb, options)
                .map_err(|err| err.to_string())?
                .transform(&rgb, &mut converted)
                .map_err(|err| err.to_string())?;
            for (px, rgb_px) in raw.chunks_exact_mut(4).zip(converted.chunks_exact(3)) {
                px[..3].copy_from_slice(rgb_px);
            }
            Ok(())
        }
        Err(err) => Err(err.to_string()),
    }
}
