//! Tile encoders: lossless PNG for crops and quality-controlled JPEG for recompression.

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder as _, RgbImage};

use crate::types::ImageDimensions;

/// Lowest JPEG quality the encoder accepts.
pub const MIN_JPEG_QUALITY: u8 = 1;

/// Highest JPEG quality the encoder accepts.
pub const MAX_JPEG_QUALITY: u8 = 100;

/// Encode an RGBA8888 buffer as PNG.
pub fn encode_png(
    dimensions: ImageDimensions,
    rgba: &[u8],
) -> std::result::Result<Vec<u8>, image::ImageError> {
    let mut output = Vec::new();
    PngEncoder::new(&mut output).write_image(
        rgba,
        dimensions.width,
        dimensions.height,
        ExtendedColorType::Rgba8,
    )?;
    Ok(output)
}

/// Encode an RGB image as baseline JPEG. `quality` is clamped to 1..=100.
pub fn encode_jpeg(
    image: &RgbImage,
    quality: u8,
) -> std::result::Result<Vec<u8>, image::ImageError> {
    let quality = quality.clamp(MIN_JPEG_QUALITY, MAX_JPEG_QUALITY);
    let mut output = Vec::new();
    JpegEncoder::new_with_quality(&mut output, quality).encode_image(image)?;
    Ok(output)
}

/// Composite straight-alpha RGBA over an opaque white background.
pub fn flatten_onto_white(dimensions: ImageDimensions, rgba: &[u8]) -> RgbImage {
    let mut rgb = Vec::with_capacity(rgba.len() / 4 * 3);
    for px in rgba.chunks_exact(4) {
        let alpha = px[3] as u32;
        for &channel in &px[..3] {
            let blended = (channel as u32 * alpha + 255 * (255 - alpha) + 127) / 255;
            rgb.push(blended as u8);
        }
    }
    RgbImage::from_raw(dimensions.width, dimensions.height, rgb)
        .unwrap_or_else(|| RgbImage::new(dimensions.width, dimensions.height))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn png_round_trips_pixels() {
        let dims = ImageDimensions::new(2, 1);
        let rgba = [10, 20, 30, 40, 250, 240, 230, 255];
        let png = encode_png(dims, &rgba).expect("encode png");

        let decoded = image::load_from_memory(&png).expect("decode").into_rgba8();
        assert_eq!(decoded.as_raw().as_slice(), &rgba);
    }

    #[test]
    fn lower_quality_produces_smaller_jpeg() {
        let image = RgbImage::from_fn(64, 64, |x, y| {
            image::Rgb([(x * 4) as u8, (y * 4) as u8, ((x ^ y) * 4) as u8])
        });
        let high = encode_jpeg(&image, 95).expect("encode high");
        let low = encode_jpeg(&image, 10).expect("encode low");
        assert!(low.len() < high.len());
        assert_eq!(&high[..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn flattening_blends_towards_white() {
        let dims = ImageDimensions::new(3, 1);
        let rgba = [0, 0, 0, 255, 0, 0, 0, 0, 100, 100, 100, 128];
        let rgb = flatten_onto_white(dims, &rgba);

        assert_eq!(rgb.get_pixel(0, 0).0, [0, 0, 0]);
        assert_eq!(rgb.get_pixel(1, 0).0, [255, 255, 255]);
        let mid = rgb.get_pixel(2, 0).0[0];
        assert!(mid > 100 && mid < 255);
    }
}
