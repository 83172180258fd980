//! Downscaling used by recompression, built on `fast_image_resize`.

use fast_image_resize as fir;

use crate::codec::DecodedImage;
use crate::error::CutError;
use crate::types::ImageDimensions;

/// Filtering kernels offered to the recompressor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResizeFilter {
    /// Mostly for tests, where exact pixel values matter.
    Nearest,
    #[default]
    Lanczos3,
}

impl From<ResizeFilter> for fir::ResizeAlg {
    fn from(value: ResizeFilter) -> Self {
        match value {
            ResizeFilter::Nearest => fir::ResizeAlg::Nearest,
            ResizeFilter::Lanczos3 => fir::ResizeAlg::Convolution(fir::FilterType::Lanczos3),
        }
    }
}

/// Largest dimensions with the same aspect ratio whose longer side is at most `max_side`.
///
/// Dimensions already within bounds are returned unchanged. Neither side drops below 1.
pub fn fit_within(dimensions: ImageDimensions, max_side: u32) -> ImageDimensions {
    let longest = dimensions.width.max(dimensions.height);
    if longest <= max_side || longest == 0 {
        return dimensions;
    }
    let ratio = max_side.max(1) as f64 / longest as f64;
    scale_dimensions(dimensions, ratio)
}

/// Multiply both sides by `factor`, rounding, with a floor of 1.
pub fn scale_dimensions(dimensions: ImageDimensions, factor: f64) -> ImageDimensions {
    let scale = |side: u32| ((side as f64 * factor).round() as u32).max(1);
    ImageDimensions { width: scale(dimensions.width), height: scale(dimensions.height) }
}

/// Resize an RGBA8888 image to `target`, treating alpha as straight alpha.
pub fn resize_rgba(
    source: &DecodedImage,
    target: ImageDimensions,
    filter: ResizeFilter,
) -> Result<DecodedImage, CutError> {
    let surface_error = |message: String| CutError::Surface {
        width: target.width,
        height: target.height,
        message,
    };
    if source.dimensions.is_empty() || target.is_empty() {
        return Err(surface_error("zero-sized resize".into()));
    }
    if source.dimensions == target {
        return Ok(source.clone());
    }

    let src_view = fir::images::ImageRef::new(
        source.width(),
        source.height(),
        source.pixels(),
        fir::PixelType::U8x4,
    )
    .map_err(|err| surface_error(format!("invalid source buffer: {err}")))?;

    let mut dst_image = fir::images::Image::new(target.width, target.height, fir::PixelType::U8x4);
    let options = fir::ResizeOptions::new().resize_alg(filter.into()).use_alpha(true);

    fir::Resizer::new()
        .resize(&src_view, &mut dst_image, Some(&options))
        .map_err(|err| surface_error(format!("resize failed: {err}")))?;

    Ok(DecodedImage { dimensions: target, pixels: dst_image.into_vec() })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(width: u32, height: u32) -> DecodedImage {
        let mut pixels = Vec::with_capacity((width * height * 4) as usize);
        let wd = width.saturating_sub(1).max(1);
        let hd = height.saturating_sub(1).max(1);
        for y in 0..height {
            for x in 0..width {
                pixels.extend_from_slice(&[(x * 255 / wd) as u8, (y * 255 / hd) as u8, 0, 255]);
            }
        }
        DecodedImage { dimensions: ImageDimensions { width, height }, pixels }
    }

    #[test]
    fn fit_within_preserves_aspect_ratio() {
        let fit = |width, height| fit_within(ImageDimensions::new(width, height), 1920);
        assert_eq!(fit(3840, 1080), ImageDimensions::new(1920, 540));
        assert_eq!(fit(300, 4000), ImageDimensions::new(144, 1920));
        assert_eq!(fit(800, 600), ImageDimensions::new(800, 600));
    }

    #[test]
    fn scale_never_reaches_zero() {
        let scaled = scale_dimensions(ImageDimensions::new(1, 100), 0.01);
        assert_eq!(scaled, ImageDimensions::new(1, 1));
    }

    #[test]
    fn downscale_keeps_gradient_direction() {
        let src = gradient(16, 16);
        let resized = resize_rgba(&src, ImageDimensions::new(4, 4), ResizeFilter::Lanczos3)
            .expect("resize");
        assert_eq!(resized.pixels().len(), 64);

        let first = &resized.pixels()[0..4];
        let last = &resized.pixels()[60..64];
        assert!(first[0] < last[0]);
        assert!(first[1] < last[1]);
    }

    #[test]
    fn same_size_is_identity() {
        let src = gradient(5, 5);
        let resized = resize_rgba(&src, src.dimensions, ResizeFilter::Nearest).unwrap();
        assert_eq!(resized, src);
    }

    #[test]
    fn zero_target_is_rejected() {
        let src = gradient(2, 2);
        let err = resize_rgba(&src, ImageDimensions::new(0, 2), ResizeFilter::Nearest).unwrap_err();
        assert!(matches!(err, CutError::Surface { .. }));
    }
}
