//! Image header probing and display sizing.

use std::io::Cursor;

use image::ImageReader;

/// Format and pixel size read from an encoded image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageInfo {
    pub content_type: &'static str,
    pub width: u32,
    pub height: u32,
}

/// Read the format and dimensions of encoded image bytes.
///
/// Only the header is decoded.
///
/// # Errors
///
/// Returns a description of the problem if the bytes are not a supported image.
pub fn probe_image(data: &[u8]) -> Result<ImageInfo, String> {
    if data.is_empty() {
        return Err("empty response body".to_owned());
    }

    let reader = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| e.to_string())?;
    let Some(format) = reader.format() else {
        return Err("unrecognized image format".to_owned());
    };
    let (width, height) = reader.into_dimensions().map_err(|e| e.to_string())?;

    Ok(ImageInfo {
        content_type: format.to_mime_type(),
        width,
        height,
    })
}

/// Scale `(width, height)` down proportionally so width fits `max_width`.
///
/// Height is rounded and never drops below one pixel.
#[must_use]
pub fn fit_to_width(width: u32, height: u32, max_width: u32) -> (u32, u32) {
    if width <= max_width || width == 0 {
        return (width, height);
    }

    let scaled = (u64::from(height) * u64::from(max_width) + u64::from(width) / 2) / u64::from(width);
    let scaled = u32::try_from(scaled).unwrap_or(u32::MAX).max(1);
    (max_width, scaled)
}

#[cfg(test)]
pub(crate) mod tests {
    use image::{ImageFormat, RgbaImage};
    use pretty_assertions::assert_eq;

    use super::*;

    /// Encode a blank image in `format`.
    pub(crate) fn encoded_image(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
        let mut buf = Vec::new();
        let image = image::DynamicImage::ImageRgba8(RgbaImage::new(width, height));
        let image = if format == ImageFormat::Jpeg {
            image::DynamicImage::ImageRgb8(image.to_rgb8())
        } else {
            image
        };
        image.write_to(&mut Cursor::new(&mut buf), format).unwrap();
        buf
    }

    #[test]
    fn test_probe_png() {
        let info = probe_image(&encoded_image(40, 20, ImageFormat::Png)).unwrap();
        assert_eq!(
            info,
            ImageInfo {
                content_type: "image/png",
                width: 40,
                height: 20,
            }
        );
    }

    #[test]
    fn test_probe_jpeg() {
        let info = probe_image(&encoded_image(16, 8, ImageFormat::Jpeg)).unwrap();
        assert_eq!(info.content_type, "image/jpeg");
        assert_eq!((info.width, info.height), (16, 8));
    }

    #[test]
    fn test_probe_rejects_text() {
        let err = probe_image(b"<html>Service Unavailable</html>").unwrap_err();
        assert_eq!(err, "unrecognized image format");
    }

    #[test]
    fn test_probe_rejects_empty() {
        assert!(probe_image(&[]).is_err());
    }

    #[test]
    fn test_fit_keeps_narrow_image() {
        assert_eq!(fit_to_width(400, 300, 600), (400, 300));
        assert_eq!(fit_to_width(600, 300, 600), (600, 300));
    }

    #[test]
    fn test_fit_scales_wide_image() {
        assert_eq!(fit_to_width(1200, 800, 600), (600, 400));
        assert_eq!(fit_to_width(800, 333, 600), (600, 250));
    }

    #[test]
    fn test_fit_keeps_minimum_height() {
        assert_eq!(fit_to_width(10_000, 1, 600), (600, 1));
    }
}
