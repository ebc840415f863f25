use std::path::Path;

use image::DynamicImage;
use tracing::debug;

use crate::error::{Result, SceneError};
use crate::types::DecodedTexture;

/// Turns an image file into linear RGBA32F pixels.
///
/// Implementations must be shareable across threads: distinct files are
/// decoded in parallel.
pub trait TextureDecoder: Send + Sync {
    fn decode(&self, path: &Path) -> Result<DecodedTexture>;
}

/// Decoder backed by the `image` crate (PNG, JPEG, WebP, HDR, EXR).
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageDecoder;

impl TextureDecoder for ImageDecoder {
    fn decode(&self, path: &Path) -> Result<DecodedTexture> {
        let img = image::open(path).map_err(|e| {
            SceneError::Decode(format!("Failed to decode texture {}: {e}", path.display()))
        })?;

        let texture = to_linear_rgba(img, path);
        debug!(
            path = %path.display(),
            width = texture.width,
            height = texture.height,
            hdr = texture.is_hdr,
            "Decoded texture"
        );
        Ok(texture)
    }
}

/// Expand to RGBA32F. Float images are already linear; everything else is
/// treated as sRGB and linearized on the color channels (alpha untouched).
pub fn to_linear_rgba(img: DynamicImage, path: &Path) -> DecodedTexture {
    let is_hdr = matches!(
        img,
        DynamicImage::ImageRgb32F(_) | DynamicImage::ImageRgba32F(_)
    );
    let width = img.width();
    let height = img.height();

    let mut pixels = img.into_rgba32f().into_raw();
    if !is_hdr {
        for px in pixels.chunks_exact_mut(4) {
            for c in &mut px[..3] {
                *c = srgb_to_linear(*c);
            }
        }
    }

    DecodedTexture {
        pixels,
        width,
        height,
        is_hdr,
        path: path.to_path_buf(),
    }
}

/// IEC 61966-2-1 sRGB transfer function, inverted.
pub fn srgb_to_linear(value: f32) -> f32 {
    if value <= 0.04045 {
        value / 12.92
    } else {
        ((value + 0.055) / 1.055).powf(2.4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn srgb_curve_endpoints() {
        assert_eq!(srgb_to_linear(0.0), 0.0);
        assert_abs_diff_eq!(srgb_to_linear(1.0), 1.0, epsilon = 1e-6);
        assert_abs_diff_eq!(srgb_to_linear(0.5), 0.214_041, epsilon = 1e-5);
        assert_abs_diff_eq!(srgb_to_linear(0.04), 0.04 / 12.92, epsilon = 1e-7);
    }

    #[test]
    fn ldr_image_is_linearized_alpha_kept() {
        let img = image::RgbaImage::from_pixel(2, 1, image::Rgba([255, 128, 0, 128]));
        let tex = to_linear_rgba(DynamicImage::ImageRgba8(img), Path::new("a.png"));

        assert!(!tex.is_hdr);
        assert!(tex.is_valid());
        assert_eq!((tex.width, tex.height), (2, 1));
        assert_abs_diff_eq!(tex.pixels[0], 1.0, epsilon = 1e-6);
        assert_abs_diff_eq!(tex.pixels[1], srgb_to_linear(128.0 / 255.0), epsilon = 1e-6);
        assert_eq!(tex.pixels[2], 0.0);
        assert_abs_diff_eq!(tex.pixels[3], 128.0 / 255.0, epsilon = 1e-6);
    }

    #[test]
    fn hdr_image_stays_linear() {
        let img = image::Rgb32FImage::from_pixel(1, 1, image::Rgb([4.0, 0.5, 0.25]));
        let tex = to_linear_rgba(DynamicImage::ImageRgb32F(img), Path::new("sky.hdr"));

        assert!(tex.is_hdr);
        assert_eq!(tex.pixels, vec![4.0, 0.5, 0.25, 1.0]);
    }

    #[test]
    fn decode_png_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("checker.png");
        image::RgbaImage::from_fn(4, 2, |x, _| {
            if x % 2 == 0 {
                image::Rgba([255, 255, 255, 255])
            } else {
                image::Rgba([0, 0, 0, 255])
            }
        })
        .save(&path)
        .unwrap();

        let tex = ImageDecoder.decode(&path).unwrap();
        assert_eq!((tex.width, tex.height), (4, 2));
        assert_eq!(tex.pixels.len(), 4 * 2 * 4);
        assert_eq!(tex.path, path);
    }

    #[test]
    fn decode_missing_file_fails() {
        let err = ImageDecoder
            .decode(Path::new("/nonexistent/texture.png"))
            .unwrap_err();
        assert!(matches!(err, SceneError::Decode(_)));
    }
}
