// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Image loading.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use image::{DynamicImage, RgbImage};
use ndarray::Array3;

use crate::error::{Result, VizError};

/// Load an image as an RGB float array of shape (height, width, 3).
///
/// Pixel values are multiplied by `scale / 255`, so `scale = 1.0` maps them into `[0, 1]`.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or is not a decodable image.
pub fn load_image(path: impl AsRef<Path>, scale: f32) -> Result<Array3<f32>> {
    let rgb = decode_rgb(path.as_ref())?;
    rgb_to_array(&rgb, scale)
}

/// Decode an image file to 8-bit RGB.
///
/// JPEG files go through `jpeg-decoder` first; everything else, and any JPEG it fails on,
/// through the `image` crate.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or decoded.
pub fn decode_rgb(path: &Path) -> Result<RgbImage> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase);

    if matches!(ext.as_deref(), Some("jpg" | "jpeg")) {
        if let Some(rgb) = decode_jpeg(path) {
            return Ok(rgb);
        }
    }

    let image = image::ImageReader::open(path)?
        .with_guessed_format()?
        .decode()?;
    Ok(image.to_rgb8())
}

fn decode_jpeg(path: &Path) -> Option<RgbImage> {
    let file = File::open(path).ok()?;
    let mut decoder = jpeg_decoder::Decoder::new(BufReader::new(file));
    let pixels = decoder.decode().ok()?;
    let info = decoder.info()?;
    let (width, height) = (u32::from(info.width), u32::from(info.height));

    match info.pixel_format {
        jpeg_decoder::PixelFormat::RGB24 => RgbImage::from_raw(width, height, pixels),
        jpeg_decoder::PixelFormat::L8 => {
            image::GrayImage::from_raw(width, height, pixels)
                .map(|gray| DynamicImage::ImageLuma8(gray).to_rgb8())
        }
        _ => None,
    }
}

/// Convert an RGB image to a (height, width, 3) float array scaled by `scale / 255`.
///
/// # Errors
///
/// Returns an error if the pixel buffer does not match the image dimensions.
pub fn rgb_to_array(rgb: &RgbImage, scale: f32) -> Result<Array3<f32>> {
    let (width, height) = rgb.dimensions();
    let factor = scale / 255.0;
    let pixels: Vec<f32> = rgb.as_raw().iter().map(|&p| f32::from(p) * factor).collect();

    Array3::from_shape_vec((height as usize, width as usize, 3), pixels)
        .map_err(|e| VizError::ImageError(format!("Failed to create array from image pixels: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("poseviz-io-{}-{name}", std::process::id()))
    }

    #[test]
    fn test_black_image_loads_as_zeros() {
        let path = temp_path("black.png");
        RgbImage::from_pixel(7, 5, Rgb([0, 0, 0])).save(&path).unwrap();

        let array = load_image(&path, 1.0).unwrap();
        assert_eq!(array.shape(), &[5, 7, 3]);
        assert!(array.iter().all(|&v| v == 0.0));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_scale_applies() {
        let rgb = RgbImage::from_pixel(2, 1, Rgb([255, 51, 0]));
        let array = rgb_to_array(&rgb, 2.0).unwrap();
        assert!((array[[0, 0, 0]] - 2.0).abs() < 1e-6);
        assert!((array[[0, 1, 1]] - 0.4).abs() < 1e-6);
        assert!(array[[0, 1, 2]].abs() < 1e-6);
    }

    #[test]
    fn test_jpeg_roundtrip_shape() {
        let path = temp_path("gray.jpg");
        RgbImage::from_pixel(16, 8, Rgb([128, 128, 128]))
            .save(&path)
            .unwrap();

        let array = load_image(&path, 1.0).unwrap();
        assert_eq!(array.shape(), &[8, 16, 3]);
        assert!(array.iter().all(|&v| (v - 128.0 / 255.0).abs() < 0.05));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = load_image("/nonexistent/poseviz/missing.png", 1.0);
        assert!(matches!(result, Err(VizError::Io(_))));
    }

    #[test]
    fn test_garbage_file_is_image_error() {
        let path = temp_path("garbage.png");
        std::fs::write(&path, b"not an image at all").unwrap();
        let result = load_image(&path, 1.0);
        assert!(matches!(result, Err(VizError::ImageError(_))));
        let _ = std::fs::remove_file(&path);
    }
}
