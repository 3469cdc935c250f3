//! Image decoding and tensor preparation
//!
//! Uploaded bytes are decoded (format sniffed from content), converted to 8-bit RGB,
//! resized to the model's input size with bicubic resampling and scaled to [0, 1].
//! The result is channels-last with a leading batch axis: `[1, height, width, 3]`.

use image::imageops::{self, FilterType};
use image::RgbImage;
use tract_onnx::prelude::tract_ndarray::Array4;

use super::ClassifyError;

/// Resizes and normalizes images for the model input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preprocessor {
    width: u32,
    height: u32,
}

impl Preprocessor {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Square input of `size` x `size`
    pub fn square(size: u32) -> Self {
        Self::new(size, size)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Decode an uploaded file into an RGB bitmap
    ///
    /// Greyscale, alpha and palette images are converted to plain RGB.
    pub fn decode(&self, bytes: &[u8]) -> Result<RgbImage, ClassifyError> {
        if bytes.is_empty() {
            return Err(ClassifyError::EmptyInput);
        }
        let image = image::load_from_memory(bytes)?;
        Ok(image.to_rgb8())
    }

    /// Resize to the input size and scale into a `[1, H, W, 3]` tensor
    pub fn to_tensor(&self, image: &RgbImage) -> Array4<f32> {
        let resized = if image.dimensions() == (self.width, self.height) {
            image.clone()
        } else {
            imageops::resize(image, self.width, self.height, FilterType::CatmullRom)
        };

        let shape = (1, self.height as usize, self.width as usize, 3);
        Array4::from_shape_fn(shape, |(_, y, x, c)| {
            f32::from(resized.get_pixel(x as u32, y as u32)[c]) / 255.0
        })
    }

    /// Decode and convert in one step
    pub fn prepare(&self, bytes: &[u8]) -> Result<Array4<f32>, ClassifyError> {
        let image = self.decode(bytes)?;
        Ok(self.to_tensor(&image))
    }
}

impl Default for Preprocessor {
    fn default() -> Self {
        Self::square(rps_common::config::DEFAULT_IMAGE_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, GrayImage, ImageFormat, Luma, Rgb, Rgba, RgbaImage};
    use std::io::Cursor;

    fn encode(image: DynamicImage, format: ImageFormat) -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        image.write_to(&mut buf, format).expect("Should encode image");
        buf.into_inner()
    }

    #[test]
    fn test_tensor_shape_is_batched_channels_last() {
        let image = RgbImage::from_pixel(640, 480, Rgb([10, 20, 30]));
        let tensor = Preprocessor::square(224).to_tensor(&image);

        assert_eq!(tensor.shape(), &[1, 224, 224, 3]);
    }

    #[test]
    fn test_non_square_target() {
        let image = RgbImage::from_pixel(50, 50, Rgb([0, 0, 0]));
        let tensor = Preprocessor::new(32, 16).to_tensor(&image);

        assert_eq!(tensor.shape(), &[1, 16, 32, 3]);
    }

    #[test]
    fn test_values_scaled_to_unit_range() {
        let image = RgbImage::from_pixel(8, 8, Rgb([255, 0, 51]));
        let tensor = Preprocessor::square(8).to_tensor(&image);

        assert!((tensor[[0, 3, 4, 0]] - 1.0).abs() < 1e-6);
        assert_eq!(tensor[[0, 3, 4, 1]], 0.0);
        assert!((tensor[[0, 3, 4, 2]] - 0.2).abs() < 1e-6);
        assert!(tensor.iter().all(|v| (0.0..=1.0).contains(v)));
    }

    #[test]
    fn test_channel_order_preserved() {
        let mut image = RgbImage::from_pixel(2, 1, Rgb([0, 0, 0]));
        image.put_pixel(1, 0, Rgb([255, 128, 0]));
        let tensor = Preprocessor::new(2, 1).to_tensor(&image);

        assert_eq!(tensor[[0, 0, 0, 0]], 0.0);
        assert_eq!(tensor[[0, 0, 1, 0]], 1.0);
        assert!((tensor[[0, 0, 1, 1]] - 128.0 / 255.0).abs() < 1e-6);
        assert_eq!(tensor[[0, 0, 1, 2]], 0.0);
    }

    #[test]
    fn test_decode_png() {
        let bytes = encode(
            DynamicImage::ImageRgb8(RgbImage::from_pixel(12, 7, Rgb([1, 2, 3]))),
            ImageFormat::Png,
        );
        let decoded = Preprocessor::default().decode(&bytes).unwrap();

        assert_eq!(decoded.dimensions(), (12, 7));
        assert_eq!(decoded.get_pixel(0, 0), &Rgb([1, 2, 3]));
    }

    #[test]
    fn test_decode_converts_greyscale_to_rgb() {
        let bytes = encode(
            DynamicImage::ImageLuma8(GrayImage::from_pixel(4, 4, Luma([200]))),
            ImageFormat::Png,
        );
        let decoded = Preprocessor::default().decode(&bytes).unwrap();

        assert_eq!(decoded.get_pixel(2, 2), &Rgb([200, 200, 200]));
    }

    #[test]
    fn test_decode_drops_alpha() {
        let bytes = encode(
            DynamicImage::ImageRgba8(RgbaImage::from_pixel(4, 4, Rgba([9, 8, 7, 0]))),
            ImageFormat::Png,
        );
        let decoded = Preprocessor::default().decode(&bytes).unwrap();

        assert_eq!(decoded.get_pixel(1, 1), &Rgb([9, 8, 7]));
    }

    #[test]
    fn test_decode_rejects_garbage() {
        let result = Preprocessor::default().decode(b"definitely not an image");
        assert!(matches!(result, Err(ClassifyError::InvalidImage(_))));
    }

    #[test]
    fn test_decode_rejects_empty() {
        let result = Preprocessor::default().decode(&[]);
        assert!(matches!(result, Err(ClassifyError::EmptyInput)));
    }

    #[test]
    fn test_prepare_resizes_decoded_upload() {
        let bytes = encode(
            DynamicImage::ImageRgb8(RgbImage::from_pixel(300, 100, Rgb([255, 255, 255]))),
            ImageFormat::Png,
        );
        let tensor = Preprocessor::square(64).prepare(&bytes).unwrap();

        assert_eq!(tensor.shape(), &[1, 64, 64, 3]);
        assert!(tensor.iter().all(|v| (v - 1.0).abs() < 0.005));
    }
}
