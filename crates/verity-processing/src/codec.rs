//! Raw image bytes to classifier input tensor.

use image::imageops::{self, FilterType};
use image::ImageReader;
use std::io::Cursor;
use verity_core::PipelineError;

const CHANNELS: usize = 3;

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("Unrecognized image format: {0}")]
    Format(#[from] std::io::Error),

    #[error("Failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
}

impl From<CodecError> for PipelineError {
    fn from(err: CodecError) -> Self {
        PipelineError::Decode(format!("Failed to process image: {}", err))
    }
}

/// Normalized image tensor in NHWC layout with a batch of one.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageTensor {
    /// `[1, height, width, 3]`
    pub shape: [usize; 4],
    /// Row-major RGB intensities in `[0, 1]`
    pub data: Vec<f32>,
}

impl ImageTensor {
    pub fn height(&self) -> usize {
        self.shape[1]
    }

    pub fn width(&self) -> usize {
        self.shape[2]
    }
}

/// Decodes, converts to RGB, resizes and normalizes uploads.
///
/// Output depends only on the input bytes and the target dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageCodec {
    width: u32,
    height: u32,
}

impl ImageCodec {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Decode `data` into a `[1, height, width, 3]` tensor.
    ///
    /// CPU-bound; async callers should run it on a blocking thread.
    pub fn encode(&self, data: &[u8]) -> Result<ImageTensor, CodecError> {
        let img = ImageReader::new(Cursor::new(data))
            .with_guessed_format()?
            .decode()?;

        let rgb = img.to_rgb8();
        let resized = if rgb.dimensions() == (self.width, self.height) {
            rgb
        } else {
            imageops::resize(&rgb, self.width, self.height, FilterType::CatmullRom)
        };

        let data: Vec<f32> = resized
            .into_raw()
            .into_iter()
            .map(|v| f32::from(v) / 255.0)
            .collect();

        Ok(ImageTensor {
            shape: [1, self.height as usize, self.width as usize, CHANNELS],
            data,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba, RgbaImage};

    fn png_bytes(width: u32, height: u32, color: [u8; 4]) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, Rgba(color));
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    #[test]
    fn test_encode_shape_and_range() {
        let codec = ImageCodec::new(32, 16);
        let tensor = codec.encode(&png_bytes(100, 60, [255, 0, 128, 255])).unwrap();

        assert_eq!(tensor.shape, [1, 16, 32, 3]);
        assert_eq!(tensor.height(), 16);
        assert_eq!(tensor.width(), 32);
        assert_eq!(tensor.data.len(), 16 * 32 * 3);
        assert!(tensor.data.iter().all(|v| (0.0..=1.0).contains(v)));
    }

    #[test]
    fn test_encode_drops_alpha_and_normalizes() {
        let codec = ImageCodec::new(4, 4);
        let tensor = codec.encode(&png_bytes(4, 4, [255, 0, 51, 10])).unwrap();

        assert_eq!(&tensor.data[..3], &[1.0, 0.0, 0.2]);
    }

    #[test]
    fn test_encode_is_deterministic() {
        let codec = ImageCodec::new(24, 24);
        let bytes = png_bytes(50, 37, [12, 200, 99, 255]);
        assert_eq!(codec.encode(&bytes).unwrap(), codec.encode(&bytes).unwrap());
    }

    #[test]
    fn test_encode_rejects_garbage() {
        let codec = ImageCodec::new(8, 8);
        assert!(codec.encode(b"definitely not an image").is_err());
        assert!(codec.encode(&[]).is_err());
    }

    #[test]
    fn test_codec_error_becomes_decode_pipeline_error() {
        let codec = ImageCodec::new(8, 8);
        let err: PipelineError = codec.encode(b"garbage").unwrap_err().into();
        assert!(matches!(err, PipelineError::Decode(ref reason) if reason.starts_with("Failed to process image")));
    }
}
