use std::path::Path;

use image::{DynamicImage, ImageBuffer, ImageFormat, ImageReader, Luma, RgbaImage};

use crate::error::DecodeError;

use super::decoder::{decode_label, PixelColor, SuperpixelFormat};

/// One decoded superpixel image (a single Z slice).
///
/// The image's pixel type fixes the [`SuperpixelFormat`] for every pixel:
/// 16-bit gray images hold 16-bit ids, 8-bit color images hold 24-bit
/// RGB-packed ids. Truecolor PNGs without an alpha channel are read as
/// opaque RGBA.
#[derive(Debug, Clone)]
pub struct SliceImage {
    pixels: Pixels,
}

#[derive(Debug, Clone)]
enum Pixels {
    Gray16(ImageBuffer<Luma<u16>, Vec<u16>>),
    Rgba8(RgbaImage),
}

impl SliceImage {
    /// Read and decode a PNG superpixel image.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DecodeError> {
        let path = path.as_ref();
        let image_error = |message: String| DecodeError::Image {
            path: path.display().to_string(),
            message,
        };

        let reader = ImageReader::open(path)
            .and_then(|r| r.with_guessed_format())
            .map_err(|e| image_error(e.to_string()))?;
        if reader.format() != Some(ImageFormat::Png) {
            return Err(image_error("superpixel image was not PNG formatted".to_string()));
        }
        let image = reader.decode().map_err(|e| image_error(e.to_string()))?;

        Self::from_dynamic(image).map_err(|e| match e {
            DecodeError::UnsupportedImageType { kind, .. } => DecodeError::UnsupportedImageType {
                path: path.display().to_string(),
                kind,
            },
            other => other,
        })
    }

    /// Wrap an already decoded image, rejecting unsupported pixel types.
    pub fn from_dynamic(image: DynamicImage) -> Result<Self, DecodeError> {
        let pixels = match image {
            DynamicImage::ImageLuma16(buf) => Pixels::Gray16(buf),
            DynamicImage::ImageRgba8(buf) => Pixels::Rgba8(buf),
            DynamicImage::ImageRgb8(buf) => Pixels::Rgba8(DynamicImage::ImageRgb8(buf).into_rgba8()),
            other => {
                return Err(DecodeError::UnsupportedImageType {
                    path: String::from("<memory>"),
                    kind: format!("{:?}", other.color()),
                })
            }
        };
        Ok(Self { pixels })
    }

    pub fn width(&self) -> u32 {
        match &self.pixels {
            Pixels::Gray16(buf) => buf.width(),
            Pixels::Rgba8(buf) => buf.width(),
        }
    }

    pub fn height(&self) -> u32 {
        match &self.pixels {
            Pixels::Gray16(buf) => buf.height(),
            Pixels::Rgba8(buf) => buf.height(),
        }
    }

    /// Superpixel encoding implied by the image type.
    pub fn format(&self) -> SuperpixelFormat {
        match &self.pixels {
            Pixels::Gray16(_) => SuperpixelFormat::Gray16,
            Pixels::Rgba8(_) => SuperpixelFormat::Rgb24,
        }
    }

    /// Pixel sample at `(x, y)`.
    ///
    /// # Panics
    /// Panics if `(x, y)` is outside the image bounds.
    #[inline]
    pub fn color_at(&self, x: u32, y: u32) -> PixelColor {
        match &self.pixels {
            Pixels::Gray16(buf) => PixelColor::Gray16(buf.get_pixel(x, y).0[0]),
            Pixels::Rgba8(buf) => PixelColor::Nrgba(buf.get_pixel(x, y).0),
        }
    }

    /// Raw superpixel label at `(x, y)`.
    #[inline]
    pub fn label_at(&self, x: u32, y: u32) -> Result<u32, DecodeError> {
        decode_label(self.color_at(x, y), self.format())
    }
}
