//! Pixel -> superpixel label decoding.
//!
//! Raveler stores superpixel ids either as the intensity of a 16-bit gray
//! image, or packed into the color channels of an 8-bit RGBA image as
//! `R + 256 * G + 65536 * B`.

use std::fmt;

use crate::error::DecodeError;

/// How superpixel ids are encoded in an image's pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuperpixelFormat {
    /// No format declared; nothing can be decoded.
    None,

    /// 16-bit gray: intensity is the superpixel id.
    Gray16,

    /// 24-bit id packed little-endian into the R, G, B channels.
    Rgb24,
}

impl SuperpixelFormat {
    pub const fn name(&self) -> &'static str {
        match self {
            SuperpixelFormat::None => "none",
            SuperpixelFormat::Gray16 => "16-bit gray",
            SuperpixelFormat::Rgb24 => "24-bit RGB",
        }
    }
}

impl fmt::Display for SuperpixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single pixel sample as produced by an image accessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelColor {
    Gray16(u16),

    /// Alpha-premultiplied 8-bit RGBA.
    Rgba([u8; 4]),

    /// Non-premultiplied 8-bit RGBA.
    Nrgba([u8; 4]),

    /// Any other sample type, by name.
    Other(&'static str),
}

impl PixelColor {
    pub const fn kind(&self) -> &'static str {
        match self {
            PixelColor::Gray16(_) => "Gray16",
            PixelColor::Rgba(_) => "RGBA",
            PixelColor::Nrgba(_) => "NRGBA",
            PixelColor::Other(kind) => kind,
        }
    }
}

/// Decode the raw 32-bit superpixel label of one pixel.
#[inline]
pub fn decode_label(color: PixelColor, format: SuperpixelFormat) -> Result<u32, DecodeError> {
    match format {
        SuperpixelFormat::Rgb24 => match color {
            PixelColor::Rgba([r, g, b, _]) | PixelColor::Nrgba([r, g, b, _]) => {
                Ok(u32::from_le_bytes([r, g, b, 0]))
            }
            other => Err(DecodeError::UnsupportedColorModel {
                expected: "32-bit RGBA",
                got: other.kind(),
            }),
        },
        SuperpixelFormat::Gray16 => match color {
            PixelColor::Gray16(value) => Ok(u32::from(value)),
            other => Err(DecodeError::UnsupportedColorModel {
                expected: "16-bit gray",
                got: other.kind(),
            }),
        },
        SuperpixelFormat::None => Err(DecodeError::UnknownSuperpixelFormat(
            format.name().to_string(),
        )),
    }
}
