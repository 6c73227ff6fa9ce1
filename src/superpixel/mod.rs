//! Superpixel images.
//!
//! - [`discover_slices`] walks an image directory and orders slices by the
//!   Z index in their file names
//! - [`SliceImage`] decodes one PNG and fixes its [`SuperpixelFormat`]
//! - [`decode_label`] turns a single [`PixelColor`] into a raw label

mod decoder;
mod discovery;
mod slice;

pub use decoder::{decode_label, PixelColor, SuperpixelFormat};
pub use discovery::{discover_slices, parse_slice_z, SliceFile, SliceListing};
pub use slice::SliceImage;
