//! Region-of-interest filtering.
//!
//! An ROI is a list of inclusive block x-runs ([`Span`]s) sorted ascending by
//! `(z, y, x0)`. Voxels map to blocks by integer division with the ROI block
//! size. Because pixels are visited in raster order, membership is answered
//! with a [`SpanCursor`] that only ever moves forward through the span list.

mod cursor;
mod span;

pub use cursor::SpanCursor;
pub use span::{BlockCoord, Roi, Span};
