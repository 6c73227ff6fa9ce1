//! Superpixel -> body lookup tables.
//!
//! Raveler exports describe bodies through two chained text maps:
//!
//! ```text
//! (slice, superpixel) ──► segment ──► body
//!   superpixel_to_segment    segment_to_body
//! ```
//!
//! [`SegmentBodyMap`] holds the second hop. [`SuperpixelBodyMap`] consumes it
//! while reading the first hop, so only the composed table stays in memory
//! for the rest of the run.

mod segment_body;
mod superpixel_body;

pub use segment_body::SegmentBodyMap;
pub use superpixel_body::{Superpixel, SuperpixelBodyMap, MAX_SUPERPIXEL_ID};
