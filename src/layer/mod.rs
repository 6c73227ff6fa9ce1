//! Layer accumulation.
//!
//! Slices are stacked into a [`Layer`] `slab.z` slices deep. Slice `z`
//! belongs to the window starting at [`window_start`]`(z, depth)`; when a
//! slice from a new window arrives, the buffered window is handed to a
//! [`WindowWriter`] and the layer is zeroed for reuse.
//!
//! ```text
//!  slice z ──► BodyResolver ──► Layer[z - window_start] ──► WindowWriter
//!               (ROI, table,        (nx × ny × depth)        (on window
//!                offset)                                      change/end)
//! ```

mod accumulator;
mod buffer;
mod resolve;

pub use accumulator::{AccumulatorState, AccumulatorStats, LayerAccumulator, WindowWriter};
pub use buffer::{window_start, Layer};
pub use resolve::{BodyResolver, SliceStats};
