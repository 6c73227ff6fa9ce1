//! # Raveler Exporter
//!
//! Reconstructs a 3-D body-label volume from a Raveler export (a stack of
//! superpixel PNGs plus superpixel->segment and segment->body maps) and
//! writes it out as compressed rectangular slabs.
//!
//! ## Features
//!
//! - **Two-hop label resolution**: `(slice, superpixel) -> segment -> body`,
//!   composed once at load time
//! - **ROI filtering**: optional block-span mask evaluated with a forward-only cursor
//! - **Bounded memory**: only one `nx × ny × slab_z` layer is buffered at a time
//! - **Compression**: none, LZ4 or gzip per slab
//! - **Delivery**: local files and/or POSTs to a remote volume store, retrying
//!   while the store reports overload
//!
//! ## Architecture
//!
//! - [`mapping`] - segment->body and superpixel->body tables
//! - [`roi`] - region-of-interest spans and cursor
//! - [`superpixel`] - slice discovery, PNG decoding, label decoding
//! - [`layer`] - Z-window accumulation
//! - [`slab`] - tiling, serialization, compression
//! - [`sink`] - file and HTTP destinations
//! - [`pipeline`] - the end-to-end [`Exporter`]
//! - [`config`] - CLI and run configuration
//!
//! ## Example
//!
//! ```rust,no_run
//! use raveler_exporter::{ExportConfig, ExportInputs, Exporter};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ExportConfig {
//!         outdir: Some("slabs".into()),
//!         ..ExportConfig::default()
//!     };
//!     let inputs = ExportInputs {
//!         superpixel_to_segment: "superpixel_to_segment_map.txt".into(),
//!         segment_to_body: "segment_to_body_map.txt".into(),
//!         superpixel_dir: "superpixel_maps".into(),
//!         roi: None,
//!     };
//!
//!     let summary = Exporter::new(config).run(&inputs).await?;
//!     println!("wrote {} slabs", summary.slabs_written);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod io;
pub mod layer;
pub mod mapping;
pub mod pipeline;
pub mod roi;
pub mod sink;
pub mod slab;
pub mod superpixel;

// Re-export commonly used types
pub use config::{Config, ExportConfig};
pub use error::{CodecError, DecodeError, ExportError, RoiError, SinkError, TableError};
pub use io::RecordReader;
pub use layer::{
    window_start, AccumulatorState, AccumulatorStats, BodyResolver, Layer, LayerAccumulator,
    SliceStats, WindowWriter,
};
pub use mapping::{SegmentBodyMap, Superpixel, SuperpixelBodyMap, MAX_SUPERPIXEL_ID};
pub use pipeline::{ExportInputs, ExportSummary, Exporter};
pub use roi::{BlockCoord, Roi, Span, SpanCursor};
pub use sink::{slab_file_name, slab_url, FileSink, HttpSink, RetryPolicy, SlabSink};
pub use slab::{
    decode_bodies, encode_slab, tile_layer, Compression, GzipCodec, Lz4Codec, Passthrough, Slab,
    SlabBounds, SlabCodec, SlabShape, SlabWriter, WriterStats,
};
pub use superpixel::{
    decode_label, discover_slices, parse_slice_z, PixelColor, SliceFile, SliceImage,
    SliceListing, SuperpixelFormat,
};
