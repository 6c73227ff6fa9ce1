//! Slab tiling, serialization, compression and delivery.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │          LayerAccumulator               │
//! └────────────────────┬────────────────────┘
//!                      │ write_window(layer, z_start)
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │              SlabWriter                 │
//! │  tile_layer ─► encode_slab ─► SlabCodec │
//! └────────────────────┬────────────────────┘
//!                      │ put(slab)
//!          ┌───────────┴───────────┐
//!          ▼                       ▼
//! ┌─────────────────┐    ┌─────────────────────┐
//! │    FileSink     │    │      HttpSink       │
//! └─────────────────┘    └─────────────────────┘
//! ```
//!
//! # Components
//!
//! - [`tile_layer`]: splits a layer into [`SlabBounds`] of at most [`SlabShape`]
//! - [`encode_slab`]: little-endian `u64` serialization in local (z, y, x) order
//! - [`SlabCodec`]: none / LZ4 / gzip compressors selected by [`Compression`]
//! - [`SlabWriter`]: the [`WindowWriter`](crate::layer::WindowWriter) that ties them together

mod codec;
mod encode;
mod tiling;
mod writer;

pub use codec::{Compression, GzipCodec, Lz4Codec, Passthrough, SlabCodec};
pub use encode::{decode_bodies, encode_slab, BYTES_PER_VOXEL};
pub use tiling::{tile_layer, SlabBounds, SlabShape};
pub use writer::{Slab, SlabWriter, WriterStats};
