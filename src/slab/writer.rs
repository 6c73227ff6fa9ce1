use async_trait::async_trait;
use bytes::Bytes;
use tracing::debug;

use crate::config::ExportConfig;
use crate::error::ExportError;
use crate::layer::{Layer, WindowWriter};
use crate::sink::SlabSink;

use super::codec::{Compression, SlabCodec};
use super::encode::encode_slab;
use super::tiling::{tile_layer, SlabBounds, SlabShape};

/// A compressed slab ready for delivery.
#[derive(Debug, Clone)]
pub struct Slab {
    pub bounds: SlabBounds,
    pub compression: Compression,

    /// Serialized size before compression
    pub raw_len: usize,

    pub data: Bytes,
}

/// Totals across every slab a writer has delivered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriterStats {
    pub slabs: usize,
    pub raw_bytes: u64,
    pub compressed_bytes: u64,
}

/// Tiles each flushed layer, compresses every tile and delivers it to all
/// configured sinks in turn.
pub struct SlabWriter {
    shape: SlabShape,
    codec: Box<dyn SlabCodec>,
    sinks: Vec<Box<dyn SlabSink>>,
    stats: WriterStats,
}

impl SlabWriter {
    /// Writer with no sinks; add them with [`with_sink`](Self::with_sink).
    pub fn new(config: &ExportConfig) -> Self {
        Self {
            shape: config.slab,
            codec: config.compression.codec(),
            sinks: Vec::new(),
            stats: WriterStats::default(),
        }
    }

    pub fn with_sink(mut self, sink: impl SlabSink + 'static) -> Self {
        self.sinks.push(Box::new(sink));
        self
    }

    pub fn sink_count(&self) -> usize {
        self.sinks.len()
    }

    pub fn stats(&self) -> &WriterStats {
        &self.stats
    }

    /// Serialize and compress one tile of `layer`.
    pub fn build_slab(&self, layer: &Layer, bounds: SlabBounds) -> Result<Slab, ExportError> {
        let raw = encode_slab(layer, &bounds);
        let data = self.codec.compress(&raw)?;
        Ok(Slab {
            bounds,
            compression: self.codec.compression(),
            raw_len: raw.len(),
            data,
        })
    }
}

#[async_trait]
impl WindowWriter for SlabWriter {
    async fn write_window(&mut self, layer: &Layer, z_start: u32) -> Result<(), ExportError> {
        for bounds in tile_layer(layer.nx(), layer.ny(), layer.depth(), z_start, self.shape) {
            let slab = self.build_slab(layer, bounds)?;
            for sink in &self.sinks {
                sink.put(&slab).await?;
            }

            debug!(
                ox = bounds.ox,
                oy = bounds.oy,
                oz = bounds.oz,
                raw = slab.raw_len,
                compressed = slab.data.len(),
                "Delivered slab"
            );
            self.stats.slabs += 1;
            self.stats.raw_bytes += slab.raw_len as u64;
            self.stats.compressed_bytes += slab.data.len() as u64;
        }
        Ok(())
    }
}
