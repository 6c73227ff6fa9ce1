use async_trait::async_trait;
use tracing::debug;

use crate::config::ExportConfig;
use crate::error::ExportError;
use crate::mapping::SuperpixelBodyMap;
use crate::roi::Roi;
use crate::superpixel::SliceImage;

use super::buffer::{window_start, Layer};
use super::resolve::BodyResolver;

/// Receives each filled layer when its Z window is complete.
///
/// Slot 0 of the layer holds slice `z_start`. The layer is zeroed once the
/// call returns, so implementations must not keep references into it.
#[async_trait]
pub trait WindowWriter: Send {
    async fn write_window(&mut self, layer: &Layer, z_start: u32) -> Result<(), ExportError>;
}

/// Where the accumulator is in its window cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccumulatorState {
    /// Nothing buffered since creation or the last flush.
    Empty,

    /// Slices of the window starting at `z_start` are buffered.
    Accumulating { z_start: u32 },
}

/// Running totals for an accumulator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AccumulatorStats {
    pub slices: usize,
    pub windows_flushed: usize,
    pub roi_excluded_voxels: u64,
    pub unresolved_voxels: u64,
}

/// Stacks decoded slices into a depth-`slab.z` [`Layer`] and hands each
/// completed window to a [`WindowWriter`].
///
/// Slices must arrive in ascending Z order. The layer is allocated from the
/// first slice's size and every later slice must match it.
pub struct LayerAccumulator<'a, W> {
    depth: u32,
    resolver: BodyResolver<'a>,
    writer: W,
    layer: Option<Layer>,
    state: AccumulatorState,
    stats: AccumulatorStats,
}

impl<'a, W: WindowWriter> LayerAccumulator<'a, W> {
    pub fn new(
        config: &ExportConfig,
        bodies: &'a SuperpixelBodyMap,
        roi: Option<&'a Roi>,
        writer: W,
    ) -> Self {
        Self {
            depth: config.slab.z,
            resolver: BodyResolver::new(config, bodies, roi),
            writer,
            layer: None,
            state: AccumulatorState::Empty,
            stats: AccumulatorStats::default(),
        }
    }

    pub fn state(&self) -> AccumulatorState {
        self.state
    }

    pub fn stats(&self) -> &AccumulatorStats {
        &self.stats
    }

    /// The buffer, once the first slice has been pushed.
    pub fn layer(&self) -> Option<&Layer> {
        self.layer.as_ref()
    }

    /// Decode slice `z` into the layer, flushing first if `z` starts a new
    /// window. `source` names the image in error messages.
    pub async fn push_slice(
        &mut self,
        z: u32,
        image: &SliceImage,
        source: &str,
    ) -> Result<(), ExportError> {
        let (nx, ny) = (image.width(), image.height());
        if let Some(layer) = &self.layer {
            if layer.nx() != nx || layer.ny() != ny {
                return Err(ExportError::DimensionMismatch {
                    expected_x: layer.nx(),
                    expected_y: layer.ny(),
                    got_x: nx,
                    got_y: ny,
                    path: source.to_string(),
                });
            }
        }

        let z_start = window_start(z, self.depth);
        if let AccumulatorState::Accumulating { z_start: current } = self.state {
            if current != z_start {
                self.flush().await?;
            }
        }

        let layer = self
            .layer
            .get_or_insert_with(|| Layer::new(nx, ny, self.depth));
        let slice_stats = self
            .resolver
            .fill_plane(layer.plane_mut(z - z_start), z, image)?;

        self.state = AccumulatorState::Accumulating { z_start };
        self.stats.slices += 1;
        self.stats.roi_excluded_voxels += slice_stats.roi_excluded;
        self.stats.unresolved_voxels += slice_stats.unresolved;

        debug!(z, z_start, source, "Accumulated slice");
        Ok(())
    }

    /// Write out the buffered window, if any, and zero the layer.
    pub async fn flush(&mut self) -> Result<(), ExportError> {
        let AccumulatorState::Accumulating { z_start } = self.state else {
            return Ok(());
        };
        let Some(layer) = self.layer.as_mut() else {
            return Ok(());
        };

        debug!(z_start, "Flushing layer");
        self.writer.write_window(layer, z_start).await?;
        layer.clear();

        self.state = AccumulatorState::Empty;
        self.stats.windows_flushed += 1;
        Ok(())
    }

    /// Flush any remaining data and return the writer with final totals.
    pub async fn finish(mut self) -> Result<(W, AccumulatorStats), ExportError> {
        self.flush().await?;
        Ok((self.writer, self.stats))
    }
}
