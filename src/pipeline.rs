//! End-to-end export run.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                           Exporter                              │
//! │  1. Load segment->body map     4. Discover + order slices       │
//! │  2. Resolve superpixel->body   5. Accumulate slices into layers │
//! │  3. Load ROI (optional)        6. Flush windows as slabs        │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::time::Instant;

use serde::Serialize;
use tracing::info;

use crate::config::{Config, ExportConfig};
use crate::error::ExportError;
use crate::layer::{LayerAccumulator, WindowWriter};
use crate::mapping::{SegmentBodyMap, SuperpixelBodyMap};
use crate::roi::Roi;
use crate::sink::{FileSink, HttpSink};
use crate::slab::{SlabWriter, WriterStats};
use crate::superpixel::{discover_slices, SliceImage, SliceListing};

/// Files an export run reads.
#[derive(Debug, Clone)]
pub struct ExportInputs {
    pub superpixel_to_segment: PathBuf,
    pub segment_to_body: PathBuf,
    pub superpixel_dir: PathBuf,
    pub roi: Option<PathBuf>,
}

impl From<&Config> for ExportInputs {
    fn from(config: &Config) -> Self {
        Self {
            superpixel_to_segment: config.superpixel_to_segment.clone(),
            segment_to_body: config.segment_to_body.clone(),
            superpixel_dir: config.superpixel_dir.clone(),
            roi: config.roi.clone(),
        }
    }
}

/// What an export run did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExportSummary {
    pub slices_processed: usize,
    pub slices_skipped: usize,
    pub non_png_skipped: usize,
    pub windows_flushed: usize,
    pub slabs_written: usize,
    pub unresolved_voxels: u64,
    pub roi_excluded_voxels: u64,
    pub raw_bytes: u64,
    pub compressed_bytes: u64,
}

/// Runs an export with a fixed [`ExportConfig`].
#[derive(Debug, Clone)]
pub struct Exporter {
    config: ExportConfig,
}

impl Exporter {
    pub fn new(config: ExportConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Build the slab writer for the configured destinations.
    pub fn slab_writer(&self) -> Result<SlabWriter, ExportError> {
        let mut writer = SlabWriter::new(&self.config);
        if let Some(dir) = &self.config.outdir {
            writer = writer.with_sink(FileSink::new(dir, self.config.dry_run)?);
        }
        if let Some(url) = &self.config.url {
            writer = writer.with_sink(HttpSink::new(
                url,
                self.config.retry,
                self.config.timeout,
                self.config.dry_run,
            )?);
        }
        Ok(writer)
    }

    /// Load the lookup tables and ROI named by `inputs`.
    pub fn load_tables(
        &self,
        inputs: &ExportInputs,
    ) -> Result<(SuperpixelBodyMap, Option<Roi>), ExportError> {
        let segments = SegmentBodyMap::load(&inputs.segment_to_body)?;
        let bodies = SuperpixelBodyMap::load(&inputs.superpixel_to_segment, segments)?;

        let roi = match &inputs.roi {
            Some(path) => {
                let roi = Roi::load(path)?;
                info!(path = %path.display(), spans = roi.len(), "Loaded ROI");
                Some(roi)
            }
            None => None,
        };
        Ok((bodies, roi))
    }

    /// Run the full export to the configured destinations.
    pub async fn run(&self, inputs: &ExportInputs) -> Result<ExportSummary, ExportError> {
        self.config.validate()?;
        let start = Instant::now();
        let writer = self.slab_writer()?;
        let (bodies, roi) = self.load_tables(inputs)?;
        let listing = discover_slices(&inputs.superpixel_dir, self.config.min_z, self.config.max_z)?;

        let (writer, mut summary) = self
            .export_slices(&bodies, roi.as_ref(), &listing, writer)
            .await?;
        let WriterStats {
            slabs,
            raw_bytes,
            compressed_bytes,
        } = *writer.stats();
        summary.slabs_written = slabs;
        summary.raw_bytes = raw_bytes;
        summary.compressed_bytes = compressed_bytes;

        info!(elapsed = ?start.elapsed(), "Export complete");
        Ok(summary)
    }

    /// Decode `listing` slice by slice and hand each completed window to
    /// `writer`. Returns the writer once the final window is flushed.
    pub async fn export_slices<W: WindowWriter>(
        &self,
        bodies: &SuperpixelBodyMap,
        roi: Option<&Roi>,
        listing: &SliceListing,
        writer: W,
    ) -> Result<(W, ExportSummary), ExportError> {
        self.config.validate()?;
        let mut accumulator = LayerAccumulator::new(&self.config, bodies, roi, writer);

        for slice in &listing.slices {
            // Discovery already applies the range; this guards hand-built listings.
            if !self.config.in_z_range(slice.z) {
                continue;
            }
            let source = slice.path.display().to_string();
            info!(z = slice.z, path = %source, "Processing superpixel image");
            let image = SliceImage::open(&slice.path)?;
            accumulator.push_slice(slice.z, &image, &source).await?;
        }

        let (writer, stats) = accumulator.finish().await?;
        let summary = ExportSummary {
            slices_processed: stats.slices,
            slices_skipped: listing.skipped_out_of_range
                + (listing.slices.len() - stats.slices),
            non_png_skipped: listing.skipped_non_png,
            windows_flushed: stats.windows_flushed,
            unresolved_voxels: stats.unresolved_voxels,
            roi_excluded_voxels: stats.roi_excluded_voxels,
            ..ExportSummary::default()
        };
        Ok((writer, summary))
    }
}
