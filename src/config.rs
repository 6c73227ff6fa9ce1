//! Configuration management for the Raveler exporter.
//!
//! Command-line flags (with `RAVELER_`-prefixed environment fallbacks) are
//! parsed into [`Config`]. After validation, [`Config::export_config`] builds
//! the immutable [`ExportConfig`] that every pipeline component receives at
//! construction.
//!
//! # Example
//!
//! ```ignore
//! use clap::Parser;
//! use raveler_exporter::config::Config;
//!
//! let config = Config::parse();
//! config.validate()?;
//! let export = config.export_config()?;
//! println!("slabs: {}x{}x{}", export.slab.x, export.slab.y, export.slab.z);
//! ```

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::error::{CodecError, ExportError};
use crate::sink::RetryPolicy;
use crate::slab::{Compression, SlabShape};

// =============================================================================
// Default Values
// =============================================================================

/// Default slab size along X in voxels.
pub const DEFAULT_SLAB_X: u32 = 512;

/// Default slab size along Y in voxels.
pub const DEFAULT_SLAB_Y: u32 = 512;

/// Default slab thickness along Z, which is also the layer depth.
pub const DEFAULT_SLAB_Z: u32 = 32;

/// Default ROI block edge length in voxels.
pub const DEFAULT_ROI_BLOCK_SIZE: u32 = 32;

/// Default lower bound of the randomized overload backoff.
pub const DEFAULT_RETRY_MIN_SECS: u64 = 30;

/// Default (exclusive) upper bound of the randomized overload backoff.
pub const DEFAULT_RETRY_MAX_SECS: u64 = 60;

/// Default per-request timeout for remote delivery.
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

// =============================================================================
// CLI Arguments
// =============================================================================

/// Raveler exporter - convert superpixel images + maps into label slabs.
///
/// Reads a superpixel->segment map, a segment->body map and a directory of
/// superpixel PNGs, and writes compressed body-label slabs to a directory
/// and/or POSTs them to a remote volume store.
#[derive(Parser, Debug, Clone)]
#[command(name = "raveler-exporter")]
#[command(author, version, about, long_about = None)]
pub struct Config {
    // =========================================================================
    // Inputs
    // =========================================================================
    /// Superpixel->segment map (`slice superpixel segment` per line).
    pub superpixel_to_segment: PathBuf,

    /// Segment->body map (`segment body` per line).
    pub segment_to_body: PathBuf,

    /// Directory of superpixel PNGs, one per Z slice.
    pub superpixel_dir: PathBuf,

    /// ROI JSON of sorted [z, y, x0, x1] block spans.
    #[arg(long, env = "RAVELER_ROI")]
    pub roi: Option<PathBuf>,

    /// Edge length of an ROI block in voxels.
    #[arg(long, default_value_t = DEFAULT_ROI_BLOCK_SIZE, env = "RAVELER_ROI_BLOCK_SIZE")]
    pub roi_block_size: u32,

    /// First Z slice to process (inclusive).
    #[arg(long, default_value_t = 0, env = "RAVELER_MIN_Z")]
    pub min_z: u32,

    /// Last Z slice to process (inclusive).
    #[arg(long, default_value_t = u32::MAX, env = "RAVELER_MAX_Z")]
    pub max_z: u32,

    // =========================================================================
    // Label Options
    // =========================================================================
    /// Constant added to every non-zero body id.
    #[arg(long, default_value_t = 0, env = "RAVELER_BODY_OFFSET")]
    pub body_offset: u64,

    /// Fail instead of writing body 0 when a superpixel has no body.
    #[arg(long, default_value_t = false, env = "RAVELER_STRICT")]
    pub strict: bool,

    // =========================================================================
    // Slab Options
    // =========================================================================
    /// Slab size along X in voxels.
    #[arg(long, default_value_t = DEFAULT_SLAB_X, env = "RAVELER_SLAB_X")]
    pub slab_x: u32,

    /// Slab size along Y in voxels.
    #[arg(long, default_value_t = DEFAULT_SLAB_Y, env = "RAVELER_SLAB_Y")]
    pub slab_y: u32,

    /// Slab thickness along Z in voxels.
    #[arg(long, default_value_t = DEFAULT_SLAB_Z, env = "RAVELER_SLAB_Z")]
    pub slab_z: u32,

    /// Slab compression: none, lz4 or gzip.
    #[arg(long = "compress", default_value = "none", env = "RAVELER_COMPRESS")]
    pub compression: String,

    // =========================================================================
    // Destinations
    // =========================================================================
    /// Output directory for slab files.
    #[arg(long, env = "RAVELER_OUTDIR")]
    pub outdir: Option<PathBuf>,

    /// Remote volume store data URL, e.g. http://host/api/node/<uuid>/<name>.
    #[arg(long, env = "RAVELER_URL")]
    pub url: Option<String>,

    /// Log intended writes without touching files or the network.
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,

    /// Minimum wait in seconds after an overloaded (503) response.
    #[arg(long, default_value_t = DEFAULT_RETRY_MIN_SECS, env = "RAVELER_RETRY_MIN_SECS")]
    pub retry_min_secs: u64,

    /// Maximum (exclusive) wait in seconds after an overloaded response.
    #[arg(long, default_value_t = DEFAULT_RETRY_MAX_SECS, env = "RAVELER_RETRY_MAX_SECS")]
    pub retry_max_secs: u64,

    /// Per-request timeout in seconds for remote delivery.
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS, env = "RAVELER_TIMEOUT_SECS")]
    pub timeout_secs: u64,

    // =========================================================================
    // Logging Configuration
    // =========================================================================
    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

impl Config {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.outdir.is_none() && self.url.is_none() {
            return Err("Must either use --url and/or --outdir for output".to_string());
        }

        self.export_config()
            .map_err(|e| e.to_string())?
            .validate()
            .map_err(|e| e.to_string())
    }

    /// Build the immutable settings shared by the pipeline components.
    pub fn export_config(&self) -> Result<ExportConfig, CodecError> {
        Ok(ExportConfig {
            slab: SlabShape::new(self.slab_x, self.slab_y, self.slab_z),
            roi_block_size: self.roi_block_size,
            body_offset: self.body_offset,
            min_z: self.min_z,
            max_z: self.max_z,
            compression: self.compression.parse()?,
            strict: self.strict,
            dry_run: self.dry_run,
            outdir: self.outdir.clone(),
            url: self.url.clone(),
            retry: RetryPolicy::new(
                Duration::from_secs(self.retry_min_secs),
                Duration::from_secs(self.retry_max_secs),
            ),
            timeout: Duration::from_secs(self.timeout_secs),
        })
    }
}

// =============================================================================
// Export Configuration
// =============================================================================

/// Settings for one export run. Built once, never mutated.
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Slab tile size; `slab.z` is also the layer depth.
    pub slab: SlabShape,

    /// Edge length of an ROI block in voxels.
    pub roi_block_size: u32,

    /// Added to every non-zero body id.
    pub body_offset: u64,

    /// Inclusive Z range of slices to process.
    pub min_z: u32,
    pub max_z: u32,

    pub compression: Compression,

    /// Unresolved superpixels abort the run instead of becoming body 0.
    pub strict: bool,

    pub dry_run: bool,

    pub outdir: Option<PathBuf>,
    pub url: Option<String>,

    pub retry: RetryPolicy,
    pub timeout: Duration,
}

impl ExportConfig {
    /// Check the settings that every run depends on.
    pub fn validate(&self) -> Result<(), ExportError> {
        let invalid = |message: String| -> Result<(), ExportError> {
            Err(ExportError::InvalidConfig(message))
        };

        if self.slab.x == 0 || self.slab.y == 0 {
            return invalid("slab_x and slab_y must be at least 1".to_string());
        }
        if self.slab.z == 0 {
            return invalid("Thickness must be >= 1 Z slice (slab_z)".to_string());
        }
        if self.roi_block_size == 0 {
            return invalid("roi_block_size must be at least 1".to_string());
        }
        if self.min_z > self.max_z {
            return invalid(format!(
                "min_z ({}) must not exceed max_z ({})",
                self.min_z, self.max_z
            ));
        }
        if self.retry.min_delay() >= self.retry.max_delay() {
            return invalid("retry_min_secs must be less than retry_max_secs".to_string());
        }
        if self.timeout.is_zero() {
            return invalid("timeout_secs must be greater than 0".to_string());
        }
        Ok(())
    }

    /// Does `z` fall within the configured slice range?
    #[inline]
    pub fn in_z_range(&self, z: u32) -> bool {
        self.min_z <= z && z <= self.max_z
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            slab: SlabShape::new(DEFAULT_SLAB_X, DEFAULT_SLAB_Y, DEFAULT_SLAB_Z),
            roi_block_size: DEFAULT_ROI_BLOCK_SIZE,
            body_offset: 0,
            min_z: 0,
            max_z: u32::MAX,
            compression: Compression::None,
            strict: false,
            dry_run: false,
            outdir: None,
            url: None,
            retry: RetryPolicy::default(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
