//! Raveler exporter - convert superpixel images + maps into label slabs.
//!
//! This binary parses the command line, sets up logging and runs one export.

use clap::Parser;
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use raveler_exporter::{Config, ExportConfig, ExportInputs, Exporter};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let config = Config::parse();

    // Initialize logging
    init_logging(config.verbose);

    // Validate configuration
    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }
    let export = match config.export_config() {
        Ok(export) => export,
        Err(e) => {
            error!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    log_configuration(&config, &export);

    let inputs = ExportInputs::from(&config);
    match Exporter::new(export).run(&inputs).await {
        Ok(summary) => {
            info!("");
            info!("Summary:");
            info!("  Slices processed: {}", summary.slices_processed);
            info!("  Slices skipped (Z range): {}", summary.slices_skipped);
            info!("  Windows flushed: {}", summary.windows_flushed);
            info!("  Slabs written: {}", summary.slabs_written);
            if summary.unresolved_voxels > 0 {
                warn!(
                    "  Voxels set to body 0 (unresolved superpixels): {}",
                    summary.unresolved_voxels
                );
            }
            match serde_json::to_string(&summary) {
                Ok(json) => info!(summary = %json, "Run summary"),
                Err(e) => warn!("Could not serialize run summary: {}", e),
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "raveler_exporter=debug"
    } else {
        "raveler_exporter=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn log_configuration(config: &Config, export: &ExportConfig) {
    info!("Configuration:");
    info!("  Superpixel->segment map: {}", config.superpixel_to_segment.display());
    info!("  Segment->body map: {}", config.segment_to_body.display());
    info!("  Superpixel images: {}", config.superpixel_dir.display());
    if let Some(ref roi) = config.roi {
        info!("  ROI: {} (block size {})", roi.display(), export.roi_block_size);
    }
    info!(
        "  Slabs: {}x{}x{}, compression {}",
        export.slab.x, export.slab.y, export.slab.z, export.compression
    );
    if export.body_offset != 0 {
        info!("  Body offset: {}", export.body_offset);
    }
    if export.min_z != 0 || export.max_z != u32::MAX {
        info!("  Z range: {}..={}", export.min_z, export.max_z);
    }
    if let Some(ref dir) = export.outdir {
        info!("  Output directory: {}", dir.display());
    }
    if let Some(ref url) = export.url {
        info!("  Remote store: {}", url);
    }
    if export.dry_run {
        warn!("  DRY RUN - no files will be written and nothing will be sent");
    }
}
