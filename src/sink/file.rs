use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::info;

use crate::error::SinkError;
use crate::slab::{Compression, Slab, SlabBounds};

use super::SlabSink;

/// File name for a slab: size, minimum corner, compression suffix.
///
/// `bodies-512x512x32-1024_0_64.dat.lz4`
pub fn slab_file_name(bounds: &SlabBounds, compression: Compression) -> String {
    format!(
        "bodies-{}x{}x{}-{}_{}_{}.dat{}",
        bounds.nx,
        bounds.ny,
        bounds.nz,
        bounds.ox,
        bounds.oy,
        bounds.oz,
        compression.file_suffix()
    )
}

/// Writes each slab to its own file in an output directory.
#[derive(Debug, Clone)]
pub struct FileSink {
    dir: PathBuf,
    identifier: String,
    dry_run: bool,
}

impl FileSink {
    /// Use `dir` for output, creating it if needed.
    ///
    /// Fails if `dir` exists and is not a directory. In dry-run mode nothing
    /// is created.
    pub fn new(dir: impl Into<PathBuf>, dry_run: bool) -> Result<Self, SinkError> {
        let dir = dir.into();
        let io_error = |message: String| SinkError::Io {
            path: dir.display().to_string(),
            message,
        };

        match std::fs::metadata(&dir) {
            Ok(meta) if !meta.is_dir() => {
                return Err(io_error("output path is not a directory".to_string()));
            }
            Ok(_) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                if dry_run {
                    info!(dir = %dir.display(), "Dry run: would create output directory");
                } else {
                    info!(dir = %dir.display(), "Creating output directory");
                    std::fs::create_dir_all(&dir).map_err(|e| io_error(e.to_string()))?;
                }
            }
            Err(e) => return Err(io_error(e.to_string())),
        }

        Ok(Self {
            identifier: dir.display().to_string(),
            dir,
            dry_run,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Full path the slab will be written to.
    pub fn path_for(&self, slab: &Slab) -> PathBuf {
        self.dir.join(slab_file_name(&slab.bounds, slab.compression))
    }
}

#[async_trait]
impl SlabSink for FileSink {
    async fn put(&self, slab: &Slab) -> Result<(), SinkError> {
        let path = self.path_for(slab);
        if self.dry_run {
            info!(path = %path.display(), bytes = slab.data.len(), "Dry run: would write slab");
            return Ok(());
        }

        tokio::fs::write(&path, &slab.data)
            .await
            .map_err(|e| SinkError::Io {
                path: path.display().to_string(),
                message: e.to_string(),
            })
    }

    fn identifier(&self) -> &str {
        &self.identifier
    }
}
