use std::collections::HashSet;

use tracing::warn;

use crate::config::ExportConfig;
use crate::error::ExportError;
use crate::mapping::{Superpixel, SuperpixelBodyMap};
use crate::roi::{BlockCoord, Roi};
use crate::superpixel::SliceImage;

/// Per-slice counters reported by [`BodyResolver::fill_plane`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SliceStats {
    /// Pixels skipped because their block lies outside the ROI
    pub roi_excluded: u64,

    /// Non-zero labels with no body in the lookup table
    pub unresolved: u64,
}

/// Maps the pixels of one slice to body ids.
#[derive(Debug, Clone, Copy)]
pub struct BodyResolver<'a> {
    bodies: &'a SuperpixelBodyMap,
    roi: Option<&'a Roi>,
    roi_block_size: u32,
    body_offset: u64,
    strict: bool,
}

impl<'a> BodyResolver<'a> {
    pub fn new(config: &ExportConfig, bodies: &'a SuperpixelBodyMap, roi: Option<&'a Roi>) -> Self {
        Self {
            bodies,
            roi,
            roi_block_size: config.roi_block_size,
            body_offset: config.body_offset,
            strict: config.strict,
        }
    }

    /// Body id for `label` on slice `z`.
    ///
    /// Label 0 and a looked-up body of 0 stay background; every other body
    /// gets the configured offset. A label missing from the table becomes
    /// body 0 (counted in `stats`) unless strict lookups are on.
    pub fn resolve(&self, z: u32, label: u32, stats: &mut SliceStats) -> Result<u64, ExportError> {
        if label == 0 {
            return Ok(0);
        }
        match self.bodies.get(Superpixel::new(z, label)) {
            Some(0) => Ok(0),
            Some(body) => body
                .checked_add(self.body_offset)
                .ok_or(ExportError::BodyOverflow {
                    slice: z,
                    label,
                    body,
                    offset: self.body_offset,
                }),
            None if self.strict => Err(ExportError::UnresolvedSuperpixel { slice: z, label }),
            None => {
                stats.unresolved += 1;
                Ok(0)
            }
        }
    }

    /// Decode `image` (slice `z`) into `plane`, a zeroed row-major
    /// `width × height` buffer. Pixels outside the ROI are left untouched.
    pub fn fill_plane(
        &self,
        plane: &mut [u64],
        z: u32,
        image: &SliceImage,
    ) -> Result<SliceStats, ExportError> {
        let nx = image.width() as usize;
        let mut stats = SliceStats::default();
        let mut missing = HashSet::new();
        if nx == 0 {
            return Ok(stats);
        }

        for (y, row) in (0..image.height()).zip(plane.chunks_exact_mut(nx)) {
            // No cursor with an ROI means the row's block lies outside i32 range.
            let mut cursor = self.roi.and_then(|roi| {
                BlockCoord::of_voxel(0, y, z, self.roi_block_size)
                    .map(|block| roi.row_cursor(block.z, block.y))
            });

            for (x, voxel) in (0..image.width()).zip(row.iter_mut()) {
                if self.roi.is_some() {
                    let block = BlockCoord::of_voxel(x, y, z, self.roi_block_size);
                    let included = match (cursor.as_mut(), block) {
                        (Some(cursor), Some(block)) => cursor.advance(block),
                        _ => false,
                    };
                    if !included {
                        stats.roi_excluded += 1;
                        continue;
                    }
                }

                let label = image.label_at(x, y)?;
                let unresolved = stats.unresolved;
                *voxel = self.resolve(z, label, &mut stats)?;
                if stats.unresolved != unresolved && missing.insert(label) {
                    warn!(
                        slice = z,
                        label, "Could not find superpixel in mapping files, setting to body 0"
                    );
                }
            }
        }
        Ok(stats)
    }
}
