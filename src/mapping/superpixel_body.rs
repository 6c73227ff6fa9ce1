use std::collections::HashMap;
use std::io::BufRead;
use std::path::Path;
use std::time::Instant;

use tracing::{debug, info};

use crate::error::TableError;
use crate::io::RecordReader;

use super::SegmentBodyMap;

/// Largest superpixel id representable in a 24-bit RGB-encoded image.
pub const MAX_SUPERPIXEL_ID: u64 = 0x00FF_FFFF;

/// Number of records between progress log lines.
const PROGRESS_INTERVAL: usize = 1_000_000;

/// A superpixel id split into its slice and its label within that slice.
///
/// Label 0 is background and never appears as a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Superpixel {
    pub slice: u32,
    pub label: u32,
}

impl Superpixel {
    #[inline]
    pub const fn new(slice: u32, label: u32) -> Self {
        Self { slice, label }
    }
}

/// (slice, superpixel) -> body map, resolved through a [`SegmentBodyMap`].
#[derive(Debug, Clone, Default)]
pub struct SuperpixelBodyMap {
    bodies: HashMap<Superpixel, u64>,
}

impl SuperpixelBodyMap {
    /// Load `slice superpixel segment` records from a file and resolve each
    /// segment through `segments`, which is consumed and dropped on return.
    pub fn load(path: impl AsRef<Path>, segments: SegmentBodyMap) -> Result<Self, TableError> {
        Self::from_records(RecordReader::open(path)?, segments)
    }

    /// Load from an already opened record stream.
    pub fn from_records<R: BufRead>(
        mut records: RecordReader<R>,
        segments: SegmentBodyMap,
    ) -> Result<Self, TableError> {
        let start = Instant::now();
        let mut bodies = HashMap::with_capacity(segments.len());
        let mut parsed = 0usize;

        info!(source = records.source_name(), "Processing superpixel->segment map");

        while let Some([slice, superpixel, segment]) = records.next_record::<3>()? {
            parsed += 1;
            if parsed % PROGRESS_INTERVAL == 0 {
                debug!(records = parsed, "Loading superpixel->body mappings");
            }

            let slice = u32::try_from(slice).map_err(|_| TableError::MalformedRecord {
                source_name: records.source_name().to_string(),
                line: records.line(),
            })?;
            if superpixel == 0 {
                continue;
            }
            if superpixel > MAX_SUPERPIXEL_ID {
                return Err(TableError::SuperpixelRange {
                    source_name: records.source_name().to_string(),
                    line: records.line(),
                    superpixel,
                });
            }
            let body = segments
                .get(segment)
                .ok_or_else(|| TableError::UnresolvedSegment {
                    segment,
                    slice,
                    superpixel_source: records.source_name().to_string(),
                    segment_source: segments.source_name().to_string(),
                })?;

            bodies.insert(Superpixel::new(slice, superpixel as u32), body);
        }

        info!(
            source = records.source_name(),
            superpixels = bodies.len(),
            elapsed = ?start.elapsed(),
            "Resolved superpixel->body map"
        );

        Ok(Self { bodies })
    }

    /// Body for `superpixel`, if it was listed in the map.
    #[inline]
    pub fn get(&self, superpixel: Superpixel) -> Option<u64> {
        self.bodies.get(&superpixel).copied()
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }
}

impl FromIterator<(Superpixel, u64)> for SuperpixelBodyMap {
    fn from_iter<I: IntoIterator<Item = (Superpixel, u64)>>(iter: I) -> Self {
        Self {
            bodies: iter
                .into_iter()
                .filter(|(sp, _)| sp.label != 0)
                .collect(),
        }
    }
}
