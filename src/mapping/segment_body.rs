use std::collections::HashMap;
use std::io::BufRead;
use std::path::Path;
use std::time::Instant;

use tracing::{debug, info};

use crate::error::TableError;
use crate::io::RecordReader;

/// Initial allocation hint for the segment map.
const INITIAL_CAPACITY: usize = 100_000;

/// Number of records between progress log lines.
const PROGRESS_INTERVAL: usize = 1_000_000;

/// Segment id -> body id map, loaded once and read-only afterward.
#[derive(Debug, Clone, Default)]
pub struct SegmentBodyMap {
    bodies: HashMap<u64, u64>,
    records: usize,
    source_name: String,
}

impl SegmentBodyMap {
    /// Load `segment body` records from a file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TableError> {
        Self::from_records(RecordReader::open(path)?)
    }

    /// Load from an already opened record stream.
    pub fn from_records<R: BufRead>(mut records: RecordReader<R>) -> Result<Self, TableError> {
        let start = Instant::now();
        let mut bodies = HashMap::with_capacity(INITIAL_CAPACITY);
        let mut parsed = 0usize;

        while let Some([segment, body]) = records.next_record::<2>()? {
            parsed += 1;
            if parsed % PROGRESS_INTERVAL == 0 {
                debug!(records = parsed, "Loading segment->body map");
            }
            bodies.insert(segment, body);
        }

        info!(
            source = records.source_name(),
            records = parsed,
            segments = bodies.len(),
            elapsed = ?start.elapsed(),
            "Loaded segment->body map"
        );

        Ok(Self {
            bodies,
            records: parsed,
            source_name: records.source_name().to_string(),
        })
    }

    /// Body assigned to `segment`, if any.
    #[inline]
    pub fn get(&self, segment: u64) -> Option<u64> {
        self.bodies.get(&segment).copied()
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Records read from the source, including repeated segments.
    pub fn records(&self) -> usize {
        self.records
    }

    /// Name of the file this map was read from.
    pub fn source_name(&self) -> &str {
        &self.source_name
    }
}
