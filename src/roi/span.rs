use std::cmp::Ordering;
use std::path::Path;

use serde::Deserialize;

use crate::error::RoiError;

use super::SpanCursor;

/// Block coordinate of a voxel in ROI units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct BlockCoord {
    // Field order gives raster (z, y, x) ordering for the derived Ord.
    pub z: i32,
    pub y: i32,
    pub x: i32,
}

impl BlockCoord {
    #[inline]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { z, y, x }
    }

    /// Block containing voxel `(x, y, z)` for blocks of `block_size` voxels.
    ///
    /// Returns `None` when a block index does not fit in `i32`; no ROI span
    /// can reach such a block.
    #[inline]
    pub fn of_voxel(x: u32, y: u32, z: u32, block_size: u32) -> Option<Self> {
        let block = |v: u32| i32::try_from(v / block_size).ok();
        Some(Self::new(block(x)?, block(y)?, block(z)?))
    }
}

/// Inclusive run of block x-indices `[x0, x1]` at a fixed block (z, y).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(from = "[i32; 4]")]
pub struct Span {
    pub z: i32,
    pub y: i32,
    pub x0: i32,
    pub x1: i32,
}

impl From<[i32; 4]> for Span {
    fn from([z, y, x0, x1]: [i32; 4]) -> Self {
        Self { z, y, x0, x1 }
    }
}

impl Span {
    pub const fn new(z: i32, y: i32, x0: i32, x1: i32) -> Self {
        Self { z, y, x0, x1 }
    }

    /// True if the whole span lies before `block` in raster order.
    #[inline]
    pub fn precedes(&self, block: BlockCoord) -> bool {
        match (self.z, self.y).cmp(&(block.z, block.y)) {
            Ordering::Less => true,
            Ordering::Equal => self.x1 < block.x,
            Ordering::Greater => false,
        }
    }

    /// True if the span lies on the block's row and covers its x.
    #[inline]
    pub fn covers(&self, block: BlockCoord) -> bool {
        self.z == block.z && self.y == block.y && self.x0 <= block.x && block.x <= self.x1
    }
}

/// Region of interest as validated, ascending, non-overlapping spans.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roi {
    spans: Vec<Span>,
}

impl Roi {
    /// Build an ROI, rejecting spans that are inverted, out of
    /// (z, y, x0) order, or overlapping on the same row.
    pub fn new(spans: Vec<Span>) -> Result<Self, RoiError> {
        for (index, span) in spans.iter().enumerate() {
            if span.x0 > span.x1 {
                return Err(RoiError::InvalidSpan {
                    index,
                    x0: span.x0,
                    x1: span.x1,
                });
            }
            if index == 0 {
                continue;
            }
            let prev = &spans[index - 1];
            if (span.z, span.y, span.x0) < (prev.z, prev.y, prev.x0) {
                return Err(RoiError::Unsorted { index });
            }
            if (span.z, span.y) == (prev.z, prev.y) && span.x0 <= prev.x1 {
                return Err(RoiError::Overlap { index });
            }
        }
        Ok(Self { spans })
    }

    /// Parse a JSON array of `[z, y, x0, x1]` spans.
    pub fn from_json(json: &str, source_name: &str) -> Result<Self, RoiError> {
        let spans: Vec<Span> = serde_json::from_str(json).map_err(|e| RoiError::Parse {
            source_name: source_name.to_string(),
            message: e.to_string(),
        })?;
        Self::new(spans)
    }

    /// Read and parse an ROI JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RoiError> {
        let path = path.as_ref();
        let source_name = path.display().to_string();
        let json = std::fs::read_to_string(path).map_err(|e| RoiError::Io {
            source_name: source_name.clone(),
            message: e.to_string(),
        })?;
        Self::from_json(&json, &source_name)
    }

    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// Advance `cursor` past every span that precedes `block`.
    ///
    /// Returns the new cursor and whether the span it lands on covers the
    /// block. The cursor never moves backward, so blocks must be queried in
    /// ascending raster order for the answer to be exact.
    #[inline]
    pub fn advance(&self, mut cursor: usize, block: BlockCoord) -> (usize, bool) {
        while cursor < self.spans.len() && self.spans[cursor].precedes(block) {
            cursor += 1;
        }
        let included = self
            .spans
            .get(cursor)
            .is_some_and(|span| span.covers(block));
        (cursor, included)
    }

    /// Membership test by binary search, independent of any cursor.
    pub fn contains(&self, block: BlockCoord) -> bool {
        let index = self.spans.partition_point(|span| span.precedes(block));
        self.spans
            .get(index)
            .is_some_and(|span| span.covers(block))
    }

    /// Cursor over the whole span list starting at the first span.
    pub fn cursor(&self) -> SpanCursor<'_> {
        SpanCursor::new(self, 0)
    }

    /// Cursor positioned at the first span on block row `(z, y)`.
    ///
    /// A pixel row sweeps block x-indices upward but the next pixel row in
    /// the same block row starts over at x = 0, so each pixel row gets its
    /// own cursor.
    pub fn row_cursor(&self, z: i32, y: i32) -> SpanCursor<'_> {
        let start = self.spans.partition_point(|span| (span.z, span.y) < (z, y));
        SpanCursor::new(self, start)
    }
}
