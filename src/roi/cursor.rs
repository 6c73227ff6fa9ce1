use super::{BlockCoord, Roi};

/// Forward-only position in an [`Roi`] span list.
///
/// Each [`advance`](SpanCursor::advance) skips spans lying before the queried
/// block, so a sweep of N ascending queries costs O(N + S) for S spans.
/// Queries must not go backward in raster order; debug builds assert it.
#[derive(Debug, Clone)]
pub struct SpanCursor<'a> {
    roi: &'a Roi,
    index: usize,
    last: Option<BlockCoord>,
}

impl<'a> SpanCursor<'a> {
    pub(crate) fn new(roi: &'a Roi, index: usize) -> Self {
        Self {
            roi,
            index,
            last: None,
        }
    }

    /// Is `block` inside the ROI?
    #[inline]
    pub fn advance(&mut self, block: BlockCoord) -> bool {
        debug_assert!(
            self.last.map_or(true, |last| last <= block),
            "ROI cursor queried out of raster order: {:?} after {:?}",
            block,
            self.last
        );
        self.last = Some(block);

        let (index, included) = self.roi.advance(self.index, block);
        self.index = index;
        included
    }

    /// Index of the span the cursor currently rests on.
    pub fn position(&self) -> usize {
        self.index
    }
}
