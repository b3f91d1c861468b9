//! Collapsing long runs of common lines.
//!
//! Common regions longer than the surrounding context are folded into a
//! [`SkippedRange`] that the view draws as a single "N common lines" bar.
//! The first region keeps context only below itself and the last only
//! above; regions in the middle keep it on both ends.

use crate::line_mapper::Side;
use crate::options::Context;
use serde::Serialize;

/// A run of common lines hidden from view. Both sides hide `size` lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SkippedRange {
    pub start_a: u32,
    pub start_b: u32,
    pub size: u32,
}

impl SkippedRange {
    #[inline]
    #[must_use]
    pub fn new(start_a: u32, start_b: u32, size: u32) -> Self {
        Self {
            start_a,
            start_b,
            size,
        }
    }

    #[inline]
    #[must_use]
    pub fn start(&self, side: Side) -> u32 {
        match side {
            Side::A => self.start_a,
            Side::B => self.start_b,
        }
    }

    /// Whether `line` on `side` is hidden by this range.
    #[inline]
    #[must_use]
    pub fn contains(&self, side: Side, line: u32) -> bool {
        let start = self.start(side);
        start <= line && line - start < self.size
    }

    /// Sub-range covering `[from, to)` relative to this range's start.
    fn slice(&self, from: u32, to: u32) -> Self {
        Self::new(self.start_a + from, self.start_b + from, to - from)
    }
}

/// Where a common region sits in the file's region list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub first: bool,
    pub last: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SkipPlan {
    ranges: Vec<SkippedRange>,
}

impl SkipPlan {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.ranges.clear();
    }

    #[inline]
    #[must_use]
    pub fn ranges(&self) -> &[SkippedRange] {
        &self.ranges
    }

    /// Total number of hidden lines.
    #[must_use]
    pub fn hidden_lines(&self) -> u32 {
        self.ranges.iter().map(|r| r.size).sum()
    }

    /// The range hiding `line` on `side`, if any.
    #[must_use]
    pub fn range_at(&self, side: Side, line: u32) -> Option<&SkippedRange> {
        self.ranges.iter().find(|r| r.contains(side, line))
    }

    /// Plans the collapse of a common region of `len` lines starting at
    /// `(a0, b0)`.
    pub fn record_common(&mut self, a0: u32, b0: u32, len: u32, placement: Placement, context: Context) {
        let Context::Lines(context) = context else {
            return;
        };
        let keep_one_end = context.saturating_add(1);
        let keep_both_ends = context.saturating_mul(2).saturating_add(1);

        let range = if placement.first && len > keep_one_end {
            Some(SkippedRange::new(0, 0, len - context))
        } else if placement.last && len > keep_one_end {
            Some(SkippedRange::new(a0 + context, b0 + context, len - context))
        } else if len > keep_both_ends {
            Some(SkippedRange::new(a0 + context, b0 + context, len - 2 * context))
        } else {
            None
        };

        if let Some(range) = range {
            log::trace!("skip {range:?}");
            self.ranges.push(range);
        }
    }

    /// Plans a region the server left out entirely. Its lines were never
    /// sent, so all of them stay hidden whatever the context.
    pub fn record_omitted(&mut self, a0: u32, b0: u32, len: u32) {
        if len > 0 {
            self.ranges.push(SkippedRange::new(a0, b0, len));
        }
    }

    /// Unhides `context` lines on each side of `line` on `side`, e.g. to
    /// show a line that carries a comment.
    ///
    /// Ranges overlapping that window are trimmed or split in two, and
    /// pieces shorter than two lines are dropped.
    pub fn reveal(&mut self, side: Side, line: u32, context: u32) {
        let line = i64::from(line);
        let context = i64::from(context);
        let window_start = line - context;
        let window_end = line + context + 1;

        let mut revealed = Vec::with_capacity(self.ranges.len() + 1);
        for range in &self.ranges {
            let start = i64::from(range.start(side));
            let end = start + i64::from(range.size);

            let above_end = end.min(window_start);
            let below_start = start.max(window_end);
            let pieces = [(start, above_end), (below_start, end)];

            for (from, to) in pieces {
                if to - from > 1 {
                    // start <= from < to <= end
                    let from = (from - start) as u32;
                    let to = (to - start) as u32;
                    revealed.push(range.slice(from, to));
                }
            }
        }
        self.ranges = revealed;
    }
}
