//! Building the alignment model for a file diff.
//!
//! This module runs the single left-to-right scan over a file's regions
//! that feeds every structure a side-by-side view queries afterwards.
//!
//! ## Processing Flow
//!
//! 1. [`FileDiff::build`] walks the regions in document order
//! 2. Common and skipped regions advance the [`LineMapper`] on both sides and
//!    may be collapsed into [`SkippedRange`]s
//! 3. Replace regions advance the mapper and record one [`ChunkDescriptor`]
//!    per non-empty side in the [`ChunkIndex`]
//! 4. The view then queries the result by line number or by current chunk
//!
//! [`process_files`] builds many files at once in parallel.

use crate::chunk::{ChunkDescriptor, ChunkIndex, Direction};
use crate::line_mapper::{AlignedPair, LineMapper, LineOnOther, Side};
use crate::options::ViewOptions;
use crate::region::Region;
use crate::skip::{Placement, SkipPlan, SkippedRange};
use rayon::prelude::*;
use serde::Serialize;
use std::path::PathBuf;

/// Per-file line counts shown next to the file name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DiffStats {
    /// Lines on side B inside changed regions.
    pub additions: u32,

    /// Lines on side A inside changed regions.
    pub deletions: u32,

    /// Total lines on side A.
    pub lines_a: u32,

    /// Total lines on side B.
    pub lines_b: u32,
}

/// The queryable model of one file's diff.
///
/// Built once per displayed diff and discarded (or [rebuilt](Self::rebuild))
/// when the diff or the view options change.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileDiff {
    mapper: LineMapper,
    chunks: ChunkIndex,
    skips: SkipPlan,
    stats: DiffStats,
    region_count: usize,
    first_is_common: bool,
}

impl FileDiff {
    #[must_use]
    pub fn build(regions: &[Region], options: &ViewOptions) -> Self {
        let mut diff = Self::default();
        diff.scan(regions, options);
        diff
    }

    /// Clears the model and scans `regions` again, reusing allocations.
    pub fn rebuild(&mut self, regions: &[Region], options: &ViewOptions) {
        self.mapper.reset();
        self.chunks.reset();
        self.skips.reset();
        self.stats = DiffStats::default();
        self.scan(regions, options);
    }

    fn scan(&mut self, regions: &[Region], options: &ViewOptions) {
        let last = regions.len().saturating_sub(1);
        self.region_count = regions.len();
        self.first_is_common = regions.first().is_some_and(|r| !r.is_change());

        for (idx, region) in regions.iter().enumerate() {
            let (a0, b0) = (self.mapper.line_a(), self.mapper.line_b());
            match *region {
                Region::Common(len) => {
                    self.mapper.append_common(len);
                    let placement = Placement {
                        first: idx == 0,
                        last: idx == last,
                    };
                    self.skips
                        .record_common(a0, b0, len, placement, options.context);
                }
                Region::Skip(len) => {
                    self.mapper.append_common(len);
                    self.skips.record_omitted(a0, b0, len);
                }
                Region::Replace { a, b, .. } => {
                    self.mapper.append_replace(a, b);
                    self.chunks.add_replace(a0, b0, a, b);
                    self.stats.deletions += a;
                    self.stats.additions += b;
                }
            }
        }

        self.stats.lines_a = self.mapper.line_a();
        self.stats.lines_b = self.mapper.line_b();

        log::debug!(
            "built diff: {} regions, {} chunks, {} skipped ranges, +{} -{}",
            self.region_count,
            self.chunks.len(),
            self.skips.ranges().len(),
            self.stats.additions,
            self.stats.deletions,
        );
    }

    #[inline]
    #[must_use]
    pub fn mapper(&self) -> &LineMapper {
        &self.mapper
    }

    #[inline]
    #[must_use]
    pub fn chunks(&self) -> &ChunkIndex {
        &self.chunks
    }

    #[inline]
    #[must_use]
    pub fn skips(&self) -> &[SkippedRange] {
        self.skips.ranges()
    }

    #[inline]
    #[must_use]
    pub fn stats(&self) -> DiffStats {
        self.stats
    }

    /// False for an empty diff or one made of a single common region.
    #[must_use]
    pub fn has_changes(&self) -> bool {
        !(self.region_count == 0 || (self.region_count == 1 && self.first_is_common))
    }

    #[must_use]
    pub fn line_on_other(&self, side: Side, line: u32) -> LineOnOther {
        self.mapper.line_on_other(side, line)
    }

    #[must_use]
    pub fn align(&self, side: Side, line: u32) -> AlignedPair {
        self.mapper.align(side, line)
    }

    #[must_use]
    pub fn first_chunk(&self) -> Option<ChunkDescriptor> {
        self.chunks.first()
    }

    #[must_use]
    pub fn find_chunk(&self, side: Side, line: u32) -> Option<ChunkDescriptor> {
        self.chunks.find(&self.mapper, side, line)
    }

    #[must_use]
    pub fn navigate(&self, side: Side, line: u32, direction: Direction) -> Option<ChunkDescriptor> {
        self.chunks.navigate(&self.mapper, side, line, direction)
    }

    #[must_use]
    pub fn navigate_wrapping(
        &self,
        side: Side,
        line: u32,
        direction: Direction,
    ) -> Option<ChunkDescriptor> {
        self.chunks
            .navigate_wrapping(&self.mapper, side, line, direction)
    }

    #[must_use]
    pub fn initial_cursor(&self) -> Option<(Side, u32)> {
        self.chunks.initial_cursor(&self.mapper)
    }

    /// Unhides `context` lines around `line` on `side`.
    pub fn reveal(&mut self, side: Side, line: u32, context: u32) {
        self.skips.reveal(side, line, context);
    }
}

/// One file's regions, as handed over by the diff supplier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInput {
    pub path: PathBuf,
    pub regions: Vec<Region>,
}

/// Builds the models for many files in parallel, preserving input order.
#[must_use]
pub fn process_files(files: Vec<FileInput>, options: &ViewOptions) -> Vec<(PathBuf, FileDiff)> {
    files
        .into_par_iter()
        .map(|file| {
            let diff = FileDiff::build(&file.regions, options);
            (file.path, diff)
        })
        .collect()
}
