//! Ordered index of changed regions for lookup and navigation.
//!
//! Each replace region yields up to two [`ChunkDescriptor`]s: the deleted
//! lines on side A and the inserted lines on side B. Both sides live in one
//! vector ordered by a single comparator that translates A lines into B
//! coordinates through the [`LineMapper`], placing the A half of an edit
//! directly before its B half. Descriptors are appended during the same
//! left-to-right scan that feeds the mapper, so the vector is sorted without
//! a sort step.

use crate::line_mapper::{LineMapper, Side};
use serde::Serialize;
use std::cmp::Ordering;

/// A changed range of lines on one side of the diff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChunkDescriptor {
    pub side: Side,

    /// First line of the chunk (0-indexed, inclusive).
    pub start: u32,

    /// Last line of the chunk (inclusive).
    pub end: u32,

    /// Whether this is one half of a replace region that both deleted and
    /// inserted lines.
    pub is_edit_pair: bool,
}

impl ChunkDescriptor {
    #[inline]
    #[must_use]
    pub fn new(side: Side, start: u32, end: u32, is_edit_pair: bool) -> Self {
        Self {
            side,
            start,
            end,
            is_edit_pair,
        }
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, side: Side, line: u32) -> bool {
        self.side == side && self.start <= line && line <= self.end
    }

    /// The deletion half of an edit pair, which navigation steps over.
    #[inline]
    fn is_deletion_half(&self) -> bool {
        self.is_edit_pair && self.side == Side::A
    }

    #[inline]
    fn key(&self) -> Key {
        Key {
            side: self.side,
            line: self.start,
        }
    }
}

/// Direction for chunk navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Prev,
    Next,
}

impl Direction {
    #[inline]
    fn step(self) -> isize {
        match self {
            Self::Prev => -1,
            Self::Next => 1,
        }
    }
}

/// A position on one side, the unit the comparator orders.
#[derive(Debug, Clone, Copy)]
struct Key {
    side: Side,
    line: u32,
}

/// Orders two positions that may live on different sides.
///
/// Same side compares lines. Across sides the A line is translated to B;
/// on a tie A sorts first, so a deletion precedes the insertion it pairs
/// with.
fn compare(mapper: &LineMapper, lhs: Key, rhs: Key) -> Ordering {
    match (lhs.side, rhs.side) {
        (Side::A, Side::B) => mapper
            .line_on_other(Side::A, lhs.line)
            .line
            .cmp(&Some(rhs.line))
            .then(Ordering::Less),
        (Side::B, Side::A) => Some(lhs.line)
            .cmp(&mapper.line_on_other(Side::A, rhs.line).line)
            .then(Ordering::Greater),
        _ => lhs.line.cmp(&rhs.line),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChunkIndex {
    chunks: Vec<ChunkDescriptor>,
}

impl ChunkIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.chunks.clear();
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&ChunkDescriptor> {
        self.chunks.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChunkDescriptor> {
        self.chunks.iter()
    }

    /// Appends a descriptor. Must be called in scan order.
    ///
    /// # Panics
    ///
    /// If `chunk` is inverted, or overlaps or precedes the last chunk added
    /// on the same side.
    pub fn add(&mut self, chunk: ChunkDescriptor) {
        assert!(chunk.start <= chunk.end, "chunk ends before it starts");
        if let Some(prev) = self.chunks.iter().rev().find(|c| c.side == chunk.side) {
            assert!(
                prev.end < chunk.start,
                "chunk added out of scan order: {:?} after {:?}",
                chunk,
                prev
            );
        }
        self.chunks.push(chunk);
    }

    /// Records the descriptors of a replace region of `a` lines starting at
    /// `a0` on side A and `b` lines starting at `b0` on side B.
    pub fn add_replace(&mut self, a0: u32, b0: u32, a: u32, b: u32) {
        if a > 0 {
            self.add(ChunkDescriptor::new(Side::A, a0, a0 + a - 1, b > 0));
        }
        if b > 0 {
            self.add(ChunkDescriptor::new(Side::B, b0, b0 + b - 1, a > 0));
        }
    }

    /// The first chunk on side B, or the first chunk overall if no chunk
    /// lives on side B.
    #[must_use]
    pub fn first(&self) -> Option<ChunkDescriptor> {
        self.chunks
            .iter()
            .find(|c| c.side == Side::B)
            .or_else(|| self.chunks.first())
            .copied()
    }

    /// Where a freshly opened diff puts the cursor: the start of
    /// [`first`](Self::first), moved onto side B for the deletion half of an
    /// edit.
    #[must_use]
    pub fn initial_cursor(&self, mapper: &LineMapper) -> Option<(Side, u32)> {
        let chunk = self.first()?;
        if chunk.is_deletion_half() {
            let line = mapper.line_on_other(Side::A, chunk.start).line;
            Some((Side::B, line.unwrap_or(0)))
        } else {
            Some((chunk.side, chunk.start))
        }
    }

    fn search(&self, mapper: &LineMapper, side: Side, line: u32) -> Result<usize, usize> {
        let probe = Key { side, line };
        self.chunks
            .binary_search_by(|chunk| compare(mapper, chunk.key(), probe))
    }

    /// The chunk starting at or containing `line` on `side`.
    #[must_use]
    pub fn find(&self, mapper: &LineMapper, side: Side, line: u32) -> Option<ChunkDescriptor> {
        match self.search(mapper, side, line) {
            Ok(idx) => Some(self.chunks[idx]),
            // The paired half of an edit may sort between the chunk start
            // and `line`, so look back to the nearest chunk on `side`.
            Err(idx) => self.chunks[..idx]
                .iter()
                .rev()
                .find(|chunk| chunk.side == side)
                .copied()
                .filter(|chunk| chunk.contains(side, line)),
        }
    }

    /// The next or previous chunk relative to the cursor at `line` on
    /// `side`, or `None` past either end. Lands on the insertion half of an
    /// edit, never on its deletion half.
    #[must_use]
    pub fn navigate(
        &self,
        mapper: &LineMapper,
        side: Side,
        line: u32,
        direction: Direction,
    ) -> Option<ChunkDescriptor> {
        let mut idx = self.neighbour(mapper, side, line, direction);
        let chunk = self.at(idx)?;
        if chunk.is_deletion_half() {
            idx += direction.step();
            return self.at(idx);
        }
        Some(chunk)
    }

    /// Like [`navigate`](Self::navigate), but wraps around either end.
    /// `None` only for an empty index.
    #[must_use]
    pub fn navigate_wrapping(
        &self,
        mapper: &LineMapper,
        side: Side,
        line: u32,
        direction: Direction,
    ) -> Option<ChunkDescriptor> {
        if self.chunks.is_empty() {
            return None;
        }
        let len = self.chunks.len() as isize;
        let wrap = |idx: isize| self.chunks[idx.rem_euclid(len) as usize];

        let mut idx = self.neighbour(mapper, side, line, direction);
        if wrap(idx).is_deletion_half() {
            idx += direction.step();
        }
        Some(wrap(idx))
    }

    /// Index one step from the cursor, which may be out of bounds.
    fn neighbour(&self, mapper: &LineMapper, side: Side, line: u32, direction: Direction) -> isize {
        match (self.search(mapper, side, line), direction) {
            (Ok(idx), _) => idx as isize + direction.step(),
            (Err(idx), Direction::Next) => idx as isize,
            (Err(idx), Direction::Prev) => idx as isize - 1,
        }
    }

    #[inline]
    fn at(&self, idx: isize) -> Option<ChunkDescriptor> {
        usize::try_from(idx)
            .ok()
            .and_then(|idx| self.chunks.get(idx))
            .copied()
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    /// Alternating common and change regions, as the diff supplier emits
    /// them. Change regions never have both sides empty.
    fn regions() -> impl Strategy<Value = Vec<(u32, (u32, u32))>> {
        prop::collection::vec(
            (
                1u32..10,
                (0u32..5, 0u32..5).prop_filter("non-empty change", |(a, b)| a + b > 0),
            ),
            1..15,
        )
    }

    fn build(regions: &[(u32, (u32, u32))]) -> (LineMapper, ChunkIndex) {
        let mut mapper = LineMapper::new();
        let mut index = ChunkIndex::new();
        for &(common, (a, b)) in regions {
            mapper.append_common(common);
            let (a0, b0) = (mapper.line_a(), mapper.line_b());
            mapper.append_replace(a, b);
            index.add_replace(a0, b0, a, b);
        }
        (mapper, index)
    }

    proptest! {
        #[test]
        fn find_returns_own_descriptor(regions in regions()) {
            let (mapper, index) = build(&regions);
            for chunk in index.iter() {
                for line in chunk.start..=chunk.end {
                    prop_assert_eq!(index.find(&mapper, chunk.side, line), Some(*chunk));
                }
            }
        }

        #[test]
        fn index_is_sorted_by_comparator(regions in regions()) {
            let (mapper, index) = build(&regions);
            let chunks: Vec<_> = index.iter().collect();
            for pair in chunks.windows(2) {
                prop_assert_eq!(
                    compare(&mapper, pair[0].key(), pair[1].key()),
                    Ordering::Less
                );
            }
        }

        #[test]
        fn navigation_never_lands_on_deletion_half(regions in regions(), line in 0u32..80) {
            let (mapper, index) = build(&regions);
            for side in [Side::A, Side::B] {
                for direction in [Direction::Prev, Direction::Next] {
                    if let Some(chunk) = index.navigate(&mapper, side, line, direction) {
                        prop_assert!(!chunk.is_deletion_half());
                    }
                }
            }
        }
    }
}
