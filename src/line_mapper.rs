//! Bidirectional line mapping between the two sides of a diff.
//!
//! [`LineMapper`] consumes a file's regions left to right and records, for
//! each direction, the spans where one side has lines with no counterpart
//! on the other ([`Gap`]s). Every line not inside a gap maps to
//! `line + delta` of the closest gap at or before it, or to itself when no
//! gap precedes it.
//!
//! Gaps are appended in increasing `start` order and never touched again,
//! so each list is sorted by construction and lookups are a binary search.
//!
//! ## Example
//!
//! Five common lines, then two lines deleted from A:
//!
//! ```text
//!   A       B
//!   0  ==   0
//!   ..      ..
//!   4  ==   4
//!   5  --           A->B gap {start: 5, end: 6, delta: -2}
//!   6  --           B->A gap {start: 5, end: -, delta: +2}
//!   7  ==   5
//! ```

use serde::Serialize;

/// One side of a diff. `A` is the base, `B` the revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    A,
    B,
}

impl Side {
    #[inline]
    #[must_use]
    pub fn other(self) -> Self {
        match self {
            Self::A => Self::B,
            Self::B => Self::A,
        }
    }
}

/// A span of source lines whose counterparts are offset by `delta`.
///
/// Lines in `start..=end` have no counterpart on the other side. `end` is
/// `None` when the gap has zero width on the source side, which is how an
/// insertion looks from the side that did not grow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gap {
    pub start: u32,
    pub end: Option<u32>,
    pub delta: i64,
}

impl Gap {
    /// Whether `line` falls inside the span that has no counterpart.
    #[inline]
    #[must_use]
    pub fn contains(&self, line: u32) -> bool {
        self.end.is_some_and(|end| self.start <= line && line <= end)
    }
}

/// Result of [`LineMapper::line_on_other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LineOnOther {
    /// The corresponding line on the other side. `None` means "above the
    /// first line", the answer for lines inside a gap at the top of the
    /// file. `None` orders before every `Some`.
    pub line: Option<u32>,

    /// Whether the two lines render at the same height. False when the
    /// queried line has no real counterpart and `line` is only the nearest
    /// line above it.
    pub aligned: bool,
}

/// A pair of lines, one per side, known to be at the same height.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AlignedPair {
    /// Line on the queried side.
    pub src: u32,
    /// Line on the other side.
    pub dst: u32,
}

/// Incremental interval map between side A and side B line numbers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineMapper {
    line_a: u32,
    line_b: u32,
    a_to_b: Vec<Gap>,
    b_to_a: Vec<Gap>,
}

impl LineMapper {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears all state, keeping the gap lists' allocations.
    pub fn reset(&mut self) {
        self.line_a = 0;
        self.line_b = 0;
        self.a_to_b.clear();
        self.b_to_a.clear();
    }

    /// Next unconsumed line on side A.
    #[inline]
    #[must_use]
    pub fn line_a(&self) -> u32 {
        self.line_a
    }

    /// Next unconsumed line on side B.
    #[inline]
    #[must_use]
    pub fn line_b(&self) -> u32 {
        self.line_b
    }

    #[inline]
    #[must_use]
    pub fn line(&self, side: Side) -> u32 {
        match side {
            Side::A => self.line_a,
            Side::B => self.line_b,
        }
    }

    /// Gaps used to map lines of `side` onto the other side.
    #[inline]
    #[must_use]
    pub fn gaps(&self, side: Side) -> &[Gap] {
        match side {
            Side::A => &self.a_to_b,
            Side::B => &self.b_to_a,
        }
    }

    pub fn append_common(&mut self, len: u32) {
        log::trace!("append_common({len}) at ({}, {})", self.line_a, self.line_b);
        self.line_a += len;
        self.line_b += len;
    }

    /// Records `len` lines on B with no counterpart on A.
    ///
    /// # Panics
    ///
    /// If `len` is zero.
    pub fn append_insert(&mut self, len: u32) {
        assert!(len > 0, "append_insert requires a positive length");
        log::trace!("append_insert({len}) at ({}, {})", self.line_a, self.line_b);

        let orig_b = self.line_b;
        self.line_b += len;
        let b_ahead_of_a = i64::from(self.line_b) - i64::from(self.line_a);
        self.a_to_b.push(Gap {
            start: self.line_a,
            end: None,
            delta: b_ahead_of_a,
        });
        self.b_to_a.push(Gap {
            start: orig_b,
            end: Some(self.line_b - 1),
            delta: -b_ahead_of_a,
        });
    }

    /// Records `len` lines on A with no counterpart on B.
    ///
    /// # Panics
    ///
    /// If `len` is zero.
    pub fn append_delete(&mut self, len: u32) {
        assert!(len > 0, "append_delete requires a positive length");
        log::trace!("append_delete({len}) at ({}, {})", self.line_a, self.line_b);

        let orig_a = self.line_a;
        self.line_a += len;
        let b_ahead_of_a = i64::from(self.line_b) - i64::from(self.line_a);
        self.a_to_b.push(Gap {
            start: orig_a,
            end: Some(self.line_a - 1),
            delta: b_ahead_of_a,
        });
        self.b_to_a.push(Gap {
            start: self.line_b,
            end: None,
            delta: -b_ahead_of_a,
        });
    }

    /// Appends a replace block of `a` lines on A and `b` lines on B.
    ///
    /// The shorter side is paired line by line with the start of the longer
    /// one and the surplus becomes an insertion or deletion. Equal lengths
    /// align completely: line content does not affect alignment.
    pub fn append_replace(&mut self, a: u32, b: u32) {
        self.append_common(a.min(b));
        if a < b {
            self.append_insert(b - a);
        } else if a > b {
            self.append_delete(a - b);
        }
    }

    /// Last gap whose `start <= line`. When several gaps share a start the
    /// last appended one wins, since it describes the most recent offset.
    fn gap_at(&self, side: Side, line: u32) -> Option<&Gap> {
        let gaps = self.gaps(side);
        let idx = gaps.partition_point(|gap| gap.start <= line);
        idx.checked_sub(1).map(|i| &gaps[i])
    }

    /// Returns the line on the other side corresponding to `line` on `side`.
    ///
    /// Lines inside a gap resolve to the last line above the gap, seen
    /// through the gap's delta, and are reported as not aligned.
    #[must_use]
    pub fn line_on_other(&self, side: Side, line: u32) -> LineOnOther {
        match self.gap_at(side, line) {
            None => LineOnOther {
                line: Some(line),
                aligned: true,
            },
            Some(gap) => match gap.end {
                Some(end) if gap.contains(line) => LineOnOther {
                    line: shift(end, gap.delta),
                    aligned: false,
                },
                _ => LineOnOther {
                    line: shift(line, gap.delta),
                    aligned: true,
                },
            },
        }
    }

    /// Returns the nearest pair of lines at or above `line` that render at
    /// the same height, for scroll synchronization.
    ///
    /// Inside a gap this is the line just above it on both sides. A gap at
    /// the very top of the file has nothing above it, so its last line is
    /// paired with the first line below the gap on the other side instead.
    #[must_use]
    pub fn align(&self, side: Side, line: u32) -> AlignedPair {
        let Some(gap) = self.gap_at(side, line) else {
            return AlignedPair { src: line, dst: line };
        };

        match gap.end {
            Some(end) if gap.contains(line) => {
                let dst = i64::from(end) + gap.delta;
                if gap.start > 0 {
                    AlignedPair {
                        src: gap.start - 1,
                        dst: clamp_line(dst),
                    }
                } else {
                    AlignedPair {
                        src: end,
                        dst: clamp_line(dst + 1),
                    }
                }
            }
            _ => AlignedPair {
                src: line,
                dst: clamp_line(i64::from(line) + gap.delta),
            },
        }
    }
}

/// `line + delta`, or `None` when that lands above the first line.
#[inline]
fn shift(line: u32, delta: i64) -> Option<u32> {
    u32::try_from(i64::from(line) + delta).ok()
}

#[inline]
fn clamp_line(line: i64) -> u32 {
    u32::try_from(line.max(0)).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn on_other(line: u32, aligned: bool) -> LineOnOther {
        LineOnOther {
            line: Some(line),
            aligned,
        }
    }

    /// Builds a mapper from `(a, b)` region lengths; `a == b` with a flag of
    /// `true` means common lines.
    fn mapper(regions: &[(u32, u32, bool)]) -> LineMapper {
        let mut mapper = LineMapper::new();
        for &(a, b, common) in regions {
            if common {
                assert_eq!(a, b);
                mapper.append_common(a);
            } else {
                mapper.append_replace(a, b);
            }
        }
        mapper
    }

    #[test]
    fn common_only_is_identity() {
        let mapper = mapper(&[(10, 10, true)]);
        for line in 0..10 {
            assert_eq!(mapper.line_on_other(Side::A, line), on_other(line, true));
            assert_eq!(mapper.line_on_other(Side::B, line), on_other(line, true));
        }
        assert!(mapper.gaps(Side::A).is_empty());
        assert!(mapper.gaps(Side::B).is_empty());
    }

    #[test]
    fn empty_mapper_is_identity() {
        let mapper = LineMapper::new();
        assert_eq!(mapper.line_on_other(Side::B, 3), on_other(3, true));
        assert_eq!(mapper.align(Side::A, 3), AlignedPair { src: 3, dst: 3 });
    }

    #[test]
    fn insertion_records_gaps() {
        let mut mapper = LineMapper::new();
        mapper.append_common(4);
        mapper.append_insert(3);

        assert_eq!((mapper.line_a(), mapper.line_b()), (4, 7));
        assert_eq!(
            mapper.gaps(Side::A),
            &[Gap {
                start: 4,
                end: None,
                delta: 3
            }]
        );
        assert_eq!(
            mapper.gaps(Side::B),
            &[Gap {
                start: 4,
                end: Some(6),
                delta: -3
            }]
        );
    }

    #[test]
    fn lines_inside_insertion_map_above_it() {
        // Common(4), Insert(3), Common(5)
        let mapper = mapper(&[(4, 4, true), (0, 3, false), (5, 5, true)]);

        for line in 4..7 {
            assert_eq!(mapper.line_on_other(Side::B, line), on_other(3, false));
        }
        for line in 7..12 {
            assert_eq!(mapper.line_on_other(Side::B, line), on_other(line - 3, true));
            assert_eq!(mapper.line_on_other(Side::A, line - 3), on_other(line, true));
        }
        for line in 0..4 {
            assert_eq!(mapper.line_on_other(Side::B, line), on_other(line, true));
        }
    }

    #[test]
    fn deletion_mirrors_insertion() {
        // Common(5), Delete(2), Common(3)
        let mapper = mapper(&[(5, 5, true), (2, 0, false), (3, 3, true)]);

        assert_eq!(
            mapper.gaps(Side::A),
            &[Gap {
                start: 5,
                end: Some(6),
                delta: -2
            }]
        );
        assert_eq!(
            mapper.gaps(Side::B),
            &[Gap {
                start: 5,
                end: None,
                delta: 2
            }]
        );

        assert_eq!(mapper.line_on_other(Side::A, 5), on_other(4, false));
        assert_eq!(mapper.line_on_other(Side::A, 6), on_other(4, false));
        assert_eq!(mapper.line_on_other(Side::A, 7), on_other(5, true));
        assert_eq!(mapper.line_on_other(Side::B, 5), on_other(7, true));
        assert_eq!(mapper.line_on_other(Side::B, 4), on_other(4, true));
    }

    #[test]
    fn gap_at_top_of_file_maps_above_first_line() {
        let mapper = mapper(&[(0, 2, false), (3, 3, true)]);

        let info = mapper.line_on_other(Side::B, 1);
        assert_eq!(info.line, None);
        assert!(!info.aligned);
        assert_eq!(mapper.line_on_other(Side::B, 2), on_other(0, true));
        assert_eq!(mapper.line_on_other(Side::A, 0), on_other(2, true));
    }

    #[test]
    fn equal_replace_is_common() {
        let mapper = mapper(&[(2, 2, true), (3, 3, false), (2, 2, true)]);
        assert!(mapper.gaps(Side::A).is_empty());
        for line in 0..7 {
            assert_eq!(mapper.line_on_other(Side::A, line), on_other(line, true));
        }
    }

    #[test]
    fn uneven_replace_pairs_leading_lines() {
        // Common(1), Replace(2, 4), Common(1)
        let mapper = mapper(&[(1, 1, true), (2, 4, false), (1, 1, true)]);

        assert_eq!(mapper.line_on_other(Side::B, 1), on_other(1, true));
        assert_eq!(mapper.line_on_other(Side::B, 2), on_other(2, true));
        assert_eq!(mapper.line_on_other(Side::B, 3), on_other(2, false));
        assert_eq!(mapper.line_on_other(Side::B, 4), on_other(2, false));
        assert_eq!(mapper.line_on_other(Side::B, 5), on_other(3, true));
        assert_eq!(mapper.line_on_other(Side::A, 3), on_other(5, true));
    }

    #[test]
    fn later_gap_with_same_start_wins() {
        // Insert(2) then Delete(1) at the same A position.
        let mapper = mapper(&[(1, 1, true), (0, 2, false), (1, 0, false), (2, 2, true)]);

        assert_eq!(mapper.gaps(Side::A)[0].start, 1);
        assert_eq!(mapper.gaps(Side::A)[1].start, 1);
        assert_eq!(mapper.line_on_other(Side::A, 1), on_other(2, false));
        assert_eq!(mapper.line_on_other(Side::A, 2), on_other(3, true));
        assert_eq!(mapper.line_on_other(Side::B, 3), on_other(2, true));
    }

    #[test]
    fn align_outside_gaps() {
        let mapper = mapper(&[(4, 4, true), (0, 3, false), (5, 5, true)]);
        assert_eq!(mapper.align(Side::B, 2), AlignedPair { src: 2, dst: 2 });
        assert_eq!(mapper.align(Side::B, 9), AlignedPair { src: 9, dst: 6 });
        assert_eq!(mapper.align(Side::A, 6), AlignedPair { src: 6, dst: 9 });
    }

    #[test]
    fn align_inside_gap_uses_line_above() {
        let mapper = mapper(&[(4, 4, true), (0, 3, false), (5, 5, true)]);
        assert_eq!(mapper.align(Side::B, 5), AlignedPair { src: 3, dst: 3 });
    }

    #[test]
    fn align_inside_top_gap_uses_line_below() {
        let mapper = mapper(&[(0, 3, false), (5, 5, true)]);
        assert_eq!(mapper.align(Side::B, 1), AlignedPair { src: 2, dst: 0 });
    }

    #[test]
    fn reset_clears_everything() {
        let mut mapper = mapper(&[(3, 3, true), (1, 4, false)]);
        mapper.reset();
        assert_eq!(mapper, LineMapper::new());
        mapper.append_common(2);
        assert_eq!((mapper.line_a(), mapper.line_b()), (2, 2));
    }

    #[test]
    #[should_panic(expected = "positive length")]
    fn zero_length_insert_panics() {
        LineMapper::new().append_insert(0);
    }

    #[test]
    #[should_panic(expected = "positive length")]
    fn zero_length_delete_panics() {
        LineMapper::new().append_delete(0);
    }

    #[test]
    fn side_other() {
        assert_eq!(Side::A.other(), Side::B);
        assert_eq!(Side::B.other(), Side::A);
    }
}
