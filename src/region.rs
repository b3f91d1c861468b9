//! Diff regions and parsing of the review server's diff-content JSON.
//!
//! A file diff arrives as an ordered list of content entries covering the
//! whole file from the first line to the last. Each entry is either a run
//! of common lines or a block where lines on side A were replaced by lines
//! on side B. Only line counts matter for alignment, so [`Region`] keeps
//! the counts and the intraline edit spans and drops the text.
//!
//! ## JSON Format
//!
//! Either a bare array of entries, or a full `DiffInfo` object carrying the
//! array under `content`. Responses may start with the `)]}'` guard line.
//!
//! ```json
//! [
//!   {"ab": ["fn main() {", "    let x = 1;"]},
//!   {"a": ["    old();"], "b": ["    new();", "    more();"], "edit_a": [[4, 3]], "edit_b": [[4, 3]]},
//!   {"skip": 120},
//!   {"b": ["}"]}
//! ]
//! ```

use crate::error::{Error, Result};
use serde::Deserialize;
use smallvec::SmallVec;

/// Guard prefix the review server puts in front of JSON responses.
const XSSI_PREFIX: &str = ")]}'";

/// Nearly every replace block carries 0-2 intraline spans per side.
pub type Edits = SmallVec<[EditSpan; 2]>;

/// An intraline edit: skip `skip` characters, then mark `mark` characters.
///
/// Offsets run across all lines of the region joined by newlines, and each
/// span starts where the previous one ended.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(from = "(u32, u32)")]
pub struct EditSpan {
    pub skip: u32,
    pub mark: u32,
}

impl From<(u32, u32)> for EditSpan {
    fn from((skip, mark): (u32, u32)) -> Self {
        Self { skip, mark }
    }
}

/// One contiguous span of a file diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Region {
    /// Lines identical on both sides.
    Common(u32),

    /// Common lines the server left out of the response. Aligns exactly
    /// like [`Region::Common`].
    Skip(u32),

    /// `a` lines on side A replaced by `b` lines on side B. `a == 0` is a
    /// pure insertion and `b == 0` a pure deletion.
    Replace {
        a: u32,
        b: u32,
        edits_a: Edits,
        edits_b: Edits,
    },
}

impl Region {
    #[inline]
    #[must_use]
    pub fn common(len: u32) -> Self {
        Self::Common(len)
    }

    #[inline]
    #[must_use]
    pub fn skip(len: u32) -> Self {
        Self::Skip(len)
    }

    #[inline]
    #[must_use]
    pub fn replace(a: u32, b: u32) -> Self {
        Self::Replace {
            a,
            b,
            edits_a: Edits::new(),
            edits_b: Edits::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn insert(len: u32) -> Self {
        Self::replace(0, len)
    }

    #[inline]
    #[must_use]
    pub fn delete(len: u32) -> Self {
        Self::replace(len, 0)
    }

    /// Number of lines this region occupies on side A.
    #[must_use]
    pub fn len_a(&self) -> u32 {
        match *self {
            Self::Common(len) | Self::Skip(len) => len,
            Self::Replace { a, .. } => a,
        }
    }

    /// Number of lines this region occupies on side B.
    #[must_use]
    pub fn len_b(&self) -> u32 {
        match *self {
            Self::Common(len) | Self::Skip(len) => len,
            Self::Replace { b, .. } => b,
        }
    }

    /// Whether this region is a change rather than common lines.
    #[must_use]
    pub fn is_change(&self) -> bool {
        matches!(self, Self::Replace { .. })
    }

    /// Converts one decoded content entry into a region.
    ///
    /// `index` is the entry's position in the content array and only
    /// feeds the error message.
    pub fn from_entry(index: usize, entry: ContentEntry) -> Result<Self> {
        let invalid = |reason| Error::InvalidRegion { index, reason };
        let has_replace = entry.a.is_some() || entry.b.is_some();

        match (entry.ab, entry.skip, has_replace) {
            (Some(_), Some(_), _) => Err(invalid("both `ab` and `skip` present")),
            (Some(_), None, true) | (None, Some(_), true) => {
                Err(invalid("common lines mixed with `a`/`b`"))
            }
            (Some(lines), None, false) => Ok(Self::Common(line_count(&lines))),
            (None, Some(len), false) => Ok(Self::Skip(len)),
            (None, None, false) => Err(invalid("entry has no lines")),
            (None, None, true) => {
                let a = entry.a.as_deref().map_or(0, line_count);
                let b = entry.b.as_deref().map_or(0, line_count);
                if a == 0 && b == 0 {
                    return Err(invalid("replace entry with no lines on either side"));
                }
                Ok(Self::Replace {
                    a,
                    b,
                    edits_a: entry.edit_a,
                    edits_b: entry.edit_b,
                })
            }
        }
    }
}

#[inline]
fn line_count(lines: &[String]) -> u32 {
    u32::try_from(lines.len()).unwrap_or(u32::MAX)
}

/// One element of the `content` array, as sent by the server.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct ContentEntry {
    pub ab: Option<Vec<String>>,
    pub a: Option<Vec<String>>,
    pub b: Option<Vec<String>>,

    #[serde(default)]
    pub edit_a: Edits,

    #[serde(default)]
    pub edit_b: Edits,

    pub skip: Option<u32>,

    /// Set when whitespace-ignoring made an otherwise changed block common.
    #[serde(default)]
    pub common: bool,

    #[serde(default)]
    pub due_to_rebase: bool,
}

/// The parts of a `DiffInfo` response this crate reads.
#[derive(Debug, Deserialize)]
struct DiffInfo {
    #[serde(default)]
    content: Vec<ContentEntry>,
}

/// Parses diff content into regions.
///
/// Handles two shapes:
/// - a bare `content` array `[{...}, {...}]`
/// - a `DiffInfo` object `{"meta_a": ..., "content": [...]}`
pub fn parse(json: &str) -> Result<Vec<Region>> {
    let json = strip_guard(json);

    let entries = match serde_json::from_str::<Vec<ContentEntry>>(json) {
        Ok(entries) => entries,
        Err(err) => {
            log::debug!("diff content is not a bare array ({err}), trying DiffInfo object");
            serde_json::from_str::<DiffInfo>(json)?.content
        }
    };

    entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| Region::from_entry(index, entry))
        .collect()
}

fn strip_guard(json: &str) -> &str {
    let trimmed = json.trim_start();
    trimmed.strip_prefix(XSSI_PREFIX).unwrap_or(trimmed)
}
