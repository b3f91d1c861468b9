//! # diffalign
//!
//! Line alignment and chunk navigation for side-by-side diff viewers.
//!
//! A side-by-side view shows two files with different line numbering. This
//! crate keeps the two numberings in sync: for any line on one side it
//! answers which line on the other side corresponds to it and whether the
//! two render at the same height, and it indexes the changed regions so the
//! cursor can jump between them.
//!
//! ## Architecture
//!
//! - `region` - Diff regions and parsing of the review server's content JSON
//! - `line_mapper` - The incremental interval map between side A and side B
//! - `chunk` - Ordered index of changed regions with lookup and navigation
//! - `skip` - Collapsing of long common runs around the changes
//! - `options` - View configuration
//! - `processor` - The single forward scan that builds all of the above
//! - `lib` (this module) - Re-exports and, with the `lua` feature, Lua bindings
//!
//! ## Usage
//!
//! ```
//! use diffalign::{Direction, FileDiff, Region, Side, ViewOptions};
//!
//! let regions = [Region::common(5), Region::delete(2), Region::common(3)];
//! let diff = FileDiff::build(&regions, &ViewOptions::default());
//!
//! // First common line after the deletion.
//! let info = diff.line_on_other(Side::A, 7);
//! assert_eq!((info.line, info.aligned), (Some(5), true));
//!
//! let chunk = diff.navigate(Side::B, 0, Direction::Next).unwrap();
//! assert_eq!((chunk.side, chunk.start, chunk.end), (Side::A, 5, 6));
//! ```
//!
//! ## Usage from Lua
//!
//! Built with `--features lua`:
//!
//! ```lua
//! local diffalign = require("diffalign")
//!
//! local diff = diffalign.build(json, 10)
//! local info = diff:line_on_other("b", 42)
//! local chunk = diff:navigate("b", 42, "next", true)
//! ```

pub mod chunk;
pub mod error;
pub mod line_mapper;
#[cfg(feature = "lua")]
mod lua;
pub mod options;
pub mod processor;
pub mod region;
pub mod skip;

pub use chunk::{ChunkDescriptor, ChunkIndex, Direction};
pub use error::{Error, Result};
pub use line_mapper::{AlignedPair, Gap, LineMapper, LineOnOther, Side};
pub use options::{Context, ViewOptions};
pub use processor::{DiffStats, FileDiff, FileInput, process_files};
pub use region::{EditSpan, Region};
pub use skip::{SkipPlan, SkippedRange};

/// Parses diff content JSON and builds its model.
pub fn build_from_json(json: &str, options: &ViewOptions) -> Result<FileDiff> {
    let regions = region::parse(json)?;
    Ok(FileDiff::build(&regions, options))
}

/// Creates the Lua module exports. Called by mlua when loaded via `require("diffalign")`.
#[cfg(feature = "lua")]
#[mlua::lua_module]
fn diffalign(lua: &mlua::Lua) -> mlua::Result<mlua::Table> {
    let exports = lua.create_table()?;
    exports.set("build", lua.create_function(crate::lua::build)?)?;
    exports.set("build_many", lua.create_function(crate::lua::build_many)?)?;
    Ok(exports)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_from_json_runs_full_pipeline() {
        let json = r#"[{"ab": ["a", "b"]}, {"a": ["c"], "b": ["C", "D"]}, {"ab": ["e"]}]"#;
        let diff = build_from_json(json, &ViewOptions::default()).unwrap();

        assert!(diff.has_changes());
        assert_eq!(diff.stats().additions, 2);
        assert_eq!(diff.stats().deletions, 1);
        assert_eq!(diff.initial_cursor(), Some((Side::B, 2)));
        assert_eq!(diff.line_on_other(Side::B, 4).line, Some(3));
    }

    #[test]
    fn build_from_json_reports_bad_input() {
        let err = build_from_json(r#"[{"skip": 3, "ab": ["x"]}]"#, &ViewOptions::default());
        assert!(matches!(err, Err(Error::InvalidRegion { index: 0, .. })));
    }
}
