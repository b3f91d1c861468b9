//! Lua conversions for the alignment model.
//!
//! A built [`FileDiff`] is handed to Lua as userdata so the editor can keep
//! querying it while the user scrolls and moves between chunks. Query
//! results come back as plain tables. Line numbers stay 0-indexed.

use crate::chunk::{ChunkDescriptor, Direction};
use crate::line_mapper::{AlignedPair, LineOnOther, Side};
use crate::options::{Context, ViewOptions};
use crate::processor::{DiffStats, FileDiff, FileInput, process_files};
use crate::region;
use crate::skip::SkippedRange;
use mlua::prelude::*;
use std::path::PathBuf;

/// Context from an optional Lua integer; nil means the default.
fn options(context: Option<i64>) -> LuaResult<ViewOptions> {
    context
        .map(Context::try_from)
        .transpose()
        .map(|context| ViewOptions::with_context(context.unwrap_or_default()))
        .map_err(LuaError::RuntimeError)
}

/// Builds one file's model from its diff content JSON.
pub(crate) fn build(_: &Lua, (json, context): (String, Option<i64>)) -> LuaResult<FileDiff> {
    crate::build_from_json(&json, &options(context)?)
        .map_err(|e| LuaError::RuntimeError(e.to_string()))
}

/// Builds models for `{ {path = ..., content = json}, ... }` in parallel.
/// Returns a table keyed by path.
pub(crate) fn build_many(lua: &Lua, (files, context): (LuaTable, Option<i64>)) -> LuaResult<LuaTable> {
    let options = options(context)?;

    let inputs = files
        .sequence_values::<LuaTable>()
        .map(|file| {
            let file = file?;
            let path: String = file.get("path")?;
            let content: String = file.get("content")?;
            let regions = region::parse(&content)
                .map_err(|e| LuaError::RuntimeError(format!("{path}: {e}")))?;
            Ok(FileInput {
                path: PathBuf::from(path),
                regions,
            })
        })
        .collect::<LuaResult<Vec<_>>>()?;

    let result = lua.create_table()?;
    for (path, diff) in process_files(inputs, &options) {
        result.set(path.to_string_lossy().as_ref(), diff)?;
    }
    Ok(result)
}

impl IntoLua for Side {
    fn into_lua(self, lua: &Lua) -> LuaResult<LuaValue> {
        let name = match self {
            Side::A => "a",
            Side::B => "b",
        };
        name.into_lua(lua)
    }
}

impl FromLua for Side {
    fn from_lua(value: LuaValue, lua: &Lua) -> LuaResult<Self> {
        match String::from_lua(value, lua)?.as_str() {
            "a" | "A" => Ok(Side::A),
            "b" | "B" => Ok(Side::B),
            other => Err(LuaError::RuntimeError(format!(
                "invalid side {other:?}: expected \"a\" or \"b\""
            ))),
        }
    }
}

impl FromLua for Direction {
    fn from_lua(value: LuaValue, lua: &Lua) -> LuaResult<Self> {
        match String::from_lua(value, lua)?.as_str() {
            "next" => Ok(Direction::Next),
            "prev" => Ok(Direction::Prev),
            other => Err(LuaError::RuntimeError(format!(
                "invalid direction {other:?}: expected \"next\" or \"prev\""
            ))),
        }
    }
}

impl IntoLua for LineOnOther {
    fn into_lua(self, lua: &Lua) -> LuaResult<LuaValue> {
        let table = lua.create_table()?;
        // nil line means "above the first line"
        table.set("line", self.line)?;
        table.set("aligned", self.aligned)?;
        Ok(LuaValue::Table(table))
    }
}

impl IntoLua for AlignedPair {
    fn into_lua(self, lua: &Lua) -> LuaResult<LuaValue> {
        let table = lua.create_table()?;
        table.set("src", self.src)?;
        table.set("dst", self.dst)?;
        Ok(LuaValue::Table(table))
    }
}

impl IntoLua for ChunkDescriptor {
    fn into_lua(self, lua: &Lua) -> LuaResult<LuaValue> {
        let table = lua.create_table()?;
        table.set("side", self.side)?;
        table.set("start", self.start)?;
        table.set("end", self.end)?;
        table.set("is_edit_pair", self.is_edit_pair)?;
        Ok(LuaValue::Table(table))
    }
}

impl IntoLua for SkippedRange {
    fn into_lua(self, lua: &Lua) -> LuaResult<LuaValue> {
        let table = lua.create_table()?;
        table.set("start_a", self.start_a)?;
        table.set("start_b", self.start_b)?;
        table.set("size", self.size)?;
        Ok(LuaValue::Table(table))
    }
}

impl IntoLua for DiffStats {
    fn into_lua(self, lua: &Lua) -> LuaResult<LuaValue> {
        let table = lua.create_table()?;
        table.set("additions", self.additions)?;
        table.set("deletions", self.deletions)?;
        table.set("lines_a", self.lines_a)?;
        table.set("lines_b", self.lines_b)?;
        Ok(LuaValue::Table(table))
    }
}

impl LuaUserData for FileDiff {
    fn add_methods<M: LuaUserDataMethods<Self>>(methods: &mut M) {
        methods.add_method("line_on_other", |_, this, (side, line): (Side, u32)| {
            Ok(this.line_on_other(side, line))
        });
        methods.add_method("align", |_, this, (side, line): (Side, u32)| {
            Ok(this.align(side, line))
        });
        methods.add_method("find_chunk", |_, this, (side, line): (Side, u32)| {
            Ok(this.find_chunk(side, line))
        });
        methods.add_method(
            "navigate",
            |_, this, (side, line, direction, wrap): (Side, u32, Direction, Option<bool>)| {
                Ok(if wrap.unwrap_or(false) {
                    this.navigate_wrapping(side, line, direction)
                } else {
                    this.navigate(side, line, direction)
                })
            },
        );
        methods.add_method("first_chunk", |_, this, ()| Ok(this.first_chunk()));
        methods.add_method("initial_cursor", |lua, this, ()| {
            this.initial_cursor()
                .map(|(side, line)| {
                    let table = lua.create_table()?;
                    table.set("side", side)?;
                    table.set("line", line)?;
                    Ok::<_, LuaError>(table)
                })
                .transpose()
        });
        methods.add_method("chunks", |lua, this, ()| {
            lua.create_sequence_from(this.chunks().iter().copied())
        });
        methods.add_method("skips", |lua, this, ()| {
            lua.create_sequence_from(this.skips().iter().copied())
        });
        methods.add_method("stats", |_, this, ()| Ok(this.stats()));
        methods.add_method("has_changes", |_, this, ()| Ok(this.has_changes()));
        methods.add_method_mut("reveal", |_, this, (side, line, context): (Side, u32, u32)| {
            this.reveal(side, line, context);
            Ok(())
        });
    }
}
