//! View configuration.

use serde::Deserialize;

/// How many common lines to keep around each change before collapsing the
/// rest into a skipped range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "i64")]
pub enum Context {
    /// Show every line. Encoded as `-1` in preferences.
    WholeFile,
    Lines(u32),
}

impl Default for Context {
    fn default() -> Self {
        Self::Lines(ViewOptions::DEFAULT_CONTEXT)
    }
}

impl TryFrom<i64> for Context {
    type Error = String;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            -1 => Ok(Self::WholeFile),
            n => u32::try_from(n)
                .map(Self::Lines)
                .map_err(|_| format!("invalid context {n}: expected -1 or a line count")),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ViewOptions {
    pub context: Context,
}

impl ViewOptions {
    pub const DEFAULT_CONTEXT: u32 = 10;

    #[must_use]
    pub fn with_context(context: Context) -> Self {
        Self { context }
    }

    /// Parses options from JSON preferences, e.g. `{"context": 3}`.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_context_is_ten_lines() {
        assert_eq!(ViewOptions::default().context, Context::Lines(10));
    }

    #[test]
    fn parse_line_context() {
        let options = ViewOptions::from_json(r#"{"context": 3}"#).unwrap();
        assert_eq!(options.context, Context::Lines(3));
    }

    #[test]
    fn parse_whole_file_context() {
        let options = ViewOptions::from_json(r#"{"context": -1}"#).unwrap();
        assert_eq!(options.context, Context::WholeFile);
    }

    #[test]
    fn missing_fields_use_defaults() {
        let options = ViewOptions::from_json("{}").unwrap();
        assert_eq!(options, ViewOptions::default());
    }

    #[test]
    fn reject_negative_context() {
        assert!(ViewOptions::from_json(r#"{"context": -5}"#).is_err());
    }
}
