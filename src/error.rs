//! Error types for decoding diff content.
//!
//! Only malformed input is an error. Lookups that find nothing return
//! `None`, and precondition violations in the alignment model panic.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to parse diff content JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid diff region at index {index}: {reason}")]
    InvalidRegion { index: usize, reason: &'static str },
}

pub type Result<T> = std::result::Result<T, Error>;
