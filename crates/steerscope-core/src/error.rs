//! Error taxonomy.
//!
//! Every error here is recoverable and local to one side: the operation that
//! produced it did not apply, and all other state is untouched.

use std::path::PathBuf;

use crate::state::Side;

/// How an uploaded payload failed to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MalformedKind {
    /// Not valid JSON (including empty or truncated input).
    Syntax,
    /// Valid JSON, but not an ordered sequence of token records.
    Shape,
    /// The bytes were not UTF-8.
    Encoding,
}

impl std::fmt::Display for MalformedKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Syntax => write!(f, "syntax"),
            Self::Shape => write!(f, "shape"),
            Self::Encoding => write!(f, "encoding"),
        }
    }
}

/// An uploaded trace could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed trace ({kind}) at line {line}, column {column}: {message}")]
pub struct MalformedTraceError {
    pub kind: MalformedKind,
    /// 1-based; 0 when the position is unknown.
    pub line: usize,
    pub column: usize,
    pub message: String,
}

impl MalformedTraceError {
    pub(crate) fn from_json(err: &serde_json::Error) -> Self {
        use serde_json::error::Category;
        let kind = match err.classify() {
            Category::Data => MalformedKind::Shape,
            Category::Syntax | Category::Eof | Category::Io => MalformedKind::Syntax,
        };
        Self {
            kind,
            line: err.line(),
            column: err.column(),
            message: err.to_string(),
        }
    }

    pub(crate) fn encoding(err: &std::str::Utf8Error) -> Self {
        Self {
            kind: MalformedKind::Encoding,
            line: 0,
            column: 0,
            message: format!("invalid UTF-8 after byte {}", err.valid_up_to()),
        }
    }
}

/// A selection was attempted outside the bounds of the side's current trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("{side} token index {index} is out of range for a trace of {len} tokens")]
pub struct IndexOutOfRangeError {
    pub side: Side,
    pub index: usize,
    pub len: usize,
}

/// A next-token entry did not hold exactly one candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("next-token entry {position} has {key_count} keys, expected exactly 1")]
pub struct MalformedCandidateEntryError {
    pub position: usize,
    pub key_count: usize,
}

/// Reading a trace file failed before any parsing happened.
#[derive(Debug, thiserror::Error)]
#[error("failed to read {}: {source}", .path.display())]
pub struct ReadError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

/// Any failure surfaced by the dashboard.
#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    #[error(transparent)]
    MalformedTrace(#[from] MalformedTraceError),
    #[error(transparent)]
    IndexOutOfRange(#[from] IndexOutOfRangeError),
    #[error(transparent)]
    MalformedCandidateEntry(#[from] MalformedCandidateEntryError),
    #[error(transparent)]
    Read(#[from] ReadError),
}
