use std::io;

/// failure to turn a byte buffer into a log source
///
/// malformed single entries never produce this error, they are dropped or
/// glued to the previous record by the parsers
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("log format is corrupted: {0}")]
    CorruptedFormat(String),

    #[error("too few time anchors to interpolate timestamps (found {found}, need at least 2)")]
    InsufficientAnchors { found: usize },

    #[error("failed to read log data: {0}")]
    Io(#[from] io::Error),
}

impl ParseError {
    pub fn corrupted(reason: impl Into<String>) -> Self {
        Self::CorruptedFormat(reason.into())
    }
}

/// failure to read a user-typed timestamp
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TimestampParseError {
    #[error("timestamp is empty")]
    Empty,

    #[error("'{0}' is not a timestamp, expected seconds[.fraction] or YYYY-MM-DD hh:mm:ss[.fraction]")]
    Invalid(String),

    #[error("timestamp '{0}' is out of range")]
    OutOfRange(String),
}
