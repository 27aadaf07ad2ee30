use thiserror::Error;

/// Fatal conversion errors. Without a parsed header there is no epoch, so
/// none of the event timestamps can be computed and the run aborts.
#[derive(Debug, Error)]
pub enum Error {
    #[error("malformed header: {reason}")]
    MalformedHeader { reason: String },
}

/// Per-line decode failures. These are never fatal: the converter skips the
/// offending line, records it, and keeps going.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DecodeError {
    #[error("line truncated: expected at least {expected} tokens, found {found}")]
    TruncatedLine { expected: usize, found: usize },

    #[error("malformed identifier: {token:?} is not a 32-bit counter")]
    MalformedIdentifier { token: String },

    #[error("malformed vector: {token:?} is not 3 comma-separated numbers")]
    MalformedVector { token: String },

    #[error("malformed number: {token:?}")]
    MalformedNumber { token: String },

    #[error("unknown win condition {0}")]
    UnknownWinCondition(i32),

    #[error("malformed quoting near {rest:?}")]
    MalformedQuoting { rest: String },
}

/// A line the converter could not decode, kept for reporting.
#[derive(Debug, Clone)]
pub struct SkippedLine {
    /// 1-based line number within the input file (the header is line 1).
    pub line_number: usize,
    /// The raw line text as read.
    pub raw: String,
    pub error: DecodeError,
}
