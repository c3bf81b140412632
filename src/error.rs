use crate::span::Position;
use thiserror::Error as ThisError;

/// A failure of the grammar driver to match any production at the current
/// input position. Carries the position so callers can report it without the
/// parser having to format a full diagnostic string itself.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
#[error("{position}: expected {expected}")]
pub struct ParseError {
    pub position: Position,
    pub expected: String,
}

impl ParseError {
    pub fn new(position: Position, expected: impl Into<String>) -> Self {
        Self {
            position,
            expected: expected.into(),
        }
    }
}

/// Top-level error for [`crate::transform`]. Parsing this grammar essentially
/// never fails outright (almost every block production has `Paragraph` as a
/// catch-all fallback), but a handful of productions have no fallback and can
/// still raise [`ParseError`]; I/O failures from the sink are folded in here
/// too so callers only have one error type to handle.
#[derive(Debug, ThisError)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("write to output sink failed: {0}")]
    Io(#[from] std::fmt::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
