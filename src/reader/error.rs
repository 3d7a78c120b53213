use super::Reader;
use crate::ParseError;
use thiserror::Error;

#[doc = r#"
A set of errors that can occur while reading bytes into the event model
"#]
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Reading at Position {position}, {kind}")]
pub struct ReaderError {
    position: usize,
    pub(crate) kind: ReaderErrorKind,
}

/// A kind of error that a reader can produce
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReaderErrorKind {
    /// Parsing errors
    #[error("Parsing {0}")]
    ParseError(#[from] ParseError),
    /// Reading out of bounds. Inside a track this means the data is truncated.
    #[error("Read out of bounds!")]
    OutOfBounds,
}

impl ReaderError {
    /// Create a reader error from a position and kind
    pub const fn new(position: usize, kind: ReaderErrorKind) -> Self {
        Self { position, kind }
    }
    /// True if out of bounds or unexpected end of data
    pub const fn is_out_of_bounds(&self) -> bool {
        matches!(self.kind, ReaderErrorKind::OutOfBounds)
    }
    /// Returns the error kind of the reader.
    pub fn error_kind(&self) -> &ReaderErrorKind {
        &self.kind
    }
    /// Returns the position where the read error occurred.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Returns the parse error, if this is not an out of bounds error
    pub fn parse_error(&self) -> Option<&ParseError> {
        match &self.kind {
            ReaderErrorKind::ParseError(e) => Some(e),
            ReaderErrorKind::OutOfBounds => None,
        }
    }

    /// Create a new invalid data error
    pub const fn invalid(position: usize, error: ParseError) -> Self {
        Self {
            position,
            kind: ReaderErrorKind::ParseError(error),
        }
    }

    /// Create a new out of bounds error
    pub const fn oob(position: usize) -> Self {
        Self {
            position,
            kind: ReaderErrorKind::OutOfBounds,
        }
    }

    /// Shift the reported position by `offset`.
    ///
    /// Track readers work on a sub-slice of the file, so their positions
    /// are relative to the start of the track body.
    pub const fn offset_by(mut self, offset: usize) -> Self {
        self.position += offset;
        self
    }
}

/// The Read Result type (see [`ReaderError`])
pub type ReadResult<T> = Result<T, ReaderError>;

pub(crate) fn inv_data(reader: &Reader<'_>, v: impl Into<ParseError>) -> ReaderError {
    ReaderError::invalid(reader.buffer_position(), v.into())
}
