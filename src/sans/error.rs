//! Errors raised while decoding.

use thiserror::Error;

use super::{line::LineState, record::RecordType, stream::StreamState, token::TokenKind};

/// An error decoding a document, with the position it was detected at.
///
/// Lines and columns are 1-based. Columns count bytes of input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{kind} at line {line}, column {column}.")]
pub struct Error {
    pub kind: ErrorKind,
    pub line: u32,
    pub column: u32,
}

impl Error {
    pub(crate) fn new(kind: ErrorKind, line: u32, column: u32) -> Self {
        Self { kind, line, column }
    }
}

/// The cause of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ErrorKind {
    /// A character inside a record is not a hexadecimal digit.
    #[error("Invalid hex digit")]
    InvalidHexDigit,
    /// A line break, start code or the end of input fell between the two
    /// digits of a byte.
    #[error("Byte split across a record boundary")]
    SplitByte,
    /// A token not accepted between records.
    #[error("Unexpected {token:?} token in state {state:?}")]
    UnexpectedToken { state: StreamState, token: TokenKind },
    /// A token other than a hex byte while processing a line.
    #[error("Unexpected {token:?} token processing a line (at {state:?})")]
    UnexpectedTokenInLine { state: LineState, token: TokenKind },
    /// The record type byte is not one of the six known types.
    #[error("Unknown record type ({0:#04X})")]
    UnknownRecordType(u8),
    /// The byte count does not match the one required by the record type.
    #[error("{record_type:?} record expects a byte count of {expected}, found {found}")]
    ByteCount {
        record_type: RecordType,
        expected: u8,
        found: u8,
    },
    /// A data record declared no payload.
    #[error("Data record without data")]
    EmptyData,
    /// Calculated and found checksums do not match.
    #[error("Calculated ({expected:#04X}) and found ({found:#04X}) checksums do not match")]
    Checksum { expected: u8, found: u8 },
    /// A record followed the end of the stream.
    #[error("No further records after end of stream")]
    AfterEndOfStream,
    /// A single byte was requested with none left to produce.
    #[error("End of stream")]
    EndOfStream,
    /// Decoding was abandoned after the byte source failed.
    #[error("Decoding stopped by an earlier source error")]
    SourceFailed,
}
