//! States processing the sequence of records, and the session driving them.

use either::Either::{Left, Right};
use log::debug;

use super::{
    error::{Error, ErrorKind},
    line::{Completed, LineState, StartAddress},
    record::{Record, RecordType},
    token::{Lexical, Token, TokenKind},
};

/// Position between, or within, records.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    /// No record has been started yet.
    #[default]
    StartOfRecord,
    /// Within a record, following its start code.
    Line(LineState),
    /// Following a validated record.
    EndOfRecord,
    /// Following a validated end of file record. Only line breaks and the
    /// end of input may follow.
    EndOfFile,
    /// The end of input has been reached.
    EndOfStream,
}

impl StreamState {
    /// Transition to another state by consuming a token.
    ///
    /// A start code resets the record and re-seeds `address` from its
    /// address offset. Returns the successor state, and the record the token
    /// completed, if any.
    pub fn advance(
        self,
        token: Token,
        record: &mut Record,
        address: &mut u32,
    ) -> Result<(Self, Option<Completed>), Error> {
        let fail = |kind| Error::new(kind, token.line, token.column);

        if let TokenKind::Invalid(reason) = token.kind {
            Err(fail(match reason {
                Lexical::HexDigit => ErrorKind::InvalidHexDigit,
                Lexical::SplitByte => ErrorKind::SplitByte,
            }))?;
        }

        let successor = match (self, token.kind) {
            (Self::StartOfRecord | Self::EndOfRecord, TokenKind::StartCode) => {
                record.reset_line();
                record.line_completed = false;
                *address = record.address_offset;
                Self::Line(LineState::ByteCount)
            }
            (Self::StartOfRecord | Self::EndOfRecord | Self::EndOfFile, TokenKind::EndOfLine) => {
                self
            }
            (
                Self::StartOfRecord | Self::EndOfRecord | Self::EndOfFile | Self::EndOfStream,
                TokenKind::EndOfInput,
            ) => Self::EndOfStream,
            (Self::Line(state), TokenKind::HexByte(r)) => {
                return match state.advance(r, record, address).map_err(fail)? {
                    Left(state) => Ok((Self::Line(state), None)),
                    Right(completed) => {
                        let successor = match completed.record_type {
                            RecordType::EndOfFile => Self::EndOfFile,
                            _ => Self::EndOfRecord,
                        };
                        Ok((successor, Some(completed)))
                    }
                };
            }
            (Self::Line(state), kind) => Err(fail(ErrorKind::UnexpectedTokenInLine {
                state,
                token: kind,
            }))?,
            (Self::EndOfFile | Self::EndOfStream, _) => Err(fail(ErrorKind::AfterEndOfStream))?,
            (state, kind) => Err(fail(ErrorKind::UnexpectedToken { state, token: kind }))?,
        };

        Ok((successor, None))
    }
}

/// A decoding session, owning the record in progress and the address of the
/// next byte to be produced.
///
/// Payload bytes are only produced once the checksum of their record has been
/// validated. Once any token fails to decode, the session is poisoned and
/// keeps returning the same error. A failing token source poisons it too.
#[derive(Debug, Default, Clone)]
pub struct Session {
    state: StreamState,
    record: Record,
    address: u32,
    start_address: Option<StartAddress>,
    fault: Option<Error>,
    position: (u32, u32),
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Address of the next byte to be produced.
    pub fn current_address(&self) -> u32 {
        self.address
    }

    /// Whether the end of input has been reached.
    pub fn end_of_stream(&self) -> bool {
        self.state == StreamState::EndOfStream
    }

    /// Whether the checksum of the current line has been validated (or no line
    /// is in progress).
    pub fn line_completed(&self) -> bool {
        self.record.line_completed
    }

    /// The start address from the most recent start address record.
    pub fn start_address(&self) -> Option<StartAddress> {
        self.start_address
    }

    /// Consume a single token.
    pub(crate) fn advance(&mut self, token: Token) -> Result<Option<Completed>, Error> {
        if let Some(err) = self.fault {
            return Err(err);
        }

        self.position = (token.line, token.column);

        let (state, completed) = self
            .state
            .advance(token, &mut self.record, &mut self.address)
            .inspect_err(|err| self.fault = Some(*err))?;

        if state == StreamState::EndOfStream && self.state != state {
            debug!("End of stream at line {}", token.line);
        }
        self.state = state;

        if let Some(start_address) = completed.and_then(|c| c.start_address) {
            self.start_address = Some(start_address);
        }

        Ok(completed)
    }

    /// Produce up to `buf.len()` payload bytes, pulling tokens as needed.
    ///
    /// Bytes left over from a previous call are produced first. Tokens are
    /// then consumed until `buf` is full, and the current line is complete,
    /// or until the end of input. Bytes beyond `buf.len()` remain queued for
    /// the next call.
    ///
    /// A token source that runs dry is treated as having reached the end of
    /// input. Returns the number of bytes written, which is only zero for a
    /// non-empty `buf` at the end of the stream.
    ///
    /// An error from the token source is returned as is, discarding any bytes
    /// already written to `buf`. Later calls fail with
    /// [`ErrorKind::SourceFailed`].
    pub fn read<I, E>(&mut self, tokens: &mut I, buf: &mut [u8]) -> Result<usize, E>
    where
        I: Iterator<Item = Result<Token, E>>,
        E: From<Error>,
    {
        if let Some(err) = self.fault {
            Err(err)?;
        }

        let mut n = self.drain(buf);

        while (n < buf.len() || !self.record.line_completed) && !self.end_of_stream() {
            let token = match tokens.next() {
                Some(Ok(token)) => token,
                Some(Err(err)) => {
                    let (line, column) = self.position;
                    self.fault = Some(Error::new(ErrorKind::SourceFailed, line, column));
                    return Err(err);
                }
                None => Token {
                    kind: TokenKind::EndOfInput,
                    line: self.position.0,
                    column: self.position.1,
                },
            };

            if self.advance(token)?.is_some() {
                n += self.drain(&mut buf[n..]);
            }
        }

        Ok(n)
    }

    /// Dequeue payload bytes into `buf`, advancing the current address.
    fn drain(&mut self, buf: &mut [u8]) -> usize {
        let n = self.record.drain_into(buf);
        self.address = self.address.wrapping_add(n as u32);
        n
    }
}

#[cfg(test)]
mod tests {
    use core::convert::Infallible;
    use std::{vec, vec::Vec};

    use super::*;
    use crate::sans::token::Tokenizer;

    fn tokens(input: &str) -> impl Iterator<Item = Result<Token, Error>> + '_ {
        Tokenizer::new(input.bytes().map(Ok::<_, Infallible>)).map(|t| t.map_err(|e| match e {}))
    }

    fn read_all(session: &mut Session, input: &str) -> Result<Vec<u8>, Error> {
        let mut tokens = tokens(input);
        let mut out = Vec::new();
        let mut buf = [0; 16];
        loop {
            let n = session.read(&mut tokens, &mut buf)?;
            if n == 0 {
                return Ok(out);
            }
            out.extend_from_slice(&buf[..n]);
        }
    }

    #[test]
    fn empty_input() {
        let mut session = Session::new();
        let mut buf = [0; 4];

        assert_eq!(session.read(&mut tokens(""), &mut buf), Ok(0));
        assert!(session.end_of_stream());
    }

    #[test]
    fn end_of_file_record() {
        let mut session = Session::new();
        let mut tokens = tokens(":00000001FF\n");

        assert_eq!(session.read(&mut tokens, &mut [0; 4]), Ok(0));
        assert!(session.line_completed());
        assert!(session.end_of_stream());
    }

    #[test]
    fn record_after_end_of_file() {
        let mut session = Session::new();
        let result = read_all(&mut session, ":00000001FF\n:00000001FF\n");

        assert_eq!(
            result,
            Err(Error::new(ErrorKind::AfterEndOfStream, 2, 1))
        );
    }

    #[test]
    fn unexpected_token_in_line() {
        let mut session = Session::new();
        let result = read_all(&mut session, ":0100000041\n");

        assert_eq!(
            result,
            Err(Error::new(
                ErrorKind::UnexpectedTokenInLine {
                    state: LineState::Checksum {
                        record_type: RecordType::Data,
                    },
                    token: TokenKind::EndOfLine,
                },
                1,
                12,
            ))
        );
    }

    #[test]
    fn segment_address_applies_to_data() {
        let mut session = Session::new();
        let mut tokens = tokens(":020000020102F9\n:0100100041AE\n");
        let mut buf = [0; 1];

        assert_eq!(session.read(&mut tokens, &mut buf), Ok(1));
        assert_eq!(buf, [0x41]);
        assert_eq!(session.current_address(), 0x1031);
    }

    #[test]
    fn poisoned_after_error() {
        let mut session = Session::new();
        let mut tokens = tokens(":00000001FE\n:00000001FF\n");

        let err = session.read(&mut tokens, &mut [0; 4]).unwrap_err();
        assert_eq!(
            err.kind,
            ErrorKind::Checksum {
                expected: 0xFF,
                found: 0xFE,
            }
        );
        assert_eq!(session.read(&mut tokens, &mut [0; 4]), Err(err));
    }

    #[test]
    fn poisoned_after_source_error() {
        let mut session = Session::new();
        let input = ":0100000041BE\n:0100010042BC\n:00000001FF\n".bytes().map(Ok);
        let mut tokens = Tokenizer::new(input.take(16).chain([Err("unplugged")]))
            .map(|t| t.map_err(Fault::Source));

        let mut buf = [0; 4];
        assert_eq!(session.read(&mut tokens, &mut buf), Err(Fault::Source("unplugged")));
        assert_eq!(
            session.read(&mut tokens, &mut buf),
            Err(Fault::Decode(Error::new(ErrorKind::SourceFailed, 2, 1)))
        );
    }

    #[derive(Debug, PartialEq)]
    enum Fault {
        Source(&'static str),
        Decode(Error),
    }

    impl From<Error> for Fault {
        fn from(err: Error) -> Self {
            Self::Decode(err)
        }
    }

    #[test]
    fn start_address_is_kept() {
        let mut session = Session::new();
        let bytes = read_all(&mut session, ":0400000300003800C1\n:00000001FF\n").unwrap();

        assert_eq!(bytes, vec![]);
        assert_eq!(
            session.start_address(),
            Some(StartAddress::Segment { cs: 0, ip: 0x3800 })
        );
    }
}
