//! Convenience interfaces for common decoding patterns.
//!
//! [`HexReader`] hands out payload bytes incrementally from any byte source.
//! The [`decode_slice`] and [`decode_reader`] functions decode a whole
//! document, publishing each byte and its address to an [`Image`].

#[cfg(feature = "std")]
pub mod reader;
pub mod slice;

#[cfg(feature = "std")]
pub use reader::decode as decode_reader;
pub use slice::decode as decode_slice;

use thiserror::Error;

use crate::sans::{
    self, Decoder, ErrorKind,
    line::StartAddress,
    token::Tokenizer,
};

/// Errors occurring while reading from a byte source.
#[derive(Debug, Error)]
pub enum Error<E> {
    /// An error from the supplied source.
    #[error("Failed to read source.")]
    Source(#[source] E),
    /// The document is malformed.
    #[error(transparent)]
    Decode(#[from] sans::Error),
}

/// An incremental reader of the payload bytes of a document.
///
/// The source is any iterator of fallible bytes. See
/// [`HexReader::from_slice`] and, with Cargo feature `std`,
/// [`HexReader::from_reader`].
#[derive(Debug)]
pub struct HexReader<I> {
    tokens: Tokenizer<I>,
    session: Decoder,
}

impl<I> HexReader<I> {
    pub fn new(source: I) -> Self {
        Self {
            tokens: Tokenizer::new(source),
            session: Decoder::new(),
        }
    }

    /// Address of the next byte to be read.
    pub fn current_address(&self) -> u32 {
        self.session.current_address()
    }

    /// Whether the end of the document has been reached. Bytes may still be
    /// queued until a read returns zero.
    pub fn end_of_stream(&self) -> bool {
        self.session.end_of_stream()
    }

    /// Whether the line last touched by a read has been fully validated.
    pub fn line_completed(&self) -> bool {
        self.session.line_completed()
    }

    /// The start address from the most recent start address record read.
    pub fn start_address(&self) -> Option<StartAddress> {
        self.session.start_address()
    }
}

impl<I, E> HexReader<I>
where
    I: Iterator<Item = Result<u8, E>>,
{
    /// Read up to `buf.len()` payload bytes, returning how many were read.
    ///
    /// The line holding the last byte read is always decoded to its end, so
    /// that its checksum has been validated and its address effects applied.
    /// Zero is only returned for a non-empty `buf` at the end of the document.
    ///
    /// Once the source fails, its error is returned and every later read
    /// fails with [`ErrorKind::SourceFailed`].
    pub fn read(&mut self, buf: &mut [u8]) -> Result<usize, Error<E>> {
        let mut tokens = self.tokens.by_ref().map(|t| t.map_err(Error::Source));
        self.session.read(&mut tokens, buf)
    }

    /// Read up to `max_count` payload bytes into `buf`, starting at `offset`.
    ///
    /// The count is clamped to the space available in `buf`.
    pub fn read_at(
        &mut self,
        buf: &mut [u8],
        offset: usize,
        max_count: usize,
    ) -> Result<usize, Error<E>> {
        let end = offset.saturating_add(max_count).min(buf.len());
        self.read(buf.get_mut(offset..end).unwrap_or_default())
    }

    /// Read a single payload byte.
    ///
    /// Fails with [`ErrorKind::EndOfStream`] if no byte is left.
    pub fn read_byte(&mut self) -> Result<u8, Error<E>> {
        let mut b = [0];

        if self.read(&mut b)? == 0 {
            let (line, column) = self.tokens.position();
            Err(sans::Error::new(ErrorKind::EndOfStream, line, column))?;
        }

        Ok(b[0])
    }

    /// Read every remaining byte, publishing each to a receiver along with the
    /// address it was read from.
    pub fn decode_into(&mut self, o: &mut (impl Image + ?Sized)) -> Result<(), Error<E>> {
        let mut b = [0];

        while self.read(&mut b)? != 0 {
            // The address has already moved past the byte.
            o.add_byte(self.current_address().wrapping_sub(1), b[0]);
        }

        if let Some(start_address) = self.start_address() {
            o.add_start_address(start_address);
        }

        Ok(())
    }
}

/// Receive the contents of a document.
///
/// The default implementation of each method ignores received values.
#[allow(unused_variables)]
pub trait Image {
    /// Add a payload byte, at its absolute address.
    fn add_byte(&mut self, address: u32, value: u8) {}
    /// Add the execution start address given by the document, if any.
    fn add_start_address(&mut self, start_address: StartAddress) {}
}
