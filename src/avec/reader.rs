//! Reader-based decoder implementation.
//!
//! _Requires Cargo feature `std`._

use std::io::{self, BufReader, Bytes, Read};

use super::{HexReader, Image};

/// Errors occurring while decoding from a reader.
pub type Error = super::Error<io::Error>;

impl From<Error> for io::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::Source(err) => err,
            Error::Decode(err) => io::Error::new(io::ErrorKind::InvalidData, err),
        }
    }
}

/// Byte source over a reader.
pub type ReaderBytes<R> = Bytes<BufReader<R>>;

impl<R: Read> HexReader<ReaderBytes<R>> {
    /// Read the payload of a document from a reader. The reader is buffered
    /// internally.
    pub fn from_reader(r: R) -> Self {
        Self::new(BufReader::new(r).bytes())
    }
}

/// Decoded payload of a document, as a [`Read`] implementation.
///
/// Malformed documents are reported as errors of kind
/// [`io::ErrorKind::InvalidData`], wrapping a [`crate::sans::Error`].
#[derive(Debug)]
pub struct HexRead<R>(HexReader<ReaderBytes<R>>);

impl<R: Read> HexRead<R> {
    pub fn new(r: R) -> Self {
        Self(HexReader::from_reader(r))
    }

    /// Address of the next byte to be read.
    pub fn current_address(&self) -> u32 {
        self.0.current_address()
    }
}

impl<R: Read> Read for HexRead<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Ok(self.0.read(buf)?)
    }
}

/// Decode a document from a reader, publishing to a receiver.
///
/// This method is also re-exported as `ihex_stream::avec::decode_reader`.
///
/// _Requires Cargo feature `std`._
pub fn decode(r: &mut impl Read, o: &mut impl Image) -> Result<(), Error> {
    HexReader::from_reader(r).decode_into(o)
}
