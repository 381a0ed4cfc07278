//! Slice-based decoder implementation.

use core::{
    convert::Infallible,
    iter::{Copied, Map},
    slice::Iter,
};

use super::{HexReader, Image};

/// Errors occurring while decoding from a slice. Only [`super::Error::Decode`]
/// can occur.
pub type Error = super::Error<Infallible>;

/// Byte source over a slice.
pub type SliceBytes<'a> = Map<Copied<Iter<'a, u8>>, fn(u8) -> Result<u8, Infallible>>;

impl<'a> HexReader<SliceBytes<'a>> {
    /// Read the payload of a document held in a slice.
    pub fn from_slice(r: &'a [u8]) -> Self {
        Self::new(r.iter().copied().map(Ok as fn(u8) -> Result<u8, Infallible>))
    }
}

/// Decode a document from a slice, publishing to a receiver.
///
/// This method is also re-exported as `ihex_stream::avec::decode_slice`.
pub fn decode(r: &[u8], o: &mut impl Image) -> Result<(), Error> {
    HexReader::from_slice(r).decode_into(o)
}
