//! Internal finite-state machine for implementing decoders.
//!
//! This module is intended for applications that need fine control over
//! decoder internals. See [`crate::avec`] for the reader built on top of it.
//!
//! # Architecture
//!
//! Decoding happens in four layers, each feeding the next:
//!
//! - [`token::Tokenizer`] lexes a byte source into location-tagged tokens:
//! start codes, hex byte pairs, line breaks and the end of input.
//!
//! - [`record::Record`] accumulates the fields of the line being decoded,
//! along with its running checksum and the sticky address offset.
//!
//! - [`line::LineState`] walks the fields of a single record, from byte count
//! to checksum. [`stream::StreamState`] walks records, from the first start
//! code to the end of the stream.
//!
//! - [`stream::Session`] owns the record and both state machines, and hands
//! out payload bytes once the line they belong to has been validated.
//!
//! Every failure is reported as an [`Error`] carrying the line and column of
//! the offending input.

pub mod check;
pub mod error;
pub mod line;
pub mod record;
pub mod stream;
pub mod token;

pub use error::{Error, ErrorKind};

/// Entrypoint to the finite-state machine.
pub type Decoder = stream::Session;
