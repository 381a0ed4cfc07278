#![no_std]

//! A streaming decoder for the Intel HEX format.
//!
//! Intel HEX documents are read incrementally: payload bytes are handed out
//! as the caller asks for them, and only once the checksum of the record
//! holding them has been confirmed. Extended segment and linear address
//! records are applied as they are reached, so the address of the next byte
//! is always available.
//!
//! Most users should begin with [`avec::HexReader`], or the
//! [`avec::decode_slice`] and [`avec::decode_reader`] functions. The
//! underlying tokenizer and state machines are exposed in the [`sans`]
//! module for applications needing finer control.
//!
//! ## Cargo Features
//!
//! The following crate feature flags are available:
//!
//! - `std`: enable reader-based decoding (default).

#[cfg(any(feature = "std", test))]
extern crate std;

pub mod avec;
pub mod sans;
