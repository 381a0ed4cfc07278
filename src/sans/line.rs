//! States processing the fields of a single record.

use either::Either::{self, Left, Right};
use log::{debug, trace};
use zerocopy::FromBytes;

use super::{
    error::ErrorKind,
    record::{Record, RecordType},
};

/// An execution start address, from a start address record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartAddress {
    /// `CS:IP` register values, from a start segment address record.
    Segment { cs: u16, ip: u16 },
    /// `EIP` register value, from a start linear address record.
    Linear(u32),
}

/// A record whose checksum has been validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Completed {
    pub record_type: RecordType,
    pub start_address: Option<StartAddress>,
}

/// Position within a record, following its start code.
///
/// Fields are visited strictly in order: byte count, the two address bytes,
/// record type, each payload byte, and the checksum.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum LineState {
    #[default]
    ByteCount,
    Address1,
    Address2,
    RecordType,
    Data {
        record_type: RecordType,
        remaining: u8,
    },
    Checksum {
        record_type: RecordType,
    },
}

impl LineState {
    /// Transition to another state by consuming a byte of the record.
    ///
    /// Address bytes are added to `address`, big-endian. Once the checksum has
    /// been validated, the record's side effects are applied and the
    /// completed record is returned in place of a successor state.
    pub fn advance(
        self,
        r: u8,
        record: &mut Record,
        address: &mut u32,
    ) -> Result<Either<Self, Completed>, ErrorKind> {
        let successor = match self {
            Self::ByteCount => {
                record.byte_count = r;
                record.add_to_crc(r);
                Self::Address1
            }
            Self::Address1 => {
                *address = address.wrapping_add(u32::from(r) << 8);
                record.add_to_crc(r);
                Self::Address2
            }
            Self::Address2 => {
                *address = address.wrapping_add(u32::from(r));
                record.add_to_crc(r);
                Self::RecordType
            }
            Self::RecordType => {
                let record_type = RecordType::from_byte(r).ok_or(ErrorKind::UnknownRecordType(r))?;
                let found = record.byte_count;

                match record_type.byte_count() {
                    Some(expected) if expected != found => Err(ErrorKind::ByteCount {
                        record_type,
                        expected,
                        found,
                    })?,
                    None if found == 0 => Err(ErrorKind::EmptyData)?,
                    _ => {}
                }

                record.add_to_crc(r);

                if found != 0 {
                    Self::Data {
                        record_type,
                        remaining: found,
                    }
                } else {
                    Self::Checksum { record_type }
                }
            }
            Self::Data {
                record_type,
                remaining,
            } => {
                record.add_byte(r);

                if remaining > 1 {
                    Self::Data {
                        record_type,
                        remaining: remaining - 1,
                    }
                } else {
                    Self::Checksum { record_type }
                }
            }
            Self::Checksum { record_type } => {
                let expected = record.running_checksum();
                if r != expected {
                    Err(ErrorKind::Checksum { expected, found: r })?;
                }

                record.line_completed = true;
                return Ok(Right(complete(record_type, record, address)?));
            }
        };

        Ok(Left(successor))
    }
}

/// Apply the side effects of a validated record.
fn complete(
    record_type: RecordType,
    record: &mut Record,
    address: &mut u32,
) -> Result<Completed, ErrorKind> {
    trace!(
        "{record_type:?} record of {} bytes at {:#010X}",
        record.byte_count,
        *address
    );

    let mut start_address = None;

    match record_type {
        RecordType::Data | RecordType::EndOfFile => {}
        RecordType::ExtendedSegmentAddress => {
            let segment = u16::from_be_bytes(take(record, record_type)?);
            record.address_offset = u32::from(segment) * 16;
            *address = record.address_offset;
            debug!("Segment address offset {:#010X}", record.address_offset);
        }
        RecordType::ExtendedLinearAddress => {
            let upper = u16::from_be_bytes(take(record, record_type)?);
            record.address_offset = u32::from(upper) << 16;
            *address = record.address_offset;
            debug!("Linear address offset {:#010X}", record.address_offset);
        }
        RecordType::StartSegmentAddress => {
            #[repr(C, packed)]
            #[derive(FromBytes)]
            struct SegmentStart {
                cs: [u8; 2],
                ip: [u8; 2],
            }

            let r: [u8; 4] = take(record, record_type)?;
            let SegmentStart { cs, ip } = zerocopy::transmute!(r);

            start_address = Some(StartAddress::Segment {
                cs: u16::from_be_bytes(cs),
                ip: u16::from_be_bytes(ip),
            });
        }
        RecordType::StartLinearAddress => {
            let eip = u32::from_be_bytes(take(record, record_type)?);
            start_address = Some(StartAddress::Linear(eip));
        }
    }

    if let Some(start_address) = start_address {
        debug!("Start address {start_address:?}");
    }

    // Only data records keep their payload for the caller.
    if record_type != RecordType::Data {
        record.clear_data();
    }

    Ok(Completed {
        record_type,
        start_address,
    })
}

/// Dequeue the fixed-size payload of an address record.
fn take<const N: usize>(
    record: &mut Record,
    record_type: RecordType,
) -> Result<[u8; N], ErrorKind> {
    let found = record.byte_count;
    record.take().ok_or(ErrorKind::ByteCount {
        record_type,
        expected: N as u8,
        found,
    })
}
