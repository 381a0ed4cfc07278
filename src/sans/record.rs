//! Accumulation of the fields of a single record.

use super::check::{checksum, compute_sum};

/// The kind of a record, as given by its record type byte.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordType {
    Data = 0x00,
    EndOfFile = 0x01,
    ExtendedSegmentAddress = 0x02,
    StartSegmentAddress = 0x03,
    ExtendedLinearAddress = 0x04,
    StartLinearAddress = 0x05,
}

impl RecordType {
    /// Look up a record type from its byte value.
    pub fn from_byte(r: u8) -> Option<Self> {
        Some(match r {
            0x00 => Self::Data,
            0x01 => Self::EndOfFile,
            0x02 => Self::ExtendedSegmentAddress,
            0x03 => Self::StartSegmentAddress,
            0x04 => Self::ExtendedLinearAddress,
            0x05 => Self::StartLinearAddress,
            _ => return None,
        })
    }

    /// The byte count this record type requires, if fixed.
    pub fn byte_count(self) -> Option<u8> {
        match self {
            Self::Data => None,
            Self::EndOfFile => Some(0),
            Self::ExtendedSegmentAddress | Self::ExtendedLinearAddress => Some(2),
            Self::StartSegmentAddress | Self::StartLinearAddress => Some(4),
        }
    }
}

/// Longest payload a record can declare.
pub const MAX_DATA: usize = u8::MAX as usize;

/// Scratch state for the line being decoded.
///
/// The record is reset at every start code. Payload bytes are queued as they
/// arrive and dequeued in the same order. Between lines, the queue may still
/// hold payload not yet handed to a caller, but it is always empty by the time
/// the next start code is accepted.
#[derive(Debug, Clone)]
pub struct Record {
    pub byte_count: u8,
    /// Whether the checksum of the current line has been validated. Also set
    /// while no line is in progress.
    pub line_completed: bool,
    /// Base address established by the most recent extended address record.
    pub address_offset: u32,
    sum: u8,
    data: [u8; MAX_DATA],
    head: usize,
    tail: usize,
}

impl Default for Record {
    fn default() -> Self {
        Self {
            byte_count: 0,
            line_completed: true,
            address_offset: 0,
            sum: 0,
            data: [0; MAX_DATA],
            head: 0,
            tail: 0,
        }
    }
}

impl Record {
    /// Clear the per-line fields. The address offset persists.
    pub fn reset_line(&mut self) {
        self.byte_count = 0;
        self.line_completed = true;
        self.sum = 0;
        self.head = 0;
        self.tail = 0;
    }

    /// Add a byte to the running checksum.
    pub fn add_to_crc(&mut self, b: u8) {
        self.sum = compute_sum(self.sum, &[b]);
    }

    /// Queue a payload byte, adding it to the running checksum.
    ///
    /// Bytes beyond [`MAX_DATA`] are only added to the checksum; a record
    /// cannot declare more.
    pub fn add_byte(&mut self, b: u8) {
        if let Some(slot) = self.data.get_mut(self.tail) {
            *slot = b;
            self.tail += 1;
        }
        self.add_to_crc(b);
    }

    /// The checksum byte expected to close the bytes read so far.
    pub fn running_checksum(&self) -> u8 {
        checksum(self.sum)
    }

    /// Number of queued payload bytes.
    pub fn len(&self) -> usize {
        self.tail - self.head
    }

    pub fn is_empty(&self) -> bool {
        self.head == self.tail
    }

    /// Dequeue up to `buf.len()` payload bytes into `buf`, returning how many
    /// were written.
    pub fn drain_into(&mut self, buf: &mut [u8]) -> usize {
        let n = buf.len().min(self.len());
        buf[..n].copy_from_slice(&self.data[self.head..self.head + n]);
        self.head += n;
        n
    }

    /// Dequeue an exact number of payload bytes.
    pub fn take<const N: usize>(&mut self) -> Option<[u8; N]> {
        let bytes: [u8; N] = self.data[self.head..self.tail].get(..N)?.try_into().ok()?;
        self.head += N;
        Some(bytes)
    }

    /// Discard all queued payload bytes.
    pub fn clear_data(&mut self) {
        self.head = 0;
        self.tail = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_keeps_address_offset() {
        let mut record = Record::default();
        record.address_offset = 0x1000;
        record.byte_count = 2;
        record.add_byte(0xAA);
        record.line_completed = false;

        record.reset_line();

        assert_eq!(record.address_offset, 0x1000);
        assert_eq!(record.byte_count, 0);
        assert!(record.line_completed);
        assert!(record.is_empty());
        assert_eq!(record.running_checksum(), 0);
    }

    #[test]
    fn running_checksum_is_twos_complement() {
        let mut record = Record::default();
        for b in [0x02, 0x00, 0x00, 0x04] {
            record.add_to_crc(b);
        }
        record.add_byte(0xFF);
        record.add_byte(0xFF);

        assert_eq!(record.running_checksum(), 0xFC);
    }

    #[test]
    fn queue_preserves_order() {
        let mut record = Record::default();
        for b in 1..=5 {
            record.add_byte(b);
        }

        assert_eq!(record.take::<2>(), Some([1, 2]));
        assert_eq!(record.take::<4>(), None);

        let mut buf = [0; 8];
        assert_eq!(record.drain_into(&mut buf), 3);
        assert_eq!(buf[..3], [3, 4, 5]);
        assert!(record.is_empty());
    }

    #[test]
    fn full_record_fits() {
        let mut record = Record::default();
        for b in 0..=254 {
            record.add_byte(b);
        }

        assert_eq!(record.len(), MAX_DATA);
    }

    #[test]
    fn record_types() {
        assert_eq!(RecordType::from_byte(4), Some(RecordType::ExtendedLinearAddress));
        assert_eq!(RecordType::from_byte(6), None);
        assert_eq!(RecordType::EndOfFile.byte_count(), Some(0));
        assert_eq!(RecordType::Data.byte_count(), None);
    }
}
