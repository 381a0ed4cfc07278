#![cfg(feature = "std")]

use std::path::Path;

use csv::ReaderBuilder;
use ihex_stream::{
    avec::{HexReader, Image},
    sans::line::StartAddress,
};

#[test]
fn decode_slice_linear() {
    const PATH: &str = "fixtures/linear.hex";
    let data = std::fs::read(PATH).unwrap();
    let mut validator = Validator::new(PATH);
    ihex_stream::avec::decode_slice(&data, &mut validator).unwrap();
    validator.finish(Some(StartAddress::Linear(0x0800_0131)));
}

#[test]
fn decode_slice_segment() {
    const PATH: &str = "fixtures/segment.hex";
    let data = std::fs::read(PATH).unwrap();
    let mut validator = Validator::new(PATH);
    ihex_stream::avec::decode_slice(&data, &mut validator).unwrap();
    validator.finish(Some(StartAddress::Segment { cs: 0xF000, ip: 0 }));
}

#[test]
fn decode_reader_linear() {
    const PATH: &str = "fixtures/linear.hex";
    let mut file = std::fs::File::open(PATH).unwrap();
    let mut validator = Validator::new(PATH);
    ihex_stream::avec::decode_reader(&mut file, &mut validator).unwrap();
    validator.finish(Some(StartAddress::Linear(0x0800_0131)));
}

#[test]
fn decode_reader_segment() {
    const PATH: &str = "fixtures/segment.hex";
    let mut file = std::fs::File::open(PATH).unwrap();
    let mut validator = Validator::new(PATH);
    ihex_stream::avec::decode_reader(&mut file, &mut validator).unwrap();
    validator.finish(Some(StartAddress::Segment { cs: 0xF000, ip: 0 }));
}

#[test]
fn read_in_chunks_segment() {
    const PATH: &str = "fixtures/segment.hex";
    let expected = Validator::new(PATH).expected;

    // Chunks smaller than, equal to, and larger than a record.
    for size in [1, 7, 32, 255, 1024] {
        let data = std::fs::read(PATH).unwrap();
        let mut reader = HexReader::from_slice(&data);
        let mut buf = vec![0; size];
        let mut out = Vec::new();

        loop {
            let n = reader.read(&mut buf).unwrap();
            if n == 0 {
                break;
            }
            out.extend_from_slice(&buf[..n]);
        }

        let values: Vec<u8> = expected.iter().map(|(_, v)| *v).collect();
        assert_eq!(out, values, "chunk size {size}");
        assert!(reader.end_of_stream());
    }
}

/// Checks published bytes against an `address,value` listing.
struct Validator {
    expected: Vec<(u32, u8)>,
    next: usize,
    start_address: Option<StartAddress>,
}

impl Validator {
    fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().with_extension("csv");

        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .from_path(path)
            .unwrap();

        let expected = reader
            .records()
            .map(|r| {
                let r = r.unwrap();
                (
                    u32::from_str_radix(&r[0], 16).unwrap(),
                    u8::from_str_radix(&r[1], 16).unwrap(),
                )
            })
            .collect();

        Self {
            expected,
            next: 0,
            start_address: None,
        }
    }

    fn finish(self, start_address: Option<StartAddress>) {
        assert_eq!(self.next, self.expected.len());
        assert_eq!(self.start_address, start_address);
    }
}

impl Image for Validator {
    fn add_byte(&mut self, address: u32, value: u8) {
        assert_eq!(self.expected[self.next], (address, value), "byte {}", self.next);
        self.next += 1;
    }

    fn add_start_address(&mut self, start_address: StartAddress) {
        self.start_address = Some(start_address);
    }
}
