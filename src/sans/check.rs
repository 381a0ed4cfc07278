//! Helper for computing record checksums.

/// Accumulate a slice of bytes into a checksum sum.
pub fn compute_sum(init: u8, r: &[u8]) -> u8 {
    r.iter().fold(init, |acc, b| acc.wrapping_add(*b))
}

/// The checksum byte expected to follow bytes with the given sum.
///
/// This is the two's complement of the sum, so that adding it to the sum
/// yields zero.
pub fn checksum(sum: u8) -> u8 {
    (!sum).wrapping_add(1)
}
