//! Binary codec for filter blocks and cascade files.
//!
//! Block layout (big-endian, 12-byte header):
//!   [capacity_bits u32][hash_count u32][inserted u32]
//!   [ceil(capacity_bits/8) bytes of packed bits]
//!
//! A cascade file is the concatenation of its generations' blocks, oldest
//! first, with no outer framing: each block is self-describing, so decode
//! walks a cursor until end-of-file. Headers that imply a read past the end
//! of the buffer, or declare zero geometry, fail with `Error::Corrupt`.

use byteorder::{BigEndian, ByteOrder};

use crate::consts::FILTER_HDR_SIZE;
use crate::error::{Error, Result};
use crate::filter::{byte_len_for_bits, BloomFilter};

/// Encode one filter as a single block.
pub fn encode_filter(f: &BloomFilter) -> Vec<u8> {
    let mut out = Vec::with_capacity(FILTER_HDR_SIZE + f.bit_bytes().len());
    append_block(&mut out, f);
    out
}

/// Decode exactly one filter block. Trailing bytes after the block are a
/// corruption error (a single-filter file holds one block and nothing else).
pub fn decode_filter(bytes: &[u8]) -> Result<BloomFilter> {
    let (filter, consumed) = decode_block_at(bytes, 0)?;
    if consumed != bytes.len() {
        return Err(Error::Corrupt(format!(
            "{} trailing bytes after filter block",
            bytes.len() - consumed
        )));
    }
    Ok(filter)
}

/// Encode a cascade's generations (oldest first) as concatenated blocks.
pub fn encode_cascade(generations: &[BloomFilter]) -> Vec<u8> {
    let total: usize = generations
        .iter()
        .map(|f| FILTER_HDR_SIZE + f.bit_bytes().len())
        .sum();
    let mut out = Vec::with_capacity(total);
    for f in generations {
        append_block(&mut out, f);
    }
    out
}

/// Decode concatenated blocks until end-of-file. An empty file is corrupt:
/// a cascade always has at least one generation.
pub fn decode_cascade(bytes: &[u8]) -> Result<Vec<BloomFilter>> {
    let mut generations = Vec::new();
    let mut offset = 0usize;
    while offset < bytes.len() {
        let (filter, consumed) = decode_block_at(bytes, offset)?;
        generations.push(filter);
        offset += consumed;
    }
    if generations.is_empty() {
        return Err(Error::Corrupt("cascade file contains no blocks".into()));
    }
    Ok(generations)
}

fn append_block(out: &mut Vec<u8>, f: &BloomFilter) {
    let mut hdr = [0u8; FILTER_HDR_SIZE];
    BigEndian::write_u32(&mut hdr[0..4], f.capacity_bits());
    BigEndian::write_u32(&mut hdr[4..8], f.hash_count());
    BigEndian::write_u32(&mut hdr[8..12], f.inserted());
    out.extend_from_slice(&hdr);
    out.extend_from_slice(f.bit_bytes());
}

/// Decode one block at `offset`; returns the filter and the bytes consumed
/// (header + buffer).
fn decode_block_at(bytes: &[u8], offset: usize) -> Result<(BloomFilter, usize)> {
    let remaining = bytes.len() - offset;
    if remaining < FILTER_HDR_SIZE {
        return Err(Error::Corrupt(format!(
            "truncated header at offset {}: {} bytes left, need {}",
            offset, remaining, FILTER_HDR_SIZE
        )));
    }
    let hdr = &bytes[offset..offset + FILTER_HDR_SIZE];
    let capacity_bits = BigEndian::read_u32(&hdr[0..4]);
    let hash_count = BigEndian::read_u32(&hdr[4..8]);
    let inserted = BigEndian::read_u32(&hdr[8..12]);

    if capacity_bits == 0 || hash_count == 0 {
        return Err(Error::Corrupt(format!(
            "zero geometry in header at offset {} (m={}, k={})",
            offset, capacity_bits, hash_count
        )));
    }

    let byte_len = byte_len_for_bits(capacity_bits);
    let body_start = offset + FILTER_HDR_SIZE;
    if byte_len > bytes.len() - body_start {
        return Err(Error::Corrupt(format!(
            "block at offset {} declares {} buffer bytes but only {} remain",
            offset,
            byte_len,
            bytes.len() - body_start
        )));
    }

    let bits = bytes[body_start..body_start + byte_len].to_vec();
    let filter = BloomFilter::from_parts(capacity_bits, hash_count, inserted, bits)?;
    Ok((filter, FILTER_HDR_SIZE + byte_len))
}
