//! Raw chunk framing: length, type, data, CRC — the layer below any
//! understanding of what a chunk's bytes actually mean.

use crate::crc::chunk_crc;
use crate::{PngError, PngResult};

/// The eight magic bytes every PNG stream must begin with.
pub const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1A, b'\n'];

/// Chunk type tags this crate understands the meaning of.
#[allow(non_upper_case_globals)]
pub mod tag {
  pub const IHDR: [u8; 4] = *b"IHDR";
  pub const PLTE: [u8; 4] = *b"PLTE";
  pub const IDAT: [u8; 4] = *b"IDAT";
  pub const IEND: [u8; 4] = *b"IEND";
  pub const tRNS: [u8; 4] = *b"tRNS";
  pub const gAMA: [u8; 4] = *b"gAMA";
}

/// Whether a chunk type's first byte marks it critical (decoders must
/// understand it) rather than ancillary (safe to skip if unrecognized).
///
/// This is bit 5 (0x20, lowercase-vs-uppercase) of the type's first byte, per
/// the PNG chunk naming convention.
#[inline]
#[must_use]
pub const fn is_critical(chunk_type: [u8; 4]) -> bool {
  chunk_type[0] & 0x20 == 0
}

/// One chunk's framing, already CRC-verified: a type tag and its data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawChunk<'b> {
  pub chunk_type: [u8; 4],
  pub data: &'b [u8],
}

/// Walks a byte slice (the PNG signature already stripped) yielding one
/// [`RawChunk`] at a time, verifying each chunk's CRC as it goes.
///
/// Yields `Err` and then stops once the input runs out mid-chunk or a CRC
/// fails to match; a well-formed stream never sees those variants.
#[derive(Debug, Clone)]
pub struct RawChunkIter<'b> {
  rest: &'b [u8],
  done: bool,
}

impl<'b> RawChunkIter<'b> {
  /// Builds an iterator over the chunk stream that follows the PNG
  /// signature. Does not itself check the signature; use [`crate::decode`]
  /// or check it yourself first.
  #[inline]
  #[must_use]
  pub const fn new(bytes_after_signature: &'b [u8]) -> Self {
    Self { rest: bytes_after_signature, done: false }
  }

  /// Bytes not yet consumed: either everything after `IEND` (trailing
  /// garbage the iterator stopped short of reading), or the remainder of an
  /// in-progress chunk when iteration stopped on an error.
  #[inline]
  #[must_use]
  pub const fn remaining(&self) -> &'b [u8] {
    self.rest
  }
}

impl<'b> Iterator for RawChunkIter<'b> {
  type Item = PngResult<RawChunk<'b>>;

  fn next(&mut self) -> Option<Self::Item> {
    if self.done {
      return None;
    }
    let mut fail = |e: PngError| {
      self.done = true;
      Some(Err(e))
    };

    if self.rest.len() < 4 {
      return fail(PngError::Truncated);
    }
    let (len_bytes, rest) = self.rest.split_at(4);
    let length = u32::from_be_bytes(len_bytes.try_into().unwrap());

    if rest.len() < 4 {
      return fail(PngError::Truncated);
    }
    let (type_bytes, rest) = rest.split_at(4);
    let chunk_type: [u8; 4] = type_bytes.try_into().unwrap();
    if !chunk_type.iter().all(u8::is_ascii_alphabetic) {
      return fail(PngError::InvalidChunkType);
    }

    let length = length as usize;
    if rest.len() < length {
      return fail(PngError::Truncated);
    }
    let (data, rest) = rest.split_at(length);

    if rest.len() < 4 {
      return fail(PngError::Truncated);
    }
    let (crc_bytes, rest) = rest.split_at(4);
    let declared_crc = u32::from_be_bytes(crc_bytes.try_into().unwrap());
    if chunk_crc(chunk_type, data) != declared_crc {
      return fail(PngError::CrcError);
    }

    self.rest = rest;
    if chunk_type == tag::IEND {
      self.done = true;
    }
    Some(Ok(RawChunk { chunk_type, data }))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use alloc::vec::Vec;
  use crate::crc::crc32;

  fn make_chunk(chunk_type: [u8; 4], data: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend((data.len() as u32).to_be_bytes());
    out.extend(chunk_type);
    out.extend(data);
    let mut crc_input = Vec::new();
    crc_input.extend(chunk_type);
    crc_input.extend(data);
    out.extend(crc32(&crc_input).to_be_bytes());
    out
  }

  #[test]
  fn iterates_ihdr_then_iend() {
    let mut bytes = make_chunk(tag::IHDR, &[1, 2, 3]);
    bytes.extend(make_chunk(tag::IEND, &[]));
    let mut it = RawChunkIter::new(&bytes);
    let first = it.next().unwrap().unwrap();
    assert_eq!(first.chunk_type, tag::IHDR);
    assert_eq!(first.data, &[1, 2, 3]);
    let second = it.next().unwrap().unwrap();
    assert_eq!(second.chunk_type, tag::IEND);
    assert!(it.next().is_none());
  }

  #[test]
  fn stops_after_truncated_chunk() {
    let bytes = [0, 0, 0, 10, b'I', b'D', b'A', b'T', 1, 2, 3];
    let mut it = RawChunkIter::new(&bytes);
    assert_eq!(it.next(), Some(Err(PngError::Truncated)));
    assert!(it.next().is_none());
  }

  #[test]
  fn stops_after_crc_mismatch() {
    let mut bytes = make_chunk(tag::IHDR, &[1, 2, 3]);
    let last = bytes.len() - 1;
    bytes[last] ^= 0xFF;
    let mut it = RawChunkIter::new(&bytes);
    assert_eq!(it.next(), Some(Err(PngError::CrcError)));
    assert!(it.next().is_none());
  }

  #[test]
  fn rejects_non_alphabetic_chunk_type() {
    let bytes = make_chunk([b'I', b'1', b'D', b'T'], &[]);
    let mut it = RawChunkIter::new(&bytes);
    assert_eq!(it.next(), Some(Err(PngError::InvalidChunkType)));
  }

  #[test]
  fn critical_bit_matches_case() {
    assert!(is_critical(tag::IHDR));
    assert!(is_critical(tag::PLTE));
    assert!(!is_critical(tag::tRNS));
    assert!(!is_critical(tag::gAMA));
  }
}
