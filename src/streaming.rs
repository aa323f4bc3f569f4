//! A decoder that accepts PNG bytes in arbitrary-sized pieces instead of
//! requiring the whole stream up front.
//!
//! This crate's chunk and inflate steps are both most naturally expressed
//! over a complete byte slice (the chunk iterator needs to see a whole
//! chunk's length before it can yield it; `miniz_oxide`'s one-shot inflate
//! wants the whole compressed stream). Rather than reimplement either as a
//! byte-demand state machine, [`StreamingDecoder`] simply buffers everything
//! it's given and defers to [`crate::decode`] once the caller signals the
//! stream is complete.

use alloc::vec::Vec;
use crate::raster::Raster;
use crate::PngResult;

/// Accumulates PNG bytes fed in over multiple [`write`](Self::write) calls,
/// producing a [`Raster`] once [`finish`](Self::finish) is called.
#[derive(Debug, Clone, Default)]
pub struct StreamingDecoder {
  buffer: Vec<u8>,
}

impl StreamingDecoder {
  /// Starts a new streaming decode with an empty buffer.
  #[inline]
  #[must_use]
  pub fn new() -> Self {
    Self { buffer: Vec::new() }
  }

  /// Appends the next piece of the PNG byte stream. Pieces may be any size
  /// and don't need to align with chunk or signature boundaries.
  #[inline]
  pub fn write(&mut self, bytes: &[u8]) {
    crate::trace!("buffered {} bytes ({} total)", bytes.len(), self.buffer.len() + bytes.len());
    self.buffer.extend_from_slice(bytes);
  }

  /// Signals that every byte of the stream has been given to
  /// [`write`](Self::write), and decodes the accumulated bytes.
  #[inline]
  pub fn finish(self) -> PngResult<Raster> {
    crate::trace!("finish> decoding {} buffered bytes", self.buffer.len());
    crate::parser::decode(&self.buffer)
  }
}
