/// Errors that can happen while decoding or encoding a PNG.
///
/// Most of these are fatal: parsing, unfiltering, and normalization all abort
/// on the first error and surface it to the caller. The one exception is an
/// inflate error observed after the expected plane size has already been
/// produced, which [`decode`](crate::decode) quietly ignores (some encoders
/// leave trailing junk after the last deflate block).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum PngError {
  /// The first 8 bytes of the input were not the PNG magic number.
  InvalidSignature,
  /// A chunk type byte was outside `A-Za-z`.
  InvalidChunkType,
  /// A critical chunk type this decoder does not recognize.
  UnsupportedCritical,
  /// A chunk appeared somewhere it isn't allowed (`IHDR` not first, `tRNS`
  /// before `PLTE` for a palette image, `IDAT` before the header, and so on).
  ChunkOrder,
  /// `IHDR` declared an unsupported depth, color type, compression method,
  /// filter method, or interlace method, or zero width/height.
  BadIhdr,
  /// A chunk's stored CRC did not match the CRC computed over its bytes.
  CrcError,
  /// The input ended in the middle of the signature, a chunk header, a
  /// chunk body, a chunk CRC, or a scanline.
  Truncated,
  /// Bytes remained in the input after `IEND` on the non-interlaced
  /// expected-size decode path.
  ExtraData,
  /// A scanline's filter-type byte was not in `0..=4`.
  BadFilterType,
  /// A palette index sample referenced an entry past the end of the palette.
  PaletteIndex,
  /// The deflate collaborator failed to produce the requested bytes.
  DecompressionFailed,
  /// `EncodeOptions` asked for a color type, bit depth, or gamma value this
  /// encoder does not support.
  UnsupportedOption,
}

impl PngError {
  /// Whether this error should halt all further processing of the stream.
  ///
  /// A handful of chunk-level errors (unknown ancillary chunk, for instance)
  /// aren't represented as [`PngError`] at all — they're simply skipped by
  /// the parser — so every variant reaching this point is already chunk- or
  /// stream-fatal. This mostly exists to let callers triage which errors are
  /// worth a detailed report versus a generic "could not read image".
  #[inline]
  #[must_use]
  pub const fn is_critical(self) -> bool {
    use PngError::*;
    matches!(self, InvalidSignature | BadIhdr | ChunkOrder | UnsupportedCritical)
  }
}
