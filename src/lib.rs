#![cfg_attr(not(feature = "trace"), no_std)]
#![forbid(unsafe_code)]

//! A PNG decoder and encoder.
//!
//! ## Decoding
//! [`decode`] takes a complete PNG byte slice and returns a [`Raster`]: a
//! width, a height, and an 8-bit RGBA buffer. [`StreamingDecoder`] does the
//! same work but accepts the input in arbitrary-sized pieces, for callers
//! that receive PNG bytes off a socket or file handle a chunk at a time.
//!
//! ## Encoding
//! [`encode`] takes a [`Raster`] and an [`EncodeOptions`] and produces a
//! fresh, non-interlaced, 8-bit-depth PNG byte stream.
//!
//! ## Scope
//! This crate covers PNG-1.2: grayscale, RGB, palette, grayscale+alpha, and
//! RGBA color types, bit depths 1/2/4/8/16, Adam7 interlacing, the five
//! scanline filters, `tRNS` simple transparency, and `gAMA`. It does not
//! cover APNG, ICC profiles, text chunks, or 16-bit encoder output.

extern crate alloc;

#[cfg(feature = "trace")]
extern crate std;

/// Prints a trace message when the `trace` feature is enabled; a silent no-op
/// otherwise. Used along the parse/inflate/filter pipeline to narrate what
/// the decoder is doing without paying for it in a normal build.
#[macro_export]
macro_rules! trace {
  ($($arg:tt)*) => {
    #[cfg(feature = "trace")] {
      ::std::print!("{file}:{line}> ", file = file!(), line = line!());
      ::std::println!($($arg)*);
    }
  }
}

mod error;
pub use error::*;

mod crc;
pub use crc::{crc32, Crc32};

mod paeth;
pub use paeth::paeth_predictor;

mod adam7;
pub use adam7::{interlaced_pos_to_full_pos, reduced_image_dimensions, Adam7Pass, ADAM7_PASSES};

mod bits;

mod filter;
pub use filter::FilterType;

mod chunk;
pub use chunk::{RawChunk, RawChunkIter, PNG_SIGNATURE};

mod metadata;
pub use metadata::{ColorTypeFlags, Metadata, Palette, PngColorType, TransColor, GAMMA_SCALE};

mod bitmap;

mod normalize;

mod parser;
pub use parser::decode;

mod streaming;
pub use streaming::StreamingDecoder;

mod raster;
pub use raster::{EncodeOptions, FilterSelection, Raster};

mod encode;
pub use encode::encode;

/// The result type returned by every fallible operation in this crate.
pub type PngResult<T> = Result<T, PngError>;

/// Re-exports of the crate's main entry points, for `use pngcodec::prelude::*;`.
pub mod prelude {
  pub use crate::{decode, encode, EncodeOptions, PngError, PngResult, Raster, StreamingDecoder};
}
