//! Parsed, validated header-level state: `IHDR`, `PLTE`, `tRNS`, and `gAMA`
//! folded into one struct, plus the small helper types they're built from.

use alloc::vec::Vec;
use crate::PngError;

/// The divisor a `gAMA` chunk's stored 32-bit integer is scaled by to recover
/// the real gamma value (and the multiplier used to re-encode one).
pub const GAMMA_SCALE: f64 = 100_000.0;

/// The five PNG color types, and the channel layout each implies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum PngColorType {
  /// Grayscale.
  Gray = 0,
  /// Red, green, blue.
  Rgb = 2,
  /// Index into [`Palette`].
  Palette = 3,
  /// Grayscale plus alpha.
  GrayAlpha = 4,
  /// Red, green, blue, alpha.
  Rgba = 6,
}

impl PngColorType {
  /// How many samples make up one pixel in this color type.
  #[inline]
  #[must_use]
  pub const fn channel_count(self) -> usize {
    match self {
      Self::Gray | Self::Palette => 1,
      Self::Rgb => 3,
      Self::GrayAlpha => 2,
      Self::Rgba => 4,
    }
  }

  /// Whether this color type carries its own alpha channel (as opposed to
  /// simple transparency via `tRNS`).
  #[inline]
  #[must_use]
  pub const fn has_alpha_channel(self) -> bool {
    matches!(self, Self::GrayAlpha | Self::Rgba)
  }

  /// The bit depths `IHDR` is allowed to declare for this color type.
  #[inline]
  #[must_use]
  pub const fn allowed_bit_depths(self) -> &'static [u8] {
    match self {
      Self::Gray => &[1, 2, 4, 8, 16],
      Self::Palette => &[1, 2, 4, 8],
      Self::Rgb | Self::GrayAlpha | Self::Rgba => &[8, 16],
    }
  }
}

impl TryFrom<u8> for PngColorType {
  type Error = PngError;
  #[inline]
  fn try_from(value: u8) -> Result<Self, Self::Error> {
    Ok(match value {
      0 => Self::Gray,
      2 => Self::Rgb,
      3 => Self::Palette,
      4 => Self::GrayAlpha,
      6 => Self::Rgba,
      _ => return Err(PngError::BadIhdr),
    })
  }
}

/// The three bits packed into `IHDR`'s color type byte, decomposed.
///
/// `PngColorType::try_from` is the normal way to get a color type; this
/// exists for callers (and the chunk validator) that want to reason about
/// the individual bits directly, the way the PNG spec's own chunk table
/// describes them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorTypeFlags {
  pub palette_used: bool,
  pub color_used: bool,
  pub alpha_used: bool,
}

impl From<u8> for ColorTypeFlags {
  #[inline]
  fn from(value: u8) -> Self {
    Self { palette_used: value & 0b001 != 0, color_used: value & 0b010 != 0, alpha_used: value & 0b100 != 0 }
  }
}

impl From<PngColorType> for ColorTypeFlags {
  #[inline]
  fn from(value: PngColorType) -> Self {
    Self::from(value as u8)
  }
}

/// The palette from a `PLTE` chunk, expanded to RGBA.
///
/// Entries start fully opaque (alpha 255); a `tRNS` chunk for a palette image
/// overwrites the alpha of however many leading entries it covers.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Palette(pub Vec<[u8; 4]>);

impl Palette {
  #[inline]
  #[must_use]
  pub fn entries(&self) -> &[[u8; 4]] {
    &self.0
  }

  #[inline]
  #[must_use]
  pub fn len(&self) -> usize {
    self.0.len()
  }

  #[inline]
  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }
}

/// The simple-transparency color from a `tRNS` chunk, for color types that
/// don't carry their own alpha channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransColor {
  /// For [`PngColorType::Gray`]: the gray sample value, at the image's bit
  /// depth, that should be treated as fully transparent.
  Gray(u16),
  /// For [`PngColorType::Rgb`]: the `(r, g, b)` sample value, at the image's
  /// bit depth, that should be treated as fully transparent.
  Rgb(u16, u16, u16),
}

/// Everything decoding needs to know about an image's shape, parsed out of
/// `IHDR` and whichever of `PLTE`/`tRNS`/`gAMA` were present.
#[derive(Debug, Clone, PartialEq)]
pub struct Metadata {
  pub width: u32,
  pub height: u32,
  pub bit_depth: u8,
  pub color_type: PngColorType,
  pub is_interlaced: bool,
  pub palette: Option<Palette>,
  pub trans_color: Option<TransColor>,
  /// The `gAMA` chunk's value, as `gamma / 100000` (a PNG gamma chunk stores
  /// an integer that's 100000 times the real gamma value).
  pub gamma: Option<f64>,
}

impl Metadata {
  /// Parses an `IHDR` chunk's 13-byte body.
  pub fn from_ihdr_body(data: &[u8]) -> Result<Self, PngError> {
    let [w0, w1, w2, w3, h0, h1, h2, h3, bit_depth, color_type, compression_method, filter_method, interlace_method] =
      *data
    else {
      return Err(PngError::BadIhdr);
    };
    let width = u32::from_be_bytes([w0, w1, w2, w3]);
    let height = u32::from_be_bytes([h0, h1, h2, h3]);
    if width == 0 || height == 0 || compression_method != 0 || filter_method != 0 {
      return Err(PngError::BadIhdr);
    }
    let color_type = PngColorType::try_from(color_type)?;
    if !color_type.allowed_bit_depths().contains(&bit_depth) {
      return Err(PngError::BadIhdr);
    }
    let is_interlaced = match interlace_method {
      0 => false,
      1 => true,
      _ => return Err(PngError::BadIhdr),
    };
    Ok(Self {
      width,
      height,
      bit_depth,
      color_type,
      is_interlaced,
      palette: None,
      trans_color: None,
      gamma: None,
    })
  }

  /// Bits per pixel at this image's color type and bit depth.
  #[inline]
  #[must_use]
  pub const fn bits_per_pixel(&self) -> usize {
    (self.bit_depth as usize) * self.color_type.channel_count()
  }

  /// Bytes in one scanline's pixel data (the filter-type byte is not
  /// included), for a reduced image of the given width.
  #[inline]
  #[must_use]
  pub const fn bytes_per_scanline(&self, width: u32) -> usize {
    (self.bits_per_pixel() * (width as usize) + 7) / 8
  }

  /// Bytes in one filtered scanline (the filter-type byte plus pixel data),
  /// for a reduced image of the given width.
  #[inline]
  #[must_use]
  pub const fn bytes_per_filterline(&self, width: u32) -> usize {
    1 + self.bytes_per_scanline(width)
  }

  /// The byte distance back to sample `a`/`c` when unfiltering or filtering:
  /// one full pixel's worth of bytes, or 1 for sub-byte depths.
  #[inline]
  #[must_use]
  pub const fn filter_bpp(&self) -> usize {
    let bytes = self.bits_per_pixel() / 8;
    if bytes == 0 {
      1
    } else {
      bytes
    }
  }
}
