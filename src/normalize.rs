//! The format normalizer: palette expansion, `tRNS` keying, and depth
//! rescale to 8 bits, turning a [`Plane`](crate::bitmap::Plane) into the
//! final [`Raster`].

use alloc::vec::Vec;
use crate::bitmap::Plane;
use crate::metadata::{Metadata, PngColorType, TransColor};
use crate::raster::Raster;
use crate::{PngError, PngResult};

/// Rescales one sample from `0..=max` to `0..=255`, matching libpng's
/// rounding convention (`round(sample * 255 / max)`).
#[inline]
fn rescale(sample: u16, max: u16) -> u8 {
  if max == 0 {
    0
  } else {
    let max = u32::from(max);
    (((u32::from(sample) * 255) + max / 2) / max) as u8
  }
}

/// Converts a decoded-but-unnormalized [`Plane`] into a canonical 8-bit RGBA
/// [`Raster`], consuming chunk-parsed palette and transparency information
/// from `meta`.
pub fn normalize(plane: Plane, meta: &Metadata) -> PngResult<Raster> {
  let pixel_count = plane.width as usize * plane.height as usize;
  let mut buffer = Vec::with_capacity(pixel_count * 4);

  if meta.color_type == PngColorType::Palette {
    let palette = meta.palette.as_ref().ok_or(PngError::ChunkOrder)?;
    for chunk in plane.samples.chunks_exact(4) {
      let index = chunk[0] as usize;
      let entry = palette.entries().get(index).ok_or(PngError::PaletteIndex)?;
      buffer.extend_from_slice(entry);
    }
    return Ok(Raster { width: plane.width, height: plane.height, buffer, gamma: meta.gamma.unwrap_or(0.0) });
  }

  let max = plane.max_sample;
  for chunk in plane.samples.chunks_exact(4) {
    let [r, g, b, a] = [chunk[0], chunk[1], chunk[2], chunk[3]];
    let is_transparent_key = match (meta.color_type, meta.trans_color) {
      (PngColorType::Gray, Some(TransColor::Gray(key))) => r == key,
      (PngColorType::Rgb, Some(TransColor::Rgb(kr, kg, kb))) => r == kr && g == kg && b == kb,
      _ => false,
    };
    if is_transparent_key {
      buffer.extend_from_slice(&[0, 0, 0, 0]);
    } else {
      buffer.extend_from_slice(&[rescale(r, max), rescale(g, max), rescale(b, max), rescale(a, max)]);
    }
  }

  Ok(Raster { width: plane.width, height: plane.height, buffer, gamma: meta.gamma.unwrap_or(0.0) })
}
