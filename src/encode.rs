//! Encoding: converts a normalized RGBA [`Raster`] back into PNG bytes.
//!
//! Mirrors the decode pipeline in reverse (color conversion, then filtering,
//! then chunk/zlib framing) but only ever produces non-interlaced, 8-bit
//! output, per [`EncodeOptions`]'s documented scope.

use alloc::vec;
use alloc::vec::Vec;
use crate::bits::pack_samples;
use crate::chunk::{tag, PNG_SIGNATURE};
use crate::crc::chunk_crc;
use crate::filter::{filter_row, select_filter, FilterType};
use crate::metadata::PngColorType;
use crate::raster::{EncodeOptions, FilterSelection, Raster};
use crate::{PngError, PngResult};

/// Encodes `raster` into a fresh PNG byte stream per `options`.
pub fn encode(raster: &Raster, options: &EncodeOptions) -> PngResult<Vec<u8>> {
  validate_options(options)?;

  let mut out = Vec::new();
  out.extend(PNG_SIGNATURE);
  write_chunk(&mut out, tag::IHDR, &ihdr_body(raster, options));

  if let Some(gamma) = options.gamma {
    let stored = (gamma * crate::metadata::GAMMA_SCALE).floor() as u32;
    write_chunk(&mut out, tag::gAMA, &stored.to_be_bytes());
  }

  let raw = pack_rows(raster, options);
  let filtered = filter_rows(&raw, raster.height, options);
  let compressed = miniz_oxide::deflate::compress_to_vec_zlib(&filtered, 6);
  write_chunk(&mut out, tag::IDAT, &compressed);

  write_chunk(&mut out, tag::IEND, &[]);
  Ok(out)
}

fn validate_options(options: &EncodeOptions) -> PngResult<()> {
  if options.bit_depth != 8 {
    return Err(PngError::UnsupportedOption);
  }
  if options.output_color_type == PngColorType::Palette {
    return Err(PngError::UnsupportedOption);
  }
  if let Some(gamma) = options.gamma {
    if !gamma.is_finite() || gamma < 0.0 {
      return Err(PngError::UnsupportedOption);
    }
  }
  Ok(())
}

fn ihdr_body(raster: &Raster, options: &EncodeOptions) -> [u8; 13] {
  let mut body = [0_u8; 13];
  body[0..4].copy_from_slice(&raster.width.to_be_bytes());
  body[4..8].copy_from_slice(&raster.height.to_be_bytes());
  body[8] = options.bit_depth;
  body[9] = options.output_color_type as u8;
  body[10] = 0;
  body[11] = 0;
  body[12] = 0;
  body
}

/// Converts the raster's RGBA pixels to `output_color_type` samples and
/// packs each row at `bit_depth`, without any scanline filtering yet.
///
/// When `output_color_type` carries no alpha channel, each pixel is
/// premultiplied against `background_color` and the result discarded (an
/// identity operation for the fully-opaque synthetic alpha a non-alpha
/// source produces, and a real blend for a source with partial alpha).
fn pack_rows(raster: &Raster, options: &EncodeOptions) -> Vec<u8> {
  let channels = options.output_color_type.channel_count();
  let mut out = Vec::with_capacity(raster.height as usize * (1 + channels * raster.width as usize));

  for y in 0..raster.height {
    let mut row_samples = Vec::with_capacity(raster.width as usize * channels);
    for x in 0..raster.width {
      let [r, g, b, a] = raster.pixel(x, y);
      let samples = convert_pixel(options.output_color_type, [r, g, b, a], options.background_color);
      row_samples.extend(samples);
    }
    pack_samples(options.bit_depth, raster.width, channels, &row_samples, &mut out);
  }
  out
}

fn convert_pixel(color_type: PngColorType, [r, g, b, a]: [u8; 4], background: [u8; 3]) -> Vec<u16> {
  let blend = |src: u8, bg: u8| -> u8 {
    let src = u32::from(src);
    let bg = u32::from(bg);
    let a = u32::from(a);
    ((src * a + bg * (255 - a) + 127) / 255) as u8
  };

  match color_type {
    PngColorType::Gray => {
      let blended = [blend(r, background[0]), blend(g, background[1]), blend(b, background[2])];
      vec![luminance(blended[0], blended[1], blended[2])]
    }
    PngColorType::Rgb => {
      vec![
        u16::from(blend(r, background[0])),
        u16::from(blend(g, background[1])),
        u16::from(blend(b, background[2])),
      ]
    }
    PngColorType::GrayAlpha => {
      vec![luminance(r, g, b), u16::from(a)]
    }
    PngColorType::Rgba => vec![u16::from(r), u16::from(g), u16::from(b), u16::from(a)],
    PngColorType::Palette => unreachable!("validate_options rejects Palette output"),
  }
}

/// `round((r + g + b) / 3)`, rounding half up.
#[inline]
fn luminance(r: u8, g: u8, b: u8) -> u16 {
  let sum = u32::from(r) + u32::from(g) + u32::from(b);
  (((2 * sum) + 3) / 6) as u16
}

fn filter_rows(raw: &[u8], height: u32, options: &EncodeOptions) -> Vec<u8> {
  if height == 0 || raw.is_empty() {
    return Vec::new();
  }
  let row_len = raw.len() / height as usize;
  let bpp = {
    let channels = options.output_color_type.channel_count();
    let bits = channels * options.bit_depth as usize;
    core::cmp::max(1, bits / 8)
  };

  let mut out = Vec::with_capacity(raw.len() + height as usize);
  let mut prev: Option<&[u8]> = None;
  for row in raw.chunks_exact(row_len) {
    let (filter_type, filtered) = match options.filter_selection {
      FilterSelection::Adaptive => select_filter(bpp, row, prev),
      FilterSelection::Fixed(filter_type) => {
        let mut filtered = Vec::with_capacity(row_len);
        filter_row(filter_type, bpp, row, prev, &mut filtered);
        (filter_type, filtered)
      }
    };
    out.push(filter_type as u8);
    out.extend(filtered);
    prev = Some(row);
  }
  out
}

fn write_chunk(out: &mut Vec<u8>, chunk_type: [u8; 4], data: &[u8]) {
  out.extend((data.len() as u32).to_be_bytes());
  out.extend(chunk_type);
  out.extend(data);
  out.extend(chunk_crc(chunk_type, data).to_be_bytes());
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn rejects_16_bit_depth() {
    let raster = Raster::new(1, 1, vec![0, 0, 0, 255], 0.0);
    let options = EncodeOptions { bit_depth: 16, ..EncodeOptions::default() };
    assert_eq!(encode(&raster, &options), Err(PngError::UnsupportedOption));
  }

  #[test]
  fn rejects_palette_output() {
    let raster = Raster::new(1, 1, vec![0, 0, 0, 255], 0.0);
    let options = EncodeOptions { output_color_type: PngColorType::Palette, ..EncodeOptions::default() };
    assert_eq!(encode(&raster, &options), Err(PngError::UnsupportedOption));
  }

  #[test]
  fn rejects_non_finite_gamma() {
    let raster = Raster::new(1, 1, vec![0, 0, 0, 255], 0.0);
    let options = EncodeOptions { gamma: Some(f64::NAN), ..EncodeOptions::default() };
    assert_eq!(encode(&raster, &options), Err(PngError::UnsupportedOption));
  }

  #[test]
  fn encode_then_decode_round_trips_a_checkerboard() {
    let mut buffer = Vec::new();
    for y in 0..10_u32 {
      for x in 0..10_u32 {
        let v: u8 = if (x ^ y) % 2 == 0 { 0xE5 } else { 0xFF };
        buffer.extend([v, v, v, 255]);
      }
    }
    let raster = Raster::new(10, 10, buffer, 0.0);
    let bytes = encode(&raster, &EncodeOptions::default()).unwrap();
    let decoded = crate::parser::decode(&bytes).unwrap();
    assert_eq!(decoded.width, 10);
    assert_eq!(decoded.height, 10);
    assert_eq!(decoded.buffer, raster.buffer);
  }

  #[test]
  fn rgb_output_drops_alpha_channel() {
    let raster = Raster::new(1, 1, vec![12, 34, 56, 255], 0.0);
    let options = EncodeOptions { output_color_type: PngColorType::Rgb, ..EncodeOptions::default() };
    let bytes = encode(&raster, &options).unwrap();
    let decoded = crate::parser::decode(&bytes).unwrap();
    assert_eq!(decoded.buffer, vec![12, 34, 56, 255]);
  }
}
