//! The chunk parser state machine and the one-shot [`decode`] entry point.
//!
//! Implements the ordering rules from the PNG spec: `IHDR` first, `PLTE`
//! before any `IDAT` and before a palette `tRNS`, `gAMA` before `PLTE` and
//! `IDAT`, unknown critical chunks are fatal, unknown ancillary chunks are
//! skipped (their CRC is still checked by [`RawChunkIter`]).

use alloc::vec::Vec;
use crate::bitmap::build_plane;
use crate::chunk::{is_critical, tag, RawChunkIter, PNG_SIGNATURE};
use crate::metadata::{Metadata, Palette, PngColorType, TransColor};
use crate::normalize::normalize;
use crate::raster::Raster;
use crate::{PngError, PngResult};

/// Decodes a complete PNG byte stream into a normalized RGBA [`Raster`].
pub fn decode(bytes: &[u8]) -> PngResult<Raster> {
  if bytes.len() < PNG_SIGNATURE.len() {
    return Err(PngError::Truncated);
  }
  if bytes[..PNG_SIGNATURE.len()] != PNG_SIGNATURE {
    return Err(PngError::InvalidSignature);
  }

  let mut meta: Option<Metadata> = None;
  let mut palette: Option<Palette> = None;
  let mut trans_color: Option<TransColor> = None;
  let mut gamma: Option<f64> = None;
  let mut compressed = Vec::new();
  let mut idat_started = false;
  let mut seen_iend = false;
  let mut first_chunk = true;

  let mut iter = RawChunkIter::new(&bytes[PNG_SIGNATURE.len()..]);
  while let Some(chunk) = iter.next() {
    let chunk = chunk?;
    crate::trace!(
      "chunk {:?} ({} bytes)",
      core::str::from_utf8(&chunk.chunk_type).unwrap_or("????"),
      chunk.data.len()
    );

    if first_chunk {
      if chunk.chunk_type != tag::IHDR {
        return Err(PngError::ChunkOrder);
      }
      first_chunk = false;
    }

    match chunk.chunk_type {
      tag::IHDR => {
        if meta.is_some() {
          return Err(PngError::ChunkOrder);
        }
        meta = Some(Metadata::from_ihdr_body(chunk.data)?);
      }
      tag::PLTE => {
        if meta.is_none() || palette.is_some() || idat_started {
          return Err(PngError::ChunkOrder);
        }
        if chunk.data.len() % 3 != 0 {
          return Err(PngError::ChunkOrder);
        }
        palette = Some(Palette(chunk.data.chunks_exact(3).map(|c| [c[0], c[1], c[2], 255]).collect()));
      }
      tag::tRNS => {
        let m = meta.as_ref().ok_or(PngError::ChunkOrder)?;
        if idat_started {
          return Err(PngError::ChunkOrder);
        }
        match m.color_type {
          PngColorType::Palette => {
            let pal = palette.as_mut().ok_or(PngError::ChunkOrder)?;
            if chunk.data.len() > pal.0.len() {
              return Err(PngError::ChunkOrder);
            }
            for (entry, &alpha) in pal.0.iter_mut().zip(chunk.data.iter()) {
              entry[3] = alpha;
            }
          }
          PngColorType::Gray => {
            if chunk.data.len() != 2 {
              return Err(PngError::ChunkOrder);
            }
            trans_color = Some(TransColor::Gray(u16::from_be_bytes([chunk.data[0], chunk.data[1]])));
          }
          PngColorType::Rgb => {
            if chunk.data.len() != 6 {
              return Err(PngError::ChunkOrder);
            }
            trans_color = Some(TransColor::Rgb(
              u16::from_be_bytes([chunk.data[0], chunk.data[1]]),
              u16::from_be_bytes([chunk.data[2], chunk.data[3]]),
              u16::from_be_bytes([chunk.data[4], chunk.data[5]]),
            ));
          }
          PngColorType::GrayAlpha | PngColorType::Rgba => {
            // these color types already carry alpha; a stray tRNS is ignored.
          }
        }
      }
      tag::gAMA => {
        if meta.is_none() || palette.is_some() || idat_started {
          return Err(PngError::ChunkOrder);
        }
        if chunk.data.len() != 4 {
          return Err(PngError::ChunkOrder);
        }
        let raw = u32::from_be_bytes(chunk.data.try_into().unwrap());
        gamma = Some(f64::from(raw) / crate::metadata::GAMMA_SCALE);
      }
      tag::IDAT => {
        if meta.is_none() {
          return Err(PngError::ChunkOrder);
        }
        idat_started = true;
        compressed.extend_from_slice(chunk.data);
      }
      tag::IEND => {
        seen_iend = true;
      }
      other => {
        if is_critical(other) {
          return Err(PngError::UnsupportedCritical);
        }
        // unknown ancillary chunk: already CRC-checked, body discarded.
      }
    }
  }

  let mut meta = meta.ok_or(PngError::Truncated)?;
  if !seen_iend {
    return Err(PngError::Truncated);
  }
  if meta.color_type == PngColorType::Palette && palette.is_none() {
    return Err(PngError::ChunkOrder);
  }
  if !meta.is_interlaced && !iter.remaining().is_empty() {
    return Err(PngError::ExtraData);
  }

  meta.palette = palette;
  meta.trans_color = trans_color;
  meta.gamma = gamma;

  let expected_len = if meta.is_interlaced {
    crate::adam7::reduced_image_dimensions(meta.width, meta.height)
      .into_iter()
      .skip(1)
      .map(|(w, h)| meta.bytes_per_filterline(w).saturating_mul(h as usize))
      .sum()
  } else {
    meta.bytes_per_filterline(meta.width).saturating_mul(meta.height as usize)
  };

  crate::trace!("headers finished, {} compressed bytes, expecting {expected_len} inflated", compressed.len());
  let mut decompressed = inflate_to_exact(&compressed, expected_len)?;
  let plane = build_plane(&meta, &mut decompressed)?;
  normalize(plane, &meta)
}

/// Inflates `compressed` (a zlib stream, the concatenation of every `IDAT`
/// chunk's data), suppressing any inflate error observed once at least
/// `expected_len` bytes have already been produced — some encoders leave
/// trailing junk after the final deflate block.
fn inflate_to_exact(compressed: &[u8], expected_len: usize) -> PngResult<Vec<u8>> {
  use miniz_oxide::inflate::decompress_to_vec_zlib_with_limit;
  let mut data = match decompress_to_vec_zlib_with_limit(compressed, expected_len) {
    Ok(data) => data,
    Err(err) => err.output,
  };
  if data.len() < expected_len {
    return Err(PngError::DecompressionFailed);
  }
  data.truncate(expected_len);
  Ok(data)
}
