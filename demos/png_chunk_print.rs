use pngcodec::{RawChunkIter, PNG_SIGNATURE};

fn main() {
  let args: Vec<String> = std::env::args().collect();
  println!("ARGS: {args:?}");
  for file_arg in args[1..].iter() {
    let path = std::path::Path::new(file_arg);
    print!("Reading `{}`... ", path.display());
    let bytes = match std::fs::read(path) {
      Ok(bytes) => {
        println!("got {} bytes.", bytes.len());
        bytes
      }
      Err(e) => {
        println!("{e:?}");
        continue;
      }
    };
    if bytes.len() < PNG_SIGNATURE.len() || bytes[..PNG_SIGNATURE.len()] != PNG_SIGNATURE {
      println!("not a PNG file (bad signature)");
      continue;
    }
    for (n, chunk_res) in RawChunkIter::new(&bytes[PNG_SIGNATURE.len()..]).enumerate() {
      match chunk_res {
        Ok(chunk) => {
          let type_str = core::str::from_utf8(&chunk.chunk_type).unwrap_or("????");
          println!("{n}: {type_str} ({} bytes)", chunk.data.len());
        }
        Err(e) => {
          println!("{n}: error: {e:?}");
          break;
        }
      }
    }
  }
}
