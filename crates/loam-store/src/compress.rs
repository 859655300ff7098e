//! Object compression.
//!
//! New objects are written with the configured codec. Reads pick the codec
//! from the stream's leading bytes, so a store may hold objects written under
//! different configurations.

use std::io::{Read, Write};

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use loam_types::{Compression, StoreConfig};

/// Leading bytes of every zstd frame.
const ZSTD_MAGIC: [u8; 4] = [0x28, 0xB5, 0x2F, 0xFD];

/// Compress `data` with the configured codec and level.
pub fn compress(data: &[u8], config: &StoreConfig) -> std::io::Result<Vec<u8>> {
    match config.compression {
        Compression::Zlib => {
            let level = flate2::Compression::new(config.level.clamp(0, 9) as u32);
            let mut encoder = ZlibEncoder::new(Vec::with_capacity(data.len() / 2), level);
            encoder.write_all(data)?;
            encoder.finish()
        }
        Compression::Zstd => zstd::encode_all(data, config.level),
    }
}

/// Decompress a stored object, detecting its codec.
pub fn decompress(data: &[u8]) -> std::io::Result<Vec<u8>> {
    if data.starts_with(&ZSTD_MAGIC) {
        return zstd::decode_all(data);
    }
    let mut out = Vec::with_capacity(data.len() * 2);
    ZlibDecoder::new(data).read_to_end(&mut out)?;
    Ok(out)
}
