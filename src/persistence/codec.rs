use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::Path;

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::IndexError;
use crate::Result;

/// File signature for every persisted index file
pub const MAGIC: &[u8; 4] = b"SHDX";

/// Current on-disk format version
pub const FORMAT_VERSION: u32 = 1;

const HEADER_LEN: usize = 12;

/// Encode a value into the persisted file format.
///
/// Record format:
/// - 4 byte magic `SHDX`
/// - u32 format version (little endian)
/// - u32 crc32 of the compressed body (little endian)
/// - zlib-compressed bincode payload
pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    let payload = bincode::serialize(value)?;

    let mut encoder = ZlibEncoder::new(Vec::with_capacity(payload.len() / 2), Compression::default());
    encoder.write_all(&payload)?;
    let body = encoder.finish()?;

    let crc32 = crc32fast::hash(&body);

    let mut out = Vec::with_capacity(HEADER_LEN + body.len());
    out.extend_from_slice(MAGIC);
    out.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
    out.extend_from_slice(&crc32.to_le_bytes());
    out.extend_from_slice(&body);
    Ok(out)
}

/// Decode bytes produced by [`encode`]; `path` is only used for error reporting.
pub fn decode<T: DeserializeOwned>(path: &Path, bytes: &[u8]) -> Result<T> {
    if bytes.len() < HEADER_LEN {
        return Err(IndexError::malformed(
            path,
            format!("truncated header ({} bytes)", bytes.len()),
        ));
    }

    if &bytes[0..4] != MAGIC {
        return Err(IndexError::malformed(path, "bad file signature"));
    }

    let version = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
    if version == 0 || version > FORMAT_VERSION {
        return Err(IndexError::malformed(
            path,
            format!(
                "unsupported format version {}, expected <= {}",
                version, FORMAT_VERSION
            ),
        ));
    }

    let stored_crc = u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]);
    let body = &bytes[HEADER_LEN..];
    if crc32fast::hash(body) != stored_crc {
        return Err(IndexError::malformed(path, "checksum mismatch (corrupt body)"));
    }

    let mut payload = Vec::new();
    ZlibDecoder::new(body)
        .read_to_end(&mut payload)
        .map_err(|e| IndexError::malformed(path, format!("decompression failed: {}", e)))?;

    bincode::deserialize(&payload)
        .map_err(|e| IndexError::malformed(path, format!("decoding failed: {}", e)))
}

/// Encode `value` and atomically replace `path` with it.
///
/// Returns the number of bytes written.
pub fn write_file<T: Serialize>(path: &Path, value: &T) -> Result<u64> {
    let bytes = encode(value)?;
    let tmp_path = path.with_extension("tmp");

    {
        let mut file = File::create(&tmp_path)?;
        file.write_all(&bytes)?;
        file.sync_all()?;
    }
    fs::rename(&tmp_path, path)?;

    Ok(bytes.len() as u64)
}

/// Read and decode `path`. A missing file yields `Ok(None)`.
pub fn read_file<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(IndexError::Io(e)),
    };
    decode(path, &bytes).map(Some)
}
