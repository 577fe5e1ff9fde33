//! Per-value compression codec.
//!
//! Each session value is gzip-compressed and base64-encoded before it is
//! placed into the session mapping. The mapping itself is serialized as
//! JSON, so the base64 step keeps the compressed bytes transport-safe.

use std::io::{Read, Write};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;

use crate::error::CodecError;

/// Compresses a value for storage in the session mapping.
pub fn compress(value: &str) -> Result<String, CodecError> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(value.as_bytes())
        .map_err(|e| CodecError::Compress {
            details: e.to_string(),
        })?;
    let bytes = encoder.finish().map_err(|e| CodecError::Compress {
        details: e.to_string(),
    })?;

    Ok(STANDARD.encode(bytes))
}

/// Decompresses a value previously stored with [`compress`].
pub fn decompress(token: &str) -> Result<String, CodecError> {
    let bytes = STANDARD
        .decode(token)
        .map_err(|_| CodecError::InvalidEncoding)?;

    let mut decoder = GzDecoder::new(bytes.as_slice());
    let mut value = String::new();
    decoder
        .read_to_string(&mut value)
        .map_err(|e| CodecError::InvalidStream {
            details: e.to_string(),
        })?;

    Ok(value)
}
