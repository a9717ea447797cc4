//! Lossless, text-safe encoding of summary bodies.
//!
//! Bodies are zlib-compressed and then base64 encoded so they fit in plain
//! string fields of the document store. Both directions degrade to identity:
//! if compression fails the plaintext is stored as is, and anything that does
//! not decode and inflate cleanly is treated as plaintext already.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use flate2::Compression;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use std::io::{self, Read, Write};
use tracing::{debug, error};

fn compress(text: &str) -> io::Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(text.as_bytes())?;
    encoder.finish()
}

fn inflate(encoded: &str) -> Option<String> {
    let bytes = STANDARD.decode(encoded.trim()).ok()?;
    let mut decoder = ZlibDecoder::new(bytes.as_slice());
    let mut decoded = String::new();
    decoder.read_to_string(&mut decoded).ok()?;
    Some(decoded)
}

/// Compress and base64 encode `text`. Returns `text` unchanged on failure.
pub fn encode(text: &str) -> String {
    match compress(text) {
        Ok(bytes) => STANDARD.encode(bytes),
        Err(e) => {
            error!(error = %e, "Unable to compress text; storing plaintext");
            text.to_string()
        }
    }
}

/// Inverse of [`encode`]. Input that is not an encoded body comes back as is.
pub fn decode(encoded: &str) -> String {
    match inflate(encoded) {
        Some(text) => text,
        None => {
            debug!("Value is not an encoded body; treating as plaintext");
            encoded.to_string()
        }
    }
}
