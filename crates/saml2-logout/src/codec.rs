//! Base64 and raw-DEFLATE codec for the two SAML HTTP bindings
//!
//! HTTP-POST carries base64-encoded XML in a form field; HTTP-Redirect
//! additionally DEFLATE-compresses the XML before base64 encoding so it
//! fits in a query parameter. Which transform applies is the caller's
//! call — these are pure functions.

use crate::error::{SamlError, SamlResult};
use base64::{engine::general_purpose::STANDARD, Engine};
use flate2::read::DeflateDecoder;
use flate2::write::DeflateEncoder;
use flate2::Compression;
use std::io::{Read, Write};

/// Maximum decompressed size for deflate decoding (64 KB) to prevent
/// deflate bomb DoS
pub const MAX_INFLATED_SIZE: u64 = 64 * 1024;

/// Maximum encoded size for a Redirect-binding message parameter (128 KB)
pub const MAX_ENCODED_SIZE_REDIRECT: usize = 128 * 1024;

/// Maximum encoded size for a POST-binding message parameter (512 KB)
pub const MAX_ENCODED_SIZE_POST: usize = 512 * 1024;

/// Decode standard base64. Fails on malformed input.
pub fn decode(encoded: &str) -> SamlResult<Vec<u8>> {
    STANDARD
        .decode(encoded.trim())
        .map_err(|e| SamlError::Decoding(format!("Base64 decode failed: {e}")))
}

/// Encode bytes as standard base64. Never fails.
#[must_use]
pub fn encode(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Decompress a raw DEFLATE stream (no zlib/gzip header) to text.
///
/// Output is capped at [`MAX_INFLATED_SIZE`]; a stream that would inflate
/// past the cap is rejected rather than buffered, so a small malicious
/// input cannot balloon memory.
pub fn inflate(bytes: &[u8]) -> SamlResult<String> {
    let decoder = DeflateDecoder::new(bytes);
    let mut xml = String::new();
    decoder
        .take(MAX_INFLATED_SIZE)
        .read_to_string(&mut xml)
        .map_err(|e| SamlError::Decoding(format!("Deflate decode failed: {e}")))?;

    if xml.len() as u64 >= MAX_INFLATED_SIZE {
        return Err(SamlError::Decoding(
            "Decompressed message exceeds maximum size limit (64 KB)".to_string(),
        ));
    }

    Ok(xml)
}

/// Compress text with raw DEFLATE (no zlib/gzip header).
#[must_use]
pub fn deflate(text: &str) -> Vec<u8> {
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
    // Writing to a Vec cannot fail
    let _ = encoder.write_all(text.as_bytes());
    encoder.finish().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base64_round_trip() {
        let data: Vec<u8> = (0u8..=255).collect();
        assert_eq!(decode(&encode(&data)).unwrap(), data);
    }

    #[test]
    fn test_decode_rejects_malformed_base64() {
        assert!(decode("not valid base64!!!").is_err());
    }

    #[test]
    fn test_deflate_round_trip() {
        let xml = "<samlp:LogoutRequest ID=\"_abc\">payload</samlp:LogoutRequest>";
        assert_eq!(inflate(&deflate(xml)).unwrap(), xml);
    }

    #[test]
    fn test_inflate_rejects_corrupt_stream() {
        assert!(inflate(&[0xff, 0xfe, 0xfd, 0xfc]).is_err());
    }

    #[test]
    fn test_inflate_caps_decompression_bombs() {
        let bomb = "A".repeat(4 * 1024 * 1024);
        let compressed = deflate(&bomb);
        // A few KB of input must not be allowed to inflate to 4 MB
        assert!(compressed.len() < 32 * 1024);
        assert!(inflate(&compressed).is_err());
    }

    #[test]
    fn test_inflate_accepts_payloads_below_cap() {
        let xml = "x".repeat(32 * 1024);
        assert_eq!(inflate(&deflate(&xml)).unwrap(), xml);
    }
}
