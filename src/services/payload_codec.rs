//! Payload bytes to embeddable bits and back.
//!
//! Encoding optionally zlib-compresses the payload and expands every byte
//! into eight bits, most significant first. Decoding packs bits back into
//! bytes, tries to inflate them, and falls back to the literal bytes when
//! they are not a zlib stream.

use miniz_oxide::deflate::compress_to_vec_zlib;
use miniz_oxide::inflate::decompress_to_vec_zlib;

/// zlib level used for payload compression.
const COMPRESSION_LEVEL: u8 = 6;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum PayloadError {
    #[error("Invalid compressed stream: {0}")]
    InvalidStream(String),

    #[error("Payload is not valid text")]
    NotText,
}

pub fn compress(bytes: &[u8]) -> Vec<u8> {
    compress_to_vec_zlib(bytes, COMPRESSION_LEVEL)
}

pub fn decompress(bytes: &[u8]) -> Result<Vec<u8>, PayloadError> {
    decompress_to_vec_zlib(bytes).map_err(|e| PayloadError::InvalidStream(format!("{:?}", e.status)))
}

/// Expand bytes into bits, most significant bit first.
pub fn to_bits(bytes: &[u8]) -> Vec<bool> {
    bytes
        .iter()
        .flat_map(|&byte| (0..8).rev().map(move |i| (byte >> i) & 1 == 1))
        .collect()
}

/// Pack bits into bytes; a trailing partial byte is dropped.
pub fn from_bits(bits: &[bool]) -> Vec<u8> {
    bits.chunks_exact(8)
        .map(|chunk| chunk.iter().fold(0u8, |acc, &bit| (acc << 1) | bit as u8))
        .collect()
}

/// Bits to embed for `payload`.
pub fn encode(payload: &[u8], compress_payload: bool) -> Vec<bool> {
    if compress_payload {
        let packed = compress(payload);
        tracing::debug!(
            original = payload.len(),
            compressed = packed.len(),
            "Compressed payload"
        );
        to_bits(&packed)
    } else {
        to_bits(payload)
    }
}

/// Bytes recovered from extracted bits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedPayload {
    pub bytes: Vec<u8>,
    /// Whether the bits held a zlib stream that was inflated
    pub was_compressed: bool,
}

pub fn decode(bits: &[bool]) -> DecodedPayload {
    let packed = from_bits(bits);
    match decompress(&packed) {
        Ok(bytes) => DecodedPayload {
            bytes,
            was_compressed: true,
        },
        Err(e) => {
            tracing::debug!(%e, "Payload is not compressed, using literal bytes");
            DecodedPayload {
                bytes: packed,
                was_compressed: false,
            }
        }
    }
}

/// Decode extracted bits into text.
pub fn decode_text(bits: &[bool]) -> Result<String, PayloadError> {
    let decoded = decode(bits);
    String::from_utf8(decoded.bytes).map_err(|_| PayloadError::NotText)
}
