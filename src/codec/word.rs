//! Little-endian u32 words, the only field type on the wire.

use super::frame::FrameError;
use crate::core::WORD_SIZE;

/// Encode a word as 4 little-endian bytes.
#[inline]
pub fn encode_word(value: u32) -> [u8; WORD_SIZE] {
    value.to_le_bytes()
}

/// Decode the first word of `bytes`.
pub fn decode_word(bytes: &[u8]) -> Result<u32, FrameError> {
    let word: [u8; WORD_SIZE] = bytes
        .get(..WORD_SIZE)
        .and_then(|head| head.try_into().ok())
        .ok_or(FrameError::TooShort {
            expected: WORD_SIZE,
            actual: bytes.len(),
        })?;
    Ok(u32::from_le_bytes(word))
}

/// Append `values` to `buf` as consecutive words.
pub fn put_words(buf: &mut Vec<u8>, values: &[u32]) {
    buf.reserve(values.len() * WORD_SIZE);
    for value in values {
        buf.extend_from_slice(&encode_word(*value));
    }
}

/// Decode a buffer made entirely of words.
pub fn decode_words(bytes: &[u8]) -> Result<Vec<u32>, FrameError> {
    if bytes.len() % WORD_SIZE != 0 {
        return Err(FrameError::PartialWord {
            trailing: bytes.len() % WORD_SIZE,
        });
    }
    Ok(bytes
        .chunks_exact(WORD_SIZE)
        .map(|chunk| u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect())
}
