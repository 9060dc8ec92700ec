//! OSC atomic value encoding
//!
//! All multi-byte values are written big-endian, which is what `BufMut`'s
//! unsuffixed `put_*` methods do.

use bytes::BufMut;

use crate::error::CodecError;

/// Number of zero bytes that must follow a string of `n` bytes.
///
/// Always in `[1, 4]` so that at least one terminator is present, even when
/// `n` is already a multiple of 4.
pub fn pad_bytes_needed(n: usize) -> usize {
    4 - n % 4
}

/// Number of zero bytes that must follow a blob of `n` bytes.
///
/// Blobs carry an explicit length, so no terminator is required and the
/// result is in `[0, 3]`.
pub fn blob_padding(n: usize) -> usize {
    (4 - n % 4) % 4
}

/// Write `s` followed by its zero padding, returning the bytes written.
///
/// The caller is responsible for rejecting strings with interior NUL bytes,
/// see [`check_string`].
pub fn write_padded_string<B: BufMut>(s: &str, out: &mut B) -> usize {
    let pad = pad_bytes_needed(s.len());
    out.put_slice(s.as_bytes());
    out.put_bytes(0, pad);
    s.len() + pad
}

/// Write a length-prefixed, padded blob, returning the bytes written.
pub fn write_blob<B: BufMut>(data: &[u8], out: &mut B) -> Result<usize, CodecError> {
    let len = u32::try_from(data.len()).map_err(|_| CodecError::BlobTooLarge(data.len()))?;
    let pad = blob_padding(data.len());
    out.put_u32(len);
    out.put_slice(data);
    out.put_bytes(0, pad);
    Ok(4 + data.len() + pad)
}

/// Reject strings that would be truncated by the receiver.
pub fn check_string(s: &str) -> Result<(), CodecError> {
    if s.as_bytes().contains(&0) {
        return Err(CodecError::InteriorNul(s.to_string()));
    }
    Ok(())
}

/// Encoded size of a padded string, without writing it.
pub fn padded_string_len(s: &str) -> usize {
    s.len() + pad_bytes_needed(s.len())
}
