//! OSC atomic value decoding
//!
//! Every reader is bounds-checked: malformed input produces a
//! [`CodecError`], never a panic.

use bytes::Buf;

use crate::codec::encoder::blob_padding;
use crate::error::CodecError;

fn ensure<B: Buf>(buf: &B, needed: usize) -> Result<(), CodecError> {
    let available = buf.remaining();
    if available < needed {
        return Err(CodecError::UnexpectedEof { needed, available });
    }
    Ok(())
}

/// Read a zero-terminated, 4-byte padded string.
///
/// Returns the string and the number of bytes consumed (a multiple of 4,
/// never less than 4).
pub fn read_padded_string<B: Buf>(buf: &mut B) -> Result<(String, usize), CodecError> {
    let mut raw = Vec::new();
    let mut consumed = 0;
    loop {
        if buf.remaining() == 0 {
            return Err(CodecError::UnterminatedString);
        }
        ensure(buf, 4)?;
        let mut chunk = [0u8; 4];
        buf.copy_to_slice(&mut chunk);
        consumed += 4;

        if let Some(end) = chunk.iter().position(|&b| b == 0) {
            raw.extend_from_slice(&chunk[..end]);
            break;
        }
        raw.extend_from_slice(&chunk);
    }

    let s = String::from_utf8(raw).map_err(|_| CodecError::InvalidUtf8)?;
    Ok((s, consumed))
}

/// Read a length-prefixed blob and skip its padding.
pub fn read_blob<B: Buf>(buf: &mut B) -> Result<Vec<u8>, CodecError> {
    let len = read_u32(buf)? as usize;
    let padded = len + blob_padding(len);
    ensure(buf, padded)?;
    let mut data = vec![0u8; len];
    buf.copy_to_slice(&mut data);
    buf.advance(padded - len);
    Ok(data)
}

pub fn read_u32<B: Buf>(buf: &mut B) -> Result<u32, CodecError> {
    ensure(buf, 4)?;
    Ok(buf.get_u32())
}

pub fn read_i32<B: Buf>(buf: &mut B) -> Result<i32, CodecError> {
    ensure(buf, 4)?;
    Ok(buf.get_i32())
}

pub fn read_f32<B: Buf>(buf: &mut B) -> Result<f32, CodecError> {
    ensure(buf, 4)?;
    Ok(buf.get_f32())
}

pub fn read_u64<B: Buf>(buf: &mut B) -> Result<u64, CodecError> {
    ensure(buf, 8)?;
    Ok(buf.get_u64())
}

pub fn read_i64<B: Buf>(buf: &mut B) -> Result<i64, CodecError> {
    ensure(buf, 8)?;
    Ok(buf.get_i64())
}

pub fn read_f64<B: Buf>(buf: &mut B) -> Result<f64, CodecError> {
    ensure(buf, 8)?;
    Ok(buf.get_f64())
}

/// Split off the next `len` bytes as their own slice.
pub fn read_slice<'a>(buf: &mut &'a [u8], len: usize) -> Result<&'a [u8], CodecError> {
    ensure(buf, len)?;
    let data: &'a [u8] = *buf;
    let (head, tail) = data.split_at(len);
    *buf = tail;
    Ok(head)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::encoder::{write_blob, write_padded_string};
    use bytes::BytesMut;
    use proptest::prelude::*;

    #[test]
    fn test_read_padded_string() {
        let cases: [(&[u8], usize, &str); 2] = [
            (b"teststring\0\0", 12, "teststring"),
            (b"test\0\0\0\0", 8, "test"),
        ];
        for (bytes, n, expected) in cases {
            let mut buf = bytes;
            let (s, consumed) = read_padded_string(&mut buf).unwrap();
            assert_eq!(consumed, n);
            assert_eq!(s, expected);
            assert!(buf.is_empty());
        }
    }

    #[test]
    fn test_read_padded_string_empty() {
        let mut buf: &[u8] = b"\0\0\0\0rest";
        let (s, consumed) = read_padded_string(&mut buf).unwrap();
        assert_eq!(s, "");
        assert_eq!(consumed, 4);
        assert_eq!(buf, b"rest");
    }

    #[test]
    fn test_read_padded_string_unterminated() {
        let mut buf: &[u8] = b"abcdefgh";
        assert_eq!(
            read_padded_string(&mut buf),
            Err(CodecError::UnterminatedString)
        );
    }

    #[test]
    fn test_read_padded_string_short_chunk() {
        let mut buf: &[u8] = b"abcdef\0";
        assert_eq!(
            read_padded_string(&mut buf),
            Err(CodecError::UnexpectedEof {
                needed: 4,
                available: 3
            })
        );
    }

    #[test]
    fn test_read_padded_string_invalid_utf8() {
        let mut buf: &[u8] = &[0xFF, 0xFE, 0, 0];
        assert_eq!(read_padded_string(&mut buf), Err(CodecError::InvalidUtf8));
    }

    #[test]
    fn test_read_blob() {
        let mut buf: &[u8] = &[0, 0, 0, 3, 9, 8, 7, 0, 0xAA];
        assert_eq!(read_blob(&mut buf).unwrap(), vec![9, 8, 7]);
        assert_eq!(buf, &[0xAA]);
    }

    #[test]
    fn test_read_blob_truncated() {
        let mut buf: &[u8] = &[0, 0, 0, 8, 1, 2];
        assert!(matches!(
            read_blob(&mut buf),
            Err(CodecError::UnexpectedEof { needed: 8, .. })
        ));
    }

    #[test]
    fn test_read_scalars() {
        let mut buf: &[u8] = &[
            0x00, 0x00, 0x04, 0x62, // 1122
            0x3F, 0x80, 0x00, 0x00, // 1.0
            0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFE, // -2
        ];
        assert_eq!(read_i32(&mut buf).unwrap(), 1122);
        assert_eq!(read_f32(&mut buf).unwrap(), 1.0);
        assert_eq!(read_i64(&mut buf).unwrap(), -2);
        assert!(read_u32(&mut buf).is_err());
    }

    #[test]
    fn test_read_slice() {
        let mut buf: &[u8] = &[1, 2, 3, 4, 5];
        assert_eq!(read_slice(&mut buf, 2).unwrap(), &[1, 2]);
        assert_eq!(buf, &[3, 4, 5]);
        assert!(read_slice(&mut buf, 4).is_err());
    }

    proptest! {
        #[test]
        fn prop_padded_string_roundtrip(s in "\\PC{0,64}") {
            let mut out = BytesMut::new();
            let written = write_padded_string(&s, &mut out);
            prop_assert_eq!(written % 4, 0);

            let mut buf = &out[..];
            let (decoded, consumed) = read_padded_string(&mut buf).unwrap();
            prop_assert_eq!(decoded, s);
            prop_assert_eq!(consumed, written);
        }

        #[test]
        fn prop_blob_roundtrip(data in proptest::collection::vec(any::<u8>(), 0..64)) {
            let mut out = BytesMut::new();
            let written = write_blob(&data, &mut out).unwrap();
            prop_assert_eq!(written % 4, 0);

            let mut buf = &out[..];
            prop_assert_eq!(read_blob(&mut buf).unwrap(), data);
            prop_assert!(buf.is_empty());
        }

        #[test]
        fn prop_pad_bytes_needed(n in 0usize..100_000) {
            let pad = crate::codec::encoder::pad_bytes_needed(n);
            prop_assert!((1..=4).contains(&pad));
            prop_assert_eq!((n + pad) % 4, 0);
        }
    }
}
