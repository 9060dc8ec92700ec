//! OSC bundles
//!
//! Wire layout:
//!
//! ```text
//! "#bundle\0" | time tag (u64) | { element length (u32) | element bytes }*
//! ```

use bytes::{BufMut, Bytes, BytesMut};

use crate::codec::decoder::{read_padded_string, read_slice, read_u32, read_u64};
use crate::codec::encoder::write_padded_string;
use crate::constants::{BUNDLE_MARKER, MAX_BUNDLE_DEPTH};
use crate::error::CodecError;
use crate::protocol::{Packet, TimeTag};

/// A time tag plus an ordered list of nested packets
#[derive(Debug, Clone, PartialEq)]
pub struct Bundle {
    time_tag: TimeTag,
    elements: Vec<Packet>,
}

impl Bundle {
    pub fn new(time_tag: TimeTag) -> Self {
        Self {
            time_tag,
            elements: Vec::new(),
        }
    }

    /// Bundle tagged for immediate dispatch
    pub fn immediate() -> Self {
        Self::new(TimeTag::IMMEDIATELY)
    }

    pub fn append(&mut self, element: impl Into<Packet>) {
        self.elements.push(element.into());
    }

    pub fn with_element(mut self, element: impl Into<Packet>) -> Self {
        self.append(element);
        self
    }

    pub fn time_tag(&self) -> TimeTag {
        self.time_tag
    }

    pub fn elements(&self) -> &[Packet] {
        &self.elements
    }

    pub fn into_elements(self) -> Vec<Packet> {
        self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Append the wire encoding of this bundle to `out`
    pub fn encode_into(&self, out: &mut BytesMut) -> Result<(), CodecError> {
        write_padded_string(BUNDLE_MARKER, out);
        out.put_u64(self.time_tag.as_raw());

        for element in &self.elements {
            // Reserve the length prefix, then patch it once the size is known
            let start = out.len();
            out.put_u32(0);
            element.encode_into(out)?;
            let len = element_len(out.len() - start - 4)?;
            out[start..start + 4].copy_from_slice(&len.to_be_bytes());
        }
        Ok(())
    }

    pub fn to_bytes(&self) -> Result<Bytes, CodecError> {
        let mut out = BytesMut::new();
        self.encode_into(&mut out)?;
        Ok(out.freeze())
    }

    /// Decode a bundle that must occupy all of `data`
    pub fn from_bytes(data: &[u8]) -> Result<Self, CodecError> {
        Self::decode(data, 1)
    }

    pub(crate) fn decode(data: &[u8], depth: usize) -> Result<Self, CodecError> {
        if depth > MAX_BUNDLE_DEPTH {
            return Err(CodecError::TooDeep(MAX_BUNDLE_DEPTH));
        }

        let mut buf = data;
        let (marker, _) = read_padded_string(&mut buf)?;
        if marker != BUNDLE_MARKER {
            return Err(CodecError::InvalidBundleMarker(marker));
        }
        let time_tag = TimeTag::from_raw(read_u64(&mut buf)?);

        let mut elements = Vec::new();
        while !buf.is_empty() {
            let len = read_u32(&mut buf)?;
            if len == 0 || len % 4 != 0 {
                return Err(CodecError::InvalidElementLength(len));
            }
            let chunk = read_slice(&mut buf, len as usize)?;
            elements.push(Packet::decode_at_depth(chunk, depth + 1)?);
        }

        Ok(Self { time_tag, elements })
    }
}

/// Length prefix for an encoded element
fn element_len(len: usize) -> Result<u32, CodecError> {
    u32::try_from(len).map_err(|_| CodecError::ElementTooLarge(len))
}

impl Default for Bundle {
    fn default() -> Self {
        Self::immediate()
    }
}
