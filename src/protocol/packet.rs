//! Top-level OSC packets

use bytes::{Bytes, BytesMut};

use crate::error::CodecError;
use crate::protocol::{Bundle, Message};

/// The unit exchanged over the wire: a message or a bundle
#[derive(Debug, Clone, PartialEq)]
pub enum Packet {
    Message(Message),
    Bundle(Bundle),
}

impl Packet {
    pub fn is_message(&self) -> bool {
        matches!(self, Packet::Message(_))
    }

    pub fn is_bundle(&self) -> bool {
        matches!(self, Packet::Bundle(_))
    }

    pub fn as_message(&self) -> Option<&Message> {
        match self {
            Packet::Message(msg) => Some(msg),
            Packet::Bundle(_) => None,
        }
    }

    pub fn as_bundle(&self) -> Option<&Bundle> {
        match self {
            Packet::Bundle(bundle) => Some(bundle),
            Packet::Message(_) => None,
        }
    }

    pub fn encode_into(&self, out: &mut BytesMut) -> Result<(), CodecError> {
        match self {
            Packet::Message(msg) => msg.encode_into(out),
            Packet::Bundle(bundle) => bundle.encode_into(out),
        }
    }

    pub fn to_bytes(&self) -> Result<Bytes, CodecError> {
        let mut out = BytesMut::new();
        self.encode_into(&mut out)?;
        Ok(out.freeze())
    }

    /// Same as [`parse_packet`]
    pub fn from_bytes(data: &[u8]) -> Result<Self, CodecError> {
        parse_packet(data)
    }

    pub(crate) fn decode_at_depth(data: &[u8], depth: usize) -> Result<Self, CodecError> {
        match data.first() {
            None => Err(CodecError::EmptyPacket),
            Some(b'/') => Message::from_bytes(data).map(Packet::Message),
            Some(b'#') => Bundle::decode(data, depth).map(Packet::Bundle),
            Some(&other) => Err(CodecError::UnknownPacketKind(other)),
        }
    }
}

impl From<Message> for Packet {
    fn from(msg: Message) -> Self {
        Packet::Message(msg)
    }
}

impl From<Bundle> for Packet {
    fn from(bundle: Bundle) -> Self {
        Packet::Bundle(bundle)
    }
}

/// Decode one top-level packet.
///
/// The first byte selects the kind: `/` for a message, `#` for a bundle.
pub fn parse_packet(data: &[u8]) -> Result<Packet, CodecError> {
    Packet::decode_at_depth(data, 1)
}
