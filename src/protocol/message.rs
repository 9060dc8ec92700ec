//! OSC messages

use std::fmt;

use bytes::{Bytes, BytesMut};

use crate::codec::decoder::read_padded_string;
use crate::codec::encoder::{check_string, padded_string_len, write_padded_string};
use crate::error::CodecError;
use crate::protocol::Argument;

/// An OSC address plus an ordered list of arguments.
///
/// Arguments can only be appended. The type tag string is derived from the
/// argument list on demand and never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    address: String,
    arguments: Vec<Argument>,
}

impl Message {
    /// Create a message with no arguments
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            arguments: Vec::new(),
        }
    }

    /// Append one argument.
    ///
    /// Accepts anything convertible into an [`Argument`]; unsupported types
    /// are rejected at compile time.
    pub fn append(&mut self, arg: impl Into<Argument>) {
        self.arguments.push(arg.into());
    }

    /// Builder form of [`Message::append`]
    pub fn with_arg(mut self, arg: impl Into<Argument>) -> Self {
        self.append(arg);
        self
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn arguments(&self) -> &[Argument] {
        &self.arguments
    }

    pub fn argument(&self, index: usize) -> Option<&Argument> {
        self.arguments.get(index)
    }

    pub fn count_arguments(&self) -> usize {
        self.arguments.len()
    }

    /// Type tag string: `,` followed by one tag per argument
    pub fn type_tags(&self) -> String {
        let mut tags = String::with_capacity(self.arguments.len() + 1);
        tags.push(',');
        tags.extend(self.arguments.iter().map(Argument::tag));
        tags
    }

    /// Same address and pairwise equal arguments, in order
    pub fn equals(&self, other: &Message) -> bool {
        self == other
    }

    /// Append the wire encoding of this message to `out`
    pub fn encode_into(&self, out: &mut BytesMut) -> Result<(), CodecError> {
        check_string(&self.address)?;
        let tags = self.type_tags();
        out.reserve(padded_string_len(&self.address) + padded_string_len(&tags));

        write_padded_string(&self.address, out);
        write_padded_string(&tags, out);
        for arg in &self.arguments {
            arg.encode(out)?;
        }
        Ok(())
    }

    /// Encode this message into a standalone buffer
    pub fn to_bytes(&self) -> Result<Bytes, CodecError> {
        let mut out = BytesMut::new();
        self.encode_into(&mut out)?;
        Ok(out.freeze())
    }

    /// Decode a message that must occupy all of `data`
    pub fn from_bytes(data: &[u8]) -> Result<Self, CodecError> {
        let mut buf = data;
        let msg = Self::decode(&mut buf)?;
        if !buf.is_empty() {
            return Err(CodecError::TrailingBytes(buf.len()));
        }
        Ok(msg)
    }

    fn decode(buf: &mut &[u8]) -> Result<Self, CodecError> {
        match buf.first() {
            None => return Err(CodecError::EmptyPacket),
            Some(b'/') => {}
            Some(&other) => return Err(CodecError::UnknownPacketKind(other)),
        }

        let (address, _) = read_padded_string(buf)?;
        let (raw_tags, _) = read_padded_string(buf)?;
        let Some(tags) = raw_tags.strip_prefix(',') else {
            return Err(CodecError::MissingTypeTagComma(raw_tags.clone()));
        };

        let mut msg = Message {
            address,
            arguments: Vec::with_capacity(tags.len()),
        };
        for tag in tags.chars() {
            msg.arguments.push(Argument::decode(tag, buf)?);
        }
        Ok(msg)
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.address, self.type_tags())?;
        for arg in &self.arguments {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_append_arguments() {
        let mut message = Message::new("/address");
        assert_eq!(message.address(), "/address");

        message.append("string argument");
        message.append(123456789);
        message.append(true);

        assert_eq!(message.count_arguments(), 3);
    }

    #[test]
    fn test_equal_message() {
        let mut msg1 = Message::new("/address");
        let mut msg2 = Message::new("/address");
        msg1.append(1234);
        msg2.append(1234);
        msg1.append("test string");
        msg2.append("test string");
        assert!(msg1.equals(&msg2));

        msg2.append(false);
        assert!(!msg1.equals(&msg2));
        assert!(!Message::new("/a").equals(&Message::new("/b")));
    }

    #[test]
    fn test_argument_order_matters() {
        let a = Message::new("/a").with_arg(1).with_arg(2);
        let b = Message::new("/a").with_arg(2).with_arg(1);
        assert_ne!(a, b);
    }

    #[test]
    fn test_type_tags() {
        let msg = Message::new("/some/address")
            .with_arg(100i32)
            .with_arg(true)
            .with_arg(false);
        assert_eq!(msg.type_tags(), ",iTF");
        assert_eq!(Message::new("/empty").type_tags(), ",");
    }

    #[test]
    fn test_encode_layout() {
        let msg = Message::new("/address/test").with_arg(1122i32);
        let bytes = msg.to_bytes().unwrap();
        let mut expected = b"/address/test\0\0\0,i\0\0".to_vec();
        expected.extend_from_slice(&1122i32.to_be_bytes());
        assert_eq!(&bytes[..], &expected[..]);
    }

    #[test]
    fn test_decode_no_args() {
        let msg = Message::from_bytes(b"/a/b/c\0\0,\0\0\0").unwrap();
        assert_eq!(msg.address(), "/a/b/c");
        assert_eq!(msg.count_arguments(), 0);
    }

    #[test]
    fn test_decode_string_arg() {
        let msg = Message::from_bytes(b"/d/e/f\0\0,s\0\0foo\0").unwrap();
        assert_eq!(msg.address(), "/d/e/f");
        assert_eq!(msg.argument(0).and_then(Argument::as_str), Some("foo"));
    }

    #[test]
    fn test_decode_missing_comma() {
        let err = Message::from_bytes(b"/a\0\0i\0\0\0\0\0\0\x01").unwrap_err();
        assert_eq!(err, CodecError::MissingTypeTagComma("i".to_string()));
    }

    #[test]
    fn test_decode_truncated_argument() {
        let err = Message::from_bytes(b"/a\0\0,i\0\0\0\0").unwrap_err();
        assert!(matches!(err, CodecError::UnexpectedEof { needed: 4, .. }));
    }

    #[test]
    fn test_decode_unknown_tag() {
        let err = Message::from_bytes(b"/a\0\0,x\0\0").unwrap_err();
        assert_eq!(err, CodecError::UnknownTypeTag('x'));
    }

    #[test]
    fn test_decode_trailing_bytes() {
        let err = Message::from_bytes(b"/a\0\0,\0\0\0\0\0\0\0").unwrap_err();
        assert_eq!(err, CodecError::TrailingBytes(4));
    }

    #[test]
    fn test_encode_rejects_nul_address() {
        assert!(Message::new("/a\0b").to_bytes().is_err());
    }

    #[test]
    fn test_display() {
        let msg = Message::new("/synth/freq").with_arg(440.0f32).with_arg("sine");
        assert_eq!(msg.to_string(), "/synth/freq ,fs 440 \"sine\"");
    }

    fn arb_argument() -> impl Strategy<Value = Argument> {
        prop_oneof![
            any::<i32>().prop_map(Argument::Int32),
            (-1.0e6f32..1.0e6).prop_map(Argument::Float32),
            "[a-zA-Z0-9 ]{0,12}".prop_map(Argument::String),
            proptest::collection::vec(any::<u8>(), 0..12).prop_map(Argument::from),
            any::<bool>().prop_map(Argument::from),
            any::<i64>().prop_map(Argument::Int64),
            Just(Argument::Nil),
        ]
    }

    proptest! {
        #[test]
        fn prop_message_roundtrip(
            address in "(/[a-z0-9_]{1,8}){1,4}",
            args in proptest::collection::vec(arb_argument(), 0..8),
        ) {
            let mut msg = Message::new(address);
            for arg in args {
                msg.append(arg);
            }
            let bytes = msg.to_bytes().unwrap();
            prop_assert_eq!(bytes.len() % 4, 0);
            let decoded = Message::from_bytes(&bytes).unwrap();
            prop_assert!(decoded.equals(&msg));
        }
    }
}
