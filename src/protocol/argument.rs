//! OSC message arguments
//!
//! [`Argument`] is a closed union over the OSC 1.0 atomic types. Tag
//! derivation, encoding and decoding are each a single exhaustive match, so a
//! message can never hold a value that has no wire representation.

use std::fmt;

use bytes::{BufMut, Bytes, BytesMut};

use crate::codec::decoder::{
    read_blob, read_f32, read_f64, read_i32, read_i64, read_padded_string, read_u32, read_u64,
};
use crate::codec::encoder::{check_string, write_blob, write_padded_string};
use crate::error::CodecError;
use crate::protocol::TimeTag;

/// A single typed OSC argument
#[derive(Debug, Clone, PartialEq)]
pub enum Argument {
    /// `i`: 32-bit big-endian two's complement integer
    Int32(i32),
    /// `f`: 32-bit big-endian IEEE 754 float
    Float32(f32),
    /// `s`: padded UTF-8 string
    String(String),
    /// `b`: length-prefixed opaque bytes
    Blob(Bytes),
    /// `T`: no payload
    True,
    /// `F`: no payload
    False,
    /// `h`: 64-bit big-endian integer
    Int64(i64),
    /// `d`: 64-bit big-endian IEEE 754 float
    Float64(f64),
    /// `t`: NTP time tag
    TimeTag(TimeTag),
    /// `c`: character sent as a 32-bit code point
    Char(char),
    /// `N`: no payload
    Nil,
    /// `I`: "infinitum", no payload
    Impulse,
}

impl Argument {
    /// The type tag character for this argument
    pub fn tag(&self) -> char {
        match self {
            Argument::Int32(_) => 'i',
            Argument::Float32(_) => 'f',
            Argument::String(_) => 's',
            Argument::Blob(_) => 'b',
            Argument::True => 'T',
            Argument::False => 'F',
            Argument::Int64(_) => 'h',
            Argument::Float64(_) => 'd',
            Argument::TimeTag(_) => 't',
            Argument::Char(_) => 'c',
            Argument::Nil => 'N',
            Argument::Impulse => 'I',
        }
    }

    /// Append the payload bytes of this argument to `out`.
    ///
    /// Returns the number of bytes written, which is zero for the
    /// payload-less tags.
    pub fn encode(&self, out: &mut BytesMut) -> Result<usize, CodecError> {
        let written = match self {
            Argument::Int32(v) => {
                out.put_i32(*v);
                4
            }
            Argument::Float32(v) => {
                out.put_f32(*v);
                4
            }
            Argument::String(s) => {
                check_string(s)?;
                write_padded_string(s, out)
            }
            Argument::Blob(data) => write_blob(data, out)?,
            Argument::Int64(v) => {
                out.put_i64(*v);
                8
            }
            Argument::Float64(v) => {
                out.put_f64(*v);
                8
            }
            Argument::TimeTag(t) => {
                out.put_u64(t.as_raw());
                8
            }
            Argument::Char(c) => {
                out.put_u32(u32::from(*c));
                4
            }
            Argument::True | Argument::False | Argument::Nil | Argument::Impulse => 0,
        };
        Ok(written)
    }

    /// Decode the payload for type tag `tag` from the front of `buf`
    pub fn decode(tag: char, buf: &mut &[u8]) -> Result<Self, CodecError> {
        let arg = match tag {
            'i' => Argument::Int32(read_i32(buf)?),
            'f' => Argument::Float32(read_f32(buf)?),
            's' => Argument::String(read_padded_string(buf)?.0),
            'b' => Argument::Blob(Bytes::from(read_blob(buf)?)),
            'T' => Argument::True,
            'F' => Argument::False,
            'h' => Argument::Int64(read_i64(buf)?),
            'd' => Argument::Float64(read_f64(buf)?),
            't' => Argument::TimeTag(TimeTag::from_raw(read_u64(buf)?)),
            'c' => {
                let code = read_u32(buf)?;
                Argument::Char(char::from_u32(code).ok_or(CodecError::InvalidChar(code))?)
            }
            'N' => Argument::Nil,
            'I' => Argument::Impulse,
            other => return Err(CodecError::UnknownTypeTag(other)),
        };
        Ok(arg)
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Argument::Int32(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f32(&self) -> Option<f32> {
        match self {
            Argument::Float32(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Argument::Int64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Argument::Float64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Argument::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_blob(&self) -> Option<&[u8]> {
        match self {
            Argument::Blob(b) => Some(b),
            _ => None,
        }
    }

    /// `Some(true)` for `T`, `Some(false)` for `F`
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Argument::True => Some(true),
            Argument::False => Some(false),
            _ => None,
        }
    }

    pub fn as_time_tag(&self) -> Option<TimeTag> {
        match self {
            Argument::TimeTag(t) => Some(*t),
            _ => None,
        }
    }
}

impl From<i32> for Argument {
    fn from(v: i32) -> Self {
        Argument::Int32(v)
    }
}

impl From<f32> for Argument {
    fn from(v: f32) -> Self {
        Argument::Float32(v)
    }
}

impl From<i64> for Argument {
    fn from(v: i64) -> Self {
        Argument::Int64(v)
    }
}

impl From<f64> for Argument {
    fn from(v: f64) -> Self {
        Argument::Float64(v)
    }
}

impl From<&str> for Argument {
    fn from(v: &str) -> Self {
        Argument::String(v.to_string())
    }
}

impl From<String> for Argument {
    fn from(v: String) -> Self {
        Argument::String(v)
    }
}

impl From<Vec<u8>> for Argument {
    fn from(v: Vec<u8>) -> Self {
        Argument::Blob(Bytes::from(v))
    }
}

impl From<Bytes> for Argument {
    fn from(v: Bytes) -> Self {
        Argument::Blob(v)
    }
}

impl From<bool> for Argument {
    fn from(v: bool) -> Self {
        if v {
            Argument::True
        } else {
            Argument::False
        }
    }
}

impl From<char> for Argument {
    fn from(v: char) -> Self {
        Argument::Char(v)
    }
}

impl From<TimeTag> for Argument {
    fn from(v: TimeTag) -> Self {
        Argument::TimeTag(v)
    }
}

impl From<()> for Argument {
    fn from(_: ()) -> Self {
        Argument::Nil
    }
}

impl fmt::Display for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Argument::Int32(v) => write!(f, "{v}"),
            Argument::Float32(v) => write!(f, "{v}"),
            Argument::String(s) => write!(f, "{s:?}"),
            Argument::Blob(b) => write!(f, "<blob {} bytes>", b.len()),
            Argument::True => write!(f, "true"),
            Argument::False => write!(f, "false"),
            Argument::Int64(v) => write!(f, "{v}"),
            Argument::Float64(v) => write!(f, "{v}"),
            Argument::TimeTag(t) => write!(f, "{t}"),
            Argument::Char(c) => write!(f, "{c:?}"),
            Argument::Nil => write!(f, "nil"),
            Argument::Impulse => write!(f, "impulse"),
        }
    }
}
