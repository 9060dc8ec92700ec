//! # LAN OSC
//!
//! Open Sound Control 1.0 over UDP.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────────┐
//! │                                CLIENT                                │
//! │  ┌───────────────┐    ┌───────────────┐    ┌───────────────────────┐ │
//! │  │    Message    │    │    Bundle     │    │       TimeTag         │ │
//! │  │ /addr ,ifs .. │    │ #bundle + tt  │    │  NTP 32.32 fixed pt   │ │
//! │  └───────┬───────┘    └───────┬───────┘    └───────────────────────┘ │
//! │          └──────────┬─────────┘                                      │
//! │                     ▼                                                │
//! │  ┌────────────────────────────────────────────────────────────────┐  │
//! │  │        Packet encoder (protocol + codec::encoder)              │  │
//! │  │        4-byte aligned strings, blobs, big-endian numbers       │  │
//! │  └────────────────────────────────────────────────────────────────┘  │
//! │                     │  Client::send (fresh socket per datagram)      │
//! └─────────────────────┼────────────────────────────────────────────────┘
//!                       │ UDP
//!                       ▼
//! ┌─────────────────────┼────────────────────────────────────────────────┐
//! │                     │                 SERVER                         │
//! │  ┌────────────────────────────────────────────────────────────────┐  │
//! │  │  Connection (caller owned)  ◄──── Context (cancel / deadline)  │  │
//! │  └────────────────────────────────────────────────────────────────┘  │
//! │                     ▼                                                │
//! │  ┌────────────────────────────────────────────────────────────────┐  │
//! │  │        parse_packet (protocol + codec::decoder)                │  │
//! │  └────────────────────────────────────────────────────────────────┘  │
//! │                     ▼                                                │
//! │  ┌────────────────────────────────────────────────────────────────┐  │
//! │  │  Dispatch: pattern in message  ×  literal handler addresses    │  │
//! │  │  /mixer/*/gain  ──►  /mixer/1/gain, /mixer/2/gain              │  │
//! │  └────────────────────────────────────────────────────────────────┘  │
//! └──────────────────────────────────────────────────────────────────────┘
//! ```

pub mod address;
pub mod codec;
pub mod config;
pub mod error;
pub mod network;
pub mod protocol;

pub use error::{Error, ErrorKind, Result};
pub use network::{Client, Connection, Context, Server};
pub use protocol::{parse_packet, Argument, Bundle, Message, Packet, TimeTag};

/// Protocol and transport constants
pub mod constants {
    /// Largest payload a single IPv4 UDP datagram can carry
    pub const MAX_PACKET_SIZE: usize = 65_507;

    /// Receive buffer per datagram
    pub const RECV_BUFFER_SIZE: usize = 65_536;

    /// Deepest bundle nesting accepted when decoding
    pub const MAX_BUNDLE_DEPTH: usize = 32;

    /// Leading string of every bundle
    pub const BUNDLE_MARKER: &str = "#bundle";

    /// Default UDP port for OSC
    pub const DEFAULT_OSC_PORT: u16 = 9000;

    pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0";

    pub const DEFAULT_TARGET_HOST: &str = "127.0.0.1";
}
