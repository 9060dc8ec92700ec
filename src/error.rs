//! Error types for the OSC library

use thiserror::Error;

/// Main error type for the library
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid address pattern: {0}")]
    InvalidAddressPattern(#[from] AddressError),

    #[error("Malformed packet: {0}")]
    MalformedPacket(#[from] CodecError),

    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse classification of an [`Error`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A handler was registered on something other than a literal address
    InvalidAddressPattern,
    /// Bytes could not be decoded, or a value could not be encoded
    MalformedPacket,
    /// A receive deadline elapsed; the connection is still usable
    Timeout,
    /// The connection was closed by its owner
    ConnectionClosed,
    /// Any other transport failure
    NetworkError,
    /// Configuration could not be loaded or saved
    Config,
}

impl Error {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidAddressPattern(_) => ErrorKind::InvalidAddressPattern,
            Error::MalformedPacket(_) => ErrorKind::MalformedPacket,
            Error::Network(NetworkError::Timeout) => ErrorKind::Timeout,
            Error::Network(NetworkError::ConnectionClosed) => ErrorKind::ConnectionClosed,
            Error::Network(_) | Error::Io(_) => ErrorKind::NetworkError,
            Error::Config(_) => ErrorKind::Config,
        }
    }

    pub fn is_timeout(&self) -> bool {
        self.kind() == ErrorKind::Timeout
    }

    pub fn is_connection_closed(&self) -> bool {
        self.kind() == ErrorKind::ConnectionClosed
    }
}

/// Address validation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("address is empty")]
    Empty,

    #[error("address must start with '/': {0:?}")]
    MissingLeadingSlash(String),

    #[error("address contains an empty part: {0:?}")]
    EmptyPart(String),

    #[error("address {address:?} contains reserved character {found:?}")]
    ReservedCharacter { address: String, found: char },
}

/// Wire encoding and decoding errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("packet is empty")]
    EmptyPacket,

    #[error("unexpected end of data: needed {needed} bytes, {available} available")]
    UnexpectedEof { needed: usize, available: usize },

    #[error("string is not terminated before end of data")]
    UnterminatedString,

    #[error("string is not valid UTF-8")]
    InvalidUtf8,

    #[error("string contains an interior NUL byte: {0:?}")]
    InteriorNul(String),

    #[error("type tag string must start with ',': {0:?}")]
    MissingTypeTagComma(String),

    #[error("unsupported type tag {0:?}")]
    UnknownTypeTag(char),

    #[error("invalid char argument: 0x{0:08X}")]
    InvalidChar(u32),

    #[error("packet must start with '/' or '#', found 0x{0:02X}")]
    UnknownPacketKind(u8),

    #[error("expected \"#bundle\" marker, found {0:?}")]
    InvalidBundleMarker(String),

    #[error("invalid bundle element length {0}")]
    InvalidElementLength(u32),

    #[error("bundles nested deeper than {0} levels")]
    TooDeep(usize),

    #[error("{0} trailing bytes after packet")]
    TrailingBytes(usize),

    #[error("blob of {0} bytes is too large to encode")]
    BlobTooLarge(usize),

    #[error("bundle element of {0} bytes is too large to encode")]
    ElementTooLarge(usize),
}

/// Network errors
#[derive(Error, Debug)]
pub enum NetworkError {
    #[error("Socket bind failed: {0}")]
    BindFailed(String),

    #[error("Address resolution failed: {0}")]
    AddressResolution(String),

    #[error("Send failed: {0}")]
    SendFailed(String),

    #[error("Receive failed: {0}")]
    ReceiveFailed(String),

    #[error("Packet too large: {0} bytes")]
    PacketTooLarge(usize),

    #[error("Connection closed")]
    ConnectionClosed,

    #[error("Timeout")]
    Timeout,
}

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;
