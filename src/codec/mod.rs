//! OSC binary codec
//!
//! Encoding and decoding of the atomic OSC values: big-endian numbers,
//! zero-terminated padded strings and length-prefixed blobs.

pub mod encoder;
pub mod decoder;

pub use decoder::{read_blob, read_padded_string};
pub use encoder::{blob_padding, pad_bytes_needed, write_blob, write_padded_string};
