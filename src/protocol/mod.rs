//! OSC packet model
//!
//! [`Packet`] is a closed enum over [`Message`] and [`Bundle`]. Bundles nest
//! packets recursively; decoding dispatches on the first byte of each
//! element.

pub mod argument;
pub mod bundle;
pub mod message;
pub mod packet;
pub mod time_tag;

pub use argument::Argument;
pub use bundle::Bundle;
pub use message::Message;
pub use packet::{parse_packet, Packet};
pub use time_tag::TimeTag;
