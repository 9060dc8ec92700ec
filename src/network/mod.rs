//! UDP transport for OSC packets

pub mod client;
pub mod context;
pub mod server;
pub mod udp;

pub use client::Client;
pub use context::Context;
pub use server::{Handler, Server, ServerStats};
pub use udp::{create_socket, Connection, SocketOptions};
