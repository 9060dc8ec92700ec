//! OSC server: handler registry, receive primitive and serve loop
//!
//! The server holds configuration and handlers only. Sockets are passed in
//! per call as a [`Connection`], so the caller decides when they open and
//! close. Handlers run inline on the serve loop, in registration order,
//! before the next datagram is read; a slow handler delays later packets on
//! the same connection.

use std::fmt;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::time::Instant;

use crate::address::{match_address, validate_literal_address};
use crate::config::ServerConfig;
use crate::constants::{DEFAULT_BIND_ADDRESS, DEFAULT_OSC_PORT, RECV_BUFFER_SIZE};
use crate::error::{ErrorKind, NetworkError, Result};
use crate::network::context::Context;
use crate::network::udp::{resolve_str, Connection, SocketOptions};
use crate::protocol::{parse_packet, Message, Packet};

/// Callback invoked with each matching message
pub type Handler = Arc<dyn Fn(&Message) + Send + Sync>;

struct Registration {
    address: String,
    handler: Handler,
}

#[derive(Default)]
struct Counters {
    packets_received: AtomicU64,
    bytes_received: AtomicU64,
    malformed_packets: AtomicU64,
    messages_dispatched: AtomicU64,
    unmatched_messages: AtomicU64,
}

/// Server statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerStats {
    pub packets_received: u64,
    pub bytes_received: u64,
    pub malformed_packets: u64,
    pub messages_dispatched: u64,
    pub unmatched_messages: u64,
}

pub struct Server {
    /// Listen address used by [`Server::listen_and_serve`]
    pub addr: String,
    socket_options: SocketOptions,
    handlers: RwLock<Vec<Registration>>,
    counters: Counters,
}

impl Server {
    pub fn new(addr: impl Into<String>) -> Self {
        Self {
            addr: addr.into(),
            socket_options: SocketOptions::default(),
            handlers: RwLock::new(Vec::new()),
            counters: Counters::default(),
        }
    }

    pub fn from_config(config: &ServerConfig) -> Self {
        let mut server = Self::new(config.addr());
        server.socket_options = SocketOptions {
            recv_buffer_size: config.recv_buffer_size,
            reuse_address: config.reuse_address,
        };
        server
    }

    /// Register `callback` for the literal address `address`.
    ///
    /// Registering the same address again replaces its callback but keeps
    /// its position in dispatch order. Pattern characters are rejected.
    pub fn handle<F>(&self, address: &str, callback: F) -> Result<()>
    where
        F: Fn(&Message) + Send + Sync + 'static,
    {
        validate_literal_address(address)?;

        let handler: Handler = Arc::new(callback);
        let mut handlers = self.handlers.write();
        match handlers.iter_mut().find(|r| r.address == address) {
            Some(existing) => {
                existing.handler = handler;
                tracing::debug!("Replaced handler for {}", address);
            }
            None => {
                handlers.push(Registration {
                    address: address.to_string(),
                    handler,
                });
                tracing::debug!("Registered handler for {}", address);
            }
        }
        Ok(())
    }

    /// Remove the handler for `address`, returning whether one existed
    pub fn unregister(&self, address: &str) -> bool {
        let mut handlers = self.handlers.write();
        let before = handlers.len();
        handlers.retain(|r| r.address != address);
        handlers.len() != before
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.read().len()
    }

    /// Registered addresses, in dispatch order
    pub fn addresses(&self) -> Vec<String> {
        self.handlers
            .read()
            .iter()
            .map(|r| r.address.clone())
            .collect()
    }

    /// Read and decode one packet from `conn`.
    ///
    /// `deadline` applies to this call only. When it elapses the result is
    /// [`NetworkError::Timeout`] and the connection stays usable.
    pub async fn receive_packet(
        &self,
        deadline: Option<Instant>,
        conn: &Connection,
    ) -> Result<(Packet, SocketAddr)> {
        let mut buf = vec![0u8; RECV_BUFFER_SIZE];
        self.receive_into(deadline, conn, &mut buf).await
    }

    async fn receive_into(
        &self,
        deadline: Option<Instant>,
        conn: &Connection,
        buf: &mut [u8],
    ) -> Result<(Packet, SocketAddr)> {
        let recv = conn.recv_from(buf);
        let (len, from) = match deadline {
            Some(deadline) => tokio::time::timeout_at(deadline, recv)
                .await
                .map_err(|_| NetworkError::Timeout)??,
            None => recv.await?,
        };

        self.counters.packets_received.fetch_add(1, Ordering::Relaxed);
        self.counters
            .bytes_received
            .fetch_add(len as u64, Ordering::Relaxed);
        tracing::debug!("Received {} bytes from {}", len, from);

        match parse_packet(&buf[..len]) {
            Ok(packet) => Ok((packet, from)),
            Err(e) => {
                self.counters.malformed_packets.fetch_add(1, Ordering::Relaxed);
                tracing::debug!("Malformed packet from {}: {}", from, e);
                Err(e.into())
            }
        }
    }

    /// Receive and dispatch packets until `ctx` is done or `conn` is closed.
    ///
    /// Timeouts and malformed packets do not stop the loop. Cancellation and
    /// a closed connection end it with `Ok(())`; any other transport error is
    /// returned.
    pub async fn serve(&self, ctx: &Context, conn: &Connection) -> Result<()> {
        match conn.local_addr() {
            Ok(addr) => tracing::info!("OSC server listening on {}", addr),
            Err(_) => tracing::info!("OSC server started"),
        }

        let mut buf = vec![0u8; RECV_BUFFER_SIZE];
        loop {
            if ctx.is_done() {
                tracing::info!("OSC server stopping: context done");
                return Ok(());
            }

            let result = tokio::select! {
                biased;
                () = ctx.done() => continue,
                result = self.receive_into(ctx.deadline(), conn, &mut buf) => result,
            };

            match result {
                Ok((packet, _)) => self.dispatch(&packet),
                Err(e) => match e.kind() {
                    ErrorKind::Timeout => continue,
                    ErrorKind::MalformedPacket => {
                        tracing::warn!("Dropping packet: {}", e);
                    }
                    ErrorKind::ConnectionClosed => {
                        tracing::info!("OSC server stopping: connection closed");
                        return Ok(());
                    }
                    _ => {
                        tracing::error!("OSC server failed: {}", e);
                        return Err(e);
                    }
                },
            }
        }
    }

    /// Bind a connection on [`Server::addr`] and serve it until `ctx` is done
    pub async fn listen_and_serve(&self, ctx: &Context) -> Result<()> {
        let addr = resolve_str(&self.addr).await?;
        let conn = Connection::bind_with(addr, self.socket_options)?;
        let result = self.serve(ctx, &conn).await;
        conn.close();
        result
    }

    /// Invoke every handler matching each message in `packet`.
    ///
    /// Bundle elements are dispatched in order and immediately; their time
    /// tags are not used for scheduling.
    pub fn dispatch(&self, packet: &Packet) {
        match packet {
            Packet::Message(msg) => self.dispatch_message(msg),
            Packet::Bundle(bundle) => {
                tracing::trace!(
                    "Dispatching bundle ({}) with {} elements",
                    bundle.time_tag(),
                    bundle.len()
                );
                for element in bundle.elements() {
                    self.dispatch(element);
                }
            }
        }
    }

    fn dispatch_message(&self, msg: &Message) {
        // Clone the targets out so handlers may register or unregister
        let targets: Vec<Handler> = self
            .handlers
            .read()
            .iter()
            .filter(|r| match_address(msg.address(), &r.address))
            .map(|r| Arc::clone(&r.handler))
            .collect();

        if targets.is_empty() {
            self.counters.unmatched_messages.fetch_add(1, Ordering::Relaxed);
            tracing::debug!("No handler for {}", msg.address());
            return;
        }

        tracing::trace!("Dispatching {} to {} handler(s)", msg, targets.len());
        for handler in targets {
            handler(msg);
        }
        self.counters
            .messages_dispatched
            .fetch_add(1, Ordering::Relaxed);
    }

    pub fn stats(&self) -> ServerStats {
        ServerStats {
            packets_received: self.counters.packets_received.load(Ordering::Relaxed),
            bytes_received: self.counters.bytes_received.load(Ordering::Relaxed),
            malformed_packets: self.counters.malformed_packets.load(Ordering::Relaxed),
            messages_dispatched: self.counters.messages_dispatched.load(Ordering::Relaxed),
            unmatched_messages: self.counters.unmatched_messages.load(Ordering::Relaxed),
        }
    }
}

impl Default for Server {
    fn default() -> Self {
        Self::new(format!("{}:{}", DEFAULT_BIND_ADDRESS, DEFAULT_OSC_PORT))
    }
}

impl fmt::Debug for Server {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Server")
            .field("addr", &self.addr)
            .field("handlers", &self.addresses())
            .finish()
    }
}
