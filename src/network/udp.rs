//! UDP sockets and caller-owned connections

use std::net::{SocketAddr, ToSocketAddrs};
use std::sync::Arc;

use socket2::{Domain, Protocol, Socket, Type};
use tokio::net::UdpSocket;
use tokio_util::sync::CancellationToken;

use crate::error::NetworkError;

/// Options applied before a socket is bound
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SocketOptions {
    /// `SO_RCVBUF` in bytes; the kernel may round or clamp it
    pub recv_buffer_size: Option<usize>,
    /// `SO_REUSEADDR`. Off by default so binding a port already in use fails
    pub reuse_address: bool,
}

/// Create a non-blocking UDP socket bound to `addr`
pub fn create_socket(
    addr: SocketAddr,
    options: SocketOptions,
) -> Result<std::net::UdpSocket, NetworkError> {
    let socket = Socket::new(Domain::for_address(addr), Type::DGRAM, Some(Protocol::UDP))
        .map_err(|e| NetworkError::BindFailed(format!("socket(): {}", e)))?;

    if options.reuse_address {
        socket
            .set_reuse_address(true)
            .map_err(|e| NetworkError::BindFailed(format!("SO_REUSEADDR: {}", e)))?;
    }

    if let Some(size) = options.recv_buffer_size {
        if let Err(e) = socket.set_recv_buffer_size(size) {
            tracing::warn!("Failed to set receive buffer to {} bytes: {}", size, e);
        }
    }

    socket
        .set_nonblocking(true)
        .map_err(|e| NetworkError::BindFailed(format!("O_NONBLOCK: {}", e)))?;
    socket
        .bind(&addr.into())
        .map_err(|e| NetworkError::BindFailed(format!("{}: {}", addr, e)))?;

    Ok(socket.into())
}

/// Pick one address from a resolver result, preferring IPv4
fn pick_address(
    addrs: impl Iterator<Item = SocketAddr>,
    what: &str,
) -> Result<SocketAddr, NetworkError> {
    let addrs: Vec<SocketAddr> = addrs.collect();
    addrs
        .iter()
        .find(|a| a.is_ipv4())
        .or_else(|| addrs.first())
        .copied()
        .ok_or_else(|| NetworkError::AddressResolution(format!("{}: no addresses", what)))
}

/// Resolve `host:port` without blocking the runtime
pub async fn resolve(host: &str, port: u16) -> Result<SocketAddr, NetworkError> {
    let addrs = tokio::net::lookup_host((host, port))
        .await
        .map_err(|e| NetworkError::AddressResolution(format!("{}:{}: {}", host, port, e)))?;
    pick_address(addrs, &format!("{}:{}", host, port))
}

/// Resolve `host:port` on the calling thread
pub fn resolve_blocking(host: &str, port: u16) -> Result<SocketAddr, NetworkError> {
    let addrs = (host, port)
        .to_socket_addrs()
        .map_err(|e| NetworkError::AddressResolution(format!("{}:{}: {}", host, port, e)))?;
    pick_address(addrs, &format!("{}:{}", host, port))
}

/// Resolve a combined `host:port` string, as used for server configuration
pub async fn resolve_str(addr: &str) -> Result<SocketAddr, NetworkError> {
    let addrs = tokio::net::lookup_host(addr)
        .await
        .map_err(|e| NetworkError::AddressResolution(format!("{}: {}", addr, e)))?;
    pick_address(addrs, addr)
}

/// A UDP socket owned by the caller.
///
/// Clones share the socket and its closed state. [`Connection::close`] makes
/// every pending and future receive on any clone fail with
/// [`NetworkError::ConnectionClosed`]; the descriptor itself is released
/// when the last clone is dropped.
#[derive(Debug, Clone)]
pub struct Connection {
    socket: Arc<UdpSocket>,
    closed: CancellationToken,
}

impl Connection {
    /// Bind a new connection to `host:port`
    pub async fn bind(addr: &str) -> Result<Self, NetworkError> {
        let addr = resolve_str(addr).await?;
        Self::bind_with(addr, SocketOptions::default())
    }

    /// Bind with explicit socket options. Must be called inside a runtime.
    pub fn bind_with(addr: SocketAddr, options: SocketOptions) -> Result<Self, NetworkError> {
        let std_socket = create_socket(addr, options)?;
        let socket = UdpSocket::from_std(std_socket)
            .map_err(|e| NetworkError::BindFailed(format!("{}: {}", addr, e)))?;
        Ok(Self::from_socket(socket))
    }

    /// Wrap an already bound socket
    pub fn from_socket(socket: UdpSocket) -> Self {
        Self {
            socket: Arc::new(socket),
            closed: CancellationToken::new(),
        }
    }

    pub fn local_addr(&self) -> Result<SocketAddr, NetworkError> {
        self.socket
            .local_addr()
            .map_err(|e| NetworkError::BindFailed(e.to_string()))
    }

    pub fn close(&self) {
        self.closed.cancel();
    }

    pub fn is_closed(&self) -> bool {
        self.closed.is_cancelled()
    }

    /// Receive one datagram, or fail as soon as the connection is closed
    pub async fn recv_from(&self, buf: &mut [u8]) -> Result<(usize, SocketAddr), NetworkError> {
        if self.is_closed() {
            return Err(NetworkError::ConnectionClosed);
        }
        tokio::select! {
            biased;
            () = self.closed.cancelled() => Err(NetworkError::ConnectionClosed),
            result = self.socket.recv_from(buf) => {
                result.map_err(|e| NetworkError::ReceiveFailed(e.to_string()))
            }
        }
    }

    pub async fn send_to(&self, data: &[u8], target: SocketAddr) -> Result<usize, NetworkError> {
        if self.is_closed() {
            return Err(NetworkError::ConnectionClosed);
        }
        self.socket
            .send_to(data, target)
            .await
            .map_err(|e| NetworkError::SendFailed(format!("{}: {}", target, e)))
    }
}
