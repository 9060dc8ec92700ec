//! OSC client
//!
//! A client is a target address plus an optional local address. Each send
//! resolves the target, binds a fresh socket and writes one datagram, so a
//! client holds no socket between sends and can be shared freely.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};

use tokio::net::UdpSocket;

use crate::config::ClientConfig;
use crate::constants::MAX_PACKET_SIZE;
use crate::error::{NetworkError, Result};
use crate::network::udp::{create_socket, resolve, resolve_blocking, SocketOptions};
use crate::protocol::{Message, Packet};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Client {
    host: String,
    port: u16,
    laddr: Option<SocketAddr>,
}

impl Client {
    /// Client for `host:port`. The host is resolved on every send.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            laddr: None,
        }
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let mut client = Self::new(config.host.clone(), config.port);
        if let Some(local) = &config.local_address {
            client.set_local_addr(local, config.local_port)?;
        }
        Ok(client)
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Send from `host:port` instead of an ephemeral local address
    pub fn set_local_addr(&mut self, host: &str, port: u16) -> Result<()> {
        self.laddr = Some(resolve_blocking(host, port)?);
        Ok(())
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.laddr
    }

    /// Encode and send a packet, returning the number of bytes written
    pub async fn send(&self, packet: &Packet) -> Result<usize> {
        let data = packet.to_bytes()?;
        self.send_raw(&data).await
    }

    pub async fn send_message(&self, msg: &Message) -> Result<usize> {
        let data = msg.to_bytes()?;
        self.send_raw(&data).await
    }

    /// Send already encoded bytes as one datagram
    pub async fn send_raw(&self, data: &[u8]) -> Result<usize> {
        if data.len() > MAX_PACKET_SIZE {
            return Err(NetworkError::PacketTooLarge(data.len()).into());
        }

        let remote = resolve(&self.host, self.port).await?;
        let local = self.laddr.unwrap_or_else(|| unspecified_for(&remote));

        let socket = UdpSocket::from_std(create_socket(local, SocketOptions::default())?)
            .map_err(|e| NetworkError::BindFailed(format!("{}: {}", local, e)))?;
        let sent = socket
            .send_to(data, remote)
            .await
            .map_err(|e| NetworkError::SendFailed(format!("{}: {}", remote, e)))?;

        tracing::debug!("Sent {} bytes to {}", sent, remote);
        Ok(sent)
    }
}

fn unspecified_for(remote: &SocketAddr) -> SocketAddr {
    let ip = match remote {
        SocketAddr::V4(_) => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
        SocketAddr::V6(_) => IpAddr::V6(Ipv6Addr::UNSPECIFIED),
    };
    SocketAddr::new(ip, 0)
}
