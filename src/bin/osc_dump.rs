//! OSC Dump
//!
//! Logs every packet received on a UDP port until Ctrl+C.
//!
//! ```text
//! osc-dump [bind]      e.g. osc-dump 0.0.0.0:9000
//! ```

use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lan_osc::{config::OscConfig, Connection, Context, Error, ErrorKind, Packet, Server};

/// Bad datagrams are skipped; any other receive error ends the dump
fn is_recoverable(e: &Error) -> bool {
    e.kind() == ErrorKind::MalformedPacket
}

fn log_packet(packet: &Packet, depth: usize) {
    let indent = "  ".repeat(depth);
    match packet {
        Packet::Message(msg) => tracing::info!("{}{}", indent, msg),
        Packet::Bundle(bundle) => {
            tracing::info!("{}#bundle {} ({} elements)", indent, bundle.time_tag(), bundle.len());
            for element in bundle.elements() {
                log_packet(element, depth + 1);
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = OscConfig::load_or_default();
    let bind = std::env::args()
        .nth(1)
        .unwrap_or_else(|| config.server.addr());

    let conn = Connection::bind(&bind).await?;
    tracing::info!("Dumping OSC packets on {}", conn.local_addr()?);

    let ctx = Context::background();
    let shutdown = ctx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Shutting down...");
        }
        shutdown.cancel();
    });

    // No handlers: the dump reads packets directly
    let server = Server::new(bind);
    let outcome = loop {
        let result = tokio::select! {
            () = ctx.done() => break Ok(()),
            result = server.receive_packet(None, &conn) => result,
        };
        match result {
            Ok((packet, from)) => {
                tracing::info!("From {}:", from);
                log_packet(&packet, 1);
            }
            Err(e) if is_recoverable(&e) => tracing::warn!("{}", e),
            Err(e) if e.is_connection_closed() => break Ok(()),
            Err(e) => {
                tracing::error!("Receive failed: {}", e);
                break Err(e);
            }
        }
    };

    let stats = server.stats();
    tracing::info!(
        "Received {} packets ({} bytes), {} malformed",
        stats.packets_received,
        stats.bytes_received,
        stats.malformed_packets
    );
    Ok(outcome?)
}
