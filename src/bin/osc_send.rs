//! OSC Send
//!
//! Sends one message and exits.
//!
//! ```text
//! osc-send <host:port> <address> [args...]
//!
//!   i:42  f:0.5  s:text  h:42  d:0.5   typed values
//!   T  F  N  I                         true, false, nil, impulse
//! ```
//!
//! Without a target, the client section of `osc.toml` is used.

use std::str::FromStr;

use anyhow::{anyhow, bail, Context as _, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lan_osc::{config::OscConfig, Argument, Client, Message};

fn parse_target(target: &str) -> Result<(String, u16)> {
    let (host, port) = target
        .rsplit_once(':')
        .ok_or_else(|| anyhow!("target must be host:port, got {:?}", target))?;
    let host = host.trim_start_matches('[').trim_end_matches(']');
    let port = port
        .parse()
        .with_context(|| format!("invalid port {:?}", port))?;
    Ok((host.to_string(), port))
}

fn parse_value<T>(value: &str, kind: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .parse()
        .with_context(|| format!("bad {} {:?}", kind, value))
}

fn parse_argument(raw: &str) -> Result<Argument> {
    let arg = match raw {
        "T" => Argument::True,
        "F" => Argument::False,
        "N" => Argument::Nil,
        "I" => Argument::Impulse,
        _ => {
            let (prefix, value) = raw
                .split_once(':')
                .ok_or_else(|| anyhow!("untyped argument {:?}", raw))?;
            match prefix {
                "i" => Argument::Int32(parse_value(value, "int32")?),
                "f" => Argument::Float32(parse_value(value, "float32")?),
                "h" => Argument::Int64(parse_value(value, "int64")?),
                "d" => Argument::Float64(parse_value(value, "float64")?),
                "s" => Argument::String(value.to_string()),
                other => bail!("unknown argument type {:?}", other),
            }
        }
    };
    Ok(arg)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();

    // A leading '/' means the target was omitted
    let (client, rest) = match args.first() {
        Some(first) if !first.starts_with('/') => {
            let (host, port) = parse_target(first)?;
            (Client::new(host, port), &args[1..])
        }
        _ => {
            let config = OscConfig::load_or_default();
            (Client::from_config(&config.client)?, &args[..])
        }
    };

    let Some((address, values)) = rest.split_first() else {
        bail!("usage: osc-send [host:port] <address> [args...]");
    };

    let mut msg = Message::new(address.as_str());
    for raw in values {
        msg.append(parse_argument(raw)?);
    }

    let sent = client.send_message(&msg).await?;
    tracing::info!(
        "Sent {} ({} bytes) to {}:{}",
        msg,
        sent,
        client.host(),
        client.port()
    );

    Ok(())
}
