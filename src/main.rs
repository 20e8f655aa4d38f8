// Pressel - push-to-talk voice chat endpoint
// Binary entry point: loads configuration, wires the hardware and
// transport adapters together, and runs the client until it exits.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use pressel::audio::CpalEngine;
use pressel::hw::{SysfsPanel, TransmitControl};
use pressel::session::SessionConfig;
use pressel::transport::WsTransport;
use pressel::{Client, Config};

#[derive(Parser, Debug)]
#[command(name = "pressel", version, about = "Push-to-talk voice chat endpoint")]
struct Args {
    /// Configuration file stem, e.g. config/pressel for config/pressel.toml
    #[arg(long, default_value = "config/pressel")]
    config: String,

    /// Server address as host:port, overrides the configuration file
    #[arg(long)]
    server: Option<String>,

    /// Channel to join after connecting, overrides the configuration file
    #[arg(long)]
    channel: Option<String>,

    /// Accept self-signed server certificates
    #[arg(long)]
    insecure: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut config = Config::load(&args.config)
        .with_context(|| format!("failed to load configuration from {}", args.config))?;
    if let Some(server) = args.server {
        config.server.address = server;
    }
    if let Some(channel) = args.channel {
        config.server.channel = Some(channel);
    }
    if args.insecure {
        config.server.tls.insecure = true;
    }

    info!("Pressel v{}", env!("CARGO_PKG_VERSION"));
    info!("Server: {}", config.server.address);

    let session = SessionConfig {
        address: config.server.address.clone(),
        channel: config.server.channel.clone(),
        tls: config.server.tls.clone(),
    };
    let transport = Arc::new(WsTransport::new(config.server.username.clone()));
    let engine = Box::new(CpalEngine::new(config.audio.clone()));
    let panel = Arc::new(SysfsPanel::new(config.hardware.leds.clone()));
    let control = transmit_control(&config)?;

    let client = Client::new(session, transport, engine, panel, control)?;
    client.run().await?;

    Ok(())
}

#[cfg(target_os = "linux")]
fn transmit_control(config: &Config) -> Result<Box<dyn TransmitControl>> {
    let control = pressel::hw::EvdevControl::new(
        config.hardware.ptt_device.clone(),
        config.hardware.ptt_key_code,
    );
    Ok(Box::new(control))
}

#[cfg(not(target_os = "linux"))]
fn transmit_control(_config: &Config) -> Result<Box<dyn TransmitControl>> {
    anyhow::bail!("push-to-talk input requires an evdev device, which is Linux-only")
}
