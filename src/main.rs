//! CLI entry point for the CPUMonitorJr host bridge
//!
//! Listens for display announcements on the discovery port and streams time,
//! identity and statistics frames to the most recently advertised display.
//!
//! # Usage
//!
//! ```bash
//! cpumonitorjr --port 44447 --interval 1.0
//! cpumonitorjr --config /etc/cpumonitorjr.toml --send-discovery
//! cpumonitorjr --no-logging
//! ```

use std::ffi::OsString;
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use cpumonitorjr::bridge::{Bridge, Shutdown, shutdown_on_signals};
use cpumonitorjr::config::BridgeConfig;
use cpumonitorjr::logging;
use cpumonitorjr::telemetry::{SystemIdentity, SystemTelemetry};
use cpumonitorjr::transport::WebSocketConnector;

#[derive(Debug, Parser)]
#[command(name = "cpumonitorjr", version)]
#[command(about = "Stream host telemetry to a CPUMonitorJr display", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Disable logging entirely (no console output, no log file)
    #[arg(long)]
    no_logging: bool,

    /// UDP discovery port
    #[arg(long)]
    port: Option<u16>,

    /// Seconds between frames (minimum 0.2)
    #[arg(long)]
    interval: Option<f64>,

    /// Broadcast host announcements every 5 seconds
    #[arg(long)]
    send_discovery: bool,
}

impl Cli {
    /// Apply command line overrides on top of file and environment settings.
    fn apply(&self, config: &mut BridgeConfig) {
        if let Some(port) = self.port {
            config.udp_port = port;
        }
        if let Some(interval) = self.interval {
            config.interval = interval;
        }
        if self.send_discovery {
            config.send_discovery = true;
        }
    }
}

/// Accept the legacy single-dash `-nologging` spelling.
fn normalize_args(args: impl IntoIterator<Item = OsString>) -> Vec<OsString> {
    args.into_iter()
        .map(|arg| {
            if arg
                .to_str()
                .is_some_and(|a| a.eq_ignore_ascii_case("-nologging"))
            {
                OsString::from("--no-logging")
            } else {
                arg
            }
        })
        .collect()
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse_from(normalize_args(std::env::args_os()));

    let mut config = BridgeConfig::load(cli.config.as_deref())?;
    cli.apply(&mut config);
    config.validate()?;

    if !cli.no_logging {
        logging::init_from_config(&config).map_err(anyhow::Error::msg)?;
    }

    let shutdown = Shutdown::new();
    let signals = shutdown_on_signals(shutdown.clone());

    let connector = WebSocketConnector::new(config.udp_port);
    let result = Bridge::new(config)
        .run(
            connector,
            SystemTelemetry::new(),
            SystemIdentity::new(),
            shutdown.clone(),
        )
        .await;

    shutdown.trigger();
    let _ = signals.await;
    result?;
    Ok(())
}
