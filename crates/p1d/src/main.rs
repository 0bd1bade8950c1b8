//! P1 Daemon - DSMR smart-meter Prometheus exporter
//!
//! Reads P1 telegrams from a serial port, an HTTP bridge or the builtin
//! sample telegram, and serves the derived counters and gauges on
//! /metrics for scraping.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use p1_common::{FormatSpec, ReaderOptions};
use tracing::{error, info, Level};

use p1d::cli::Cli;
use p1d::config::Config;
use p1d::exporter::Exporter;
use p1d::metrics::P1Metrics;
use p1d::server::{self, AppState};
use p1d::source::{ApiSource, MeterSource, MockSource, SerialSource};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::INFO })
        .init();

    info!("p1d v{} starting", env!("CARGO_PKG_VERSION"));

    let mut config = Config::load(cli.config.as_deref())?;
    config.apply_cli(&cli);

    let source = build_source(&config)?;
    let format = FormatSpec::esmr5();
    info!("telegram source: {}", source.describe());
    info!("telegram format: {}", format.name());

    let metrics = Arc::new(P1Metrics::new());

    let listen = config.listen.clone();
    let server_state = AppState::new(Arc::clone(&metrics));
    tokio::spawn(async move {
        if let Err(e) = server::run(&listen, server_state).await {
            error!("HTTP server failed: {}", e);
            std::process::exit(1);
        }
    });

    let reader_options = ReaderOptions {
        verify_checksum: !config.skip_checksum,
        ..ReaderOptions::esmr5()
    };
    let mut exporter = Exporter::new(
        source,
        reader_options,
        format,
        metrics,
        Duration::from_secs(config.interval_secs),
        config.failure_threshold,
    );

    let fault = exporter.run().await;
    error!(
        "giving up after {} consecutive failed cycles: {}",
        fault.consecutive_failures, fault.last_error
    );
    std::process::exit(1)
}

/// Pick the telegram source: mock wins, then the API endpoint, then
/// the serial port.
fn build_source(config: &Config) -> Result<MeterSource> {
    if config.mock {
        return Ok(MeterSource::Mock(MockSource::new()));
    }
    let read_timeout = Duration::from_secs(config.read_timeout_secs);
    if let Some(endpoint) = config.api_endpoint() {
        return Ok(MeterSource::Api(ApiSource::new(endpoint, read_timeout)));
    }
    let serial = SerialSource::open(&config.serial_device, config.baud, read_timeout)?;
    Ok(MeterSource::Serial(serial))
}
