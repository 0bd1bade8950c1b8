//! CLI - Command-line argument parsing
//!
//! Flags cover the exporter's runtime knobs. Anything not given on the
//! command line falls back to the config file, then to built-in
//! defaults.

use clap::Parser;

/// P1 exporter daemon
#[derive(Parser, Debug)]
#[command(name = "p1d")]
#[command(about = "DSMR P1 smart-meter Prometheus exporter", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Address to serve /metrics on
    #[arg(long)]
    pub listen: Option<String>,

    /// Seconds between meter read cycles
    #[arg(long)]
    pub interval_secs: Option<u64>,

    /// Serial device carrying the P1 stream
    #[arg(long)]
    pub serial_device: Option<String>,

    /// HTTP endpoint serving raw telegrams, used instead of serial
    #[arg(long)]
    pub api_endpoint: Option<String>,

    /// Serve the builtin sample telegram instead of reading a meter
    #[arg(long)]
    pub mock: bool,

    /// Consecutive failed cycles tolerated before exiting
    #[arg(long)]
    pub failure_threshold: Option<u32>,

    /// Accept telegrams without verifying the CRC trailer
    #[arg(long)]
    pub skip_checksum: bool,

    /// Path to the config file
    #[arg(long)]
    pub config: Option<String>,

    /// Log at debug level
    #[arg(long, short = 'v')]
    pub verbose: bool,
}
