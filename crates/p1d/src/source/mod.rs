//! Telegram sources: where raw meter lines come from.
//!
//! Exactly one source is active per process. All of them hand the
//! exporter the same thing, raw telegram lines with their terminators
//! still attached, so the framing and checksum logic downstream never
//! cares where the bytes came from.

mod api;
mod mock;
mod serial;

pub use api::ApiSource;
pub use mock::MockSource;
pub use serial::SerialSource;

use std::time::Duration;

use thiserror::Error;

/// Failure to deliver raw telegram lines.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("serial port: {0}")]
    Serial(#[from] tokio_serial::Error),

    #[error("read: {0}")]
    Io(#[from] std::io::Error),

    #[error("http: {0}")]
    Http(#[from] reqwest::Error),

    #[error("http status {0}")]
    HttpStatus(reqwest::StatusCode),

    #[error("no telegram within {0:?}")]
    Timeout(Duration),

    #[error("empty response body")]
    Empty,

    #[error("telegram exceeds {0} lines without a trailer")]
    Oversized(usize),
}

/// The closed set of places a telegram can come from.
pub enum MeterSource {
    Serial(SerialSource),
    Api(ApiSource),
    Mock(MockSource),
}

impl MeterSource {
    /// Produce the raw lines of one telegram.
    pub async fn read_lines(&mut self) -> Result<Vec<String>, SourceError> {
        match self {
            MeterSource::Serial(source) => source.read_lines().await,
            MeterSource::Api(source) => source.read_lines().await,
            MeterSource::Mock(source) => source.read_lines().await,
        }
    }

    /// Short description for startup logging.
    pub fn describe(&self) -> String {
        match self {
            MeterSource::Serial(source) => format!("serial port {}", source.device()),
            MeterSource::Api(source) => format!("HTTP endpoint {}", source.endpoint()),
            MeterSource::Mock(_) => "builtin sample telegram".to_string(),
        }
    }
}
