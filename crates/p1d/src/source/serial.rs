//! Serial P1 port source.
//!
//! A DSMR meter pushes one telegram every second (ESMR 5) or every ten
//! seconds (older) over an inverted-TTL serial line, commonly exposed
//! as `/dev/ttyUSB0` through a P1-to-USB cable at 115200 8N1. Each
//! read joins the stream wherever it happens to be, skips to the next
//! start marker and collects lines through the checksum trailer.

use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::timeout;
use tokio_serial::{SerialPortBuilderExt, SerialStream};

use super::SourceError;

/// Longest plausible telegram, in lines. A port that babbles without
/// ever sending a trailer must not grow the buffer forever.
const MAX_TELEGRAM_LINES: usize = 128;

pub struct SerialSource {
    device: String,
    reader: BufReader<SerialStream>,
    read_timeout: Duration,
}

impl SerialSource {
    /// Open `device` at `baud` (the standard P1 rate is 115200).
    pub fn open(device: &str, baud: u32, read_timeout: Duration) -> Result<Self, SourceError> {
        let stream = tokio_serial::new(device, baud).open_native_async()?;
        Ok(Self {
            device: device.to_string(),
            reader: BufReader::new(stream),
            read_timeout,
        })
    }

    pub fn device(&self) -> &str {
        &self.device
    }

    /// Read one telegram worth of raw lines, terminators included.
    pub async fn read_lines(&mut self) -> Result<Vec<String>, SourceError> {
        match timeout(self.read_timeout, self.collect_telegram()).await {
            Ok(result) => result,
            Err(_) => Err(SourceError::Timeout(self.read_timeout)),
        }
    }

    async fn collect_telegram(&mut self) -> Result<Vec<String>, SourceError> {
        let mut lines = Vec::new();
        let mut collecting = false;
        loop {
            let mut line = String::new();
            let read = self.reader.read_line(&mut line).await?;
            if read == 0 {
                return Err(SourceError::Io(std::io::Error::new(
                    std::io::ErrorKind::UnexpectedEof,
                    "serial stream closed",
                )));
            }
            if !collecting {
                if !line.starts_with('/') {
                    continue;
                }
                collecting = true;
            }
            let done = line.starts_with('!');
            lines.push(line);
            if done {
                return Ok(lines);
            }
            if lines.len() > MAX_TELEGRAM_LINES {
                return Err(SourceError::Oversized(MAX_TELEGRAM_LINES));
            }
        }
    }
}
