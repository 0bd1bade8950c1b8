//! The supervisory read loop.
//!
//! One task owns the whole pipeline: read raw lines from the source,
//! frame and verify them, decode fields, derive telemetry events and
//! apply them to the registry, then sleep until the next cycle. Cycles
//! are strictly sequential. Consecutive failures are counted and a
//! fully successful cycle resets the count; once the count exceeds the
//! configured threshold the loop terminates and the process exits.

use std::sync::Arc;
use std::time::Duration;

use p1_common::{
    parse_telegram, read_telegram, FormatSpec, MetricDeriver, ReaderOptions, TelegramError,
};
use tracing::{debug, error, info};

use crate::metrics::P1Metrics;
use crate::source::MeterSource;

/// Loop state, explicit so tests can assert on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    Terminated,
}

/// Why the loop stopped.
#[derive(Debug)]
pub struct FatalFault {
    pub consecutive_failures: u32,
    pub last_error: TelegramError,
}

pub struct Exporter {
    source: MeterSource,
    reader_options: ReaderOptions,
    format: FormatSpec,
    deriver: MetricDeriver,
    metrics: Arc<P1Metrics>,
    interval: Duration,
    failure_threshold: u32,
    consecutive_failures: u32,
    state: LoopState,
    meter_id_logged: bool,
}

impl Exporter {
    pub fn new(
        source: MeterSource,
        reader_options: ReaderOptions,
        format: FormatSpec,
        metrics: Arc<P1Metrics>,
        interval: Duration,
        failure_threshold: u32,
    ) -> Self {
        Self {
            source,
            reader_options,
            format,
            deriver: MetricDeriver::new(),
            metrics,
            interval,
            failure_threshold,
            consecutive_failures: 0,
            state: LoopState::Running,
            meter_id_logged: false,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    pub fn source(&self) -> &MeterSource {
        &self.source
    }

    /// Run cycles forever. Returns only when the consecutive-failure
    /// threshold is exceeded; a threshold of 10 means the 11th
    /// consecutive failure is fatal.
    pub async fn run(&mut self) -> FatalFault {
        info!(
            "reading {} every {}s",
            self.source.describe(),
            self.interval.as_secs()
        );
        loop {
            match self.run_cycle().await {
                Ok(()) => {
                    self.consecutive_failures = 0;
                }
                Err(err) => {
                    self.consecutive_failures += 1;
                    error!(
                        "read cycle failed ({}): {} ({} consecutive)",
                        err.kind(),
                        err,
                        self.consecutive_failures
                    );
                    if self.consecutive_failures > self.failure_threshold {
                        self.state = LoopState::Terminated;
                        return FatalFault {
                            consecutive_failures: self.consecutive_failures,
                            last_error: err,
                        };
                    }
                }
            }
            tokio::time::sleep(self.interval).await;
        }
    }

    /// One read → frame → decode → derive → apply cycle. The first
    /// error aborts the cycle; the registry is untouched on failure.
    pub async fn run_cycle(&mut self) -> Result<(), TelegramError> {
        let lines = self
            .source
            .read_lines()
            .await
            .map_err(|e| TelegramError::Io(e.to_string()))?;
        let raw = read_telegram(&lines, &self.reader_options)?;
        if !self.meter_id_logged {
            info!("meter identification: {}", raw.identification);
            self.meter_id_logged = true;
        }
        let telegram = parse_telegram(&raw, &self.format)?;
        debug!("decoded telegram: {:?}", telegram);
        let events = self.deriver.derive(&telegram);
        for event in &events {
            self.metrics.apply(event);
        }
        debug!("applied {} telemetry events", events.len());
        Ok(())
    }
}
