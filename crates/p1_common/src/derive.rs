//! Telemetry derivation from successive measurement records.
//!
//! Cumulative meter totals (kWh, m³) become counter increments guarded
//! by a high-water mark, so the exported counters only ever grow even
//! when a reading glitches backwards. Instantaneous values become
//! unconditional gauge sets. The deriver owns all state; the sink just
//! applies the emitted events.

use tracing::{debug, warn};

use crate::telegram::Telegram;

/// Cumulative meter totals exported as counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterField {
    ConsumptionHigh,
    ConsumptionLow,
    ProductionHigh,
    ProductionLow,
    Gas,
}

/// Instantaneous values exported as gauges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GaugeField {
    PowerDraw,
    PowerFeed,
    ActiveTariff,
    FailuresLong,
    FailuresShort,
}

/// One sink instruction derived from a telegram.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TelemetryEvent {
    IncrementCounter { counter: CounterField, delta: f64 },
    SetGauge { gauge: GaugeField, value: f64 },
}

/// High-water marks of the cumulative fields. Zero at process start;
/// only ever raised, and only by accepted readings.
#[derive(Debug, Clone, Copy, Default)]
pub struct DerivationState {
    consumption_high: f64,
    consumption_low: f64,
    production_high: f64,
    production_low: f64,
    gas: f64,
}

impl DerivationState {
    /// Last accepted reading for `field`.
    pub fn last(&self, field: CounterField) -> f64 {
        match field {
            CounterField::ConsumptionHigh => self.consumption_high,
            CounterField::ConsumptionLow => self.consumption_low,
            CounterField::ProductionHigh => self.production_high,
            CounterField::ProductionLow => self.production_low,
            CounterField::Gas => self.gas,
        }
    }

    fn set_last(&mut self, field: CounterField, value: f64) {
        match field {
            CounterField::ConsumptionHigh => self.consumption_high = value,
            CounterField::ConsumptionLow => self.consumption_low = value,
            CounterField::ProductionHigh => self.production_high = value,
            CounterField::ProductionLow => self.production_low = value,
            CounterField::Gas => self.gas = value,
        }
    }
}

/// Turns a stream of telegrams into counter increments and gauge sets.
#[derive(Debug, Default)]
pub struct MetricDeriver {
    state: DerivationState,
}

impl MetricDeriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current high-water marks.
    pub fn state(&self) -> &DerivationState {
        &self.state
    }

    /// Derive sink events from one record: counters first, then gauges,
    /// each in fixed field order.
    ///
    /// The very first accepted reading of a field increments its counter
    /// by the full meter total, so a freshly started exporter catches the
    /// counter up to the meter in one step.
    pub fn derive(&mut self, telegram: &Telegram) -> Vec<TelemetryEvent> {
        let mut events = Vec::new();

        self.derive_counter(
            CounterField::ConsumptionHigh,
            telegram.electricity_consumed_high,
            &mut events,
        );
        self.derive_counter(
            CounterField::ConsumptionLow,
            telegram.electricity_consumed_low,
            &mut events,
        );
        self.derive_counter(
            CounterField::ProductionHigh,
            telegram.electricity_produced_high,
            &mut events,
        );
        self.derive_counter(
            CounterField::ProductionLow,
            telegram.electricity_produced_low,
            &mut events,
        );
        self.derive_counter(CounterField::Gas, telegram.gas_consumed, &mut events);

        derive_gauge(GaugeField::PowerDraw, telegram.power_draw, &mut events);
        derive_gauge(GaugeField::PowerFeed, telegram.power_feed, &mut events);
        derive_gauge(
            GaugeField::ActiveTariff,
            telegram.active_tariff.map(f64::from),
            &mut events,
        );
        derive_gauge(
            GaugeField::FailuresLong,
            telegram.power_failures_long.map(f64::from),
            &mut events,
        );
        derive_gauge(
            GaugeField::FailuresShort,
            telegram.power_failures_short.map(f64::from),
            &mut events,
        );

        if let Some(failures) = &telegram.failure_events {
            if !failures.is_empty() {
                debug!(
                    "telegram carries {} long power failure event(s)",
                    failures.len()
                );
            }
        }

        events
    }

    fn derive_counter(
        &mut self,
        field: CounterField,
        reading: Option<f64>,
        out: &mut Vec<TelemetryEvent>,
    ) {
        let Some(value) = reading else {
            return;
        };
        let last = self.state.last(field);
        let delta = value - last;
        if delta > 0.0 {
            self.state.set_last(field, value);
            out.push(TelemetryEvent::IncrementCounter {
                counter: field,
                delta,
            });
        } else if delta < 0.0 {
            // Meter reset or decode noise; hold the counter until the
            // reading passes the old mark again.
            warn!("{field:?} reading {value} below stored {last}, holding counter");
        }
    }
}

fn derive_gauge(field: GaugeField, reading: Option<f64>, out: &mut Vec<TelemetryEvent>) {
    if let Some(value) = reading {
        out.push(TelemetryEvent::SetGauge {
            gauge: field,
            value,
        });
    }
}
