//! Prometheus metric registry for the exporter.

use std::sync::Arc;

use p1_common::{CounterField, GaugeField, TelemetryEvent};
use prometheus::{
    register_counter_with_registry, register_gauge_with_registry, Counter, Encoder, Gauge,
    Registry, TextEncoder,
};

/// The ten exported series. Names and help strings are what existing
/// dashboards scrape; do not rename them.
#[derive(Clone)]
pub struct P1Metrics {
    pub consumption_high: Counter,
    pub consumption_low: Counter,
    pub production_high: Counter,
    pub production_low: Counter,
    pub gas_consumption: Counter,
    pub actual_consumption: Gauge,
    pub actual_production: Gauge,
    pub active_tariff: Gauge,
    pub power_failures_long: Gauge,
    pub power_failures_short: Gauge,
    registry: Arc<Registry>,
}

impl P1Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let consumption_high = register_counter_with_registry!(
            "p1_consumption_electricity_high",
            "1.8.1 - Electricity consumption high tariff in kWh",
            registry
        )
        .unwrap();

        let consumption_low = register_counter_with_registry!(
            "p1_consumption_electricity_low",
            "1.8.2 - Electricity consumption low tariff in kWh",
            registry
        )
        .unwrap();

        let production_high = register_counter_with_registry!(
            "p1_production_electricity_high",
            "2.8.1 - Electricity production high tariff in kWh",
            registry
        )
        .unwrap();

        let production_low = register_counter_with_registry!(
            "p1_production_electricity_low",
            "2.8.2 - Electricity production low tariff in kWh",
            registry
        )
        .unwrap();

        let gas_consumption = register_counter_with_registry!(
            "p1_consumption_gas",
            "24.2.1 - Gas usage in m³",
            registry
        )
        .unwrap();

        let actual_consumption = register_gauge_with_registry!(
            "p1_actual_electricity_consumption",
            "1.7.0 - Actual electricity power consumption in kW",
            registry
        )
        .unwrap();

        let actual_production = register_gauge_with_registry!(
            "p1_actual_electricity_production",
            "2.7.0 - Actual electricity power production in kW",
            registry
        )
        .unwrap();

        let active_tariff = register_gauge_with_registry!(
            "p1_active_tariff",
            "96.14.0 - Active tariff",
            registry
        )
        .unwrap();

        let power_failures_long = register_gauge_with_registry!(
            "p1_power_failures_long",
            "96.7.9 - Power failures long count",
            registry
        )
        .unwrap();

        let power_failures_short = register_gauge_with_registry!(
            "p1_power_failures_short",
            "96.7.21 - Power failures short count",
            registry
        )
        .unwrap();

        Self {
            consumption_high,
            consumption_low,
            production_high,
            production_low,
            gas_consumption,
            actual_consumption,
            actual_production,
            active_tariff,
            power_failures_long,
            power_failures_short,
            registry: Arc::new(registry),
        }
    }

    /// Apply one derived telemetry event to the registry.
    pub fn apply(&self, event: &TelemetryEvent) {
        match *event {
            TelemetryEvent::IncrementCounter { counter, delta } => {
                self.counter(counter).inc_by(delta);
            }
            TelemetryEvent::SetGauge { gauge, value } => {
                self.gauge(gauge).set(value);
            }
        }
    }

    fn counter(&self, field: CounterField) -> &Counter {
        match field {
            CounterField::ConsumptionHigh => &self.consumption_high,
            CounterField::ConsumptionLow => &self.consumption_low,
            CounterField::ProductionHigh => &self.production_high,
            CounterField::ProductionLow => &self.production_low,
            CounterField::Gas => &self.gas_consumption,
        }
    }

    fn gauge(&self, field: GaugeField) -> &Gauge {
        match field {
            GaugeField::PowerDraw => &self.actual_consumption,
            GaugeField::PowerFeed => &self.actual_production,
            GaugeField::ActiveTariff => &self.active_tariff,
            GaugeField::FailuresLong => &self.power_failures_long,
            GaugeField::FailuresShort => &self.power_failures_short,
        }
    }

    /// Export metrics in Prometheus text format
    pub fn export(&self) -> String {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer).unwrap();
        String::from_utf8(buffer).unwrap()
    }
}

impl Default for P1Metrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_counter_and_gauge_events() {
        let metrics = P1Metrics::new();
        metrics.apply(&TelemetryEvent::IncrementCounter {
            counter: CounterField::Gas,
            delta: 1019.003,
        });
        metrics.apply(&TelemetryEvent::SetGauge {
            gauge: GaugeField::ActiveTariff,
            value: 2.0,
        });
        assert_eq!(metrics.gas_consumption.get(), 1019.003);
        assert_eq!(metrics.active_tariff.get(), 2.0);
    }

    #[test]
    fn test_counters_accumulate_across_events() {
        let metrics = P1Metrics::new();
        for _ in 0..2 {
            metrics.apply(&TelemetryEvent::IncrementCounter {
                counter: CounterField::ConsumptionHigh,
                delta: 1.5,
            });
        }
        assert_eq!(metrics.consumption_high.get(), 3.0);
    }

    #[test]
    fn test_export_renders_all_series() {
        let metrics = P1Metrics::new();
        let text = metrics.export();
        for name in [
            "p1_consumption_electricity_high",
            "p1_consumption_electricity_low",
            "p1_production_electricity_high",
            "p1_production_electricity_low",
            "p1_consumption_gas",
            "p1_actual_electricity_consumption",
            "p1_actual_electricity_production",
            "p1_active_tariff",
            "p1_power_failures_long",
            "p1_power_failures_short",
        ] {
            assert!(text.contains(name), "missing {name} in export");
        }
        assert!(text.contains("# HELP p1_active_tariff 96.14.0 - Active tariff"));
    }
}
