//! Mock-source pipeline tests: raw lines through framing, decoding,
//! derivation and the Prometheus registry.

use std::sync::Arc;
use std::time::Duration;

use approx::assert_relative_eq;
use p1_common::{FormatSpec, ReaderOptions};
use p1d::exporter::{Exporter, LoopState};
use p1d::metrics::P1Metrics;
use p1d::source::{MeterSource, MockSource};

fn mock_exporter(source: MockSource, metrics: Arc<P1Metrics>) -> Exporter {
    Exporter::new(
        MeterSource::Mock(source),
        ReaderOptions::esmr5(),
        FormatSpec::esmr5(),
        metrics,
        Duration::from_secs(10),
        10,
    )
}

#[tokio::test]
async fn test_first_cycle_exports_sample_values() {
    let metrics = Arc::new(P1Metrics::new());
    let mut exporter = mock_exporter(MockSource::new(), Arc::clone(&metrics));
    exporter.run_cycle().await.unwrap();

    assert_relative_eq!(metrics.consumption_high.get(), 1225.59);
    assert_relative_eq!(metrics.consumption_low.get(), 1179.186);
    // Production high reads 0.000 in the sample; a zero diff never
    // moves a counter.
    assert_relative_eq!(metrics.production_high.get(), 0.0);
    assert_relative_eq!(metrics.production_low.get(), 0.016);
    assert_relative_eq!(metrics.gas_consumption.get(), 1019.003);
    assert_relative_eq!(metrics.actual_consumption.get(), 0.0);
    assert_relative_eq!(metrics.actual_production.get(), 0.2);
    assert_relative_eq!(metrics.active_tariff.get(), 2.0);
    assert_relative_eq!(metrics.power_failures_long.get(), 2.0);
    assert_relative_eq!(metrics.power_failures_short.get(), 57.0);
}

#[tokio::test]
async fn test_repeated_cycles_hold_counters_steady() {
    let metrics = Arc::new(P1Metrics::new());
    let mut exporter = mock_exporter(MockSource::new(), Arc::clone(&metrics));
    for _ in 0..3 {
        exporter.run_cycle().await.unwrap();
    }
    // The sample repeats identical readings; counters must not grow.
    assert_relative_eq!(metrics.consumption_high.get(), 1225.59);
    assert_relative_eq!(metrics.production_low.get(), 0.016);
    assert_relative_eq!(metrics.gas_consumption.get(), 1019.003);
    assert_relative_eq!(metrics.active_tariff.get(), 2.0);
}

#[tokio::test]
async fn test_cycles_run_strictly_in_sequence() {
    let metrics = Arc::new(P1Metrics::new());
    let mut exporter = mock_exporter(MockSource::new(), Arc::clone(&metrics));
    for expected_reads in 1u32..=3 {
        exporter.run_cycle().await.unwrap();
        match exporter.source() {
            MeterSource::Mock(mock) => assert_eq!(mock.reads(), expected_reads),
            _ => unreachable!(),
        }
    }
}

#[tokio::test(start_paused = true)]
async fn test_loop_survives_short_outage_and_exports() {
    let metrics = Arc::new(P1Metrics::new());
    let mut exporter = mock_exporter(MockSource::failing_first(3), Arc::clone(&metrics));
    let outcome = tokio::time::timeout(Duration::from_secs(100), exporter.run()).await;
    assert!(outcome.is_err(), "loop terminated during a survivable outage");
    assert_eq!(exporter.state(), LoopState::Running);
    assert_relative_eq!(metrics.consumption_high.get(), 1225.59);
}

#[tokio::test]
async fn test_scrape_after_cycle_contains_values() {
    let metrics = Arc::new(P1Metrics::new());
    let mut exporter = mock_exporter(MockSource::new(), Arc::clone(&metrics));
    exporter.run_cycle().await.unwrap();
    let text = metrics.export();
    assert!(text.contains("p1_consumption_electricity_high 1225.59"));
    assert!(text.contains("p1_active_tariff 2"));
    assert!(text.contains("p1_power_failures_short 57"));
}
