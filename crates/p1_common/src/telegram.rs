//! Telegram data model.
//!
//! A P1 telegram arrives as a framed block of ASCII lines. [`RawTelegram`]
//! is the validated frame (identification line, content lines, checksum
//! trailer); [`Telegram`] is the decoded measurement record. Every
//! measurement field is optional: a meter that does not report a field
//! simply omits the line, and "absent" must never be confused with
//! "present with value zero"; the counter derivation depends on that.

use chrono::NaiveDateTime;
use serde::Serialize;

/// One validated telegram frame, before field decoding.
///
/// `lines` holds the trimmed content lines strictly between the start
/// marker line and the checksum trailer. Produced by
/// [`crate::reader::read_telegram`], consumed immediately by
/// [`crate::parser::parse_telegram`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTelegram {
    /// The start line that identifies the meter, e.g. `/XMX5LGBBFG1009021021`.
    pub identification: String,
    /// Trimmed content lines in arrival order.
    pub lines: Vec<String>,
    /// The 16-bit checksum parsed from the trailer.
    pub checksum: u16,
}

/// One long power failure from the `1-0:99.97.0` event log.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PowerFailure {
    /// Timestamp of the end of the failure.
    pub end_time: NaiveDateTime,
    /// Failure duration in seconds.
    pub duration_secs: u64,
}

/// A decoded measurement record.
///
/// Fields are `None` when the corresponding line was not present in the
/// telegram. Cumulative totals (kWh, m³) only ever grow over the meter's
/// lifetime; instantaneous values (kW, tariff, failure counts) are valid
/// only at read time.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Telegram {
    /// `0-0:1.0.0` -timestamp the meter stamped on this telegram.
    pub timestamp: Option<NaiveDateTime>,
    /// `1-0:1.8.1` -cumulative consumption, high tariff, kWh.
    pub electricity_consumed_high: Option<f64>,
    /// `1-0:1.8.2` -cumulative consumption, low tariff, kWh.
    pub electricity_consumed_low: Option<f64>,
    /// `1-0:2.8.1` -cumulative production, high tariff, kWh.
    pub electricity_produced_high: Option<f64>,
    /// `1-0:2.8.2` -cumulative production, low tariff, kWh.
    pub electricity_produced_low: Option<f64>,
    /// `0-1:24.2.1` -cumulative gas consumption, m³.
    pub gas_consumed: Option<f64>,
    /// `1-0:1.7.0` -electricity currently drawn from the grid, kW.
    pub power_draw: Option<f64>,
    /// `1-0:2.7.0` -electricity currently fed into the grid, kW.
    pub power_feed: Option<f64>,
    /// `0-0:96.14.0` -tariff currently active (1 = low, 2 = high).
    pub active_tariff: Option<u32>,
    /// `0-0:96.7.9` -lifetime count of long power failures.
    pub power_failures_long: Option<u32>,
    /// `0-0:96.7.21` -lifetime count of short power failures.
    pub power_failures_short: Option<u32>,
    /// `1-0:99.97.0` -long power failure event log.
    pub failure_events: Option<Vec<PowerFailure>>,
}
