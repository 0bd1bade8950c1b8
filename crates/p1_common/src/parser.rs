//! Table-driven telegram field decoding.
//!
//! Takes the content lines of a validated [`RawTelegram`] and a
//! [`FormatSpec`], and produces a [`Telegram`] record. Lines whose
//! identifier the format does not know are skipped so that newer meter
//! firmware does not break us; a line we do claim to know must decode
//! cleanly or the whole telegram is rejected.

use chrono::NaiveDateTime;

use crate::error::TelegramError;
use crate::format::{FieldSlot, FormatSpec};
use crate::telegram::{PowerFailure, RawTelegram, Telegram};

/// Decode all recognized lines of `raw` into a measurement record.
///
/// Duplicate lines for the same identifier are legal; the last one
/// wins. Fields without a matching line stay `None`.
pub fn parse_telegram(raw: &RawTelegram, format: &FormatSpec) -> Result<Telegram, TelegramError> {
    let mut telegram = Telegram::default();

    for line in &raw.lines {
        let Some(paren) = line.find('(') else {
            continue;
        };
        let (id, rest) = line.split_at(paren);
        let Some(spec) = format.lookup(id) else {
            continue;
        };
        let groups = split_groups(id, rest)?;

        match spec.slot {
            FieldSlot::Timestamp => {
                telegram.timestamp = Some(decode_timestamp(id, single_group(id, rest, &groups)?)?);
            }
            FieldSlot::ConsumptionHigh => {
                telegram.electricity_consumed_high =
                    Some(decode_decimal(id, single_group(id, rest, &groups)?)?);
            }
            FieldSlot::ConsumptionLow => {
                telegram.electricity_consumed_low =
                    Some(decode_decimal(id, single_group(id, rest, &groups)?)?);
            }
            FieldSlot::ProductionHigh => {
                telegram.electricity_produced_high =
                    Some(decode_decimal(id, single_group(id, rest, &groups)?)?);
            }
            FieldSlot::ProductionLow => {
                telegram.electricity_produced_low =
                    Some(decode_decimal(id, single_group(id, rest, &groups)?)?);
            }
            FieldSlot::Gas => {
                telegram.gas_consumed = Some(decode_timestamped_decimal(id, rest, &groups)?);
            }
            FieldSlot::PowerDraw => {
                telegram.power_draw = Some(decode_decimal(id, single_group(id, rest, &groups)?)?);
            }
            FieldSlot::PowerFeed => {
                telegram.power_feed = Some(decode_decimal(id, single_group(id, rest, &groups)?)?);
            }
            FieldSlot::ActiveTariff => {
                telegram.active_tariff =
                    Some(decode_integer(id, single_group(id, rest, &groups)?)?);
            }
            FieldSlot::FailuresLong => {
                telegram.power_failures_long =
                    Some(decode_integer(id, single_group(id, rest, &groups)?)?);
            }
            FieldSlot::FailuresShort => {
                telegram.power_failures_short =
                    Some(decode_integer(id, single_group(id, rest, &groups)?)?);
            }
            FieldSlot::FailureEventLog => {
                telegram.failure_events = Some(decode_event_log(id, rest, &groups)?);
            }
        }
    }

    Ok(telegram)
}

fn decode_error(id: &str, value: &str, kind: &'static str) -> TelegramError {
    TelegramError::FieldDecode {
        id: id.to_string(),
        value: value.to_string(),
        kind,
    }
}

/// Split `(a)(b)(c)` into `["a", "b", "c"]`. `rest` starts at the first
/// `(` of the line; anything outside a balanced group is malformed.
fn split_groups<'a>(id: &str, rest: &'a str) -> Result<Vec<&'a str>, TelegramError> {
    let mut groups = Vec::new();
    let mut remainder = rest;
    while !remainder.is_empty() {
        let (inner, after) = remainder
            .strip_prefix('(')
            .and_then(|r| r.split_once(')'))
            .ok_or_else(|| decode_error(id, rest, "value group"))?;
        groups.push(inner);
        remainder = after;
    }
    Ok(groups)
}

fn single_group<'a>(id: &str, rest: &str, groups: &[&'a str]) -> Result<&'a str, TelegramError> {
    match groups {
        [group] => Ok(group),
        _ => Err(decode_error(id, rest, "value group")),
    }
}

/// `000123.456*kWh` style value. The unit suffix is stripped, not
/// checked; the decimal point is always `.`.
fn decode_decimal(id: &str, group: &str) -> Result<f64, TelegramError> {
    let number = match group.split_once('*') {
        Some((value, _unit)) => value,
        None => group,
    };
    let value: f64 = number
        .parse()
        .map_err(|_| decode_error(id, group, "decimal"))?;
    // f64::from_str happily parses "NaN" and "inf"; a meter never sends those.
    if !value.is_finite() {
        return Err(decode_error(id, group, "decimal"));
    }
    Ok(value)
}

fn decode_integer(id: &str, group: &str) -> Result<u32, TelegramError> {
    group
        .parse()
        .map_err(|_| decode_error(id, group, "integer"))
}

/// `YYMMDDhhmmss` with an optional trailing DST letter (`S` summer,
/// `W` winter). The letter is dropped; the timestamp stays naive.
fn decode_timestamp(id: &str, group: &str) -> Result<NaiveDateTime, TelegramError> {
    let digits = group.trim_end_matches(['S', 'W']);
    NaiveDateTime::parse_from_str(digits, "%y%m%d%H%M%S")
        .map_err(|_| decode_error(id, group, "timestamp"))
}

/// `(timestamp)(value*unit)` pair as the gas meter sends it. The
/// capture timestamp must be well-formed but is not retained.
fn decode_timestamped_decimal(
    id: &str,
    rest: &str,
    groups: &[&str],
) -> Result<f64, TelegramError> {
    match groups {
        [timestamp, value] => {
            decode_timestamp(id, timestamp)?;
            decode_decimal(id, value)
        }
        _ => Err(decode_error(id, rest, "value group")),
    }
}

/// `(count)(obis-ref)` followed by one `(timestamp)(duration*s)` pair
/// per event. The pair count must match the declared count.
fn decode_event_log(
    id: &str,
    rest: &str,
    groups: &[&str],
) -> Result<Vec<PowerFailure>, TelegramError> {
    if groups.len() < 2 {
        return Err(decode_error(id, rest, "event log"));
    }
    let declared: u32 = groups[0]
        .parse()
        .map_err(|_| decode_error(id, groups[0], "event count"))?;
    let pairs = &groups[2..];
    // A u32 count doubled always fits in u64.
    if pairs.len() as u64 != u64::from(declared) * 2 {
        return Err(decode_error(id, rest, "event count"));
    }

    let mut events = Vec::with_capacity(pairs.len() / 2);
    for pair in pairs.chunks(2) {
        let end_time = decode_timestamp(id, pair[0])?;
        let duration = match pair[1].split_once('*') {
            Some((value, _unit)) => value,
            None => pair[1],
        };
        let duration_secs: u64 = duration
            .parse()
            .map_err(|_| decode_error(id, pair[1], "event duration"))?;
        events.push(PowerFailure {
            end_time,
            duration_secs,
        });
    }
    Ok(events)
}
