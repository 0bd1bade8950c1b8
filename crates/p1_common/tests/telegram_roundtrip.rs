//! End-to-end decode of the checked-in sample telegram.

use chrono::NaiveDate;
use p1_common::{
    crc16_arc, parse_telegram, read_telegram, sample_lines, FormatSpec, ReaderOptions,
    TelegramError,
};

/// Append a freshly computed CRC trailer to telegram content lines.
fn reframe(content: Vec<String>) -> Vec<String> {
    let mut raw: Vec<u8> = content.iter().flat_map(|line| line.bytes()).collect();
    raw.push(b'!');
    let checksum = crc16_arc(&raw);
    let mut lines = content;
    lines.push(format!("!{checksum:04X}\r\n"));
    lines
}

#[test]
fn test_sample_telegram_round_trip() {
    let raw = read_telegram(&sample_lines(), &ReaderOptions::esmr5()).unwrap();
    assert_eq!(raw.identification, "/XMX5LGBBFG1009021021");
    assert_eq!(raw.checksum, 0x44E5);

    let telegram = parse_telegram(&raw, &FormatSpec::esmr5()).unwrap();
    assert_eq!(telegram.electricity_consumed_high, Some(1225.59));
    assert_eq!(telegram.electricity_consumed_low, Some(1179.186));
    assert_eq!(telegram.electricity_produced_high, Some(0.0));
    assert_eq!(telegram.electricity_produced_low, Some(0.016));
    assert_eq!(telegram.power_draw, Some(0.0));
    assert_eq!(telegram.power_feed, Some(0.2));
    assert_eq!(telegram.active_tariff, Some(2));
    assert_eq!(telegram.power_failures_long, Some(2));
    assert_eq!(telegram.power_failures_short, Some(57));
    assert_eq!(telegram.gas_consumed, Some(1019.003));
    assert_eq!(
        telegram.timestamp,
        Some(
            NaiveDate::from_ymd_opt(2018, 10, 9)
                .unwrap()
                .and_hms_opt(21, 48, 5)
                .unwrap()
        )
    );

    let events = telegram.failure_events.unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].duration_secs, 236);
    assert_eq!(
        events[0].end_time,
        NaiveDate::from_ymd_opt(2018, 4, 17)
            .unwrap()
            .and_hms_opt(20, 14, 58)
            .unwrap()
    );
}

#[test]
fn test_tampered_trailer_yields_no_record() {
    let mut lines = sample_lines();
    *lines.last_mut().unwrap() = "!44E4\r\n".to_string();
    let err = read_telegram(&lines, &ReaderOptions::esmr5()).unwrap_err();
    assert!(matches!(
        err,
        TelegramError::Checksum {
            expected: 0x44E4,
            computed: 0x44E5,
        }
    ));
}

#[test]
fn test_tampered_body_yields_no_record() {
    let mut lines = sample_lines();
    let slot = lines
        .iter()
        .position(|l| l.starts_with("1-0:1.8.1"))
        .unwrap();
    lines[slot] = "1-0:1.8.1(009225.590*kWh)\r\n".to_string();
    let err = read_telegram(&lines, &ReaderOptions::esmr5()).unwrap_err();
    assert_eq!(err.kind(), "checksum");
}

#[test]
fn test_unknown_line_does_not_change_the_parse() {
    let format = FormatSpec::esmr5();
    let options = ReaderOptions::esmr5();

    let baseline =
        parse_telegram(&read_telegram(&sample_lines(), &options).unwrap(), &format).unwrap();

    let mut content = sample_lines();
    content.pop();
    content.insert(3, "0-0:17.0.0(999.9*kW)\r\n".to_string());
    let extended = reframe(content);

    let telegram =
        parse_telegram(&read_telegram(&extended, &options).unwrap(), &format).unwrap();
    assert_eq!(telegram, baseline);
}

#[test]
fn test_lowercase_trailer_accepted() {
    let mut lines = sample_lines();
    *lines.last_mut().unwrap() = "!44e5\r\n".to_string();
    let raw = read_telegram(&lines, &ReaderOptions::esmr5()).unwrap();
    assert_eq!(raw.checksum, 0x44E5);
}

#[test]
fn test_partial_telegram_leaves_fields_absent() {
    let lines = reframe(vec![
        "/TST5METER001\r\n".to_string(),
        "\r\n".to_string(),
        "0-0:96.14.0(0001)\r\n".to_string(),
    ]);
    let raw = read_telegram(&lines, &ReaderOptions::esmr5()).unwrap();
    assert_eq!(raw.checksum, 0xF920);

    let telegram = parse_telegram(&raw, &FormatSpec::esmr5()).unwrap();
    assert_eq!(telegram.active_tariff, Some(1));
    assert_eq!(telegram.electricity_consumed_high, None);
    assert_eq!(telegram.gas_consumed, None);
    assert_eq!(telegram.timestamp, None);
    assert_eq!(telegram.failure_events, None);
}
