//! Telegram framing and checksum verification.
//!
//! A source hands us raw lines as they came off the wire. This module
//! finds the frame boundaries (`/` identification line through `!`
//! checksum trailer), verifies the CRC-16/ARC trailer over the raw
//! bytes, and produces a [`RawTelegram`] for field decoding.

use crc::{Crc, CRC_16_ARC};

use crate::error::TelegramError;
use crate::telegram::RawTelegram;

const CRC16: Crc<u16> = Crc::<u16>::new(&CRC_16_ARC);

/// Compute the CRC-16/ARC checksum the meter appends to each telegram.
///
/// Public so tests and tooling can forge valid trailers for synthetic
/// telegrams.
pub fn crc16_arc(bytes: &[u8]) -> u16 {
    CRC16.checksum(bytes)
}

/// Framing rules for one meter generation.
#[derive(Debug, Clone)]
pub struct ReaderOptions {
    /// Character that opens the identification line.
    pub start_marker: char,
    /// Character that opens the checksum trailer.
    pub checksum_marker: char,
    /// Verify the CRC trailer. Disable for pre-ESMR4 meters whose
    /// trailer is a bare `!`.
    pub verify_checksum: bool,
}

impl ReaderOptions {
    /// Framing for ESMR 5 and DSMR 4 meters.
    pub fn esmr5() -> Self {
        Self {
            start_marker: '/',
            checksum_marker: '!',
            verify_checksum: true,
        }
    }
}

/// Assemble raw lines into one framed telegram.
///
/// `lines` must keep their original line endings: the checksum is
/// defined over the raw bytes from the start marker through the
/// checksum marker inclusive, so every `\r\n` counts. Noise before the
/// start marker (the tail of a telegram we joined halfway through) is
/// discarded, except a checksum trailer, which means the frame is out
/// of order. Content lines in the result are trimmed and blank lines
/// are dropped.
pub fn read_telegram(
    lines: &[String],
    options: &ReaderOptions,
) -> Result<RawTelegram, TelegramError> {
    let mut start = None;
    for (index, line) in lines.iter().enumerate() {
        if line.starts_with(options.start_marker) {
            start = Some(index);
            break;
        }
        if line.starts_with(options.checksum_marker) {
            return Err(TelegramError::Framing(
                "checksum trailer before start marker".into(),
            ));
        }
    }
    let start =
        start.ok_or_else(|| TelegramError::Framing("no start marker in input".into()))?;

    let marker_len = options.checksum_marker.len_utf8();
    let mut raw = Vec::new();
    let mut identification = String::new();
    let mut content = Vec::new();
    let mut trailer: Option<&str> = None;

    for (index, line) in lines[start..].iter().enumerate() {
        let trimmed = line.trim_end_matches(['\r', '\n']);
        if index == 0 {
            raw.extend_from_slice(line.as_bytes());
            identification = trimmed.to_string();
            continue;
        }
        if trimmed.starts_with(options.checksum_marker) {
            // The checksum covers everything up to and including the marker.
            raw.extend_from_slice(&line.as_bytes()[..marker_len]);
            trailer = Some(&trimmed[marker_len..]);
            break;
        }
        raw.extend_from_slice(line.as_bytes());
        if !trimmed.is_empty() {
            content.push(trimmed.to_string());
        }
    }

    let trailer =
        trailer.ok_or_else(|| TelegramError::Framing("telegram has no checksum trailer".into()))?;

    let checksum = match u16::from_str_radix(trailer.trim(), 16) {
        Ok(value) => value,
        Err(_) if !options.verify_checksum => 0,
        Err(_) => {
            return Err(TelegramError::Framing(format!(
                "checksum trailer is not hex: {trailer:?}"
            )))
        }
    };

    if options.verify_checksum {
        let computed = crc16_arc(&raw);
        if computed != checksum {
            return Err(TelegramError::Checksum {
                expected: checksum,
                computed,
            });
        }
    }

    Ok(RawTelegram {
        identification,
        lines: content,
        checksum,
    })
}
