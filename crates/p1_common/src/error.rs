//! Error types for telegram acquisition and decoding.

use thiserror::Error;

/// Everything that can go wrong between reading raw lines and producing a
/// decoded telegram. Every variant aborts the current read cycle; none of
/// them leave partial state behind.
#[derive(Error, Debug)]
pub enum TelegramError {
    /// The source could not deliver a telegram (device gone, timeout,
    /// empty read). Carries the source's own description.
    #[error("source I/O error: {0}")]
    Io(String),

    /// The line sequence did not frame a telegram: missing start marker,
    /// checksum trailer before the start marker, malformed trailer, or
    /// input exhausted before the trailer.
    #[error("framing error: {0}")]
    Framing(String),

    /// The CRC16 over the telegram body does not match the trailer.
    #[error("checksum mismatch: telegram says {expected:04X}, computed {computed:04X}")]
    Checksum { expected: u16, computed: u16 },

    /// A line matched a known identifier but its value group(s) did not
    /// decode as the declared type.
    #[error("field {id}: cannot decode {value:?} as {kind}")]
    FieldDecode {
        id: String,
        value: String,
        kind: &'static str,
    },
}

impl TelegramError {
    /// Stable short label for log lines and failure accounting.
    pub fn kind(&self) -> &'static str {
        match self {
            TelegramError::Io(_) => "io",
            TelegramError::Framing(_) => "framing",
            TelegramError::Checksum { .. } => "checksum",
            TelegramError::FieldDecode { .. } => "decode",
        }
    }
}
