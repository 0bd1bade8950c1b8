//! Declarative OBIS field tables.
//!
//! A [`FormatSpec`] describes the lines one meter generation emits:
//! which OBIS identifiers we decode, what shape their value groups
//! have, and which [`Telegram`](crate::telegram::Telegram) field they
//! land in. The parser is table-driven off this; supporting another
//! meter generation means another table, not another parser.

/// How a field's value groups decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// `(000123.456*kWh)` -decimal number with a `*unit` suffix.
    Decimal,
    /// `(0002)` -base-10 integer, leading zeros allowed.
    Integer,
    /// `(181009214805S)` -`YYMMDDhhmmss` plus a DST letter.
    Timestamp,
    /// `(timestamp)(value*unit)` -reading with its capture time.
    TimestampedDecimal,
    /// `(count)(obis-ref)` then `(timestamp)(duration*s)` per event.
    EventLog,
}

/// Which measurement a decoded value lands in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldSlot {
    Timestamp,
    ConsumptionHigh,
    ConsumptionLow,
    ProductionHigh,
    ProductionLow,
    Gas,
    PowerDraw,
    PowerFeed,
    ActiveTariff,
    FailuresLong,
    FailuresShort,
    FailureEventLog,
}

impl FieldSlot {
    /// The value shape this slot decodes from.
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldSlot::Timestamp => FieldKind::Timestamp,
            FieldSlot::ConsumptionHigh
            | FieldSlot::ConsumptionLow
            | FieldSlot::ProductionHigh
            | FieldSlot::ProductionLow
            | FieldSlot::PowerDraw
            | FieldSlot::PowerFeed => FieldKind::Decimal,
            FieldSlot::Gas => FieldKind::TimestampedDecimal,
            FieldSlot::ActiveTariff | FieldSlot::FailuresLong | FieldSlot::FailuresShort => {
                FieldKind::Integer
            }
            FieldSlot::FailureEventLog => FieldKind::EventLog,
        }
    }
}

/// One line the format knows how to decode.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    /// OBIS identifier as it appears before the first `(`.
    pub id: &'static str,
    pub slot: FieldSlot,
    /// Unit suffix the meter sends. Informational: the parser strips
    /// whatever suffix is present and never converts units.
    pub unit: Option<&'static str>,
}

/// A named, identifier-sorted table of [`FieldSpec`]s.
#[derive(Debug, Clone)]
pub struct FormatSpec {
    name: &'static str,
    entries: Vec<FieldSpec>,
}

impl FormatSpec {
    pub fn new(name: &'static str, mut entries: Vec<FieldSpec>) -> Self {
        entries.sort_by(|a, b| a.id.cmp(b.id));
        Self { name, entries }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Look up the spec for a line identifier: exact match first, then
    /// the longest table id that is a prefix of `id`.
    pub fn lookup(&self, id: &str) -> Option<&FieldSpec> {
        if let Ok(index) = self.entries.binary_search_by(|entry| entry.id.cmp(id)) {
            return Some(&self.entries[index]);
        }
        self.entries
            .iter()
            .filter(|entry| id.starts_with(entry.id))
            .max_by_key(|entry| entry.id.len())
    }

    /// The ESMR 5 residential meter format (also fits DSMR 4 meters,
    /// e.g. Landis+Gyr E350 / Sagemcom XS210).
    pub fn esmr5() -> Self {
        Self::new(
            "ESMR5",
            vec![
                FieldSpec {
                    id: "0-0:1.0.0",
                    slot: FieldSlot::Timestamp,
                    unit: None,
                },
                FieldSpec {
                    id: "0-0:96.14.0",
                    slot: FieldSlot::ActiveTariff,
                    unit: None,
                },
                FieldSpec {
                    id: "0-0:96.7.9",
                    slot: FieldSlot::FailuresLong,
                    unit: None,
                },
                FieldSpec {
                    id: "0-0:96.7.21",
                    slot: FieldSlot::FailuresShort,
                    unit: None,
                },
                FieldSpec {
                    id: "0-1:24.2.1",
                    slot: FieldSlot::Gas,
                    unit: Some("m3"),
                },
                FieldSpec {
                    id: "1-0:1.7.0",
                    slot: FieldSlot::PowerDraw,
                    unit: Some("kW"),
                },
                FieldSpec {
                    id: "1-0:1.8.1",
                    slot: FieldSlot::ConsumptionHigh,
                    unit: Some("kWh"),
                },
                FieldSpec {
                    id: "1-0:1.8.2",
                    slot: FieldSlot::ConsumptionLow,
                    unit: Some("kWh"),
                },
                FieldSpec {
                    id: "1-0:2.7.0",
                    slot: FieldSlot::PowerFeed,
                    unit: Some("kW"),
                },
                FieldSpec {
                    id: "1-0:2.8.1",
                    slot: FieldSlot::ProductionHigh,
                    unit: Some("kWh"),
                },
                FieldSpec {
                    id: "1-0:2.8.2",
                    slot: FieldSlot::ProductionLow,
                    unit: Some("kWh"),
                },
                FieldSpec {
                    id: "1-0:99.97.0",
                    slot: FieldSlot::FailureEventLog,
                    unit: None,
                },
            ],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_esmr5_lookup_exact() {
        let format = FormatSpec::esmr5();
        assert_eq!(format.name(), "ESMR5");
        let spec = format.lookup("1-0:1.8.1").unwrap();
        assert_eq!(spec.slot, FieldSlot::ConsumptionHigh);
        assert_eq!(spec.unit, Some("kWh"));
        assert_eq!(spec.slot.kind(), FieldKind::Decimal);
    }

    #[test]
    fn test_unknown_id_has_no_spec() {
        let format = FormatSpec::esmr5();
        assert!(format.lookup("1-0:32.7.0").is_none());
        assert!(format.lookup("").is_none());
    }

    #[test]
    fn test_lookup_prefers_longest_prefix() {
        let format = FormatSpec::new(
            "test",
            vec![
                FieldSpec {
                    id: "1-0:1",
                    slot: FieldSlot::PowerDraw,
                    unit: None,
                },
                FieldSpec {
                    id: "1-0:1.8",
                    slot: FieldSlot::ConsumptionHigh,
                    unit: None,
                },
            ],
        );
        let spec = format.lookup("1-0:1.8.1").unwrap();
        assert_eq!(spec.slot, FieldSlot::ConsumptionHigh);
    }

    #[test]
    fn test_slot_kinds() {
        assert_eq!(FieldSlot::Gas.kind(), FieldKind::TimestampedDecimal);
        assert_eq!(FieldSlot::ActiveTariff.kind(), FieldKind::Integer);
        assert_eq!(FieldSlot::Timestamp.kind(), FieldKind::Timestamp);
        assert_eq!(FieldSlot::FailureEventLog.kind(), FieldKind::EventLog);
    }
}
