//! P1 Common - telegram protocol library for the p1d exporter.
//!
//! Everything here is pure protocol and state logic with no I/O:
//! framing and checksum verification, the OBIS format table, field
//! decoding, and telemetry derivation. The daemon crate supplies the
//! sources and the HTTP surface.

pub mod derive;
pub mod error;
pub mod format;
pub mod parser;
pub mod reader;
pub mod sample;
pub mod telegram;

pub use derive::*;
pub use error::*;
pub use format::*;
pub use parser::*;
pub use reader::*;
pub use sample::*;
pub use telegram::*;
