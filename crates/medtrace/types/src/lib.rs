//! medtrace core types
//!
//! This crate defines the record the provenance ledger stores for every
//! tracked pharmaceutical unit:
//! - [`Medicine`]: provenance, custody endpoints and journey state
//! - [`CustodyPair`]: the sender/receiver pair moved by a custody transfer
//! - [`CalendarDate`]: caller-supplied manufacture/expiry dates
//!
//! Records are stored as a single JSON object per key. Field names on the
//! wire follow the layout already present in deployed ledgers, so the codec
//! here must stay backward compatible.

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]

mod custody;
mod date;
mod medicine;
mod seed;

pub use custody::CustodyPair;
pub use date::CalendarDate;
pub use medicine::{parse_journey_flag, Medicine};
pub use seed::seed_catalogue;
