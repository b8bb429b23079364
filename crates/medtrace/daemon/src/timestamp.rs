use chrono::{DateTime, Utc};

/// Layout of the `TimeStamp` field stamped on created and updated records.
pub const LEDGER_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S %z %Z";

/// Render `at` in the ledger's timestamp layout, e.g.
/// `2024-03-01 10:15:30 +0000 UTC`.
pub fn ledger_timestamp(at: DateTime<Utc>) -> String {
    at.format(LEDGER_TIMESTAMP_FORMAT).to_string()
}
