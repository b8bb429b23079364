//! Caller-supplied calendar dates

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

const ACCEPTED_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%d-%m-%Y", "%d/%m/%Y"];

/// Manufacture or expiry date as supplied by the caller.
///
/// The ledger stores the original text untouched. [`CalendarDate::to_naive_date`]
/// gives a lenient typed view for consumers that need one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CalendarDate(String);

impl CalendarDate {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Parse the stored text, if it is in one of the common day formats.
    pub fn to_naive_date(&self) -> Option<NaiveDate> {
        let raw = self.0.trim();
        ACCEPTED_FORMATS
            .iter()
            .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
    }
}

impl From<&str> for CalendarDate {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}

impl From<String> for CalendarDate {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

impl From<NaiveDate> for CalendarDate {
    fn from(date: NaiveDate) -> Self {
        Self(date.format("%Y-%m-%d").to_string())
    }
}

impl fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
