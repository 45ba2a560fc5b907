//! Second-resolution wall-clock timestamps.
//!
//! Timestamps are kept in their fixed-width textual form,
//! `YYYY-MM-DD HH:MM:SS`. Because every field is zero-padded and ordered from
//! most to least significant, comparing two timestamps as strings is the same
//! as comparing them chronologically. That property is what last-write-wins
//! relies on, so the type refuses anything that does not have exactly this
//! shape or does not name a real calendar second (`2024-02-31` is rejected).
//!
//! The engine never reads the clock itself; callers produce a `Timestamp`
//! from their own time source (see [`TIMESTAMP_FORMAT`]).

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// strftime-style pattern that renders a valid [`Timestamp`].
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const LEN: usize = 19;

/// A validated `YYYY-MM-DD HH:MM:SS` timestamp.
///
/// Ordering is plain lexicographic ordering of the underlying string, which
/// for this format equals chronological ordering. No timezone is attached:
/// nodes stamp their local time, and clock skew between nodes is accepted as
/// a known limitation of timestamp-based conflict resolution.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Timestamp(String);

impl Timestamp {
    /// Parse and validate a timestamp.
    pub fn parse(value: &str) -> Result<Self> {
        if is_well_formed(value) {
            Ok(Self(value.to_string()))
        } else {
            Err(Error::InvalidTimestamp(value.to_string()))
        }
    }

    /// The timestamp as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The later of two timestamps.
    pub fn latest<'a>(&'a self, other: &'a Timestamp) -> &'a Timestamp {
        if other > self {
            other
        } else {
            self
        }
    }
}

fn is_well_formed(value: &str) -> bool {
    let bytes = value.as_bytes();
    if bytes.len() != LEN {
        return false;
    }

    for (i, b) in bytes.iter().enumerate() {
        let ok = match i {
            4 | 7 => *b == b'-',
            10 => *b == b' ',
            13 | 16 => *b == b':',
            _ => b.is_ascii_digit(),
        };
        if !ok {
            return false;
        }
    }

    let field = |start: usize| -> u32 { value[start..start + 2].parse().unwrap_or(u32::MAX) };

    let year = value[0..4].parse().unwrap_or(0);
    let month = field(5);
    let day = field(8);
    let hour = field(11);
    let minute = field(14);
    let second = field(17);

    (1..=12).contains(&month)
        && day >= 1
        && day <= days_in_month(year, month)
        && hour <= 23
        && minute <= 59
        && second <= 59
}

fn days_in_month(year: u32, month: u32) -> u32 {
    match month {
        2 if year % 4 == 0 && (year % 100 != 0 || year % 400 == 0) => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Timestamp {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Timestamp {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        if is_well_formed(&value) {
            Ok(Self(value))
        } else {
            Err(Error::InvalidTimestamp(value))
        }
    }
}

impl From<Timestamp> for String {
    fn from(ts: Timestamp) -> Self {
        ts.0
    }
}

impl AsRef<str> for Timestamp {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
