//! Oracle DATE values
//!
//! Oracle DATE always carries a time of day. Columns declared as date-only
//! keep the time at midnight; the textual form accepted here is
//! `YYYY-MM-DD` optionally followed by `HH:MM:SS` (space or `T` separated).

use std::fmt;

use crate::error::{Error, Result};

/// Oracle DATE
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct OracleDate {
    /// Year (e.g., 2024)
    pub year: i32,
    /// Month (1-12)
    pub month: u8,
    /// Day (1-31)
    pub day: u8,
    /// Hour (0-23)
    pub hour: u8,
    /// Minute (0-59)
    pub minute: u8,
    /// Second (0-59)
    pub second: u8,
}

impl OracleDate {
    /// Create a new Oracle date
    pub fn new(year: i32, month: u8, day: u8, hour: u8, minute: u8, second: u8) -> Self {
        Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
        }
    }

    /// Create a date-only value (time set to 00:00:00)
    pub fn date(year: i32, month: u8, day: u8) -> Self {
        Self::new(year, month, day, 0, 0, 0)
    }

    /// Drop the time of day
    pub fn truncate_time(self) -> Self {
        Self::date(self.year, self.month, self.day)
    }

    /// Check if the time of day is midnight
    pub fn is_date_only(&self) -> bool {
        self.hour == 0 && self.minute == 0 && self.second == 0
    }

    /// Parse `YYYY-MM-DD[ HH:MM:SS]`
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        let (date_part, time_part) = match s.find([' ', 'T']) {
            Some(pos) => (&s[..pos], Some(s[pos + 1..].trim())),
            None => (s, None),
        };

        let mut date_fields = date_part.splitn(3, '-');
        let year = parse_field::<i32>(date_fields.next(), s)?;
        let month = parse_field::<u8>(date_fields.next(), s)?;
        let day = parse_field::<u8>(date_fields.next(), s)?;

        let (hour, minute, second) = match time_part {
            Some(t) if !t.is_empty() => {
                let mut time_fields = t.splitn(3, ':');
                (
                    parse_field::<u8>(time_fields.next(), s)?,
                    parse_field::<u8>(time_fields.next(), s)?,
                    parse_field::<u8>(time_fields.next(), s)?,
                )
            }
            _ => (0, 0, 0),
        };

        if !(1..=12).contains(&month) || !(1..=31).contains(&day) || hour > 23 || minute > 59 || second > 59 {
            return Err(Error::DataConversion(format!("date out of range: {s}")));
        }

        Ok(Self::new(year, month, day, hour, minute, second))
    }
}

fn parse_field<T: std::str::FromStr>(field: Option<&str>, input: &str) -> Result<T> {
    field
        .and_then(|f| f.trim().parse::<T>().ok())
        .ok_or_else(|| Error::DataConversion(format!("invalid date: {input}")))
}

impl fmt::Display for OracleDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}
