//! The canonical calendar value the codecs convert to and from.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, Utc};

use crate::{Error, Result};

/// Display template shared by all formats: 4-digit year through 6-digit
/// microseconds.
pub const DISPLAY_FMT: &str = "%Y-%m-%d %H:%M:%S%.6f";

// Accepted free-text layouts, tried in order. The zoned set is attempted
// first so a trailing offset is captured rather than rejected.
const ZONED_FMTS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f %z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
];
const NAIVE_FMTS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S%.f",
];
const DATE_FMTS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];

/// A calendar instant with an optional fixed UTC offset, east-positive
/// seconds. The wall-clock fields are kept as written; arithmetic against
/// an epoch always goes through [`DateTime::unix_micros`], which reduces
/// to UTC first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateTime {
    naive: NaiveDateTime,
    offset: Option<i32>,
}

impl DateTime {
    pub fn new(naive: NaiveDateTime) -> Self {
        Self { naive, offset: None }
    }

    pub fn with_offset(naive: NaiveDateTime, offset_secs: i32) -> Self {
        Self {
            naive,
            offset: Some(offset_secs),
        }
    }

    pub fn now() -> Self {
        Self::new(Utc::now().naive_utc())
    }

    /// Parse a free-text date string, trying each accepted layout in order.
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();
        for fmt in ZONED_FMTS {
            if let Ok(zoned) = chrono::DateTime::parse_from_str(input, fmt) {
                return Ok(Self::with_offset(
                    zoned.naive_local(),
                    zoned.offset().local_minus_utc(),
                ));
            }
        }
        for fmt in NAIVE_FMTS {
            if let Ok(naive) = NaiveDateTime::parse_from_str(input, fmt) {
                return Ok(Self::new(naive));
            }
        }
        for fmt in DATE_FMTS {
            if let Ok(date) = NaiveDate::parse_from_str(input, fmt) {
                return Ok(Self::new(date.and_hms_opt(0, 0, 0).unwrap_or_default()));
            }
        }
        Err(Error::Parse {
            input: input.to_string(),
        })
    }

    /// Wall-clock fields as written, offset not applied.
    pub fn naive(&self) -> NaiveDateTime {
        self.naive
    }

    pub fn offset_secs(&self) -> Option<i32> {
        self.offset
    }

    /// Display label for the value's own offset, e.g. `UTC+4` or
    /// `UTC-9:30`. `None` when the value carries no offset.
    pub fn offset_label(&self) -> Option<String> {
        let offset = self.offset?;
        let sign = if offset < 0 { '-' } else { '+' };
        let mag = offset.unsigned_abs();
        let (hours, mins) = (mag / 3600, mag % 3600 / 60);
        Some(if mins == 0 {
            format!("UTC{sign}{hours}")
        } else {
            format!("UTC{sign}{hours}:{mins:02}")
        })
    }

    pub fn year(&self) -> i32 {
        use chrono::Datelike;
        self.naive.date().year()
    }

    /// Microseconds since the Unix epoch, offset applied.
    pub fn unix_micros(&self) -> i64 {
        let local = self.naive.and_utc().timestamp_micros();
        local - i64::from(self.offset.unwrap_or(0)) * 1_000_000
    }

    /// Whole seconds since the Unix epoch, offset applied, truncated
    /// toward earlier time.
    pub fn unix_secs(&self) -> i64 {
        self.unix_micros().div_euclid(1_000_000)
    }

    pub fn subsec_micros(&self) -> u32 {
        (self.unix_micros().rem_euclid(1_000_000)) as u32
    }

    pub(crate) fn from_utc(utc: chrono::DateTime<Utc>) -> Self {
        Self::new(utc.naive_utc())
    }
}

impl fmt::Display for DateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.naive.format(DISPLAY_FMT))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parse_layouts() {
        let dt = DateTime::parse("2020-07-01 00:00:00").unwrap();
        assert_eq!(dt.unix_secs(), 1_593_561_600);
        assert_eq!(dt.offset_secs(), None);

        let dt = DateTime::parse("2023-05-01 17:59:38.285777").unwrap();
        assert_eq!(dt.unix_micros(), 1_682_963_978_285_777);

        let dt = DateTime::parse("2023-05-01T17:59:38.285777").unwrap();
        assert_eq!(dt.unix_micros(), 1_682_963_978_285_777);

        let dt = DateTime::parse("2020-07-01").unwrap();
        assert_eq!(dt.unix_secs(), 1_593_561_600);

        assert!(DateTime::parse("not a date").is_err());
    }

    #[test]
    fn offset_reduces_to_utc() {
        let dt = DateTime::parse("2020-07-01 02:00:00 +0200").unwrap();
        assert_eq!(dt.offset_secs(), Some(7200));
        assert_eq!(dt.unix_secs(), 1_593_561_600);
        // wall-clock fields are preserved
        assert_eq!(dt.to_string(), "2020-07-01 02:00:00.000000");
    }

    #[test]
    fn offset_labels() {
        let naive = DateTime::parse("2020-07-01 02:00:00").unwrap().naive();
        assert_eq!(DateTime::new(naive).offset_label(), None);
        assert_eq!(
            DateTime::with_offset(naive, 4 * 3600).offset_label().unwrap(),
            "UTC+4"
        );
        assert_eq!(
            DateTime::with_offset(naive, -(9 * 3600 + 1800)).offset_label().unwrap(),
            "UTC-9:30"
        );
    }

    #[test]
    fn display_template() {
        let dt = DateTime::parse("2023-05-01 17:59:38.285").unwrap();
        assert_eq!(dt.to_string(), "2023-05-01 17:59:38.285000");
    }
}
