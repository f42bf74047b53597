//! Scan every registered format against a raw value and report which
//! ones produce a plausible date.

use std::panic::{catch_unwind, AssertUnwindSafe};

use serde::Serialize;
use tracing::warn;

use crate::datetime::DateTime;
use crate::format::{self, Descriptor};
use crate::{Error, Result};

/// Decoded dates this close to the current year are flagged as the
/// probable interpretation.
const LIKELY_YEARS: i32 = 5;

/// One successful interpretation of the input.
#[derive(Debug, Clone, Serialize)]
pub struct Match {
    pub id: &'static str,
    pub name: &'static str,
    pub timestamp: String,
    /// The value's own decoded offset when it carries one, otherwise the
    /// format's static zone annotation.
    pub zone: String,
    /// Decoded year falls within [`LIKELY_YEARS`] of today.
    pub likely: bool,
}

impl Match {
    fn new(desc: &'static Descriptor, dt: &DateTime, now_year: i32) -> Self {
        Match {
            id: desc.id,
            name: desc.name,
            timestamp: dt.to_string(),
            zone: dt.offset_label().unwrap_or_else(|| desc.zone.to_string()),
            likely: (dt.year() - now_year).abs() <= LIKELY_YEARS,
        }
    }
}

fn try_decode(desc: &'static Descriptor, raw: &str) -> Result<DateTime> {
    // a misbehaving codec must not take the whole scan down with it
    catch_unwind(AssertUnwindSafe(|| desc.format.decode(raw))).unwrap_or_else(|_| {
        warn!(id = desc.id, "codec panicked during guess scan");
        Err(Error::Internal { format: desc.id })
    })
}

/// Try the raw value against every format in the registry, returning all
/// interpretations with the likely ones first.
///
/// Returns [`Error::NoMatches`] when nothing decodes.
pub fn guess(raw: &str) -> Result<Vec<Match>> {
    let now_year = DateTime::now().year();
    let mut matches: Vec<Match> = format::ALL
        .iter()
        .filter(|desc| desc.in_guess)
        .filter_map(|desc| try_decode(desc, raw).ok().map(|dt| Match::new(desc, &dt, now_year)))
        .collect();
    if matches.is_empty() {
        return Err(Error::NoMatches);
    }
    matches.sort_by_key(|m| !m.likely);
    Ok(matches)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn ten_digit_value_matches_many() {
        // a current Unix seconds value decodes under several formats
        let raw = DateTime::now().unix_secs().to_string();
        let matches = guess(&raw).unwrap();
        let unix = matches.iter().find(|m| m.id == "unix").unwrap();
        assert!(unix.likely);
        // likely interpretations sort ahead of the rest
        let first_unlikely = matches.iter().position(|m| !m.likely);
        if let Some(pos) = first_unlikely {
            assert!(matches[pos..].iter().all(|m| !m.likely));
        }
    }

    #[test]
    fn nsdate_shapes_resolve_through_dispatcher() {
        let matches = guess("704656778").unwrap();
        assert!(matches.iter().any(|m| m.id == "nsdate"));
        // the individual family ids never appear in a scan
        assert!(matches.iter().all(|m| m.id != "bplist"));
    }

    #[test]
    fn zone_reflects_decoded_offset() {
        // GSM value carrying a +4h timezone octet
        let matches = guess("32501071958361").unwrap();
        let gsm = matches.iter().find(|m| m.id == "gsm").unwrap();
        assert_eq!(gsm.zone, "UTC+4");
        // offset-free interpretations keep their static annotation
        let ns40 = matches.iter().find(|m| m.id == "ns40le");
        if let Some(m) = ns40 {
            assert_eq!(m.zone, "UTC");
        }
    }

    #[test]
    fn garbage_yields_no_matches() {
        assert!(matches!(guess("not a timestamp"), Err(Error::NoMatches)));
    }
}
