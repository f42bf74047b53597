//! Reference epochs, expressed as deltas to the Unix epoch, and tick
//! resolution constants shared by the format codecs.

use chrono::{DateTime, Utc};

use crate::{Error, Result};

/// Seconds from 1601-01-01 (FILETIME/LDAP/Chrome epoch) to 1970-01-01.
pub const FILETIME_UNIX_DELTA_SECS: i64 = 11_644_473_600;
/// Seconds from 1899-12-30 (OLE date zero) to 1970-01-01.
pub const OLE_UNIX_DELTA_SECS: i64 = 2_209_161_600;
/// Days from 1899-12-30 to 1970-01-01.
pub const OLE_UNIX_DELTA_DAYS: f64 = 25_569.0;
/// Seconds from 1904-01-01 (HFS/HFS+/Excel-1904 epoch) to 1970-01-01.
pub const HFS_UNIX_DELTA_SECS: i64 = 2_082_844_800;
/// Seconds from 1970-01-01 to 2001-01-01 (Cocoa/Mac Absolute epoch).
pub const COCOA_UNIX_DELTA_SECS: i64 = 978_307_200;
/// Seconds from 1970-01-01 to 1980-01-06 (GPS week zero).
pub const GPS_UNIX_DELTA_SECS: i64 = 315_964_800;
/// Seconds from 1970-01-01 to 2000-01-01 (DHCPv6 DUID epoch).
pub const DHCP6_UNIX_DELTA_SECS: i64 = 946_684_800;
/// Seconds from 1970-01-01 to 2050-01-01 (Nokia epoch).
pub const NOKIA_UNIX_DELTA_SECS: i64 = 2_524_608_000;
/// 100-nanosecond ticks from 0001-01-01 (.NET DateTime zero) to 1970-01-01.
pub const DOTNET_UNIX_DELTA_TICKS: i64 = 621_355_968_000_000_000;
/// Seconds from 1970-01-01 to the KSUID epoch (2014-05-13 16:53:20).
pub const KSUID_UNIX_DELTA_SECS: i64 = 1_400_000_000;

/// 100-nanosecond ticks per second (FILETIME/.NET resolution).
pub const TICKS_PER_SEC: i64 = 10_000_000;
pub const NANOS_PER_SEC: i64 = 1_000_000_000;
pub const MICROS_PER_SEC: i64 = 1_000_000;
pub const MILLIS_PER_SEC: i64 = 1_000;

/// Construct a UTC instant from Unix seconds and a sub-second microsecond
/// count, rejecting values chrono cannot represent.
pub(crate) fn utc_from_unix(secs: i64, micros: u32) -> Result<DateTime<Utc>> {
    debug_assert!(micros < 1_000_000);
    DateTime::from_timestamp(secs, micros * 1_000).ok_or(Error::Range {
        reason: "seconds count outside the representable calendar span",
    })
}

/// Same, from a microsecond count since the Unix epoch.
pub(crate) fn utc_from_unix_micros(micros: i64) -> Result<DateTime<Utc>> {
    let (secs, sub) = (micros.div_euclid(1_000_000), micros.rem_euclid(1_000_000));
    utc_from_unix(secs, sub as u32)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn unix_construction() {
        let dt = utc_from_unix(1_593_561_600, 0).unwrap();
        assert_eq!(dt.to_rfc3339(), "2020-07-01T00:00:00+00:00");

        let dt = utc_from_unix_micros(1_682_963_978_285_777).unwrap();
        assert_eq!(dt.timestamp(), 1_682_963_978);
        assert_eq!(dt.timestamp_subsec_micros(), 285_777);

        // negative micros divide toward earlier time, not toward zero
        let dt = utc_from_unix_micros(-1_500_000).unwrap();
        assert_eq!(dt.timestamp(), -2);
        assert_eq!(dt.timestamp_subsec_micros(), 500_000);
    }

    #[test]
    fn out_of_span_is_range_error() {
        assert!(matches!(
            utc_from_unix(i64::MAX / 2, 0),
            Err(Error::Range { .. })
        ));
    }
}
