//! GPS time: seconds since the first GPS week (1980-01-06), running on
//! an atomic scale that is ahead of UTC by the accumulated leap seconds
//! minus the 19 TAI-GPS seconds fixed at the epoch.

use crate::bits::{dec_i64, is_digits, shape};
use crate::datetime::DateTime;
use crate::epoch::{utc_from_unix, GPS_UNIX_DELTA_SECS};
use crate::format::reason;
use crate::leapsecs;
use crate::{Error, Result};

/// TAI was ahead of GPS time by exactly 19 seconds at the GPS epoch.
const TAI_GPS_DELTA_SECS: i64 = 19;

pub(crate) fn decode(raw: &str) -> Result<DateTime> {
    shape(raw.len() == 10 && is_digits(raw), reason::GPS)?;
    let gps = dec_i64(raw, reason::GPS)?;
    let tai = utc_from_unix(gps + GPS_UNIX_DELTA_SECS + TAI_GPS_DELTA_SECS, 0)?;
    let secs = tai.timestamp() - leapsecs::offset_at(tai);
    Ok(DateTime::from_utc(utc_from_unix(secs, 0)?))
}

pub(crate) fn encode(dt: &DateTime) -> Result<String> {
    let utc = utc_from_unix(dt.unix_secs(), 0)?;
    let gps = dt.unix_secs() + leapsecs::offset_at(utc) - TAI_GPS_DELTA_SECS - GPS_UNIX_DELTA_SECS;
    if gps < 0 {
        return Err(Error::Range {
            reason: "date precedes the GPS epoch",
        });
    }
    Ok(gps.to_string())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn decode_applies_leap_offset() {
        let dt = decode("1366999159").unwrap();
        assert_eq!(dt.to_string(), "2023-05-01 17:59:01.000000");

        // first instant after the 2016-12-31 leap second carries 37
        let dt = decode("1167350428").unwrap();
        assert_eq!(dt.to_string(), "2017-01-02 00:00:10.000000");
    }

    #[test]
    fn encode_round_trips() {
        let dt = crate::DateTime::parse("2020-01-01 00:00:00").unwrap();
        assert_eq!(encode(&dt).unwrap(), "1261872018");
        assert_eq!(decode("1261872018").unwrap(), dt);
    }
}
