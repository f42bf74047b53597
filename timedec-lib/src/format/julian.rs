//! Julian Day numbers: the astronomical running day count that starts
//! at noon on -4712-01-01, as a decimal value and as a packed hex pair
//! of whole days and fractional digits.

use crate::bits::{dec_i64, dec_u64, hex_u64, is_digits, is_hex, shape};
use crate::datetime::DateTime;
use crate::epoch::utc_from_unix_micros;
use crate::format::reason;
use crate::{Error, Result};

/// The Unix epoch falls at Julian Day 2440587.5.
const JD_UNIX_DELTA_MICROS: i64 = 210_866_760_000_000_000;
const MICROS_PER_DAY: i64 = 86_400_000_000;

pub(crate) fn decode_dec(raw: &str) -> Result<DateTime> {
    let (whole, frac) = raw.split_once('.').ok_or(Error::Shape {
        reason: reason::JULIAN_DEC,
    })?;
    shape(
        whole.len() == 7
            && is_digits(whole)
            && frac.len() <= 10
            && (frac.is_empty() || is_digits(frac)),
        reason::JULIAN_DEC,
    )?;
    let day = dec_i64(whole, reason::JULIAN_DEC)?;
    let frac_micros = if frac.is_empty() {
        0
    } else {
        let scale = 10_i128.pow(frac.len() as u32);
        let val = i128::from(dec_i64(frac, reason::JULIAN_DEC)?);
        ((val * i128::from(MICROS_PER_DAY) + scale / 2) / scale) as i64
    };
    from_day_micros(day, frac_micros)
}

pub(crate) fn encode_dec(dt: &DateTime) -> Result<String> {
    let (day, frac) = to_day_parts(dt)?;
    if !(1_000_000..=9_999_999).contains(&day) {
        return Err(Error::Range {
            reason: "Julian Day does not span seven digits",
        });
    }
    Ok(format!("{day}.{frac}"))
}

pub(crate) fn decode_hex(raw: &str) -> Result<DateTime> {
    shape(raw.len() == 14 && is_hex(raw), reason::JULIAN_HEX)?;
    let day = hex_u64(&raw[..6], reason::JULIAN_HEX)? as i64;
    let mil = hex_u64(&raw[6..], reason::JULIAN_HEX)?;
    // the trailing field holds the decimal digits of the day fraction
    let scale = 10_i128.pow(mil.to_string().len() as u32);
    let frac_micros = ((i128::from(mil) * i128::from(MICROS_PER_DAY) + scale / 2) / scale) as i64;
    from_day_micros(day, frac_micros)
}

pub(crate) fn encode_hex(dt: &DateTime) -> Result<String> {
    let (day, frac) = to_day_parts(dt)?;
    // the digit-count fraction rule cannot carry a leading zero
    if day > 0xFF_FFFF || (frac != "0" && frac.starts_with('0')) {
        return Err(Error::Range {
            reason: "date does not fit the packed Julian layout",
        });
    }
    let mil = dec_u64(&frac, "date does not fit the packed Julian layout")?;
    if mil > u64::from(u32::MAX) {
        return Err(Error::Range {
            reason: "date does not fit the packed Julian layout",
        });
    }
    Ok(format!("{day:06x}{mil:08x}"))
}

fn from_day_micros(day: i64, frac_micros: i64) -> Result<DateTime> {
    let micros = (day - 2_440_588) * MICROS_PER_DAY + MICROS_PER_DAY / 2 + frac_micros;
    let dt = DateTime::from_utc(utc_from_unix_micros(micros)?);
    if dt.year() < 0 {
        return Err(Error::Range {
            reason: "Julian Day precedes year zero",
        });
    }
    Ok(dt)
}

/// Whole Julian Day and the day fraction as trimmed decimal digits,
/// rounded to ten places.
fn to_day_parts(dt: &DateTime) -> Result<(i64, String)> {
    let total = dt.unix_micros() + JD_UNIX_DELTA_MICROS;
    if total < 0 {
        return Err(Error::Range {
            reason: "date precedes the Julian epoch",
        });
    }
    let mut day = total / MICROS_PER_DAY;
    let rem = total % MICROS_PER_DAY;
    let mut frac10 =
        ((i128::from(rem) * 10_000_000_000 + i128::from(MICROS_PER_DAY) / 2) / i128::from(MICROS_PER_DAY)) as i64;
    if frac10 == 10_000_000_000 {
        day += 1;
        frac10 = 0;
    }
    let mut frac = format!("{frac10:010}");
    while frac.len() > 1 && frac.ends_with('0') {
        frac.pop();
    }
    Ok((day, frac))
}

#[cfg(test)]
mod test {
    use super::*;
    use test_case::test_case;

    #[test_case("2458849.5", "2020-01-01 00:00:00.000000"; "half day is midnight")]
    #[test_case("2458849.", "2019-12-31 12:00:00.000000"; "bare whole day is noon")]
    #[test_case("2460066.2497486778", "2023-05-01 17:59:38.285762"; "ten fractional digits")]
    fn decode_dec_values(raw: &str, want: &str) {
        assert_eq!(decode_dec(raw).unwrap().to_string(), want);
    }

    #[test_case("2458849"; "no decimal point")]
    #[test_case("245884.95"; "short whole part")]
    #[test_case("2458849.12345678901"; "fraction too long")]
    #[test_case("2458849.5a"; "non digit fraction")]
    fn decode_dec_rejects(raw: &str) {
        assert!(matches!(decode_dec(raw), Err(Error::Shape { .. })));
    }

    #[test]
    fn encode_dec_round_trips() {
        let dt = crate::DateTime::parse("2020-01-01 00:00:00").unwrap();
        assert_eq!(encode_dec(&dt).unwrap(), "2458849.5");
        assert_eq!(decode_dec("2458849.5").unwrap(), dt);
    }

    #[test]
    fn decode_hex_scales_fraction_digits() {
        let dt = decode_hex("2584e100000005").unwrap();
        assert_eq!(dt.to_string(), "2020-01-01 00:00:00.000000");
    }

    #[test]
    fn decode_hex_rejects_short_input() {
        assert!(matches!(
            decode_hex("2584e10005"),
            Err(Error::Shape { .. })
        ));
    }

    #[test]
    fn encode_hex_round_trips() {
        let dt = crate::DateTime::parse("2020-01-01 00:00:00").unwrap();
        assert_eq!(encode_hex(&dt).unwrap(), "2584e100000005");
        assert_eq!(decode_hex("2584e100000005").unwrap(), dt);
    }

    #[test]
    fn encode_hex_refuses_leading_zero_fraction() {
        // day fraction 0.0417... has no digit-count rendering
        let dt = crate::DateTime::parse("2020-01-01 13:00:00").unwrap();
        assert!(matches!(encode_hex(&dt), Err(Error::Range { .. })));
    }
}
