//! Microsoft-family codecs: FILETIME tick formats, WebKit/Chrome, OLE
//! dates, SYSTEMTIME, .NET ticks, and the FAT-family bit-packed fields.

use chrono::{Datelike, NaiveDate, Timelike};

use crate::bits::{
    days_in_month, dec_i64, hex_u64, is_digits, is_hex, shape, swap_hex_bytes, swap_hex_words,
};
use crate::datetime::DateTime;
use crate::epoch::{utc_from_unix_micros, FILETIME_UNIX_DELTA_SECS, OLE_UNIX_DELTA_DAYS};
use crate::format::reason;
use crate::{Error, Result};

const FILETIME_UNIX_DELTA_MICROS: i64 = FILETIME_UNIX_DELTA_SECS * 1_000_000;
const FILETIME_UNIX_DELTA_TICKS: i64 = FILETIME_UNIX_DELTA_SECS * 10_000_000;
/// Reject FILETIME hex values implying a microsecond count this large;
/// unconstrained they produce calendar years chrono cannot represent.
const MAX_FILETIME_MICROS: u64 = 100_000_000_000_000_000;
/// Reject FILETIME pair values at or above this tick count.
const MAX_FILETIME_TICKS: u64 = 1_000_000_000_000_000_000;
/// Upper bound for decoded Unix seconds (3001-01-19 21:29:59 UTC).
const MAX_UNIX_SECS: i64 = 32_536_850_399;

fn from_filetime_ticks(ticks: i64) -> Result<DateTime> {
    let micros = ticks.div_euclid(10) - FILETIME_UNIX_DELTA_MICROS;
    Ok(DateTime::from_utc(utc_from_unix_micros(micros)?))
}

fn to_filetime_ticks(dt: &DateTime) -> Result<u64> {
    let ticks = dt.unix_micros() * 10 + FILETIME_UNIX_DELTA_TICKS;
    u64::try_from(ticks).map_err(|_| Error::Range {
        reason: "date precedes the FILETIME epoch",
    })
}

pub(crate) fn decode_hex64_be(raw: &str) -> Result<DateTime> {
    shape(raw.len() == 16 && is_hex(raw), reason::WINDOWS_HEX_BE)?;
    let ticks = hex_u64(raw, reason::WINDOWS_HEX_BE)?;
    if ticks / 10 >= MAX_FILETIME_MICROS {
        return Err(Error::Range {
            reason: "tick count exceeds the FILETIME span",
        });
    }
    from_filetime_ticks(ticks as i64)
}

pub(crate) fn encode_hex64_be(dt: &DateTime) -> Result<String> {
    Ok(format!("{:016x}", to_filetime_ticks(dt)?))
}

pub(crate) fn decode_hex64_le(raw: &str) -> Result<DateTime> {
    shape(raw.len() == 16 && is_hex(raw), reason::WINDOWS_HEX_LE)?;
    decode_hex64_be(&swap_hex_bytes(raw)).map_err(|err| match err {
        Error::Shape { .. } => Error::Shape {
            reason: reason::WINDOWS_HEX_LE,
        },
        other => other,
    })
}

pub(crate) fn encode_hex64_le(dt: &DateTime) -> Result<String> {
    Ok(swap_hex_bytes(&encode_hex64_be(dt)?))
}

pub(crate) fn decode_chrome(raw: &str) -> Result<DateTime> {
    shape(raw.len() == 17 && is_digits(raw), reason::CHROME)?;
    let micros = dec_i64(raw, reason::CHROME)?;
    Ok(DateTime::from_utc(utc_from_unix_micros(
        micros - FILETIME_UNIX_DELTA_MICROS,
    )?))
}

pub(crate) fn encode_chrome(dt: &DateTime) -> Result<String> {
    let micros = dt.unix_micros() + FILETIME_UNIX_DELTA_MICROS;
    if micros < 0 {
        return Err(Error::Range {
            reason: "date precedes the WebKit epoch",
        });
    }
    Ok(micros.to_string())
}

pub(crate) fn decode_ad(raw: &str) -> Result<DateTime> {
    shape(raw.len() == 18 && is_digits(raw), reason::AD)?;
    let ticks = dec_i64(raw, reason::AD)?;
    let unix_secs = (ticks - FILETIME_UNIX_DELTA_TICKS).div_euclid(10_000_000);
    if !(0..=MAX_UNIX_SECS).contains(&unix_secs) {
        return Err(Error::Range {
            reason: "tick count outside the LDAP timestamp span",
        });
    }
    from_filetime_ticks(ticks)
}

pub(crate) fn encode_ad(dt: &DateTime) -> Result<String> {
    Ok(to_filetime_ticks(dt)?.to_string())
}

pub(crate) fn decode_cookie(raw: &str) -> Result<DateTime> {
    let (low, high) = raw.split_once(',').ok_or(Error::Shape {
        reason: reason::COOKIE,
    })?;
    shape(is_digits(low) && is_digits(high), reason::COOKIE)?;
    let low: u64 = low.parse().map_err(|_| Error::Shape {
        reason: reason::COOKIE,
    })?;
    let high: u64 = high.parse().map_err(|_| Error::Shape {
        reason: reason::COOKIE,
    })?;
    let ticks = (u128::from(high) << 32) + u128::from(low);
    let micros = (ticks / 10) as i64 - FILETIME_UNIX_DELTA_MICROS;
    if micros.div_euclid(1_000_000) >= 100_000_000_000 {
        return Err(Error::Range {
            reason: "cookie pair is beyond the representable span",
        });
    }
    Ok(DateTime::from_utc(utc_from_unix_micros(micros)?))
}

pub(crate) fn encode_cookie(dt: &DateTime) -> Result<String> {
    let ticks = to_filetime_ticks(dt)?;
    let high = ticks >> 32;
    let low = ticks & 0xffff_ffff;
    Ok(format!("{low},{high}"))
}

fn from_ole_days(days: f64) -> Result<DateTime> {
    let micros = ((days - OLE_UNIX_DELTA_DAYS) * 86_400_000_000.0).round();
    if !micros.is_finite() || micros.abs() >= 9.0e18 {
        return Err(Error::Range {
            reason: "OLE delta is outside the representable span",
        });
    }
    Ok(DateTime::from_utc(utc_from_unix_micros(micros as i64)?))
}

fn to_ole_days(dt: &DateTime) -> f64 {
    dt.unix_micros() as f64 / 86_400_000_000.0 + OLE_UNIX_DELTA_DAYS
}

pub(crate) fn decode_ole_be(raw: &str) -> Result<DateTime> {
    shape(raw.len() == 16 && is_hex(raw), reason::OLE_BE)?;
    let days = f64::from_bits(hex_u64(raw, reason::OLE_BE)?);
    if days.is_nan() || days < 0.0 || days > 2_000_000.0 {
        return Err(Error::Range {
            reason: "OLE delta is NaN or outside [0, 2000000) days",
        });
    }
    from_ole_days(days)
}

pub(crate) fn encode_ole_be(dt: &DateTime) -> Result<String> {
    Ok(format!("{:016x}", to_ole_days(dt).to_bits()))
}

pub(crate) fn decode_ole_le(raw: &str) -> Result<DateTime> {
    shape(raw.len() == 16 && is_hex(raw), reason::OLE_LE)?;
    let days = f64::from_bits(hex_u64(&swap_hex_bytes(raw), reason::OLE_LE)?);
    if days.is_nan() || days < 0.0 || days > 99_999.0 {
        return Err(Error::Range {
            reason: "OLE delta is NaN or outside [0, 99999] days",
        });
    }
    from_ole_days(days)
}

pub(crate) fn encode_ole_le(dt: &DateTime) -> Result<String> {
    Ok(swap_hex_bytes(&encode_ole_be(dt)?))
}

/// Shared by OLE Automation (1899-12-30 zero) and Excel 1904 dates, which
/// differ only in epoch. The serial is parsed as exact decimal fields
/// rather than one f64 so microseconds survive the round trip.
fn decode_day_serial(
    raw: &str,
    epoch_delta_secs: i64,
    frac_digits: std::ops::RangeInclusive<usize>,
    why: &'static str,
) -> Result<DateTime> {
    let (whole, frac) = raw.split_once('.').ok_or(Error::Shape { reason: why })?;
    shape(
        whole.len() == 5 && frac_digits.contains(&frac.len()) && is_digits(whole) && is_digits(frac),
        why,
    )?;
    let days: i64 = whole.parse().map_err(|_| Error::Shape { reason: why })?;
    let frac_val: i64 = frac.parse().map_err(|_| Error::Shape { reason: why })?;
    let scale = 10_i64.pow(frac.len() as u32);
    let frac_micros = ((i128::from(frac_val) * 86_400_000_000 + i128::from(scale / 2))
        / i128::from(scale)) as i64;
    let micros = days * 86_400_000_000 + frac_micros - epoch_delta_secs * 1_000_000;
    Ok(DateTime::from_utc(utc_from_unix_micros(micros)?))
}

fn encode_day_serial(dt: &DateTime, epoch_delta_secs: i64) -> Result<String> {
    let micros = dt.unix_micros() + epoch_delta_secs * 1_000_000;
    if micros < 0 {
        return Err(Error::Range {
            reason: "date precedes the serial-date epoch",
        });
    }
    let days = micros / 86_400_000_000;
    let rem = micros % 86_400_000_000;
    let frac = (i128::from(rem) * 1_000_000_000_000 + 43_200_000_000) / 86_400_000_000;
    Ok(format!("{days}.{frac:012}"))
}

pub(crate) fn decode_ole_auto(raw: &str) -> Result<DateTime> {
    decode_day_serial(raw, crate::epoch::OLE_UNIX_DELTA_SECS, 9..=12, reason::OLE_AUTO)
}

pub(crate) fn encode_ole_auto(dt: &DateTime) -> Result<String> {
    encode_day_serial(dt, crate::epoch::OLE_UNIX_DELTA_SECS)
}

pub(crate) fn decode_ms1904(raw: &str) -> Result<DateTime> {
    decode_day_serial(raw, crate::epoch::HFS_UNIX_DELTA_SECS, 9..=12, reason::MS1904)
}

pub(crate) fn encode_ms1904(dt: &DateTime) -> Result<String> {
    encode_day_serial(dt, crate::epoch::HFS_UNIX_DELTA_SECS)
}

pub(crate) fn decode_systemtime(raw: &str) -> Result<DateTime> {
    shape(raw.len() == 32 && is_hex(raw), reason::SYSTEMTIME)?;
    // eight 16-bit little-endian words:
    // year, month, weekday, day, hour, minute, second, milliseconds
    let mut words = [0u16; 8];
    for (i, word) in words.iter_mut().enumerate() {
        let lo = hex_u64(&raw[i * 4..i * 4 + 2], reason::SYSTEMTIME)?;
        let hi = hex_u64(&raw[i * 4 + 2..i * 4 + 4], reason::SYSTEMTIME)?;
        *word = ((hi << 8) | lo) as u16;
    }
    let [year, month, _weekday, day, hour, minute, second, millis] = words;
    if year > 3000 || !(1..=12).contains(&month) || !(1..=31).contains(&day) {
        return Err(Error::Range {
            reason: "SYSTEMTIME field out of range",
        });
    }
    let naive = NaiveDate::from_ymd_opt(i32::from(year), u32::from(month), u32::from(day))
        .and_then(|d| {
            d.and_hms_micro_opt(
                u32::from(hour),
                u32::from(minute),
                u32::from(second),
                u32::from(millis) * 1_000,
            )
        })
        .ok_or(Error::Range {
            reason: "SYSTEMTIME field out of range",
        })?;
    Ok(DateTime::new(naive))
}

pub(crate) fn encode_systemtime(dt: &DateTime) -> Result<String> {
    let utc = utc_from_unix_micros(dt.unix_micros())?;
    let naive = utc.naive_utc();
    let vals: [u16; 8] = [
        u16::try_from(naive.year()).map_err(|_| Error::Range {
            reason: "year does not fit in a SYSTEMTIME word",
        })?,
        naive.month() as u16,
        naive.weekday().num_days_from_sunday() as u16,
        naive.day() as u16,
        naive.hour() as u16,
        naive.minute() as u16,
        naive.second() as u16,
        (naive.nanosecond() / 1_000_000) as u16,
    ];
    let mut out = String::with_capacity(32);
    for val in vals {
        let [lo, hi] = val.to_le_bytes();
        out.push_str(&format!("{lo:02x}{hi:02x}"));
    }
    Ok(out)
}

fn split_colon_pair(raw: &str, why: &'static str) -> Result<(u64, u64)> {
    let (first, second) = raw.split_once(':').ok_or(Error::Shape { reason: why })?;
    shape(
        first.len() == 8 && second.len() == 8 && is_hex(first) && is_hex(second),
        why,
    )?;
    Ok((hex_u64(first, why)?, hex_u64(second, why)?))
}

pub(crate) fn decode_filetime(raw: &str) -> Result<DateTime> {
    // the low 32 bits come first
    let (low, high) = split_colon_pair(raw, reason::FILETIME)?;
    let ticks = (high << 32) | low;
    if ticks >= MAX_FILETIME_TICKS {
        return Err(Error::Range {
            reason: "tick count exceeds the FILETIME span",
        });
    }
    from_filetime_ticks(ticks as i64)
}

pub(crate) fn encode_filetime(dt: &DateTime) -> Result<String> {
    let hex = format!("{:016x}", to_filetime_ticks(dt)?);
    Ok(format!("{}:{}", &hex[8..], &hex[..8]))
}

pub(crate) fn decode_hotmail(raw: &str) -> Result<DateTime> {
    let (first, second) = raw.split_once(':').ok_or(Error::Shape {
        reason: reason::HOTMAIL,
    })?;
    shape(
        first.len() == 8 && second.len() == 8 && is_hex(first) && is_hex(second),
        reason::HOTMAIL,
    )?;
    // each word is byte-swapped, and the high 32 bits come first
    let high = hex_u64(&swap_hex_bytes(first), reason::HOTMAIL)?;
    let low = hex_u64(&swap_hex_bytes(second), reason::HOTMAIL)?;
    let ticks = (high << 32) | low;
    if ticks >= MAX_FILETIME_TICKS {
        return Err(Error::Range {
            reason: "tick count exceeds the FILETIME span",
        });
    }
    from_filetime_ticks(ticks as i64)
}

pub(crate) fn encode_hotmail(dt: &DateTime) -> Result<String> {
    let le = swap_hex_bytes(&format!("{:016x}", to_filetime_ticks(dt)?));
    Ok(format!("{}:{}", &le[8..], &le[..8]))
}

pub(crate) fn decode_dotnet(raw: &str) -> Result<DateTime> {
    shape(raw.len() == 18 && is_digits(raw), reason::DOTNET)?;
    let ticks = dec_i64(raw, reason::DOTNET)?;
    let delta = ticks - crate::epoch::DOTNET_UNIX_DELTA_TICKS;
    if delta < 0 {
        return Err(Error::Range {
            reason: "tick count precedes the Unix epoch",
        });
    }
    let micros = delta.div_euclid(10_000_000) * 1_000_000 + (delta.rem_euclid(10_000_000) + 5) / 10;
    Ok(DateTime::from_utc(utc_from_unix_micros(micros)?))
}

pub(crate) fn encode_dotnet(dt: &DateTime) -> Result<String> {
    let ticks = dt.unix_micros() * 10 + crate::epoch::DOTNET_UNIX_DELTA_TICKS;
    if ticks < 0 {
        return Err(Error::Range {
            reason: "date precedes the .NET epoch",
        });
    }
    Ok(ticks.to_string())
}

/// FAT-family 32-bit field layout, most significant bit first:
/// 7 bits year-1980, 4 month, 5 day, 5 hour, 6 minute, 5 two-second units.
fn decode_fat_fields(val: u32) -> Result<DateTime> {
    let year = ((val >> 25) & 0x7f) as i32 + 1980;
    let month = (val >> 21) & 0x0f;
    let day = (val >> 16) & 0x1f;
    let hour = (val >> 11) & 0x1f;
    let minute = (val >> 5) & 0x3f;
    let second = (val & 0x1f) * 2;
    if !(1970..2100).contains(&year)
        || !(1..=12).contains(&month)
        || day < 1
        || day > days_in_month(year, month)
        || hour > 23
        || minute > 59
        || second > 59
    {
        return Err(Error::Range {
            reason: "bit-packed field out of range",
        });
    }
    let naive = NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_opt(hour, minute, second))
        .ok_or(Error::Range {
            reason: "bit-packed field out of range",
        })?;
    Ok(DateTime::new(naive))
}

fn encode_fat_fields(dt: &DateTime) -> Result<u32> {
    let naive = dt.naive();
    let year = naive.year();
    if !(1980..2108).contains(&year) {
        return Err(Error::Range {
            reason: "year outside the FAT span",
        });
    }
    Ok(((year as u32 - 1980) << 25)
        | (naive.month() << 21)
        | (naive.day() << 16)
        | (naive.hour() << 11)
        | (naive.minute() << 5)
        | (naive.second() / 2))
}

pub(crate) fn decode_exfat(raw: &str) -> Result<DateTime> {
    shape(raw.len() == 8 && is_hex(raw), reason::EXFAT)?;
    decode_fat_fields(hex_u64(raw, reason::EXFAT)? as u32)
}

pub(crate) fn encode_exfat(dt: &DateTime) -> Result<String> {
    Ok(format!("{:08x}", encode_fat_fields(dt)?))
}

pub(crate) fn decode_msdos(raw: &str) -> Result<DateTime> {
    shape(raw.len() == 8 && is_hex(raw), reason::MSDOS)?;
    let be = swap_hex_bytes(raw);
    decode_fat_fields(hex_u64(&be, reason::MSDOS)? as u32)
}

pub(crate) fn encode_msdos(dt: &DateTime) -> Result<String> {
    Ok(swap_hex_bytes(&encode_exfat(dt)?))
}

pub(crate) fn decode_fat(raw: &str) -> Result<DateTime> {
    shape(raw.len() == 8 && is_hex(raw), reason::FAT)?;
    let be = swap_hex_words(raw);
    decode_fat_fields(hex_u64(&be, reason::FAT)? as u32)
}

pub(crate) fn encode_fat(dt: &DateTime) -> Result<String> {
    Ok(swap_hex_words(&encode_exfat(dt)?))
}

#[cfg(test)]
mod test {
    use super::*;
    use test_case::test_case;

    #[test]
    fn hex64() {
        let dt = decode_hex64_be("01d97c56b232fc2a").unwrap();
        assert_eq!(dt.to_string(), "2023-05-01 17:59:38.285777");
        assert_eq!(encode_hex64_be(&dt).unwrap(), "01d97c56b232fc2a");

        let dt = decode_hex64_le("2afc32b2567cd901").unwrap();
        assert_eq!(dt.to_string(), "2023-05-01 17:59:38.285777");
        assert_eq!(encode_hex64_le(&dt).unwrap(), "2afc32b2567cd901");
    }

    #[test]
    fn hex64_bound() {
        assert!(matches!(
            decode_hex64_be("ffffffffffffffff"),
            Err(Error::Range { .. })
        ));
    }

    #[test]
    fn chrome() {
        let dt = decode_chrome("13327437578285777").unwrap();
        assert_eq!(dt.to_string(), "2023-05-01 17:59:38.285777");
        assert_eq!(encode_chrome(&dt).unwrap(), "13327437578285777");
    }

    #[test]
    fn active_directory() {
        let dt = decode_ad("133274375782857770").unwrap();
        assert_eq!(dt.to_string(), "2023-05-01 17:59:38.285777");
        assert_eq!(encode_ad(&dt).unwrap(), "133274375782857770");
    }

    #[test]
    fn cookie_pair() {
        let dt = decode_cookie("2986828032,31030358").unwrap();
        assert_eq!(dt.to_string(), "2023-05-01 17:59:38.000000");
        assert_eq!(encode_cookie(&dt).unwrap(), "2986828032,31030358");
        // sub-tick precision truncates to microseconds
        let dt = decode_cookie("2672012328,30667480").unwrap();
        assert_eq!(dt.to_string(), "2018-05-23 20:57:12.274640");
    }

    #[test]
    fn ole_doubles() {
        let dt = decode_ole_be("40e5fef7fdf0f084").unwrap();
        assert_eq!(dt.to_string(), "2023-05-01 17:59:38.285777");

        let dt = decode_ole_le("84f0f0fdf7fee540").unwrap();
        assert_eq!(dt.to_string(), "2023-05-01 17:59:38.285777");

        let dt = crate::DateTime::parse("2020-01-01 00:00:00").unwrap();
        assert_eq!(encode_ole_be(&dt).unwrap(), "40e566e000000000");
        assert_eq!(encode_ole_le(&dt).unwrap(), "00000000e066e540");
    }

    #[test]
    fn ole_rejects_nan_and_negative() {
        // 0xfff8... is a quiet NaN
        assert!(decode_ole_be("fff8000000000000").is_err());
        // -1.0 days
        assert!(decode_ole_be("bff0000000000000").is_err());
    }

    #[test]
    fn day_serials() {
        let dt = decode_ole_auto("45047.749748677976").unwrap();
        assert_eq!(dt.to_string(), "2023-05-01 17:59:38.285777");
        let back = encode_ole_auto(&dt).unwrap();
        assert_eq!(decode_ole_auto(&back).unwrap(), dt);

        let dt = decode_ms1904("43585.749748677976").unwrap();
        assert_eq!(dt.to_string(), "2023-05-01 17:59:38.285777");

        let dt = crate::DateTime::parse("2020-01-01 00:00:00").unwrap();
        assert_eq!(encode_ole_auto(&dt).unwrap(), "43831.000000000000");
        assert_eq!(encode_ms1904(&dt).unwrap(), "42369.000000000000");
    }

    #[test]
    fn systemtime() {
        let dt = decode_systemtime("e70705000100010011003b0026001d01").unwrap();
        assert_eq!(dt.to_string(), "2023-05-01 17:59:38.285000");

        let dt = crate::DateTime::parse("2020-01-01 00:00:00").unwrap();
        let enc = encode_systemtime(&dt).unwrap();
        assert_eq!(enc, "e4070100030001000000000000000000");
        assert_eq!(decode_systemtime(&enc).unwrap(), dt);
    }

    #[test]
    fn systemtime_rejects_bad_month() {
        assert!(matches!(
            decode_systemtime("e70700000100010011003b0026001d01"),
            Err(Error::Range { .. })
        ));
    }

    #[test]
    fn filetime_pair() {
        let dt = decode_filetime("b232fc2a:01d97c56").unwrap();
        assert_eq!(dt.to_string(), "2023-05-01 17:59:38.285777");

        let dt = crate::DateTime::parse("2020-01-01 00:00:00").unwrap();
        assert_eq!(encode_filetime(&dt).unwrap(), "69050000:01d5c036");
    }

    #[test]
    fn hotmail_pair() {
        let dt = decode_hotmail("567cd901:2afc32b2").unwrap();
        assert_eq!(dt.to_string(), "2023-05-01 17:59:38.285777");

        let dt = crate::DateTime::parse("2020-01-01 00:00:00").unwrap();
        assert_eq!(encode_hotmail(&dt).unwrap(), "36c0d501:00000569");
    }

    #[test]
    fn dotnet_ticks() {
        let dt = decode_dotnet("638185607782857728").unwrap();
        assert_eq!(dt.to_string(), "2023-05-01 17:59:38.285773");

        let dt = crate::DateTime::parse("2020-01-01 00:00:00").unwrap();
        assert_eq!(encode_dotnet(&dt).unwrap(), "637134336000000000");
    }

    #[test]
    fn fat_family() {
        let dt = decode_msdos("2198bb58").unwrap();
        assert_eq!(dt.to_string(), "2024-05-27 19:01:02.000000");

        let dt = decode_fat("a156738f").unwrap();
        assert_eq!(dt.to_string(), "2023-05-01 17:59:38.000000");

        let dt = decode_exfat("56a18f73").unwrap();
        assert_eq!(dt.to_string(), "2023-05-01 17:59:38.000000");

        let dt = crate::DateTime::parse("2020-01-01 00:00:00").unwrap();
        assert_eq!(encode_exfat(&dt).unwrap(), "50210000");
        assert_eq!(encode_msdos(&dt).unwrap(), "00002150");
        assert_eq!(encode_fat(&dt).unwrap(), "21500000");
    }

    // month 0 and day 0 must be invalid, not clamped to a default date
    #[test_case("00000050"; "month zero")]
    #[test_case("00200050"; "day zero")]
    fn fat_rejects_zero_fields(raw: &str) {
        assert!(matches!(decode_exfat(raw), Err(Error::Range { .. })));
    }

    #[test]
    fn fat_rejects_impossible_day() {
        // 2023-02-30
        let val: u32 = (43 << 25) | (2 << 21) | (30 << 16);
        assert!(decode_exfat(&format!("{val:08x}")).is_err());
    }
}
