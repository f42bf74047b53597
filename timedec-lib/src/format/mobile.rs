//! Handset-family codecs: GSM SMSC octets, vendor 6/7-byte field dumps
//! (Symantec, Motorola, Nokia), bit-packed decimal/hex dates, and
//! semi-octet decimal values.

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};

use crate::bits::{dec_u64, hex_u64, is_digits, is_hex, shape, swap_hex_bytes};
use crate::datetime::DateTime;
use crate::epoch::{utc_from_unix, NOKIA_UNIX_DELTA_SECS};
use crate::format::reason;
use crate::{Error, Result};

fn field_date(
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
    minute: u32,
    second: u32,
    why: &'static str,
) -> Result<NaiveDateTime> {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_opt(hour, minute, second))
        .ok_or(Error::Range { reason: why })
}

/// Reverse the two characters of a packed pair (nibble swap).
fn nibble_swap(pair: &str) -> String {
    pair.chars().rev().collect()
}

fn bcd_pair(raw: &str, idx: usize, why: &'static str) -> Result<u32> {
    nibble_swap(&raw[idx * 2..idx * 2 + 2])
        .parse()
        .map_err(|_| Error::Shape { reason: why })
}

pub(crate) fn decode_gsm(raw: &str) -> Result<DateTime> {
    shape(raw.len() == 14 && is_hex(raw), reason::GSM)?;
    let yy = bcd_pair(raw, 0, reason::GSM)?;
    let year = if yy < 50 { 2000 + yy } else { 1900 + yy } as i32;
    let month = bcd_pair(raw, 1, reason::GSM)?;
    let day = bcd_pair(raw, 2, reason::GSM)?;
    let hour = bcd_pair(raw, 3, reason::GSM)?;
    let minute = bcd_pair(raw, 4, reason::GSM)?;
    let second = bcd_pair(raw, 5, reason::GSM)?;

    // timezone octet: sign bit plus quarter-hours, BCD
    let tz = hex_u64(&nibble_swap(&raw[12..14]), reason::GSM)? as u32;
    let negative = tz & 0x80 != 0;
    let (hi, lo) = ((tz >> 4) & 0x7, tz & 0xf);
    let quarters = if lo <= 9 { hi * 10 + lo } else { hi * 100 + lo };
    if quarters > 48 {
        return Err(Error::Range {
            reason: "GSM timezone offset exceeds 12 hours",
        });
    }
    let offset = quarters as i32 * 900 * if negative { -1 } else { 1 };

    let naive = field_date(
        year,
        month,
        day,
        hour,
        minute,
        second,
        "GSM field out of range",
    )?;
    if offset == 0 {
        Ok(DateTime::new(naive))
    } else {
        Ok(DateTime::with_offset(naive, offset))
    }
}

pub(crate) fn encode_gsm(dt: &DateTime) -> Result<String> {
    let naive = dt.naive();
    if !(2000..=2099).contains(&naive.year()) {
        return Err(Error::Range {
            reason: "year outside the GSM century",
        });
    }
    let fields = [
        naive.year() as u32 - 2000,
        naive.month(),
        naive.day(),
        naive.hour(),
        naive.minute(),
        naive.second(),
    ];
    let mut out = String::with_capacity(14);
    for val in fields {
        out.push_str(&nibble_swap(&format!("{val:02}")));
    }
    let offset = dt.offset_secs().unwrap_or(0);
    let quarters = offset.unsigned_abs() / 900;
    let hi = quarters / 10 + if offset < 0 { 8 } else { 0 };
    out.push_str(&format!("{:x}{:x}", quarters % 10, hi));
    Ok(out)
}

fn hex_byte(raw: &str, idx: usize, why: &'static str) -> Result<u32> {
    hex_u64(&raw[idx * 2..idx * 2 + 2], why).map(|v| v as u32)
}

pub(crate) fn decode_symantec(raw: &str) -> Result<DateTime> {
    shape(raw.len() == 12 && is_hex(raw), reason::SYMANTEC)?;
    let naive = field_date(
        hex_byte(raw, 0, reason::SYMANTEC)? as i32 + 1970,
        hex_byte(raw, 1, reason::SYMANTEC)? + 1,
        hex_byte(raw, 2, reason::SYMANTEC)?,
        hex_byte(raw, 3, reason::SYMANTEC)?,
        hex_byte(raw, 4, reason::SYMANTEC)?,
        hex_byte(raw, 5, reason::SYMANTEC)?,
        "Symantec field out of range",
    )?;
    Ok(DateTime::new(naive))
}

pub(crate) fn encode_symantec(dt: &DateTime) -> Result<String> {
    let naive = dt.naive();
    let year = u32::try_from(naive.year() - 1970).map_err(|_| Error::Range {
        reason: "date precedes the Symantec epoch",
    })?;
    if year > 0xff {
        return Err(Error::Range {
            reason: "year does not fit in a Symantec byte",
        });
    }
    Ok(format!(
        "{year:02x}{:02x}{:02x}{:02x}{:02x}{:02x}",
        naive.month() - 1,
        naive.day(),
        naive.hour(),
        naive.minute(),
        naive.second()
    ))
}

pub(crate) fn decode_moto(raw: &str) -> Result<DateTime> {
    shape(raw.len() == 12 && is_hex(raw), reason::MOTO)?;
    let naive = field_date(
        hex_byte(raw, 0, reason::MOTO)? as i32 + 1970,
        hex_byte(raw, 1, reason::MOTO)?,
        hex_byte(raw, 2, reason::MOTO)?,
        hex_byte(raw, 3, reason::MOTO)?,
        hex_byte(raw, 4, reason::MOTO)?,
        hex_byte(raw, 5, reason::MOTO)?,
        "Motorola field out of range",
    )?;
    Ok(DateTime::new(naive))
}

pub(crate) fn encode_moto(dt: &DateTime) -> Result<String> {
    let naive = dt.naive();
    let year = u32::try_from(naive.year() - 1970).map_err(|_| Error::Range {
        reason: "date precedes the Motorola epoch",
    })?;
    if year > 0xff {
        return Err(Error::Range {
            reason: "year does not fit in a Motorola byte",
        });
    }
    Ok(format!(
        "{year:02x}{:02x}{:02x}{:02x}{:02x}{:02x}",
        naive.month(),
        naive.day(),
        naive.hour(),
        naive.minute(),
        naive.second()
    ))
}

pub(crate) fn decode_nokia(raw: &str) -> Result<DateTime> {
    shape(raw.len() == 8 && is_hex(raw), reason::NOKIA)?;
    let val = hex_u64(raw, reason::NOKIA)?;
    let secs = NOKIA_UNIX_DELTA_SECS - (val ^ 0xffff_ffff) as i64;
    if secs < 0 {
        return Err(Error::Range {
            reason: "value precedes the Unix epoch",
        });
    }
    Ok(DateTime::from_utc(utc_from_unix(secs, 0)?))
}

pub(crate) fn encode_nokia(dt: &DateTime) -> Result<String> {
    let val = dt.unix_secs() + 0xffff_ffff - NOKIA_UNIX_DELTA_SECS;
    let val = u32::try_from(val).map_err(|_| Error::Range {
        reason: "date outside the Nokia span",
    })?;
    Ok(format!("{val:08x}"))
}

pub(crate) fn decode_nokiale(raw: &str) -> Result<DateTime> {
    shape(raw.len() == 8 && is_hex(raw), reason::NOKIA)?;
    decode_nokia(&swap_hex_bytes(raw))
}

pub(crate) fn encode_nokiale(dt: &DateTime) -> Result<String> {
    Ok(swap_hex_bytes(&encode_nokia(dt)?))
}

fn decode_ns40_be(raw: &str) -> Result<DateTime> {
    let year = hex_u64(&raw[..4], reason::NS40)? as i32;
    if year > 9999 {
        return Err(Error::Range {
            reason: "Nokia year field out of range",
        });
    }
    let naive = field_date(
        year,
        hex_byte(raw, 2, reason::NS40)?,
        hex_byte(raw, 3, reason::NS40)?,
        hex_byte(raw, 4, reason::NS40)?,
        hex_byte(raw, 5, reason::NS40)?,
        hex_byte(raw, 6, reason::NS40)?,
        "Nokia S40 field out of range",
    )?;
    Ok(DateTime::new(naive))
}

pub(crate) fn decode_ns40(raw: &str) -> Result<DateTime> {
    shape(raw.len() == 14 && is_hex(raw), reason::NS40)?;
    decode_ns40_be(raw)
}

pub(crate) fn encode_ns40(dt: &DateTime) -> Result<String> {
    let naive = dt.naive();
    let year = u16::try_from(naive.year()).map_err(|_| Error::Range {
        reason: "year does not fit in a Nokia S40 word",
    })?;
    Ok(format!(
        "{year:04x}{:02x}{:02x}{:02x}{:02x}{:02x}",
        naive.month(),
        naive.day(),
        naive.hour(),
        naive.minute(),
        naive.second()
    ))
}

/// Same layout with only the year word byte-swapped.
pub(crate) fn decode_ns40le(raw: &str) -> Result<DateTime> {
    shape(raw.len() == 14 && is_hex(raw), reason::NS40)?;
    let year_be = swap_hex_bytes(&raw[..4]);
    decode_ns40_be(&format!("{year_be}{}", &raw[4..]))
}

pub(crate) fn encode_ns40le(dt: &DateTime) -> Result<String> {
    let be = encode_ns40(dt)?;
    Ok(format!("{}{}", swap_hex_bytes(&be[..4]), &be[4..]))
}

/// Field layout shared by the bitwise formats, most significant bit
/// first: year, 4-bit month, 5-bit day, 5-bit hour, 6-bit minute.
fn decode_bit_fields(val: u64, why: &'static str) -> Result<DateTime> {
    let naive = field_date(
        (val >> 20) as i32,
        (val >> 16) as u32 & 0x0f,
        (val >> 11) as u32 & 0x1f,
        (val >> 6) as u32 & 0x1f,
        val as u32 & 0x3f,
        0,
        why,
    )?;
    Ok(DateTime::new(naive))
}

fn encode_bit_fields(dt: &DateTime) -> Result<u64> {
    let naive = dt.naive();
    let year = u64::try_from(naive.year()).map_err(|_| Error::Range {
        reason: "year not representable in bit-packed fields",
    })?;
    Ok((year << 20)
        | u64::from(naive.month()) << 16
        | u64::from(naive.day()) << 11
        | u64::from(naive.hour()) << 6
        | u64::from(naive.minute()))
}

pub(crate) fn decode_bitdec(raw: &str) -> Result<DateTime> {
    shape(raw.len() == 10 && is_digits(raw), reason::BITDEC)?;
    decode_bit_fields(dec_u64(raw, reason::BITDEC)?, "bitwise decimal field out of range")
}

pub(crate) fn encode_bitdec(dt: &DateTime) -> Result<String> {
    Ok(encode_bit_fields(dt)?.to_string())
}

pub(crate) fn decode_bitdate(raw: &str) -> Result<DateTime> {
    shape(raw.len() == 8 && is_hex(raw), reason::BITDATE)?;
    let val = hex_u64(&swap_hex_bytes(raw), reason::BITDATE)?;
    decode_bit_fields(val, "BitDate field out of range")
}

pub(crate) fn encode_bitdate(dt: &DateTime) -> Result<String> {
    let val = encode_bit_fields(dt)?;
    if val > u64::from(u32::MAX) {
        return Err(Error::Range {
            reason: "year outside the BitDate span",
        });
    }
    Ok(swap_hex_bytes(&format!("{val:08x}")))
}

pub(crate) fn decode_semi_octet(raw: &str) -> Result<DateTime> {
    shape(
        (raw.len() == 12 || raw.len() == 14) && is_digits(raw),
        reason::SEMI_OCTET,
    )?;
    // a 14-digit value carries a trailing timezone pair; ignored
    let naive = field_date(
        bcd_pair(raw, 0, reason::SEMI_OCTET)? as i32 + 2000,
        bcd_pair(raw, 1, reason::SEMI_OCTET)?,
        bcd_pair(raw, 2, reason::SEMI_OCTET)?,
        bcd_pair(raw, 3, reason::SEMI_OCTET)?,
        bcd_pair(raw, 4, reason::SEMI_OCTET)?,
        bcd_pair(raw, 5, reason::SEMI_OCTET)?,
        "semi-octet field out of range",
    )?;
    Ok(DateTime::new(naive))
}

pub(crate) fn encode_semi_octet(dt: &DateTime) -> Result<String> {
    let naive = dt.naive();
    if !(2000..=2099).contains(&naive.year()) {
        return Err(Error::Range {
            reason: "year outside the semi-octet century",
        });
    }
    let fields = [
        naive.year() as u32 - 2000,
        naive.month(),
        naive.day(),
        naive.hour(),
        naive.minute(),
        naive.second(),
    ];
    let mut out = String::with_capacity(12);
    for val in fields {
        out.push_str(&nibble_swap(&format!("{val:02}")));
    }
    Ok(out)
}

#[cfg(test)]
mod test {
    use super::*;
    use test_case::test_case;

    #[test]
    fn gsm_octets() {
        let dt = decode_gsm("32501071958300").unwrap();
        assert_eq!(dt.to_string(), "2023-05-01 17:59:38.000000");
        assert_eq!(dt.offset_secs(), None);
        assert_eq!(encode_gsm(&dt).unwrap(), "32501071958300");
    }

    #[test]
    fn gsm_offset_shifts_utc() {
        // tz octet "61" swaps to 0x16: 16 quarter-hours (UTC+04:00)
        let dt = decode_gsm("32501071958361").unwrap();
        assert_eq!(dt.offset_secs(), Some(4 * 3600));
        assert_eq!(dt.unix_secs(), 1_682_963_978 - 4 * 3600);
        // sign bit in the high nibble means west of UTC
        let dt = decode_gsm("32501071958369").unwrap();
        assert_eq!(dt.offset_secs(), Some(-4 * 3600));
    }

    #[test]
    fn gsm_rejects_large_offset() {
        // octet "94" swaps to 0x49: 49 quarter-hours is past 12 hours
        assert!(matches!(
            decode_gsm("32501071958394"),
            Err(Error::Range { .. })
        ));
    }

    #[test]
    fn vendor_bytes() {
        let dt = decode_symantec("350401113b26").unwrap();
        assert_eq!(dt.to_string(), "2023-05-01 17:59:38.000000");
        let dt = decode_moto("350501113b26").unwrap();
        assert_eq!(dt.to_string(), "2023-05-01 17:59:38.000000");

        let dt = crate::DateTime::parse("2020-01-01 00:00:00").unwrap();
        assert_eq!(encode_symantec(&dt).unwrap(), "320001000000");
        assert_eq!(encode_moto(&dt).unwrap(), "320101000000");
    }

    #[test]
    fn moto_rejects_month_zero() {
        assert!(decode_moto("350001113b26").is_err());
    }

    #[test]
    fn nokia_inverted() {
        let dt = decode_nokia("cdd5880a").unwrap();
        assert_eq!(dt.to_string(), "2023-05-01 17:59:39.000000");

        let dt = crate::DateTime::parse("2020-01-01 00:00:00").unwrap();
        assert_eq!(encode_nokia(&dt).unwrap(), "c7916aff");
        assert_eq!(encode_nokiale(&dt).unwrap(), "ff6a91c7");
        assert_eq!(
            decode_nokiale("ff6a91c7").unwrap().to_string(),
            "2020-01-01 00:00:00.000000"
        );
    }

    #[test]
    fn nokia_s40() {
        let dt = decode_ns40("07e70501113b26").unwrap();
        assert_eq!(dt.to_string(), "2023-05-01 17:59:38.000000");
        let dt = decode_ns40le("e7070501113b26").unwrap();
        assert_eq!(dt.to_string(), "2023-05-01 17:59:38.000000");

        let dt = crate::DateTime::parse("2020-01-01 00:00:00").unwrap();
        assert_eq!(encode_ns40(&dt).unwrap(), "07e40101000000");
        assert_eq!(encode_ns40le(&dt).unwrap(), "e4070101000000");
    }

    #[test]
    fn bitwise_fields() {
        let dt = decode_bitdec("2121600123").unwrap();
        assert_eq!(dt.to_string(), "2023-05-01 17:59:00.000000");
        let dt = decode_bitdate("7b0c757e").unwrap();
        assert_eq!(dt.to_string(), "2023-05-01 17:59:00.000000");

        let dt = crate::DateTime::parse("2020-01-01 00:00:00").unwrap();
        assert_eq!(encode_bitdec(&dt).unwrap(), "2118191104");
        assert_eq!(encode_bitdate(&dt).unwrap(), "0008417e");
    }

    #[test]
    fn semi_octet_pairs() {
        let dt = decode_semi_octet("325010901034").unwrap();
        assert_eq!(dt.to_string(), "2023-05-01 09:01:43.000000");
        // trailing timezone pair is ignored
        let dt = decode_semi_octet("32501090103400").unwrap();
        assert_eq!(dt.to_string(), "2023-05-01 09:01:43.000000");

        let dt = crate::DateTime::parse("2020-01-01 00:00:00").unwrap();
        assert_eq!(encode_semi_octet(&dt).unwrap(), "021010000000");
    }

    // packed pairs with hex letters are not BCD
    #[test_case("3a501071958300"; "gsm letter pair")]
    #[test_case("3a5010901034"; "semi letter pair")]
    fn rejects_non_bcd(raw: &str) {
        let err = if raw.len() == 14 {
            decode_gsm(raw)
        } else {
            decode_semi_octet(raw)
        };
        assert!(matches!(err, Err(Error::Shape { .. })));
    }
}
