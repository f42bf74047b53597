//! Unix-epoch codecs: plain seconds/milliseconds, their hex renderings,
//! Mozilla PRTime, Apache cookie hex, and LEB128-packed milliseconds.

use crate::bits::{dec_i64, hex_u64, is_digits, is_hex, shape, swap_hex_bytes};
use crate::datetime::DateTime;
use crate::epoch::{utc_from_unix, utc_from_unix_micros};
use crate::format::reason;
use crate::{Error, Result};

pub(crate) fn decode_sec(raw: &str) -> Result<DateTime> {
    shape(raw.len() == 10 && is_digits(raw), reason::UNIX_SEC)?;
    let secs = dec_i64(raw, reason::UNIX_SEC)?;
    Ok(DateTime::from_utc(utc_from_unix(secs, 0)?))
}

pub(crate) fn encode_sec(dt: &DateTime) -> Result<String> {
    Ok(dt.unix_secs().to_string())
}

pub(crate) fn decode_milli(raw: &str) -> Result<DateTime> {
    shape(raw.len() == 13 && is_digits(raw), reason::UNIX_MILLI)?;
    let millis = dec_i64(raw, reason::UNIX_MILLI)?;
    Ok(DateTime::from_utc(utc_from_unix_micros(millis * 1_000)?))
}

pub(crate) fn encode_milli(dt: &DateTime) -> Result<String> {
    Ok((dt.unix_micros().div_euclid(1_000)).to_string())
}

pub(crate) fn decode_milli_hex(raw: &str) -> Result<DateTime> {
    shape(raw.len() == 12 && is_hex(raw), reason::UNIX_MILLI_HEX)?;
    let millis = hex_u64(raw, reason::UNIX_MILLI_HEX)? as i64;
    Ok(DateTime::from_utc(utc_from_unix_micros(millis * 1_000)?))
}

pub(crate) fn encode_milli_hex(dt: &DateTime) -> Result<String> {
    let millis = dt.unix_micros().div_euclid(1_000);
    if millis < 0 {
        return Err(Error::Range {
            reason: "date precedes the Unix epoch",
        });
    }
    Ok(format!("{millis:012x}"))
}

pub(crate) fn decode_hex32_be(raw: &str) -> Result<DateTime> {
    shape(raw.len() == 8 && is_hex(raw), reason::UNIX_HEX_BE)?;
    let secs = hex_u64(raw, reason::UNIX_HEX_BE)? as i64;
    Ok(DateTime::from_utc(utc_from_unix(secs, 0)?))
}

pub(crate) fn encode_hex32_be(dt: &DateTime) -> Result<String> {
    let secs = u32::try_from(dt.unix_secs()).map_err(|_| Error::Range {
        reason: "seconds count does not fit in 32 bits",
    })?;
    Ok(format!("{secs:08x}"))
}

pub(crate) fn decode_hex32_le(raw: &str) -> Result<DateTime> {
    shape(raw.len() == 8 && is_hex(raw), reason::UNIX_HEX_LE)?;
    decode_hex32_be(&swap_hex_bytes(raw)).map_err(|_| Error::Shape {
        reason: reason::UNIX_HEX_LE,
    })
}

pub(crate) fn encode_hex32_le(dt: &DateTime) -> Result<String> {
    Ok(swap_hex_bytes(&encode_hex32_be(dt)?))
}

pub(crate) fn decode_prtime(raw: &str) -> Result<DateTime> {
    shape(raw.len() == 16 && is_digits(raw), reason::PRTIME)?;
    let micros = dec_i64(raw, reason::PRTIME)?;
    Ok(DateTime::from_utc(utc_from_unix_micros(micros)?))
}

pub(crate) fn encode_prtime(dt: &DateTime) -> Result<String> {
    Ok(dt.unix_micros().to_string())
}

pub(crate) fn decode_apache(raw: &str) -> Result<DateTime> {
    shape(raw.len() == 13 && is_hex(raw), reason::APACHE)?;
    let micros = hex_u64(raw, reason::APACHE)? as i64;
    Ok(DateTime::from_utc(utc_from_unix_micros(micros)?))
}

pub(crate) fn encode_apache(dt: &DateTime) -> Result<String> {
    let micros = dt.unix_micros();
    if micros < 0 {
        return Err(Error::Range {
            reason: "date precedes the Unix epoch",
        });
    }
    Ok(format!("{micros:x}"))
}

/// Milliseconds in the LEB128 rendering land in the 13-digit range; values
/// outside it came from a stray byte sequence, not a timestamp.
const LEB128_MIN_MILLIS: u64 = 1_000_000_000_000;
const LEB128_MAX_MILLIS: u64 = 10_000_000_000_000;

pub(crate) fn decode_leb128_hex(raw: &str) -> Result<DateTime> {
    shape(!raw.is_empty() && raw.len() % 2 == 0 && is_hex(raw), reason::LEB128)?;
    let mut millis: u64 = 0;
    let mut shift = 0u32;
    for pair in raw.as_bytes().chunks(2) {
        let byte = u8::from_str_radix(
            std::str::from_utf8(pair).unwrap_or_default(),
            16,
        )
        .map_err(|_| Error::Shape { reason: reason::LEB128 })?;
        if shift >= 63 {
            return Err(Error::Range {
                reason: "LEB128 value overflows 64 bits",
            });
        }
        millis |= u64::from(byte & 0x7f) << shift;
        if byte & 0x80 == 0 {
            break;
        }
        shift += 7;
    }
    if !(LEB128_MIN_MILLIS..LEB128_MAX_MILLIS).contains(&millis) {
        return Err(Error::Range {
            reason: "LEB128 value is not a millisecond timestamp",
        });
    }
    Ok(DateTime::from_utc(utc_from_unix_micros(millis as i64 * 1_000)?))
}

pub(crate) fn encode_leb128_hex(dt: &DateTime) -> Result<String> {
    let mut millis = u64::try_from(dt.unix_micros().div_euclid(1_000)).map_err(|_| {
        Error::Range {
            reason: "date precedes the Unix epoch",
        }
    })?;
    let mut out = String::new();
    loop {
        let mut byte = (millis & 0x7f) as u8;
        millis >>= 7;
        if millis != 0 {
            byte |= 0x80;
        }
        out.push_str(&format!("{byte:02x}"));
        if millis == 0 {
            break;
        }
    }
    Ok(out)
}
