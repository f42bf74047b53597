//! Apple-family codecs: Cocoa/NSDate seconds, binary plist and iOS
//! nanosecond variants, HFS+ volume timestamps, and Biome doubles.

use crate::bits::{dec_i64, hex_u64, is_digits, is_hex, shape, swap_hex_bytes};
use crate::datetime::DateTime;
use crate::epoch::{utc_from_unix, utc_from_unix_micros, COCOA_UNIX_DELTA_SECS, HFS_UNIX_DELTA_SECS};
use crate::format::reason;
use crate::{Error, Result};

/// Biome doubles beyond this many seconds from the Cocoa epoch are noise.
const MAX_BIOME_SECS: f64 = 1.0e17;

pub(crate) fn decode_mac(raw: &str) -> Result<DateTime> {
    let (whole, frac) = raw.split_once('.').ok_or(Error::Shape {
        reason: reason::MAC,
    })?;
    shape(
        whole.len() == 9 && (1..=6).contains(&frac.len()) && is_digits(whole) && is_digits(frac),
        reason::MAC,
    )?;
    let secs = dec_i64(whole, reason::MAC)? + COCOA_UNIX_DELTA_SECS;
    let micros = dec_i64(frac, reason::MAC)? * 10_i64.pow(6 - frac.len() as u32);
    Ok(DateTime::from_utc(utc_from_unix(secs, micros as u32)?))
}

pub(crate) fn encode_mac(dt: &DateTime) -> Result<String> {
    let secs = dt.unix_secs() - COCOA_UNIX_DELTA_SECS;
    if secs < 0 {
        return Err(Error::Range {
            reason: "date precedes the Cocoa epoch",
        });
    }
    Ok(format!("{secs}.{:06}", dt.subsec_micros()))
}

pub(crate) fn decode_bplist(raw: &str) -> Result<DateTime> {
    shape(raw.len() == 9 && is_digits(raw), reason::BPLIST)?;
    let secs = dec_i64(raw, reason::BPLIST)? + COCOA_UNIX_DELTA_SECS;
    Ok(DateTime::from_utc(utc_from_unix(secs, 0)?))
}

pub(crate) fn encode_bplist(dt: &DateTime) -> Result<String> {
    let secs = dt.unix_secs() - COCOA_UNIX_DELTA_SECS;
    if secs < 0 {
        return Err(Error::Range {
            reason: "date precedes the Cocoa epoch",
        });
    }
    Ok(secs.to_string())
}

pub(crate) fn decode_iostime(raw: &str) -> Result<DateTime> {
    shape((15..=18).contains(&raw.len()) && is_digits(raw), reason::IOSTIME)?;
    let nanos = dec_i64(raw, reason::IOSTIME)?;
    let secs = nanos.div_euclid(1_000_000_000) + COCOA_UNIX_DELTA_SECS;
    let micros = (nanos.rem_euclid(1_000_000_000) / 1_000) as u32;
    Ok(DateTime::from_utc(utc_from_unix(secs, micros)?))
}

pub(crate) fn encode_iostime(dt: &DateTime) -> Result<String> {
    let secs = dt.unix_secs() - COCOA_UNIX_DELTA_SECS;
    if secs < 0 {
        return Err(Error::Range {
            reason: "date precedes the Cocoa epoch",
        });
    }
    Ok((secs * 1_000_000_000 + i64::from(dt.subsec_micros()) * 1_000).to_string())
}

/// NSDates travel in three shapes; dispatch on which one the input matches.
pub(crate) fn decode_nsdate(raw: &str) -> Result<DateTime> {
    if raw.contains('.') {
        decode_mac(raw)
    } else if raw.len() == 9 && is_digits(raw) {
        decode_bplist(raw)
    } else if (15..=18).contains(&raw.len()) && is_digits(raw) {
        decode_iostime(raw)
    } else {
        Err(Error::Shape {
            reason: reason::NSDATE,
        })
    }
    .map_err(|err| match err {
        Error::Shape { .. } => Error::Shape {
            reason: reason::NSDATE,
        },
        other => other,
    })
}

pub(crate) fn decode_hfs_dec(raw: &str) -> Result<DateTime> {
    shape(raw.len() == 10 && is_digits(raw), reason::HFS_DEC)?;
    let secs = dec_i64(raw, reason::HFS_DEC)? - HFS_UNIX_DELTA_SECS;
    if secs < 0 {
        return Err(Error::Range {
            reason: "seconds count precedes the HFS+ epoch",
        });
    }
    Ok(DateTime::from_utc(utc_from_unix(secs, 0)?))
}

pub(crate) fn encode_hfs_dec(dt: &DateTime) -> Result<String> {
    let secs = dt.unix_secs() + HFS_UNIX_DELTA_SECS;
    if secs < 0 {
        return Err(Error::Range {
            reason: "date precedes the HFS+ epoch",
        });
    }
    Ok(secs.to_string())
}

pub(crate) fn decode_hfs_be(raw: &str) -> Result<DateTime> {
    shape(raw.len() == 8 && is_hex(raw), reason::HFS_BE)?;
    let secs = hex_u64(raw, reason::HFS_BE)? as i64 - HFS_UNIX_DELTA_SECS;
    Ok(DateTime::from_utc(utc_from_unix(secs, 0)?))
}

pub(crate) fn encode_hfs_be(dt: &DateTime) -> Result<String> {
    let secs = dt.unix_secs() + HFS_UNIX_DELTA_SECS;
    let val = u32::try_from(secs).map_err(|_| Error::Range {
        reason: "date outside the 32-bit HFS+ span",
    })?;
    Ok(format!("{val:08x}"))
}

pub(crate) fn decode_hfs_le(raw: &str) -> Result<DateTime> {
    shape(raw.len() == 8 && is_hex(raw), reason::HFS_LE)?;
    decode_hfs_be(&swap_hex_bytes(raw)).map_err(|err| match err {
        Error::Shape { .. } => Error::Shape {
            reason: reason::HFS_LE,
        },
        other => other,
    })
}

pub(crate) fn encode_hfs_le(dt: &DateTime) -> Result<String> {
    Ok(swap_hex_bytes(&encode_hfs_be(dt)?))
}

fn from_cocoa_secs_f64(secs: f64) -> Result<DateTime> {
    if !secs.is_finite() || secs < 0.0 || secs >= MAX_BIOME_SECS {
        return Err(Error::Range {
            reason: "seconds count outside the Biome span",
        });
    }
    let micros = (secs * 1_000_000.0).round() as i64 + COCOA_UNIX_DELTA_SECS * 1_000_000;
    Ok(DateTime::from_utc(utc_from_unix_micros(micros)?))
}

pub(crate) fn decode_biomehex(raw: &str) -> Result<DateTime> {
    shape(raw.len() == 16 && is_hex(raw), reason::BIOME_HEX)?;
    // stored little-endian unless the exponent byte leads
    let be = if raw.starts_with("41") {
        raw.to_string()
    } else {
        swap_hex_bytes(raw)
    };
    from_cocoa_secs_f64(f64::from_bits(hex_u64(&be, reason::BIOME_HEX)?))
}

pub(crate) fn encode_biomehex(dt: &DateTime) -> Result<String> {
    let secs = dt.unix_micros() as f64 / 1_000_000.0 - COCOA_UNIX_DELTA_SECS as f64;
    if secs < 0.0 {
        return Err(Error::Range {
            reason: "date precedes the Cocoa epoch",
        });
    }
    Ok(format!("{:016x}", secs.to_bits()))
}

pub(crate) fn decode_biome64(raw: &str) -> Result<DateTime> {
    shape(raw.len() == 19 && is_digits(raw), reason::BIOME64)?;
    let bits: u64 = raw.parse().map_err(|_| Error::Shape {
        reason: reason::BIOME64,
    })?;
    let secs = f64::from_bits(bits);
    if !secs.is_finite() || secs < 0.0 || secs >= MAX_BIOME_SECS {
        return Err(Error::Range {
            reason: "seconds count outside the Biome span",
        });
    }
    let unix = secs.trunc() as i64 + COCOA_UNIX_DELTA_SECS;
    Ok(DateTime::from_utc(utc_from_unix(unix, 0)?))
}

pub(crate) fn encode_biome64(dt: &DateTime) -> Result<String> {
    let secs = dt.unix_secs() - COCOA_UNIX_DELTA_SECS;
    if secs < 0 {
        return Err(Error::Range {
            reason: "date precedes the Cocoa epoch",
        });
    }
    Ok((secs as f64).to_bits().to_string())
}

#[cfg(test)]
mod test {
    use super::*;
    use test_case::test_case;

    #[test]
    fn mac_absolute() {
        let dt = decode_mac("704656778.285777").unwrap();
        assert_eq!(dt.to_string(), "2023-05-01 17:59:38.285777");
        assert_eq!(encode_mac(&dt).unwrap(), "704656778.285777");

        let dt = crate::DateTime::parse("2020-01-01 00:00:00").unwrap();
        assert_eq!(encode_mac(&dt).unwrap(), "599529600.000000");
    }

    #[test]
    fn bplist_seconds() {
        let dt = decode_bplist("704656778").unwrap();
        assert_eq!(dt.to_string(), "2023-05-01 17:59:38.000000");
        assert_eq!(encode_bplist(&dt).unwrap(), "704656778");
    }

    #[test]
    fn ios_nanos() {
        let dt = decode_iostime("704656778285777024").unwrap();
        assert_eq!(dt.to_string(), "2023-05-01 17:59:38.285777");

        let dt = crate::DateTime::parse("2020-01-01 00:00:00").unwrap();
        assert_eq!(encode_iostime(&dt).unwrap(), "599529600000000000");
    }

    #[test_case("704656778.285777", "2023-05-01 17:59:38.285777"; "mac shape")]
    #[test_case("704656778", "2023-05-01 17:59:38.000000"; "bplist shape")]
    #[test_case("704656778285777024", "2023-05-01 17:59:38.285777"; "ios shape")]
    fn nsdate_dispatch(raw: &str, expect: &str) {
        assert_eq!(decode_nsdate(raw).unwrap().to_string(), expect);
    }

    #[test]
    fn nsdate_rejects_other_widths() {
        assert!(matches!(
            decode_nsdate("12345678901"),
            Err(Error::Shape {
                reason: reason::NSDATE
            })
        ));
    }

    #[test]
    fn hfs_decimal() {
        let dt = decode_hfs_dec("3765808778").unwrap();
        assert_eq!(dt.to_string(), "2023-05-01 17:59:38.000000");
        assert_eq!(encode_hfs_dec(&dt).unwrap(), "3765808778");
        // pre-1904 counts do not exist
        assert!(matches!(
            decode_hfs_dec("1082844800"),
            Err(Error::Range { .. })
        ));
    }

    #[test]
    fn hfs_hex() {
        let dt = decode_hfs_be("e075ae8a").unwrap();
        assert_eq!(dt.to_string(), "2023-05-01 17:59:38.000000");
        let dt = decode_hfs_le("8aae75e0").unwrap();
        assert_eq!(dt.to_string(), "2023-05-01 17:59:38.000000");

        let dt = crate::DateTime::parse("2020-01-01 00:00:00").unwrap();
        assert_eq!(encode_hfs_be(&dt).unwrap(), "da319180");
        assert_eq!(encode_hfs_le(&dt).unwrap(), "809131da");
    }

    #[test]
    fn biome_double() {
        let dt = decode_biomehex("41c5001ac5249457").unwrap();
        assert_eq!(dt.to_string(), "2023-05-01 17:59:38.285777");
        // little-endian storage of the same double
        let dt = decode_biomehex("579424c51a00c541").unwrap();
        assert_eq!(dt.to_string(), "2023-05-01 17:59:38.285777");

        let dt = crate::DateTime::parse("2020-01-01 00:00:00").unwrap();
        assert_eq!(encode_biomehex(&dt).unwrap(), "41c1de0c40000000");
    }

    #[test]
    fn biome_decimal() {
        let dt = decode_biome64("4739194297853973591").unwrap();
        assert_eq!(dt.to_string(), "2023-05-01 17:59:38.000000");

        let dt = crate::DateTime::parse("2020-01-01 00:00:00").unwrap();
        assert_eq!(encode_biome64(&dt).unwrap(), "4738312427165188096");
    }
}
