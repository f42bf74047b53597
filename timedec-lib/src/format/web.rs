//! Web-service codecs: snowflake IDs (Twitter, Discord, Mastodon, Sony,
//! TikTok), KSUIDs, Google ei/boundary/message-id values, Metasploit
//! payload UUIDs, version-1 UUIDs, DHCPv6 DUID-LLT, Bluesky S32, and
//! VMware snapshot pairs.

use base64::engine::general_purpose::{URL_SAFE, URL_SAFE_NO_PAD};
use base64::Engine;

use crate::bits::{hex_u64, is_digits, is_hex, shape};
use crate::datetime::DateTime;
use crate::epoch::{utc_from_unix, utc_from_unix_micros, DHCP6_UNIX_DELTA_SECS, KSUID_UNIX_DELTA_SECS};
use crate::format::reason;
use crate::{Error, Result};

/// Upper bound for decoded Unix seconds (3001-01-19 21:29:59 UTC).
const MAX_UNIX_SECS: i64 = 32_536_850_399;

const TWITTER_EPOCH_MILLIS: i64 = 1_288_834_974_657;
const DISCORD_EPOCH_MILLIS: i64 = 1_420_070_400_000;
const SONY_EPOCH_DECIMILLIS: i64 = 140_952_960_000;
/// Milliseconds from the Gregorian reform count (UUIDv1 zero) to 1970.
const UUID_UNIX_DELTA_MILLIS: i64 = 12_219_292_800_000;

const KSUID_CHARSET: &[u8; 62] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";
const S32_CHARSET: &[u8; 32] = b"234567abcdefghijklmnopqrstuvwxyz";

fn is_urlsafe_b64(s: &str) -> bool {
    !s.is_empty()
        && s.bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'=' || b == b'-' || b == b'_')
}

fn from_unix_millis(millis: i64) -> Result<DateTime> {
    Ok(DateTime::from_utc(utc_from_unix_micros(millis * 1_000)?))
}

pub(crate) fn decode_eitime(raw: &str) -> Result<DateTime> {
    shape(is_urlsafe_b64(raw), reason::EITIME)?;
    let mut padded = raw.trim_end_matches('=').to_string();
    while padded.len() % 4 != 0 {
        padded.push('=');
    }
    let decoded = URL_SAFE.decode(&padded).map_err(|_| Error::Shape {
        reason: reason::EITIME,
    })?;
    let first: [u8; 4] = decoded
        .get(..4)
        .and_then(|b| b.try_into().ok())
        .ok_or(Error::Shape {
            reason: reason::EITIME,
        })?;
    let secs = i64::from(u32::from_le_bytes(first));
    Ok(DateTime::from_utc(utc_from_unix(secs, 0)?))
}

pub(crate) fn encode_eitime(dt: &DateTime) -> Result<String> {
    let secs = u32::try_from(dt.unix_secs()).map_err(|_| Error::Range {
        reason: "date outside the 32-bit Unix span",
    })?;
    Ok(URL_SAFE_NO_PAD.encode(secs.to_le_bytes()))
}

pub(crate) fn decode_tiktok(raw: &str) -> Result<DateTime> {
    shape(raw.len() >= 19 && is_digits(raw), reason::TIKTOK)?;
    let val: u128 = raw.parse().map_err(|_| Error::Shape {
        reason: reason::TIKTOK,
    })?;
    let secs = (val >> 32) as i64;
    if secs > MAX_UNIX_SECS {
        return Err(Error::Range {
            reason: "embedded seconds count is beyond the representable span",
        });
    }
    Ok(DateTime::from_utc(utc_from_unix(secs, 0)?))
}

fn decode_snowflake_millis(
    raw: &str,
    shift: u32,
    epoch_millis: i64,
    why: &'static str,
) -> Result<DateTime> {
    shape(raw.len() >= 18 && is_digits(raw), why)?;
    let val: u128 = raw.parse().map_err(|_| Error::Shape { reason: why })?;
    let millis = (val >> shift) as i64 + epoch_millis;
    if millis / 1_000 > MAX_UNIX_SECS {
        return Err(Error::Range {
            reason: "embedded milliseconds are beyond the representable span",
        });
    }
    from_unix_millis(millis)
}

pub(crate) fn decode_twitter(raw: &str) -> Result<DateTime> {
    decode_snowflake_millis(raw, 22, TWITTER_EPOCH_MILLIS, reason::TWITTER)
}

pub(crate) fn decode_discord(raw: &str) -> Result<DateTime> {
    decode_snowflake_millis(raw, 22, DISCORD_EPOCH_MILLIS, reason::DISCORD)
}

pub(crate) fn decode_mastodon(raw: &str) -> Result<DateTime> {
    decode_snowflake_millis(raw, 16, 0, reason::MASTODON)
}

pub(crate) fn encode_mastodon(dt: &DateTime) -> Result<String> {
    let millis = u64::try_from(dt.unix_secs() * 1_000).map_err(|_| Error::Range {
        reason: "date precedes the Unix epoch",
    })?;
    Ok((u128::from(millis) << 16).to_string())
}

pub(crate) fn decode_ksalnum(raw: &str) -> Result<DateTime> {
    shape(
        raw.len() == 27 && raw.bytes().all(|b| KSUID_CHARSET.contains(&b)),
        reason::KSUID_ALNUM,
    )?;
    // base62 into a big-endian byte accumulator; a KSUID is 20 bytes and
    // does not fit a machine word
    let mut bytes: Vec<u8> = Vec::with_capacity(20);
    for ch in raw.bytes() {
        let digit = KSUID_CHARSET
            .iter()
            .position(|&c| c == ch)
            .unwrap_or_default() as u32;
        let mut carry = digit;
        for b in bytes.iter_mut().rev() {
            let acc = u32::from(*b) * 62 + carry;
            *b = (acc & 0xff) as u8;
            carry = acc >> 8;
        }
        while carry > 0 {
            bytes.insert(0, (carry & 0xff) as u8);
            carry >>= 8;
        }
    }
    let first: [u8; 4] = bytes
        .get(..4)
        .and_then(|b| b.try_into().ok())
        .ok_or(Error::Range {
            reason: "KSUID value is too small to carry a timestamp",
        })?;
    let secs = i64::from(u32::from_be_bytes(first)) + KSUID_UNIX_DELTA_SECS;
    Ok(DateTime::from_utc(utc_from_unix(secs, 0)?))
}

pub(crate) fn decode_ksdec(raw: &str) -> Result<DateTime> {
    shape(raw.len() == 9 && is_digits(raw), reason::KSUID_DEC)?;
    let secs: i64 = raw.parse().map_err(|_| Error::Shape {
        reason: reason::KSUID_DEC,
    })?;
    Ok(DateTime::from_utc(utc_from_unix(
        secs + KSUID_UNIX_DELTA_SECS,
        0,
    )?))
}

pub(crate) fn encode_ksdec(dt: &DateTime) -> Result<String> {
    let secs = dt.unix_secs() - KSUID_UNIX_DELTA_SECS;
    if secs < 0 {
        return Err(Error::Range {
            reason: "date precedes the KSUID epoch",
        });
    }
    Ok(secs.to_string())
}

pub(crate) fn decode_metasploit(raw: &str) -> Result<DateTime> {
    shape(raw.len() >= 22 && is_urlsafe_b64(raw), reason::METASPLOIT)?;
    let decoded = URL_SAFE
        .decode(format!("{}==", &raw[..22]))
        .map_err(|_| Error::Shape {
            reason: reason::METASPLOIT,
        })?;
    if decoded.len() < 16 {
        return Err(Error::Shape {
            reason: reason::METASPLOIT,
        });
    }
    // the timestamp bytes are xored with two puid bytes
    let (xor1, xor2) = (decoded[8], decoded[9]);
    let secs = i64::from(u32::from_be_bytes([
        decoded[12] ^ xor1,
        decoded[13] ^ xor2,
        decoded[14] ^ xor1,
        decoded[15] ^ xor2,
    ]));
    Ok(DateTime::from_utc(utc_from_unix(secs, 0)?))
}

pub(crate) fn decode_sony(raw: &str) -> Result<DateTime> {
    shape(raw.len() == 15 && is_hex(raw), reason::SONY)?;
    let val = hex_u64(raw, reason::SONY)?;
    let millis = ((val >> 24) as i64 + SONY_EPOCH_DECIMILLIS) * 10;
    from_unix_millis(millis)
}

pub(crate) fn decode_uuid(raw: &str) -> Result<DateTime> {
    let parts: Vec<&str> = raw.split('-').collect();
    let widths = [8, 4, 4, 4, 12];
    shape(
        parts.len() == 5
            && parts
                .iter()
                .zip(widths)
                .all(|(p, w)| p.len() == w && is_hex(p)),
        reason::UUID,
    )?;
    let time_low = hex_u64(parts[0], reason::UUID)?;
    let time_mid = hex_u64(parts[1], reason::UUID)?;
    let time_hi = hex_u64(parts[2], reason::UUID)?;
    if time_hi >> 12 != 1 {
        return Err(Error::Range {
            reason: "only version 1 UUIDs embed a timestamp",
        });
    }
    let ticks = ((time_hi & 0xfff) << 48) | (time_mid << 32) | time_low;
    // 100ns ticks since 1582-10-15
    let millis = (ticks / 10_000) as i64 - UUID_UNIX_DELTA_MILLIS;
    from_unix_millis(millis)
}

pub(crate) fn decode_dhcp6(raw: &str) -> Result<DateTime> {
    shape(raw.len() >= 28 && is_hex(raw), reason::DHCP6)?;
    let secs = hex_u64(&raw[8..16], reason::DHCP6)? as i64 + DHCP6_UNIX_DELTA_SECS;
    Ok(DateTime::from_utc(utc_from_unix(secs, 0)?))
}

pub(crate) fn encode_dhcp6(dt: &DateTime) -> Result<String> {
    let secs = dt.unix_secs() - DHCP6_UNIX_DELTA_SECS;
    let secs = u32::try_from(secs).map_err(|_| Error::Range {
        reason: "date outside the DUID-LLT span",
    })?;
    // DUID-LLT header, seconds since 2000, zeroed link-layer address
    Ok(format!("00010001{secs:08x}000000000000"))
}

pub(crate) fn decode_gbound(raw: &str) -> Result<DateTime> {
    shape(raw.len() == 28 && is_hex(raw), reason::GBOUND)?;
    let working = &raw[12..26];
    let micros = i64::from_str_radix(
        &format!("{}{}", &working[6..14], &working[..6]),
        16,
    )
    .map_err(|_| Error::Shape {
        reason: reason::GBOUND,
    })?;
    Ok(DateTime::from_utc(utc_from_unix_micros(micros)?))
}

pub(crate) fn encode_gbound(dt: &DateTime) -> Result<String> {
    let micros = u64::try_from(dt.unix_micros()).map_err(|_| Error::Range {
        reason: "date precedes the Unix epoch",
    })?;
    // the boundary layout holds exactly 14 hex digits of microseconds
    if micros >= 1 << 56 {
        return Err(Error::Range {
            reason: "date outside the boundary span",
        });
    }
    let hex = format!("{micros:014x}");
    Ok(format!("000000000000{}{}00", &hex[8..14], &hex[..8]))
}

pub(crate) fn decode_gmsgid(raw: &str) -> Result<DateTime> {
    let hex = if raw.len() == 19 && is_digits(raw) {
        // IMAP surface exposes the same value in decimal
        let val: u64 = raw.parse().map_err(|_| Error::Shape {
            reason: reason::GMSGID,
        })?;
        format!("{val:x}")
    } else {
        shape(raw.len() == 16 && is_hex(raw), reason::GMSGID)?;
        raw.to_string()
    };
    if hex.len() < 11 {
        return Err(Error::Range {
            reason: "value is too small to carry milliseconds",
        });
    }
    let millis = i64::from_str_radix(&hex[..11], 16).map_err(|_| Error::Shape {
        reason: reason::GMSGID,
    })?;
    from_unix_millis(millis)
}

pub(crate) fn encode_gmsgid(dt: &DateTime) -> Result<String> {
    let millis = u64::try_from(dt.unix_micros().div_euclid(1_000)).map_err(|_| Error::Range {
        reason: "date precedes the Unix epoch",
    })?;
    Ok(format!("{millis:x}00000"))
}

pub(crate) fn decode_s32(raw: &str) -> Result<DateTime> {
    shape(
        raw.len() == 9 && raw.bytes().all(|b| S32_CHARSET.contains(&b)),
        reason::S32,
    )?;
    let mut millis: i64 = 0;
    for ch in raw.bytes() {
        let digit = S32_CHARSET.iter().position(|&c| c == ch).unwrap_or_default();
        millis = millis * 32 + digit as i64;
    }
    from_unix_millis(millis)
}

pub(crate) fn encode_s32(dt: &DateTime) -> Result<String> {
    let mut millis = u64::try_from(dt.unix_micros().div_euclid(1_000)).map_err(|_| {
        Error::Range {
            reason: "date precedes the Unix epoch",
        }
    })?;
    let mut out = Vec::new();
    while millis > 0 {
        out.push(char::from(S32_CHARSET[(millis % 32) as usize]));
        millis /= 32;
    }
    Ok(out.into_iter().rev().collect())
}

pub(crate) fn decode_vmsd(raw: &str) -> Result<DateTime> {
    let (high, low) = raw.split_once(',').ok_or(Error::Shape {
        reason: reason::VMSD,
    })?;
    let low_mag = low.strip_prefix('-').unwrap_or(low);
    shape(
        high.len() == 6 && is_digits(high) && low_mag.len() >= 9 && is_digits(low_mag),
        reason::VMSD,
    )?;
    let high: i64 = high.parse().map_err(|_| Error::Shape {
        reason: reason::VMSD,
    })?;
    let low: i64 = low.parse().map_err(|_| Error::Shape {
        reason: reason::VMSD,
    })?;
    let low_bits = i64::from(low as i32 as u32);
    let micros = (high << 32) + low_bits;
    if micros / 1_000_000 >= 10_000_000_000_000 {
        return Err(Error::Range {
            reason: "snapshot pair is beyond the representable span",
        });
    }
    Ok(DateTime::from_utc(utc_from_unix_micros(micros)?))
}

pub(crate) fn encode_vmsd(dt: &DateTime) -> Result<String> {
    let micros = u64::try_from(dt.unix_micros()).map_err(|_| Error::Range {
        reason: "date precedes the Unix epoch",
    })?;
    let high = micros >> 32;
    let low = (micros & 0xffff_ffff) as u32 as i32;
    Ok(format!("{high},{low}"))
}

#[cfg(test)]
mod test {
    use super::*;
    use test_case::test_case;

    #[test]
    fn eitime() {
        let dt = decode_eitime("Cv5PZA").unwrap();
        assert_eq!(dt.to_string(), "2023-05-01 17:59:38.000000");

        let dt = crate::DateTime::parse("2020-01-01 00:00:00").unwrap();
        assert_eq!(encode_eitime(&dt).unwrap(), "AOELXg");
    }

    #[test]
    fn snowflakes() {
        let dt = decode_tiktok("7228142017547750661").unwrap();
        assert_eq!(dt.to_string(), "2023-05-01 09:22:38.000000");

        let dt = decode_twitter("1653078434443132928").unwrap();
        assert_eq!(dt.to_string(), "2023-05-01 16:46:26.140000");

        let dt = decode_discord("1102608904745127937").unwrap();
        assert_eq!(dt.to_string(), "2023-05-01 14:54:08.374000");

        let dt = decode_mastodon("110294727262208000").unwrap();
        assert_eq!(dt.to_string(), "2023-05-01 17:59:38.000000");
    }

    #[test]
    fn mastodon_round_trip() {
        let dt = crate::DateTime::parse("2020-01-01 00:00:00").unwrap();
        let enc = encode_mastodon(&dt).unwrap();
        assert_eq!(enc, "103405112524800000");
        assert_eq!(decode_mastodon(&enc).unwrap(), dt);
    }

    #[test]
    fn ksuid() {
        let dt = decode_ksalnum("2PChRqPZDwT9m2gBDLd5uy7XNTr").unwrap();
        assert_eq!(dt.to_string(), "2023-05-01 18:49:25.000000");

        let dt = decode_ksdec("282963978").unwrap();
        assert_eq!(dt.to_string(), "2023-05-01 17:59:38.000000");
        assert_eq!(encode_ksdec(&dt).unwrap(), "282963978");
    }

    #[test]
    fn metasploit_payload() {
        let dt = decode_metasploit("4PGoVGYmx8l6F3sVI4Rc8g").unwrap();
        assert_eq!(dt.to_string(), "2017-08-15 16:52:53.000000");
    }

    #[test]
    fn sonyflake() {
        let dt = decode_sony("65dd4bb89000001").unwrap();
        assert_eq!(dt.to_string(), "2023-05-01 19:37:45.050000");
    }

    #[test]
    fn uuid_v1() {
        let dt = decode_uuid("d93026f0-e857-11ed-a05b-0242ac120003").unwrap();
        assert_eq!(dt.to_string(), "2023-05-01 19:39:12.196000");
        // version 4 has no clock in it
        assert!(matches!(
            decode_uuid("d93026f0-e857-41ed-a05b-0242ac120003"),
            Err(Error::Range { .. })
        ));
    }

    #[test]
    fn dhcp6_duid() {
        let dt = decode_dhcp6("000100012be2ba8a000000000000").unwrap();
        assert_eq!(dt.to_string(), "2023-05-01 17:59:38.000000");

        let dt = crate::DateTime::parse("2020-01-01 00:00:00").unwrap();
        let enc = encode_dhcp6(&dt).unwrap();
        assert_eq!(enc, "00010001259e9d80000000000000");
        assert_eq!(decode_dhcp6(&enc).unwrap(), dt);
    }

    #[test]
    fn gmail_values() {
        let dt = decode_gbound("0000000000001872d105faa59600").unwrap();
        assert_eq!(dt.to_string(), "2023-05-01 17:59:38.285777");

        let dt = decode_gmsgid("187d878582d00000").unwrap();
        assert_eq!(dt.to_string(), "2023-05-01 17:59:38.285000");

        let dt = crate::DateTime::parse("2020-01-01 00:00:00").unwrap();
        assert_eq!(encode_gbound(&dt).unwrap(), "000000000000fa4000059b08c100");
        assert_eq!(encode_gmsgid(&dt).unwrap(), "16f5e66e80000000");
    }

    #[test]
    fn gbound_rejects_unrepresentable_micros() {
        // past 16^14 microseconds the layout would silently corrupt
        let dt = crate::DateTime::parse("4300-01-01 00:00:00").unwrap();
        assert!(matches!(encode_gbound(&dt), Err(Error::Range { .. })));
    }

    #[test]
    fn s32_base() {
        let dt = decode_s32("3kzgbkpsk").unwrap();
        assert_eq!(dt.to_string(), "2023-05-01 17:59:38.000000");

        let dt = crate::DateTime::parse("2020-01-01 00:00:00").unwrap();
        assert_eq!(encode_s32(&dt).unwrap(), "3hxjahu22");
    }

    #[test]
    fn vmsd_pair() {
        let dt = decode_vmsd("391845,-1777068416").unwrap();
        assert_eq!(dt.to_string(), "2023-05-01 17:59:38.000000");

        let dt = crate::DateTime::parse("2020-01-01 00:00:00").unwrap();
        assert_eq!(encode_vmsd(&dt).unwrap(), "367368,-1040564224");
    }

    #[test_case("Cv5PZA!"; "ei bad charset")]
    #[test_case("123456789012345678"; "tiktok too short")]
    #[test_case("2PChRqPZDwT9m2gBDLd5uy7XNT"; "ksuid too short")]
    fn shape_rejects(raw: &str) {
        let result = match raw.len() {
            7 => decode_eitime(raw),
            18 => decode_tiktok(raw),
            _ => decode_ksalnum(raw),
        };
        assert!(matches!(result, Err(Error::Shape { .. })));
    }
}
