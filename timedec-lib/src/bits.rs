//! Shape validation and byte-layout helpers shared by the format codecs.
//!
//! Every codec validates raw input length and character class here before
//! doing any arithmetic, so a malformed value is rejected with the
//! format's own reason string instead of surfacing a parse error.

use crate::{Error, Result};

pub(crate) fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

pub(crate) fn is_hex(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Turn a failed shape predicate into the format's static reason.
pub(crate) fn shape(ok: bool, reason: &'static str) -> Result<()> {
    if ok {
        Ok(())
    } else {
        Err(Error::Shape { reason })
    }
}

/// Reverse the byte order of an even-length hex string
/// (`"2afc32b2"` -> `"b232fc2a"`).
pub(crate) fn swap_hex_bytes(s: &str) -> String {
    s.as_bytes()
        .chunks(2)
        .rev()
        .flat_map(|pair| pair.iter().map(|&b| b as char))
        .collect()
}

/// Swap the two bytes within each 16-bit hex word
/// (`"a1567023"` -> `"56a12370"`).
pub(crate) fn swap_hex_words(s: &str) -> String {
    s.as_bytes()
        .chunks(4)
        .flat_map(|word| {
            let (hi, lo) = word.split_at(word.len().min(2));
            lo.iter().chain(hi.iter()).map(|&b| b as char)
        })
        .collect()
}

pub(crate) fn hex_u64(s: &str, reason: &'static str) -> Result<u64> {
    u64::from_str_radix(s, 16).map_err(|_| Error::Shape { reason })
}

pub(crate) fn dec_u64(s: &str, reason: &'static str) -> Result<u64> {
    s.parse().map_err(|_| Error::Shape { reason })
}

pub(crate) fn dec_i64(s: &str, reason: &'static str) -> Result<i64> {
    s.parse().map_err(|_| Error::Shape { reason })
}

pub(crate) fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 => {
            if (year % 4 == 0 && year % 100 != 0) || year % 400 == 0 {
                29
            } else {
                28
            }
        }
        _ => 0,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn hex_swaps() {
        assert_eq!(swap_hex_bytes("2afc32b2567cd901"), "01d97c56b232fc2a");
        assert_eq!(swap_hex_words("a156738f"), "56a18f73");
    }

    #[test]
    fn charsets() {
        assert!(is_digits("1593561600"));
        assert!(!is_digits("1593561600x"));
        assert!(!is_digits(""));
        assert!(is_hex("01d645d70e3b8000"));
        assert!(!is_hex("01d645d70e3b800g"));
    }

    #[test]
    fn month_lengths() {
        assert_eq!(days_in_month(2023, 2), 28);
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(1900, 2), 28);
        assert_eq!(days_in_month(2000, 2), 29);
        assert_eq!(days_in_month(2023, 4), 30);
        assert_eq!(days_in_month(2023, 13), 0);
    }
}
