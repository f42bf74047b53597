//! UTC leap second table, used by the GPS codec pair.
//!
//! Intervals map a span of UTC time to the cumulative UTC-TAI leap second
//! count in effect during that span. No leap second has been announced
//! since 2017-01-01, so the final interval is open-ended; its upper bound
//! is pinned to the process start time rather than a constant.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};

/// One leap second interval: `offset` cumulative seconds are in effect for
/// instants in `[from, until)`, both Unix seconds.
#[derive(Debug, Clone, Copy)]
pub struct LeapSecond {
    pub offset: i64,
    pub from: i64,
    pub until: i64,
}

// Interval starts per IERS Bulletin C; bounds precomputed as Unix seconds.
const INTERVALS: [(i64, i64, i64); 27] = [
    (10, 63_072_000, 78_796_800),        // 1972-01
    (11, 78_796_800, 94_694_400),        // 1972-07
    (12, 94_694_400, 126_230_400),       // 1973-01
    (13, 126_230_400, 157_766_400),      // 1974-01
    (14, 157_766_400, 189_302_400),      // 1975-01
    (15, 189_302_400, 220_924_800),      // 1976-01
    (16, 220_924_800, 252_460_800),      // 1977-01
    (17, 252_460_800, 283_996_800),      // 1978-01
    (18, 283_996_800, 315_532_800),      // 1979-01
    (19, 315_532_800, 362_793_600),      // 1980-01
    (20, 362_793_600, 394_329_600),      // 1981-07
    (21, 394_329_600, 425_865_600),      // 1982-07
    (22, 425_865_600, 489_024_000),      // 1983-07
    (23, 489_024_000, 567_993_600),      // 1985-07
    (24, 567_993_600, 631_152_000),      // 1988-01
    (25, 631_152_000, 662_688_000),      // 1990-01
    (26, 662_688_000, 709_948_800),      // 1991-01
    (27, 709_948_800, 741_484_800),      // 1992-07
    (28, 741_484_800, 773_020_800),      // 1993-07
    (29, 773_020_800, 820_454_400),      // 1994-07
    (30, 820_454_400, 867_715_200),      // 1996-01
    (31, 867_715_200, 915_148_800),      // 1997-07
    (32, 915_148_800, 1_136_073_600),    // 1999-01
    (33, 1_136_073_600, 1_230_768_000),  // 2006-01
    (34, 1_230_768_000, 1_341_100_800),  // 2009-01
    (35, 1_341_100_800, 1_435_708_800),  // 2012-07
    (36, 1_435_708_800, 1_483_228_800),  // 2015-07
];

const FINAL_OFFSET: i64 = 37;
const FINAL_FROM: i64 = 1_483_228_800; // 2017-01

static TABLE: LazyLock<Vec<LeapSecond>> = LazyLock::new(|| {
    let mut table: Vec<LeapSecond> = INTERVALS
        .iter()
        .map(|&(offset, from, until)| LeapSecond { offset, from, until })
        .collect();
    table.push(LeapSecond {
        offset: FINAL_OFFSET,
        from: FINAL_FROM,
        until: Utc::now().timestamp() - FINAL_OFFSET,
    });
    table
});

/// Cumulative leap second offset in effect at `utc`.
///
/// Intervals are non-overlapping and ordered, so the first match wins.
/// Instants before 1972, or after the open-ended final bound, carry no
/// offset.
pub fn offset_at(utc: DateTime<Utc>) -> i64 {
    let secs = utc.timestamp();
    TABLE
        .iter()
        .find(|leap| secs >= leap.from && secs < leap.until)
        .map_or(0, |leap| leap.offset)
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn known_offsets() {
        let cases = [
            ((1975, 6, 1), 14),
            ((1972, 1, 1), 10),
            ((1998, 12, 31), 31),
            ((2017, 1, 2), 37),
            ((2023, 5, 1), 37),
            ((1970, 1, 1), 0),
        ];
        for ((y, m, d), want) in cases {
            let utc = Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap();
            assert_eq!(offset_at(utc), want, "{y}-{m:02}-{d:02}");
        }
    }

    #[test]
    fn table_is_contiguous() {
        let table = &*TABLE;
        assert_eq!(table.len(), 28);
        for pair in table.windows(2) {
            assert_eq!(pair[0].until, pair[1].from);
            assert_eq!(pair[0].offset + 1, pair[1].offset);
        }
    }
}
