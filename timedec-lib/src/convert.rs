//! Encode one date into every representable format in a single pass.

use serde::Serialize;

use crate::datetime::DateTime;
use crate::format;

/// One format's rendering of the input date.
#[derive(Debug, Clone, Serialize)]
pub struct Encoded {
    pub id: &'static str,
    pub name: &'static str,
    pub value: String,
}

/// Encode `dt` into every format that can represent it. Formats that do
/// not support encoding, or whose span excludes the date, are skipped.
pub fn encode_all(dt: &DateTime) -> Vec<Encoded> {
    format::ALL
        .iter()
        .filter_map(|desc| {
            desc.format.encode(dt).ok().map(|value| Encoded {
                id: desc.id,
                name: desc.name,
                value,
            })
        })
        .collect()
}
