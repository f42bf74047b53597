#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// Raw input does not match the format's fixed length, charset, or
    /// delimiter layout. The reason is the format's static hint string.
    #[error("{reason}")]
    Shape { reason: &'static str },
    /// Input had the right shape but the arithmetic lands outside the
    /// format's representable calendar span.
    #[error("value out of range: {reason}")]
    Range { reason: &'static str },
    /// The free-text date string could not be interpreted.
    #[error("unable to parse date string {input:?}")]
    Parse { input: String },
    /// The format cannot perform the requested direction, e.g. encoding
    /// into an identifier that embeds non-time fields.
    #[error("{what} is not supported for this format")]
    Unsupported { what: &'static str },
    /// The guess scan ran every format and none produced a valid date.
    #[error("no valid dates found")]
    NoMatches,
    /// A codec failed unexpectedly; caught at the codec boundary so batch
    /// scans keep going.
    #[error("internal failure decoding format {format}")]
    Internal { format: &'static str },
}

pub type Result<T> = std::result::Result<T, Error>;
