#![doc = include_str!("../README.md")]

mod bits;
mod epoch;
mod error;

pub mod convert;
pub mod datetime;
pub mod format;
pub mod guess;
pub mod leapsecs;

pub use datetime::DateTime;
pub use error::{Error, Result};
