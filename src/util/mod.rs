//! Shared helpers.

pub mod time;

pub use time::{elapsed_days, month_key, parse_timestamp};
