//! Tonggwan Rates - Currency conversion
//!
//! A small rate table quoting supported currencies in KRW, with strict
//! lookups: an unquoted currency is an error, never a default.

pub mod table;

pub use table::{RateError, RateResult, RateTable};
