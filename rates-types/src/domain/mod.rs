//! Pure domain types for the rates gateway.
//!
//! No IO, no framework types - just currency codes and rate sets.

mod currency;
mod rates;

pub use currency::CurrencyCode;
pub use rates::{ExchangeRate, HistoricalRate};
