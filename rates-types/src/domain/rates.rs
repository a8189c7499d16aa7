//! Rate set records produced by the upstream provider.

use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::CurrencyCode;

/// The latest exchange rates for a base currency.
///
/// Immutable once returned; cached under `latest-<BASE>` for a short TTL.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeRate {
    /// Currency all rates are expressed relative to
    #[schema(value_type = String, example = "USD")]
    pub base_currency: CurrencyCode,
    /// Currency code -> decimal rate
    #[schema(value_type = std::collections::HashMap<String, Decimal>)]
    pub rates: HashMap<CurrencyCode, Decimal>,
}

/// Exchange rates for a base currency on a single calendar day.
///
/// One instance per day in a historical range; collected into a
/// date-ascending series.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalRate {
    /// Currency all rates are expressed relative to
    #[schema(value_type = String, example = "USD")]
    pub base_currency: CurrencyCode,
    /// Calendar day the rates apply to
    pub date: NaiveDate,
    /// Currency code -> decimal rate
    #[schema(value_type = std::collections::HashMap<String, Decimal>)]
    pub rates: HashMap<CurrencyCode, Decimal>,
}
