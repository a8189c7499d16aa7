//! Data Transfer Objects (DTOs) for requests and responses.
//!
//! The wire format is camelCase JSON; query parameters use the same casing.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

// ─────────────────────────────────────────────────────────────────────────────
// Auth DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Credentials for token issuance.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenRequest {
    #[schema(example = "admin")]
    pub username: String,
    pub password: String,
}

/// A freshly issued JWT.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    pub token: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Currency DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Request to convert an amount between two currencies.
///
/// Currency codes are case-insensitive on input.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConvertRequest {
    /// Amount in the source currency
    #[schema(value_type = f64, example = 100.0)]
    pub amount: Decimal,
    /// Source currency code
    #[schema(example = "USD")]
    pub from_currency: String,
    /// Target currency code
    #[schema(example = "EUR")]
    pub to_currency: String,
}

/// Converted amount in the target currency.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ConvertResponse {
    #[schema(value_type = f64, example = 90.0)]
    pub amount: Decimal,
}

/// Query parameters for a historical rate lookup.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct HistoryQuery {
    /// Base currency code
    #[param(example = "USD")]
    pub base_currency: String,
    /// First day of the range (inclusive)
    pub start_date: NaiveDate,
    /// Last day of the range (inclusive)
    pub end_date: NaiveDate,
    /// 1-based page number
    #[serde(default = "default_page")]
    #[param(default = 1)]
    pub page: u32,
    /// Days per page
    #[serde(default = "default_page_size")]
    #[param(default = 50)]
    pub page_size: u32,
}

fn default_page() -> u32 {
    1
}

fn default_page_size() -> u32 {
    50
}
