//! Upstream rate provider port.
//!
//! This trait defines the interface for external rate data sources.
//! Implementations can be HTTP clients, resilience wrappers, mock providers, etc.

use chrono::NaiveDate;

use crate::domain::{CurrencyCode, ExchangeRate, HistoricalRate};
use crate::error::ProviderError;

/// Port trait for upstream rate providers.
///
/// Each call corresponds to one logical upstream lookup; implementations
/// classify every failure into [`ProviderError`] before returning.
#[async_trait::async_trait]
pub trait RateProvider: Send + Sync + 'static {
    /// Fetches the latest rate set for a base currency.
    async fn fetch_latest(&self, base: CurrencyCode) -> Result<ExchangeRate, ProviderError>;

    /// Fetches the rate set for a base currency on a specific calendar day.
    async fn fetch_for_date(
        &self,
        base: CurrencyCode,
        date: NaiveDate,
    ) -> Result<HistoricalRate, ProviderError>;
}
