//! Currency Application Service
//!
//! Orchestrates cache-first lookups against the upstream provider port.
//! Contains NO infrastructure logic - validation, caching policy, and
//! error translation only.

use std::time::Duration;

use rates_types::{
    AppError, ConvertRequest, ConvertResponse, CurrencyCode, DomainError, ExchangeRate,
    HistoricalRate, HistoryQuery, ProviderError, RateCache, RateProvider,
};

/// TTL for latest-rate cache entries.
const LATEST_TTL: Duration = Duration::from_secs(5 * 60);
/// TTL for historical series cache entries.
const HISTORY_TTL: Duration = Duration::from_secs(10 * 60);

/// Currency codes the gateway refuses to convert, in either direction.
const UNSUPPORTED: [&str; 4] = ["TRY", "PLN", "THB", "MXN"];

/// Application service for currency rate operations.
///
/// Generic over `P: RateProvider` and `C: RateCache` - the adapters are
/// injected at compile time. This enables:
/// - Swapping the upstream client or cache backend without code changes
/// - Testing with mock provider/cache implementations
/// - Compile-time checks for port implementation
pub struct CurrencyService<P: RateProvider, C: RateCache> {
    provider: P,
    cache: C,
}

impl<P: RateProvider, C: RateCache> CurrencyService<P, C> {
    /// Creates a new currency service with the given adapters.
    pub fn new(provider: P, cache: C) -> Self {
        Self { provider, cache }
    }

    /// Returns a reference to the underlying provider.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Returns a reference to the underlying cache.
    pub fn cache(&self) -> &C {
        &self.cache
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Latest rates
    // ─────────────────────────────────────────────────────────────────────────

    /// Returns the latest rates for a base currency, cache-first.
    pub async fn get_latest_rates(&self, base: &str) -> Result<ExchangeRate, AppError> {
        let base = CurrencyCode::parse(base)?;
        let key = format!("latest-{base}");

        if let Some(cached) = self.cache.get::<ExchangeRate>(&key).await {
            tracing::debug!(%base, "latest rates served from cache");
            return Ok(cached);
        }

        let rates = self.provider.fetch_latest(base).await?;
        if rates.rates.is_empty() {
            return Err(AppError::NoData(format!("no rates available for {base}")));
        }

        self.cache.set(&key, &rates, LATEST_TTL).await;
        Ok(rates)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Conversion
    // ─────────────────────────────────────────────────────────────────────────

    /// Converts an amount between two currencies at the current rate.
    ///
    /// Deliberately bypasses the latest-rate cache: conversions always see a
    /// fresh rate set, even when `get_latest_rates` just cached the same base.
    pub async fn convert(&self, req: ConvertRequest) -> Result<ConvertResponse, AppError> {
        let from = CurrencyCode::parse(&req.from_currency)?;
        let to = CurrencyCode::parse(&req.to_currency)?;

        for code in [from, to] {
            if UNSUPPORTED.contains(&code.as_str()) {
                return Err(AppError::UnsupportedCurrency(code));
            }
        }

        let rates = self.provider.fetch_latest(from).await?;
        let rate = rates
            .rates
            .get(&to)
            .copied()
            .ok_or(AppError::RateNotFound {
                base: from,
                target: to,
            })?;

        Ok(ConvertResponse {
            amount: req.amount * rate,
        })
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Historical series
    // ─────────────────────────────────────────────────────────────────────────

    /// Returns one page of the historical rate series for a date range.
    ///
    /// The full unpaginated series is cached; pagination is always recomputed
    /// against it, never cached itself.
    pub async fn get_historical_rates(
        &self,
        query: HistoryQuery,
    ) -> Result<Vec<HistoricalRate>, AppError> {
        let base = CurrencyCode::parse(&query.base_currency)?;
        if query.start_date > query.end_date {
            return Err(DomainError::InvalidDateRange {
                start: query.start_date,
                end: query.end_date,
            }
            .into());
        }
        if query.page == 0 {
            return Err(AppError::BadRequest("page must be at least 1".into()));
        }
        if query.page_size == 0 {
            return Err(AppError::BadRequest("pageSize must be at least 1".into()));
        }

        let key = format!(
            "historical-{base}-{}-{}",
            query.start_date, query.end_date
        );

        let series = match self.cache.get::<Vec<HistoricalRate>>(&key).await {
            Some(cached) => {
                tracing::debug!(%base, "historical series served from cache");
                cached
            }
            None => {
                let series = self
                    .fetch_series(base, query.start_date, query.end_date)
                    .await?;
                self.cache.set(&key, &series, HISTORY_TTL).await;
                series
            }
        };

        let offset = (query.page as usize - 1) * query.page_size as usize;
        Ok(series
            .into_iter()
            .skip(offset)
            .take(query.page_size as usize)
            .collect())
    }

    /// Fetches every day in the inclusive range, one upstream call per day.
    ///
    /// A day with no data is skipped with a warning; the range only fails as
    /// a whole when zero days yield data.
    async fn fetch_series(
        &self,
        base: CurrencyCode,
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
    ) -> Result<Vec<HistoricalRate>, AppError> {
        let mut series = Vec::new();
        let mut day = start;
        loop {
            match self.provider.fetch_for_date(base, day).await {
                Ok(rates) => series.push(rates),
                Err(ProviderError::NoData) => {
                    tracing::warn!(%base, %day, "no rates for day, skipping");
                }
                Err(err) => return Err(err.into()),
            }
            if day >= end {
                break;
            }
            match day.succ_opt() {
                Some(next) => day = next,
                None => break,
            }
        }

        if series.is_empty() {
            return Err(AppError::NoData(format!(
                "no historical rates for {base} between {start} and {end}"
            )));
        }

        series.sort_by_key(|r| r.date);
        Ok(series)
    }
}
