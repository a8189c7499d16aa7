//! HTTP client for the upstream rate provider.
//!
//! Issues one GET per lookup against a Frankfurter-style API
//! (`/latest?base=X` for current rates, `/{YYYY-MM-DD}?base=X` for a single
//! day) and classifies every failure into [`ProviderError`].

use std::collections::HashMap;

use chrono::NaiveDate;
use reqwest::StatusCode;
use rust_decimal::Decimal;
use serde::Deserialize;

use rates_types::{CurrencyCode, ExchangeRate, HistoricalRate, ProviderError, RateProvider};

/// Rate provider backed by an external HTTP API.
pub struct HttpRateProvider {
    http: reqwest::Client,
    base_url: String,
}

/// Upstream response body. Extra fields (e.g. an `amount` echo) are ignored.
#[derive(Debug, Deserialize)]
struct UpstreamRates {
    base: CurrencyCode,
    date: NaiveDate,
    rates: HashMap<CurrencyCode, Decimal>,
}

impl HttpRateProvider {
    /// Creates a provider client against the given API root.
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    async fn fetch(&self, path: &str, base: CurrencyCode) -> Result<UpstreamRates, ProviderError> {
        let url = format!("{}/{}", self.base_url, path);
        let resp = self
            .http
            .get(&url)
            .query(&[("base", base.as_str())])
            .send()
            .await
            .map_err(|e| ProviderError::Unavailable(format!("request to {url} failed: {e}")))?;

        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ProviderError::InvalidCurrency(base.to_string()));
        }
        if !status.is_success() {
            return Err(ProviderError::Unavailable(format!(
                "upstream returned {status} for {url}"
            )));
        }

        let parsed: UpstreamRates = resp
            .json()
            .await
            .map_err(|e| ProviderError::Unavailable(format!("invalid response body: {e}")))?;

        // A well-formed response with no rates carries nothing we can serve.
        if parsed.rates.is_empty() {
            return Err(ProviderError::NoData);
        }

        Ok(parsed)
    }
}

#[async_trait::async_trait]
impl RateProvider for HttpRateProvider {
    async fn fetch_latest(&self, base: CurrencyCode) -> Result<ExchangeRate, ProviderError> {
        let upstream = self.fetch("latest", base).await?;
        Ok(ExchangeRate {
            base_currency: upstream.base,
            rates: upstream.rates,
        })
    }

    async fn fetch_for_date(
        &self,
        base: CurrencyCode,
        date: NaiveDate,
    ) -> Result<HistoricalRate, ProviderError> {
        let path = date.format("%Y-%m-%d").to_string();
        let upstream = self.fetch(&path, base).await?;
        Ok(HistoricalRate {
            base_currency: upstream.base,
            date: upstream.date,
            rates: upstream.rates,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Json, Router, http::StatusCode, routing::get};
    use serde_json::json;

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn usd() -> CurrencyCode {
        CurrencyCode::parse("USD").unwrap()
    }

    #[tokio::test]
    async fn test_latest_parses_rates() {
        let router = Router::new().route(
            "/latest",
            get(|| async {
                Json(json!({"base": "USD", "date": "2024-01-15", "rates": {"EUR": 0.9, "GBP": 0.78}}))
            }),
        );
        let provider = HttpRateProvider::new(reqwest::Client::new(), serve(router).await);

        let rates = provider.fetch_latest(usd()).await.unwrap();

        assert_eq!(rates.base_currency, usd());
        assert_eq!(rates.rates.len(), 2);
        assert_eq!(
            rates.rates[&CurrencyCode::parse("EUR").unwrap()],
            "0.9".parse().unwrap()
        );
    }

    #[tokio::test]
    async fn test_for_date_hits_day_path() {
        let router = Router::new().route(
            "/2024-01-15",
            get(|| async {
                Json(json!({"base": "USD", "date": "2024-01-15", "rates": {"EUR": 0.91}}))
            }),
        );
        let provider = HttpRateProvider::new(reqwest::Client::new(), serve(router).await);

        let day = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let rates = provider.fetch_for_date(usd(), day).await.unwrap();

        assert_eq!(rates.date, day);
    }

    #[tokio::test]
    async fn test_404_classified_as_invalid_currency() {
        let router = Router::new().route("/latest", get(|| async { StatusCode::NOT_FOUND }));
        let provider = HttpRateProvider::new(reqwest::Client::new(), serve(router).await);

        let err = provider.fetch_latest(usd()).await.unwrap_err();

        assert!(matches!(err, ProviderError::InvalidCurrency(code) if code == "USD"));
    }

    #[tokio::test]
    async fn test_server_error_classified_as_unavailable() {
        let router =
            Router::new().route("/latest", get(|| async { StatusCode::INTERNAL_SERVER_ERROR }));
        let provider = HttpRateProvider::new(reqwest::Client::new(), serve(router).await);

        let err = provider.fetch_latest(usd()).await.unwrap_err();

        assert!(matches!(err, ProviderError::Unavailable(_)));
    }

    #[tokio::test]
    async fn test_empty_rates_classified_as_no_data() {
        let router = Router::new().route(
            "/latest",
            get(|| async { Json(json!({"base": "USD", "date": "2024-01-15", "rates": {}})) }),
        );
        let provider = HttpRateProvider::new(reqwest::Client::new(), serve(router).await);

        let err = provider.fetch_latest(usd()).await.unwrap_err();

        assert!(matches!(err, ProviderError::NoData));
    }

    #[tokio::test]
    async fn test_connection_failure_classified_as_unavailable() {
        // Nothing listens on port 1.
        let provider = HttpRateProvider::new(reqwest::Client::new(), "http://127.0.0.1:1");

        let err = provider.fetch_latest(usd()).await.unwrap_err();

        assert!(matches!(err, ProviderError::Unavailable(_)));
    }

    #[tokio::test]
    async fn test_malformed_body_classified_as_unavailable() {
        let router = Router::new().route("/latest", get(|| async { "not json" }));
        let provider = HttpRateProvider::new(reqwest::Client::new(), serve(router).await);

        let err = provider.fetch_latest(usd()).await.unwrap_err();

        assert!(matches!(err, ProviderError::Unavailable(_)));
    }
}
