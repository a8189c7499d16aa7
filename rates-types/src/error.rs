//! Error types for the rates gateway.

use crate::domain::CurrencyCode;

/// Domain-level errors (input validation violations).
#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error("Invalid currency code: '{0}' (expected a 3-letter code)")]
    InvalidCurrencyCode(String),

    #[error("Invalid date range: start {start} is after end {end}")]
    InvalidDateRange {
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
    },
}

/// Errors produced at the upstream provider boundary.
///
/// Every outbound failure is classified into one of these three buckets
/// before it reaches the application layer.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// Upstream answered 404 - the base currency is not a known code.
    #[error("Unknown currency code: {0}")]
    InvalidCurrency(String),

    /// Upstream answered successfully but the response carried no rates.
    #[error("No rate data available")]
    NoData,

    /// Transport failure, non-2xx response other than 404, exhausted
    /// retries, or an open circuit breaker.
    #[error("Rate provider unavailable: {0}")]
    Unavailable(String),
}

/// Application-level errors (for HTTP responses).
///
/// Closed set of variants the HTTP boundary maps to status codes.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid currency code: {0}")]
    InvalidCurrency(String),

    #[error("Currency not supported: {0}")]
    UnsupportedCurrency(CurrencyCode),

    #[error("No rate from {base} to {target}")]
    RateNotFound {
        base: CurrencyCode,
        target: CurrencyCode,
    },

    #[error("No data: {0}")]
    NoData(String),

    /// Surfaced to callers with a generic message; the underlying detail
    /// is logged server-side by the adapter that observed it.
    #[error("Exchange rate provider is currently unavailable")]
    UpstreamUnavailable,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::InvalidCurrencyCode(code) => AppError::InvalidCurrency(code),
            e @ DomainError::InvalidDateRange { .. } => AppError::BadRequest(e.to_string()),
        }
    }
}

impl From<ProviderError> for AppError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::InvalidCurrency(code) => AppError::InvalidCurrency(code),
            ProviderError::NoData => AppError::NoData("No rate data available".into()),
            ProviderError::Unavailable(_) => AppError::UpstreamUnavailable,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unavailable_detail_is_not_exposed() {
        let err: AppError = ProviderError::Unavailable("connection refused to 10.0.0.1".into()).into();
        assert!(matches!(err, AppError::UpstreamUnavailable));
        assert!(!err.to_string().contains("10.0.0.1"));
    }

    #[test]
    fn test_provider_404_maps_to_invalid_currency() {
        let err: AppError = ProviderError::InvalidCurrency("XYZ".into()).into();
        assert!(matches!(err, AppError::InvalidCurrency(_)));
    }
}
