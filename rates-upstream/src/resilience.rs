//! Retry and circuit-breaker wrapper for outbound provider calls.
//!
//! Transient failures are retried with exponential backoff; repeated
//! failures trip a breaker that fails fast for a cooldown period before
//! letting a trial call through.

use std::future::Future;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use chrono::NaiveDate;
use tokio::time::Instant;

use rates_types::{CurrencyCode, ExchangeRate, HistoricalRate, ProviderError, RateProvider};

/// Retries on transient failure before giving up.
const MAX_RETRIES: u32 = 3;
/// Consecutive failures before the breaker opens.
const FAILURE_THRESHOLD: u32 = 5;
/// How long the breaker stays open before allowing a trial call.
const OPEN_FOR: Duration = Duration::from_secs(30);

/// Guard that stops issuing calls to a failing dependency for a cooldown
/// period after repeated consecutive failures.
///
/// Uses `tokio::time::Instant` so the cooldown participates in paused-time
/// tests.
pub struct CircuitBreaker {
    state: Mutex<BreakerState>,
    failure_threshold: u32,
    open_for: Duration,
}

#[derive(Default)]
struct BreakerState {
    consecutive_failures: u32,
    opened_at: Option<Instant>,
}

impl CircuitBreaker {
    pub fn new(failure_threshold: u32, open_for: Duration) -> Self {
        Self {
            state: Mutex::new(BreakerState::default()),
            failure_threshold,
            open_for,
        }
    }

    fn lock(&self) -> MutexGuard<'_, BreakerState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Fails fast while the breaker is open. Once the cooldown elapses the
    /// breaker is half-open: the next call is let through as a trial.
    pub fn check(&self) -> Result<(), ProviderError> {
        let state = self.lock();
        if let Some(opened_at) = state.opened_at {
            if opened_at.elapsed() < self.open_for {
                return Err(ProviderError::Unavailable("circuit breaker open".into()));
            }
        }
        Ok(())
    }

    /// A successful call closes the breaker and resets the failure count.
    pub fn record_success(&self) {
        let mut state = self.lock();
        state.consecutive_failures = 0;
        state.opened_at = None;
    }

    /// Counts a transient failure; opens (or re-opens) the breaker once the
    /// threshold is reached.
    pub fn record_failure(&self) {
        let mut state = self.lock();
        state.consecutive_failures += 1;
        if state.consecutive_failures >= self.failure_threshold {
            state.opened_at = Some(Instant::now());
        }
    }
}

/// Decorator that applies the resilience policy to every call of an inner
/// [`RateProvider`].
pub struct ResilientProvider<P> {
    inner: P,
    max_retries: u32,
    breaker: CircuitBreaker,
}

impl<P> ResilientProvider<P> {
    /// Wraps a provider with the default policy: 3 retries with 2^attempt
    /// second backoff, breaker opening after 5 consecutive failures for 30s.
    pub fn new(inner: P) -> Self {
        Self::with_policy(inner, MAX_RETRIES, FAILURE_THRESHOLD, OPEN_FOR)
    }

    pub fn with_policy(
        inner: P,
        max_retries: u32,
        failure_threshold: u32,
        open_for: Duration,
    ) -> Self {
        Self {
            inner,
            max_retries,
            breaker: CircuitBreaker::new(failure_threshold, open_for),
        }
    }
}

impl<P: RateProvider> ResilientProvider<P> {
    async fn call<T, F, Fut>(&self, op: &'static str, f: F) -> Result<T, ProviderError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, ProviderError>> + Send,
    {
        self.breaker.check()?;

        let mut attempt = 0u32;
        loop {
            match f().await {
                Ok(value) => {
                    self.breaker.record_success();
                    return Ok(value);
                }
                Err(ProviderError::Unavailable(detail)) => {
                    self.breaker.record_failure();
                    if attempt >= self.max_retries {
                        tracing::error!(
                            op,
                            attempts = attempt + 1,
                            error = %detail,
                            "upstream call failed, retries exhausted"
                        );
                        return Err(ProviderError::Unavailable(detail));
                    }
                    attempt += 1;
                    let delay = Duration::from_secs(1u64 << attempt);
                    tracing::warn!(
                        op,
                        attempt,
                        delay_secs = delay.as_secs(),
                        error = %detail,
                        "transient upstream failure, backing off"
                    );
                    tokio::time::sleep(delay).await;
                    // The breaker may have opened while we were backing off.
                    self.breaker.check()?;
                }
                // 404 and empty responses are well-formed upstream answers,
                // not infrastructure failures.
                Err(err) => {
                    self.breaker.record_success();
                    return Err(err);
                }
            }
        }
    }
}

#[async_trait::async_trait]
impl<P: RateProvider> RateProvider for ResilientProvider<P> {
    async fn fetch_latest(&self, base: CurrencyCode) -> Result<ExchangeRate, ProviderError> {
        self.call("fetch_latest", || self.inner.fetch_latest(base))
            .await
    }

    async fn fetch_for_date(
        &self,
        base: CurrencyCode,
        date: NaiveDate,
    ) -> Result<HistoricalRate, ProviderError> {
        self.call("fetch_for_date", || self.inner.fetch_for_date(base, date))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Provider that fails its first `fail_first` calls with a transient
    /// error, then succeeds.
    struct FlakyProvider {
        calls: AtomicUsize,
        fail_first: usize,
    }

    impl FlakyProvider {
        fn new(fail_first: usize) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail_first,
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn answer(&self, base: CurrencyCode) -> Result<ExchangeRate, ProviderError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if n < self.fail_first {
                Err(ProviderError::Unavailable(format!("boom {n}")))
            } else {
                let mut rates = HashMap::new();
                rates.insert(CurrencyCode::parse("EUR").unwrap(), "0.9".parse().unwrap());
                Ok(ExchangeRate {
                    base_currency: base,
                    rates,
                })
            }
        }
    }

    #[async_trait::async_trait]
    impl RateProvider for FlakyProvider {
        async fn fetch_latest(&self, base: CurrencyCode) -> Result<ExchangeRate, ProviderError> {
            self.answer(base)
        }

        async fn fetch_for_date(
            &self,
            base: CurrencyCode,
            date: NaiveDate,
        ) -> Result<HistoricalRate, ProviderError> {
            self.answer(base).map(|r| HistoricalRate {
                base_currency: r.base_currency,
                date,
                rates: r.rates,
            })
        }
    }

    /// Provider that always returns a non-transient error.
    struct NoDataProvider {
        calls: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl RateProvider for NoDataProvider {
        async fn fetch_latest(&self, _base: CurrencyCode) -> Result<ExchangeRate, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(ProviderError::NoData)
        }

        async fn fetch_for_date(
            &self,
            _base: CurrencyCode,
            _date: NaiveDate,
        ) -> Result<HistoricalRate, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(ProviderError::NoData)
        }
    }

    fn usd() -> CurrencyCode {
        CurrencyCode::parse("USD").unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_recovers_from_transient_failures() {
        let provider = ResilientProvider::new(FlakyProvider::new(2));

        let rates = provider.fetch_latest(usd()).await.unwrap();

        assert_eq!(rates.base_currency, usd());
        assert_eq!(provider.inner.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_exhausted_returns_unavailable() {
        let provider = ResilientProvider::new(FlakyProvider::new(100));

        let err = provider.fetch_latest(usd()).await.unwrap_err();

        assert!(matches!(err, ProviderError::Unavailable(_)));
        // 1 initial attempt + 3 retries
        assert_eq!(provider.inner.calls(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_breaker_opens_after_consecutive_failures_and_fails_fast() {
        let provider = ResilientProvider::new(FlakyProvider::new(100));

        // First call burns 4 attempts; the 5th failure on the next call
        // trips the breaker mid-retry.
        let _ = provider.fetch_latest(usd()).await;
        let _ = provider.fetch_latest(usd()).await;
        let calls_so_far = provider.inner.calls();
        assert_eq!(calls_so_far, 5);

        // Open breaker: no network attempt at all.
        let err = provider.fetch_latest(usd()).await.unwrap_err();
        assert!(matches!(err, ProviderError::Unavailable(_)));
        assert_eq!(provider.inner.calls(), calls_so_far);
    }

    #[tokio::test(start_paused = true)]
    async fn test_breaker_allows_trial_after_cooldown() {
        let provider = ResilientProvider::new(FlakyProvider::new(5));

        let _ = provider.fetch_latest(usd()).await;
        let _ = provider.fetch_latest(usd()).await;
        assert_eq!(provider.inner.calls(), 5);

        // The breaker opened 2s ago (the backoff sleep ran after it tripped),
        // so 27 more seconds leaves it still open.
        tokio::time::advance(Duration::from_secs(27)).await;
        assert!(provider.fetch_latest(usd()).await.is_err());
        assert_eq!(provider.inner.calls(), 5);

        // Cooldown elapsed: trial call goes through and closes the breaker.
        tokio::time::advance(Duration::from_secs(2)).await;
        let rates = provider.fetch_latest(usd()).await.unwrap();
        assert_eq!(rates.base_currency, usd());
        assert_eq!(provider.inner.calls(), 6);
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_transient_errors_are_not_retried() {
        let provider = ResilientProvider::new(NoDataProvider {
            calls: AtomicUsize::new(0),
        });

        let err = provider.fetch_latest(usd()).await.unwrap_err();

        assert!(matches!(err, ProviderError::NoData));
        assert_eq!(provider.inner.calls.load(Ordering::SeqCst), 1);
    }
}
