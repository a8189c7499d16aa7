//! # Rates Upstream
//!
//! Outbound adapters for the currency rates gateway.
//!
//! - `provider` - reqwest client for the third-party rate API
//! - `resilience` - retry + circuit breaker wrapper around any [`rates_types::RateProvider`]
//! - `memory` - process-local TTL cache implementing [`rates_types::RateCache`]

pub mod memory;
pub mod provider;
pub mod resilience;

pub use memory::InMemoryRateCache;
pub use provider::HttpRateProvider;
pub use resilience::{CircuitBreaker, ResilientProvider};
