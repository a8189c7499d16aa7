//! # Rates Hex
//!
//! Application service layer and HTTP adapter for the currency rates gateway.
//!
//! ## Architecture
//!
//! - `service/` - Application service (cache-first rate orchestration)
//! - `inbound/` - HTTP adapter (Axum server, JWT auth, rate limiting)
//!
//! The service is generic over `P: RateProvider` and `C: RateCache`,
//! allowing different provider and cache implementations to be injected.

pub mod inbound;
mod openapi;
pub mod service;


pub use service::CurrencyService;
