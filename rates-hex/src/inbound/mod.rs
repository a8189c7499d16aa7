//! HTTP Inbound Adapter
//!
//! Axum-based HTTP server that drives the application layer.

mod auth;
mod handlers;
mod rate_limit;
mod server;

pub use auth::{AuthUser, Claims, JwtAuth, Role, UserRecord, UserStore};
pub use server::HttpServer;
