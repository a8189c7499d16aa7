//! Configuration loading from environment.

use std::env;
use std::time::Duration;

const DEFAULT_UPSTREAM_URL: &str = "https://api.frankfurter.app";

/// Application configuration.
pub struct Config {
    pub port: u16,
    pub upstream_url: String,
    pub upstream_timeout: Duration,
    pub jwt_secret: String,
    pub jwt_issuer: String,
    pub jwt_audience: String,
    /// Optional `username:password:role` list; defaults apply when unset.
    pub auth_users: Option<String>,
    pub rate_limit_per_minute: u32,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// A missing JWT secret, issuer, or audience is a fatal startup error.
    pub fn from_env() -> anyhow::Result<Self> {
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()?;

        let upstream_url =
            env::var("UPSTREAM_URL").unwrap_or_else(|_| DEFAULT_UPSTREAM_URL.to_string());

        let upstream_timeout = Duration::from_secs(
            env::var("UPSTREAM_TIMEOUT_SECS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()?,
        );

        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET environment variable is required"))?;
        let jwt_issuer = env::var("JWT_ISSUER")
            .map_err(|_| anyhow::anyhow!("JWT_ISSUER environment variable is required"))?;
        let jwt_audience = env::var("JWT_AUDIENCE")
            .map_err(|_| anyhow::anyhow!("JWT_AUDIENCE environment variable is required"))?;

        let auth_users = env::var("AUTH_USERS").ok();

        let rate_limit_per_minute = env::var("RATE_LIMIT_PER_MINUTE")
            .unwrap_or_else(|_| "100".to_string())
            .parse()?;

        Ok(Self {
            port,
            upstream_url,
            upstream_timeout,
            jwt_secret,
            jwt_issuer,
            jwt_audience,
            auth_users,
            rate_limit_per_minute,
        })
    }
}
