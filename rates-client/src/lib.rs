//! # Rates Client SDK
//!
//! A typed Rust client for the currency rates gateway API.

use chrono::NaiveDate;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;

use rates_types::{
    ConvertRequest, ConvertResponse, ExchangeRate, HistoricalRate, HistoryQuery, TokenRequest,
    TokenResponse,
};

/// Error type for client operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Rates gateway API client.
pub struct RatesClient {
    base_url: String,
    token: Option<String>,
    http: Client,
}

impl RatesClient {
    /// Creates a new client.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
            http: Client::new(),
        }
    }

    /// Sets the bearer token used for authenticated endpoints.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Checks if the API is healthy.
    pub async fn health(&self) -> Result<bool, ClientError> {
        let resp = self
            .http
            .get(format!("{}/health", self.base_url))
            .send()
            .await?;
        Ok(resp.status().is_success())
    }

    /// Exchanges credentials for a JWT and stores it on the client.
    pub async fn login(&mut self, username: &str, password: &str) -> Result<String, ClientError> {
        let req = TokenRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        let resp: TokenResponse = self.post("/api/auth/token", &req).await?;
        self.token = Some(resp.token.clone());
        Ok(resp.token)
    }

    /// Fetches the latest rates for a base currency.
    pub async fn latest_rates(&self, base: &str) -> Result<ExchangeRate, ClientError> {
        self.get(&format!("/api/currency/latest/{base}")).await
    }

    /// Converts an amount between two currencies. Admin only.
    pub async fn convert(
        &self,
        amount: Decimal,
        from_currency: &str,
        to_currency: &str,
    ) -> Result<ConvertResponse, ClientError> {
        let req = ConvertRequest {
            amount,
            from_currency: from_currency.to_string(),
            to_currency: to_currency.to_string(),
        };
        self.post("/api/currency/convert", &req).await
    }

    /// Fetches one page of the historical rate series. Admin only.
    pub async fn history(
        &self,
        base_currency: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
        page: u32,
        page_size: u32,
    ) -> Result<Vec<HistoricalRate>, ClientError> {
        let query = HistoryQuery {
            base_currency: base_currency.to_string(),
            start_date,
            end_date,
            page,
            page_size,
        };
        let mut req = self
            .http
            .get(format!("{}/api/currency/history", self.base_url))
            .query(&query);
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        let resp = req.send().await?;
        self.handle_response(resp).await
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let mut req = self.http.get(format!("{}{}", self.base_url, path));
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        let resp = req.send().await?;
        self.handle_response(resp).await
    }

    async fn post<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let mut req = self
            .http
            .post(format!("{}{}", self.base_url, path))
            .json(body);
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        let resp = req.send().await?;
        self.handle_response(resp).await
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            Ok(serde_json::from_str(&body)?)
        } else {
            let body = resp.text().await.unwrap_or_default();
            let message = serde_json::from_str::<serde_json::Value>(&body)
                .ok()
                .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(String::from))
                .unwrap_or(body);
            Err(ClientError::Api {
                status: status.as_u16(),
                message,
            })
        }
    }
}
