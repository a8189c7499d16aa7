//! OpenAPI specification and documentation.

#![allow(dead_code)] // Path functions are only used by utoipa for documentation generation

use rates_types::domain::{ExchangeRate, HistoricalRate};
use rates_types::dto::{
    ConvertRequest, ConvertResponse, HistoryQuery, TokenRequest, TokenResponse,
};
use utoipa::{
    Modify, OpenApi,
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
};

use crate::inbound::Role;

// Dummy functions to generate path documentation
// These are not the actual handlers, just for OpenAPI path generation

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = inline(serde_json::Value), example = json!({"status": "healthy"}))
    )
)]
async fn health() {}

/// Exchange credentials for a JWT
#[utoipa::path(
    post,
    path = "/api/auth/token",
    tag = "auth",
    request_body = TokenRequest,
    responses(
        (status = 200, description = "Token issued", body = TokenResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
async fn issue_token() {}

/// Latest exchange rates for a base currency
#[utoipa::path(
    get,
    path = "/api/currency/latest/{base}",
    tag = "currency",
    security(("bearer_auth" = [])),
    params(
        ("base" = String, Path, description = "ISO 4217 base currency code, e.g. USD")
    ),
    responses(
        (status = 200, description = "Latest rates", body = ExchangeRate),
        (status = 400, description = "Invalid or unsupported currency code"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Rate provider unavailable")
    )
)]
async fn latest_rates() {}

/// Convert an amount between two currencies (admin only)
#[utoipa::path(
    post,
    path = "/api/currency/convert",
    tag = "currency",
    request_body = ConvertRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Converted amount", body = ConvertResponse),
        (status = 400, description = "Invalid or unsupported currency, or no rate available"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Caller lacks the admin role"),
        (status = 500, description = "Rate provider unavailable")
    )
)]
async fn convert() {}

/// Paginated historical rate series (admin only)
#[utoipa::path(
    get,
    path = "/api/currency/history",
    tag = "currency",
    security(("bearer_auth" = [])),
    params(HistoryQuery),
    responses(
        (status = 200, description = "One page of the historical series", body = Vec<HistoricalRate>),
        (status = 400, description = "Invalid currency, date range, or pagination"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Caller lacks the admin role"),
        (status = 404, description = "No data for the requested range"),
        (status = 500, description = "Rate provider unavailable")
    )
)]
async fn history() {}

/// OpenAPI documentation for the Rates Gateway API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Currency Rates Gateway API",
        version = "1.0.0",
        description = "A pass-through gateway over an external exchange rate provider with JWT authentication, role-based access, caching, and upstream resilience.\n\n## Authentication\n\nObtain a token from `/api/auth/token`, then include it in the `Authorization` header:\n\n```\nAuthorization: Bearer <jwt>\n```",
        license(name = "MIT"),
    ),
    paths(
        health,
        issue_token,
        latest_rates,
        convert,
        history,
    ),
    components(
        schemas(
            TokenRequest,
            TokenResponse,
            ConvertRequest,
            ConvertResponse,
            ExchangeRate,
            HistoricalRate,
            Role,
        )
    ),

    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Token issuance"),
        (name = "currency", description = "Exchange rate lookup, conversion, and history"),
    )
)]
pub struct ApiDoc;

/// Security scheme modifier for Bearer token authentication.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            );
        }
    }
}
