//! HTTP Server configuration and startup.

use std::sync::Arc;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use rates_types::{RateCache, RateProvider};

use super::auth::{JwtAuth, UserStore, auth_middleware};
use super::handlers::{self, AppState};
use super::rate_limit::{RateLimiterState, rate_limit_middleware};
use crate::CurrencyService;
use crate::openapi::ApiDoc;

/// HTTP Server for the rates gateway.
pub struct HttpServer<P: RateProvider, C: RateCache> {
    state: Arc<AppState<P, C>>,
    rate_limiter: Arc<RateLimiterState>,
}

impl<P: RateProvider, C: RateCache> HttpServer<P, C> {
    /// Creates a new HTTP server with the given service and auth setup.
    pub fn new(service: CurrencyService<P, C>, jwt: JwtAuth, users: UserStore) -> Self {
        Self {
            state: Arc::new(AppState {
                service,
                jwt,
                users,
            }),
            rate_limiter: Arc::new(RateLimiterState::default()), // 100 req/min default
        }
    }

    /// Creates a new HTTP server with custom rate limiting.
    pub fn with_rate_limit(
        service: CurrencyService<P, C>,
        jwt: JwtAuth,
        users: UserStore,
        requests_per_minute: u32,
    ) -> Self {
        use std::time::Duration;
        Self {
            state: Arc::new(AppState {
                service,
                jwt,
                users,
            }),
            rate_limiter: Arc::new(RateLimiterState::new(
                requests_per_minute,
                Duration::from_secs(60),
            )),
        }
    }

    /// Builds the Axum router with all routes.
    ///
    /// Layer order matters: auth runs before rate limiting so the limiter
    /// can key on the verified identity.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/health", get(handlers::health))
            .route("/api/auth/token", post(handlers::issue_token::<P, C>))
            .route(
                "/api/currency/latest/{base}",
                get(handlers::latest_rates::<P, C>),
            )
            .route("/api/currency/convert", post(handlers::convert::<P, C>))
            .route("/api/currency/history", get(handlers::history::<P, C>))
            .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
            .layer(middleware::from_fn_with_state(
                self.rate_limiter.clone(),
                rate_limit_middleware,
            ))
            .layer(middleware::from_fn_with_state(
                self.state.clone(),
                auth_middleware::<P, C>,
            ))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Runs the server on the given address with graceful shutdown.
    pub async fn run(self, addr: &str) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("Server listening on {}", listener.local_addr()?);

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown...");
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use chrono::NaiveDate;
    use http_body_util::BodyExt;
    use rust_decimal::Decimal;
    use serde_json::json;
    use tower::ServiceExt;

    use crate::service_tests::tests::{MockCache, MockProvider};

    fn test_router(provider: MockProvider) -> Router {
        HttpServer::new(
            CurrencyService::new(provider, MockCache::new()),
            JwtAuth::new("test-secret", "rates-gateway", "rates-api"),
            UserStore::with_defaults(),
        )
        .router()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn token_for(router: &Router, username: &str, password: &str) -> String {
        let response = router
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/auth/token")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        json!({"username": username, "password": password}).to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        body_json(response).await["token"]
            .as_str()
            .unwrap()
            .to_string()
    }

    fn get_with_token(uri: &str, token: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .header("Authorization", format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn test_health_is_public() {
        let router = test_router(MockProvider::new());

        let response = router
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_missing_token_is_unauthorized() {
        let router = test_router(MockProvider::new());

        let response = router
            .oneshot(
                Request::builder()
                    .uri("/api/currency/latest/USD")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_garbage_token_is_unauthorized() {
        let router = test_router(MockProvider::new());

        let response = router
            .oneshot(get_with_token("/api/currency/latest/USD", "not.a.jwt"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_bad_credentials_are_unauthorized() {
        let router = test_router(MockProvider::new());

        let response = router
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/auth/token")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        json!({"username": "admin", "password": "wrong"}).to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_user_role_can_read_latest_rates() {
        let router = test_router(MockProvider::new().with_rate("USD", "EUR", "0.90"));
        let token = token_for(&router, "user", "user-password").await;

        let response = router
            .oneshot(get_with_token("/api/currency/latest/USD", &token))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["baseCurrency"], "USD");
        assert!(body["rates"].get("EUR").is_some());
    }

    #[tokio::test]
    async fn test_user_role_cannot_convert() {
        let router = test_router(MockProvider::new().with_rate("USD", "EUR", "0.90"));
        let token = token_for(&router, "user", "user-password").await;

        let response = router
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/currency/convert")
                    .header("content-type", "application/json")
                    .header("Authorization", format!("Bearer {token}"))
                    .body(Body::from(
                        json!({"amount": 100, "fromCurrency": "USD", "toCurrency": "EUR"})
                            .to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_admin_convert_flow() {
        let router = test_router(MockProvider::new().with_rate("USD", "EUR", "0.90"));
        let token = token_for(&router, "admin", "admin-password").await;

        let response = router
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/currency/convert")
                    .header("content-type", "application/json")
                    .header("Authorization", format!("Bearer {token}"))
                    .body(Body::from(
                        json!({"amount": 100, "fromCurrency": "usd", "toCurrency": "eur"})
                            .to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        let amount: Decimal = body["amount"].as_str().unwrap().parse().unwrap();
        assert_eq!(amount, "90".parse::<Decimal>().unwrap());
    }

    #[tokio::test]
    async fn test_unknown_currency_is_bad_request() {
        let router = test_router(MockProvider::new());
        let token = token_for(&router, "user", "user-password").await;

        let response = router
            .oneshot(get_with_token("/api/currency/latest/ZZZ", &token))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_admin_history_single_day() {
        let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let router = test_router(
            MockProvider::new()
                .with_rate("USD", "EUR", "0.90")
                .with_days(&[day]),
        );
        let token = token_for(&router, "admin", "admin-password").await;

        let response = router
            .oneshot(get_with_token(
                "/api/currency/history?baseCurrency=USD&startDate=2024-01-01&endDate=2024-01-01",
                &token,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body.as_array().unwrap().len(), 1);
        assert_eq!(body[0]["date"], "2024-01-01");
    }

    #[tokio::test]
    async fn test_inverted_history_range_is_bad_request() {
        let router = test_router(MockProvider::new().with_rate("USD", "EUR", "0.90"));
        let token = token_for(&router, "admin", "admin-password").await;

        let response = router
            .oneshot(get_with_token(
                "/api/currency/history?baseCurrency=USD&startDate=2024-01-31&endDate=2024-01-01",
                &token,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_history_with_no_data_is_not_found() {
        // Provider knows the base currency but has no data for any day.
        let router = test_router(MockProvider::new().with_rate("USD", "EUR", "0.90"));
        let token = token_for(&router, "admin", "admin-password").await;

        let response = router
            .oneshot(get_with_token(
                "/api/currency/history?baseCurrency=USD&startDate=2024-01-01&endDate=2024-01-03",
                &token,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_user_role_cannot_read_history() {
        let router = test_router(MockProvider::new().with_rate("USD", "EUR", "0.90"));
        let token = token_for(&router, "user", "user-password").await;

        let response = router
            .oneshot(get_with_token(
                "/api/currency/history?baseCurrency=USD&startDate=2024-01-01&endDate=2024-01-03",
                &token,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
