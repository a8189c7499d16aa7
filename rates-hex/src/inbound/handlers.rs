//! HTTP request handlers.

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use rates_types::{
    AppError, ConvertRequest, HistoryQuery, RateCache, RateProvider, TokenRequest, TokenResponse,
};

use super::auth::{AuthUser, JwtAuth, Role, UserStore};
use crate::CurrencyService;

/// Application state shared across handlers.
pub struct AppState<P: RateProvider, C: RateCache> {
    pub service: CurrencyService<P, C>,
    pub jwt: JwtAuth,
    pub users: UserStore,
}

/// Wrapper to implement IntoResponse for AppError (orphan rule workaround).
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            AppError::InvalidCurrency(_)
            | AppError::UnsupportedCurrency(_)
            | AppError::RateNotFound { .. }
            | AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, self.0.to_string()),
            AppError::NoData(_) => (StatusCode::NOT_FOUND, self.0.to_string()),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            // Generic bodies only: upstream/internal detail is logged
            // server-side, never leaked to callers.
            AppError::UpstreamUnavailable => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Exchange rate provider is currently unavailable".to_string(),
            ),
            AppError::Internal(detail) => {
                tracing::error!(%detail, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = serde_json::json!({
            "error": message,
            "code": status.as_u16()
        });

        (status, Json(body)).into_response()
    }
}

fn require_role(user: &AuthUser, allowed: &[Role]) -> Result<(), ApiError> {
    if allowed.contains(&user.role) {
        Ok(())
    } else {
        Err(AppError::Forbidden(format!(
            "role {:?} may not access this resource",
            user.role
        ))
        .into())
    }
}

/// Health check endpoint.
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "healthy" }))
}

/// Issues a JWT for valid credentials.
#[tracing::instrument(skip(state, req), fields(username = %req.username))]
pub async fn issue_token<P: RateProvider, C: RateCache>(
    State(state): State<Arc<AppState<P, C>>>,
    Json(req): Json<TokenRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let role = state
        .users
        .authenticate(&req.username, &req.password)
        .ok_or_else(|| AppError::Unauthorized("invalid username or password".into()))?;

    let token = state.jwt.issue(&req.username, role)?;
    Ok(Json(TokenResponse { token }))
}

/// Latest rates for a base currency. Any authenticated role.
#[tracing::instrument(skip(state, user), fields(base = %base, caller = %user.username))]
pub async fn latest_rates<P: RateProvider, C: RateCache>(
    State(state): State<Arc<AppState<P, C>>>,
    Extension(user): Extension<AuthUser>,
    Path(base): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    require_role(&user, &[Role::User, Role::Admin])?;

    let rates = state.service.get_latest_rates(&base).await?;
    Ok(Json(rates))
}

/// Converts an amount between two currencies. Admin only.
#[tracing::instrument(
    skip(state, user, req),
    fields(from = %req.from_currency, to = %req.to_currency, caller = %user.username)
)]
pub async fn convert<P: RateProvider, C: RateCache>(
    State(state): State<Arc<AppState<P, C>>>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<ConvertRequest>,
) -> Result<impl IntoResponse, ApiError> {
    require_role(&user, &[Role::Admin])?;

    let resp = state.service.convert(req).await?;
    Ok(Json(resp))
}

/// One page of the historical rate series. Admin only.
#[tracing::instrument(skip(state, user), fields(caller = %user.username))]
pub async fn history<P: RateProvider, C: RateCache>(
    State(state): State<Arc<AppState<P, C>>>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<HistoryQuery>,
) -> Result<impl IntoResponse, ApiError> {
    require_role(&user, &[Role::Admin])?;

    let series = state.service.get_historical_rates(query).await?;
    Ok(Json(series))
}
