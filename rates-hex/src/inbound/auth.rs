//! JWT authentication: token issuance, validation middleware, and roles.

use std::sync::Arc;

use axum::{
    Json,
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;
use utoipa::ToSchema;

use rates_types::{AppError, RateCache, RateProvider};

use super::handlers::AppState;

/// Caller role carried in the JWT `role` claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum Role {
    User,
    Admin,
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// Claims embedded in issued tokens.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub role: Role,
    pub exp: usize,
    pub iss: String,
    pub aud: String,
}

/// Identity attached to a request after successful token validation.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub username: String,
    pub role: Role,
}

/// Signs and validates HS256 tokens with issuer/audience checks.
pub struct JwtAuth {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    issuer: String,
    audience: String,
}

impl JwtAuth {
    pub fn new(secret: &str, issuer: impl Into<String>, audience: impl Into<String>) -> Self {
        let issuer = issuer.into();
        let audience = audience.into();
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&issuer]);
        validation.set_audience(&[&audience]);
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            issuer,
            audience,
        }
    }

    /// Issues a token for the given user, expiring after one hour.
    pub fn issue(&self, username: &str, role: Role) -> Result<String, AppError> {
        let exp = (chrono::Utc::now() + chrono::Duration::hours(1)).timestamp() as usize;
        let claims = Claims {
            sub: username.to_string(),
            role,
            exp,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AppError::Internal(format!("token signing failed: {e}")))
    }

    /// Validates a token's signature, expiry, issuer, and audience.
    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|_| AppError::Unauthorized("invalid or expired token".into()))
    }
}

/// A username/password/role record in the built-in user table.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub username: String,
    password: String,
    pub role: Role,
}

impl UserRecord {
    pub fn new(username: impl Into<String>, password: impl Into<String>, role: Role) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            role,
        }
    }
}

/// In-process user table; credentials come from configuration, not storage.
pub struct UserStore {
    users: Vec<UserRecord>,
}

impl UserStore {
    pub fn new(users: Vec<UserRecord>) -> Self {
        Self { users }
    }

    /// Development credentials used when no user table is configured.
    pub fn with_defaults() -> Self {
        Self::new(vec![
            UserRecord::new("admin", "admin-password", Role::Admin),
            UserRecord::new("user", "user-password", Role::User),
        ])
    }

    /// Parses a `username:password:role` list separated by commas.
    pub fn parse(spec: &str) -> anyhow::Result<Self> {
        let mut users = Vec::new();
        for entry in spec.split(',').filter(|e| !e.trim().is_empty()) {
            let mut parts = entry.trim().splitn(3, ':');
            let (username, password, role) = match (parts.next(), parts.next(), parts.next()) {
                (Some(u), Some(p), Some(r)) if !u.is_empty() && !p.is_empty() => (u, p, r),
                _ => anyhow::bail!("invalid user entry '{entry}', expected username:password:role"),
            };
            let role = role
                .parse::<Role>()
                .map_err(|e| anyhow::anyhow!("invalid user entry '{entry}': {e}"))?;
            users.push(UserRecord::new(username, password, role));
        }
        if users.is_empty() {
            anyhow::bail!("user table is empty");
        }
        Ok(Self::new(users))
    }

    /// Checks credentials in constant time; returns the user's role on success.
    pub fn authenticate(&self, username: &str, password: &str) -> Option<Role> {
        let user = self.users.iter().find(|u| u.username == username)?;
        bool::from(user.password.as_bytes().ct_eq(password.as_bytes())).then_some(user.role)
    }
}

/// Routes that skip token validation.
fn is_public(path: &str) -> bool {
    path == "/health"
        || path == "/api/auth/token"
        || path.starts_with("/swagger-ui")
        || path.starts_with("/api-docs")
}

/// Extracts the bearer token from the Authorization header.
fn extract_bearer(auth_header: Option<&str>) -> Option<&str> {
    auth_header?.strip_prefix("Bearer ").map(str::trim)
}

/// Authentication middleware that validates JWTs.
///
/// This middleware:
/// 1. Extracts the bearer token from the Authorization header
/// 2. Validates signature, expiry, issuer, and audience
/// 3. Attaches the caller's identity and role to the request
/// 4. Returns 401 Unauthorized if validation fails
///
/// Role checks happen per-handler; the middleware only establishes identity.
pub async fn auth_middleware<P: RateProvider, C: RateCache>(
    State(state): State<Arc<AppState<P, C>>>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    if is_public(request.uri().path()) {
        return next.run(request).await;
    }

    let auth_header = request
        .headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok());

    let token = match extract_bearer(auth_header) {
        Some(token) if !token.is_empty() => token,
        _ => return unauthorized_response("Missing or invalid Authorization header"),
    };

    match state.jwt.verify(token) {
        Ok(claims) => {
            request.extensions_mut().insert(AuthUser {
                username: claims.sub,
                role: claims.role,
            });
            next.run(request).await
        }
        Err(_) => unauthorized_response("Invalid or expired token"),
    }
}

fn unauthorized_response(message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(serde_json::json!({
            "error": message,
            "code": 401
        })),
    )
        .into_response()
}
