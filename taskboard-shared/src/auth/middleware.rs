/// Bearer token middleware for Axum
///
/// Validates `Authorization: Bearer <token>` and inserts the resulting
/// [`AuthContext`] into the request extensions. Handlers read the actor with
/// `Extension<AuthContext>` and pass it explicitly to the access policy.
///
/// # Example
///
/// ```no_run
/// use axum::{middleware, routing::get, Extension, Router};
/// use taskboard_shared::auth::middleware::{create_jwt_middleware, AuthContext};
///
/// async fn whoami(Extension(auth): Extension<AuthContext>) -> String {
///     format!("user {}", auth.user_id)
/// }
///
/// let app: Router = Router::new()
///     .route("/whoami", get(whoami))
///     .layer(middleware::from_fn(create_jwt_middleware("secret", "taskboard")));
/// ```

use axum::{
    extract::Request,
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::future::Future;
use std::pin::Pin;
use tracing::debug;

use super::jwt::{validate_token, JwtError};

/// The authenticated actor of a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    /// Authenticated user ID
    pub user_id: i64,
}

impl AuthContext {
    pub fn new(user_id: i64) -> Self {
        Self { user_id }
    }
}

/// Error type for authentication middleware
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No Authorization header
    #[error("Missing credentials")]
    MissingCredentials,

    /// Header present but not a bearer token
    #[error("{0}")]
    InvalidFormat(String),

    /// Token failed validation
    #[error("{0}")]
    InvalidToken(String),
}

impl From<JwtError> for AuthError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Expired => AuthError::InvalidToken("Token expired".to_string()),
            JwtError::InvalidIssuer { .. } => AuthError::InvalidToken("Invalid issuer".to_string()),
            other => AuthError::InvalidToken(format!("Invalid token: {other}")),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = match self {
            AuthError::InvalidFormat(_) => StatusCode::BAD_REQUEST,
            AuthError::MissingCredentials | AuthError::InvalidToken(_) => StatusCode::UNAUTHORIZED,
        };

        let body = json!({
            "error": "unauthorized",
            "message": self.to_string(),
        });

        (status, Json(body)).into_response()
    }
}

/// Token validation settings captured by the middleware
#[derive(Debug, Clone)]
pub struct JwtSettings {
    pub secret: String,
    pub issuer: String,
}

/// Validates the bearer token and attaches the actor
///
/// # Errors
///
/// - 401 when the header is missing or the token is invalid or expired
/// - 400 when the header is not a bearer token
pub async fn jwt_auth_middleware(
    settings: JwtSettings,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingCredentials)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AuthError::InvalidFormat("Expected Bearer token".to_string()))?;

    let claims = validate_token(token, &settings.secret, &settings.issuer)?;
    debug!(user_id = claims.sub, "Request authenticated");

    req.extensions_mut().insert(AuthContext::new(claims.sub));
    Ok(next.run(req).await)
}

/// Builds the middleware closure for `axum::middleware::from_fn`
pub fn create_jwt_middleware(
    secret: impl Into<String>,
    issuer: impl Into<String>,
) -> impl Fn(Request, Next) -> Pin<Box<dyn Future<Output = Result<Response, AuthError>> + Send>> + Clone
{
    let settings = JwtSettings {
        secret: secret.into(),
        issuer: issuer.into(),
    };

    move |req, next| {
        let settings = settings.clone();
        Box::pin(jwt_auth_middleware(settings, req, next))
    }
}
