/// Bearer token validation
///
/// Accounts and credentials live with the identity provider. It signs HS256
/// tokens with a secret shared with this service; the tracker only validates
/// them and reads the user id from `sub`.
///
/// # Claims
///
/// - `sub`: user id (`users.id`)
/// - `iss`: must equal the configured issuer
/// - `iat`, `nbf`, `exp`: Unix timestamps, `exp` and `nbf` are enforced
///
/// # Example
///
/// ```
/// use taskboard_shared::auth::jwt::{create_token, validate_token, Claims};
/// use chrono::Duration;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let secret = "a-shared-secret-of-at-least-32-bytes";
///
/// let token = create_token(&Claims::new(42, "taskboard", Duration::hours(1)), secret)?;
/// let claims = validate_token(&token, secret, "taskboard")?;
/// assert_eq!(claims.sub, 42);
/// # Ok(())
/// # }
/// ```

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Error type for JWT operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to sign a token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Signature, format or claim check failed
    #[error("Failed to validate token: {0}")]
    ValidationError(String),

    /// `exp` is in the past
    #[error("Token has expired")]
    Expired,

    /// `iss` does not match the configured issuer
    #[error("Invalid issuer: expected {expected}")]
    InvalidIssuer { expected: String },
}

/// Token claims
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub sub: i64,

    /// Issuer
    pub iss: String,

    /// Issued at
    pub iat: i64,

    /// Expiration time
    pub exp: i64,

    /// Not before
    pub nbf: i64,
}

impl Claims {
    /// Claims for `user_id` valid from now for `expires_in`
    pub fn new(user_id: i64, issuer: &str, expires_in: Duration) -> Self {
        let now = Utc::now();

        Self {
            sub: user_id,
            iss: issuer.to_string(),
            iat: now.timestamp(),
            exp: (now + expires_in).timestamp(),
            nbf: now.timestamp(),
        }
    }
}

/// Signs claims with HS256
///
/// The service never issues tokens to clients; this exists for provisioning
/// scripts and tests.
pub fn create_token(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&Header::new(Algorithm::HS256), claims, &key)
        .map_err(|e| JwtError::CreateError(e.to_string()))
}

/// Validates a token and returns its claims
///
/// # Errors
///
/// - `JwtError::Expired` when `exp` has passed
/// - `JwtError::InvalidIssuer` when `iss` is not `issuer`
/// - `JwtError::ValidationError` for a bad signature, malformed token or
///   premature use (`nbf`)
pub fn validate_token(token: &str, secret: &str, issuer: &str) -> Result<Claims, JwtError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[issuer]);
    validation.validate_exp = true;
    validation.validate_nbf = true;

    let data = decode::<Claims>(token, &key, &validation).map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => JwtError::Expired,
        ErrorKind::InvalidIssuer => JwtError::InvalidIssuer {
            expected: issuer.to_string(),
        },
        _ => JwtError::ValidationError(e.to_string()),
    })?;

    Ok(data.claims)
}
