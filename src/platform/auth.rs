//! Project-level assertions for the `X-OPENTOK-AUTH` header

use super::PlatformError;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};

/// Header carrying the assertion on every REST call
pub const AUTH_HEADER: &str = "X-OPENTOK-AUTH";

/// Lifetime of an assertion in seconds
pub const ASSERTION_TTL_SECS: i64 = 180;

/// Nonce used for the storage configuration call
pub const STORAGE_NONCE: &str = "jwt_nonce";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectClaims {
    /// API key of the project
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
    /// Issuer type, always "project"
    pub ist: String,
    pub jti: String,
}

impl ProjectClaims {
    pub fn new(api_key: &str, issued_at: i64, nonce: &str) -> Self {
        Self {
            iss: api_key.to_string(),
            iat: issued_at,
            exp: issued_at + ASSERTION_TTL_SECS,
            ist: "project".to_string(),
            jti: nonce.to_string(),
        }
    }
}

/// Sign `claims` with the project secret using HS256
pub fn sign(claims: &ProjectClaims, api_secret: &str) -> Result<String, PlatformError> {
    let token = encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(api_secret.as_bytes()),
    )?;
    Ok(token)
}

/// Assertion issued now with the given nonce
pub fn project_assertion(
    api_key: &str,
    api_secret: &str,
    nonce: &str,
) -> Result<String, PlatformError> {
    let claims = ProjectClaims::new(api_key, chrono::Utc::now().timestamp(), nonce);
    sign(&claims, api_secret)
}
