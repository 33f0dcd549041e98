use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, errors::ErrorKind};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;
use thiserror::Error;

/// Why a bearer token was not accepted.
///
/// The authenticate middleware never surfaces these to the client; they are
/// only logged so that "expired" can be told apart from "forged".
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("token expired")]
    Expired,
    #[error("token not yet valid")]
    NotYetValid,
    #[error("invalid token signature")]
    InvalidSignature,
    #[error("invalid claims: {0}")]
    InvalidClaims(String),
    #[error("malformed token")]
    Malformed,
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        match e.kind() {
            ErrorKind::ExpiredSignature => Self::Expired,
            ErrorKind::ImmatureSignature => Self::NotYetValid,
            ErrorKind::InvalidSignature => Self::InvalidSignature,
            ErrorKind::Json(inner) => Self::InvalidClaims(inner.to_string()),
            ErrorKind::MissingRequiredClaim(name) => {
                Self::InvalidClaims(format!("missing '{}'", name))
            }
            _ => Self::Malformed,
        }
    }
}

/// Authenticated identity decoded from the token payload.
///
/// `username` / `isAdmin` are the claims the guards read. Everything else in
/// the payload (`iat`, `exp`, custom claims) is kept in `claims`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Principal {
    pub username: String,
    #[serde(rename = "isAdmin", default, deserialize_with = "null_as_false")]
    pub is_admin: bool,
    #[serde(flatten)]
    pub claims: Map<String, Value>,
}

// `"isAdmin": null` reads the same as an absent claim
fn null_as_false<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
    Ok(Option::<bool>::deserialize(d)?.unwrap_or(false))
}

impl Principal {
    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        self.timestamp_claim("iat")
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.timestamp_claim("exp")
    }

    fn timestamp_claim(&self, name: &str) -> Option<DateTime<Utc>> {
        self.claims
            .get(name)
            .and_then(Value::as_i64)
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
    }
}

/// HS256 access-token verifier.
///
/// - Key material is intentionally not printable via Debug.
#[derive(Clone)]
pub struct AuthService {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print key material
        f.debug_struct("AuthService")
            .field("validation", &self.validation)
            .finish()
    }
}

impl AuthService {
    pub fn new(secret_key: &str, leeway_seconds: u64) -> Self {
        let decoding_key = DecodingKey::from_secret(secret_key.as_bytes());

        let mut validation = Validation::new(Algorithm::HS256);
        // `exp` is checked when present but not required
        validation.required_spec_claims = HashSet::new();
        validation.validate_nbf = true;
        validation.validate_aud = false;
        validation.leeway = leeway_seconds;

        Self {
            decoding_key,
            validation,
        }
    }

    /// Verify signature / expiry and decode the payload into a [`Principal`].
    pub fn verify(&self, token: &str) -> Result<Principal, TokenError> {
        // unreadable header (e.g. unknown `alg` "none") -> Malformed
        jsonwebtoken::decode_header(token).map_err(|_| TokenError::Malformed)?;

        let data = jsonwebtoken::decode::<Principal>(token, &self.decoding_key, &self.validation)?;
        let principal = data.claims;

        if principal.username.trim().is_empty() {
            return Err(TokenError::InvalidClaims("empty 'username'".to_string()));
        }

        Ok(principal)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use jsonwebtoken::{EncodingKey, Header};
    use serde_json::Value;

    pub const SECRET: &str = "test-secret";

    pub fn sign_with(claims: &Value, secret: &str) -> String {
        jsonwebtoken::encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    pub fn sign(claims: &Value) -> String {
        sign_with(claims, SECRET)
    }

    pub fn now() -> i64 {
        chrono::Utc::now().timestamp()
    }
}
