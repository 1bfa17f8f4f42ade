use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;
use tracing::info;

use crate::errors::AuthError;

/// The single authenticated identity this service recognizes.
pub const ADMIN_PRINCIPAL: &str = "admin";

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    iat: i64,
    exp: i64,
}

/// Issues and verifies the admin access token. Stateless: the token itself
/// carries subject, issuance and expiry, signed with HS256.
pub struct TokenIssuer {
    secret: String,
    admin_password: String,
    ttl: Duration,
}

impl TokenIssuer {
    pub fn new(secret: &str, admin_password: &str, ttl_days: i64) -> Self {
        Self {
            secret: secret.to_string(),
            admin_password: admin_password.to_string(),
            ttl: Duration::days(ttl_days),
        }
    }

    pub fn ttl_seconds(&self) -> i64 {
        self.ttl.num_seconds()
    }

    /// Exchange the admin password for a signed token. The comparison is
    /// constant-time; only the length is observable.
    pub fn issue(&self, password: &str) -> Result<String, AuthError> {
        let matches: bool = password
            .as_bytes()
            .ct_eq(self.admin_password.as_bytes())
            .into();
        if !matches {
            return Err(AuthError::InvalidCredentials);
        }
        let now = Utc::now();
        let claims = Claims {
            sub: ADMIN_PRINCIPAL.to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| AuthError::Invalid(e.to_string()))?;
        info!(subject = ADMIN_PRINCIPAL, "access token issued");
        Ok(token)
    }

    /// Validate signature, expiry and subject; returns the principal.
    pub fn verify(&self, token: &str) -> Result<String, AuthError> {
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::new(Algorithm::HS256),
        )
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::Expired,
            _ => AuthError::Invalid(e.to_string()),
        })?;
        if data.claims.sub != ADMIN_PRINCIPAL {
            return Err(AuthError::Invalid("unrecognized subject".into()));
        }
        Ok(data.claims.sub)
    }
}
