use std::sync::Arc;

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::errors::{AppError, ErrorCode};
use crate::types::auth::{AuthUser, Claims, Role, SESSION_TTL_SECS};

/// Why a request could not be authenticated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("Unauthorized - No token provided")]
    MissingToken,
    #[error("Unauthorized - Invalid token")]
    InvalidToken,
    #[error("Forbidden - Insufficient permissions")]
    InsufficientRole,
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        let code = match err {
            AuthError::MissingToken => ErrorCode::TokenMissing,
            AuthError::InvalidToken => ErrorCode::TokenInvalid,
            AuthError::InsufficientRole => ErrorCode::Forbidden,
        };
        AppError::new(code, err.to_string())
    }
}

/// HS256 signing material for session tokens.
#[derive(Clone)]
pub struct TokenKeys {
    encoding: Arc<EncodingKey>,
    decoding: Arc<DecodingKey>,
}

impl TokenKeys {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: Arc::new(EncodingKey::from_secret(secret.as_bytes())),
            decoding: Arc::new(DecodingKey::from_secret(secret.as_bytes())),
        }
    }

    /// Issue a session token valid for [`SESSION_TTL_SECS`].
    pub fn issue(&self, user_id: Uuid, role: Role, username: &str) -> Result<String, AppError> {
        self.sign(&Claims::new(user_id, role, username, SESSION_TTL_SECS))
    }

    pub fn sign(&self, claims: &Claims) -> Result<String, AppError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|e| AppError::internal(format!("JWT encoding failed: {e}")))
    }

    /// Check signature and expiry. Expiry is enforced without leeway.
    pub fn verify(&self, token: &str) -> Result<AuthUser, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;

        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| AuthUser::from(data.claims))
            .map_err(|e| {
                tracing::debug!(error = %e, "rejected bearer token");
                AuthError::InvalidToken
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issue_then_verify() {
        let keys = TokenKeys::new("test-secret");
        let id = Uuid::new_v4();
        let token = keys.issue(id, Role::Admin, "editor").unwrap();

        let user = keys.verify(&token).unwrap();
        assert_eq!(user.id, id);
        assert_eq!(user.role, Role::Admin);
        assert_eq!(user.username, "editor");
    }

    #[test]
    fn other_secret_rejects() {
        let token = TokenKeys::new("secret-a").issue(Uuid::new_v4(), Role::User, "u").unwrap();
        assert_eq!(TokenKeys::new("secret-b").verify(&token), Err(AuthError::InvalidToken));
    }

    #[test]
    fn expired_token_rejects() {
        let keys = TokenKeys::new("test-secret");
        let claims = Claims::new(Uuid::new_v4(), Role::Admin, "editor", -10);
        let token = keys.sign(&claims).unwrap();
        assert_eq!(keys.verify(&token), Err(AuthError::InvalidToken));
    }

    #[test]
    fn tampered_payload_rejects() {
        let keys = TokenKeys::new("test-secret");
        let token = keys.issue(Uuid::new_v4(), Role::User, "u").unwrap();

        let mut parts: Vec<String> = token.split('.').map(str::to_string).collect();
        let forged = keys.issue(Uuid::new_v4(), Role::SuperAdmin, "root").unwrap();
        parts[1] = forged.split('.').nth(1).unwrap().to_string();

        assert_eq!(keys.verify(&parts.join(".")), Err(AuthError::InvalidToken));
    }

    #[test]
    fn garbage_rejects() {
        assert_eq!(TokenKeys::new("s").verify("not.a.jwt"), Err(AuthError::InvalidToken));
    }
}
