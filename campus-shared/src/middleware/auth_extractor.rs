use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use axum::http::{header, HeaderMap};

use crate::auth::{AuthError, TokenKeys};
use crate::errors::AppError;
use crate::types::auth::{AuthUser, Role};

/// Authenticate a request from its headers.
///
/// Requires `Authorization: Bearer <token>`; a missing header or another
/// scheme is [`AuthError::MissingToken`], a token failing signature or expiry
/// checks is [`AuthError::InvalidToken`].
pub fn authenticate(headers: &HeaderMap, keys: &TokenKeys) -> Result<AuthUser, AuthError> {
    let token = bearer_token(headers).ok_or(AuthError::MissingToken)?;
    keys.verify(token)
}

/// Authenticate and additionally require `role` (or the superadmin override).
pub fn authorize(headers: &HeaderMap, keys: &TokenKeys, role: Role) -> Result<AuthUser, AuthError> {
    let user = authenticate(headers, keys)?;
    if !user.role.satisfies(role) {
        return Err(AuthError::InsufficientRole);
    }
    Ok(user)
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    TokenKeys: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = TokenKeys::from_ref(state);
        Ok(authenticate(&parts.headers, &keys)?)
    }
}

/// Require the Admin role (superadmins pass too).
pub struct AdminUser(pub AuthUser);

#[axum::async_trait]
impl<S> FromRequestParts<S> for AdminUser
where
    TokenKeys: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = TokenKeys::from_ref(state);
        Ok(Self(authorize(&parts.headers, &keys, Role::Admin)?))
    }
}

/// Require the SuperAdmin role.
pub struct SuperAdminUser(pub AuthUser);

#[axum::async_trait]
impl<S> FromRequestParts<S> for SuperAdminUser
where
    TokenKeys: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = TokenKeys::from_ref(state);
        Ok(Self(authorize(&parts.headers, &keys, Role::SuperAdmin)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, value.parse().unwrap());
        headers
    }

    #[test]
    fn missing_header_is_no_token() {
        let keys = TokenKeys::new("s");
        assert_eq!(authenticate(&HeaderMap::new(), &keys), Err(AuthError::MissingToken));
    }

    #[test]
    fn non_bearer_scheme_is_no_token() {
        let keys = TokenKeys::new("s");
        assert_eq!(
            authenticate(&headers_with("Basic YWRtaW46YWRtaW4="), &keys),
            Err(AuthError::MissingToken)
        );
        assert_eq!(authenticate(&headers_with("Bearer "), &keys), Err(AuthError::MissingToken));
    }

    #[test]
    fn bad_token_is_invalid() {
        let keys = TokenKeys::new("s");
        assert_eq!(
            authenticate(&headers_with("Bearer abc.def.ghi"), &keys),
            Err(AuthError::InvalidToken)
        );
    }

    #[test]
    fn valid_token_yields_identity() {
        let keys = TokenKeys::new("s");
        let id = Uuid::new_v4();
        let token = keys.issue(id, Role::Admin, "editor").unwrap();

        let user = authenticate(&headers_with(&format!("Bearer {token}")), &keys).unwrap();
        assert_eq!(user.id, id);
    }

    #[test]
    fn role_gate_checks_role_with_superadmin_override() {
        let keys = TokenKeys::new("s");
        let user_token = keys.issue(Uuid::new_v4(), Role::User, "u").unwrap();
        let root_token = keys.issue(Uuid::new_v4(), Role::SuperAdmin, "root").unwrap();

        assert_eq!(
            authorize(&headers_with(&format!("Bearer {user_token}")), &keys, Role::Admin),
            Err(AuthError::InsufficientRole)
        );
        assert!(authorize(&headers_with(&format!("Bearer {root_token}")), &keys, Role::Admin).is_ok());
    }
}
