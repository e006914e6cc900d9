use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Session tokens live for seven days; there is no refresh or revocation.
pub const SESSION_TTL_SECS: i64 = 7 * 24 * 60 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "SUPERADMIN")]
    SuperAdmin,
    #[serde(rename = "ADMIN")]
    Admin,
    #[serde(rename = "USER")]
    User,
}

impl Role {
    /// A superadmin satisfies every role requirement.
    pub fn satisfies(&self, required: Role) -> bool {
        *self == required || *self == Role::SuperAdmin
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::SuperAdmin => "SUPERADMIN",
            Role::Admin => "ADMIN",
            Role::User => "USER",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "SUPERADMIN" => Ok(Role::SuperAdmin),
            "ADMIN" => Ok(Role::Admin),
            "USER" => Ok(Role::User),
            _ => Err(format!("unknown role: {s}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub user_id: Uuid,
    pub role: Role,
    pub username: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn new(user_id: Uuid, role: Role, username: impl Into<String>, duration_secs: i64) -> Self {
        let now = Utc::now().timestamp();
        Self {
            user_id,
            role,
            username: username.into(),
            iat: now,
            exp: now + duration_secs,
        }
    }
}

/// Identity recovered from a verified bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: Uuid,
    pub role: Role,
    pub username: String,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.user_id,
            role: claims.role,
            username: claims.username,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn superadmin_overrides_role_gates() {
        assert!(Role::SuperAdmin.satisfies(Role::Admin));
        assert!(Role::Admin.satisfies(Role::Admin));
        assert!(!Role::User.satisfies(Role::Admin));
        assert!(!Role::Admin.satisfies(Role::SuperAdmin));
    }

    #[test]
    fn role_parses_stored_strings() {
        assert_eq!("SUPERADMIN".parse::<Role>().unwrap(), Role::SuperAdmin);
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert!("EDITOR".parse::<Role>().is_err());
    }

    #[test]
    fn claims_use_camel_case_payload() {
        let claims = Claims::new(Uuid::nil(), Role::User, "a@b.c", SESSION_TTL_SECS);
        let json = serde_json::to_value(&claims).unwrap();
        assert_eq!(json["userId"], Uuid::nil().to_string());
        assert_eq!(json["role"], "USER");
        assert_eq!(json["exp"].as_i64().unwrap() - json["iat"].as_i64().unwrap(), SESSION_TTL_SECS);
    }
}
