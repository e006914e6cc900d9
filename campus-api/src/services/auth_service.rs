use chrono::Utc;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};

use campus_shared::auth::{hash_password, verify_password};
use campus_shared::errors::{AppError, AppResult, ErrorCode};
use campus_shared::types::auth::Role;

use crate::models::{AdminUserRow, AppUser, NewAdminUser, NewAppUser};
use crate::schema::{admin_users, app_users};

fn invalid_credentials() -> AppError {
    AppError::new(ErrorCode::InvalidCredentials, "Invalid credentials")
}

/// Check an admin's username and password. Unknown, inactive and wrong
/// password all fail the same way.
pub fn authenticate_admin(
    conn: &mut PgConnection,
    username: &str,
    password: &str,
) -> AppResult<(AdminUserRow, Role)> {
    let admin = admin_users::table
        .filter(admin_users::username.eq(username))
        .first::<AdminUserRow>(conn)
        .optional()?
        .ok_or_else(invalid_credentials)?;

    let role = check_admin_login(&admin, password)?;
    Ok((admin, role))
}

fn check_admin_login(admin: &AdminUserRow, password: &str) -> AppResult<Role> {
    if !admin.is_active {
        tracing::info!(admin_id = %admin.id, "login attempt on inactive admin");
        return Err(invalid_credentials());
    }

    if !verify_password(password, &admin.password_hash)? {
        return Err(invalid_credentials());
    }

    admin.role.parse::<Role>().map_err(|e| {
        tracing::error!(admin_id = %admin.id, error = %e, "admin has an unknown role");
        invalid_credentials()
    })
}

/// What an OTP login writes for the matched app user.
#[derive(Debug, PartialEq, Eq)]
enum AppLogin<'a> {
    Register,
    Unchanged,
    ReplaceDeviceToken(&'a str),
}

fn plan_app_login<'a>(existing: Option<&AppUser>, fcm_token: Option<&'a str>) -> AppResult<AppLogin<'a>> {
    match (existing, fcm_token) {
        (Some(user), _) if !user.is_active => {
            Err(AppError::new(ErrorCode::AccountDisabled, "Account is disabled"))
        }
        (Some(_), Some(token)) => Ok(AppLogin::ReplaceDeviceToken(token)),
        (Some(_), None) => Ok(AppLogin::Unchanged),
        (None, _) => Ok(AppLogin::Register),
    }
}

/// Users matching either identity; the first row wins when both are given.
fn app_user_lookup<'a>(
    email: Option<&'a str>,
    mobile: Option<&'a str>,
) -> AppResult<app_users::BoxedQuery<'a, Pg>> {
    let query = app_users::table.into_boxed::<Pg>();
    Ok(match (email, mobile) {
        (Some(email), Some(mobile)) => query.filter(app_users::email.eq(email).or(app_users::mobile.eq(mobile))),
        (Some(email), None) => query.filter(app_users::email.eq(email)),
        (None, Some(mobile)) => query.filter(app_users::mobile.eq(mobile)),
        (None, None) => return Err(AppError::bad_request("OTP and email or mobile are required")),
    })
}

/// Look an app user up by email or mobile, creating one on first login.
///
/// A supplied device token replaces the stored one. Inactive users are
/// refused.
pub fn find_or_create_app_user(
    conn: &mut PgConnection,
    email: Option<&str>,
    mobile: Option<&str>,
    fcm_token: Option<&str>,
) -> AppResult<AppUser> {
    let existing = app_user_lookup(email, mobile)?
        .first::<AppUser>(conn)
        .optional()?;

    let user = match (plan_app_login(existing.as_ref(), fcm_token)?, existing) {
        (AppLogin::ReplaceDeviceToken(token), Some(user)) => diesel::update(app_users::table.find(user.id))
            .set((
                app_users::fcm_token.eq(Some(token)),
                app_users::updated_at.eq(Utc::now()),
            ))
            .get_result::<AppUser>(conn)?,
        (_, Some(user)) => user,
        (_, None) => {
            let user = diesel::insert_into(app_users::table)
                .values(&NewAppUser {
                    email: email.map(str::to_string),
                    mobile: mobile.map(str::to_string),
                    fcm_token: fcm_token.map(str::to_string),
                })
                .get_result::<AppUser>(conn)?;
            tracing::info!(user_id = %user.id, "app user registered");
            user
        }
    };

    Ok(user)
}

/// Register an admin account with a freshly hashed password.
pub fn create_admin_user(
    conn: &mut PgConnection,
    username: &str,
    email: &str,
    password: &str,
    role: Role,
) -> AppResult<AdminUserRow> {
    if role == Role::User {
        return Err(AppError::Validation("Role must be ADMIN or SUPERADMIN".into()));
    }

    let row = NewAdminUser {
        username: username.to_string(),
        email: email.to_string(),
        password_hash: hash_password(password)?,
        role: role.as_str().to_string(),
    };

    let admin = diesel::insert_into(admin_users::table)
        .values(&row)
        .get_result::<AdminUserRow>(conn)
        .map_err(|e| match e {
            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                AppError::new(ErrorCode::Conflict, "Username or email already exists")
            }
            other => AppError::from(other),
        })?;

    tracing::info!(admin_id = %admin.id, role = %role, "admin user created");
    Ok(admin)
}
