use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use campus_shared::clients::db::run_blocking;
use campus_shared::clients::otp::OtpChannel;
use campus_shared::errors::{AppError, AppResult};
use campus_shared::extract::JsonBody;
use campus_shared::types::auth::Role;

use crate::services::auth_service;
use crate::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Username and password are required"))]
    pub username: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Username and password are required"))]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AdminProfile {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub role: Role,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub admin: AdminProfile,
    pub token: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyOtpRequest {
    pub email: Option<String>,
    pub mobile: Option<String>,
    pub otp: Option<String>,
    pub fcm_token: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AppUserProfile {
    pub id: Uuid,
    pub email: Option<String>,
    pub mobile: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct VerifyOtpResponse {
    pub user: AppUserProfile,
    pub token: String,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    req.validate()?;

    let (admin, role) = run_blocking(&state.db, move |conn| {
        auth_service::authenticate_admin(conn, &req.username, &req.password)
    })
    .await?;

    let token = state.tokens.issue(admin.id, role, &admin.username)?;

    tracing::info!(admin_id = %admin.id, role = %role, "admin logged in");

    Ok(Json(LoginResponse {
        admin: AdminProfile {
            id: admin.id,
            username: admin.username,
            email: admin.email,
            role,
        },
        token,
    }))
}

/// POST /api/auth/verify-otp
///
/// Verifies the code, then finds or registers the app user and issues a
/// `USER` session.
pub async fn verify_otp(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<VerifyOtpRequest>,
) -> AppResult<Json<VerifyOtpResponse>> {
    let email = non_empty(req.email);
    let mobile = non_empty(req.mobile);
    let fcm_token = non_empty(req.fcm_token);

    let otp = match (non_empty(req.otp), &email, &mobile) {
        (Some(otp), Some(_), _) | (Some(otp), _, Some(_)) => otp,
        _ => return Err(AppError::Validation("OTP and email or mobile are required".into())),
    };

    let channel = match (&email, &mobile) {
        (Some(email), _) => OtpChannel::Email(email.clone()),
        (None, Some(mobile)) => OtpChannel::Sms(mobile.clone()),
        (None, None) => return Err(AppError::Validation("OTP and email or mobile are required".into())),
    };

    state.otp.verify(&channel, &otp).await.map_err(|e| {
        tracing::info!(identifier = %channel.identifier(), error = %e, "OTP verification failed");
        AppError::from(e)
    })?;

    let user = run_blocking(&state.db, move |conn| {
        auth_service::find_or_create_app_user(
            conn,
            email.as_deref(),
            mobile.as_deref(),
            fcm_token.as_deref(),
        )
    })
    .await?;

    let username = user
        .email
        .clone()
        .or_else(|| user.mobile.clone())
        .unwrap_or_default();
    let token = state.tokens.issue(user.id, Role::User, &username)?;

    tracing::info!(user_id = %user.id, "app user logged in");

    Ok(Json(VerifyOtpResponse {
        user: AppUserProfile {
            id: user.id,
            email: user.email,
            mobile: user.mobile,
            name: user.name,
        },
        token,
    }))
}
