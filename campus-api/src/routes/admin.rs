use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use validator::Validate;

use campus_shared::clients::db::run_blocking;
use campus_shared::errors::AppResult;
use campus_shared::extract::JsonBody;
use campus_shared::middleware::{AdminUser, SuperAdminUser};
use campus_shared::types::api::DataResponse;
use campus_shared::types::auth::Role;

use crate::models::AdminUserRow;
use crate::schema::{admin_users, app_users, departments, events, news, notifications};
use crate::services::auth_service;
use crate::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub published_news: i64,
    pub upcoming_events: i64,
    pub active_departments: i64,
    pub active_users: i64,
    pub notifications_sent: i64,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateAdminRequest {
    #[serde(default)]
    #[validate(length(min = 3, max = 100, message = "Username must be 3 to 100 characters"))]
    pub username: String,
    #[serde(default)]
    #[validate(email(message = "A valid email is required"))]
    pub email: String,
    #[serde(default)]
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    pub role: Option<Role>,
}

/// GET /api/admin/dashboard
pub async fn get_dashboard(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> AppResult<Json<DashboardStats>> {
    let now = Utc::now();

    let stats = run_blocking(&state.db, move |conn| {
        let published_news: i64 = news::table
            .filter(news::is_published.eq(true))
            .count()
            .get_result(conn)?;

        let upcoming_events: i64 = events::table
            .filter(events::is_published.eq(true))
            .filter(events::start_date.ge(now))
            .count()
            .get_result(conn)?;

        let active_departments: i64 = departments::table
            .filter(departments::is_active.eq(true))
            .count()
            .get_result(conn)?;

        let active_users: i64 = app_users::table
            .filter(app_users::is_active.eq(true))
            .count()
            .get_result(conn)?;

        let notifications_sent: i64 = notifications::table
            .filter(notifications::is_sent.eq(true))
            .count()
            .get_result(conn)?;

        Ok(DashboardStats {
            published_news,
            upcoming_events,
            active_departments,
            active_users,
            notifications_sent,
        })
    })
    .await?;

    Ok(Json(stats))
}

/// GET /api/admin/users
pub async fn list_admin_users(
    State(state): State<AppState>,
    _admin: SuperAdminUser,
) -> AppResult<Json<DataResponse<AdminUserRow>>> {
    let admins = run_blocking(&state.db, |conn| {
        Ok(admin_users::table
            .order(admin_users::username.asc())
            .load::<AdminUserRow>(conn)?)
    })
    .await?;

    Ok(Json(DataResponse::new(admins)))
}

/// POST /api/admin/users
pub async fn create_admin_user(
    State(state): State<AppState>,
    SuperAdminUser(creator): SuperAdminUser,
    JsonBody(req): JsonBody<CreateAdminRequest>,
) -> AppResult<(StatusCode, Json<AdminUserRow>)> {
    req.validate()?;
    let role = req.role.unwrap_or(Role::Admin);

    let admin = run_blocking(&state.db, move |conn| {
        auth_service::create_admin_user(conn, &req.username, &req.email, &req.password, role)
    })
    .await?;

    tracing::info!(admin_id = %admin.id, creator_id = %creator.id, "admin account provisioned");
    Ok((StatusCode::CREATED, Json(admin)))
}
