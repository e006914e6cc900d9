use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use diesel::prelude::*;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use campus_shared::clients::db::run_blocking;
use campus_shared::errors::{AppError, AppResult};
use campus_shared::extract::{JsonBody, PathParam, QueryParams};
use campus_shared::middleware::AdminUser;
use campus_shared::types::api::MessageResponse;
use campus_shared::types::pagination::{PageRequest, Paginated};

use crate::models::Notification;
use crate::schema::notifications;
use crate::services::notification_service::{
    self, Audience, NotificationDraft, PgNotificationStore, Target, DEFAULT_NOTIFICATION_TYPE,
};
use crate::AppState;

const DEFAULT_LIMIT: u64 = 20;

#[derive(Debug, Default, Deserialize)]
pub struct NotificationsQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateNotificationRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Title and body are required"))]
    pub title: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Title and body are required"))]
    pub body: String,
    #[serde(rename = "type")]
    pub notification_type: Option<String>,
    pub target_audience: Option<Audience>,
    pub department_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
    pub data: Option<serde_json::Value>,
}

/// GET /api/notifications
pub async fn list_notifications(
    State(state): State<AppState>,
    QueryParams(params): QueryParams<NotificationsQuery>,
) -> AppResult<Json<Paginated<Notification>>> {
    let page = PageRequest::new(params.page, params.limit, DEFAULT_LIMIT);

    let (items, total) = run_blocking(&state.db, move |conn| {
        let total: i64 = notifications::table.count().get_result(conn)?;
        let items = notifications::table
            .order(notifications::created_at.desc())
            .offset(page.offset())
            .limit(page.limit())
            .load::<Notification>(conn)?;
        Ok((items, total))
    })
    .await?;

    Ok(Json(Paginated::new(items, total, &page)))
}

/// GET /api/notifications/:id
pub async fn get_notification(
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
) -> AppResult<Json<Notification>> {
    let notification = run_blocking(&state.db, move |conn| {
        Ok(notifications::table.find(id).first::<Notification>(conn).optional()?)
    })
    .await?
    .ok_or_else(|| AppError::not_found("Notification not found"))?;

    Ok(Json(notification))
}

/// POST /api/notifications
/// Responds 201 once the delivery attempt is recorded, whatever its outcome.
pub async fn create_notification(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    JsonBody(req): JsonBody<CreateNotificationRequest>,
) -> AppResult<(StatusCode, Json<Notification>)> {
    req.validate()?;
    let target = Target::resolve(req.target_audience, req.department_id, req.user_id)?;

    let draft = NotificationDraft {
        title: req.title,
        body: req.body,
        notification_type: req
            .notification_type
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_NOTIFICATION_TYPE.to_string()),
        target,
        data: req.data,
        created_by: admin.id,
    };

    let store = PgNotificationStore::new(state.db.clone());
    let notification = notification_service::dispatch(&store, state.push.as_ref(), draft).await?;

    Ok((StatusCode::CREATED, Json(notification)))
}

/// DELETE /api/notifications/:id
pub async fn delete_notification(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    PathParam(id): PathParam<Uuid>,
) -> AppResult<Json<MessageResponse>> {
    let deleted = run_blocking(&state.db, move |conn| {
        Ok(diesel::delete(notifications::table.find(id)).execute(conn)?)
    })
    .await?;

    if deleted == 0 {
        return Err(AppError::not_found("Notification not found"));
    }

    tracing::info!(notification_id = %id, editor_id = %admin.id, "notification deleted");
    Ok(Json(MessageResponse::new("Notification deleted successfully")))
}
