use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use diesel::pg::Pg;
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

use crate::models::{Circular, CircularChanges, NewCircular};
use crate::routes::search_pattern;
use crate::schema::circulars;
use crate::services::notification_service::Audience;
use crate::services::publishing::{published_at_on_create, published_at_on_update};
use crate::AppState;

const DEFAULT_LIMIT: u64 = 10;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CircularsQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub search: Option<String>,
    pub category: Option<String>,
    pub published: Option<bool>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCircularRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Title and content are required"))]
    pub title: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Title and content are required"))]
    pub content: String,
    pub document_url: Option<String>,
    pub category: Option<String>,
    pub target_audience: Option<Audience>,
    pub department_id: Option<Uuid>,
    #[serde(default)]
    pub is_published: bool,
    pub published_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCircularRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub document_url: Option<String>,
    pub category: Option<String>,
    pub target_audience: Option<Audience>,
    pub department_id: Option<Uuid>,
    pub is_published: Option<bool>,
    pub published_at: Option<DateTime<Utc>>,
}

fn filtered(params: &CircularsQuery) -> circulars::BoxedQuery<'static, Pg> {
    let mut query = circulars::table
        .filter(circulars::is_published.eq(params.published.unwrap_or(true)))
        .into_boxed();

    if let Some(pattern) = params.search.as_deref().and_then(search_pattern) {
        query = query.filter(
            circulars::title
                .ilike(pattern.clone())
                .or(circulars::content.ilike(pattern)),
        );
    }
    if let Some(category) = params.category.clone().filter(|c| !c.is_empty()) {
        query = query.filter(circulars::category.eq(category));
    }
    query
}

/// GET /api/circulars
pub async fn list_circulars(
    State(state): State<AppState>,
    QueryParams(params): QueryParams<CircularsQuery>,
) -> AppResult<Json<Paginated<Circular>>> {
    let page = PageRequest::new(params.page, params.limit, DEFAULT_LIMIT);

    let (items, total) = run_blocking(&state.db, move |conn| {
        let total: i64 = filtered(&params).count().get_result(conn)?;
        let items = filtered(&params)
            .order((circulars::published_at.desc(), circulars::created_at.desc()))
            .offset(page.offset())
            .limit(page.limit())
            .load::<Circular>(conn)?;
        Ok((items, total))
    })
    .await?;

    Ok(Json(Paginated::new(items, total, &page)))
}

/// GET /api/circulars/:id
pub async fn get_circular(
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
) -> AppResult<Json<Circular>> {
    let circular = run_blocking(&state.db, move |conn| {
        Ok(circulars::table.find(id).first::<Circular>(conn).optional()?)
    })
    .await?
    .ok_or_else(|| AppError::not_found("Circular not found"))?;

    Ok(Json(circular))
}

/// POST /api/circulars
pub async fn create_circular(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    JsonBody(req): JsonBody<CreateCircularRequest>,
) -> AppResult<(StatusCode, Json<Circular>)> {
    req.validate()?;

    let row = NewCircular {
        published_at: published_at_on_create(req.is_published, req.published_at, Utc::now()),
        title: req.title,
        content: req.content,
        document_url: req.document_url,
        category: req.category,
        target_audience: req.target_audience.unwrap_or(Audience::All).as_str().to_string(),
        department_id: req.department_id,
        is_published: req.is_published,
        author_id: admin.id,
    };

    let circular = run_blocking(&state.db, move |conn| {
        Ok(diesel::insert_into(circulars::table)
            .values(&row)
            .get_result::<Circular>(conn)?)
    })
    .await?;

    tracing::info!(circular_id = %circular.id, author_id = %admin.id, "circular created");
    Ok((StatusCode::CREATED, Json(circular)))
}

/// PUT /api/circulars/:id
pub async fn update_circular(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    PathParam(id): PathParam<Uuid>,
    JsonBody(req): JsonBody<UpdateCircularRequest>,
) -> AppResult<Json<Circular>> {
    let now = Utc::now();
    let changes = CircularChanges {
        published_at: published_at_on_update(req.is_published, req.published_at, now),
        title: req.title,
        content: req.content,
        document_url: req.document_url,
        category: req.category,
        target_audience: req.target_audience.map(|a| a.as_str().to_string()),
        department_id: req.department_id,
        is_published: req.is_published,
        updated_at: now,
    };

    let circular = run_blocking(&state.db, move |conn| {
        Ok(diesel::update(circulars::table.find(id))
            .set(&changes)
            .get_result::<Circular>(conn)
            .optional()?)
    })
    .await?
    .ok_or_else(|| AppError::not_found("Circular not found"))?;

    tracing::info!(circular_id = %id, editor_id = %admin.id, "circular updated");
    Ok(Json(circular))
}

/// DELETE /api/circulars/:id
pub async fn delete_circular(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    PathParam(id): PathParam<Uuid>,
) -> AppResult<Json<MessageResponse>> {
    let deleted = run_blocking(&state.db, move |conn| {
        Ok(diesel::delete(circulars::table.find(id)).execute(conn)?)
    })
    .await?;

    if deleted == 0 {
        return Err(AppError::not_found("Circular not found"));
    }

    tracing::info!(circular_id = %id, editor_id = %admin.id, "circular deleted");
    Ok(Json(MessageResponse::new("Circular deleted successfully")))
}
