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

use crate::models::{Event, EventChanges, NewEvent};
use crate::routes::search_pattern;
use crate::schema::events;
use crate::services::publishing::{published_at_on_create, published_at_on_update};
use crate::AppState;

const DEFAULT_LIMIT: u64 = 10;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventsQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub search: Option<String>,
    pub category: Option<String>,
    pub published: Option<bool>,
    #[serde(default)]
    pub upcoming: bool,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Title and start date are required"))]
    pub title: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    #[validate(required(message = "Title and start date are required"))]
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub category: Option<String>,
    #[serde(default)]
    pub is_published: bool,
    pub published_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEventRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub category: Option<String>,
    pub is_published: Option<bool>,
    pub published_at: Option<DateTime<Utc>>,
}

fn filtered(params: &EventsQuery, now: DateTime<Utc>) -> events::BoxedQuery<'static, Pg> {
    let mut query = events::table
        .filter(events::is_published.eq(params.published.unwrap_or(true)))
        .into_boxed();

    if let Some(pattern) = params.search.as_deref().and_then(search_pattern) {
        query = query.filter(
            events::title
                .ilike(pattern.clone())
                .or(events::description.ilike(pattern)),
        );
    }
    if let Some(category) = params.category.clone().filter(|c| !c.is_empty()) {
        query = query.filter(events::category.eq(category));
    }
    if params.upcoming {
        query = query.filter(events::start_date.ge(now));
    }
    query
}

/// GET /api/events
pub async fn list_events(
    State(state): State<AppState>,
    QueryParams(params): QueryParams<EventsQuery>,
) -> AppResult<Json<Paginated<Event>>> {
    let page = PageRequest::new(params.page, params.limit, DEFAULT_LIMIT);
    let now = Utc::now();

    let (items, total) = run_blocking(&state.db, move |conn| {
        let total: i64 = filtered(&params, now).count().get_result(conn)?;
        let items = filtered(&params, now)
            .order(events::start_date.asc())
            .offset(page.offset())
            .limit(page.limit())
            .load::<Event>(conn)?;
        Ok((items, total))
    })
    .await?;

    Ok(Json(Paginated::new(items, total, &page)))
}

/// GET /api/events/:id
pub async fn get_event(
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
) -> AppResult<Json<Event>> {
    let item = run_blocking(&state.db, move |conn| {
        Ok(diesel::update(events::table.find(id))
            .set(events::views.eq(events::views + 1))
            .get_result::<Event>(conn)
            .optional()?)
    })
    .await?
    .ok_or_else(|| AppError::not_found("Event not found"))?;

    Ok(Json(item))
}

/// POST /api/events
pub async fn create_event(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    JsonBody(req): JsonBody<CreateEventRequest>,
) -> AppResult<(StatusCode, Json<Event>)> {
    req.validate()?;
    let start_date = req
        .start_date
        .ok_or_else(|| AppError::Validation("Title and start date are required".into()))?;

    let row = NewEvent {
        published_at: published_at_on_create(req.is_published, req.published_at, Utc::now()),
        title: req.title,
        description: req.description,
        image_url: req.image_url,
        start_date,
        end_date: req.end_date,
        location: req.location,
        category: req.category,
        is_published: req.is_published,
        author_id: admin.id,
    };

    let item = run_blocking(&state.db, move |conn| {
        Ok(diesel::insert_into(events::table).values(&row).get_result::<Event>(conn)?)
    })
    .await?;

    tracing::info!(event_id = %item.id, author_id = %admin.id, "event created");
    Ok((StatusCode::CREATED, Json(item)))
}

/// PUT /api/events/:id
pub async fn update_event(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    PathParam(id): PathParam<Uuid>,
    JsonBody(req): JsonBody<UpdateEventRequest>,
) -> AppResult<Json<Event>> {
    let now = Utc::now();
    let changes = EventChanges {
        published_at: published_at_on_update(req.is_published, req.published_at, now),
        title: req.title,
        description: req.description,
        image_url: req.image_url,
        start_date: req.start_date,
        end_date: req.end_date,
        location: req.location,
        category: req.category,
        is_published: req.is_published,
        updated_at: now,
    };

    let item = run_blocking(&state.db, move |conn| {
        Ok(diesel::update(events::table.find(id))
            .set(&changes)
            .get_result::<Event>(conn)
            .optional()?)
    })
    .await?
    .ok_or_else(|| AppError::not_found("Event not found"))?;

    tracing::info!(event_id = %id, editor_id = %admin.id, "event updated");
    Ok(Json(item))
}

/// DELETE /api/events/:id
pub async fn delete_event(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    PathParam(id): PathParam<Uuid>,
) -> AppResult<Json<MessageResponse>> {
    let deleted = run_blocking(&state.db, move |conn| {
        Ok(diesel::delete(events::table.find(id)).execute(conn)?)
    })
    .await?;

    if deleted == 0 {
        return Err(AppError::not_found("Event not found"));
    }

    tracing::info!(event_id = %id, editor_id = %admin.id, "event deleted");
    Ok(Json(MessageResponse::new("Event deleted successfully")))
}
