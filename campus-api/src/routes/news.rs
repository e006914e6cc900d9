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

use crate::models::{NewNews, News, NewsChanges};
use crate::routes::search_pattern;
use crate::schema::news;
use crate::services::publishing::{published_at_on_create, published_at_on_update};
use crate::AppState;

const DEFAULT_LIMIT: u64 = 10;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub search: Option<String>,
    pub category: Option<String>,
    pub published: Option<bool>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateNewsRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Title and content are required"))]
    pub title: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Title and content are required"))]
    pub content: String,
    pub image_url: Option<String>,
    pub category: Option<String>,
    #[serde(default)]
    pub is_published: bool,
    pub published_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateNewsRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub image_url: Option<String>,
    pub category: Option<String>,
    pub is_published: Option<bool>,
    pub published_at: Option<DateTime<Utc>>,
}

fn filtered(params: &NewsQuery) -> news::BoxedQuery<'static, Pg> {
    let mut query = news::table
        .filter(news::is_published.eq(params.published.unwrap_or(true)))
        .into_boxed();

    if let Some(pattern) = params.search.as_deref().and_then(search_pattern) {
        query = query.filter(news::title.ilike(pattern.clone()).or(news::content.ilike(pattern)));
    }
    if let Some(category) = params.category.clone().filter(|c| !c.is_empty()) {
        query = query.filter(news::category.eq(category));
    }
    query
}

/// GET /api/news
pub async fn list_news(
    State(state): State<AppState>,
    QueryParams(params): QueryParams<NewsQuery>,
) -> AppResult<Json<Paginated<News>>> {
    let page = PageRequest::new(params.page, params.limit, DEFAULT_LIMIT);

    let (items, total) = run_blocking(&state.db, move |conn| {
        let total: i64 = filtered(&params).count().get_result(conn)?;
        let items = filtered(&params)
            .order((news::published_at.desc(), news::created_at.desc()))
            .offset(page.offset())
            .limit(page.limit())
            .load::<News>(conn)?;
        Ok((items, total))
    })
    .await?;

    Ok(Json(Paginated::new(items, total, &page)))
}

/// GET /api/news/:id
/// Each read counts as a view.
pub async fn get_news(
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
) -> AppResult<Json<News>> {
    let item = run_blocking(&state.db, move |conn| {
        Ok(diesel::update(news::table.find(id))
            .set(news::views.eq(news::views + 1))
            .get_result::<News>(conn)
            .optional()?)
    })
    .await?
    .ok_or_else(|| AppError::not_found("News not found"))?;

    Ok(Json(item))
}

/// POST /api/news
pub async fn create_news(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    JsonBody(req): JsonBody<CreateNewsRequest>,
) -> AppResult<(StatusCode, Json<News>)> {
    req.validate()?;

    let row = NewNews {
        published_at: published_at_on_create(req.is_published, req.published_at, Utc::now()),
        title: req.title,
        content: req.content,
        image_url: req.image_url,
        category: req.category,
        is_published: req.is_published,
        author_id: admin.id,
    };

    let item = run_blocking(&state.db, move |conn| {
        Ok(diesel::insert_into(news::table).values(&row).get_result::<News>(conn)?)
    })
    .await?;

    tracing::info!(news_id = %item.id, author_id = %admin.id, "news created");
    Ok((StatusCode::CREATED, Json(item)))
}

/// PUT /api/news/:id
pub async fn update_news(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    PathParam(id): PathParam<Uuid>,
    JsonBody(req): JsonBody<UpdateNewsRequest>,
) -> AppResult<Json<News>> {
    let now = Utc::now();
    let changes = NewsChanges {
        published_at: published_at_on_update(req.is_published, req.published_at, now),
        title: req.title,
        content: req.content,
        image_url: req.image_url,
        category: req.category,
        is_published: req.is_published,
        updated_at: now,
    };

    let item = run_blocking(&state.db, move |conn| {
        Ok(diesel::update(news::table.find(id))
            .set(&changes)
            .get_result::<News>(conn)
            .optional()?)
    })
    .await?
    .ok_or_else(|| AppError::not_found("News not found"))?;

    tracing::info!(news_id = %id, editor_id = %admin.id, "news updated");
    Ok(Json(item))
}

/// DELETE /api/news/:id
pub async fn delete_news(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    PathParam(id): PathParam<Uuid>,
) -> AppResult<Json<MessageResponse>> {
    let deleted = run_blocking(&state.db, move |conn| {
        Ok(diesel::delete(news::table.find(id)).execute(conn)?)
    })
    .await?;

    if deleted == 0 {
        return Err(AppError::not_found("News not found"));
    }

    tracing::info!(news_id = %id, editor_id = %admin.id, "news deleted");
    Ok(Json(MessageResponse::new("News deleted successfully")))
}
