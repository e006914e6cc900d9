use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use diesel::prelude::*;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use campus_shared::clients::db::run_blocking;
use campus_shared::errors::{AppError, AppResult};
use campus_shared::extract::{JsonBody, PathParam, QueryParams};
use campus_shared::middleware::AdminUser;
use campus_shared::types::api::{DataResponse, MessageResponse};

use crate::models::{Banner, BannerChanges, NewBanner};
use crate::schema::banners;
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct BannersQuery {
    pub active: Option<bool>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateBannerRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Title and image URL are required"))]
    pub title: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Title and image URL are required"))]
    pub image_url: String,
    pub link_url: Option<String>,
    #[serde(default)]
    pub order: i32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBannerRequest {
    pub title: Option<String>,
    pub image_url: Option<String>,
    pub link_url: Option<String>,
    pub order: Option<i32>,
    pub is_active: Option<bool>,
}

/// GET /api/banners
pub async fn list_banners(
    State(state): State<AppState>,
    QueryParams(params): QueryParams<BannersQuery>,
) -> AppResult<Json<DataResponse<Banner>>> {
    let only_active = params.active.unwrap_or(true);

    let items = run_blocking(&state.db, move |conn| {
        let mut query = banners::table.into_boxed();
        if only_active {
            query = query.filter(banners::is_active.eq(true));
        }
        Ok(query.order(banners::sort_order.asc()).load::<Banner>(conn)?)
    })
    .await?;

    Ok(Json(DataResponse::new(items)))
}

/// GET /api/banners/:id
pub async fn get_banner(
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
) -> AppResult<Json<Banner>> {
    let banner = run_blocking(&state.db, move |conn| {
        Ok(banners::table.find(id).first::<Banner>(conn).optional()?)
    })
    .await?
    .ok_or_else(|| AppError::not_found("Banner not found"))?;

    Ok(Json(banner))
}

/// POST /api/banners
pub async fn create_banner(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    JsonBody(req): JsonBody<CreateBannerRequest>,
) -> AppResult<(StatusCode, Json<Banner>)> {
    req.validate()?;

    let row = NewBanner {
        title: req.title,
        image_url: req.image_url,
        link_url: req.link_url,
        sort_order: req.order,
    };

    let banner = run_blocking(&state.db, move |conn| {
        Ok(diesel::insert_into(banners::table).values(&row).get_result::<Banner>(conn)?)
    })
    .await?;

    tracing::info!(banner_id = %banner.id, editor_id = %admin.id, "banner created");
    Ok((StatusCode::CREATED, Json(banner)))
}

/// PUT /api/banners/:id
pub async fn update_banner(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    PathParam(id): PathParam<Uuid>,
    JsonBody(req): JsonBody<UpdateBannerRequest>,
) -> AppResult<Json<Banner>> {
    let changes = BannerChanges {
        title: req.title,
        image_url: req.image_url,
        link_url: req.link_url,
        sort_order: req.order,
        is_active: req.is_active,
        updated_at: Utc::now(),
    };

    let banner = run_blocking(&state.db, move |conn| {
        Ok(diesel::update(banners::table.find(id))
            .set(&changes)
            .get_result::<Banner>(conn)
            .optional()?)
    })
    .await?
    .ok_or_else(|| AppError::not_found("Banner not found"))?;

    tracing::info!(banner_id = %id, editor_id = %admin.id, "banner updated");
    Ok(Json(banner))
}

/// DELETE /api/banners/:id
pub async fn delete_banner(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    PathParam(id): PathParam<Uuid>,
) -> AppResult<Json<MessageResponse>> {
    let deleted = run_blocking(&state.db, move |conn| {
        Ok(diesel::delete(banners::table.find(id)).execute(conn)?)
    })
    .await?;

    if deleted == 0 {
        return Err(AppError::not_found("Banner not found"));
    }

    tracing::info!(banner_id = %id, editor_id = %admin.id, "banner deleted");
    Ok(Json(MessageResponse::new("Banner deleted successfully")))
}
