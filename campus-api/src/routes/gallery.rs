use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use diesel::pg::Pg;
use diesel::prelude::*;
use serde::Deserialize;
use uuid::Uuid;

use campus_shared::clients::db::run_blocking;
use campus_shared::errors::{AppError, AppResult};
use campus_shared::extract::{JsonBody, PathParam, QueryParams};
use campus_shared::middleware::AdminUser;
use campus_shared::types::api::MessageResponse;
use campus_shared::types::pagination::{PageRequest, Paginated};

use crate::models::{GalleryChanges, GalleryItem, NewGalleryItem};
use crate::schema::gallery;
use crate::AppState;

const DEFAULT_LIMIT: u64 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MediaType {
    Image,
    Video,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Image => "IMAGE",
            MediaType::Video => "VIDEO",
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub published: Option<bool>,
    pub album_id: Option<String>,
    #[serde(rename = "type")]
    pub media_type: Option<MediaType>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGalleryRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub media_type: Option<MediaType>,
    pub image_url: Option<String>,
    pub video_url: Option<String>,
    pub album_id: Option<String>,
    pub is_published: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateGalleryRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub video_url: Option<String>,
    pub album_id: Option<String>,
    pub is_published: Option<bool>,
}

fn present(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}

impl CreateGalleryRequest {
    /// Title and type are required; the URL matching the type must be set.
    fn into_row(self) -> AppResult<NewGalleryItem> {
        let (Some(title), Some(media_type)) = (self.title.filter(|t| !t.trim().is_empty()), self.media_type) else {
            return Err(AppError::Validation("Title and type are required".into()));
        };

        match media_type {
            MediaType::Image if !present(&self.image_url) => {
                return Err(AppError::Validation("Image URL is required for image type".into()));
            }
            MediaType::Video if !present(&self.video_url) => {
                return Err(AppError::Validation("Video URL is required for video type".into()));
            }
            _ => {}
        }

        Ok(NewGalleryItem {
            title,
            description: self.description,
            media_type: media_type.as_str().to_string(),
            image_url: self.image_url,
            video_url: self.video_url,
            album_id: self.album_id,
            is_published: self.is_published.unwrap_or(true),
        })
    }
}

fn filtered(params: &GalleryQuery) -> gallery::BoxedQuery<'static, Pg> {
    let mut query = gallery::table
        .filter(gallery::is_published.eq(params.published.unwrap_or(true)))
        .into_boxed();

    if let Some(album_id) = params.album_id.clone().filter(|a| !a.is_empty()) {
        query = query.filter(gallery::album_id.eq(album_id));
    }
    if let Some(media_type) = params.media_type {
        query = query.filter(gallery::media_type.eq(media_type.as_str()));
    }
    query
}

/// GET /api/gallery
pub async fn list_gallery(
    State(state): State<AppState>,
    QueryParams(params): QueryParams<GalleryQuery>,
) -> AppResult<Json<Paginated<GalleryItem>>> {
    let page = PageRequest::new(params.page, params.limit, DEFAULT_LIMIT);

    let (items, total) = run_blocking(&state.db, move |conn| {
        let total: i64 = filtered(&params).count().get_result(conn)?;
        let items = filtered(&params)
            .order(gallery::created_at.desc())
            .offset(page.offset())
            .limit(page.limit())
            .load::<GalleryItem>(conn)?;
        Ok((items, total))
    })
    .await?;

    Ok(Json(Paginated::new(items, total, &page)))
}

/// GET /api/gallery/:id
pub async fn get_gallery_item(
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
) -> AppResult<Json<GalleryItem>> {
    let item = run_blocking(&state.db, move |conn| {
        Ok(gallery::table.find(id).first::<GalleryItem>(conn).optional()?)
    })
    .await?
    .ok_or_else(|| AppError::not_found("Gallery item not found"))?;

    Ok(Json(item))
}

/// POST /api/gallery
pub async fn create_gallery_item(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    JsonBody(req): JsonBody<CreateGalleryRequest>,
) -> AppResult<(StatusCode, Json<GalleryItem>)> {
    let row = req.into_row()?;

    let item = run_blocking(&state.db, move |conn| {
        Ok(diesel::insert_into(gallery::table)
            .values(&row)
            .get_result::<GalleryItem>(conn)?)
    })
    .await?;

    tracing::info!(gallery_id = %item.id, media_type = %item.media_type, editor_id = %admin.id, "gallery item created");
    Ok((StatusCode::CREATED, Json(item)))
}

/// PUT /api/gallery/:id
pub async fn update_gallery_item(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    PathParam(id): PathParam<Uuid>,
    JsonBody(req): JsonBody<UpdateGalleryRequest>,
) -> AppResult<Json<GalleryItem>> {
    let changes = GalleryChanges {
        title: req.title,
        description: req.description,
        image_url: req.image_url,
        video_url: req.video_url,
        album_id: req.album_id,
        is_published: req.is_published,
        updated_at: Utc::now(),
    };

    let item = run_blocking(&state.db, move |conn| {
        Ok(diesel::update(gallery::table.find(id))
            .set(&changes)
            .get_result::<GalleryItem>(conn)
            .optional()?)
    })
    .await?
    .ok_or_else(|| AppError::not_found("Gallery item not found"))?;

    tracing::info!(gallery_id = %id, editor_id = %admin.id, "gallery item updated");
    Ok(Json(item))
}

/// DELETE /api/gallery/:id
pub async fn delete_gallery_item(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    PathParam(id): PathParam<Uuid>,
) -> AppResult<Json<MessageResponse>> {
    let deleted = run_blocking(&state.db, move |conn| {
        Ok(diesel::delete(gallery::table.find(id)).execute(conn)?)
    })
    .await?;

    if deleted == 0 {
        return Err(AppError::not_found("Gallery item not found"));
    }

    tracing::info!(gallery_id = %id, editor_id = %admin.id, "gallery item deleted");
    Ok(Json(MessageResponse::new("Gallery item deleted successfully")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(value: serde_json::Value) -> CreateGalleryRequest {
        serde_json::from_value(value).unwrap()
    }

    fn message(err: AppError) -> String {
        match err {
            AppError::Validation(msg) => msg,
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn title_and_type_required() {
        let err = request(serde_json::json!({ "type": "IMAGE", "imageUrl": "x" })).into_row().unwrap_err();
        assert_eq!(message(err), "Title and type are required");

        let err = request(serde_json::json!({ "title": "Fest" })).into_row().unwrap_err();
        assert_eq!(message(err), "Title and type are required");
    }

    #[test]
    fn url_must_match_type() {
        let err = request(serde_json::json!({ "title": "Fest", "type": "IMAGE", "videoUrl": "v" }))
            .into_row()
            .unwrap_err();
        assert_eq!(message(err), "Image URL is required for image type");

        let err = request(serde_json::json!({ "title": "Fest", "type": "VIDEO", "imageUrl": "i" }))
            .into_row()
            .unwrap_err();
        assert_eq!(message(err), "Video URL is required for video type");
    }

    #[test]
    fn valid_video_item() {
        let row = request(serde_json::json!({
            "title": "Convocation",
            "type": "VIDEO",
            "videoUrl": "https://cdn.campus.edu/c.mp4",
            "albumId": "2024"
        }))
        .into_row()
        .unwrap();
        assert_eq!(row.media_type, "VIDEO");
        assert_eq!(row.album_id.as_deref(), Some("2024"));
        assert!(row.is_published);
    }
}
