use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use campus_shared::clients::db::run_blocking;
use campus_shared::errors::{AppError, AppResult};
use campus_shared::extract::{JsonBody, PathParam, QueryParams};
use campus_shared::middleware::AdminUser;
use campus_shared::types::api::{DataResponse, MessageResponse};

use crate::models::{Examination, ExaminationChanges, NewExamination};
use crate::schema::examinations;
use crate::services::publishing::{published_at_on_create, published_at_on_update};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ExamsQuery {
    pub published: Option<bool>,
    #[serde(default)]
    pub upcoming: bool,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateExamRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    pub description: Option<String>,
    pub exam_date: Option<DateTime<Utc>>,
    pub timetable_url: Option<String>,
    pub hall_ticket_url: Option<String>,
    pub results_url: Option<String>,
    pub department_id: Option<Uuid>,
    pub course_id: Option<Uuid>,
    #[serde(default)]
    pub is_published: bool,
    pub published_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateExamRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub exam_date: Option<DateTime<Utc>>,
    pub timetable_url: Option<String>,
    pub hall_ticket_url: Option<String>,
    pub results_url: Option<String>,
    pub department_id: Option<Uuid>,
    pub course_id: Option<Uuid>,
    pub is_published: Option<bool>,
    pub published_at: Option<DateTime<Utc>>,
}

/// GET /api/exams
pub async fn list_exams(
    State(state): State<AppState>,
    QueryParams(params): QueryParams<ExamsQuery>,
) -> AppResult<Json<DataResponse<Examination>>> {
    let now = Utc::now();

    let items = run_blocking(&state.db, move |conn| {
        let mut query = examinations::table
            .filter(examinations::is_published.eq(params.published.unwrap_or(true)))
            .into_boxed();
        if params.upcoming {
            query = query.filter(examinations::exam_date.ge(now));
        }
        Ok(query
            .order(examinations::exam_date.asc())
            .load::<Examination>(conn)?)
    })
    .await?;

    Ok(Json(DataResponse::new(items)))
}

/// GET /api/exams/:id
pub async fn get_exam(
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
) -> AppResult<Json<Examination>> {
    let exam = run_blocking(&state.db, move |conn| {
        Ok(examinations::table.find(id).first::<Examination>(conn).optional()?)
    })
    .await?
    .ok_or_else(|| AppError::not_found("Examination not found"))?;

    Ok(Json(exam))
}

/// POST /api/exams
pub async fn create_exam(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    JsonBody(req): JsonBody<CreateExamRequest>,
) -> AppResult<(StatusCode, Json<Examination>)> {
    req.validate()?;

    let row = NewExamination {
        published_at: published_at_on_create(req.is_published, req.published_at, Utc::now()),
        title: req.title,
        description: req.description,
        exam_date: req.exam_date,
        timetable_url: req.timetable_url,
        hall_ticket_url: req.hall_ticket_url,
        results_url: req.results_url,
        department_id: req.department_id,
        course_id: req.course_id,
        is_published: req.is_published,
    };

    let exam = run_blocking(&state.db, move |conn| {
        Ok(diesel::insert_into(examinations::table)
            .values(&row)
            .get_result::<Examination>(conn)?)
    })
    .await?;

    tracing::info!(exam_id = %exam.id, editor_id = %admin.id, "examination created");
    Ok((StatusCode::CREATED, Json(exam)))
}

/// PUT /api/exams/:id
pub async fn update_exam(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    PathParam(id): PathParam<Uuid>,
    JsonBody(req): JsonBody<UpdateExamRequest>,
) -> AppResult<Json<Examination>> {
    let now = Utc::now();
    let changes = ExaminationChanges {
        published_at: published_at_on_update(req.is_published, req.published_at, now),
        title: req.title,
        description: req.description,
        exam_date: req.exam_date,
        timetable_url: req.timetable_url,
        hall_ticket_url: req.hall_ticket_url,
        results_url: req.results_url,
        department_id: req.department_id,
        course_id: req.course_id,
        is_published: req.is_published,
        updated_at: now,
    };

    let exam = run_blocking(&state.db, move |conn| {
        Ok(diesel::update(examinations::table.find(id))
            .set(&changes)
            .get_result::<Examination>(conn)
            .optional()?)
    })
    .await?
    .ok_or_else(|| AppError::not_found("Examination not found"))?;

    tracing::info!(exam_id = %id, editor_id = %admin.id, "examination updated");
    Ok(Json(exam))
}

/// DELETE /api/exams/:id
pub async fn delete_exam(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    PathParam(id): PathParam<Uuid>,
) -> AppResult<Json<MessageResponse>> {
    let deleted = run_blocking(&state.db, move |conn| {
        Ok(diesel::delete(examinations::table.find(id)).execute(conn)?)
    })
    .await?;

    if deleted == 0 {
        return Err(AppError::not_found("Examination not found"));
    }

    tracing::info!(exam_id = %id, editor_id = %admin.id, "examination deleted");
    Ok(Json(MessageResponse::new("Examination deleted successfully")))
}
