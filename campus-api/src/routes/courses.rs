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

use crate::models::{Course, CourseChanges, NewCourse};
use crate::schema::courses;
use crate::AppState;

const REQUIRED: &str = "Name, code, departmentId, and level are required";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoursesQuery {
    pub active: Option<bool>,
    pub department_id: Option<Uuid>,
    pub level: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCourseRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Name, code, departmentId, and level are required"))]
    pub name: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Name, code, departmentId, and level are required"))]
    pub code: String,
    #[validate(required(message = "Name, code, departmentId, and level are required"))]
    pub department_id: Option<Uuid>,
    #[serde(default)]
    #[validate(length(min = 1, message = "Name, code, departmentId, and level are required"))]
    pub level: String,
    pub duration: Option<String>,
    pub description: Option<String>,
    pub eligibility: Option<String>,
    pub syllabus_url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCourseRequest {
    pub name: Option<String>,
    pub code: Option<String>,
    pub department_id: Option<Uuid>,
    pub level: Option<String>,
    pub duration: Option<String>,
    pub description: Option<String>,
    pub eligibility: Option<String>,
    pub syllabus_url: Option<String>,
    pub is_active: Option<bool>,
}

/// GET /api/courses
pub async fn list_courses(
    State(state): State<AppState>,
    QueryParams(params): QueryParams<CoursesQuery>,
) -> AppResult<Json<DataResponse<Course>>> {
    let items = run_blocking(&state.db, move |conn| {
        let mut query = courses::table.into_boxed();
        if params.active.unwrap_or(true) {
            query = query.filter(courses::is_active.eq(true));
        }
        if let Some(department_id) = params.department_id {
            query = query.filter(courses::department_id.eq(department_id));
        }
        if let Some(level) = params.level.filter(|l| !l.is_empty()) {
            query = query.filter(courses::level.eq(level));
        }
        Ok(query.order(courses::name.asc()).load::<Course>(conn)?)
    })
    .await?;

    Ok(Json(DataResponse::new(items)))
}

/// GET /api/courses/:id
pub async fn get_course(
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
) -> AppResult<Json<Course>> {
    let course = run_blocking(&state.db, move |conn| {
        Ok(courses::table.find(id).first::<Course>(conn).optional()?)
    })
    .await?
    .ok_or_else(|| AppError::not_found("Course not found"))?;

    Ok(Json(course))
}

/// POST /api/courses
pub async fn create_course(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    JsonBody(req): JsonBody<CreateCourseRequest>,
) -> AppResult<(StatusCode, Json<Course>)> {
    req.validate()?;
    let department_id = req
        .department_id
        .ok_or_else(|| AppError::Validation(REQUIRED.into()))?;

    let row = NewCourse {
        name: req.name,
        code: req.code,
        department_id,
        level: req.level,
        duration: req.duration,
        description: req.description,
        eligibility: req.eligibility,
        syllabus_url: req.syllabus_url,
    };

    let course = run_blocking(&state.db, move |conn| {
        Ok(diesel::insert_into(courses::table).values(&row).get_result::<Course>(conn)?)
    })
    .await?;

    tracing::info!(course_id = %course.id, department_id = %department_id, editor_id = %admin.id, "course created");
    Ok((StatusCode::CREATED, Json(course)))
}

/// PUT /api/courses/:id
pub async fn update_course(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    PathParam(id): PathParam<Uuid>,
    JsonBody(req): JsonBody<UpdateCourseRequest>,
) -> AppResult<Json<Course>> {
    let changes = CourseChanges {
        name: req.name,
        code: req.code,
        department_id: req.department_id,
        level: req.level,
        duration: req.duration,
        description: req.description,
        eligibility: req.eligibility,
        syllabus_url: req.syllabus_url,
        is_active: req.is_active,
        updated_at: Utc::now(),
    };

    let course = run_blocking(&state.db, move |conn| {
        Ok(diesel::update(courses::table.find(id))
            .set(&changes)
            .get_result::<Course>(conn)
            .optional()?)
    })
    .await?
    .ok_or_else(|| AppError::not_found("Course not found"))?;

    tracing::info!(course_id = %id, editor_id = %admin.id, "course updated");
    Ok(Json(course))
}

/// DELETE /api/courses/:id
pub async fn delete_course(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    PathParam(id): PathParam<Uuid>,
) -> AppResult<Json<MessageResponse>> {
    let deleted = run_blocking(&state.db, move |conn| {
        Ok(diesel::delete(courses::table.find(id)).execute(conn)?)
    })
    .await?;

    if deleted == 0 {
        return Err(AppError::not_found("Course not found"));
    }

    tracing::info!(course_id = %id, editor_id = %admin.id, "course deleted");
    Ok(Json(MessageResponse::new("Course deleted successfully")))
}
