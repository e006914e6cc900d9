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

use crate::models::{FacultyChanges, FacultyMember, NewFacultyMember};
use crate::schema::faculty;
use crate::AppState;

const REQUIRED: &str = "Name, email, designation, and departmentId are required";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FacultyQuery {
    pub active: Option<bool>,
    pub department_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateFacultyRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Name, email, designation, and departmentId are required"))]
    pub name: String,
    #[serde(default)]
    #[validate(
        length(min = 1, message = "Name, email, designation, and departmentId are required"),
        email(message = "Invalid email")
    )]
    pub email: String,
    pub phone: Option<String>,
    #[serde(default)]
    #[validate(length(min = 1, message = "Name, email, designation, and departmentId are required"))]
    pub designation: String,
    #[validate(required(message = "Name, email, designation, and departmentId are required"))]
    pub department_id: Option<Uuid>,
    pub image_url: Option<String>,
    pub bio: Option<String>,
    pub qualifications: Option<String>,
    pub research_areas: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFacultyRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub designation: Option<String>,
    pub department_id: Option<Uuid>,
    pub image_url: Option<String>,
    pub bio: Option<String>,
    pub qualifications: Option<String>,
    pub research_areas: Option<String>,
    pub is_active: Option<bool>,
}

/// GET /api/faculty
pub async fn list_faculty(
    State(state): State<AppState>,
    QueryParams(params): QueryParams<FacultyQuery>,
) -> AppResult<Json<DataResponse<FacultyMember>>> {
    let items = run_blocking(&state.db, move |conn| {
        let mut query = faculty::table.into_boxed();
        if params.active.unwrap_or(true) {
            query = query.filter(faculty::is_active.eq(true));
        }
        if let Some(department_id) = params.department_id {
            query = query.filter(faculty::department_id.eq(department_id));
        }
        Ok(query.order(faculty::name.asc()).load::<FacultyMember>(conn)?)
    })
    .await?;

    Ok(Json(DataResponse::new(items)))
}

/// GET /api/faculty/:id
pub async fn get_faculty_member(
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
) -> AppResult<Json<FacultyMember>> {
    let member = run_blocking(&state.db, move |conn| {
        Ok(faculty::table.find(id).first::<FacultyMember>(conn).optional()?)
    })
    .await?
    .ok_or_else(|| AppError::not_found("Faculty member not found"))?;

    Ok(Json(member))
}

/// POST /api/faculty
pub async fn create_faculty_member(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    JsonBody(req): JsonBody<CreateFacultyRequest>,
) -> AppResult<(StatusCode, Json<FacultyMember>)> {
    req.validate()?;
    let department_id = req
        .department_id
        .ok_or_else(|| AppError::Validation(REQUIRED.into()))?;

    let row = NewFacultyMember {
        name: req.name,
        email: req.email,
        phone: req.phone,
        designation: req.designation,
        department_id,
        image_url: req.image_url,
        bio: req.bio,
        qualifications: req.qualifications,
        research_areas: req.research_areas,
    };

    let member = run_blocking(&state.db, move |conn| {
        Ok(diesel::insert_into(faculty::table)
            .values(&row)
            .get_result::<FacultyMember>(conn)?)
    })
    .await?;

    tracing::info!(faculty_id = %member.id, department_id = %department_id, editor_id = %admin.id, "faculty member created");
    Ok((StatusCode::CREATED, Json(member)))
}

/// PUT /api/faculty/:id
pub async fn update_faculty_member(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    PathParam(id): PathParam<Uuid>,
    JsonBody(req): JsonBody<UpdateFacultyRequest>,
) -> AppResult<Json<FacultyMember>> {
    let changes = FacultyChanges {
        name: req.name,
        email: req.email,
        phone: req.phone,
        designation: req.designation,
        department_id: req.department_id,
        image_url: req.image_url,
        bio: req.bio,
        qualifications: req.qualifications,
        research_areas: req.research_areas,
        is_active: req.is_active,
        updated_at: Utc::now(),
    };

    let member = run_blocking(&state.db, move |conn| {
        Ok(diesel::update(faculty::table.find(id))
            .set(&changes)
            .get_result::<FacultyMember>(conn)
            .optional()?)
    })
    .await?
    .ok_or_else(|| AppError::not_found("Faculty member not found"))?;

    tracing::info!(faculty_id = %id, editor_id = %admin.id, "faculty member updated");
    Ok(Json(member))
}

/// DELETE /api/faculty/:id
pub async fn delete_faculty_member(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    PathParam(id): PathParam<Uuid>,
) -> AppResult<Json<MessageResponse>> {
    let deleted = run_blocking(&state.db, move |conn| {
        Ok(diesel::delete(faculty::table.find(id)).execute(conn)?)
    })
    .await?;

    if deleted == 0 {
        return Err(AppError::not_found("Faculty member not found"));
    }

    tracing::info!(faculty_id = %id, editor_id = %admin.id, "faculty member deleted");
    Ok(Json(MessageResponse::new("Faculty member deleted successfully")))
}
