use std::collections::HashMap;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use diesel::dsl::count;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use campus_shared::clients::db::run_blocking;
use campus_shared::errors::{AppError, AppResult};
use campus_shared::extract::{JsonBody, PathParam, QueryParams};
use campus_shared::middleware::AdminUser;
use campus_shared::types::api::{DataResponse, MessageResponse};

use crate::models::{Course, Department, DepartmentChanges, FacultyMember, NewDepartment};
use crate::schema::{courses, departments, faculty};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct DepartmentsQuery {
    pub active: Option<bool>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentSummary {
    #[serde(flatten)]
    pub department: Department,
    pub course_count: i64,
    pub faculty_count: i64,
}

#[derive(Debug, Serialize)]
pub struct DepartmentDetail {
    #[serde(flatten)]
    pub department: Department,
    pub courses: Vec<Course>,
    pub faculty: Vec<FacultyMember>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateDepartmentRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Name and code are required"))]
    pub name: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Name and code are required"))]
    pub code: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub head_name: Option<String>,
    #[validate(email(message = "Invalid head email"))]
    pub head_email: Option<String>,
    pub head_phone: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDepartmentRequest {
    pub name: Option<String>,
    pub code: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub head_name: Option<String>,
    pub head_email: Option<String>,
    pub head_phone: Option<String>,
    pub is_active: Option<bool>,
}

/// GET /api/departments
/// Counts include inactive courses and faculty.
pub async fn list_departments(
    State(state): State<AppState>,
    QueryParams(params): QueryParams<DepartmentsQuery>,
) -> AppResult<Json<DataResponse<DepartmentSummary>>> {
    let only_active = params.active.unwrap_or(true);

    let summaries = run_blocking(&state.db, move |conn| {
        let mut query = departments::table.into_boxed();
        if only_active {
            query = query.filter(departments::is_active.eq(true));
        }
        let items = query.order(departments::name.asc()).load::<Department>(conn)?;

        let course_counts: HashMap<Uuid, i64> = courses::table
            .group_by(courses::department_id)
            .select((courses::department_id, count(courses::id)))
            .load::<(Uuid, i64)>(conn)?
            .into_iter()
            .collect();
        let faculty_counts: HashMap<Uuid, i64> = faculty::table
            .group_by(faculty::department_id)
            .select((faculty::department_id, count(faculty::id)))
            .load::<(Uuid, i64)>(conn)?
            .into_iter()
            .collect();

        Ok(items
            .into_iter()
            .map(|department| DepartmentSummary {
                course_count: course_counts.get(&department.id).copied().unwrap_or(0),
                faculty_count: faculty_counts.get(&department.id).copied().unwrap_or(0),
                department,
            })
            .collect::<Vec<_>>())
    })
    .await?;

    Ok(Json(DataResponse::new(summaries)))
}

/// GET /api/departments/:id
/// Embeds the active courses and faculty.
pub async fn get_department(
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
) -> AppResult<Json<DepartmentDetail>> {
    let detail = run_blocking(&state.db, move |conn| {
        let Some(department) = departments::table.find(id).first::<Department>(conn).optional()? else {
            return Ok(None);
        };

        let courses = courses::table
            .filter(courses::department_id.eq(id))
            .filter(courses::is_active.eq(true))
            .order(courses::name.asc())
            .load::<Course>(conn)?;
        let faculty = faculty::table
            .filter(faculty::department_id.eq(id))
            .filter(faculty::is_active.eq(true))
            .order(faculty::name.asc())
            .load::<FacultyMember>(conn)?;

        Ok(Some(DepartmentDetail { department, courses, faculty }))
    })
    .await?
    .ok_or_else(|| AppError::not_found("Department not found"))?;

    Ok(Json(detail))
}

/// POST /api/departments
pub async fn create_department(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    JsonBody(req): JsonBody<CreateDepartmentRequest>,
) -> AppResult<(StatusCode, Json<Department>)> {
    req.validate()?;

    let row = NewDepartment {
        name: req.name,
        code: req.code,
        description: req.description,
        image_url: req.image_url,
        head_name: req.head_name,
        head_email: req.head_email,
        head_phone: req.head_phone,
    };

    let department = run_blocking(&state.db, move |conn| {
        Ok(diesel::insert_into(departments::table)
            .values(&row)
            .get_result::<Department>(conn)?)
    })
    .await?;

    tracing::info!(department_id = %department.id, code = %department.code, editor_id = %admin.id, "department created");
    Ok((StatusCode::CREATED, Json(department)))
}

/// PUT /api/departments/:id
pub async fn update_department(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    PathParam(id): PathParam<Uuid>,
    JsonBody(req): JsonBody<UpdateDepartmentRequest>,
) -> AppResult<Json<Department>> {
    let changes = DepartmentChanges {
        name: req.name,
        code: req.code,
        description: req.description,
        image_url: req.image_url,
        head_name: req.head_name,
        head_email: req.head_email,
        head_phone: req.head_phone,
        is_active: req.is_active,
        updated_at: Utc::now(),
    };

    let department = run_blocking(&state.db, move |conn| {
        Ok(diesel::update(departments::table.find(id))
            .set(&changes)
            .get_result::<Department>(conn)
            .optional()?)
    })
    .await?
    .ok_or_else(|| AppError::not_found("Department not found"))?;

    tracing::info!(department_id = %id, editor_id = %admin.id, "department updated");
    Ok(Json(department))
}

/// DELETE /api/departments/:id
/// Courses and faculty of the department go with it.
pub async fn delete_department(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    PathParam(id): PathParam<Uuid>,
) -> AppResult<Json<MessageResponse>> {
    let deleted = run_blocking(&state.db, move |conn| {
        Ok(diesel::delete(departments::table.find(id)).execute(conn)?)
    })
    .await?;

    if deleted == 0 {
        return Err(AppError::not_found("Department not found"));
    }

    tracing::info!(department_id = %id, editor_id = %admin.id, "department deleted");
    Ok(Json(MessageResponse::new("Department deleted successfully")))
}
