use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use campus_shared::clients::db::run_blocking;
use campus_shared::errors::{AppError, AppResult};
use campus_shared::extract::{JsonBody, PathParam, QueryParams};
use campus_shared::middleware::AdminUser;
use campus_shared::types::api::{DataResponse, MessageResponse};

use crate::models::{NewPlacement, NewPlacementStat, Placement, PlacementChanges, PlacementStat};
use crate::schema::{placement_stats, placements};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct PlacementsQuery {
    pub active: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct PlacementWithStats {
    #[serde(flatten)]
    pub placement: Placement,
    pub stats: Vec<PlacementStat>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePlacementRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Company name is required"))]
    pub company_name: String,
    pub logo_url: Option<String>,
    pub description: Option<String>,
    pub website: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePlacementRequest {
    pub company_name: Option<String>,
    pub logo_url: Option<String>,
    pub description: Option<String>,
    pub website: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateStatRequest {
    #[validate(range(min = 1900, max = 2200, message = "A valid year is required"))]
    pub year: i32,
    #[serde(default)]
    #[validate(range(min = 0, message = "studentsPlaced cannot be negative"))]
    pub students_placed: i32,
    pub average_package: Option<f64>,
    pub highest_package: Option<f64>,
}

/// GET /api/placements
/// Each company carries its yearly stats, newest first.
pub async fn list_placements(
    State(state): State<AppState>,
    QueryParams(params): QueryParams<PlacementsQuery>,
) -> AppResult<Json<DataResponse<PlacementWithStats>>> {
    let only_active = params.active.unwrap_or(true);

    let items = run_blocking(&state.db, move |conn| {
        let mut query = placements::table.into_boxed();
        if only_active {
            query = query.filter(placements::is_active.eq(true));
        }
        let companies = query.order(placements::company_name.asc()).load::<Placement>(conn)?;

        let stats = PlacementStat::belonging_to(&companies)
            .order(placement_stats::year.desc())
            .load::<PlacementStat>(conn)?
            .grouped_by(&companies);

        Ok(companies
            .into_iter()
            .zip(stats)
            .map(|(placement, stats)| PlacementWithStats { placement, stats })
            .collect::<Vec<_>>())
    })
    .await?;

    Ok(Json(DataResponse::new(items)))
}

/// GET /api/placements/:id
pub async fn get_placement(
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
) -> AppResult<Json<PlacementWithStats>> {
    let item = run_blocking(&state.db, move |conn| {
        let Some(placement) = placements::table.find(id).first::<Placement>(conn).optional()? else {
            return Ok(None);
        };
        let stats = PlacementStat::belonging_to(&placement)
            .order(placement_stats::year.desc())
            .load::<PlacementStat>(conn)?;
        Ok(Some(PlacementWithStats { placement, stats }))
    })
    .await?
    .ok_or_else(|| AppError::not_found("Placement not found"))?;

    Ok(Json(item))
}

/// POST /api/placements
pub async fn create_placement(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    JsonBody(req): JsonBody<CreatePlacementRequest>,
) -> AppResult<(StatusCode, Json<PlacementWithStats>)> {
    req.validate()?;

    let row = NewPlacement {
        company_name: req.company_name,
        logo_url: req.logo_url,
        description: req.description,
        website: req.website,
    };

    let placement = run_blocking(&state.db, move |conn| {
        Ok(diesel::insert_into(placements::table)
            .values(&row)
            .get_result::<Placement>(conn)?)
    })
    .await?;

    tracing::info!(placement_id = %placement.id, editor_id = %admin.id, "placement created");
    Ok((
        StatusCode::CREATED,
        Json(PlacementWithStats { placement, stats: Vec::new() }),
    ))
}

/// PUT /api/placements/:id
pub async fn update_placement(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    PathParam(id): PathParam<Uuid>,
    JsonBody(req): JsonBody<UpdatePlacementRequest>,
) -> AppResult<Json<Placement>> {
    let changes = PlacementChanges {
        company_name: req.company_name,
        logo_url: req.logo_url,
        description: req.description,
        website: req.website,
        is_active: req.is_active,
        updated_at: Utc::now(),
    };

    let placement = run_blocking(&state.db, move |conn| {
        Ok(diesel::update(placements::table.find(id))
            .set(&changes)
            .get_result::<Placement>(conn)
            .optional()?)
    })
    .await?
    .ok_or_else(|| AppError::not_found("Placement not found"))?;

    tracing::info!(placement_id = %id, editor_id = %admin.id, "placement updated");
    Ok(Json(placement))
}

/// DELETE /api/placements/:id
pub async fn delete_placement(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    PathParam(id): PathParam<Uuid>,
) -> AppResult<Json<MessageResponse>> {
    let deleted = run_blocking(&state.db, move |conn| {
        Ok(diesel::delete(placements::table.find(id)).execute(conn)?)
    })
    .await?;

    if deleted == 0 {
        return Err(AppError::not_found("Placement not found"));
    }

    tracing::info!(placement_id = %id, editor_id = %admin.id, "placement deleted");
    Ok(Json(MessageResponse::new("Placement deleted successfully")))
}

/// POST /api/placements/:id/stats
/// One row per company and year; a duplicate year is a conflict.
pub async fn add_placement_stat(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    PathParam(id): PathParam<Uuid>,
    JsonBody(req): JsonBody<CreateStatRequest>,
) -> AppResult<(StatusCode, Json<PlacementStat>)> {
    req.validate()?;

    let row = NewPlacementStat {
        placement_id: id,
        year: req.year,
        students_placed: req.students_placed,
        average_package: req.average_package,
        highest_package: req.highest_package,
    };

    let stat = run_blocking(&state.db, move |conn| {
        let exists = placements::table
            .find(id)
            .select(placements::id)
            .first::<Uuid>(conn)
            .optional()?
            .is_some();
        if !exists {
            return Err(AppError::not_found("Placement not found"));
        }

        Ok(diesel::insert_into(placement_stats::table)
            .values(&row)
            .get_result::<PlacementStat>(conn)?)
    })
    .await?;

    tracing::info!(placement_id = %id, year = stat.year, editor_id = %admin.id, "placement stat added");
    Ok((StatusCode::CREATED, Json(stat)))
}
