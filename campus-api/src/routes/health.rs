use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use diesel::prelude::*;

use campus_shared::clients::db::run_blocking;
use campus_shared::types::api::{HealthCheck, HealthResponse};

use crate::AppState;

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let ping = run_blocking(&state.db, |conn| {
        diesel::sql_query("SELECT 1").execute(conn)?;
        Ok(())
    })
    .await;

    let database = match ping {
        Ok(()) => HealthCheck::pass("database"),
        Err(e) => {
            tracing::warn!(error = %e, "database health check failed");
            HealthCheck::fail("database", "database unreachable")
        }
    };

    let response = HealthResponse::from_checks("campus-api", env!("CARGO_PKG_VERSION"), vec![database]);
    (response.status_code(), Json(response))
}

/// GET /metrics
pub async fn metrics(State(state): State<AppState>) -> String {
    state
        .metrics
        .as_ref()
        .map(|handle| handle.render())
        .unwrap_or_default()
}
