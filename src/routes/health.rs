use axum::{Json, extract::State};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    response::{ApiResponse, Meta},
    state::AppState,
};

#[derive(Serialize, ToSchema)]
pub struct HealthData {
    pub status: String,
    pub version: String,
}

#[derive(Serialize, ToSchema)]
pub struct ReadinessData {
    pub status: String,
    pub shipping_provider: bool,
    pub email: bool,
    pub remote_blobs: bool,
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "OK", body = ApiResponse<HealthData>),
    ),
    tag = "Health"
)]
pub async fn health_check() -> Json<ApiResponse<HealthData>> {
    let data = HealthData {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    Json(ApiResponse::success(
        "Health check",
        data,
        Some(Meta::empty()),
    ))
}

/// Checks the database and reports which integrations are configured.
#[utoipa::path(
    get,
    path = "/health/ready",
    responses(
        (status = 200, description = "Database reachable", body = ApiResponse<ReadinessData>),
        (status = 500, description = "Database unavailable"),
    ),
    tag = "Health"
)]
pub async fn readiness_check(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<ReadinessData>>> {
    sqlx::query("SELECT 1").execute(&state.pool).await?;

    let data = ReadinessData {
        status: "ok".to_string(),
        shipping_provider: state.shipping.is_some(),
        email: state.mailer.is_some(),
        remote_blobs: state.blobs.is_remote(),
    };
    Ok(Json(ApiResponse::success(
        "Ready",
        data,
        Some(Meta::empty()),
    )))
}
