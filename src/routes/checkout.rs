use axum::{Json, Router, extract::State, http::StatusCode, routing::post};

use crate::{
    dto::{
        checkout::{CheckoutRequest, StepValidation, ValidateStepRequest},
        orders::OrderWithItems,
    },
    error::AppResult,
    extract::AppJson,
    middleware::auth::AuthUser,
    response::ApiResponse,
    services::order_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(checkout))
        .route("/validate", post(validate_step))
}

#[utoipa::path(
    post,
    path = "/api/checkout",
    request_body = CheckoutRequest,
    responses(
        (status = 201, description = "Order created", body = ApiResponse<OrderWithItems>),
        (status = 400, description = "Invalid form, cart or coupon"),
        (status = 500, description = "Shipping provider failure"),
    ),
    security((), ("bearer_auth" = [])),
    tag = "Checkout"
)]
pub async fn checkout(
    State(state): State<AppState>,
    user: Option<AuthUser>,
    AppJson(payload): AppJson<CheckoutRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<OrderWithItems>>)> {
    let resp = order_service::checkout(&state, user.as_ref(), payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    post,
    path = "/api/checkout/validate",
    request_body = ValidateStepRequest,
    responses(
        (status = 200, description = "Field errors for one checkout step", body = ApiResponse<StepValidation>),
    ),
    tag = "Checkout"
)]
pub async fn validate_step(
    AppJson(payload): AppJson<ValidateStepRequest>,
) -> Json<ApiResponse<StepValidation>> {
    Json(order_service::validate_step(payload))
}
