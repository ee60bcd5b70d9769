use axum::{Json, Router, extract::State, routing::post};

use crate::{
    dto::cart::{CartSummary, CartSummaryRequest},
    error::AppResult,
    extract::AppJson,
    response::ApiResponse,
    services::cart_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/summary", post(cart_summary))
}

#[utoipa::path(
    post,
    path = "/api/cart/summary",
    request_body = CartSummaryRequest,
    responses(
        (status = 200, description = "Price a cart with optional coupon and shipping", body = ApiResponse<CartSummary>),
        (status = 400, description = "Empty cart, invalid quantity or unavailable product"),
    ),
    tag = "Cart"
)]
pub async fn cart_summary(
    State(state): State<AppState>,
    AppJson(payload): AppJson<CartSummaryRequest>,
) -> AppResult<Json<ApiResponse<CartSummary>>> {
    let resp = cart_service::summary(&state, payload).await?;
    Ok(Json(resp))
}
