use axum::{
    Json, Router,
    extract::State,
    http::HeaderMap,
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    dto::orders::{GuestOrderQuery, OrderWithItems, PaymentWebhookRequest},
    error::AppResult,
    extract::{AppJson, AppPath, AppQuery},
    response::ApiResponse,
    services::order_service,
    state::AppState,
};

const WEBHOOK_SECRET_HEADER: &str = "x-webhook-secret";

pub fn router() -> Router<AppState> {
    Router::new().route("/{id}", get(get_order))
}

pub fn webhook_router() -> Router<AppState> {
    Router::new().route("/payment", post(payment_webhook))
}

#[utoipa::path(
    get,
    path = "/api/orders/{id}",
    params(
        ("id" = Uuid, Path, description = "Order ID"),
        ("email" = String, Query, description = "Email used at checkout")
    ),
    responses(
        (status = 200, description = "Order with items", body = ApiResponse<OrderWithItems>),
        (status = 400, description = "Missing email"),
        (status = 404, description = "Not Found"),
    ),
    tag = "Orders"
)]
pub async fn get_order(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
    AppQuery(query): AppQuery<GuestOrderQuery>,
) -> AppResult<Json<ApiResponse<OrderWithItems>>> {
    let resp = order_service::get_guest_order(&state, id, &query.email).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/webhooks/payment",
    request_body = PaymentWebhookRequest,
    params(
        ("x-webhook-secret" = String, Header, description = "Shared webhook secret")
    ),
    responses(
        (status = 200, description = "Payment status recorded", body = ApiResponse<OrderWithItems>),
        (status = 401, description = "Missing or wrong secret"),
        (status = 404, description = "Order not found"),
    ),
    tag = "Orders"
)]
pub async fn payment_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    AppJson(payload): AppJson<PaymentWebhookRequest>,
) -> AppResult<Json<ApiResponse<OrderWithItems>>> {
    let secret = headers
        .get(WEBHOOK_SECRET_HEADER)
        .and_then(|value| value.to_str().ok());
    let resp = order_service::payment_webhook(&state, secret, payload).await?;
    Ok(Json(resp))
}
