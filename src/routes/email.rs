use axum::{
    Router,
    extract::State,
    response::Html,
    routing::get,
};

use crate::{
    entity::enums::OrderStatus,
    error::AppResult,
    extract::{AppPath, AppQuery},
    middleware::auth::AuthUser,
    routes::params::EmailPreviewQuery,
    services::notification_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/preview/{status}", get(preview))
}

#[utoipa::path(
    get,
    path = "/api/email/preview/{status}",
    params(
        ("status" = OrderStatus, Path, description = "Order status the email announces"),
        ("order_id" = Option<uuid::Uuid>, Query, description = "Render with this order instead of sample data")
    ),
    responses(
        (status = 200, description = "Rendered email", content_type = "text/html", body = String),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Order not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Email"
)]
pub async fn preview(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(status): AppPath<OrderStatus>,
    AppQuery(query): AppQuery<EmailPreviewQuery>,
) -> AppResult<Html<String>> {
    notification_service::preview(&state, &user, status, query.order_id).await
}
