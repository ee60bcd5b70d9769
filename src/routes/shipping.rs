use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    dto::shipping::{
        AuthorizeUrl, OAuthCallbackQuery, ProviderStatus, ShippingQuote, ShippingQuoteRequest,
        TrackingInfo, TrackingQuery,
    },
    error::AppResult,
    extract::{AppJson, AppPath, AppQuery},
    middleware::auth::AuthUser,
    response::ApiResponse,
    services::shipping_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/calculate", post(calculate))
        .route("/tracking/{order_id}", get(tracking))
        .route("/oauth/authorize", get(authorize))
        .route("/oauth/callback", get(oauth_callback))
        .route("/status", get(provider_status))
}

#[utoipa::path(
    post,
    path = "/api/shipping/calculate",
    request_body = ShippingQuoteRequest,
    responses(
        (status = 200, description = "Shipping options for the cart", body = ApiResponse<ShippingQuote>),
        (status = 400, description = "Invalid postal code or cart"),
        (status = 500, description = "Shipping provider failure"),
    ),
    tag = "Shipping"
)]
pub async fn calculate(
    State(state): State<AppState>,
    AppJson(payload): AppJson<ShippingQuoteRequest>,
) -> AppResult<Json<ApiResponse<ShippingQuote>>> {
    let resp = shipping_service::calculate(&state, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/shipping/tracking/{order_id}",
    params(
        ("order_id" = Uuid, Path, description = "Order ID"),
        ("email" = Option<String>, Query, description = "Email used at checkout, for guests")
    ),
    responses(
        (status = 200, description = "Tracking details", body = ApiResponse<TrackingInfo>),
        (status = 404, description = "Not Found"),
    ),
    security((), ("bearer_auth" = [])),
    tag = "Shipping"
)]
pub async fn tracking(
    State(state): State<AppState>,
    user: Option<AuthUser>,
    AppPath(order_id): AppPath<Uuid>,
    AppQuery(query): AppQuery<TrackingQuery>,
) -> AppResult<Json<ApiResponse<TrackingInfo>>> {
    let resp =
        shipping_service::tracking(&state, user.as_ref(), order_id, query.email.as_deref()).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/shipping/oauth/authorize",
    responses(
        (status = 200, description = "Provider authorization URL", body = ApiResponse<AuthorizeUrl>),
        (status = 400, description = "Provider not configured"),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Shipping"
)]
pub async fn authorize(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<AuthorizeUrl>>> {
    let resp = shipping_service::authorize_url(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/shipping/oauth/callback",
    params(
        ("code" = Option<String>, Query, description = "Authorization code"),
        ("state" = Option<String>, Query, description = "State issued with the authorize URL"),
        ("error" = Option<String>, Query, description = "Error reported by the provider")
    ),
    responses(
        (status = 200, description = "Provider authorized", body = ApiResponse<ProviderStatus>),
        (status = 400, description = "Missing code or state mismatch"),
    ),
    tag = "Shipping"
)]
pub async fn oauth_callback(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<OAuthCallbackQuery>,
) -> AppResult<Json<ApiResponse<ProviderStatus>>> {
    let resp =
        shipping_service::oauth_callback(&state, query.code, query.state, query.error).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/shipping/status",
    responses(
        (status = 200, description = "Whether the provider is configured and authorized", body = ApiResponse<ProviderStatus>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Shipping"
)]
pub async fn provider_status(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<ProviderStatus>>> {
    let resp = shipping_service::provider_status(&state, &user).await?;
    Ok(Json(resp))
}
