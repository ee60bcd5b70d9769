use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, put},
};
use uuid::Uuid;

use crate::{
    dto::{
        accounts::{Account, AddressList, AddressRequest, UpdateProfileRequest},
        orders::{OrderList, OrderWithItems},
    },
    error::AppResult,
    extract::{AppJson, AppPath, AppQuery},
    middleware::auth::AuthUser,
    models::{UserAddress, UserProfile},
    response::ApiResponse,
    routes::params::OrderListQuery,
    services::{account_service, order_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_account))
        .route("/profile", get(get_account).put(update_profile))
        .route("/addresses", get(list_addresses).post(create_address))
        .route("/addresses/{id}", put(update_address).delete(delete_address))
        .route("/orders", get(list_my_orders))
        .route("/orders/{id}", get(get_my_order))
}

#[utoipa::path(
    get,
    path = "/api/me/profile",
    responses(
        (status = 200, description = "Current user with profile", body = ApiResponse<Account>),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer_auth" = [])),
    tag = "Account"
)]
pub async fn get_account(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<Account>>> {
    let resp = account_service::get_account(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/me/profile",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Updated profile", body = ApiResponse<UserProfile>),
        (status = 400, description = "Invalid CPF or phone"),
    ),
    security(("bearer_auth" = [])),
    tag = "Account"
)]
pub async fn update_profile(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(payload): AppJson<UpdateProfileRequest>,
) -> AppResult<Json<ApiResponse<UserProfile>>> {
    let resp = account_service::update_profile(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/me/addresses",
    responses(
        (status = 200, description = "Saved addresses, default first", body = ApiResponse<AddressList>),
    ),
    security(("bearer_auth" = [])),
    tag = "Account"
)]
pub async fn list_addresses(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<AddressList>>> {
    let resp = account_service::list_addresses(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/me/addresses",
    request_body = AddressRequest,
    responses(
        (status = 201, description = "Address saved", body = ApiResponse<UserAddress>),
        (status = 400, description = "Invalid address"),
    ),
    security(("bearer_auth" = [])),
    tag = "Account"
)]
pub async fn create_address(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(payload): AppJson<AddressRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<UserAddress>>)> {
    let resp = account_service::create_address(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    put,
    path = "/api/me/addresses/{id}",
    params(("id" = Uuid, Path, description = "Address ID")),
    request_body = AddressRequest,
    responses(
        (status = 200, description = "Address updated", body = ApiResponse<UserAddress>),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Account"
)]
pub async fn update_address(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(id): AppPath<Uuid>,
    AppJson(payload): AppJson<AddressRequest>,
) -> AppResult<Json<ApiResponse<UserAddress>>> {
    let resp = account_service::update_address(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/me/addresses/{id}",
    params(("id" = Uuid, Path, description = "Address ID")),
    responses(
        (status = 200, description = "Address deleted"),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Account"
)]
pub async fn delete_address(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = account_service::delete_address(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/me/orders",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("status" = Option<String>, Query, description = "Filter by status"),
        ("sort_order" = Option<String>, Query, description = "Sort order: asc, desc")
    ),
    responses(
        (status = 200, description = "Orders of the current user", body = ApiResponse<OrderList>),
    ),
    security(("bearer_auth" = [])),
    tag = "Account"
)]
pub async fn list_my_orders(
    State(state): State<AppState>,
    user: AuthUser,
    AppQuery(query): AppQuery<OrderListQuery>,
) -> AppResult<Json<ApiResponse<OrderList>>> {
    let resp = order_service::list_my_orders(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/me/orders/{id}",
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order with items", body = ApiResponse<OrderWithItems>),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Account"
)]
pub async fn get_my_order(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> AppResult<Json<ApiResponse<OrderWithItems>>> {
    let resp = order_service::get_my_order(&state, &user, id).await?;
    Ok(Json(resp))
}
