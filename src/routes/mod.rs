use axum::Router;

use crate::state::AppState;

pub mod account;
pub mod admin;
pub mod auth;
pub mod cart;
pub mod checkout;
pub mod coupons;
pub mod doc;
pub mod email;
pub mod health;
pub mod orders;
pub mod params;
pub mod products;
pub mod shipping;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/products", products::router())
        .nest("/categories", products::category_router())
        .nest("/cart", cart::router())
        .nest("/checkout", checkout::router())
        .nest("/orders", orders::router())
        .nest("/webhooks", orders::webhook_router())
        .nest("/me", account::router())
        .nest("/coupons", coupons::router())
        .nest("/shipping", shipping::router())
        .nest("/email", email::router())
        .nest("/admin", admin::router())
}
