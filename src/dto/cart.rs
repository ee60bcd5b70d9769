use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    cart::{CartItemInput, CartLine},
    shipping::ShippingOption,
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CartSummaryRequest {
    pub items: Vec<CartItemInput>,
    pub coupon_code: Option<String>,
    pub postal_code: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartSummary {
    pub lines: Vec<CartLine>,
    pub item_count: i32,
    pub subtotal: i64,
    pub discount: i64,
    pub coupon_code: Option<String>,
    /// Why the coupon was not applied, when one was sent.
    pub coupon_error: Option<String>,
    pub free_shipping: bool,
    pub shipping_options: Vec<ShippingOption>,
    /// Subtotal minus discount; shipping is added once an option is chosen.
    pub total: i64,
}
