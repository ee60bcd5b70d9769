use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{entity::enums::DiscountType, models::Coupon};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCouponRequest {
    pub code: String,
    pub discount_type: DiscountType,
    pub discount_value: i64,
    pub min_order_value: Option<i64>,
    pub max_uses: Option<i32>,
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_until: Option<DateTime<Utc>>,
    #[serde(default)]
    pub free_shipping: bool,
    pub shipping_discount_percent: Option<i32>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateCouponRequest {
    pub discount_type: Option<DiscountType>,
    pub discount_value: Option<i64>,
    pub min_order_value: Option<i64>,
    pub max_uses: Option<i32>,
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_until: Option<DateTime<Utc>>,
    pub free_shipping: Option<bool>,
    pub shipping_discount_percent: Option<i32>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CouponList {
    pub items: Vec<Coupon>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ValidateCouponRequest {
    pub code: String,
    /// Order subtotal in centavos.
    pub order_total: i64,
    pub shipping_amount: Option<i64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CouponValidation {
    pub code: String,
    pub discount_type: DiscountType,
    pub discount_value: i64,
    pub discount_amount: i64,
    pub shipping_discount: i64,
    pub free_shipping: bool,
    pub total_after_discount: i64,
}
