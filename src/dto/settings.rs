use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entity::enums::OrderStatus;

#[derive(Debug, Serialize, ToSchema)]
pub struct Setting {
    pub key: String,
    #[schema(value_type = Object)]
    pub value: serde_json::Value,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SettingList {
    pub items: Vec<Setting>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateSettingRequest {
    #[schema(value_type = Object)]
    pub value: serde_json::Value,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StatusCount {
    pub status: OrderStatus,
    pub count: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StoreStats {
    pub total_orders: i64,
    pub orders_by_status: Vec<StatusCount>,
    /// Sum of paid orders (paid, processing, shipped, delivered) in centavos.
    pub paid_revenue: i64,
    pub products: i64,
    pub active_coupons: i64,
}
