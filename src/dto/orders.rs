use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    entity::enums::{OrderStatus, PaymentStatus},
    models::{Order, OrderItem},
};

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderWithItems {
    pub order: Order,
    pub items: Vec<OrderItem>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderList {
    pub items: Vec<Order>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct GuestOrderQuery {
    pub email: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateOrderStatusRequest {
    pub status: OrderStatus,
    /// Send the status email to the customer, default true.
    pub notify: Option<bool>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateTrackingRequest {
    pub tracking_code: String,
    pub tracking_url: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PaymentWebhookRequest {
    pub order_id: Uuid,
    pub status: PaymentStatus,
    pub transaction_id: Option<String>,
}
