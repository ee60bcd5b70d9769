use axum::response::Html;
use chrono::Utc;
use uuid::Uuid;

use crate::{
    email::{OrderEmail, render_order_email},
    entity::enums::{OrderStatus, PaymentMethod, PaymentStatus},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{Order, OrderItem, ShippingAddress},
    services::order_service::load_order_with_items,
    shipping::tracking_url,
    state::AppState,
};

pub fn render(
    state: &AppState,
    order: &Order,
    items: &[OrderItem],
    status: OrderStatus,
) -> AppResult<OrderEmail> {
    let email = render_order_email(
        &state.config.store.name,
        &state.config.public_base_url,
        order,
        items,
        status,
    )?;
    Ok(email)
}

/// Email the customer about `status`. Failures are logged and never reach the caller.
pub async fn notify_status(
    state: &AppState,
    order: &Order,
    items: &[OrderItem],
    status: OrderStatus,
) {
    let Some(mailer) = &state.mailer else {
        tracing::debug!(order_id = %order.id, %status, "email disabled, skipping notification");
        return;
    };

    let email = match render(state, order, items, status) {
        Ok(email) => email,
        Err(err) => {
            tracing::warn!(error = %err, order_id = %order.id, "failed to render order email");
            return;
        }
    };

    if let Err(err) = mailer
        .send(&order.customer_email, &email.subject, &email.html)
        .await
    {
        tracing::warn!(error = %err, order_id = %order.id, %status, "failed to send order email");
    }
}

fn sample_order() -> (Order, Vec<OrderItem>) {
    let now = Utc::now();
    let id = Uuid::new_v4();
    let order = Order {
        id,
        user_id: None,
        customer_name: "Maria Silva".into(),
        customer_email: "maria@example.com".into(),
        customer_phone: "22999990000".into(),
        shipping_address: ShippingAddress {
            street: "Rua das Palmeiras".into(),
            number: "120".into(),
            complement: Some("Casa 2".into()),
            neighborhood: "Centro".into(),
            city: "Cabo Frio".into(),
            state: "RJ".into(),
            postal_code: "28907000".into(),
        },
        status: OrderStatus::Pending,
        payment_status: PaymentStatus::Pending,
        payment_method: PaymentMethod::Pix,
        card_brand: None,
        card_last4: None,
        shipping_service: "SEDEX".into(),
        shipping_service_id: Some("2".into()),
        subtotal_amount: 18_990,
        discount_amount: 1_899,
        shipping_amount: 2_590,
        total_amount: 19_681,
        coupon_code: Some("BEMVINDO10".into()),
        tracking_code: Some("AA123456789BR".into()),
        tracking_url: Some(tracking_url("AA123456789BR")),
        shipping_label_id: None,
        notes: None,
        paid_at: None,
        created_at: now,
        updated_at: now,
    };
    let items = vec![
        OrderItem {
            id: Uuid::new_v4(),
            order_id: id,
            product_id: None,
            product_name: "Manta de algodão bordada".into(),
            price: 12_990,
            quantity: 1,
            customization: Some("Helena".into()),
            color: Some("Rosa".into()),
            created_at: now,
        },
        OrderItem {
            id: Uuid::new_v4(),
            order_id: id,
            product_id: None,
            product_name: "Babador bordado".into(),
            price: 3_000,
            quantity: 2,
            customization: None,
            color: None,
            created_at: now,
        },
    ];
    (order, items)
}

/// Render a status email for the back-office preview, with a real order when given.
pub async fn preview(
    state: &AppState,
    user: &AuthUser,
    status: OrderStatus,
    order_id: Option<Uuid>,
) -> AppResult<Html<String>> {
    ensure_admin(user)?;
    let (order, items) = match order_id {
        Some(id) => {
            let found = load_order_with_items(&state.orm, id)
                .await?
                .ok_or(AppError::NotFound)?;
            (found.order, found.items)
        }
        None => sample_order(),
    };
    let email = render(state, &order, &items, status)?;
    Ok(Html(email.html))
}
