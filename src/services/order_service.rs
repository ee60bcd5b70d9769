use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
    ActiveValue::NotSet,
    sea_query::{Expr, LockType},
};
use secrecy::ExposeSecret;
use subtle::ConstantTimeEq;
use uuid::Uuid;

use crate::{
    audit,
    checkout::card_summary,
    dto::{
        checkout::{CheckoutRequest, StepValidation, ValidateStepRequest},
        orders::{OrderList, OrderWithItems, PaymentWebhookRequest},
    },
    entity::{
        coupons::{Column as CouponCol, Entity as Coupons},
        enums::{OrderStatus, PaymentStatus},
        order_items::{ActiveModel as OrderItemActive, Column as OrderItemCol, Entity as OrderItems},
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Coupon, Order, OrderItem},
    pricing,
    response::{ApiResponse, Meta},
    routes::params::{OrderListQuery, SortOrder},
    services::{cart_service, coupon_service, notification_service, shipping_service},
    shipping::normalize_postal_code,
    state::AppState,
};

pub async fn load_order_with_items<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> AppResult<Option<OrderWithItems>> {
    let Some(order) = Orders::find_by_id(id).one(db).await? else {
        return Ok(None);
    };
    let items = OrderItems::find()
        .filter(OrderItemCol::OrderId.eq(order.id))
        .order_by_asc(OrderItemCol::CreatedAt)
        .all(db)
        .await?
        .into_iter()
        .map(OrderItem::from)
        .collect();
    Ok(Some(OrderWithItems {
        order: Order::from(order),
        items,
    }))
}

pub fn validate_step(payload: ValidateStepRequest) -> ApiResponse<StepValidation> {
    let today = Utc::now().date_naive();
    let errors = payload.form.validate_step(payload.step, today);
    let valid = errors.is_empty();
    ApiResponse::success(
        if valid { "Step complete" } else { "Step has errors" },
        StepValidation {
            step: payload.step,
            valid,
            errors,
            resume_at: payload.form.first_incomplete(today),
            next_step: if valid { payload.step.next() } else { None },
        },
        None,
    )
}

pub async fn checkout(
    state: &AppState,
    user: Option<&AuthUser>,
    payload: CheckoutRequest,
) -> AppResult<ApiResponse<OrderWithItems>> {
    let CheckoutRequest {
        form,
        items,
        coupon_code,
    } = payload;
    let now = Utc::now();
    form.validate(now.date_naive())?;

    // Price against the catalogue and quote shipping before any row is locked.
    let cart = cart_service::price_items(&state.orm, &items).await?;
    let subtotal = cart.subtotal();
    let destination = normalize_postal_code(&form.address.postal_code)?;
    let quote = shipping_service::quote(state, &destination, &cart.package(), subtotal).await?;
    let option_id = form.shipping_option_id.as_deref().unwrap_or_default();
    let shipping = shipping_service::select_option(&quote.options, option_id)?;

    let payment = form
        .payment
        .as_ref()
        .ok_or_else(|| AppError::BadRequest("payment.method: Choose a payment method".into()))?;
    let card = card_summary(payment);

    let txn = state.orm.begin().await?;

    let code = coupon_code
        .as_deref()
        .map(coupon_service::normalize_code)
        .filter(|c| !c.is_empty());
    let coupon: Option<Coupon> = match &code {
        Some(code) => {
            let locked = Coupons::find()
                .filter(CouponCol::Code.eq(code.as_str()))
                .lock(LockType::Update)
                .one(&txn)
                .await?
                .map(Coupon::from)
                .ok_or_else(|| AppError::BadRequest(format!("Coupon {code} not found")))?;
            pricing::validate(&locked, subtotal, now)?;
            Some(locked)
        }
        None => None,
    };

    let discount = coupon
        .as_ref()
        .map_or(0, |c| pricing::discount_for(c, subtotal));
    let shipping_discount = coupon
        .as_ref()
        .map_or(0, |c| pricing::shipping_discount_for(c, shipping.price));
    let shipping_amount = shipping.price - shipping_discount;
    let total = subtotal - discount + shipping_amount;

    let contact = &form.contact;
    let address = &form.address;
    let order_id = Uuid::new_v4();
    let order = OrderActive {
        id: Set(order_id),
        user_id: Set(user.map(|u| u.user_id)),
        customer_name: Set(contact.name.trim().to_string()),
        customer_email: Set(contact.email.trim().to_lowercase()),
        customer_phone: Set(contact.phone.chars().filter(char::is_ascii_digit).collect()),
        shipping_street: Set(address.street.trim().to_string()),
        shipping_number: Set(address.number.trim().to_string()),
        shipping_complement: Set(address
            .complement
            .as_ref()
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())),
        shipping_neighborhood: Set(address.neighborhood.trim().to_string()),
        shipping_city: Set(address.city.trim().to_string()),
        shipping_state: Set(address.state.trim().to_ascii_uppercase()),
        shipping_postal_code: Set(destination),
        status: Set(OrderStatus::Pending),
        payment_status: Set(PaymentStatus::Pending),
        payment_method: Set(payment.method),
        card_brand: Set(card.as_ref().map(|(brand, _)| brand.as_str().to_string())),
        card_last4: Set(card.map(|(_, last4)| last4)),
        shipping_service: Set(format!("{} - {}", shipping.company, shipping.name)),
        shipping_service_id: Set(Some(shipping.id.clone())),
        subtotal_amount: Set(subtotal),
        discount_amount: Set(discount),
        shipping_amount: Set(shipping_amount),
        total_amount: Set(total),
        coupon_code: Set(coupon.as_ref().map(|c| c.code.clone())),
        tracking_code: Set(None),
        tracking_url: Set(None),
        shipping_label_id: Set(None),
        notes: Set(form.notes.clone().filter(|n| !n.trim().is_empty())),
        paid_at: Set(None),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(&txn)
    .await?;

    let mut order_items: Vec<OrderItem> = Vec::with_capacity(cart.lines().len());
    for line in cart.lines() {
        let item = OrderItemActive {
            id: Set(Uuid::new_v4()),
            order_id: Set(order.id),
            product_id: Set(Some(line.product_id)),
            product_name: Set(line.product_name.clone()),
            price: Set(line.unit_price),
            quantity: Set(line.quantity),
            customization: Set(line.customization.clone()),
            color: Set(line.color.clone()),
            created_at: NotSet,
        }
        .insert(&txn)
        .await?;
        order_items.push(OrderItem::from(item));
    }

    if let Some(coupon) = &coupon {
        Coupons::update_many()
            .col_expr(CouponCol::UsesCount, Expr::col(CouponCol::UsesCount).add(1))
            .filter(CouponCol::Id.eq(coupon.id))
            .exec(&txn)
            .await?;
    }

    txn.commit().await?;

    let order = Order::from(order);
    tracing::info!(order_id = %order.id, total = order.total_amount, "order created");

    audit::record(
        &state.pool,
        user.map(|u| u.user_id),
        "checkout",
        "orders",
        serde_json::json!({
            "order_id": order.id,
            "total": order.total_amount,
            "coupon": order.coupon_code,
        }),
    )
    .await;

    notification_service::notify_status(state, &order, &order_items, OrderStatus::Pending).await;

    Ok(ApiResponse::success(
        "Order created",
        OrderWithItems {
            order,
            items: order_items,
        },
        Some(Meta::empty()),
    ))
}

/// Order lookup for guests; the email must match the one used at checkout.
pub async fn get_guest_order(
    state: &AppState,
    id: Uuid,
    email: &str,
) -> AppResult<ApiResponse<OrderWithItems>> {
    let email = email.trim();
    if email.is_empty() {
        return Err(AppError::BadRequest("email is required".into()));
    }
    let order = load_order_with_items(&state.orm, id)
        .await?
        .filter(|o| o.order.customer_email.eq_ignore_ascii_case(email))
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success("Order", order, None))
}

pub async fn list_my_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    let (page, limit, offset) = query.pagination().normalize();
    let mut condition = Condition::all().add(OrderCol::UserId.eq(user.user_id));
    if let Some(status) = query.status {
        condition = condition.add(OrderCol::Status.eq(status));
    }

    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);

    let mut finder = Orders::find().filter(condition);
    finder = match sort_order {
        SortOrder::Asc => finder.order_by_asc(OrderCol::CreatedAt),
        SortOrder::Desc => finder.order_by_desc(OrderCol::CreatedAt),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let orders = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Order::from)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Ok",
        OrderList { items: orders },
        Some(meta),
    ))
}

pub async fn get_my_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<OrderWithItems>> {
    let order = load_order_with_items(&state.orm, id)
        .await?
        .filter(|o| o.order.user_id == Some(user.user_id))
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success("OK", order, Some(Meta::empty())))
}

/// Order status the payment event moves the order to, if any.
pub fn status_for_payment(current: OrderStatus, payment: PaymentStatus) -> Option<OrderStatus> {
    let target = match payment {
        PaymentStatus::Paid => OrderStatus::Paid,
        PaymentStatus::Refunded => OrderStatus::Refunded,
        PaymentStatus::Failed | PaymentStatus::Pending => return None,
    };
    current.can_transition_to(target).then_some(target)
}

/// What a payment webhook event does to an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentEvent {
    /// Record the new payment status and move the order when allowed.
    Apply { order_status: Option<OrderStatus> },
    /// Same payment status delivered again.
    Duplicate,
    /// Event arrived late or out of order; nothing changes.
    Ignored,
}

pub fn classify_payment_event(
    order_status: OrderStatus,
    current: PaymentStatus,
    incoming: PaymentStatus,
) -> PaymentEvent {
    if current == incoming {
        PaymentEvent::Duplicate
    } else if current.can_transition_to(incoming) {
        PaymentEvent::Apply {
            order_status: status_for_payment(order_status, incoming),
        }
    } else {
        PaymentEvent::Ignored
    }
}

fn secrets_match(provided: &str, expected: &str) -> bool {
    provided.as_bytes().ct_eq(expected.as_bytes()).into()
}

fn check_webhook_secret(state: &AppState, provided: Option<&str>) -> AppResult<()> {
    let Some(expected) = &state.config.payment_webhook_secret else {
        tracing::warn!("payment webhook called but PAYMENT_WEBHOOK_SECRET is not set");
        return Err(AppError::Unauthorized);
    };
    match provided {
        Some(secret) if secrets_match(secret, expected.expose_secret()) => Ok(()),
        _ => Err(AppError::Unauthorized),
    }
}

pub async fn payment_webhook(
    state: &AppState,
    secret: Option<&str>,
    payload: PaymentWebhookRequest,
) -> AppResult<ApiResponse<OrderWithItems>> {
    check_webhook_secret(state, secret)?;

    let txn = state.orm.begin().await?;
    let order = Orders::find()
        .filter(OrderCol::Id.eq(payload.order_id))
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;

    let previous_payment = order.payment_status;
    let next_status = match classify_payment_event(order.status, previous_payment, payload.status)
    {
        PaymentEvent::Apply { order_status } => order_status,
        outcome => {
            txn.rollback().await?;
            tracing::info!(
                order_id = %payload.order_id,
                current = ?previous_payment,
                incoming = ?payload.status,
                ?outcome,
                "payment event left order unchanged"
            );
            let order = load_order_with_items(&state.orm, payload.order_id)
                .await?
                .ok_or(AppError::NotFound)?;
            let message = if outcome == PaymentEvent::Duplicate {
                "Payment already recorded"
            } else {
                "Payment event ignored"
            };
            return Ok(ApiResponse::success(message, order, Some(Meta::empty())));
        }
    };
    let now = Utc::now();

    let mut active: OrderActive = order.into();
    active.payment_status = Set(payload.status);
    if payload.status == PaymentStatus::Paid {
        active.paid_at = Set(Some(now.into()));
    }
    if let Some(status) = next_status {
        active.status = Set(status);
    }
    active.updated_at = Set(now.into());
    active.update(&txn).await?;
    txn.commit().await?;

    let order = load_order_with_items(&state.orm, payload.order_id)
        .await?
        .ok_or(AppError::NotFound)?;

    audit::record(
        &state.pool,
        None,
        "payment_webhook",
        "orders",
        serde_json::json!({
            "order_id": payload.order_id,
            "previous_payment_status": previous_payment,
            "payment_status": payload.status,
            "transaction_id": payload.transaction_id,
        }),
    )
    .await;

    if let Some(status) = next_status {
        notification_service::notify_status(state, &order.order, &order.items, status).await;
    }

    Ok(ApiResponse::success("Payment recorded", order, Some(Meta::empty())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paid_event_moves_pending_orders() {
        assert_eq!(
            status_for_payment(OrderStatus::Pending, PaymentStatus::Paid),
            Some(OrderStatus::Paid)
        );
        assert_eq!(
            status_for_payment(OrderStatus::Shipped, PaymentStatus::Paid),
            None
        );
    }

    #[test]
    fn failed_payment_keeps_status() {
        assert_eq!(
            status_for_payment(OrderStatus::Pending, PaymentStatus::Failed),
            None
        );
    }

    #[test]
    fn refund_after_cancel_is_ignored() {
        assert_eq!(
            status_for_payment(OrderStatus::Cancelled, PaymentStatus::Refunded),
            None
        );
        assert_eq!(
            status_for_payment(OrderStatus::Delivered, PaymentStatus::Refunded),
            Some(OrderStatus::Refunded)
        );
    }

    #[test]
    fn late_events_do_not_roll_back_a_paid_order() {
        assert_eq!(
            classify_payment_event(OrderStatus::Paid, PaymentStatus::Paid, PaymentStatus::Pending),
            PaymentEvent::Ignored
        );
        assert_eq!(
            classify_payment_event(OrderStatus::Paid, PaymentStatus::Paid, PaymentStatus::Failed),
            PaymentEvent::Ignored
        );
    }

    #[test]
    fn repeated_event_is_a_duplicate() {
        assert_eq!(
            classify_payment_event(OrderStatus::Paid, PaymentStatus::Paid, PaymentStatus::Paid),
            PaymentEvent::Duplicate
        );
    }

    #[test]
    fn refund_before_payment_is_ignored() {
        assert_eq!(
            classify_payment_event(
                OrderStatus::Pending,
                PaymentStatus::Pending,
                PaymentStatus::Refunded
            ),
            PaymentEvent::Ignored
        );
    }

    #[test]
    fn payment_after_failure_moves_order() {
        assert_eq!(
            classify_payment_event(OrderStatus::Pending, PaymentStatus::Failed, PaymentStatus::Paid),
            PaymentEvent::Apply {
                order_status: Some(OrderStatus::Paid)
            }
        );
        assert_eq!(
            classify_payment_event(OrderStatus::Pending, PaymentStatus::Pending, PaymentStatus::Failed),
            PaymentEvent::Apply { order_status: None }
        );
    }

    #[test]
    fn refund_of_paid_order() {
        assert_eq!(
            classify_payment_event(OrderStatus::Shipped, PaymentStatus::Paid, PaymentStatus::Refunded),
            PaymentEvent::Apply {
                order_status: Some(OrderStatus::Refunded)
            }
        );
    }

    #[test]
    fn webhook_secret_comparison() {
        assert!(secrets_match("s3cret", "s3cret"));
        assert!(!secrets_match("s3cret", "s3cre"));
        assert!(!secrets_match("", "s3cret"));
        assert!(!secrets_match("S3CRET", "s3cret"));
    }
}
