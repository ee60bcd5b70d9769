use embroidery_store_api::{
    config::AppConfig,
    db::{create_pool, run_migrations},
    dto::{
        checkout::CheckoutRequest,
        coupons::CreateCouponRequest,
        orders::{PaymentWebhookRequest, UpdateOrderStatusRequest},
    },
    entity::{
        coupons::Entity as Coupons,
        enums::{DiscountType, OrderStatus, PaymentStatus},
        products::ActiveModel as ProductActive,
        users::ActiveModel as UserActive,
    },
    error::AppError,
    middleware::auth::{AuthUser, ROLE_ADMIN},
    services::{admin_service, coupon_service, order_service},
    state::AppState,
};
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use serde_json::json;
use uuid::Uuid;

const WEBHOOK_SECRET: &str = "test-webhook-secret";

// Guest checkout with a coupon -> lookup -> payment webhook -> admin status changes.
#[tokio::test]
async fn guest_checkout_coupon_and_status_flow() -> anyhow::Result<()> {
    // Allow skipping when no DB is configured in the environment.
    let Some(state) = setup_state().await? else {
        return Ok(());
    };

    let admin = AuthUser {
        user_id: create_user(&state, ROLE_ADMIN).await?,
        role: ROLE_ADMIN.into(),
    };
    let product_id = create_product(&state, 10_000).await?;

    let code = format!("TESTE{}", &Uuid::new_v4().simple().to_string()[..6]).to_uppercase();
    let coupon = coupon_service::create_coupon(
        &state,
        &admin,
        CreateCouponRequest {
            code: code.to_lowercase(),
            discount_type: DiscountType::Percentage,
            discount_value: 10,
            min_order_value: None,
            max_uses: Some(1),
            valid_from: None,
            valid_until: None,
            free_shipping: false,
            shipping_discount_percent: None,
            is_active: None,
        },
    )
    .await?
    .data
    .expect("coupon");
    assert_eq!(coupon.code, code);

    // Local postal code: free local delivery, 10% off R$200.
    let email = format!("cliente-{}@example.com", Uuid::new_v4().simple());
    let created = order_service::checkout(
        &state,
        None,
        checkout_request(&email, "28900-100", "local", product_id, Some(&code))?,
    )
    .await?
    .data
    .expect("order");
    let order = &created.order;
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.payment_status, PaymentStatus::Pending);
    assert_eq!(order.subtotal_amount, 20_000);
    assert_eq!(order.discount_amount, 2_000);
    assert_eq!(order.shipping_amount, 0);
    assert_eq!(order.total_amount, 18_000);
    assert_eq!(order.coupon_code.as_deref(), Some(code.as_str()));
    assert_eq!(order.shipping_address.postal_code, "28900100");
    assert_eq!(created.items.len(), 1);
    assert_eq!(created.items[0].quantity, 2);

    let stored = Coupons::find_by_id(coupon.id)
        .one(&state.orm)
        .await?
        .expect("coupon row");
    assert_eq!(stored.uses_count, 1);

    // The coupon had a single use left.
    let again = order_service::checkout(
        &state,
        None,
        checkout_request(&email, "28900-100", "local", product_id, Some(&code))?,
    )
    .await;
    assert!(matches!(again, Err(AppError::BadRequest(_))));

    // Guest lookup needs the checkout email.
    let wrong = order_service::get_guest_order(&state, order.id, "other@example.com").await;
    assert!(matches!(wrong, Err(AppError::NotFound)));
    let found = order_service::get_guest_order(&state, order.id, &email.to_uppercase())
        .await?
        .data
        .expect("order");
    assert_eq!(found.order.id, order.id);

    // Webhook secret is checked before anything else.
    let rejected = order_service::payment_webhook(
        &state,
        Some("wrong"),
        PaymentWebhookRequest {
            order_id: order.id,
            status: PaymentStatus::Paid,
            transaction_id: None,
        },
    )
    .await;
    assert!(matches!(rejected, Err(AppError::Unauthorized)));

    let paid = order_service::payment_webhook(
        &state,
        Some(WEBHOOK_SECRET),
        PaymentWebhookRequest {
            order_id: order.id,
            status: PaymentStatus::Paid,
            transaction_id: Some("tx-1".into()),
        },
    )
    .await?
    .data
    .expect("order");
    assert_eq!(paid.order.status, OrderStatus::Paid);
    assert_eq!(paid.order.payment_status, PaymentStatus::Paid);
    assert!(paid.order.paid_at.is_some());

    // Redelivered and late events leave the paid order untouched.
    for (status, expected_message) in [
        (PaymentStatus::Paid, "Payment already recorded"),
        (PaymentStatus::Pending, "Payment event ignored"),
        (PaymentStatus::Failed, "Payment event ignored"),
    ] {
        let resp = order_service::payment_webhook(
            &state,
            Some(WEBHOOK_SECRET),
            PaymentWebhookRequest {
                order_id: order.id,
                status,
                transaction_id: Some("tx-1".into()),
            },
        )
        .await?;
        assert_eq!(resp.message, expected_message);
        let unchanged = resp.data.expect("order");
        assert_eq!(unchanged.order.status, OrderStatus::Paid);
        assert_eq!(unchanged.order.payment_status, PaymentStatus::Paid);
        assert_eq!(unchanged.order.paid_at, paid.order.paid_at);
    }

    // Paid -> Delivered skips shipping and is refused.
    let skipped = admin_service::update_order_status(
        &state,
        &admin,
        order.id,
        UpdateOrderStatusRequest {
            status: OrderStatus::Delivered,
            notify: Some(false),
        },
    )
    .await;
    assert!(matches!(skipped, Err(AppError::BadRequest(_))));

    let shipped = admin_service::update_order_status(
        &state,
        &admin,
        order.id,
        UpdateOrderStatusRequest {
            status: OrderStatus::Shipped,
            notify: Some(false),
        },
    )
    .await?
    .data
    .expect("order");
    assert_eq!(shipped.order.status, OrderStatus::Shipped);

    Ok(())
}

#[tokio::test]
async fn remote_checkout_uses_fallback_rates() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    if state.shipping.is_some() {
        return Ok(());
    }

    let product_id = create_product(&state, 5_000).await?;
    let email = format!("cliente-{}@example.com", Uuid::new_v4().simple());

    // 2 x 300 g rounds up to one kilogram: PAC costs 15 + 5.
    let created = order_service::checkout(
        &state,
        None,
        checkout_request(&email, "01310-100", "fallback-pac", product_id, None)?,
    )
    .await?
    .data
    .expect("order");
    assert_eq!(created.order.shipping_amount, 2_000);
    assert_eq!(created.order.total_amount, 12_000);
    assert_eq!(created.order.shipping_service_id.as_deref(), Some("fallback-pac"));

    // Local delivery is not offered outside the store's region.
    let unavailable = order_service::checkout(
        &state,
        None,
        checkout_request(&email, "01310-100", "local", product_id, None)?,
    )
    .await;
    assert!(matches!(unavailable, Err(AppError::BadRequest(_))));

    Ok(())
}

#[tokio::test]
async fn refund_before_payment_is_ignored() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };

    let product_id = create_product(&state, 5_000).await?;
    let email = format!("cliente-{}@example.com", Uuid::new_v4().simple());
    let created = order_service::checkout(
        &state,
        None,
        checkout_request(&email, "28900-100", "local", product_id, None)?,
    )
    .await?
    .data
    .expect("order");

    let resp = order_service::payment_webhook(
        &state,
        Some(WEBHOOK_SECRET),
        PaymentWebhookRequest {
            order_id: created.order.id,
            status: PaymentStatus::Refunded,
            transaction_id: None,
        },
    )
    .await?;
    assert_eq!(resp.message, "Payment event ignored");
    let order = resp.data.expect("order").order;
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.payment_status, PaymentStatus::Pending);
    assert!(order.paid_at.is_none());

    // A failed attempt followed by a successful one still settles the order.
    for status in [PaymentStatus::Failed, PaymentStatus::Paid] {
        order_service::payment_webhook(
            &state,
            Some(WEBHOOK_SECRET),
            PaymentWebhookRequest {
                order_id: created.order.id,
                status,
                transaction_id: None,
            },
        )
        .await?;
    }
    let settled = order_service::get_guest_order(&state, created.order.id, &email)
        .await?
        .data
        .expect("order")
        .order;
    assert_eq!(settled.status, OrderStatus::Paid);
    assert_eq!(settled.payment_status, PaymentStatus::Paid);

    Ok(())
}

async fn setup_state() -> anyhow::Result<Option<AppState>> {
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!(
                "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests."
            );
            return Ok(None);
        }
    };

    let config = AppConfig::from_lookup(|key| match key {
        "DATABASE_URL" => Some(database_url.clone()),
        "JWT_SECRET" => Some("test-secret".into()),
        "PAYMENT_WEBHOOK_SECRET" => Some(WEBHOOK_SECRET.into()),
        _ => None,
    })?;
    let pool = create_pool(&config.database_url).await?;
    run_migrations(&pool).await?;
    Ok(Some(AppState::new(pool, config)?))
}

async fn create_user(state: &AppState, role: &str) -> anyhow::Result<Uuid> {
    let id = Uuid::new_v4();
    UserActive {
        id: Set(id),
        email: Set(format!("{role}-{}@example.com", id.simple())),
        password_hash: Set("not-a-real-hash".into()),
        role: Set(role.into()),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;
    Ok(id)
}

async fn create_product(state: &AppState, price: i64) -> anyhow::Result<Uuid> {
    let id = Uuid::new_v4();
    ProductActive {
        id: Set(id),
        name: Set(format!("Body bordado {}", id.simple())),
        description: Set(Some("Body de algodão com nome bordado".into())),
        price: Set(price),
        category_id: Set(None),
        featured: Set(false),
        weight_grams: Set(300),
        height_cm: Set(4),
        width_cm: Set(20),
        length_cm: Set(25),
        customizable: Set(true),
        color_options: Set(json!(["Azul", "Rosa"])),
        details: Set(json!({})),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;
    Ok(id)
}

fn checkout_request(
    email: &str,
    postal_code: &str,
    shipping_option_id: &str,
    product_id: Uuid,
    coupon_code: Option<&str>,
) -> anyhow::Result<CheckoutRequest> {
    let request = serde_json::from_value(json!({
        "contact": {
            "name": "Maria Souza",
            "email": email,
            "phone": "(22) 99876-5432"
        },
        "address": {
            "street": "Rua das Flores",
            "number": "120",
            "neighborhood": "Centro",
            "city": "Cabo Frio",
            "state": "rj",
            "postal_code": postal_code
        },
        "shipping_option_id": shipping_option_id,
        "payment": { "method": "pix" },
        "items": [
            {
                "product_id": product_id,
                "quantity": 2,
                "customization": "Helena",
                "color": "Rosa"
            }
        ],
        "coupon_code": coupon_code
    }))?;
    Ok(request)
}
