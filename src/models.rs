use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entity::{
    categories, coupons,
    enums::{DiscountType, OrderStatus, PaymentMethod, PaymentStatus},
    order_items, orders, product_images, products, user_addresses, user_profiles, users,
};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserProfile {
    pub user_id: Uuid,
    pub full_name: String,
    pub phone: Option<String>,
    pub cpf: Option<String>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserAddress {
    pub id: Uuid,
    pub label: String,
    pub recipient: String,
    pub street: String,
    pub number: String,
    pub complement: Option<String>,
    pub neighborhood: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub created_at: DateTime<Utc>,
}

/// Package dimensions used for shipping quotes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct Dimensions {
    pub weight_grams: i32,
    pub height_cm: i32,
    pub width_cm: i32,
    pub length_cm: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    /// Unit price in centavos.
    pub price: i64,
    pub category_id: Option<Uuid>,
    pub featured: bool,
    pub dimensions: Dimensions,
    pub customizable: bool,
    pub color_options: Vec<String>,
    #[schema(value_type = Object)]
    pub details: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProductImage {
    pub id: Uuid,
    pub product_id: Uuid,
    pub url: String,
    pub alt_text: Option<String>,
    pub display_order: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Coupon {
    pub id: Uuid,
    pub code: String,
    pub discount_type: DiscountType,
    pub discount_value: i64,
    pub min_order_value: Option<i64>,
    pub max_uses: Option<i32>,
    pub uses_count: i32,
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_until: Option<DateTime<Utc>>,
    pub free_shipping: bool,
    pub shipping_discount_percent: Option<i32>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ShippingAddress {
    pub street: String,
    pub number: String,
    pub complement: Option<String>,
    pub neighborhood: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Order {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub shipping_address: ShippingAddress,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub payment_method: PaymentMethod,
    pub card_brand: Option<String>,
    pub card_last4: Option<String>,
    pub shipping_service: String,
    pub shipping_service_id: Option<String>,
    pub subtotal_amount: i64,
    pub discount_amount: i64,
    pub shipping_amount: i64,
    pub total_amount: i64,
    pub coupon_code: Option<String>,
    pub tracking_code: Option<String>,
    pub tracking_url: Option<String>,
    pub shipping_label_id: Option<String>,
    pub notes: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Option<Uuid>,
    pub product_name: String,
    pub price: i64,
    pub quantity: i32,
    pub customization: Option<String>,
    pub color: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<users::Model> for User {
    fn from(model: users::Model) -> Self {
        Self {
            id: model.id,
            email: model.email,
            role: model.role,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

impl From<user_profiles::Model> for UserProfile {
    fn from(model: user_profiles::Model) -> Self {
        Self {
            user_id: model.user_id,
            full_name: model.full_name,
            phone: model.phone,
            cpf: model.cpf,
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

impl From<user_addresses::Model> for UserAddress {
    fn from(model: user_addresses::Model) -> Self {
        Self {
            id: model.id,
            label: model.label,
            recipient: model.recipient,
            street: model.street,
            number: model.number,
            complement: model.complement,
            neighborhood: model.neighborhood,
            city: model.city,
            state: model.state,
            postal_code: model.postal_code,
            is_default: model.is_default,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

impl From<categories::Model> for Category {
    fn from(model: categories::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            slug: model.slug,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

impl From<products::Model> for Product {
    fn from(model: products::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            description: model.description,
            price: model.price,
            category_id: model.category_id,
            featured: model.featured,
            dimensions: Dimensions {
                weight_grams: model.weight_grams,
                height_cm: model.height_cm,
                width_cm: model.width_cm,
                length_cm: model.length_cm,
            },
            customizable: model.customizable,
            color_options: serde_json::from_value(model.color_options).unwrap_or_default(),
            details: model.details,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

impl From<product_images::Model> for ProductImage {
    fn from(model: product_images::Model) -> Self {
        Self {
            id: model.id,
            product_id: model.product_id,
            url: model.url,
            alt_text: model.alt_text,
            display_order: model.display_order,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

impl From<coupons::Model> for Coupon {
    fn from(model: coupons::Model) -> Self {
        Self {
            id: model.id,
            code: model.code,
            discount_type: model.discount_type,
            discount_value: model.discount_value,
            min_order_value: model.min_order_value,
            max_uses: model.max_uses,
            uses_count: model.uses_count,
            valid_from: model.valid_from.map(|dt| dt.with_timezone(&Utc)),
            valid_until: model.valid_until.map(|dt| dt.with_timezone(&Utc)),
            free_shipping: model.free_shipping,
            shipping_discount_percent: model.shipping_discount_percent,
            is_active: model.is_active,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

impl From<orders::Model> for Order {
    fn from(model: orders::Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            customer_name: model.customer_name,
            customer_email: model.customer_email,
            customer_phone: model.customer_phone,
            shipping_address: ShippingAddress {
                street: model.shipping_street,
                number: model.shipping_number,
                complement: model.shipping_complement,
                neighborhood: model.shipping_neighborhood,
                city: model.shipping_city,
                state: model.shipping_state,
                postal_code: model.shipping_postal_code,
            },
            status: model.status,
            payment_status: model.payment_status,
            payment_method: model.payment_method,
            card_brand: model.card_brand,
            card_last4: model.card_last4,
            shipping_service: model.shipping_service,
            shipping_service_id: model.shipping_service_id,
            subtotal_amount: model.subtotal_amount,
            discount_amount: model.discount_amount,
            shipping_amount: model.shipping_amount,
            total_amount: model.total_amount,
            coupon_code: model.coupon_code,
            tracking_code: model.tracking_code,
            tracking_url: model.tracking_url,
            shipping_label_id: model.shipping_label_id,
            notes: model.notes,
            paid_at: model.paid_at.map(|dt| dt.with_timezone(&Utc)),
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

impl From<order_items::Model> for OrderItem {
    fn from(model: order_items::Model) -> Self {
        Self {
            id: model.id,
            order_id: model.order_id,
            product_id: model.product_id,
            product_name: model.product_name,
            price: model.price,
            quantity: model.quantity,
            customization: model.customization,
            color: model.color,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}
