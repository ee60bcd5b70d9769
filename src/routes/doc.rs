use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    cart::{CartItemInput, CartLine},
    checkout::{
        AddressInfo, CardInput, CheckoutForm, CheckoutStep, ContactInfo, FieldError, PaymentInfo,
    },
    dto::{
        accounts, auth as auth_dto, cart as cart_dto, checkout as checkout_dto, coupons as coupon_dto,
        orders::{
            GuestOrderQuery, OrderList, OrderWithItems, PaymentWebhookRequest,
            UpdateOrderStatusRequest, UpdateTrackingRequest,
        },
        products, settings, shipping as shipping_dto,
    },
    entity::enums::{DiscountType, OrderStatus, PaymentMethod, PaymentStatus},
    models::{
        Category, Coupon, Dimensions, Order, OrderItem, Product, ProductImage, ShippingAddress,
        User, UserAddress, UserProfile,
    },
    response::{ApiResponse, ErrorBody, Meta},
    routes::{
        account, admin, auth, cart, checkout, coupons, email, health, orders, params,
        products as product_routes, shipping,
    },
    shipping::{ShippingOption, melhor_envio::ProviderTracking},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        health::readiness_check,
        auth::login,
        auth::register,
        product_routes::list_products,
        product_routes::get_product,
        product_routes::list_categories,
        cart::cart_summary,
        checkout::checkout,
        checkout::validate_step,
        orders::get_order,
        orders::payment_webhook,
        account::get_account,
        account::update_profile,
        account::list_addresses,
        account::create_address,
        account::update_address,
        account::delete_address,
        account::list_my_orders,
        account::get_my_order,
        coupons::validate_coupon,
        shipping::calculate,
        shipping::tracking,
        shipping::authorize,
        shipping::oauth_callback,
        shipping::provider_status,
        email::preview,
        admin::create_product,
        admin::update_product,
        admin::delete_product,
        admin::upload_image,
        admin::reorder_images,
        admin::delete_image,
        admin::create_category,
        admin::update_category,
        admin::delete_category,
        admin::list_coupons,
        admin::create_coupon,
        admin::get_coupon,
        admin::update_coupon,
        admin::delete_coupon,
        admin::list_all_orders,
        admin::get_order_admin,
        admin::update_order_status,
        admin::update_tracking,
        admin::create_label,
        admin::list_settings,
        admin::update_setting,
        admin::store_stats
    ),
    components(
        schemas(
            User,
            UserProfile,
            UserAddress,
            Category,
            Dimensions,
            Product,
            ProductImage,
            Coupon,
            ShippingAddress,
            Order,
            OrderItem,
            OrderStatus,
            PaymentStatus,
            PaymentMethod,
            DiscountType,
            ShippingOption,
            ProviderTracking,
            CartItemInput,
            CartLine,
            CheckoutStep,
            CheckoutForm,
            ContactInfo,
            AddressInfo,
            PaymentInfo,
            CardInput,
            FieldError,
            auth_dto::RegisterRequest,
            auth_dto::LoginRequest,
            auth_dto::LoginResponse,
            accounts::Account,
            accounts::UpdateProfileRequest,
            accounts::AddressRequest,
            accounts::AddressList,
            products::CreateProductRequest,
            products::UpdateProductRequest,
            products::ProductList,
            products::ProductDetail,
            products::CategoryRequest,
            products::CategoryList,
            products::ImageList,
            products::ReorderImagesRequest,
            products::ImageUploadForm,
            cart_dto::CartSummaryRequest,
            cart_dto::CartSummary,
            checkout_dto::CheckoutRequest,
            checkout_dto::ValidateStepRequest,
            checkout_dto::StepValidation,
            coupon_dto::CreateCouponRequest,
            coupon_dto::UpdateCouponRequest,
            coupon_dto::CouponList,
            coupon_dto::ValidateCouponRequest,
            coupon_dto::CouponValidation,
            OrderList,
            OrderWithItems,
            GuestOrderQuery,
            UpdateOrderStatusRequest,
            UpdateTrackingRequest,
            PaymentWebhookRequest,
            settings::Setting,
            settings::SettingList,
            settings::UpdateSettingRequest,
            settings::StatusCount,
            settings::StoreStats,
            shipping_dto::ShippingQuoteRequest,
            shipping_dto::QuoteSource,
            shipping_dto::ShippingQuote,
            shipping_dto::TrackingInfo,
            shipping_dto::AuthorizeUrl,
            shipping_dto::ProviderStatus,
            shipping_dto::LabelCreated,
            params::Pagination,
            params::SortOrder,
            params::ProductSortBy,
            params::ProductQuery,
            params::OrderListQuery,
            Meta,
            ErrorBody,
            health::HealthData,
            health::ReadinessData,
            ApiResponse<Product>,
            ApiResponse<products::ProductList>,
            ApiResponse<OrderWithItems>,
            ApiResponse<OrderList>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Registration and login"),
        (name = "Products", description = "Catalogue: products and categories"),
        (name = "Cart", description = "Pricing of client-side carts"),
        (name = "Checkout", description = "Checkout form validation and order placement"),
        (name = "Orders", description = "Guest order lookup and payment webhook"),
        (name = "Account", description = "Profile, addresses and own orders"),
        (name = "Coupons", description = "Coupon validation"),
        (name = "Shipping", description = "Shipping quotes, tracking and provider authorization"),
        (name = "Email", description = "Order email previews"),
        (name = "Admin", description = "Back-office endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_lists_public_and_admin_paths() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;
        for path in [
            "/health",
            "/api/checkout",
            "/api/orders/{id}",
            "/api/coupons/validate",
            "/api/shipping/calculate",
            "/api/email/preview/{status}",
            "/api/admin/orders/{id}/status",
        ] {
            assert!(paths.contains_key(path), "missing {path}");
        }
    }
}
