use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};
use uuid::Uuid;

use crate::{
    cart::{Cart, CartItemInput, CartLine, normalize_customization},
    dto::cart::{CartSummary, CartSummaryRequest},
    entity::products::{Column as ProdCol, Entity as Products},
    error::{AppError, AppResult},
    models::{Coupon, Product},
    pricing,
    response::ApiResponse,
    services::{coupon_service, shipping_service},
    state::AppState,
};

/// Build the cart line for `input`, checking it against the catalogue entry.
pub fn line_for(product: &Product, input: &CartItemInput) -> AppResult<CartLine> {
    let customization = normalize_customization(input.customization.clone());
    if customization.is_some() && !product.customizable {
        return Err(AppError::BadRequest(format!(
            "{} cannot be customized",
            product.name
        )));
    }
    let color = normalize_customization(input.color.clone());
    if let Some(color) = &color {
        if !product.color_options.is_empty() && !product.color_options.contains(color) {
            return Err(AppError::BadRequest(format!(
                "Color {color} is not available for {}",
                product.name
            )));
        }
    }

    Ok(CartLine {
        product_id: product.id,
        product_name: product.name.clone(),
        unit_price: product.price,
        quantity: input.quantity,
        customization,
        color,
        dimensions: product.dimensions,
    })
}

/// Rebuild a client cart with current catalogue names and prices.
pub async fn price_items<C: ConnectionTrait>(db: &C, items: &[CartItemInput]) -> AppResult<Cart> {
    if items.is_empty() {
        return Err(AppError::BadRequest("Cart is empty".into()));
    }

    let ids: Vec<Uuid> = items.iter().map(|i| i.product_id).collect();
    let products: Vec<Product> = Products::find()
        .filter(ProdCol::Id.is_in(ids))
        .all(db)
        .await?
        .into_iter()
        .map(Product::from)
        .collect();

    let mut cart = Cart::new();
    for input in items {
        let product = products
            .iter()
            .find(|p| p.id == input.product_id)
            .ok_or_else(|| {
                AppError::BadRequest(format!("Product {} is not available", input.product_id))
            })?;
        cart.add(line_for(product, input)?)?;
    }
    Ok(cart)
}

pub async fn summary(
    state: &AppState,
    payload: CartSummaryRequest,
) -> AppResult<ApiResponse<CartSummary>> {
    let cart = price_items(&state.orm, &payload.items).await?;
    let subtotal = cart.subtotal();

    let code = payload
        .coupon_code
        .as_deref()
        .map(coupon_service::normalize_code)
        .filter(|c| !c.is_empty());

    let mut coupon: Option<Coupon> = None;
    let mut coupon_error = None;
    if let Some(code) = &code {
        match coupon_service::find_by_code(&state.orm, code).await? {
            Some(found) => match pricing::validate(&found, subtotal, chrono::Utc::now()) {
                Ok(()) => coupon = Some(found),
                Err(rejection) => coupon_error = Some(rejection.to_string()),
            },
            None => coupon_error = Some("Coupon not found".to_string()),
        }
    }

    let discount = coupon
        .as_ref()
        .map_or(0, |c| pricing::discount_for(c, subtotal));

    let mut shipping_options = Vec::new();
    if let Some(postal_code) = payload.postal_code.as_deref().filter(|p| !p.trim().is_empty()) {
        let quote = shipping_service::quote(state, postal_code, &cart.package(), subtotal).await?;
        shipping_options = quote.options;
        if let Some(coupon) = &coupon {
            for option in &mut shipping_options {
                option.price -= pricing::shipping_discount_for(coupon, option.price);
            }
        }
    }

    Ok(ApiResponse::success(
        "Cart summary",
        CartSummary {
            item_count: cart.item_count(),
            subtotal,
            discount,
            coupon_code: coupon.as_ref().map(|c| c.code.clone()),
            coupon_error,
            free_shipping: coupon.as_ref().is_some_and(|c| c.free_shipping),
            shipping_options,
            total: subtotal - discount,
            lines: cart.lines().to_vec(),
        },
        None,
    ))
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::models::Dimensions;

    fn product(customizable: bool, colors: &[&str]) -> Product {
        Product {
            id: Uuid::new_v4(),
            name: "Toalha com capuz".into(),
            description: None,
            price: 8_990,
            category_id: None,
            featured: false,
            dimensions: Dimensions {
                weight_grams: 400,
                height_cm: 5,
                width_cm: 30,
                length_cm: 30,
            },
            customizable,
            color_options: colors.iter().map(|c| c.to_string()).collect(),
            details: serde_json::json!({}),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn input(product: &Product, customization: Option<&str>, color: Option<&str>) -> CartItemInput {
        CartItemInput {
            product_id: product.id,
            quantity: 2,
            customization: customization.map(str::to_string),
            color: color.map(str::to_string),
        }
    }

    #[test]
    fn line_uses_catalogue_price() {
        let p = product(true, &["Azul"]);
        let line = line_for(&p, &input(&p, Some(" Theo "), Some("Azul"))).expect("line");
        assert_eq!(line.unit_price, 8_990);
        assert_eq!(line.customization.as_deref(), Some("Theo"));
        assert_eq!(line.line_total(), 17_980);
    }

    #[test]
    fn rejects_embroidery_on_plain_products() {
        let p = product(false, &[]);
        assert!(line_for(&p, &input(&p, Some("Theo"), None)).is_err());
        assert!(line_for(&p, &input(&p, Some("   "), None)).is_ok());
    }

    #[test]
    fn rejects_unknown_colors() {
        let p = product(false, &["Rosa", "Azul"]);
        assert!(line_for(&p, &input(&p, None, Some("Verde"))).is_err());
        let any = product(false, &[]);
        assert!(line_for(&any, &input(&any, None, Some("Verde"))).is_ok());
    }
}
