use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
    ActiveValue::NotSet,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::coupons::{
        CouponList, CouponValidation, CreateCouponRequest, UpdateCouponRequest,
        ValidateCouponRequest,
    },
    entity::{
        coupons::{ActiveModel, Column, Entity as Coupons},
        enums::DiscountType,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::Coupon,
    pricing,
    response::{ApiResponse, Meta},
    state::AppState,
};

const MAX_CODE_LEN: usize = 64;

/// Coupon codes are stored and matched uppercase.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

fn check_code(code: &str) -> AppResult<()> {
    if code.is_empty() || code.len() > MAX_CODE_LEN {
        return Err(AppError::BadRequest("Coupon code is required".into()));
    }
    if !code.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
        return Err(AppError::BadRequest(
            "Coupon code may only contain letters, digits, '-' and '_'".into(),
        ));
    }
    Ok(())
}

fn check_terms(
    discount_type: DiscountType,
    discount_value: i64,
    shipping_discount_percent: Option<i32>,
    valid_from: Option<chrono::DateTime<Utc>>,
    valid_until: Option<chrono::DateTime<Utc>>,
    max_uses: Option<i32>,
) -> AppResult<()> {
    if discount_value < 0 {
        return Err(AppError::BadRequest("Discount value cannot be negative".into()));
    }
    if discount_type == DiscountType::Percentage && discount_value > 100 {
        return Err(AppError::BadRequest(
            "Percentage discount cannot exceed 100".into(),
        ));
    }
    if shipping_discount_percent.is_some_and(|p| !(0..=100).contains(&p)) {
        return Err(AppError::BadRequest(
            "Shipping discount must be between 0 and 100".into(),
        ));
    }
    if let (Some(from), Some(until)) = (valid_from, valid_until) {
        if from > until {
            return Err(AppError::BadRequest(
                "valid_from must be before valid_until".into(),
            ));
        }
    }
    if max_uses.is_some_and(|m| m <= 0) {
        return Err(AppError::BadRequest("max_uses must be positive".into()));
    }
    Ok(())
}

pub async fn find_by_code<C: ConnectionTrait>(db: &C, code: &str) -> AppResult<Option<Coupon>> {
    let coupon = Coupons::find()
        .filter(Column::Code.eq(normalize_code(code)))
        .one(db)
        .await?
        .map(Coupon::from);
    Ok(coupon)
}

pub async fn list_coupons(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<CouponList>> {
    ensure_admin(user)?;
    let items = Coupons::find()
        .order_by_desc(Column::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Coupon::from)
        .collect();
    Ok(ApiResponse::success("Coupons", CouponList { items }, None))
}

pub async fn get_coupon(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<Coupon>> {
    ensure_admin(user)?;
    let coupon = Coupons::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success("Coupon", Coupon::from(coupon), None))
}

pub async fn create_coupon(
    state: &AppState,
    user: &AuthUser,
    payload: CreateCouponRequest,
) -> AppResult<ApiResponse<Coupon>> {
    ensure_admin(user)?;
    let code = normalize_code(&payload.code);
    check_code(&code)?;
    check_terms(
        payload.discount_type,
        payload.discount_value,
        payload.shipping_discount_percent,
        payload.valid_from,
        payload.valid_until,
        payload.max_uses,
    )?;

    if find_by_code(&state.orm, &code).await?.is_some() {
        return Err(AppError::Conflict(format!("Coupon {code} already exists")));
    }

    let coupon = ActiveModel {
        id: Set(Uuid::new_v4()),
        code: Set(code),
        discount_type: Set(payload.discount_type),
        discount_value: Set(payload.discount_value),
        min_order_value: Set(payload.min_order_value),
        max_uses: Set(payload.max_uses),
        uses_count: Set(0),
        valid_from: Set(payload.valid_from.map(Into::into)),
        valid_until: Set(payload.valid_until.map(Into::into)),
        free_shipping: Set(payload.free_shipping),
        shipping_discount_percent: Set(payload.shipping_discount_percent),
        is_active: Set(payload.is_active.unwrap_or(true)),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "coupon_create",
        "coupons",
        serde_json::json!({ "coupon_id": coupon.id, "code": coupon.code }),
    )
    .await;

    Ok(ApiResponse::success(
        "Coupon created",
        Coupon::from(coupon),
        Some(Meta::empty()),
    ))
}

pub async fn update_coupon(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateCouponRequest,
) -> AppResult<ApiResponse<Coupon>> {
    ensure_admin(user)?;
    let existing = Coupons::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let discount_type = payload.discount_type.unwrap_or(existing.discount_type);
    let discount_value = payload.discount_value.unwrap_or(existing.discount_value);
    let shipping_discount_percent = payload
        .shipping_discount_percent
        .or(existing.shipping_discount_percent);
    let valid_from = payload
        .valid_from
        .or(existing.valid_from.map(|d| d.with_timezone(&Utc)));
    let valid_until = payload
        .valid_until
        .or(existing.valid_until.map(|d| d.with_timezone(&Utc)));
    let max_uses = payload.max_uses.or(existing.max_uses);
    check_terms(
        discount_type,
        discount_value,
        shipping_discount_percent,
        valid_from,
        valid_until,
        max_uses,
    )?;

    let mut active: ActiveModel = existing.into();
    active.discount_type = Set(discount_type);
    active.discount_value = Set(discount_value);
    active.shipping_discount_percent = Set(shipping_discount_percent);
    active.valid_from = Set(valid_from.map(Into::into));
    active.valid_until = Set(valid_until.map(Into::into));
    active.max_uses = Set(max_uses);
    if let Some(min) = payload.min_order_value {
        active.min_order_value = Set(Some(min));
    }
    if let Some(free_shipping) = payload.free_shipping {
        active.free_shipping = Set(free_shipping);
    }
    if let Some(is_active) = payload.is_active {
        active.is_active = Set(is_active);
    }
    let coupon = active.update(&state.orm).await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "coupon_update",
        "coupons",
        serde_json::json!({ "coupon_id": coupon.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Updated",
        Coupon::from(coupon),
        Some(Meta::empty()),
    ))
}

pub async fn delete_coupon(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    let result = Coupons::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    audit::record(
        &state.pool,
        Some(user.user_id),
        "coupon_delete",
        "coupons",
        serde_json::json!({ "coupon_id": id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

/// Price a coupon against an order without consuming it.
pub fn evaluate(
    coupon: &Coupon,
    order_total: i64,
    shipping_amount: i64,
) -> Result<CouponValidation, pricing::CouponRejection> {
    pricing::validate(coupon, order_total, Utc::now())?;
    let discount_amount = pricing::discount_for(coupon, order_total);
    let shipping_discount = pricing::shipping_discount_for(coupon, shipping_amount);
    Ok(CouponValidation {
        code: coupon.code.clone(),
        discount_type: coupon.discount_type,
        discount_value: coupon.discount_value,
        discount_amount,
        shipping_discount,
        free_shipping: coupon.free_shipping,
        total_after_discount: (order_total - discount_amount)
            .saturating_add(shipping_amount - shipping_discount),
    })
}

pub async fn validate_coupon(
    state: &AppState,
    payload: ValidateCouponRequest,
) -> AppResult<ApiResponse<CouponValidation>> {
    if payload.code.trim().is_empty() {
        return Err(AppError::BadRequest("Coupon code is required".into()));
    }
    if !pricing::is_valid_amount(payload.order_total)
        || payload.shipping_amount.is_some_and(|s| !pricing::is_valid_amount(s))
    {
        return Err(AppError::BadRequest(format!(
            "Amounts must be between 0 and {}",
            pricing::format_brl(pricing::MAX_AMOUNT)
        )));
    }
    let coupon = find_by_code(&state.orm, &payload.code)
        .await?
        .ok_or(AppError::NotFound)?;

    let validation = evaluate(&coupon, payload.order_total, payload.shipping_amount.unwrap_or(0))?;
    Ok(ApiResponse::success("Coupon applied", validation, None))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_uppercased_and_checked() {
        assert_eq!(normalize_code("  bemvindo10 "), "BEMVINDO10");
        assert!(check_code("BEM-VINDO_10").is_ok());
        assert!(check_code("").is_err());
        assert!(check_code("NATAL 2026").is_err());
    }

    #[test]
    fn percentage_over_hundred_is_rejected() {
        assert!(check_terms(DiscountType::Percentage, 101, None, None, None, None).is_err());
        assert!(check_terms(DiscountType::Fixed, 15_000, None, None, None, None).is_ok());
        assert!(check_terms(DiscountType::Fixed, 100, Some(150), None, None, None).is_err());
        assert!(check_terms(DiscountType::Fixed, 100, None, None, None, Some(0)).is_err());
    }

    #[test]
    fn evaluate_reports_both_discounts() {
        let coupon = Coupon {
            id: Uuid::new_v4(),
            code: "FRETE50".into(),
            discount_type: DiscountType::Percentage,
            discount_value: 10,
            min_order_value: None,
            max_uses: None,
            uses_count: 0,
            valid_from: None,
            valid_until: None,
            free_shipping: false,
            shipping_discount_percent: Some(50),
            is_active: true,
            created_at: Utc::now(),
        };
        let result = evaluate(&coupon, 10_000, 2_000).expect("valid");
        assert_eq!(result.discount_amount, 1_000);
        assert_eq!(result.shipping_discount, 1_000);
        assert_eq!(result.total_after_discount, 10_000);
    }

    #[test]
    fn evaluate_handles_amounts_near_the_integer_limit() {
        let coupon = Coupon {
            id: Uuid::new_v4(),
            code: "BEMVINDO10".into(),
            discount_type: DiscountType::Percentage,
            discount_value: 10,
            min_order_value: None,
            max_uses: None,
            uses_count: 0,
            valid_from: None,
            valid_until: None,
            free_shipping: true,
            shipping_discount_percent: None,
            is_active: true,
            created_at: Utc::now(),
        };
        let result = evaluate(&coupon, i64::MAX / 2, i64::MAX).expect("valid");
        assert_eq!(result.discount_amount, 461_168_601_842_738_790);
        assert_eq!(result.shipping_discount, i64::MAX);
        assert_eq!(result.total_after_discount, i64::MAX / 2 - 461_168_601_842_738_790);
    }
}
