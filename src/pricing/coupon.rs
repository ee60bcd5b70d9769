use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::{entity::enums::DiscountType, models::Coupon, pricing::money::format_brl};

/// Why a coupon cannot be applied to an order. The message is shown to the customer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CouponRejection {
    #[error("Coupon is inactive")]
    Inactive,
    #[error("Coupon is not yet active")]
    NotYetActive,
    #[error("Coupon has expired")]
    Expired,
    #[error("Coupon usage limit reached")]
    Exhausted,
    #[error("Minimum order value for this coupon is {}", format_brl(*.0))]
    BelowMinimum(i64),
}

/// Check whether `coupon` can be applied to an order of `order_total` centavos at `now`.
pub fn validate(coupon: &Coupon, order_total: i64, now: DateTime<Utc>) -> Result<(), CouponRejection> {
    if !coupon.is_active {
        return Err(CouponRejection::Inactive);
    }
    if coupon.valid_from.is_some_and(|from| now < from) {
        return Err(CouponRejection::NotYetActive);
    }
    if coupon.valid_until.is_some_and(|until| now > until) {
        return Err(CouponRejection::Expired);
    }
    if coupon.max_uses.is_some_and(|max| coupon.uses_count >= max) {
        return Err(CouponRejection::Exhausted);
    }
    match coupon.min_order_value {
        Some(min) if order_total < min => Err(CouponRejection::BelowMinimum(min)),
        _ => Ok(()),
    }
}

/// Discount on the product subtotal, never larger than the subtotal itself.
pub fn discount_for(coupon: &Coupon, subtotal: i64) -> i64 {
    let subtotal = subtotal.max(0);
    let discount = match coupon.discount_type {
        DiscountType::Percentage => percent_of(subtotal, coupon.discount_value),
        DiscountType::Fixed => coupon.discount_value.max(0),
    };
    discount.min(subtotal)
}

/// Discount on the shipping amount granted by the coupon.
pub fn shipping_discount_for(coupon: &Coupon, shipping: i64) -> i64 {
    let shipping = shipping.max(0);
    if coupon.free_shipping {
        return shipping;
    }
    coupon
        .shipping_discount_percent
        .map(|pct| percent_of(shipping, i64::from(pct)))
        .unwrap_or(0)
        .min(shipping)
}

/// `amount * percent / 100`, rounded half up, percent clamped to 0..=100.
fn percent_of(amount: i64, percent: i64) -> i64 {
    let percent = i128::from(percent.clamp(0, 100));
    let scaled = (i128::from(amount) * percent + 50) / 100;
    i64::try_from(scaled).unwrap_or(amount)
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use uuid::Uuid;

    use super::*;

    fn coupon(discount_type: DiscountType, value: i64) -> Coupon {
        Coupon {
            id: Uuid::new_v4(),
            code: "BEMVINDO".into(),
            discount_type,
            discount_value: value,
            min_order_value: None,
            max_uses: None,
            uses_count: 0,
            valid_from: None,
            valid_until: None,
            free_shipping: false,
            shipping_discount_percent: None,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn percentage_coupon_on_hundred_reais_gives_ten() {
        let c = coupon(DiscountType::Percentage, 10);
        assert_eq!(discount_for(&c, 10_000), 1_000);
    }

    #[test]
    fn percentage_of_huge_amount_does_not_overflow() {
        let c = coupon(DiscountType::Percentage, 10);
        assert_eq!(discount_for(&c, i64::MAX / 2), 461_168_601_842_738_790);
        assert_eq!(discount_for(&coupon(DiscountType::Percentage, 100), i64::MAX), i64::MAX);
    }

    #[test]
    fn percentage_rounds_half_up() {
        let c = coupon(DiscountType::Percentage, 15);
        // 15% of R$ 0,99 = 14.85 centavos
        assert_eq!(discount_for(&c, 99), 15);
    }

    #[test]
    fn fixed_discount_is_capped_at_total() {
        let c = coupon(DiscountType::Fixed, 5_000);
        assert_eq!(discount_for(&c, 3_000), 3_000);
        assert_eq!(discount_for(&c, 8_000), 5_000);
    }

    #[test]
    fn percentage_above_hundred_is_clamped() {
        let c = coupon(DiscountType::Percentage, 150);
        assert_eq!(discount_for(&c, 2_000), 2_000);
    }

    #[test]
    fn rejects_coupon_before_window() {
        let now = Utc::now();
        let mut c = coupon(DiscountType::Percentage, 10);
        c.valid_from = Some(now + Duration::days(1));
        let err = validate(&c, 10_000, now).unwrap_err();
        assert_eq!(err, CouponRejection::NotYetActive);
        assert_eq!(err.to_string(), "Coupon is not yet active");
    }

    #[test]
    fn rejects_coupon_after_window() {
        let now = Utc::now();
        let mut c = coupon(DiscountType::Percentage, 10);
        c.valid_from = Some(now - Duration::days(10));
        c.valid_until = Some(now - Duration::days(1));
        let err = validate(&c, 10_000, now).unwrap_err();
        assert_eq!(err, CouponRejection::Expired);
        assert_eq!(err.to_string(), "Coupon has expired");
    }

    #[test]
    fn accepts_coupon_inside_window() {
        let now = Utc::now();
        let mut c = coupon(DiscountType::Fixed, 500);
        c.valid_from = Some(now - Duration::days(1));
        c.valid_until = Some(now + Duration::days(1));
        assert!(validate(&c, 10_000, now).is_ok());
    }

    #[test]
    fn rejects_exhausted_coupon() {
        let mut c = coupon(DiscountType::Fixed, 500);
        c.max_uses = Some(3);
        c.uses_count = 3;
        assert_eq!(
            validate(&c, 10_000, Utc::now()),
            Err(CouponRejection::Exhausted)
        );
    }

    #[test]
    fn rejects_inactive_coupon_first() {
        let mut c = coupon(DiscountType::Fixed, 500);
        c.is_active = false;
        c.max_uses = Some(0);
        assert_eq!(
            validate(&c, 10_000, Utc::now()),
            Err(CouponRejection::Inactive)
        );
    }

    #[test]
    fn rejects_order_below_minimum() {
        let mut c = coupon(DiscountType::Fixed, 500);
        c.min_order_value = Some(15_000);
        let err = validate(&c, 10_000, Utc::now()).unwrap_err();
        assert_eq!(err, CouponRejection::BelowMinimum(15_000));
        assert_eq!(
            err.to_string(),
            "Minimum order value for this coupon is R$ 150,00"
        );
    }

    #[test]
    fn free_shipping_covers_whole_shipping() {
        let mut c = coupon(DiscountType::Percentage, 0);
        c.free_shipping = true;
        assert_eq!(shipping_discount_for(&c, 2_490), 2_490);
    }

    #[test]
    fn partial_shipping_discount() {
        let mut c = coupon(DiscountType::Percentage, 0);
        c.shipping_discount_percent = Some(50);
        assert_eq!(shipping_discount_for(&c, 2_000), 1_000);
        c.shipping_discount_percent = None;
        assert_eq!(shipping_discount_for(&c, 2_000), 0);
    }
}
