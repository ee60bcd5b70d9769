//! Pure pricing rules: coupon validation and discounts, money formatting.

pub mod coupon;
pub mod money;

pub use coupon::{CouponRejection, discount_for, shipping_discount_for, validate};
pub use money::{MAX_AMOUNT, format_brl, is_valid_amount};
