use sea_orm::entity::prelude::*;

use super::enums::DiscountType;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "coupons")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub code: String,
    pub discount_type: DiscountType,
    /// Percent points for percentage coupons, centavos for fixed ones.
    pub discount_value: i64,
    pub min_order_value: Option<i64>,
    pub max_uses: Option<i32>,
    pub uses_count: i32,
    pub valid_from: Option<DateTimeWithTimeZone>,
    pub valid_until: Option<DateTimeWithTimeZone>,
    pub free_shipping: bool,
    pub shipping_discount_percent: Option<i32>,
    pub is_active: bool,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
