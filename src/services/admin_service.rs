use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
    sea_query::{Expr, LockType, OnConflict, extension::postgres::PgExpr},
};
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::{
    audit,
    dto::{
        orders::{OrderList, OrderWithItems, UpdateOrderStatusRequest, UpdateTrackingRequest},
        settings::{Setting, SettingList, StatusCount, StoreStats, UpdateSettingRequest},
    },
    entity::{
        coupons::{Column as CouponCol, Entity as Coupons},
        enums::{OrderStatus, PaymentStatus},
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders},
        products::Entity as Products,
        settings::{ActiveModel as SettingActive, Column as SettingCol, Entity as Settings},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::Order,
    response::{ApiResponse, Meta},
    routes::params::{OrderListQuery, SortOrder},
    services::{contains_pattern, notification_service, order_service::load_order_with_items},
    shipping::tracking_url,
    state::AppState,
};

/// Settings managed by the application itself; hidden from the settings API.
pub const RESERVED_SETTINGS: [&str; 2] = ["melhor_envio_token", "melhor_envio_oauth_state"];

pub async fn get_setting<T, C>(db: &C, key: &str) -> AppResult<Option<T>>
where
    T: DeserializeOwned,
    C: ConnectionTrait,
{
    let Some(row) = Settings::find_by_id(key.to_string()).one(db).await? else {
        return Ok(None);
    };
    match serde_json::from_value(row.value) {
        Ok(value) => Ok(Some(value)),
        Err(err) => {
            tracing::warn!(error = %err, key, "ignoring malformed setting");
            Ok(None)
        }
    }
}

pub async fn put_setting<C: ConnectionTrait>(
    db: &C,
    key: &str,
    value: serde_json::Value,
) -> AppResult<Setting> {
    let now = Utc::now();
    Settings::insert(SettingActive {
        key: Set(key.to_string()),
        value: Set(value.clone()),
        updated_at: Set(now.into()),
    })
    .on_conflict(
        OnConflict::column(SettingCol::Key)
            .update_columns([SettingCol::Value, SettingCol::UpdatedAt])
            .to_owned(),
    )
    .exec(db)
    .await?;

    Ok(Setting {
        key: key.to_string(),
        value,
        updated_at: now,
    })
}

pub async fn delete_setting<C: ConnectionTrait>(db: &C, key: &str) -> AppResult<()> {
    Settings::delete_by_id(key.to_string()).exec(db).await?;
    Ok(())
}

fn validate_setting_key(key: &str) -> AppResult<()> {
    let well_formed = !key.is_empty()
        && key.len() <= 64
        && key
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
    if !well_formed {
        return Err(AppError::BadRequest(
            "Setting keys use lowercase letters, digits and underscores".into(),
        ));
    }
    if RESERVED_SETTINGS.contains(&key) {
        return Err(AppError::BadRequest(format!("Setting {key} is read-only")));
    }
    Ok(())
}

pub async fn list_settings(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<SettingList>> {
    ensure_admin(user)?;
    let items = Settings::find()
        .filter(SettingCol::Key.is_not_in(RESERVED_SETTINGS))
        .order_by_asc(SettingCol::Key)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|row| Setting {
            key: row.key,
            value: row.value,
            updated_at: row.updated_at.with_timezone(&Utc),
        })
        .collect();
    Ok(ApiResponse::success("Settings", SettingList { items }, None))
}

pub async fn update_setting(
    state: &AppState,
    user: &AuthUser,
    key: String,
    payload: UpdateSettingRequest,
) -> AppResult<ApiResponse<Setting>> {
    ensure_admin(user)?;
    validate_setting_key(&key)?;
    let setting = put_setting(&state.orm, &key, payload.value).await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "setting_update",
        "settings",
        serde_json::json!({ "key": key }),
    )
    .await;

    Ok(ApiResponse::success("Setting saved", setting, Some(Meta::empty())))
}

pub async fn store_stats(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<StoreStats>> {
    ensure_admin(user)?;
    let rows: Vec<(String, i64)> =
        sqlx::query_as("SELECT status, COUNT(*) FROM orders GROUP BY status ORDER BY status")
            .fetch_all(&state.pool)
            .await?;

    let (paid_revenue,): (i64,) = sqlx::query_as(
        r#"
        SELECT COALESCE(SUM(total_amount), 0)::BIGINT
        FROM orders
        WHERE status IN ('paid', 'processing', 'shipped', 'delivered')
        "#,
    )
    .fetch_one(&state.pool)
    .await?;

    let orders_by_status: Vec<StatusCount> = rows
        .into_iter()
        .filter_map(|(status, count)| {
            OrderStatus::parse(&status).map(|status| StatusCount { status, count })
        })
        .collect();
    let total_orders = orders_by_status.iter().map(|s| s.count).sum();

    let products = Products::find().count(&state.orm).await? as i64;
    let active_coupons = Coupons::find()
        .filter(CouponCol::IsActive.eq(true))
        .count(&state.orm)
        .await? as i64;

    Ok(ApiResponse::success(
        "Stats",
        StoreStats {
            total_orders,
            orders_by_status,
            paid_revenue,
            products,
            active_coupons,
        },
        None,
    ))
}

pub async fn list_all_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    ensure_admin(user)?;
    let (page, limit, offset) = query.pagination().normalize();

    let mut condition = Condition::all();
    if let Some(status) = query.status {
        condition = condition.add(OrderCol::Status.eq(status));
    }
    if let Some(email) = query.email.as_ref().filter(|s| !s.trim().is_empty()) {
        condition = condition
            .add(Expr::col(OrderCol::CustomerEmail).ilike(contains_pattern(email.trim())));
    }

    let mut finder = Orders::find().filter(condition);

    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);
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

    Ok(ApiResponse::success("Orders", OrderList { items: orders }, Some(meta)))
}

pub async fn get_order_admin(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<OrderWithItems>> {
    ensure_admin(user)?;
    let order = load_order_with_items(&state.orm, id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success("Order", order, Some(Meta::empty())))
}

pub async fn update_order_status(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateOrderStatusRequest,
) -> AppResult<ApiResponse<OrderWithItems>> {
    ensure_admin(user)?;
    let txn = state.orm.begin().await?;

    let order = Orders::find()
        .filter(OrderCol::Id.eq(id))
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;

    let previous = order.status;
    let next = payload.status;
    if !previous.can_transition_to(next) {
        return Err(AppError::BadRequest(format!(
            "Cannot change order status from {previous} to {next}"
        )));
    }

    let now = Utc::now();
    let mut active: OrderActive = order.into();
    active.status = Set(next);
    match next {
        OrderStatus::Paid => {
            active.payment_status = Set(PaymentStatus::Paid);
            active.paid_at = Set(Some(now.into()));
        }
        OrderStatus::Refunded => active.payment_status = Set(PaymentStatus::Refunded),
        _ => {}
    }
    active.updated_at = Set(now.into());
    active.update(&txn).await?;
    txn.commit().await?;

    let order = load_order_with_items(&state.orm, id)
        .await?
        .ok_or(AppError::NotFound)?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "order_status_update",
        "orders",
        serde_json::json!({ "order_id": id, "from": previous, "to": next }),
    )
    .await;

    if payload.notify.unwrap_or(true) {
        notification_service::notify_status(state, &order.order, &order.items, next).await;
    }

    Ok(ApiResponse::success("Order status updated", order, Some(Meta::empty())))
}

pub async fn update_tracking(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateTrackingRequest,
) -> AppResult<ApiResponse<OrderWithItems>> {
    ensure_admin(user)?;
    let code = payload.tracking_code.trim().to_string();
    if code.is_empty() {
        return Err(AppError::BadRequest("tracking_code is required".into()));
    }
    let url = payload
        .tracking_url
        .map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty())
        .unwrap_or_else(|| tracking_url(&code));

    let order = Orders::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    if order.status.is_terminal() {
        return Err(AppError::BadRequest(format!(
            "Order is {}, tracking cannot change",
            order.status
        )));
    }

    let mut active: OrderActive = order.into();
    active.tracking_code = Set(Some(code.clone()));
    active.tracking_url = Set(Some(url));
    active.updated_at = Set(Utc::now().into());
    active.update(&state.orm).await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "order_tracking_update",
        "orders",
        serde_json::json!({ "order_id": id, "tracking_code": code }),
    )
    .await;

    let order = load_order_with_items(&state.orm, id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success("Tracking updated", order, Some(Meta::empty())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setting_keys_are_validated() {
        assert!(validate_setting_key("store_address").is_ok());
        assert!(validate_setting_key("Store Address").is_err());
        assert!(validate_setting_key("").is_err());
        assert!(validate_setting_key("melhor_envio_token").is_err());
    }
}
