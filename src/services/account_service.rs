use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
    ActiveValue::NotSet,
    sea_query::Expr,
};
use uuid::Uuid;

use crate::{
    dto::accounts::{Account, AddressList, AddressRequest, UpdateProfileRequest},
    entity::{
        user_addresses::{ActiveModel as AddressActive, Column as AddressCol, Entity as Addresses},
        user_profiles::{ActiveModel as ProfileActive, Entity as Profiles},
        users::Entity as Users,
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{UserAddress, UserProfile},
    response::{ApiResponse, Meta},
    shipping::normalize_postal_code,
    state::AppState,
};

fn digits_only(value: &str) -> String {
    value.chars().filter(char::is_ascii_digit).collect()
}

fn optional(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

pub async fn get_account(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<Account>> {
    let account = Users::find_by_id(user.user_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    let profile = Profiles::find_by_id(user.user_id)
        .one(&state.orm)
        .await?
        .map(UserProfile::from);

    Ok(ApiResponse::success(
        "Profile",
        Account {
            email: account.email,
            role: account.role,
            profile,
        },
        None,
    ))
}

pub async fn update_profile(
    state: &AppState,
    user: &AuthUser,
    payload: UpdateProfileRequest,
) -> AppResult<ApiResponse<UserProfile>> {
    if let Some(cpf) = payload.cpf.as_deref() {
        let digits = digits_only(cpf);
        if !digits.is_empty() && digits.len() != 11 {
            return Err(AppError::BadRequest("CPF must have 11 digits".into()));
        }
    }

    let existing = Profiles::find_by_id(user.user_id).one(&state.orm).await?;
    let profile = match existing {
        Some(model) => {
            let mut active: ProfileActive = model.into();
            if let Some(full_name) = payload.full_name {
                active.full_name = Set(full_name.trim().to_string());
            }
            if let Some(phone) = payload.phone {
                active.phone = Set(optional(Some(phone)));
            }
            if let Some(cpf) = payload.cpf {
                active.cpf = Set(Some(digits_only(&cpf)).filter(|c| !c.is_empty()));
            }
            active.updated_at = Set(Utc::now().into());
            active.update(&state.orm).await?
        }
        None => {
            ProfileActive {
                user_id: Set(user.user_id),
                full_name: Set(payload.full_name.unwrap_or_default().trim().to_string()),
                phone: Set(optional(payload.phone)),
                cpf: Set(payload.cpf.map(|c| digits_only(&c)).filter(|c| !c.is_empty())),
                updated_at: Set(Utc::now().into()),
            }
            .insert(&state.orm)
            .await?
        }
    };

    Ok(ApiResponse::success(
        "Profile updated",
        UserProfile::from(profile),
        Some(Meta::empty()),
    ))
}

pub async fn list_addresses(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<AddressList>> {
    let items = Addresses::find()
        .filter(AddressCol::UserId.eq(user.user_id))
        .order_by_desc(AddressCol::IsDefault)
        .order_by_asc(AddressCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(UserAddress::from)
        .collect();
    Ok(ApiResponse::success("Addresses", AddressList { items }, None))
}

struct CleanAddress {
    label: String,
    recipient: String,
    street: String,
    number: String,
    complement: Option<String>,
    neighborhood: String,
    city: String,
    state: String,
    postal_code: String,
}

fn clean_address(payload: AddressRequest) -> AppResult<(CleanAddress, bool)> {
    let required = [
        ("recipient", &payload.recipient),
        ("street", &payload.street),
        ("number", &payload.number),
        ("neighborhood", &payload.neighborhood),
        ("city", &payload.city),
        ("state", &payload.state),
    ];
    if let Some((field, _)) = required.iter().find(|(_, v)| v.trim().is_empty()) {
        return Err(AppError::BadRequest(format!("{field} is required")));
    }
    let state = payload.state.trim().to_ascii_uppercase();
    if state.len() != 2 {
        return Err(AppError::BadRequest("state must be a two-letter code".into()));
    }
    let postal_code = normalize_postal_code(&payload.postal_code)?;

    Ok((
        CleanAddress {
            label: optional(payload.label).unwrap_or_else(|| "Casa".to_string()),
            recipient: payload.recipient.trim().to_string(),
            street: payload.street.trim().to_string(),
            number: payload.number.trim().to_string(),
            complement: optional(payload.complement),
            neighborhood: payload.neighborhood.trim().to_string(),
            city: payload.city.trim().to_string(),
            state,
            postal_code,
        },
        payload.is_default,
    ))
}

async fn clear_default<C: ConnectionTrait>(db: &C, user_id: Uuid) -> AppResult<()> {
    Addresses::update_many()
        .col_expr(AddressCol::IsDefault, Expr::value(false))
        .filter(AddressCol::UserId.eq(user_id))
        .exec(db)
        .await?;
    Ok(())
}

pub async fn create_address(
    state: &AppState,
    user: &AuthUser,
    payload: AddressRequest,
) -> AppResult<ApiResponse<UserAddress>> {
    let (address, wants_default) = clean_address(payload)?;

    let txn = state.orm.begin().await?;
    let existing = Addresses::find()
        .filter(AddressCol::UserId.eq(user.user_id))
        .count(&txn)
        .await?;
    // The first address is always the default one.
    let is_default = wants_default || existing == 0;
    if is_default {
        clear_default(&txn, user.user_id).await?;
    }

    let model = AddressActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user.user_id),
        label: Set(address.label),
        recipient: Set(address.recipient),
        street: Set(address.street),
        number: Set(address.number),
        complement: Set(address.complement),
        neighborhood: Set(address.neighborhood),
        city: Set(address.city),
        state: Set(address.state),
        postal_code: Set(address.postal_code),
        is_default: Set(is_default),
        created_at: NotSet,
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;

    Ok(ApiResponse::success(
        "Address created",
        UserAddress::from(model),
        Some(Meta::empty()),
    ))
}

pub async fn update_address(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: AddressRequest,
) -> AppResult<ApiResponse<UserAddress>> {
    let (address, wants_default) = clean_address(payload)?;

    let txn = state.orm.begin().await?;
    let existing = Addresses::find()
        .filter(
            Condition::all()
                .add(AddressCol::Id.eq(id))
                .add(AddressCol::UserId.eq(user.user_id)),
        )
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;

    let keep_default = existing.is_default;
    if wants_default && !keep_default {
        clear_default(&txn, user.user_id).await?;
    }

    let mut active: AddressActive = existing.into();
    active.label = Set(address.label);
    active.recipient = Set(address.recipient);
    active.street = Set(address.street);
    active.number = Set(address.number);
    active.complement = Set(address.complement);
    active.neighborhood = Set(address.neighborhood);
    active.city = Set(address.city);
    active.state = Set(address.state);
    active.postal_code = Set(address.postal_code);
    active.is_default = Set(wants_default || keep_default);
    let model = active.update(&txn).await?;
    txn.commit().await?;

    Ok(ApiResponse::success(
        "Address updated",
        UserAddress::from(model),
        Some(Meta::empty()),
    ))
}

pub async fn delete_address(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let txn = state.orm.begin().await?;
    let existing = Addresses::find()
        .filter(
            Condition::all()
                .add(AddressCol::Id.eq(id))
                .add(AddressCol::UserId.eq(user.user_id)),
        )
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;

    Addresses::delete_by_id(existing.id).exec(&txn).await?;

    // Promote the oldest remaining address when the default one goes away.
    if existing.is_default {
        let next = Addresses::find()
            .filter(AddressCol::UserId.eq(user.user_id))
            .order_by_asc(AddressCol::CreatedAt)
            .one(&txn)
            .await?;
        if let Some(next) = next {
            let mut active: AddressActive = next.into();
            active.is_default = Set(true);
            active.update(&txn).await?;
        }
    }
    txn.commit().await?;

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}
