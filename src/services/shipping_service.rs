use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use crate::{
    audit,
    dto::shipping::{
        AuthorizeUrl, LabelCreated, ProviderStatus, QuoteSource, ShippingQuote, ShippingQuoteRequest,
        TrackingInfo,
    },
    entity::{
        enums::OrderStatus,
        order_items::{Column as OrderItemCol, Entity as OrderItems},
        orders::{ActiveModel as OrderActive, Entity as Orders},
        products::{Column as ProdCol, Entity as Products},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{Dimensions, Product},
    response::{ApiResponse, Meta},
    services::{
        admin_service::{delete_setting, get_setting, put_setting},
        cart_service,
    },
    shipping::{
        LOCAL_DELIVERY_ID, MelhorEnvioClient, MelhorEnvioToken, Package, ShippingError,
        ShippingOption, fallback, is_local, local_delivery,
        melhor_envio::{LabelParty, LabelProduct, LabelRequest},
        normalize_postal_code, tracking_url as carrier_tracking_url,
    },
    state::AppState,
};

pub const TOKEN_SETTING: &str = "melhor_envio_token";
pub const OAUTH_STATE_SETTING: &str = "melhor_envio_oauth_state";
/// Sender block for labels, stored as a settings object.
pub const STORE_ADDRESS_SETTING: &str = "store_address";

/// The stored provider token, refreshed first when it has expired.
async fn provider_token(
    state: &AppState,
    client: &MelhorEnvioClient,
) -> AppResult<Option<MelhorEnvioToken>> {
    let Some(token) = get_setting::<MelhorEnvioToken, _>(&state.orm, TOKEN_SETTING).await? else {
        return Ok(None);
    };
    if !token.is_expired(Utc::now()) {
        return Ok(Some(token));
    }

    match client.refresh(&token.refresh_token).await {
        Ok(fresh) => {
            let value = serde_json::to_value(&fresh).map_err(anyhow::Error::from)?;
            put_setting(&state.orm, TOKEN_SETTING, value).await?;
            tracing::info!("shipping provider token refreshed");
            Ok(Some(fresh))
        }
        Err(ShippingError::NotAuthorized) => {
            tracing::warn!("shipping provider refused the refresh token, authorization required");
            delete_setting(&state.orm, TOKEN_SETTING).await?;
            Ok(None)
        }
        Err(err) => Err(err.into()),
    }
}

/// Quote a package to `destination`.
///
/// Uses the provider when it is configured and authorized, otherwise the
/// fallback table. Local destinations always include free local delivery.
pub async fn quote(
    state: &AppState,
    destination: &str,
    package: &Package,
    insurance_value: i64,
) -> AppResult<ShippingQuote> {
    let destination = normalize_postal_code(destination)?;
    let origin = normalize_postal_code(&state.config.store.origin_postal_code)?;

    let token = match &state.shipping {
        Some(client) => provider_token(state, client)
            .await?
            .map(|token| (client, token)),
        None => None,
    };

    let Some((client, token)) = token else {
        return Ok(ShippingQuote {
            options: fallback::quote(&destination, package),
            postal_code: destination,
            source: QuoteSource::Fallback,
        });
    };

    match client
        .calculate(&token, &origin, &destination, package, insurance_value)
        .await
    {
        Ok(mut options) => {
            if is_local(&destination) {
                options.insert(0, local_delivery());
            }
            Ok(ShippingQuote {
                postal_code: destination,
                source: QuoteSource::Provider,
                options,
            })
        }
        Err(ShippingError::NotAuthorized) => {
            tracing::warn!("shipping provider rejected the token, using fallback rates");
            Ok(ShippingQuote {
                options: fallback::quote(&destination, package),
                postal_code: destination,
                source: QuoteSource::Fallback,
            })
        }
        Err(err) => Err(err.into()),
    }
}

pub async fn calculate(
    state: &AppState,
    payload: ShippingQuoteRequest,
) -> AppResult<ApiResponse<ShippingQuote>> {
    let cart = cart_service::price_items(&state.orm, &payload.items).await?;
    let result = quote(state, &payload.postal_code, &cart.package(), cart.subtotal()).await?;
    Ok(ApiResponse::success("Shipping options", result, None))
}

/// Find the option the customer picked among the current quote.
pub fn select_option(options: &[ShippingOption], id: &str) -> AppResult<ShippingOption> {
    options
        .iter()
        .find(|o| o.id == id)
        .cloned()
        .ok_or_else(|| {
            AppError::BadRequest("Selected shipping option is no longer available".into())
        })
}

pub async fn provider_status(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<ProviderStatus>> {
    ensure_admin(user)?;
    let authorized = get_setting::<MelhorEnvioToken, _>(&state.orm, TOKEN_SETTING)
        .await?
        .is_some();
    Ok(ApiResponse::success(
        "Shipping provider",
        ProviderStatus {
            configured: state.shipping.is_some(),
            authorized: state.shipping.is_some() && authorized,
        },
        None,
    ))
}

fn configured_client(state: &AppState) -> AppResult<&MelhorEnvioClient> {
    state
        .shipping
        .as_ref()
        .ok_or_else(|| AppError::BadRequest("Shipping provider is not configured".into()))
}

pub async fn authorize_url(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<AuthorizeUrl>> {
    ensure_admin(user)?;
    let client = configured_client(state)?;
    let oauth_state = Uuid::new_v4().simple().to_string();
    put_setting(&state.orm, OAUTH_STATE_SETTING, serde_json::json!(oauth_state)).await?;
    let url = client.authorize_url(&oauth_state)?;
    Ok(ApiResponse::success("Authorize", AuthorizeUrl { url }, None))
}

pub async fn oauth_callback(
    state: &AppState,
    code: Option<String>,
    oauth_state: Option<String>,
    error: Option<String>,
) -> AppResult<ApiResponse<ProviderStatus>> {
    let client = configured_client(state)?;
    if let Some(error) = error {
        return Err(AppError::BadRequest(format!("Authorization denied: {error}")));
    }
    let code = code.ok_or_else(|| AppError::BadRequest("Missing authorization code".into()))?;

    let expected = get_setting::<String, _>(&state.orm, OAUTH_STATE_SETTING).await?;
    if expected.is_none() || expected != oauth_state {
        return Err(AppError::BadRequest("Invalid OAuth state".into()));
    }

    let token = client.exchange_code(&code).await?;
    put_setting(
        &state.orm,
        TOKEN_SETTING,
        serde_json::to_value(&token).map_err(anyhow::Error::from)?,
    )
    .await?;
    delete_setting(&state.orm, OAUTH_STATE_SETTING).await?;

    audit::record(
        &state.pool,
        None,
        "shipping_provider_authorized",
        "settings",
        serde_json::json!({ "expires_at": token.expires_at }),
    )
    .await;

    Ok(ApiResponse::success(
        "Shipping provider authorized",
        ProviderStatus {
            configured: true,
            authorized: true,
        },
        Some(Meta::empty()),
    ))
}

async fn authorized_client(state: &AppState) -> AppResult<(&MelhorEnvioClient, MelhorEnvioToken)> {
    let client = configured_client(state)?;
    let token = provider_token(state, client)
        .await?
        .ok_or_else(|| AppError::BadRequest("Shipping provider is not authorized".into()))?;
    Ok((client, token))
}

pub async fn create_label(
    state: &AppState,
    user: &AuthUser,
    order_id: Uuid,
) -> AppResult<ApiResponse<LabelCreated>> {
    ensure_admin(user)?;
    let order = Orders::find_by_id(order_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    if !matches!(order.status, OrderStatus::Paid | OrderStatus::Processing) {
        return Err(AppError::BadRequest(format!(
            "Labels can only be created for paid orders, this one is {}",
            order.status
        )));
    }
    if order.shipping_label_id.is_some() {
        return Err(AppError::Conflict("Order already has a shipping label".into()));
    }
    let service_id = order
        .shipping_service_id
        .as_deref()
        .filter(|id| *id != LOCAL_DELIVERY_ID)
        .and_then(|id| id.parse::<i64>().ok())
        .ok_or_else(|| {
            AppError::BadRequest("Order was not quoted by the shipping provider".into())
        })?;

    let from: LabelParty = get_setting(&state.orm, STORE_ADDRESS_SETTING)
        .await?
        .ok_or_else(|| AppError::BadRequest("Store address is not configured".into()))?;

    let items = OrderItems::find()
        .filter(OrderItemCol::OrderId.eq(order.id))
        .all(&state.orm)
        .await?;
    let product_ids: Vec<Uuid> = items.iter().filter_map(|i| i.product_id).collect();
    let products: Vec<Product> = Products::find()
        .filter(ProdCol::Id.is_in(product_ids))
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Product::from)
        .collect();
    let dims_of = |id: Option<Uuid>| -> Option<Dimensions> {
        let id = id?;
        products.iter().find(|p| p.id == id).map(|p| p.dimensions)
    };
    let package = Package::from_items(
        items
            .iter()
            .filter_map(|item| dims_of(item.product_id).map(|d| (d, item.quantity))),
    );

    let request = LabelRequest {
        service_id,
        from,
        to: LabelParty {
            name: order.customer_name.clone(),
            phone: order.customer_phone.clone(),
            email: order.customer_email.clone(),
            address: order.shipping_street.clone(),
            number: order.shipping_number.clone(),
            complement: order.shipping_complement.clone(),
            district: order.shipping_neighborhood.clone(),
            city: order.shipping_city.clone(),
            state_abbr: order.shipping_state.clone(),
            postal_code: order.shipping_postal_code.clone(),
        },
        products: items
            .iter()
            .map(|item| LabelProduct {
                name: item.product_name.clone(),
                quantity: item.quantity,
                unitary_value: item.price as f64 / 100.0,
            })
            .collect(),
        package,
        insurance_value: order.subtotal_amount,
    };

    let (client, token) = authorized_client(state).await?;
    let label = client.create_label(&token, &request).await?;

    let mut active: OrderActive = order.into();
    active.shipping_label_id = Set(Some(label.id.clone()));
    active.updated_at = Set(Utc::now().into());
    active.update(&state.orm).await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "shipping_label_create",
        "orders",
        serde_json::json!({ "order_id": order_id, "label_id": label.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Shipping label created",
        LabelCreated {
            order_id,
            label_id: label.id,
            protocol: label.protocol,
            status: label.status,
        },
        Some(Meta::empty()),
    ))
}

/// Tracking for an order. Admins and the owning customer see it directly;
/// guests must give the order email.
pub async fn tracking(
    state: &AppState,
    user: Option<&AuthUser>,
    order_id: Uuid,
    email: Option<&str>,
) -> AppResult<ApiResponse<TrackingInfo>> {
    let order = Orders::find_by_id(order_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let allowed = match user {
        Some(user) if user.is_admin() => true,
        Some(user) if order.user_id == Some(user.user_id) => true,
        _ => email.is_some_and(|e| e.trim().eq_ignore_ascii_case(&order.customer_email)),
    };
    if !allowed {
        return Err(AppError::NotFound);
    }

    let provider = match (&order.shipping_label_id, &state.shipping) {
        (Some(label_id), Some(client)) => match provider_token(state, client).await? {
            Some(token) => client.track(&token, label_id).await?,
            None => None,
        },
        _ => None,
    };

    let tracking_code = order
        .tracking_code
        .clone()
        .or_else(|| provider.as_ref().and_then(|p| p.tracking.clone()));
    let tracking_url = order
        .tracking_url
        .clone()
        .or_else(|| tracking_code.as_deref().map(carrier_tracking_url));

    Ok(ApiResponse::success(
        "Tracking",
        TrackingInfo {
            order_id,
            tracking_code,
            tracking_url,
            provider,
        },
        None,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selects_quoted_option_by_id() {
        let options = fallback::quote("01310100", &Package::from_items([]));
        let sedex = select_option(&options, "fallback-sedex").expect("sedex");
        assert_eq!(sedex.name, "SEDEX");
        assert!(matches!(
            select_option(&options, "local"),
            Err(AppError::BadRequest(_))
        ));
    }
}
