use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    cart::CartItemInput,
    shipping::{ShippingOption, melhor_envio::ProviderTracking},
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct ShippingQuoteRequest {
    pub postal_code: String,
    pub items: Vec<CartItemInput>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum QuoteSource {
    Provider,
    Fallback,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ShippingQuote {
    pub postal_code: String,
    pub source: QuoteSource,
    pub options: Vec<ShippingOption>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct TrackingQuery {
    pub email: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TrackingInfo {
    pub order_id: Uuid,
    pub tracking_code: Option<String>,
    pub tracking_url: Option<String>,
    pub provider: Option<ProviderTracking>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct OAuthCallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AuthorizeUrl {
    pub url: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProviderStatus {
    pub configured: bool,
    pub authorized: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LabelCreated {
    pub order_id: Uuid,
    pub label_id: String,
    pub protocol: Option<String>,
    pub status: Option<String>,
}
