//! Melhor Envio REST client.
//!
//! Every call besides the OAuth token exchange needs the store's access token,
//! obtained once through the authorization-code flow and refreshed when it expires.

use std::{sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tracing::instrument;
use url::Url;

use super::{Package, ShippingError, ShippingOption};
use crate::config::ShippingProviderConfig;

const SANDBOX_URL: &str = "https://sandbox.melhorenvio.com.br";
const PRODUCTION_URL: &str = "https://melhorenvio.com.br";
const SCOPES: &str = "cart-read cart-write shipping-calculate shipping-checkout shipping-generate shipping-print shipping-tracking";

/// OAuth token persisted in the settings table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MelhorEnvioToken {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
}

impl MelhorEnvioToken {
    /// Treat tokens as expired a minute early so in-flight calls do not race the expiry.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now + chrono::Duration::seconds(60) >= self.expires_at
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    expires_in: i64,
}

#[derive(Serialize)]
struct TokenRequest<'a> {
    grant_type: &'a str,
    client_id: &'a str,
    client_secret: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    redirect_uri: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    refresh_token: Option<&'a str>,
}

#[derive(Serialize)]
struct PostalCode<'a> {
    postal_code: &'a str,
}

#[derive(Serialize)]
struct PackagePayload {
    height: i32,
    width: i32,
    length: i32,
    weight: f64,
}

impl From<&Package> for PackagePayload {
    fn from(package: &Package) -> Self {
        Self {
            height: package.height_cm,
            width: package.width_cm,
            length: package.length_cm,
            weight: package.weight_kg(),
        }
    }
}

#[derive(Serialize)]
struct QuoteOptions {
    insurance_value: f64,
    receipt: bool,
    own_hand: bool,
}

#[derive(Serialize)]
struct CalculateRequest<'a> {
    from: PostalCode<'a>,
    to: PostalCode<'a>,
    package: PackagePayload,
    options: QuoteOptions,
}

#[derive(Debug, Deserialize)]
struct Company {
    name: String,
}

#[derive(Debug, Deserialize)]
struct CalculatedService {
    id: i64,
    name: String,
    #[serde(default)]
    price: Option<serde_json::Value>,
    #[serde(default)]
    custom_price: Option<serde_json::Value>,
    #[serde(default)]
    delivery_time: Option<i32>,
    #[serde(default)]
    custom_delivery_time: Option<i32>,
    company: Company,
    #[serde(default)]
    error: Option<String>,
}

/// Sender or recipient block of a label request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelParty {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    pub number: String,
    pub complement: Option<String>,
    pub district: String,
    pub city: String,
    pub state_abbr: String,
    pub postal_code: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LabelProduct {
    pub name: String,
    pub quantity: i32,
    pub unitary_value: f64,
}

/// Everything needed to put a shipment into the provider cart.
#[derive(Debug, Clone)]
pub struct LabelRequest {
    pub service_id: i64,
    pub from: LabelParty,
    pub to: LabelParty,
    pub products: Vec<LabelProduct>,
    pub package: Package,
    pub insurance_value: i64,
}

#[derive(Serialize)]
struct CartRequest<'a> {
    service: i64,
    from: &'a LabelParty,
    to: &'a LabelParty,
    products: &'a [LabelProduct],
    volumes: [PackagePayload; 1],
    options: CartOptions,
}

#[derive(Serialize)]
struct CartOptions {
    insurance_value: f64,
    receipt: bool,
    own_hand: bool,
    non_commercial: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
pub struct LabelResponse {
    pub id: String,
    #[serde(default)]
    pub protocol: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Serialize)]
struct TrackingRequest<'a> {
    orders: [&'a str; 1],
}

#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
pub struct ProviderTracking {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub tracking: Option<String>,
    #[serde(default)]
    pub melhorenvio_tracking: Option<String>,
}

#[derive(Clone)]
pub struct MelhorEnvioClient {
    inner: Arc<MelhorEnvioInner>,
}

struct MelhorEnvioInner {
    client: reqwest::Client,
    base_url: String,
    client_id: String,
    client_secret: SecretString,
    redirect_uri: String,
}

impl MelhorEnvioClient {
    pub fn new(config: &ShippingProviderConfig, public_base_url: &str) -> Result<Self, ShippingError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent)
                .map_err(|e| ShippingError::Parse(format!("Invalid user agent: {e}")))?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(15))
            .build()?;

        let base_url = if config.sandbox {
            SANDBOX_URL
        } else {
            PRODUCTION_URL
        };

        Ok(Self {
            inner: Arc::new(MelhorEnvioInner {
                client,
                base_url: base_url.to_string(),
                client_id: config.client_id.clone(),
                client_secret: config.client_secret.clone(),
                redirect_uri: format!("{public_base_url}/api/shipping/oauth/callback"),
            }),
        })
    }

    /// URL the store owner visits to grant access to the shipping account.
    pub fn authorize_url(&self, state: &str) -> Result<String, ShippingError> {
        let mut url = Url::parse(&format!("{}/oauth/authorize", self.inner.base_url))
            .map_err(|e| ShippingError::Parse(e.to_string()))?;
        url.query_pairs_mut()
            .append_pair("client_id", &self.inner.client_id)
            .append_pair("redirect_uri", &self.inner.redirect_uri)
            .append_pair("response_type", "code")
            .append_pair("scope", SCOPES)
            .append_pair("state", state);
        Ok(url.into())
    }

    #[instrument(skip(self, code))]
    pub async fn exchange_code(&self, code: &str) -> Result<MelhorEnvioToken, ShippingError> {
        self.request_token(TokenRequest {
            grant_type: "authorization_code",
            client_id: &self.inner.client_id,
            client_secret: self.inner.client_secret.expose_secret(),
            redirect_uri: Some(&self.inner.redirect_uri),
            code: Some(code),
            refresh_token: None,
        })
        .await
    }

    #[instrument(skip_all)]
    pub async fn refresh(&self, refresh_token: &str) -> Result<MelhorEnvioToken, ShippingError> {
        self.request_token(TokenRequest {
            grant_type: "refresh_token",
            client_id: &self.inner.client_id,
            client_secret: self.inner.client_secret.expose_secret(),
            redirect_uri: None,
            code: None,
            refresh_token: Some(refresh_token),
        })
        .await
    }

    async fn request_token(&self, body: TokenRequest<'_>) -> Result<MelhorEnvioToken, ShippingError> {
        let now = Utc::now();
        let url = format!("{}/oauth/token", self.inner.base_url);
        let response = self.inner.client.post(&url).json(&body).send().await?;
        let token: TokenResponse = handle_response(response).await?;
        Ok(MelhorEnvioToken {
            access_token: token.access_token,
            refresh_token: token.refresh_token,
            expires_at: now + chrono::Duration::seconds(token.expires_in),
        })
    }

    /// Quote every service the account has enabled for this package.
    #[instrument(skip(self, token, package))]
    pub async fn calculate(
        &self,
        token: &MelhorEnvioToken,
        from: &str,
        to: &str,
        package: &Package,
        insurance_value: i64,
    ) -> Result<Vec<ShippingOption>, ShippingError> {
        let body = CalculateRequest {
            from: PostalCode { postal_code: from },
            to: PostalCode { postal_code: to },
            package: package.into(),
            options: QuoteOptions {
                insurance_value: cents_to_reais(insurance_value),
                receipt: false,
                own_hand: false,
            },
        };
        let services: Vec<CalculatedService> = self
            .post(token, "/api/v2/me/shipment/calculate", &body)
            .await?;
        Ok(options_from_services(services))
    }

    /// Put a shipment in the provider cart, which is how labels are created.
    #[instrument(skip(self, token, request), fields(service = request.service_id))]
    pub async fn create_label(
        &self,
        token: &MelhorEnvioToken,
        request: &LabelRequest,
    ) -> Result<LabelResponse, ShippingError> {
        let body = CartRequest {
            service: request.service_id,
            from: &request.from,
            to: &request.to,
            products: &request.products,
            volumes: [(&request.package).into()],
            options: CartOptions {
                insurance_value: cents_to_reais(request.insurance_value),
                receipt: false,
                own_hand: false,
                non_commercial: true,
            },
        };
        self.post(token, "/api/v2/me/cart", &body).await
    }

    #[instrument(skip(self, token))]
    pub async fn track(
        &self,
        token: &MelhorEnvioToken,
        label_id: &str,
    ) -> Result<Option<ProviderTracking>, ShippingError> {
        let body = TrackingRequest { orders: [label_id] };
        let mut result: std::collections::HashMap<String, ProviderTracking> = self
            .post(token, "/api/v2/me/shipment/tracking", &body)
            .await?;
        Ok(result.remove(label_id))
    }

    async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        token: &MelhorEnvioToken,
        path: &str,
        body: &B,
    ) -> Result<T, ShippingError> {
        let url = format!("{}{path}", self.inner.base_url);
        let response = self
            .inner
            .client
            .post(&url)
            .bearer_auth(&token.access_token)
            .json(body)
            .send()
            .await?;
        handle_response(response).await
    }
}

async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ShippingError> {
    let status = response.status();
    if status == reqwest::StatusCode::UNAUTHORIZED {
        return Err(ShippingError::NotAuthorized);
    }
    if !status.is_success() {
        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        return Err(ShippingError::Api {
            status: status.as_u16(),
            message,
        });
    }
    let text = response.text().await?;
    serde_json::from_str(&text).map_err(|e| ShippingError::Parse(e.to_string()))
}

/// Services that returned an error (not available for the route) are dropped.
fn options_from_services(services: Vec<CalculatedService>) -> Vec<ShippingOption> {
    services
        .into_iter()
        .filter(|service| service.error.is_none())
        .filter_map(|service| {
            let price = service
                .custom_price
                .as_ref()
                .or(service.price.as_ref())
                .and_then(price_to_cents)?;
            Some(ShippingOption {
                id: service.id.to_string(),
                name: service.name,
                company: service.company.name,
                price,
                delivery_days: service
                    .custom_delivery_time
                    .or(service.delivery_time)
                    .unwrap_or(0),
            })
        })
        .collect()
}

/// Prices come back either as JSON numbers or as decimal strings like `"23.50"`.
fn price_to_cents(value: &serde_json::Value) -> Option<i64> {
    let reais = match value {
        serde_json::Value::Number(n) => n.as_f64()?,
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    Some((reais * 100.0).round() as i64)
}

fn cents_to_reais(cents: i64) -> f64 {
    cents as f64 / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_calculate_response_and_skips_unavailable_services() {
        let body = serde_json::json!([
            {
                "id": 1,
                "name": "PAC",
                "price": "23.50",
                "custom_price": "21.90",
                "delivery_time": 9,
                "custom_delivery_time": 10,
                "company": { "id": 1, "name": "Correios" }
            },
            {
                "id": 2,
                "name": "SEDEX",
                "price": 41.3,
                "delivery_time": 3,
                "company": { "id": 1, "name": "Correios" }
            },
            {
                "id": 3,
                "name": ".Package",
                "error": "Serviço indisponível para o trecho.",
                "company": { "id": 2, "name": "Jadlog" }
            }
        ]);
        let services: Vec<CalculatedService> = serde_json::from_value(body).expect("services");
        let options = options_from_services(services);

        assert_eq!(options.len(), 2);
        assert_eq!(options[0].id, "1");
        assert_eq!(options[0].price, 2_190);
        assert_eq!(options[0].delivery_days, 10);
        assert_eq!(options[1].price, 4_130);
        assert_eq!(options[1].company, "Correios");
    }

    #[test]
    fn token_expiry_has_a_safety_margin() {
        let now = Utc::now();
        let token = MelhorEnvioToken {
            access_token: "a".into(),
            refresh_token: "r".into(),
            expires_at: now + chrono::Duration::seconds(30),
        };
        assert!(token.is_expired(now));

        let fresh = MelhorEnvioToken {
            expires_at: now + chrono::Duration::hours(1),
            ..token
        };
        assert!(!fresh.is_expired(now));
    }

    #[test]
    fn authorize_url_carries_client_and_redirect() {
        let client = MelhorEnvioClient::new(
            &ShippingProviderConfig {
                client_id: "123".into(),
                client_secret: SecretString::from("secret".to_string()),
                sandbox: true,
                user_agent: "Loja (contato@loja.com)".into(),
            },
            "https://loja.example.com",
        )
        .expect("client");

        let url = client.authorize_url("xyz").expect("url");
        assert!(url.starts_with("https://sandbox.melhorenvio.com.br/oauth/authorize?"));
        assert!(url.contains("client_id=123"));
        assert!(url.contains("state=xyz"));
        assert!(url.contains(
            "redirect_uri=https%3A%2F%2Floja.example.com%2Fapi%2Fshipping%2Foauth%2Fcallback"
        ));
    }
}
