//! Shipping rates: the local fallback table and the Melhor Envio REST client.
//!
//! When the provider is not configured (or has not been authorized yet) quotes
//! come from [`fallback::quote`]. Destinations inside the store's own region
//! always get the free local delivery option.

pub mod fallback;
pub mod melhor_envio;
pub mod package;

pub use melhor_envio::{MelhorEnvioClient, MelhorEnvioToken};
pub use package::Package;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Postal code prefix served by the store's own courier.
pub const LOCAL_POSTAL_PREFIX: &str = "289";

/// Identifier of the local delivery option.
pub const LOCAL_DELIVERY_ID: &str = "local";

#[derive(Debug, Error)]
pub enum ShippingError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Shipping provider error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Invalid postal code: {0}")]
    InvalidPostalCode(String),

    #[error("Shipping provider is not authorized")]
    NotAuthorized,

    #[error("Parse error: {0}")]
    Parse(String),
}

/// A shipping option offered to the customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ShippingOption {
    pub id: String,
    pub name: String,
    pub company: String,
    /// Price in centavos.
    pub price: i64,
    pub delivery_days: i32,
}

/// Strip formatting from a CEP and require exactly eight digits.
pub fn normalize_postal_code(raw: &str) -> Result<String, ShippingError> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    let only_allowed = raw
        .chars()
        .all(|c| c.is_ascii_digit() || c == '-' || c == '.' || c.is_whitespace());
    if digits.len() != 8 || !only_allowed {
        return Err(ShippingError::InvalidPostalCode(raw.to_string()));
    }
    Ok(digits)
}

/// Whether a normalized postal code is served by local delivery.
pub fn is_local(postal_code: &str) -> bool {
    postal_code.starts_with(LOCAL_POSTAL_PREFIX)
}

/// The free local delivery option.
pub fn local_delivery() -> ShippingOption {
    ShippingOption {
        id: LOCAL_DELIVERY_ID.to_string(),
        name: "Entrega local".to_string(),
        company: "Ateliê".to_string(),
        price: 0,
        delivery_days: 1,
    }
}

/// Build a public tracking link for a carrier tracking code.
pub fn tracking_url(tracking_code: &str) -> String {
    format!("https://www.melhorrastreio.com.br/rastreio/{tracking_code}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_formatted_postal_codes() {
        assert_eq!(normalize_postal_code("28900-000").unwrap(), "28900000");
        assert_eq!(normalize_postal_code(" 01310.100 ").unwrap(), "01310100");
    }

    #[test]
    fn rejects_malformed_postal_codes() {
        assert!(normalize_postal_code("1234").is_err());
        assert!(normalize_postal_code("2989O-000").is_err());
        assert!(normalize_postal_code("").is_err());
    }

    #[test]
    fn local_prefix_detection() {
        assert!(is_local("28950000"));
        assert!(is_local("28900123"));
        assert!(!is_local("29890000"));
        assert!(!is_local("01310100"));
    }
}
