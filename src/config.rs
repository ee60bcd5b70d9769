//! Application configuration loaded from environment variables.
//!
//! Required: `DATABASE_URL`, `JWT_SECRET`.
//!
//! Integrations are enabled only when their variables are present:
//! - shipping provider: `MELHOR_ENVIO_CLIENT_ID`, `MELHOR_ENVIO_CLIENT_SECRET`,
//!   `MELHOR_ENVIO_SANDBOX`, `MELHOR_ENVIO_USER_AGENT`
//! - email provider: `RESEND_API_KEY`, `EMAIL_FROM`
//! - blob storage: `BLOB_READ_WRITE_TOKEN`, `BLOB_API_URL`
//! - payment webhook: `PAYMENT_WEBHOOK_SECRET`

use std::env;

use anyhow::Context;
use secrecy::SecretString;

const DEFAULT_STORE_NAME: &str = "Ateliê Bordados";
const DEFAULT_ORIGIN_POSTAL_CODE: &str = "28900000";
const DEFAULT_BLOB_API_URL: &str = "https://blob.vercel-storage.com";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub jwt_secret: SecretString,
    pub public_base_url: String,
    pub store: StoreConfig,
    pub shipping: Option<ShippingProviderConfig>,
    pub email: Option<EmailConfig>,
    pub blob: Option<BlobConfig>,
    pub payment_webhook_secret: Option<SecretString>,
}

#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub name: String,
    pub origin_postal_code: String,
    pub admin_email: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ShippingProviderConfig {
    pub client_id: String,
    pub client_secret: SecretString,
    pub sandbox: bool,
    pub user_agent: String,
}

#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub api_key: SecretString,
    pub from_address: String,
}

#[derive(Debug, Clone)]
pub struct BlobConfig {
    pub token: SecretString,
    pub api_url: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup, so tests do not touch the process env.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let database_url = get("DATABASE_URL").context("DATABASE_URL is not set")?;
        let jwt_secret = get("JWT_SECRET").context("JWT_SECRET is not set")?;
        let host = get("APP_HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let port = get("APP_PORT")
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);
        let public_base_url = get("PUBLIC_BASE_URL")
            .unwrap_or_else(|| format!("http://localhost:{port}"))
            .trim_end_matches('/')
            .to_string();

        let store = StoreConfig {
            name: get("STORE_NAME").unwrap_or_else(|| DEFAULT_STORE_NAME.to_string()),
            origin_postal_code: get("STORE_ORIGIN_POSTAL_CODE")
                .unwrap_or_else(|| DEFAULT_ORIGIN_POSTAL_CODE.to_string()),
            admin_email: get("ADMIN_EMAIL"),
        };

        let shipping = match (get("MELHOR_ENVIO_CLIENT_ID"), get("MELHOR_ENVIO_CLIENT_SECRET")) {
            (Some(client_id), Some(secret)) => Some(ShippingProviderConfig {
                client_id,
                client_secret: SecretString::from(secret),
                sandbox: get("MELHOR_ENVIO_SANDBOX")
                    .map(|v| parse_bool(&v))
                    .unwrap_or(true),
                user_agent: get("MELHOR_ENVIO_USER_AGENT")
                    .unwrap_or_else(|| format!("{} (loja)", store.name)),
            }),
            _ => None,
        };

        let email = get("RESEND_API_KEY").map(|api_key| EmailConfig {
            api_key: SecretString::from(api_key),
            from_address: get("EMAIL_FROM")
                .unwrap_or_else(|| format!("{} <pedidos@resend.dev>", store.name)),
        });

        let blob = get("BLOB_READ_WRITE_TOKEN").map(|token| BlobConfig {
            token: SecretString::from(token),
            api_url: get("BLOB_API_URL")
                .unwrap_or_else(|| DEFAULT_BLOB_API_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
        });

        Ok(Self {
            database_url,
            host,
            port,
            jwt_secret: SecretString::from(jwt_secret),
            public_base_url,
            store,
            shipping,
            email,
            blob,
            payment_webhook_secret: get("PAYMENT_WEBHOOK_SECRET").map(SecretString::from),
        })
    }
}

fn parse_bool(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn requires_database_url_and_jwt_secret() {
        assert!(AppConfig::from_lookup(lookup(&[("JWT_SECRET", "s")])).is_err());
        assert!(AppConfig::from_lookup(lookup(&[("DATABASE_URL", "postgres://x")])).is_err());
    }

    #[test]
    fn integrations_are_disabled_without_credentials() {
        let config = AppConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://x"),
            ("JWT_SECRET", "s"),
        ]))
        .expect("config");
        assert_eq!(config.port, 3000);
        assert_eq!(config.store.origin_postal_code, DEFAULT_ORIGIN_POSTAL_CODE);
        assert!(config.shipping.is_none());
        assert!(config.email.is_none());
        assert!(config.blob.is_none());
    }

    #[test]
    fn shipping_provider_needs_both_id_and_secret() {
        let partial = AppConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://x"),
            ("JWT_SECRET", "s"),
            ("MELHOR_ENVIO_CLIENT_ID", "42"),
        ]))
        .expect("config");
        assert!(partial.shipping.is_none());

        let full = AppConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://x"),
            ("JWT_SECRET", "s"),
            ("MELHOR_ENVIO_CLIENT_ID", "42"),
            ("MELHOR_ENVIO_CLIENT_SECRET", "shh"),
            ("MELHOR_ENVIO_SANDBOX", "false"),
        ]))
        .expect("config");
        let shipping = full.shipping.expect("shipping config");
        assert_eq!(shipping.client_id, "42");
        assert!(!shipping.sandbox);
    }

    #[test]
    fn public_base_url_drops_trailing_slash() {
        let config = AppConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://x"),
            ("JWT_SECRET", "s"),
            ("PUBLIC_BASE_URL", "https://loja.example.com/"),
        ]))
        .expect("config");
        assert_eq!(config.public_base_url, "https://loja.example.com");
    }
}
