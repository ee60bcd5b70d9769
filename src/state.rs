use std::sync::Arc;

use crate::{
    blob::BlobStore,
    config::AppConfig,
    db::{DbPool, OrmConn, create_orm_conn},
    email::EmailClient,
    shipping::MelhorEnvioClient,
};

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub orm: OrmConn,
    pub config: Arc<AppConfig>,
    pub shipping: Option<MelhorEnvioClient>,
    pub mailer: Option<EmailClient>,
    pub blobs: BlobStore,
}

impl AppState {
    /// Wire the database and the optional integration clients from configuration.
    pub fn new(pool: DbPool, config: AppConfig) -> anyhow::Result<Self> {
        let orm = create_orm_conn(&pool);
        let shipping = config
            .shipping
            .as_ref()
            .map(|cfg| MelhorEnvioClient::new(cfg, &config.public_base_url))
            .transpose()?;
        let mailer = config.email.as_ref().map(EmailClient::new).transpose()?;
        let blobs = BlobStore::new(config.blob.as_ref())?;

        if shipping.is_none() {
            tracing::info!("shipping provider not configured, using fallback rates");
        }
        if mailer.is_none() {
            tracing::info!("email provider not configured, notifications are disabled");
        }

        Ok(Self {
            pool,
            orm,
            config: Arc::new(config),
            shipping,
            mailer,
            blobs,
        })
    }
}
