use std::sync::Arc;

use crate::config::{AppConfig, StoreBackend};
use crate::db;
use crate::storage::{S3PhotoStorage, StorageClient};
use crate::trix::{MemoryTrixStore, PgTrixStore, TrixStore};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn TrixStore>,
    pub config: Arc<AppConfig>,
    pub storage: Arc<dyn StorageClient>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let store = match &config.store {
            StoreBackend::Postgres {
                database_url,
                max_connections,
            } => {
                let pool = db::connect(database_url, *max_connections).await?;
                db::migrate(&pool).await;
                Arc::new(PgTrixStore::new(pool)) as Arc<dyn TrixStore>
            }
            StoreBackend::Memory => {
                tracing::warn!("using in-memory trix store; records are lost on restart");
                Arc::new(MemoryTrixStore::new()) as Arc<dyn TrixStore>
            }
        };

        let storage = Arc::new(S3PhotoStorage::connect(&config.minio).await?) as Arc<dyn StorageClient>;

        Ok(Self {
            store,
            config,
            storage,
        })
    }

    pub fn from_parts(
        store: Arc<dyn TrixStore>,
        config: Arc<AppConfig>,
        storage: Arc<dyn StorageClient>,
    ) -> Self {
        Self {
            store,
            config,
            storage,
        }
    }
}
