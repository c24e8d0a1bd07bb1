//! Shared application state

use crate::config::Config;
use crate::services::storage::{FsStorage, ObjectStorage};
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;
use std::sync::Arc;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// State shared by every request handler
#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub storage: Arc<dyn ObjectStorage>,
    pub config: Arc<Config>,
}

impl AppState {
    /// Connect to the database, run migrations and wire up storage
    pub async fn new(config: Config) -> Result<Self, BoxError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&config.database_url)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        let storage = Arc::new(FsStorage::new(
            config.storage_root.clone().into(),
            config.public_base_url.clone(),
        ));

        Ok(Self {
            pool,
            storage,
            config: Arc::new(config),
        })
    }
}
