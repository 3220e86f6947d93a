use std::sync::Arc;

use crate::config::AppConfig;
use crate::db;
use crate::error::AppResult;
use crate::repository::memory::MemoryStore;
use crate::repository::postgres::PgStore;
use crate::repository::MarketplaceStore;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn MarketplaceStore>,
    /// "postgres" or "memory" — surfaced by the health endpoint.
    pub store_kind: &'static str,
}

impl AppState {
    pub fn build(config: AppConfig) -> AppResult<Self> {
        let (store, store_kind): (Arc<dyn MarketplaceStore>, &'static str) =
            match config.database_url.as_deref() {
                Some(url) => {
                    let pool = db::build_pool(&config, url)?;
                    (Arc::new(PgStore::new(pool)), "postgres")
                }
                None => {
                    tracing::warn!(
                        "DATABASE_URL is not set — using the in-memory store; all data is lost on restart"
                    );
                    (Arc::new(MemoryStore::new()), "memory")
                }
            };

        Ok(Self {
            config: Arc::new(config),
            store,
            store_kind,
        })
    }
}
