use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::error;

use rankpulse_core::config::Config;
use rankpulse_core::history::HistorySource;
use rankpulse_duckdb::DuckDbBackend;

use crate::error::AppError;

/// Shared application state injected into every Axum handler via
/// [`axum::extract::State`].
pub struct AppState {
    /// The DuckDB backend; serialises access through its own async mutex.
    pub db: Arc<DuckDbBackend>,

    /// Read side used by keyword tables and dashboards. The same backend as
    /// `db`, seen through the [`HistorySource`] trait.
    pub history: Arc<dyn HistorySource>,

    /// Parsed configuration, loaded once at startup from environment variables.
    pub config: Arc<Config>,

    /// In-process cache of known site ids.
    ///
    /// Filled lazily on the first request for a site; entries are removed
    /// when the site is deleted.
    pub site_cache: Arc<RwLock<HashSet<String>>>,
}

impl AppState {
    pub fn new(db: DuckDbBackend, config: Config) -> Self {
        let db = Arc::new(db);
        Self {
            history: db.clone(),
            db,
            config: Arc::new(config),
            site_cache: Arc::new(RwLock::new(HashSet::new())),
        }
    }

    /// Return `true` if `site_id` names a stored site.
    ///
    /// Checks the cache first and falls back to DuckDB; DB errors count as
    /// "not found" and are logged.
    pub async fn is_valid_site(&self, site_id: &str) -> bool {
        {
            let cache = self.site_cache.read().await;
            if cache.contains(site_id) {
                return true;
            }
        }

        match self.db.site_exists(site_id).await {
            Ok(true) => {
                let mut cache = self.site_cache.write().await;
                cache.insert(site_id.to_string());
                true
            }
            Ok(false) => false,
            Err(e) => {
                error!(site_id, error = %e, "site_exists DB lookup failed");
                false
            }
        }
    }

    /// 404 unless `site_id` exists.
    pub async fn require_site(&self, site_id: &str) -> Result<(), AppError> {
        if self.is_valid_site(site_id).await {
            Ok(())
        } else {
            Err(AppError::NotFound(format!("site {site_id} not found")))
        }
    }

    pub async fn remember_site(&self, site_id: &str) {
        self.site_cache.write().await.insert(site_id.to_string());
    }

    pub async fn forget_site(&self, site_id: &str) {
        self.site_cache.write().await.remove(site_id);
    }
}
