//! Application state shared across handlers

use sqlx::SqlitePool;

use crate::config::AppConfig;
use crate::models::{Page, PageError, PageParams};

pub struct AppState {
    pool: SqlitePool,
    config: AppConfig,
}

impl AppState {
    pub fn new(pool: SqlitePool, config: AppConfig) -> Self {
        Self { pool, config }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Resolve query-string pagination against the configured limits.
    pub fn page(&self, params: PageParams) -> Result<Page, PageError> {
        Page::resolve(params, self.config.default_limit, self.config.max_limit)
    }
}
