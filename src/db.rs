//! Storage bootstrap and the per-request session.

use std::future::Future;
use std::pin::Pin;
use std::str::FromStr;
use std::time::Duration;

use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use log::{debug, info};
use sqlx::pool::PoolConnection;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Sqlite, SqliteConnection, SqlitePool};
use thiserror::Error;

use crate::config::AppConfig;
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
    #[error("{resource} with ID {id} not found")]
    NotFound { resource: &'static str, id: i64 },
    #[error("stored {resource} {id} is unreadable: {reason}")]
    Corrupt {
        resource: &'static str,
        id: i64,
        reason: String,
    },
}

/// Open the pool described by `config`.
///
/// An in-memory database lives only as long as its connection, so it gets
/// exactly one connection that is never recycled.
pub async fn connect(config: &AppConfig) -> Result<SqlitePool, DbError> {
    let options = SqliteConnectOptions::from_str(&config.database_url)?
        .foreign_keys(true)
        .busy_timeout(Duration::from_secs(5));

    let pool = if config.is_in_memory() {
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?
    } else {
        SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?
    };

    info!("connected to {}", config.database_url);
    Ok(pool)
}

pub async fn migrate(pool: &SqlitePool) -> Result<(), DbError> {
    sqlx::migrate!().run(pool).await?;
    info!("database migrations complete");
    Ok(())
}

/// One pooled connection, held for the lifetime of a single request.
///
/// Acquired before the handler body runs; dropping it (on success, on an
/// error return, or on unwind) hands the connection back to the pool.
pub struct Session {
    conn: PoolConnection<Sqlite>,
}

impl Session {
    pub async fn acquire(pool: &SqlitePool) -> Result<Self, DbError> {
        let conn = pool.acquire().await?;
        debug!("session acquired");
        Ok(Self { conn })
    }

    pub fn conn(&mut self) -> &mut SqliteConnection {
        &mut self.conn
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        debug!("session released");
    }
}

impl FromRequest for Session {
    type Error = ApiError;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let state = req.app_data::<web::Data<AppState>>().cloned();
        Box::pin(async move {
            let state = state
                .ok_or_else(|| ApiError::Internal("application state is not registered".into()))?;
            Ok(Session::acquire(state.pool()).await?)
        })
    }
}
