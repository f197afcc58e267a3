#![allow(dead_code)]

use actix_web::web;
use back_crud::{config::AppConfig, db, state::AppState};

/// Fresh in-memory database with migrations applied.
pub async fn state() -> web::Data<AppState> {
    let _ = env_logger::builder().is_test(true).try_init();

    let config = AppConfig::in_memory();
    let pool = db::connect(&config).await.expect("in-memory pool");
    db::migrate(&pool).await.expect("migrations");
    web::Data::new(AppState::new(pool, config))
}

/// Same as [`state`] but with a small page size so limits are easy to observe.
pub async fn state_with_limits(default_limit: u32, max_limit: u32) -> web::Data<AppState> {
    let _ = env_logger::builder().is_test(true).try_init();

    let config = AppConfig {
        default_limit,
        max_limit,
        ..AppConfig::in_memory()
    };
    let pool = db::connect(&config).await.expect("in-memory pool");
    db::migrate(&pool).await.expect("migrations");
    web::Data::new(AppState::new(pool, config))
}
