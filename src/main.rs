use actix_web::web;
use anyhow::Context;
use back_crud::{config::AppConfig, db, routes, state::AppState};
use log::info;
use shuttle_actix_web::ShuttleActixWeb;
use shuttle_runtime::SecretStore;

#[shuttle_runtime::main]
async fn main(
    #[shuttle_runtime::Secrets] secrets: SecretStore,
) -> ShuttleActixWeb<impl FnOnce(&mut web::ServiceConfig) + Send + Clone + 'static> {
    // The runtime may already own the global logger.
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();

    info!("starting server");

    let config = AppConfig::from_lookup(|key| secrets.get(key).or_else(|| std::env::var(key).ok()))
        .context("invalid configuration")?;

    let pool = db::connect(&config)
        .await
        .context("failed to open database")?;
    db::migrate(&pool).await.context("failed migrations")?;

    let state = web::Data::new(AppState::new(pool, config));
    Ok(routes::configure(state).into())
}
