//! postboard entry point: loads settings, picks the document store and serves
//! the HTTP API.

mod server;

use actix_web::web;
use mockable::DefaultEnv;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use postboard::inbound::http::health::HealthState;
use postboard::inbound::http::session_config::{BuildMode, session_settings_from_env};
use postboard::settings::AppSettings;
use server::{
    ServerConfig, build_document_store, build_profile_cache, create_server,
    drain_on_shutdown_signal,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load().map_err(|e| std::io::Error::other(e.to_string()))?;
    let bind_addr = settings
        .bind_addr()
        .map_err(|e| std::io::Error::other(e.to_string()))?;
    let session =
        session_settings_from_env(&DefaultEnv::new(), BuildMode::from_debug_assertions())
            .map_err(|e| std::io::Error::other(e.to_string()))?;

    let store = build_document_store(&settings).await?;
    let mut config = ServerConfig::new(session, bind_addr, store);
    if let Some(cache) = build_profile_cache(&settings) {
        config = config.with_profile_cache(cache);
    }

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state.clone(), config)?;
    actix_web::rt::spawn(drain_on_shutdown_signal(health_state, server.handle()));
    info!(%bind_addr, "postboard listening");
    server.await
}
