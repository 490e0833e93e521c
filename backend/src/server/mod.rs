//! Server construction and middleware wiring.

mod config;
mod state_builders;

pub use config::ServerConfig;
pub(crate) use state_builders::{build_document_store, build_profile_cache};

use actix_web::dev::{Server, ServerHandle, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use tracing::{info, warn};

use postboard::Trace;
#[cfg(debug_assertions)]
use postboard::doc::ApiDoc;
use postboard::inbound::http::accounts::{current_user, login, logout, signup, update_profile};
use postboard::inbound::http::health::{HealthState, live, ready};
use postboard::inbound::http::json_error_handler;
use postboard::inbound::http::posts::{create_post, list_posts};
use postboard::inbound::http::session_config::SessionSettings;
use postboard::inbound::http::state::HttpState;
use postboard::inbound::http::users::{
    follow, following_status, unfollow, user_posts, view_profile,
};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

use state_builders::build_http_state;

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    session: SessionSettings,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        session,
    } = deps;

    let api = web::scope("/api/v1")
        .wrap(session.middleware())
        .service(signup)
        .service(login)
        .service(logout)
        .service(current_user)
        .service(update_profile)
        .service(view_profile)
        .service(follow)
        .service(unfollow)
        .service(following_status)
        .service(user_posts)
        .service(create_post)
        .service(list_posts);

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .wrap(Trace)
        .service(api)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

/// Bind the listener and mark the health state ready.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let ServerConfig {
        session,
        bind_addr,
        store,
        profile_cache,
    } = config;
    let http_state = build_http_state(store, profile_cache);
    let server_health_state = health_state.clone();

    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
            session: session.clone(),
        })
    })
    .disable_signals()
    .bind(bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}

/// Fail liveness, then stop accepting and let in-flight requests finish.
pub(crate) async fn drain(health_state: &HealthState, handle: ServerHandle) {
    health_state.mark_unhealthy();
    info!("draining before shutdown");
    handle.stop(true).await;
}

async fn shutdown_signal() -> std::io::Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut terminate = signal(SignalKind::terminate())?;
        tokio::select! {
            res = tokio::signal::ctrl_c() => res,
            _ = terminate.recv() => Ok(()),
        }
    }
    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await
    }
}

/// Wait for Ctrl-C or SIGTERM, then [`drain`] the server.
pub(crate) async fn drain_on_shutdown_signal(
    health_state: web::Data<HealthState>,
    handle: ServerHandle,
) {
    if let Err(err) = shutdown_signal().await {
        warn!(error = %err, "shutdown signal listener failed; draining now");
    }
    drain(&health_state, handle).await;
}
