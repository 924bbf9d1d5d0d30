use std::{net::SocketAddr, sync::Arc};

use axum::{
    routing::{get, patch, post},
    Router,
};
use server_api::{ApiContext, TokenConfig};
use storage::Storage;
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

mod app_state;
mod config;
mod routes;
mod session;

use app_state::AppState;
use config::{load_settings, prepare_database_url, DEV_JWT_SECRET};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = load_settings()?;
    if settings.jwt_secret == DEV_JWT_SECRET {
        warn!("using the development JWT secret; set APP__JWT_SECRET in production");
    }
    let database_url = prepare_database_url(&settings.database_url)?;
    let storage = Storage::new(&database_url).await.map_err(|error| {
        error!(
            %database_url,
            %error,
            "failed to open SQLite database; verify parent directory exists and permissions are correct"
        );
        error
    })?;
    let api = ApiContext::new(
        storage,
        TokenConfig {
            issuer: settings.jwt_issuer.clone(),
            secret: settings.jwt_secret.clone(),
            ttl_seconds: settings.token_ttl_seconds,
        },
    )
    .with_messaging_host(settings.messaging_host.clone());

    let app = build_router(Arc::new(AppState { api }), settings.max_body_bytes);

    let addr: SocketAddr = settings.bind_addr.parse()?;
    info!(%addr, messaging_host = %settings.messaging_host, "server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: Arc<AppState>, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/healthz", get(routes::healthz))
        .route("/auth/login", post(routes::login))
        .route("/auth/register", post(routes::register))
        .route("/auth/me", get(routes::me))
        .route("/menu", get(routes::menu))
        .route("/dashboard", get(routes::dashboard_view))
        .route(
            "/settings",
            get(routes::get_settings).patch(routes::update_settings),
        )
        .route("/stores", get(routes::list_stores))
        .route("/stores/:store_id", patch(routes::update_store))
        .route("/users", get(routes::list_users).post(routes::create_user))
        .route("/users/stats", get(routes::user_stats))
        .route("/users/:user_id", patch(routes::update_user))
        .route(
            "/my/store",
            get(routes::my_store).patch(routes::update_my_store),
        )
        .route(
            "/my/items",
            get(routes::list_items).post(routes::create_item),
        )
        .route(
            "/my/items/:item_id",
            patch(routes::update_item).delete(routes::delete_item),
        )
        .route("/my/orders", get(routes::list_orders))
        .route("/my/orders/stats", get(routes::order_stats))
        .route(
            "/my/orders/:order_id/status",
            patch(routes::set_order_status),
        )
        .route("/public/stores/:slug", get(routes::public_store))
        .route("/public/stores/:slug/checkout", post(routes::checkout))
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
