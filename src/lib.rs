pub mod auth;
pub mod config;
pub mod error;
pub mod middleware;
pub mod notify;
pub mod routes;
pub mod scan;
pub mod schema;
pub mod session;
pub mod state;
pub mod submission;
pub mod ticket;
pub mod views;

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderName, HeaderValue};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::auth::profile::ProfileClient;
use crate::config::Config;
use crate::middleware::auth_redirect::redirect_unauthorized;
use crate::notify::Notifier;
use crate::scan::Scanner;
use crate::session::SessionStore;
use crate::state::{AppState, SharedState};

pub fn build_app(config: Config) -> (Router, SharedState) {
    let backend = ticket::backend_from_config(&config.backend);
    tracing::info!("Ticketing backend: {}", backend.id());

    let max_body_size = config.max_body_size;

    let state: SharedState = Arc::new(AppState {
        sessions: SessionStore::new(),
        scanner: Scanner::new(&config.av),
        notifier: Notifier::new(config.slack.clone()),
        profiles: ProfileClient::new(&config.authbroker),
        http: reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .expect("Failed to build reqwest client"),
        backend,
        config,
    });

    let app = Router::new()
        .merge(routes::auth_routes())
        .merge(views::view_routes().layer(axum::middleware::from_fn(redirect_unauthorized)))
        .route("/check/", axum::routing::get(healthcheck))
        .layer(DefaultBodyLimit::max(max_body_size))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-content-type-options"),
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-frame-options"),
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("referrer-policy"),
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state.clone());

    (app, state)
}

async fn healthcheck() -> &'static str {
    "OK"
}
