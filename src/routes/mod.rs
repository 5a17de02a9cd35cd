pub mod auth;

use axum::Router;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;

use crate::state::SharedState;

pub fn auth_routes() -> Router<SharedState> {
    Router::new()
        .route("/auth/login/", get(auth::login))
        .route("/auth/callback/", get(auth::callback))
}

/// 302 redirect. `axum::response::Redirect` only offers 303/307/308; the
/// post-submit and login redirects here are plain Found responses.
pub fn found(location: &str) -> Response {
    (
        StatusCode::FOUND,
        [(header::LOCATION, location.to_string())],
    )
        .into_response()
}
