pub mod form;

use axum::Router;
use axum::routing::get;

use crate::state::SharedState;

pub fn view_routes() -> Router<SharedState> {
    Router::new()
        .route("/", get(form::form_page).post(form::submit))
        .route("/success/", get(form::success_page))
}
