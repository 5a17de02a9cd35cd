use axum::extract::Request;
use axum::http::{StatusCode, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

/// Middleware that turns 401 responses into a redirect to `/auth/login/`,
/// which starts the identity-broker flow.
pub async fn redirect_unauthorized(req: Request, next: Next) -> Response {
    let response = next.run(req).await;
    if response.status() == StatusCode::UNAUTHORIZED {
        (StatusCode::FOUND, [(header::LOCATION, "/auth/login/")]).into_response()
    } else {
        response
    }
}
