use askama::Template;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};

use crate::ticket::TicketingError;

#[derive(Debug)]
pub enum AppError {
    Unauthorized,
    BadRequest(String),
    Ticketing(TicketingError),
    Internal(String),
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::Unauthorized => write!(f, "Unauthorized"),
            AppError::BadRequest(msg) => write!(f, "Bad Request: {msg}"),
            AppError::Ticketing(err) => write!(f, "Ticketing Error: {err}"),
            AppError::Internal(msg) => write!(f, "Internal Error: {msg}"),
        }
    }
}

#[derive(Template)]
#[template(path = "error.html")]
struct ErrorTemplate {
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            // Turned into a login redirect for browser requests by
            // the view-route middleware.
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "Sign in required".to_string()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Ticketing(err) => {
                tracing::error!("Ticket creation failed: {err}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Your request could not be submitted. Please try again.".to_string(),
                )
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Something went wrong. Please try again.".to_string(),
                )
            }
        };

        let template = ErrorTemplate { message };
        (status, Html(template.render().unwrap_or_default())).into_response()
    }
}

impl From<TicketingError> for AppError {
    fn from(err: TicketingError) -> Self {
        AppError::Ticketing(err)
    }
}
