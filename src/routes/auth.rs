use axum::extract::{Query, State};
use axum::response::Response;
use axum_extra::extract::CookieJar;
use serde::Deserialize;

use crate::auth::client;
use crate::error::AppError;
use crate::session;
use crate::state::SharedState;

use super::found;

/// Start the OAuth2 authorization-code flow: store a fresh state nonce in
/// the session and send the browser to the identity broker.
pub async fn login(State(state): State<SharedState>, jar: CookieJar) -> (CookieJar, Response) {
    let (sid, jar) = session::session_id_or_create(&state.sessions, jar);

    let nonce = client::new_state_nonce();
    state.sessions.set_oauth_state(sid, nonce.clone());

    let url = client::authorization_url(&state.config.authbroker, &state.config.base_url, &nonce);
    (jar, found(&url))
}

#[derive(Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
}

/// OAuth2 callback: verify the state nonce, exchange the code for a token,
/// store it in the session and return to the form.
pub async fn callback(
    State(state): State<SharedState>,
    jar: CookieJar,
    Query(query): Query<CallbackQuery>,
) -> Result<Response, AppError> {
    let code = query
        .code
        .ok_or_else(|| AppError::BadRequest("Missing authorization code".to_string()))?;

    let sid = session::session_id(&state.sessions, &jar)
        .ok_or_else(|| AppError::Internal("OAuth callback without a session".to_string()))?;

    // Read-and-clear: the nonce is single use.
    let stored = state
        .sessions
        .take_oauth_state(sid)
        .ok_or_else(|| AppError::Internal("OAuth callback without a stored state".to_string()))?;

    if query.state.as_deref() != Some(stored.as_str()) {
        return Err(AppError::Internal("OAuth state mismatch".to_string()));
    }

    let token = client::exchange_code(
        &state.http,
        &state.config.authbroker,
        &state.config.base_url,
        &code,
    )
    .await
    .map_err(AppError::Internal)?;

    state.sessions.set_access_token(sid, token);

    Ok(found("/"))
}
