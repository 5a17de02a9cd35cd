use rand::Rng;
use rand::distr::Alphanumeric;
use serde::Deserialize;

use crate::config::AuthbrokerConfig;

/// Length of the CSRF `state` nonce sent with the authorization redirect.
const STATE_LEN: usize = 32;

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

pub fn new_state_nonce() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(STATE_LEN)
        .map(char::from)
        .collect()
}

pub fn redirect_uri(base_url: &str) -> String {
    format!("{}/auth/callback/", base_url.trim_end_matches('/'))
}

/// The identity broker's authorization URL for this client and state nonce.
pub fn authorization_url(config: &AuthbrokerConfig, base_url: &str, state: &str) -> String {
    let query: String = form_urlencoded::Serializer::new(String::new())
        .append_pair("response_type", "code")
        .append_pair("client_id", &config.client_id)
        .append_pair("redirect_uri", &redirect_uri(base_url))
        .append_pair("state", state)
        .finish();
    format!("{}?{query}", config.authorize_url())
}

/// Exchange an authorization code for an access token.
pub async fn exchange_code(
    client: &reqwest::Client,
    config: &AuthbrokerConfig,
    base_url: &str,
    code: &str,
) -> Result<String, String> {
    let resp = client
        .post(config.token_url())
        .form(&[
            ("grant_type", "authorization_code"),
            ("code", code),
            ("client_id", &config.client_id),
            ("client_secret", &config.client_secret),
            ("redirect_uri", &redirect_uri(base_url)),
        ])
        .send()
        .await
        .map_err(|e| format!("token request failed: {e}"))?;

    if !resp.status().is_success() {
        return Err(format!("token endpoint returned status {}", resp.status()));
    }

    let token: TokenResponse = resp
        .json()
        .await
        .map_err(|e| format!("invalid token response: {e}"))?;
    Ok(token.access_token)
}
