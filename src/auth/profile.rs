use serde::Deserialize;

use crate::config::AuthbrokerConfig;

/// The signed-in user as reported by the identity broker. Used only to
/// pre-fill the form and tag the Zendesk requester; never persisted here.
#[derive(Debug, Clone, Deserialize)]
pub struct UserProfile {
    pub user_id: String,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

impl UserProfile {
    pub fn display_name(&self) -> String {
        let name = format!("{} {}", self.first_name, self.last_name);
        let name = name.trim();
        if name.is_empty() {
            self.email.clone()
        } else {
            name.to_string()
        }
    }
}

/// Fetches the signed-in user's profile from the identity broker.
pub struct ProfileClient {
    client: reqwest::Client,
    profile_url: String,
}

impl ProfileClient {
    pub fn new(config: &AuthbrokerConfig) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(10))
                .build()
                .expect("Failed to build reqwest client"),
            profile_url: config.profile_url(),
        }
    }

    /// Profile for the given access token. Any failure is a logged no-op:
    /// the form simply renders without prefilled name and email.
    pub async fn fetch(&self, access_token: &str) -> Option<UserProfile> {
        let resp = match self
            .client
            .get(&self.profile_url)
            .bearer_auth(access_token)
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(e) => {
                tracing::warn!("Profile fetch failed: {e}");
                return None;
            }
        };

        if !resp.status().is_success() {
            tracing::warn!("Profile fetch returned status {}", resp.status());
            return None;
        }

        match resp.json::<UserProfile>().await {
            Ok(profile) => Some(profile),
            Err(e) => {
                tracing::warn!("Invalid profile response: {e}");
                None
            }
        }
    }
}
