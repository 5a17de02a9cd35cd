use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use crate::auth::profile::UserProfile;
use crate::config::ZendeskConfig;
use crate::submission::ValidatedSubmission;

use super::{TicketBackend, TicketingError};

pub struct ZendeskBackend {
    client: reqwest::Client,
    config: ZendeskConfig,
}

#[derive(Deserialize)]
struct UploadResponse {
    upload: UploadBody,
}

#[derive(Deserialize)]
struct UploadBody {
    token: String,
}

#[derive(Deserialize)]
struct TicketResponse {
    ticket: TicketBody,
}

#[derive(Deserialize)]
struct TicketBody {
    id: u64,
}

impl ZendeskBackend {
    pub fn new(config: ZendeskConfig) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(15))
                .build()
                .expect("Failed to build reqwest client"),
            config,
        }
    }

    fn api(&self, path: &str) -> String {
        format!("{}/api/v2/{path}", self.config.url.trim_end_matches('/'))
    }

    /// Zendesk API-token auth: "<email>/token" as the basic-auth user.
    fn auth_user(&self) -> String {
        format!("{}/token", self.config.email)
    }

    /// Upload one attachment; returns the upload token to bundle into the
    /// ticket's initial comment.
    async fn upload(&self, filename: &str, content: Vec<u8>) -> Result<String, TicketingError> {
        let query: String = form_urlencoded::Serializer::new(String::new())
            .append_pair("filename", filename)
            .finish();

        let resp = self
            .client
            .post(format!("{}?{query}", self.api("uploads.json")))
            .basic_auth(self.auth_user(), Some(&self.config.token))
            .header("Content-Type", "application/binary")
            .body(content)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(format!("Zendesk upload returned status {}", resp.status()).into());
        }

        let upload: UploadResponse = resp
            .json()
            .await
            .map_err(|e| TicketingError::from(format!("Invalid Zendesk upload response: {e}")))?;
        Ok(upload.upload.token)
    }
}

/// Lowercased, hyphen-separated tag derived from a category value.
fn category_tag(action: &str) -> String {
    action
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

#[async_trait]
impl TicketBackend for ZendeskBackend {
    fn id(&self) -> &str {
        "zendesk"
    }

    fn wants_identity_line(&self) -> bool {
        true
    }

    async fn create_ticket(
        &self,
        submission: &ValidatedSubmission,
        body: &str,
        profile: Option<&UserProfile>,
    ) -> Result<String, TicketingError> {
        let mut upload_tokens = Vec::new();
        for attachment in &submission.attachments {
            let token = self
                .upload(&attachment.filename, attachment.content.to_vec())
                .await?;
            upload_tokens.push(token);
        }

        let ids = &self.config.fields;
        let custom_fields = json!([
            { "id": ids.service, "value": self.config.service_name },
            { "id": ids.department, "value": submission.department },
            { "id": ids.email, "value": submission.email },
            { "id": ids.phone, "value": submission.telephone.as_deref().unwrap_or("") },
            { "id": ids.action, "value": submission.actions.join(" / ") },
            { "id": ids.date_explanation, "value": submission.date_explanation.as_deref().unwrap_or("") },
            { "id": ids.due_date, "value": submission.due_date.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default() },
        ]);

        let mut tags = vec!["change-request".to_string()];
        tags.extend(submission.actions.iter().map(|a| category_tag(a)));

        let mut ticket = json!({
            "subject": "New change request",
            "comment": { "body": body, "uploads": upload_tokens },
            "custom_fields": custom_fields,
            "tags": tags,
        });
        if let Some(profile) = profile {
            ticket["requester"] = json!({
                "name": profile.display_name(),
                "email": profile.email,
            });
        }

        let resp = self
            .client
            .post(self.api("tickets.json"))
            .basic_auth(self.auth_user(), Some(&self.config.token))
            .json(&json!({ "ticket": ticket }))
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(format!("Zendesk ticket creation returned status {}", resp.status()).into());
        }

        let created: TicketResponse = resp
            .json()
            .await
            .map_err(|e| TicketingError::from(format!("Invalid Zendesk response: {e}")))?;

        tracing::info!(ticket = created.ticket.id, "Created Zendesk ticket");
        Ok(created.ticket.id.to_string())
    }

    fn ticket_url(&self, ticket_id: &str) -> Option<String> {
        Some(format!(
            "{}/agent/tickets/{ticket_id}",
            self.config.url.trim_end_matches('/')
        ))
    }
}
