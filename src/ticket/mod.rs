pub mod jira;
pub mod zendesk;

use std::sync::Arc;

use async_trait::async_trait;

use crate::auth::profile::UserProfile;
use crate::config::BackendConfig;
use crate::submission::ValidatedSubmission;

/// A failure talking to the ticketing backend. Request-fatal: the user sees
/// a generic error and must resubmit (which can duplicate a ticket if the
/// first attempt actually landed — accepted, no idempotency key).
#[derive(Debug)]
pub struct TicketingError {
    pub message: String,
}

impl std::fmt::Display for TicketingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl From<String> for TicketingError {
    fn from(message: String) -> Self {
        TicketingError { message }
    }
}

impl From<&str> for TicketingError {
    fn from(message: &str) -> Self {
        TicketingError {
            message: message.to_string(),
        }
    }
}

impl From<reqwest::Error> for TicketingError {
    fn from(err: reqwest::Error) -> Self {
        TicketingError {
            message: format!("ticketing request failed: {err}"),
        }
    }
}

/// One external issue tracker. Selected once at startup from configuration;
/// call sites never branch on the concrete backend.
#[async_trait]
pub trait TicketBackend: Send + Sync {
    fn id(&self) -> &str;

    /// Whether the formatted ticket body should carry the requester's
    /// identity-broker id.
    fn wants_identity_line(&self) -> bool {
        false
    }

    /// Create a ticket (with attachments) and return its external identifier.
    async fn create_ticket(
        &self,
        submission: &ValidatedSubmission,
        body: &str,
        profile: Option<&UserProfile>,
    ) -> Result<String, TicketingError>;

    /// Human-facing URL for a created ticket, when one can be derived.
    fn ticket_url(&self, ticket_id: &str) -> Option<String>;
}

pub fn backend_from_config(config: &BackendConfig) -> Arc<dyn TicketBackend> {
    match config {
        BackendConfig::Jira(cfg) => Arc::new(jira::JiraBackend::new(cfg.clone())),
        BackendConfig::Zendesk(cfg) => Arc::new(zendesk::ZendeskBackend::new(cfg.clone())),
    }
}
