use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use crate::auth::profile::UserProfile;
use crate::config::JiraConfig;
use crate::submission::ValidatedSubmission;

use super::{TicketBackend, TicketingError};

pub struct JiraBackend {
    client: reqwest::Client,
    config: JiraConfig,
}

#[derive(Deserialize)]
struct CreatedIssue {
    key: String,
}

impl JiraBackend {
    pub fn new(config: JiraConfig) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(15))
                .build()
                .expect("Failed to build reqwest client"),
            config,
        }
    }

    /// Project for the submission: first matching category override, else the
    /// configured default.
    fn project_id(&self, actions: &[String]) -> &str {
        actions
            .iter()
            .find_map(|action| {
                self.config
                    .project_map
                    .iter()
                    .find(|(category, _)| category == action)
                    .map(|(_, project)| project.as_str())
            })
            .unwrap_or(&self.config.project_id)
    }

    fn api(&self, path: &str) -> String {
        format!("{}/rest/api/2/{path}", self.config.url.trim_end_matches('/'))
    }

    async fn attach(&self, issue_key: &str, filename: &str, content: Vec<u8>) -> Result<(), TicketingError> {
        let part = reqwest::multipart::Part::bytes(content).file_name(filename.to_string());
        let form = reqwest::multipart::Form::new().part("file", part);

        let resp = self
            .client
            .post(self.api(&format!("issue/{issue_key}/attachments")))
            .basic_auth(&self.config.username, Some(&self.config.password))
            .header("X-Atlassian-Token", "no-check")
            .multipart(form)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(format!(
                "Jira attachment upload for {issue_key} returned status {}",
                resp.status()
            )
            .into());
        }
        Ok(())
    }

    async fn add_watcher(&self, issue_key: &str, username: &str) -> Result<(), TicketingError> {
        let resp = self
            .client
            .post(self.api(&format!("issue/{issue_key}/watchers")))
            .basic_auth(&self.config.username, Some(&self.config.password))
            // The watchers endpoint takes a bare JSON string.
            .json(&json!(username))
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(format!(
                "Jira add-watcher for {issue_key} returned status {}",
                resp.status()
            )
            .into());
        }
        Ok(())
    }
}

#[async_trait]
impl TicketBackend for JiraBackend {
    fn id(&self) -> &str {
        "jira"
    }

    async fn create_ticket(
        &self,
        submission: &ValidatedSubmission,
        body: &str,
        _profile: Option<&UserProfile>,
    ) -> Result<String, TicketingError> {
        let mut fields = json!({
            "project": { "id": self.project_id(&submission.actions) },
            "summary": "New change request",
            "description": body,
            "issuetype": { "name": "Task" },
        });
        if let Some(date) = submission.due_date {
            fields["duedate"] = json!(date.format("%Y-%m-%d").to_string());
        }

        let resp = self
            .client
            .post(self.api("issue"))
            .basic_auth(&self.config.username, Some(&self.config.password))
            .json(&json!({ "fields": fields }))
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(format!("Jira issue creation returned status {}", resp.status()).into());
        }

        let issue: CreatedIssue = resp
            .json()
            .await
            .map_err(|e| TicketingError::from(format!("Invalid Jira response: {e}")))?;

        for attachment in &submission.attachments {
            self.attach(&issue.key, &attachment.filename, attachment.content.to_vec())
                .await?;
        }

        for watcher in &self.config.watchers {
            self.add_watcher(&issue.key, watcher).await?;
        }

        tracing::info!(issue = %issue.key, "Created Jira issue");
        Ok(issue.key)
    }

    fn ticket_url(&self, ticket_id: &str) -> Option<String> {
        self.config
            .issue_url
            .as_ref()
            .map(|pattern| pattern.replace("{}", ticket_id))
    }
}
