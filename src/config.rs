use std::net::IpAddr;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub base_url: String,
    pub log_level: String,
    pub max_body_size: usize,
    pub max_attachment_size: usize,
    pub av: AvConfig,
    pub backend: BackendConfig,
    pub slack: Option<SlackConfig>,
    pub authbroker: AuthbrokerConfig,
}

#[derive(Debug, Clone)]
pub struct AvConfig {
    pub url: String,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub enum BackendConfig {
    Jira(JiraConfig),
    Zendesk(ZendeskConfig),
}

#[derive(Debug, Clone)]
pub struct JiraConfig {
    pub url: String,
    pub username: String,
    pub password: String,
    pub project_id: String,
    /// Category -> project id overrides, e.g. "Remove existing content=10101".
    pub project_map: Vec<(String, String)>,
    /// Browse-URL pattern with `{}` for the issue key, used in notifications.
    pub issue_url: Option<String>,
    pub watchers: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ZendeskConfig {
    pub url: String,
    pub email: String,
    pub token: String,
    pub service_name: String,
    pub fields: ZendeskFieldIds,
}

/// Custom-field ids of the target Zendesk instance.
#[derive(Debug, Clone)]
pub struct ZendeskFieldIds {
    pub service: u64,
    pub department: u64,
    pub email: u64,
    pub phone: u64,
    pub action: u64,
    pub date_explanation: u64,
    pub due_date: u64,
}

#[derive(Debug, Clone)]
pub struct SlackConfig {
    pub webhook_url: String,
    pub username: String,
}

#[derive(Debug, Clone)]
pub struct AuthbrokerConfig {
    pub url: String,
    pub client_id: String,
    pub client_secret: String,
}

impl AuthbrokerConfig {
    pub fn authorize_url(&self) -> String {
        format!("{}/o/authorize/", self.url.trim_end_matches('/'))
    }

    pub fn token_url(&self) -> String {
        format!("{}/o/token/", self.url.trim_end_matches('/'))
    }

    pub fn profile_url(&self) -> String {
        format!("{}/api/v1/user/me/", self.url.trim_end_matches('/'))
    }
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let host: IpAddr = env_or("CHANGEDESK_HOST", "0.0.0.0")
            .parse()
            .map_err(|e| format!("Invalid CHANGEDESK_HOST: {e}"))?;

        let port: u16 = env_or("CHANGEDESK_PORT", "8000")
            .parse()
            .map_err(|e| format!("Invalid CHANGEDESK_PORT: {e}"))?;

        let base_url = env_or("CHANGEDESK_BASE_URL", &format!("http://{host}:{port}"));

        let log_level = env_or("CHANGEDESK_LOG_LEVEL", "info");

        let max_body_size: usize = env_or("CHANGEDESK_MAX_BODY_SIZE", "33554432")
            .parse()
            .map_err(|e| format!("Invalid CHANGEDESK_MAX_BODY_SIZE: {e}"))?;

        let max_attachment_size: usize = env_or("CHANGEDESK_MAX_ATTACHMENT_SIZE", "10485760")
            .parse()
            .map_err(|e| format!("Invalid CHANGEDESK_MAX_ATTACHMENT_SIZE: {e}"))?;

        let av = AvConfig {
            url: env_required("AV_URL")?,
            username: env_required("AV_USERNAME")?,
            password: env_required("AV_PASSWORD")?,
        };

        let backend = match env_or("TICKET_BACKEND", "jira").as_str() {
            "jira" => BackendConfig::Jira(JiraConfig {
                url: env_required("JIRA_URL")?,
                username: env_required("JIRA_USERNAME")?,
                password: env_required("JIRA_PASSWORD")?,
                project_id: env_required("JIRA_PROJECT_ID")?,
                project_map: parse_pairs(&env_or("JIRA_PROJECT_MAP", ""))?,
                issue_url: std::env::var("JIRA_ISSUE_URL").ok(),
                watchers: parse_list(&env_or("JIRA_WATCHERS", "")),
            }),
            "zendesk" => BackendConfig::Zendesk(ZendeskConfig {
                url: env_required("ZENDESK_URL")?,
                email: env_required("ZENDESK_EMAIL")?,
                token: env_required("ZENDESK_TOKEN")?,
                service_name: env_or("ZENDESK_SERVICE_NAME", "changedesk"),
                fields: ZendeskFieldIds {
                    service: env_field_id("ZENDESK_FIELD_SERVICE")?,
                    department: env_field_id("ZENDESK_FIELD_DEPARTMENT")?,
                    email: env_field_id("ZENDESK_FIELD_EMAIL")?,
                    phone: env_field_id("ZENDESK_FIELD_PHONE")?,
                    action: env_field_id("ZENDESK_FIELD_ACTION")?,
                    date_explanation: env_field_id("ZENDESK_FIELD_DATE_EXPLANATION")?,
                    due_date: env_field_id("ZENDESK_FIELD_DUE_DATE")?,
                },
            }),
            other => return Err(format!("Invalid TICKET_BACKEND: {other}")),
        };

        let slack = match std::env::var("SLACK_WEBHOOK_URL").ok() {
            Some(webhook_url) if !webhook_url.is_empty() => Some(SlackConfig {
                webhook_url,
                username: env_or("SLACK_USERNAME", "changedesk"),
            }),
            _ => None,
        };

        let authbroker = AuthbrokerConfig {
            url: env_required("AUTHBROKER_URL")?,
            client_id: env_required("AUTHBROKER_CLIENT_ID")?,
            client_secret: env_required("AUTHBROKER_CLIENT_SECRET")?,
        };

        Ok(Config {
            host,
            port,
            base_url,
            log_level,
            max_body_size,
            max_attachment_size,
            av,
            backend,
            slack,
            authbroker,
        })
    }
}

fn env_required(key: &str) -> Result<String, String> {
    std::env::var(key).map_err(|_| format!("Missing required environment variable: {key}"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_field_id(key: &str) -> Result<u64, String> {
    env_required(key)?
        .parse()
        .map_err(|e| format!("Invalid {key}: {e}"))
}

/// Split a comma-separated list, dropping empty entries.
fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse "key=value,key=value" pairs.
fn parse_pairs(raw: &str) -> Result<Vec<(String, String)>, String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|entry| {
            entry
                .split_once('=')
                .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
                .ok_or_else(|| format!("Invalid mapping entry '{entry}', expected key=value"))
        })
        .collect()
}
