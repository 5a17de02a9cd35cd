use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::Json;
use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use reqwest::Client;
use serde_json::json;

use changedesk::config::{
    AuthbrokerConfig, AvConfig, BackendConfig, Config, JiraConfig, SlackConfig, ZendeskConfig,
    ZendeskFieldIds,
};

/// Hit counters for the mock upstream services.
pub struct Mocks {
    pub av_scans: AtomicUsize,
    pub jira_creates: AtomicUsize,
    pub jira_attachments: AtomicUsize,
    pub jira_watchers: AtomicUsize,
    pub zendesk_uploads: AtomicUsize,
    pub zendesk_tickets: AtomicUsize,
    pub slack_posts: AtomicUsize,
    slack_fails: bool,
}

impl Mocks {
    fn new(slack_fails: bool) -> Self {
        Self {
            av_scans: AtomicUsize::new(0),
            jira_creates: AtomicUsize::new(0),
            jira_attachments: AtomicUsize::new(0),
            jira_watchers: AtomicUsize::new(0),
            zendesk_uploads: AtomicUsize::new(0),
            zendesk_tickets: AtomicUsize::new(0),
            slack_posts: AtomicUsize::new(0),
            slack_fails,
        }
    }

}

/// A running app instance wired to in-process mock upstreams.
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: Client,
    pub mocks: Arc<Mocks>,
}

#[derive(Clone, Copy)]
pub enum Backend {
    Jira,
    Zendesk,
}

// ── Mock upstreams ──────────────────────────────────────────────

/// The AV mock classifies by file content: "EICAR" is malware, "ENCRYPTED"
/// is an encrypted archive, anything else is clean.
async fn mock_av(State(mocks): State<Arc<Mocks>>, body: Bytes) -> Json<serde_json::Value> {
    mocks.av_scans.fetch_add(1, Ordering::SeqCst);
    let haystack = &body[..];
    let response = if contains(haystack, b"EICAR") {
        json!({ "malware": true, "reason": "Trojan.Generic" })
    } else if contains(haystack, b"ENCRYPTED") {
        json!({ "malware": true, "reason": "Encrypted archive" })
    } else {
        json!({ "malware": false, "reason": "" })
    };
    Json(response)
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

async fn mock_jira_create(State(mocks): State<Arc<Mocks>>) -> Json<serde_json::Value> {
    mocks.jira_creates.fetch_add(1, Ordering::SeqCst);
    Json(json!({ "id": "10000", "key": "CHG-123" }))
}

async fn mock_jira_attach(State(mocks): State<Arc<Mocks>>) -> Json<serde_json::Value> {
    mocks.jira_attachments.fetch_add(1, Ordering::SeqCst);
    Json(json!([]))
}

async fn mock_jira_watch(State(mocks): State<Arc<Mocks>>) -> StatusCode {
    mocks.jira_watchers.fetch_add(1, Ordering::SeqCst);
    StatusCode::NO_CONTENT
}

async fn mock_zendesk_upload(State(mocks): State<Arc<Mocks>>) -> Json<serde_json::Value> {
    mocks.zendesk_uploads.fetch_add(1, Ordering::SeqCst);
    Json(json!({ "upload": { "token": "upload-token-1" } }))
}

async fn mock_zendesk_ticket(State(mocks): State<Arc<Mocks>>) -> Json<serde_json::Value> {
    mocks.zendesk_tickets.fetch_add(1, Ordering::SeqCst);
    Json(json!({ "ticket": { "id": 42 } }))
}

async fn mock_slack(State(mocks): State<Arc<Mocks>>) -> axum::response::Response {
    mocks.slack_posts.fetch_add(1, Ordering::SeqCst);
    if mocks.slack_fails {
        (StatusCode::INTERNAL_SERVER_ERROR, "no_service").into_response()
    } else {
        "ok".into_response()
    }
}

async fn mock_token() -> Json<serde_json::Value> {
    Json(json!({ "access_token": "test-access-token", "token_type": "Bearer" }))
}

async fn mock_profile() -> Json<serde_json::Value> {
    Json(json!({
        "user_id": "sso-user-1",
        "email": "user@test.gov",
        "first_name": "Test",
        "last_name": "User",
    }))
}

async fn spawn_mock_server(mocks: Arc<Mocks>) -> SocketAddr {
    let router = Router::new()
        .route("/scan", post(mock_av))
        .route("/rest/api/2/issue", post(mock_jira_create))
        .route("/rest/api/2/issue/{key}/attachments", post(mock_jira_attach))
        .route("/rest/api/2/issue/{key}/watchers", post(mock_jira_watch))
        .route("/api/v2/uploads.json", post(mock_zendesk_upload))
        .route("/api/v2/tickets.json", post(mock_zendesk_ticket))
        .route("/slack", post(mock_slack))
        .route("/o/token/", post(mock_token))
        .route("/api/v1/user/me/", get(mock_profile))
        .with_state(mocks);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind mock server");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("Mock server failed");
    });

    addr
}

// ── App under test ──────────────────────────────────────────────

pub async fn spawn_app() -> TestApp {
    spawn_app_with(Backend::Jira, false).await
}

pub async fn spawn_app_with(backend: Backend, slack_fails: bool) -> TestApp {
    let mocks = Arc::new(Mocks::new(slack_fails));
    let mock_addr = spawn_mock_server(mocks.clone()).await;
    let mock_url = format!("http://{mock_addr}");

    let backend = match backend {
        Backend::Jira => BackendConfig::Jira(JiraConfig {
            url: mock_url.clone(),
            username: "jira-bot".to_string(),
            password: "jira-pass".to_string(),
            project_id: "10000".to_string(),
            project_map: vec![],
            issue_url: Some(format!("{mock_url}/browse/{{}}")),
            watchers: vec!["watcher.one".to_string()],
        }),
        Backend::Zendesk => BackendConfig::Zendesk(ZendeskConfig {
            url: mock_url.clone(),
            email: "agent@test.gov".to_string(),
            token: "zendesk-token".to_string(),
            service_name: "changedesk".to_string(),
            fields: ZendeskFieldIds {
                service: 1,
                department: 2,
                email: 3,
                phone: 4,
                action: 5,
                date_explanation: 6,
                due_date: 7,
            },
        }),
    };

    let config = Config {
        host: "127.0.0.1".parse().unwrap(),
        port: 0, // unused, we bind to a random port
        base_url: "http://localhost:0".to_string(),
        log_level: "warn".to_string(),
        max_body_size: 33_554_432,
        max_attachment_size: 1_048_576,
        av: AvConfig {
            url: format!("{mock_url}/scan"),
            username: "av".to_string(),
            password: "av-pass".to_string(),
        },
        backend,
        slack: Some(SlackConfig {
            webhook_url: format!("{mock_url}/slack"),
            username: "changedesk".to_string(),
        }),
        authbroker: AuthbrokerConfig {
            url: mock_url,
            client_id: "client-1".to_string(),
            client_secret: "client-secret".to_string(),
        },
    };

    let (app, _state) = changedesk::build_app(config);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to random port");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server failed");
    });

    let client = Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap();

    TestApp {
        addr,
        client,
        mocks,
    }
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Drive the OAuth2 dance against the mock broker. Returns the `sid`
    /// cookie pair to attach to subsequent requests.
    pub async fn login(&self) -> String {
        let resp = self
            .client
            .get(self.url("/auth/login/"))
            .send()
            .await
            .expect("login request failed");
        assert_eq!(resp.status(), reqwest::StatusCode::FOUND);

        let sid = resp
            .headers()
            .get(reqwest::header::SET_COOKIE)
            .expect("missing sid cookie")
            .to_str()
            .unwrap()
            .split(';')
            .next()
            .unwrap()
            .to_string();

        let location = resp
            .headers()
            .get(reqwest::header::LOCATION)
            .expect("missing redirect location")
            .to_str()
            .unwrap();
        let query = location.split_once('?').expect("authorize URL has no query").1;
        let state = form_urlencoded::parse(query.as_bytes())
            .find(|(k, _)| k == "state")
            .expect("authorize URL missing state")
            .1
            .into_owned();

        let resp = self
            .client
            .get(self.url(&format!("/auth/callback/?code=test-code&state={state}")))
            .header(reqwest::header::COOKIE, &sid)
            .send()
            .await
            .expect("callback request failed");
        assert_eq!(resp.status(), reqwest::StatusCode::FOUND);

        sid
    }

    /// POST the form as urlencoded fields with the given session cookie.
    pub async fn submit_form(&self, sid: &str, fields: &[(&str, String)]) -> reqwest::Response {
        self.client
            .post(self.url("/"))
            .header(reqwest::header::COOKIE, sid)
            .form(fields)
            .send()
            .await
            .expect("form submit failed")
    }

    /// POST the form as multipart with one attachment.
    pub async fn submit_form_with_file(
        &self,
        sid: &str,
        fields: &[(&str, String)],
        file_field: &str,
        filename: &str,
        content: &[u8],
    ) -> reqwest::Response {
        self.submit_form_with_files(sid, fields, &[(file_field, filename, content)])
            .await
    }

    /// POST the form as multipart with any number of file parts.
    pub async fn submit_form_with_files(
        &self,
        sid: &str,
        fields: &[(&str, String)],
        files: &[(&str, &str, &[u8])],
    ) -> reqwest::Response {
        let mut form = reqwest::multipart::Form::new();
        for (name, value) in fields {
            form = form.text(name.to_string(), value.clone());
        }
        for (field, filename, content) in files {
            form = form.part(
                field.to_string(),
                reqwest::multipart::Part::bytes(content.to_vec())
                    .file_name(filename.to_string()),
            );
        }

        self.client
            .post(self.url("/"))
            .header(reqwest::header::COOKIE, sid)
            .multipart(form)
            .send()
            .await
            .expect("multipart submit failed")
    }
}

/// A complete valid field set with today's date.
pub fn valid_fields(due_date: &str) -> Vec<(&'static str, String)> {
    vec![
        ("name", "Mr Smith".to_string()),
        ("department", "test dept".to_string()),
        ("email", "test@test.com".to_string()),
        ("telephone", "07700 900123".to_string()),
        ("action", "Add new content".to_string()),
        ("description", "a description".to_string()),
        ("due_date", due_date.to_string()),
        ("date_explanation", "ministerial visit".to_string()),
    ]
}

pub fn today() -> String {
    chrono::Local::now().date_naive().format("%Y-%m-%d").to_string()
}
