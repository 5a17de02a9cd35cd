use askama::Template;
use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::response::{Html, IntoResponse, Response};
use axum_extra::extract::CookieJar;
use serde::Deserialize;

use crate::auth::profile::UserProfile;
use crate::error::AppError;
use crate::routes::found;
use crate::schema::{self, FieldKind};
use crate::session;
use crate::state::SharedState;
use crate::submission::format::format_body;
use crate::submission::{RawSubmission, ValidationErrors, parser, validate};

#[derive(Template)]
#[template(path = "form.html")]
struct FormTemplate {
    has_errors: bool,
    fields: Vec<FieldView>,
}

#[derive(Template)]
#[template(path = "success.html")]
struct SuccessTemplate {
    issue: String,
}

struct FieldView {
    name: &'static str,
    label: &'static str,
    help: Option<&'static str>,
    kind: &'static str,
    required: bool,
    value: String,
    checked: bool,
    choices: Vec<ChoiceView>,
    errors: Vec<String>,
}

struct ChoiceView {
    value: &'static str,
    checked: bool,
}

fn input_kind(kind: &FieldKind) -> &'static str {
    match kind {
        FieldKind::Text => "text",
        FieldKind::Email => "email",
        FieldKind::Phone => "tel",
        FieldKind::Textarea => "textarea",
        FieldKind::Checkboxes(_) => "checkboxes",
        FieldKind::Url => "url",
        FieldKind::Date => "date",
        FieldKind::Checkbox => "checkbox",
        FieldKind::File => "file",
    }
}

/// Build the per-field render state from the schema plus, for a re-render,
/// the submitted values and validation errors. Uploaded files are never
/// preserved; the user re-attaches them.
fn field_views(
    raw: Option<&RawSubmission>,
    errors: &ValidationErrors,
    prefill: Option<&UserProfile>,
) -> Vec<FieldView> {
    schema::FIELDS
        .iter()
        .map(|def| {
            let value = match raw {
                Some(raw) => raw.value(def.name).unwrap_or_default().to_string(),
                None => match (def.name, prefill) {
                    ("name", Some(p)) => p.display_name(),
                    ("email", Some(p)) => p.email.clone(),
                    _ => String::new(),
                },
            };

            let choices = match def.kind {
                FieldKind::Checkboxes(options) => {
                    let selected = raw.map(|r| r.values(def.name)).unwrap_or_default();
                    options
                        .iter()
                        .map(|&option| ChoiceView {
                            value: option,
                            checked: selected.contains(&option),
                        })
                        .collect()
                }
                _ => Vec::new(),
            };

            FieldView {
                name: def.name,
                label: def.label,
                help: def.help,
                kind: input_kind(&def.kind),
                required: def.required,
                checked: raw.is_some_and(|r| r.flag(def.name)),
                value,
                choices,
                errors: errors.get(def.name).cloned().unwrap_or_default(),
            }
        })
        .collect()
}

fn require_token(state: &SharedState, jar: &CookieJar) -> Result<String, AppError> {
    session::session_id(&state.sessions, jar)
        .and_then(|sid| state.sessions.access_token(sid))
        .ok_or(AppError::Unauthorized)
}

fn render_form(
    raw: Option<&RawSubmission>,
    errors: &ValidationErrors,
    prefill: Option<&UserProfile>,
) -> Response {
    let template = FormTemplate {
        has_errors: !errors.is_empty(),
        fields: field_views(raw, errors, prefill),
    };
    Html(template.render().unwrap_or_default()).into_response()
}

/// GET `/` — the empty form, prefilled from the broker profile when available.
pub async fn form_page(
    State(state): State<SharedState>,
    jar: CookieJar,
) -> Result<Response, AppError> {
    let token = require_token(&state, &jar)?;

    // Profile-fetch failure is a logged no-op: blank prefill.
    let profile = state.profiles.fetch(&token).await;

    Ok(render_form(None, &ValidationErrors::new(), profile.as_ref()))
}

/// POST `/` — validate, create the ticket, notify, redirect to confirmation.
pub async fn submit(
    State(state): State<SharedState>,
    jar: CookieJar,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, AppError> {
    let token = require_token(&state, &jar)?;

    let raw = parser::parse(&headers, body)
        .await
        .map_err(AppError::BadRequest)?;

    let submission = match validate::validate(
        &raw,
        &state.scanner,
        state.config.max_attachment_size,
    )
    .await
    {
        Ok(submission) => submission,
        // Recoverable: re-render with field errors, submitted text preserved.
        Err(errors) => return Ok(render_form(Some(&raw), &errors, None)),
    };

    let profile = if state.backend.wants_identity_line() {
        state.profiles.fetch(&token).await
    } else {
        None
    };
    let identity = profile.as_ref().map(|p| p.user_id.as_str());

    let body_text = format_body(&submission, identity);
    let ticket_id = state
        .backend
        .create_ticket(&submission, &body_text, profile.as_ref())
        .await?;

    let link = state
        .backend
        .ticket_url(&ticket_id)
        .unwrap_or_else(|| ticket_id.clone());
    state
        .notifier
        .notify(&format!("New content change request: {link}"))
        .await;

    let query: String = form_urlencoded::Serializer::new(String::new())
        .append_pair("issue", &ticket_id)
        .finish();
    Ok(found(&format!("/success/?{query}")))
}

#[derive(Deserialize)]
pub struct SuccessQuery {
    pub issue: Option<String>,
}

/// GET `/success/` — confirmation page showing the ticket id.
pub async fn success_page(
    State(state): State<SharedState>,
    jar: CookieJar,
    Query(query): Query<SuccessQuery>,
) -> Result<Response, AppError> {
    require_token(&state, &jar)?;

    let template = SuccessTemplate {
        issue: query
            .issue
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "Not specified".to_string()),
    };
    Ok(Html(template.render().unwrap_or_default()).into_response())
}
