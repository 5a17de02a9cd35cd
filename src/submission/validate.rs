use std::sync::LazyLock;

use regex::Regex;

use crate::scan::Scanner;
use crate::schema;

use super::{Attachment, RawSubmission, ValidatedSubmission, ValidationErrors};

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("invalid email regex"));

pub const MSG_REQUIRED: &str = "This field is required.";
pub const MSG_INVALID_EMAIL: &str = "Enter a valid email address.";
pub const MSG_INVALID_CHOICE: &str = "Select a valid choice.";
pub const MSG_INVALID_URL: &str = "Enter a valid URL.";
pub const MSG_INVALID_DATE: &str = "Enter a valid date.";
pub const MSG_PAST_DATE: &str = "The date cannot be in the past";
pub const MSG_UPDATE_URL_REQUIRED: &str =
    "Provide the URL of the content you want updated or removed.";
pub const MSG_FILE_TOO_LARGE: &str = "The file is larger than the maximum allowed size.";
pub const MSG_TOO_MANY_FILES: &str = "Too many files were attached.";
pub const MSG_DUPLICATE_FILE: &str = "Only one file can be attached per field.";

fn push(errors: &mut ValidationErrors, field: &str, message: String) {
    errors.entry(field.to_string()).or_default().push(message);
}

/// Validate a parsed form submission. Attachments are virus-scanned as part
/// of validation; any failure anywhere rejects the whole submission.
///
/// Pure apart from the scan calls — no external state is mutated.
pub async fn validate(
    raw: &RawSubmission,
    scanner: &Scanner,
    max_attachment_size: usize,
) -> Result<ValidatedSubmission, ValidationErrors> {
    let mut errors = ValidationErrors::new();
    let today = chrono::Local::now().date_naive();

    for field in ["name", "department", "email", "description"] {
        if raw.value(field).is_none() {
            push(&mut errors, field, MSG_REQUIRED.to_string());
        }
    }

    if let Some(email) = raw.value("email") {
        if !EMAIL_RE.is_match(email) {
            push(&mut errors, "email", MSG_INVALID_EMAIL.to_string());
        }
    }

    let actions: Vec<String> = raw.values("action").iter().map(|s| s.to_string()).collect();
    if actions.is_empty() {
        push(&mut errors, "action", MSG_REQUIRED.to_string());
    } else if actions.iter().any(|a| !schema::is_valid_action(a)) {
        push(&mut errors, "action", MSG_INVALID_CHOICE.to_string());
    }

    let update_url = raw.value("update_url").map(str::to_string);
    if actions.iter().any(|a| schema::action_requires_url(a)) && update_url.is_none() {
        push(&mut errors, "update_url", MSG_UPDATE_URL_REQUIRED.to_string());
    }
    if let Some(url) = &update_url {
        if !url.starts_with("http") {
            push(&mut errors, "update_url", MSG_INVALID_URL.to_string());
        }
    }

    let no_due_date = raw.flag("no_due_date");
    let mut due_date = None;
    if let Some(value) = raw.value("due_date") {
        match chrono::NaiveDate::parse_from_str(value, "%Y-%m-%d") {
            Ok(date) => {
                if !no_due_date && date < today {
                    push(&mut errors, "due_date", MSG_PAST_DATE.to_string());
                } else {
                    due_date = Some(date);
                }
            }
            Err(_) if no_due_date => {}
            Err(_) => push(&mut errors, "due_date", MSG_INVALID_DATE.to_string()),
        }
    }

    let mut attachments = Vec::new();
    if raw.attachments.len() > schema::MAX_ATTACHMENTS {
        // Nothing is scanned for an over-limit submission.
        push(&mut errors, "attachment1", MSG_TOO_MANY_FILES.to_string());
    } else {
        let mut seen = std::collections::BTreeSet::new();
        for upload in &raw.attachments {
            let known = schema::field(&upload.field)
                .is_some_and(|f| f.kind == schema::FieldKind::File);
            if !known {
                push(
                    &mut errors,
                    &upload.field,
                    "Unexpected file field.".to_string(),
                );
                continue;
            }

            if !seen.insert(upload.field.as_str()) {
                push(&mut errors, &upload.field, MSG_DUPLICATE_FILE.to_string());
                continue;
            }

            if upload.content.len() > max_attachment_size {
                push(&mut errors, &upload.field, MSG_FILE_TOO_LARGE.to_string());
                continue;
            }

            match scanner.scan(&upload.filename, upload.content.clone()).await {
                Ok(()) => attachments.push(Attachment {
                    filename: upload.filename.clone(),
                    content: upload.content.clone(),
                }),
                Err(err) => push(&mut errors, &upload.field, err.user_message().to_string()),
            }
        }
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(ValidatedSubmission {
        name: raw.value("name").unwrap_or_default().to_string(),
        department: raw.value("department").unwrap_or_default().to_string(),
        email: raw.value("email").unwrap_or_default().to_string(),
        telephone: raw.value("telephone").map(str::to_string),
        actions,
        description: raw.value("description").unwrap_or_default().to_string(),
        update_url,
        due_date,
        no_due_date,
        date_explanation: raw.value("date_explanation").map(str::to_string),
        attachments,
    })
}
