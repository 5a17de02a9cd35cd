pub mod format;
pub mod parser;
pub mod validate;

use std::collections::BTreeMap;

use bytes::Bytes;
use chrono::NaiveDate;

/// Form data as parsed off the wire: multi-valued text fields plus uploads.
#[derive(Debug, Default)]
pub struct RawSubmission {
    fields: Vec<(String, String)>,
    pub attachments: Vec<RawAttachment>,
}

impl RawSubmission {
    pub fn push_field(&mut self, name: String, value: String) {
        self.fields.push((name, value));
    }

    /// First value for a field, trimmed. Empty after trimming counts as absent.
    pub fn value(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// All non-blank values for a field (checkbox groups repeat the name).
    pub fn values(&self, name: &str) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|(n, _)| n == name)
            .map(|(_, v)| v.trim())
            .filter(|v| !v.is_empty())
            .collect()
    }

    pub fn flag(&self, name: &str) -> bool {
        matches!(self.value(name), Some("on" | "true" | "1" | "yes"))
    }
}

#[derive(Debug)]
pub struct RawAttachment {
    pub field: String,
    pub filename: String,
    pub content: Bytes,
}

/// Field name -> error messages, ordered for stable re-rendering.
pub type ValidationErrors = BTreeMap<String, Vec<String>>;

/// A submission that passed validation, ready for ticket creation.
#[derive(Debug)]
pub struct ValidatedSubmission {
    pub name: String,
    pub department: String,
    pub email: String,
    pub telephone: Option<String>,
    pub actions: Vec<String>,
    pub description: String,
    pub update_url: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub no_due_date: bool,
    pub date_explanation: Option<String>,
    pub attachments: Vec<Attachment>,
}

#[derive(Debug, Clone)]
pub struct Attachment {
    pub filename: String,
    pub content: Bytes,
}
