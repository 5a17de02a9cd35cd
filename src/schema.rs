//! Declarative form schema for the change-request form.
//!
//! Historical versions of this form duplicated the whole field list per
//! revision; here a single versioned definition drives validation, ticket
//! formatting and page rendering.

/// Latest canonical schema revision.
pub const SCHEMA_VERSION: u32 = 2;

pub const ACTION_CHOICES: &[&str] = &[
    "Add new content",
    "Update existing content on Great.gov",
    "Update existing content on GOV.UK",
    "Remove existing content",
];

pub const MAX_ATTACHMENTS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Email,
    Phone,
    Textarea,
    /// Multi-select from a fixed choice set.
    Checkboxes(&'static [&'static str]),
    Url,
    Date,
    /// Single boolean flag.
    Checkbox,
    File,
}

#[derive(Debug, Clone, Copy)]
pub struct FieldDef {
    pub name: &'static str,
    pub label: &'static str,
    pub help: Option<&'static str>,
    pub kind: FieldKind,
    pub required: bool,
}

/// All fields in display (and ticket-body) order.
pub static FIELDS: &[FieldDef] = &[
    FieldDef {
        name: "name",
        label: "Your full name",
        help: None,
        kind: FieldKind::Text,
        required: true,
    },
    FieldDef {
        name: "department",
        label: "Your department",
        help: Some("Your content must have approval from your department before submitting for upload."),
        kind: FieldKind::Text,
        required: true,
    },
    FieldDef {
        name: "email",
        label: "Your email address",
        help: None,
        kind: FieldKind::Email,
        required: true,
    },
    FieldDef {
        name: "telephone",
        label: "Phone number",
        help: Some("Please provide a direct number in case we need to discuss your request."),
        kind: FieldKind::Phone,
        required: false,
    },
    FieldDef {
        name: "action",
        label: "Do you want to add, update or remove content?",
        help: Some(
            "For GOV.UK updates to existing content - please allow 1 working day. \
             For NEW content on GOV.UK and Great.gov, please allow a minimum of 3 \
             working days to allow for feedback, approvals and upload.",
        ),
        kind: FieldKind::Checkboxes(ACTION_CHOICES),
        required: true,
    },
    FieldDef {
        name: "description",
        label: "What is your content request? Please give as much detail as possible.",
        help: Some(
            "Please outline your request, intended audience and its purpose \
             (for example, to sell, to inform, to explain).",
        ),
        kind: FieldKind::Textarea,
        required: true,
    },
    FieldDef {
        name: "update_url",
        label: "URL of the content you want updated or removed",
        help: Some("Required when your request updates or removes existing content."),
        kind: FieldKind::Url,
        required: false,
    },
    FieldDef {
        name: "due_date",
        label: "When does this need to be published?",
        help: Some("For example, Ministerial visit."),
        kind: FieldKind::Date,
        required: false,
    },
    FieldDef {
        name: "no_due_date",
        label: "This request has no fixed deadline",
        help: None,
        kind: FieldKind::Checkbox,
        required: false,
    },
    FieldDef {
        name: "date_explanation",
        label: "Please give us a reason for this timeframe",
        help: None,
        kind: FieldKind::Textarea,
        required: false,
    },
    FieldDef {
        name: "attachment1",
        label: "Please attach supporting Word documents detailing your updates",
        help: Some("We accept Word documents with track changes - providing this will make the process very quick."),
        kind: FieldKind::File,
        required: false,
    },
    FieldDef {
        name: "attachment2",
        label: "Additional attachment",
        help: None,
        kind: FieldKind::File,
        required: false,
    },
    FieldDef {
        name: "attachment3",
        label: "Additional attachment",
        help: None,
        kind: FieldKind::File,
        required: false,
    },
    FieldDef {
        name: "attachment4",
        label: "Additional attachment",
        help: None,
        kind: FieldKind::File,
        required: false,
    },
    FieldDef {
        name: "attachment5",
        label: "Additional attachment",
        help: None,
        kind: FieldKind::File,
        required: false,
    },
];

pub fn field(name: &str) -> Option<&'static FieldDef> {
    FIELDS.iter().find(|f| f.name == name)
}

pub fn attachment_fields() -> impl Iterator<Item = &'static FieldDef> {
    FIELDS.iter().filter(|f| f.kind == FieldKind::File)
}

/// Whether a selected action makes the update-URL field required.
pub fn action_requires_url(action: &str) -> bool {
    action.contains("Update") || action.contains("Remove")
}

pub fn is_valid_action(value: &str) -> bool {
    ACTION_CHOICES.contains(&value)
}
