use super::ValidatedSubmission;

const NOT_SPECIFIED: &str = "Not specified";

/// Render the ticket body: one "Label: value" line per textual field, in
/// schema order. Multi-choice actions are joined with " / ". Plain text —
/// neither backend renders the description as HTML.
///
/// `identity_id` prepends a requester line; only the Zendesk backend asks
/// for it.
pub fn format_body(submission: &ValidatedSubmission, identity_id: Option<&str>) -> String {
    let mut lines = Vec::new();

    if let Some(id) = identity_id {
        lines.push(format!("Requester id: {id}"));
    }

    lines.push(format!("Name: {}", submission.name));
    lines.push(format!("Department: {}", submission.department));
    lines.push(format!("Email: {}", submission.email));
    lines.push(format!(
        "Telephone: {}",
        submission.telephone.as_deref().unwrap_or(NOT_SPECIFIED)
    ));
    lines.push(format!("Action: {}", submission.actions.join(" / ")));
    lines.push(format!("Description: {}", submission.description));
    lines.push(format!(
        "Update URL: {}",
        submission.update_url.as_deref().unwrap_or(NOT_SPECIFIED)
    ));
    lines.push(format!(
        "Due date: {}",
        submission
            .due_date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| NOT_SPECIFIED.to_string())
    ));
    lines.push(format!(
        "Due date explanation: {}",
        submission
            .date_explanation
            .as_deref()
            .unwrap_or(NOT_SPECIFIED)
    ));

    lines.join("\n")
}
