use axum::http::HeaderMap;
use bytes::Bytes;

use super::{RawAttachment, RawSubmission};

/// Parse a form POST body based on its Content-Type header.
pub async fn parse(headers: &HeaderMap, body: Bytes) -> Result<RawSubmission, String> {
    let content_type = headers
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("application/x-www-form-urlencoded");

    if content_type.contains("multipart/form-data") {
        parse_multipart(headers, body).await
    } else if content_type.contains("application/x-www-form-urlencoded") {
        parse_form_urlencoded(&body)
    } else {
        Err(format!("Unsupported content type: {content_type}"))
    }
}

fn parse_form_urlencoded(body: &[u8]) -> Result<RawSubmission, String> {
    std::str::from_utf8(body).map_err(|e| format!("Invalid UTF-8: {e}"))?;

    let mut raw = RawSubmission::default();
    for (name, value) in form_urlencoded::parse(body) {
        raw.push_field(name.into_owned(), value.into_owned());
    }
    Ok(raw)
}

/// Parse multipart form data using multer. File parts with no filename or no
/// content (an empty file input) are dropped.
async fn parse_multipart(headers: &HeaderMap, body: Bytes) -> Result<RawSubmission, String> {
    let boundary = headers
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .and_then(|ct| multer::parse_boundary(ct).ok())
        .ok_or_else(|| "Missing multipart boundary".to_string())?;

    let stream = futures_util::stream::once(async { Ok::<_, std::io::Error>(body) });
    let mut multipart = multer::Multipart::new(stream, boundary);

    let mut raw = RawSubmission::default();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| format!("Multipart error: {e}"))?
    {
        let name = field.name().unwrap_or("unknown").to_string();
        let filename = field.file_name().map(|s| s.to_string());

        match filename {
            Some(filename) if !filename.is_empty() => {
                let content = field
                    .bytes()
                    .await
                    .map_err(|e| format!("File read error: {e}"))?;
                if !content.is_empty() {
                    raw.attachments.push(RawAttachment {
                        field: name,
                        filename,
                        content,
                    });
                }
            }
            _ => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| format!("Field read error: {e}"))?;
                raw.push_field(name, value);
            }
        }
    }

    Ok(raw)
}
