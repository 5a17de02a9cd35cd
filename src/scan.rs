use bytes::Bytes;
use serde::Deserialize;

use crate::config::AvConfig;

/// Outcome of a rejected or failed antivirus scan.
#[derive(Debug)]
pub enum ScanError {
    /// The scanner flagged the file and the reason names an encrypted payload.
    EncryptedFile,
    Malware(String),
    /// Transport failure or malformed scanner response.
    Service(String),
}

impl std::fmt::Display for ScanError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScanError::EncryptedFile => write!(f, "encrypted file rejected"),
            ScanError::Malware(reason) => write!(f, "malware detected: {reason}"),
            ScanError::Service(msg) => write!(f, "scan service error: {msg}"),
        }
    }
}

impl ScanError {
    /// Message shown against the attachment field on the form.
    pub fn user_message(&self) -> &'static str {
        match self {
            ScanError::EncryptedFile => "You cannot upload encrypted files.",
            ScanError::Malware(_) => "File appears to contain malware.",
            ScanError::Service(_) => "The file could not be scanned. Please try again.",
        }
    }
}

#[derive(Deserialize)]
struct ScanResponse {
    malware: bool,
    reason: String,
}

/// Client for the antivirus scanning service.
pub struct Scanner {
    client: reqwest::Client,
    url: String,
    username: String,
    password: String,
}

impl Scanner {
    pub fn new(config: &AvConfig) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(10))
                .build()
                .expect("Failed to build reqwest client"),
            url: config.url.clone(),
            username: config.username.clone(),
            password: config.password.clone(),
        }
    }

    /// Submit a file for scanning. `Ok(())` means the file is accepted.
    pub async fn scan(&self, filename: &str, content: Bytes) -> Result<(), ScanError> {
        let part = reqwest::multipart::Part::bytes(content.to_vec())
            .file_name(filename.to_string());
        let form = reqwest::multipart::Form::new().part("file", part);

        let resp = self
            .client
            .post(&self.url)
            .basic_auth(&self.username, Some(&self.password))
            .multipart(form)
            .send()
            .await
            .map_err(|e| ScanError::Service(format!("scan request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(ScanError::Service(format!(
                "scan service returned status {}",
                resp.status()
            )));
        }

        let result: ScanResponse = resp
            .json()
            .await
            .map_err(|e| ScanError::Service(format!("invalid scan response: {e}")))?;

        if result.malware && result.reason.contains("Encrypted") {
            tracing::warn!(filename, reason = %result.reason, "Encrypted file detected");
            return Err(ScanError::EncryptedFile);
        }
        if result.malware {
            tracing::warn!(filename, reason = %result.reason, "Malware detected");
            return Err(ScanError::Malware(result.reason));
        }

        Ok(())
    }
}
