//! Contact form intake: field validation and relay to the form processor.
//!
//! Nothing is stored locally. A submission is validated, forwarded once and
//! the visitor is told whether it went through.

use std::sync::OnceLock;

use anyhow::{Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::i18n::LocaleStrings;

pub const MESSAGE_MAX_CHARS: usize = 500;

static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContactSubmission {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub consent: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldErrorKind {
    Required,
    InvalidEmail,
    TooLong,
    ConsentRequired,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub kind: FieldErrorKind,
}

impl FieldError {
    fn new(field: &'static str, kind: FieldErrorKind) -> Self {
        Self { field, kind }
    }

    /// Message shown next to the field.
    pub fn message(&self, strings: &LocaleStrings) -> String {
        match self.kind {
            FieldErrorKind::Required => strings.contact_required.to_string(),
            FieldErrorKind::InvalidEmail => strings.contact_invalid_email.to_string(),
            FieldErrorKind::TooLong => strings
                .contact_max_length
                .replace("{max}", &MESSAGE_MAX_CHARS.to_string()),
            FieldErrorKind::ConsentRequired => strings.contact_consent.to_string(),
        }
    }
}

pub fn is_valid_email(email: &str) -> bool {
    let regex = EMAIL_REGEX.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());
    regex.is_match(email.trim())
}

impl ContactSubmission {
    /// Every failing field, in form order.
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();

        if self.name.trim().is_empty() {
            errors.push(FieldError::new("name", FieldErrorKind::Required));
        }
        if !is_valid_email(&self.email) {
            errors.push(FieldError::new("email", FieldErrorKind::InvalidEmail));
        }
        if self.message.trim().is_empty() {
            errors.push(FieldError::new("message", FieldErrorKind::Required));
        } else if self.message.chars().count() > MESSAGE_MAX_CHARS {
            errors.push(FieldError::new("message", FieldErrorKind::TooLong));
        }
        if !self.consent {
            errors.push(FieldError::new("consent", FieldErrorKind::ConsentRequired));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Forwards submissions to the third-party form endpoint.
#[derive(Debug, Clone)]
pub struct ContactClient {
    client: reqwest::Client,
    endpoint: String,
}

impl ContactClient {
    pub fn new(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    /// Single POST, no retry: the visitor resubmits if it fails.
    pub async fn submit(&self, submission: &ContactSubmission) -> Result<()> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("Accept", "application/json")
            .json(submission)
            .send()
            .await
            .context("Failed to send request to form endpoint")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!("Contact relay rejected ({}): {}", status, body);
            anyhow::bail!("Form endpoint error ({}): {}", status, body);
        }

        info!("Contact submission relayed");
        Ok(())
    }
}
