//! Submission gating: validity first, then the honeypot

use super::traits::SubmissionSink;
use crate::error::FormError;
use crate::registry::FieldValue;
use crate::state::{Form, FormReport};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use uuid::Uuid;

/// Payload handed to a [`SubmissionSink`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Submission {
    pub form_id: Uuid,
    pub method: String,
    /// Values of enabled fields
    pub values: BTreeMap<String, FieldValue>,
    /// Name of the honeypot field, when the spam filter is on
    #[serde(skip_serializing_if = "Option::is_none")]
    pub honeypot_field: Option<String>,
    pub submitted_at: DateTime<Utc>,
}

impl Submission {
    /// Build the payload for a form's current state
    pub fn from_form(form: &Form) -> Self {
        let options = form.options();
        Self {
            form_id: form.id(),
            method: options.method().to_string(),
            values: form.submitted_values(),
            honeypot_field: options.honeypot_field().map(str::to_string),
            submitted_at: Utc::now(),
        }
    }
}

/// What happened to a submission attempt
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SubmitOutcome {
    /// The sink accepted the payload
    Delivered { submission: Submission },
    /// The form is invalid; nothing was sent
    Blocked { report: FormReport },
    /// The honeypot was filled in; nothing was sent
    Discarded,
}

/// Gate a form on `validate_all` and the honeypot, then deliver it.
///
/// `honeypot` is the raw value the client sent for the honeypot field.
pub async fn submit<S: SubmissionSink + ?Sized>(
    form: &Form,
    honeypot: Option<&str>,
    sink: &mut S,
) -> Result<SubmitOutcome, FormError> {
    let report = form.validate_all();
    if !report.valid {
        tracing::info!(
            "Submission of form {} blocked by {} validation errors",
            form.id(),
            report.error_count()
        );
        return Ok(SubmitOutcome::Blocked { report });
    }

    if let Some(field) = form.options().honeypot_field() {
        if honeypot.is_some_and(|value| !value.is_empty()) {
            tracing::info!(
                "Discarding submission of form {}: honeypot '{field}' was filled",
                form.id()
            );
            return Ok(SubmitOutcome::Discarded);
        }
    }

    let submission = Submission::from_form(form);
    sink.deliver(submission.clone()).await?;
    tracing::info!(
        "Delivered form {} via {} with {} fields",
        form.id(),
        submission.method,
        submission.values.len()
    );
    Ok(SubmitOutcome::Delivered { submission })
}
