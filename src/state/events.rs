//! Interaction events a host can queue and replay against a form

use crate::registry::FieldValue;
use serde::{Deserialize, Serialize};

/// A single user interaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum FormEvent {
    /// The user edited a field
    SetValue { field: String, value: FieldValue },
    /// A field lost focus
    Touch { field: String },
}

impl FormEvent {
    pub fn set_value(field: &str, value: impl Into<FieldValue>) -> Self {
        FormEvent::SetValue {
            field: field.to_string(),
            value: value.into(),
        }
    }

    pub fn touch(field: &str) -> Self {
        FormEvent::Touch {
            field: field.to_string(),
        }
    }

    /// Name of the field the event targets
    pub fn field(&self) -> &str {
        match self {
            FormEvent::SetValue { field, .. } | FormEvent::Touch { field } => field,
        }
    }
}
