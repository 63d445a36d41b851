//! JSON form definitions
//!
//! A definition is the serializable twin of a [`FieldRegistry`]: rules are
//! named by tag instead of being trait objects.
//!
//! ```json
//! {
//!   "options": { "method": "post" },
//!   "fields": [
//!     { "name": "age", "label": "Age", "type": "number", "min": 1, "max": 10,
//!       "value": 5,
//!       "validations": [ { "rule": "required", "text": "required" } ] }
//!   ]
//! }
//! ```

use super::field::{FieldDescriptor, FieldKind};
use super::field_registry::FieldRegistry;
use super::value::FieldValue;
use crate::config::FormOptions;
use crate::error::{FormError, SchemaError};
use crate::remote::RemoteRule;
use crate::validation::{rules, Rule, RuleId};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A whole form: options plus fields in declaration order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormDefinition {
    #[serde(default)]
    pub options: FormOptions,
    #[serde(default)]
    pub fields: Vec<FieldDefinition>,
}

impl FormDefinition {
    pub fn from_json(json: &str) -> Result<Self, FormError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Build the registry; options are returned untouched
    pub fn into_registry(self) -> Result<(FieldRegistry, FormOptions), FormError> {
        let descriptors = self
            .fields
            .into_iter()
            .map(FieldDefinition::into_descriptor)
            .collect::<Result<Vec<_>, _>>()?;
        let registry = FieldRegistry::new(descriptors)?;
        Ok((registry, self.options))
    }
}

/// One field of a definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub name: String,
    #[serde(default)]
    pub label: String,
    #[serde(flatten)]
    pub kind: FieldKind,
    #[serde(default)]
    pub value: Option<FieldValue>,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default)]
    pub placeholder: Option<String>,
    #[serde(default)]
    pub custom_class: Option<String>,
    #[serde(default)]
    pub validations: Vec<ValidationSpec>,
}

impl FieldDefinition {
    pub fn into_descriptor(self) -> Result<FieldDescriptor, SchemaError> {
        let mut descriptor = FieldDescriptor::new(&self.name, &self.label, self.kind)
            .with_disabled(self.disabled);
        if let Some(value) = self.value {
            descriptor = descriptor.with_value(value);
        }
        descriptor.placeholder = self.placeholder;
        descriptor.custom_class = self.custom_class;
        for spec in &self.validations {
            let rule = spec.build(&self.name, &descriptor.kind)?;
            descriptor = descriptor.with_shared_rule(rule);
        }
        Ok(descriptor)
    }
}

/// A validation entry: message, optional explicit key, rule parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationSpec {
    #[serde(default)]
    pub key: Option<String>,
    pub text: String,
    #[serde(flatten)]
    pub rule: RuleSpec,
}

/// Built-in rules available to definitions
///
/// `step`, `option`, `min` and `max` replace the implicit constraint rule of
/// the same id when no explicit `key` is given.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "kebab-case")]
pub enum RuleSpec {
    Required,
    MinLength {
        length: usize,
    },
    MaxLength {
        length: usize,
    },
    Min {
        min: f64,
    },
    Max {
        max: f64,
    },
    /// `base` defaults to the field's `min`, then 0
    Step {
        step: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        base: Option<f64>,
    },
    #[serde(rename = "option")]
    OneOf {
        keys: Vec<String>,
    },
    Email,
    Url,
    Pattern {
        pattern: String,
    },
    Matches {
        field: String,
    },
    /// Reads verdicts recorded by an async check; `text` is reported while
    /// the verdict is missing when `pending` is set
    Remote {
        #[serde(default)]
        pending: bool,
    },
}

impl RuleSpec {
    pub fn tag(&self) -> &'static str {
        match self {
            RuleSpec::Required => "required",
            RuleSpec::MinLength { .. } => "min-length",
            RuleSpec::MaxLength { .. } => "max-length",
            RuleSpec::Min { .. } => "min",
            RuleSpec::Max { .. } => "max",
            RuleSpec::Step { .. } => "step",
            RuleSpec::OneOf { .. } => "option",
            RuleSpec::Email => "email",
            RuleSpec::Url => "url",
            RuleSpec::Pattern { .. } => "pattern",
            RuleSpec::Matches { .. } => "matches",
            RuleSpec::Remote { .. } => "remote",
        }
    }
}

impl ValidationSpec {
    /// The explicit key, or the rule tag when none is given
    pub fn id(&self) -> RuleId {
        match &self.key {
            Some(key) => RuleId::from(key.as_str()),
            None => RuleId::from(self.rule.tag()),
        }
    }

    fn build(&self, field: &str, kind: &FieldKind) -> Result<Arc<dyn Rule>, SchemaError> {
        let id = self.id();
        let text = self.text.clone();
        let rule: Arc<dyn Rule> = match &self.rule {
            RuleSpec::Required => Arc::new(rules::required(id, text)),
            RuleSpec::MinLength { length } => Arc::new(rules::min_length(id, text, *length)),
            RuleSpec::MaxLength { length } => Arc::new(rules::max_length(id, text, *length)),
            RuleSpec::Min { min } => Arc::new(rules::min(id, text, *min)),
            RuleSpec::Max { max } => Arc::new(rules::max(id, text, *max)),
            RuleSpec::Step { step, base } => {
                if *step <= 0.0 {
                    return Err(SchemaError::constraint(field, "step must be positive"));
                }
                let base = base.unwrap_or(match kind {
                    FieldKind::Number { min, .. } => min.unwrap_or(0.0),
                    _ => 0.0,
                });
                Arc::new(rules::step(id, text, *step, base))
            }
            RuleSpec::OneOf { keys } => Arc::new(rules::one_of(id, text, keys.clone())),
            RuleSpec::Email => Arc::new(rules::email(id, text)),
            RuleSpec::Url => Arc::new(rules::url(id, text)),
            RuleSpec::Pattern { pattern } => Arc::new(
                rules::pattern(id, text, pattern).map_err(|e| SchemaError::InvalidPattern {
                    field: field.to_string(),
                    reason: e.to_string(),
                })?,
            ),
            RuleSpec::Matches { field: other } => Arc::new(rules::matches(id, text, other)),
            RuleSpec::Remote { pending: false } => Arc::new(RemoteRule::new(id)),
            RuleSpec::Remote { pending: true } => Arc::new(RemoteRule::new(id).pending(text)),
        };
        Ok(rule)
    }
}
