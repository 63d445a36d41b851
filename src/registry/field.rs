//! Field descriptors and the closed set of field kinds

use super::value::FieldValue;
use crate::validation::{Rule, RuleId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// One entry of a select or radio list
///
/// `key` is what gets submitted, `value` is the text shown to the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectOption {
    pub key: String,
    pub value: String,
    #[serde(default)]
    pub disabled: bool,
}

impl SelectOption {
    /// Create an enabled option
    pub fn new(key: &str, value: &str) -> Self {
        Self {
            key: key.to_string(),
            value: value.to_string(),
            disabled: false,
        }
    }

    /// Mark the option as not selectable
    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }
}

/// Input kinds, each carrying only the attributes meaningful to it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Email,
    Url,
    Password,
    Color,
    Number {
        min: Option<f64>,
        max: Option<f64>,
        step: Option<f64>,
    },
    Textarea {
        cols: Option<u16>,
        rows: Option<u16>,
    },
    Select {
        #[serde(default)]
        options: Vec<SelectOption>,
    },
    Checkbox,
    Radio {
        #[serde(default)]
        options: Vec<SelectOption>,
    },
    #[serde(rename = "custom-field")]
    Custom,
}

impl FieldKind {
    /// Create a number kind
    pub fn number(min: Option<f64>, max: Option<f64>, step: Option<f64>) -> Self {
        FieldKind::Number { min, max, step }
    }

    /// Create a select kind
    pub fn select(options: Vec<SelectOption>) -> Self {
        FieldKind::Select { options }
    }

    /// Create a radio kind
    pub fn radio(options: Vec<SelectOption>) -> Self {
        FieldKind::Radio { options }
    }

    /// The tag used for this kind in form definitions
    pub fn tag(&self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Email => "email",
            FieldKind::Url => "url",
            FieldKind::Password => "password",
            FieldKind::Color => "color",
            FieldKind::Number { .. } => "number",
            FieldKind::Textarea { .. } => "textarea",
            FieldKind::Select { .. } => "select",
            FieldKind::Checkbox => "checkbox",
            FieldKind::Radio { .. } => "radio",
            FieldKind::Custom => "custom-field",
        }
    }

    /// Whether a value of this type may be stored in a field of this kind
    pub fn accepts(&self, value: &FieldValue) -> bool {
        match self {
            FieldKind::Number { .. } => matches!(value, FieldValue::Number(_)),
            FieldKind::Checkbox => matches!(value, FieldValue::Bool(_)),
            FieldKind::Select { .. } | FieldKind::Custom => {
                matches!(value, FieldValue::Text(_) | FieldValue::Bool(_))
            }
            _ => matches!(value, FieldValue::Text(_)),
        }
    }

    /// Human-readable description of accepted value types
    pub fn expected_type(&self) -> &'static str {
        match self {
            FieldKind::Number { .. } => "number",
            FieldKind::Checkbox => "boolean",
            FieldKind::Select { .. } | FieldKind::Custom => "string or boolean",
            _ => "string",
        }
    }

    /// Initial value used when a definition does not supply one
    pub fn default_value(&self) -> FieldValue {
        match self {
            FieldKind::Number { .. } => FieldValue::Number(0.0),
            FieldKind::Checkbox => FieldValue::Bool(false),
            _ => FieldValue::Text(String::new()),
        }
    }

    /// Options list for select and radio kinds
    pub fn options(&self) -> Option<&[SelectOption]> {
        match self {
            FieldKind::Select { options } | FieldKind::Radio { options } => Some(options),
            _ => None,
        }
    }
}

/// Immutable description of one form input
#[derive(Clone)]
pub struct FieldDescriptor {
    pub name: String,
    pub label: String,
    pub kind: FieldKind,
    pub value: FieldValue,
    pub disabled: bool,
    pub placeholder: Option<String>,
    /// Styling hook, passed through untouched
    pub custom_class: Option<String>,
    rules: Vec<Arc<dyn Rule>>,
}

impl FieldDescriptor {
    /// Create a field of any kind with the kind's default value
    pub fn new(name: &str, label: &str, kind: FieldKind) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            value: kind.default_value(),
            kind,
            disabled: false,
            placeholder: None,
            custom_class: None,
            rules: Vec::new(),
        }
    }

    /// Create a new text field
    pub fn text(name: &str, label: &str) -> Self {
        Self::new(name, label, FieldKind::Text)
    }

    /// Create a new email field
    pub fn email(name: &str, label: &str) -> Self {
        Self::new(name, label, FieldKind::Email)
    }

    /// Create a new URL field
    pub fn url(name: &str, label: &str) -> Self {
        Self::new(name, label, FieldKind::Url)
    }

    /// Create a new password field
    pub fn password(name: &str, label: &str) -> Self {
        Self::new(name, label, FieldKind::Password)
    }

    /// Create a new textarea field
    pub fn textarea(name: &str, label: &str) -> Self {
        Self::new(
            name,
            label,
            FieldKind::Textarea {
                cols: None,
                rows: None,
            },
        )
    }

    /// Create an unbounded number field
    pub fn number(name: &str, label: &str) -> Self {
        Self::new(name, label, FieldKind::number(None, None, None))
    }

    /// Create a new checkbox field, unchecked
    pub fn checkbox(name: &str, label: &str) -> Self {
        Self::new(name, label, FieldKind::Checkbox)
    }

    /// Create a new select field
    pub fn select(name: &str, label: &str, options: Vec<SelectOption>) -> Self {
        Self::new(name, label, FieldKind::select(options))
    }

    /// Create a new radio field
    pub fn radio(name: &str, label: &str, options: Vec<SelectOption>) -> Self {
        Self::new(name, label, FieldKind::radio(options))
    }

    /// Set the initial value
    pub fn with_value(mut self, value: impl Into<FieldValue>) -> Self {
        self.value = value.into();
        self
    }

    /// Attach a rule after the ones already present
    pub fn with_rule(self, rule: impl Rule + 'static) -> Self {
        self.with_shared_rule(Arc::new(rule))
    }

    /// Attach a rule that is already shared
    pub fn with_shared_rule(mut self, rule: Arc<dyn Rule>) -> Self {
        self.rules.push(rule);
        self
    }

    /// Set the disabled flag
    pub fn with_disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Set the placeholder text
    pub fn with_placeholder(mut self, placeholder: &str) -> Self {
        self.placeholder = Some(placeholder.to_string());
        self
    }

    /// Set the styling class
    pub fn with_class(mut self, class: &str) -> Self {
        self.custom_class = Some(class.to_string());
        self
    }

    /// Rules in evaluation order
    pub fn rules(&self) -> &[Arc<dyn Rule>] {
        &self.rules
    }

    /// Rule ids in evaluation order
    pub fn rule_ids(&self) -> impl Iterator<Item = &RuleId> {
        self.rules.iter().map(|rule| rule.id())
    }

    pub(crate) fn prepend_rules(&mut self, mut rules: Vec<Arc<dyn Rule>>) {
        rules.append(&mut self.rules);
        self.rules = rules;
    }
}

impl fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("label", &self.label)
            .field("kind", &self.kind)
            .field("value", &self.value)
            .field("disabled", &self.disabled)
            .field("placeholder", &self.placeholder)
            .field("custom_class", &self.custom_class)
            .field("rules", &self.rule_ids().collect::<Vec<_>>())
            .finish()
    }
}
