//! Per-field runtime state

use crate::error::{FormError, RuleFault};
use crate::registry::{FieldDescriptor, FieldValue};
use crate::remote::Verdict;
use crate::validation::{evaluate, Evaluation, RuleId, ValidationErrors};
use serde::Serialize;
use std::collections::BTreeMap;

/// Mutable state of one field in a live form
///
/// Validity is derived from `errors`, so `valid`/`invalid` can never
/// disagree with the error set. `dirty` and `touched` only ever go from
/// false to true.
#[derive(Debug, Clone, PartialEq)]
pub struct ControlState {
    name: String,
    value: FieldValue,
    initial: FieldValue,
    disabled: bool,
    dirty: bool,
    touched: bool,
    errors: ValidationErrors,
    faults: Vec<RuleFault>,
    verdicts: BTreeMap<RuleId, Verdict>,
}

impl ControlState {
    /// Create a control and validate its initial value.
    ///
    /// Cross-field rules see no siblings here; a [`Form`](crate::Form)
    /// re-evaluates them with the full collection.
    pub fn initialize(descriptor: &FieldDescriptor) -> Self {
        let mut control = Self::pristine(descriptor);
        let evaluation = evaluate(descriptor, &control, None);
        control.apply(evaluation);
        control
    }

    /// A control with no evaluation run yet
    pub(crate) fn pristine(descriptor: &FieldDescriptor) -> Self {
        Self {
            name: descriptor.name.clone(),
            value: descriptor.value.clone(),
            initial: descriptor.value.clone(),
            disabled: descriptor.disabled,
            dirty: false,
            touched: false,
            errors: ValidationErrors::new(),
            faults: Vec::new(),
            verdicts: BTreeMap::new(),
        }
    }

    /// Replace the value of a lone control and re-run its rules
    pub fn set_value(
        &mut self,
        descriptor: &FieldDescriptor,
        value: impl Into<FieldValue>,
    ) -> Result<&Self, FormError> {
        self.write_value(descriptor, value.into())?;
        let evaluation = evaluate(descriptor, self, None);
        self.apply(evaluation);
        Ok(self)
    }

    /// Mark the control as having lost focus. Rules are not re-run.
    pub fn touch(&mut self) -> &Self {
        self.touched = true;
        self
    }

    pub(crate) fn write_value(
        &mut self,
        descriptor: &FieldDescriptor,
        value: FieldValue,
    ) -> Result<(), FormError> {
        if !descriptor.kind.accepts(&value) {
            return Err(FormError::TypeMismatch {
                field: self.name.clone(),
                expected: descriptor.kind.expected_type(),
                actual: value.type_name(),
            });
        }
        self.dirty = self.dirty || value != self.initial;
        self.value = value;
        Ok(())
    }

    /// Replace errors and faults with a fresh evaluation
    pub(crate) fn apply(&mut self, evaluation: Evaluation) {
        self.errors = evaluation.errors;
        self.faults = evaluation.faults;
    }

    pub(crate) fn store_verdict(&mut self, rule: RuleId, verdict: Verdict) {
        self.verdicts.insert(rule, verdict);
    }

    /// Field name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current value
    pub fn value(&self) -> &FieldValue {
        &self.value
    }

    /// Value the control started with
    pub fn initial_value(&self) -> &FieldValue {
        &self.initial
    }

    /// Whether the field is disabled
    pub fn disabled(&self) -> bool {
        self.disabled
    }

    /// True when no rule reports an error
    pub fn valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Inverse of [`ControlState::valid`]
    pub fn invalid(&self) -> bool {
        !self.valid()
    }

    /// Whether the value ever differed from the initial value
    pub fn dirty(&self) -> bool {
        self.dirty
    }

    /// Whether the control was ever touched
    pub fn touched(&self) -> bool {
        self.touched
    }

    /// Current errors, or `None` when the control is valid
    pub fn errors(&self) -> Option<&ValidationErrors> {
        if self.errors.is_empty() {
            None
        } else {
            Some(&self.errors)
        }
    }

    /// Error set, empty when valid
    pub fn error_set(&self) -> &ValidationErrors {
        &self.errors
    }

    /// Whether the rule with this id reports an error
    pub fn has_error(&self, rule: &str) -> bool {
        self.errors.contains(rule)
    }

    /// Rule faults from the latest evaluation
    pub fn faults(&self) -> &[RuleFault] {
        &self.faults
    }

    /// Latest async verdict recorded for a rule
    pub fn verdict(&self, rule: &str) -> Option<&Verdict> {
        self.verdicts.get(rule)
    }

    /// Serializable view of this control
    pub fn snapshot(&self) -> ControlSnapshot {
        ControlSnapshot {
            name: self.name.clone(),
            value: self.value.clone(),
            valid: self.valid(),
            invalid: self.invalid(),
            dirty: self.dirty,
            touched: self.touched,
            disabled: self.disabled,
            errors: self.errors().cloned(),
            faults: self.faults.iter().map(ToString::to_string).collect(),
        }
    }
}

/// Serializable view of a control, as consumed by display layers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ControlSnapshot {
    pub name: String,
    pub value: FieldValue,
    pub valid: bool,
    pub invalid: bool,
    pub dirty: bool,
    pub touched: bool,
    pub disabled: bool,
    pub errors: Option<ValidationErrors>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub faults: Vec<String>,
}
