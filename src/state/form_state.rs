//! Form instances: one control per registered field

use super::control::{ControlSnapshot, ControlState};
use super::controls::Controls;
use super::events::FormEvent;
use crate::config::{FormOptions, ValidationPolicy};
use crate::error::FormError;
use crate::registry::{FieldRegistry, FieldValue, FormDefinition};
use crate::remote::Verdict;
use crate::validation::{evaluate, RuleId, ValidationErrors};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use uuid::Uuid;

/// Aggregate validity of a form
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormReport {
    pub valid: bool,
    /// Error sets of invalid gated fields, keyed by field name
    pub errors: BTreeMap<String, ValidationErrors>,
    /// Fields left out of the gate by policy
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub exempted: Vec<String>,
}

impl FormReport {
    /// Total number of errors across fields
    pub fn error_count(&self) -> usize {
        self.errors.values().map(ValidationErrors::len).sum()
    }

    pub fn field_errors(&self, name: &str) -> Option<&ValidationErrors> {
        self.errors.get(name)
    }
}

/// Serializable view of a whole form
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormSnapshot {
    pub id: Uuid,
    pub report: FormReport,
    pub controls: Vec<ControlSnapshot>,
}

/// A live form: the registry it was built from plus its controls
///
/// Mutation goes through [`set_value`](Self::set_value),
/// [`touch`](Self::touch) and [`record_verdict`](Self::record_verdict);
/// each keeps every error set consistent with the current values.
#[derive(Debug)]
pub struct Form {
    id: Uuid,
    registry: Arc<FieldRegistry>,
    options: FormOptions,
    policy: ValidationPolicy,
    controls: Controls,
}

impl Form {
    /// Instantiate a form, validating every initial value eagerly
    pub fn new(registry: Arc<FieldRegistry>, options: FormOptions) -> Self {
        let states = registry.iter().map(ControlState::pristine).collect();
        let mut form = Self {
            id: Uuid::new_v4(),
            registry,
            options,
            policy: ValidationPolicy::default(),
            controls: Controls::from_states(states),
        };
        for position in 0..form.controls.len() {
            form.revalidate(position);
        }
        tracing::debug!(
            "Created form {} with {} controls",
            form.id,
            form.controls.len()
        );
        form
    }

    pub fn from_definition(definition: FormDefinition) -> Result<Self, FormError> {
        let (registry, options) = definition.into_registry()?;
        Ok(Self::new(Arc::new(registry), options))
    }

    pub fn from_json(json: &str) -> Result<Self, FormError> {
        Self::from_definition(FormDefinition::from_json(json)?)
    }

    pub fn with_policy(mut self, policy: ValidationPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn registry(&self) -> &FieldRegistry {
        &self.registry
    }

    pub fn options(&self) -> &FormOptions {
        &self.options
    }

    pub fn policy(&self) -> ValidationPolicy {
        self.policy
    }

    pub fn controls(&self) -> &Controls {
        &self.controls
    }

    pub fn control(&self, name: &str) -> Result<&ControlState, FormError> {
        self.controls
            .get(name)
            .ok_or_else(|| FormError::not_found(name))
    }

    /// Write a new value, re-run the field's rules and those of any field
    /// whose rules read it.
    pub fn set_value(
        &mut self,
        name: &str,
        value: impl Into<FieldValue>,
    ) -> Result<&ControlState, FormError> {
        let position = self.position(name)?;
        let descriptor = self.registry.field_at(position);
        self.controls
            .at_mut(position)
            .write_value(descriptor, value.into())?;
        self.revalidate(position);

        let dependents = self.registry.dependents_of(name).to_vec();
        for dependent in dependents {
            self.revalidate(dependent);
        }

        let control = self.controls.at(position);
        tracing::debug!(
            "Set '{name}' to {} (valid={}, dirty={})",
            control.value(),
            control.valid(),
            control.dirty()
        );
        Ok(control)
    }

    /// Mark a field as touched
    pub fn touch(&mut self, name: &str) -> Result<&ControlState, FormError> {
        let position = self.position(name)?;
        tracing::debug!("Touched '{name}'");
        Ok(self.controls.at_mut(position).touch())
    }

    /// Store the result of an async check and re-run the field's rules
    pub fn record_verdict(
        &mut self,
        name: &str,
        rule: impl Into<RuleId>,
        verdict: Verdict,
    ) -> Result<&ControlState, FormError> {
        let position = self.position(name)?;
        self.controls
            .at_mut(position)
            .store_verdict(rule.into(), verdict);
        self.revalidate(position);
        Ok(self.controls.at(position))
    }

    /// Apply a queued interaction event
    pub fn apply(&mut self, event: &FormEvent) -> Result<&ControlState, FormError> {
        match event {
            FormEvent::SetValue { field, value } => self.set_value(field, value.clone()),
            FormEvent::Touch { field } => self.touch(field),
        }
    }

    /// Aggregate validity used to gate submission. Has no side effects.
    pub fn validate_all(&self) -> FormReport {
        let mut errors = BTreeMap::new();
        let mut exempted = Vec::new();

        for control in &self.controls {
            if self.policy.exempt_disabled && control.disabled() {
                exempted.push(control.name().to_string());
                continue;
            }
            if let Some(set) = control.errors() {
                errors.insert(control.name().to_string(), set.clone());
            }
        }

        FormReport {
            valid: errors.is_empty(),
            errors,
            exempted,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.validate_all().valid
    }

    /// Current value of every field
    pub fn values(&self) -> BTreeMap<String, FieldValue> {
        self.controls
            .iter()
            .map(|control| (control.name().to_string(), control.value().clone()))
            .collect()
    }

    /// Values that a submission carries: disabled fields are left out
    pub fn submitted_values(&self) -> BTreeMap<String, FieldValue> {
        self.controls
            .iter()
            .filter(|control| !control.disabled())
            .map(|control| (control.name().to_string(), control.value().clone()))
            .collect()
    }

    pub fn snapshot(&self) -> FormSnapshot {
        FormSnapshot {
            id: self.id,
            report: self.validate_all(),
            controls: self.controls.iter().map(ControlState::snapshot).collect(),
        }
    }

    fn position(&self, name: &str) -> Result<usize, FormError> {
        self.registry
            .index_of(name)
            .ok_or_else(|| FormError::not_found(name))
    }

    fn revalidate(&mut self, position: usize) {
        let descriptor = self.registry.field_at(position);
        let evaluation = evaluate(
            descriptor,
            self.controls.at(position),
            Some(&self.controls),
        );
        self.controls.at_mut(position).apply(evaluation);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{FieldDescriptor, FieldKind};
    use crate::validation::{from_fn, rules, RuleContext, FAULT_TEXT};
    use proptest::prelude::*;

    fn form(fields: Vec<FieldDescriptor>) -> Form {
        let registry = FieldRegistry::new(fields).unwrap();
        Form::new(Arc::new(registry), FormOptions::default())
    }

    fn required_name() -> FieldDescriptor {
        FieldDescriptor::text("name", "Name").with_rule(rules::required("nonEmpty", "required"))
    }

    fn signup() -> Form {
        form(vec![
            FieldDescriptor::password("password", "Password"),
            FieldDescriptor::password("confirmPassword", "Confirm password").with_rule(
                rules::matches("mismatch", "passwords do not match", "password"),
            ),
        ])
    }

    mod scenarios {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_required_text_field() {
            let mut form = form(vec![required_name()]);
            let control = form.control("name").unwrap();
            assert!(!control.valid());
            assert!(!control.dirty());
            let error = control.errors().unwrap().get("nonEmpty").unwrap();
            assert_eq!(error.text, "required");
            assert_eq!(error.value, FieldValue::from(""));

            let control = form.set_value("name", "hello").unwrap();
            assert!(control.valid());
            assert!(control.errors().is_none());
            assert!(control.dirty());
        }

        #[test]
        fn test_numeric_range() {
            let mut form = form(vec![FieldDescriptor::new(
                "qty",
                "Quantity",
                FieldKind::number(Some(1.0), Some(10.0), None),
            )
            .with_value(15)]);
            let control = form.control("qty").unwrap();
            assert!(control.has_error("max"));
            assert!(!control.has_error("min"));

            let control = form.set_value("qty", 5).unwrap();
            assert!(control.valid());
        }

        #[test]
        fn test_password_confirmation() {
            let mut form = signup();
            form.set_value("password", "abc").unwrap();
            let control = form.set_value("confirmPassword", "abx").unwrap();
            assert!(control.has_error("mismatch"));

            let control = form.set_value("confirmPassword", "abc").unwrap();
            assert!(control.valid());
        }

        #[test]
        fn test_faulting_rule_only_affects_itself() {
            let field = FieldDescriptor::text("code", "Code")
                .with_rule(from_fn("fragile", |ctx: &RuleContext<'_>| {
                    if ctx.value().as_text() == Some("crash") {
                        panic!("fragile rule gave up");
                    }
                    Ok(None)
                }))
                .with_rule(rules::max_length("long", "too long", 3));
            let mut form = form(vec![field]);

            let control = form.set_value("code", "crash").unwrap();
            assert_eq!(control.error_set().len(), 2);
            assert_eq!(control.errors().unwrap().get("fragile").unwrap().text, FAULT_TEXT);
            assert_eq!(control.errors().unwrap().get("long").unwrap().text, "too long");
            assert_eq!(control.faults().len(), 1);

            let control = form.set_value("code", "ok").unwrap();
            assert!(control.valid());
            assert!(control.faults().is_empty());
        }
    }

    mod cross_field {
        use super::*;
        use crate::validation::ValidationError;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_changing_target_revalidates_dependent() {
            let mut form = signup();
            form.set_value("password", "abc").unwrap();
            form.set_value("confirmPassword", "abc").unwrap();
            assert!(form.control("confirmPassword").unwrap().valid());

            form.set_value("password", "abd").unwrap();
            let confirm = form.control("confirmPassword").unwrap();
            assert!(confirm.has_error("mismatch"));
            assert!(confirm.dirty());

            form.set_value("password", "abc").unwrap();
            assert!(form.control("confirmPassword").unwrap().valid());
        }

        #[test]
        fn test_dependent_flags_untouched_by_revalidation() {
            let mut form = signup();
            form.set_value("password", "abc").unwrap();
            let confirm = form.control("confirmPassword").unwrap();
            assert!(!confirm.dirty());
            assert!(!confirm.touched());
        }

        #[test]
        fn test_closure_rule_revalidated_when_sibling_changes() {
            let same_as_password = from_fn("mismatch", |ctx: &RuleContext<'_>| {
                let password = ctx.sibling("password").map(|c| c.value().clone());
                Ok((password.as_ref() != Some(ctx.value()))
                    .then(|| ValidationError::new("differs", ctx.value().clone())))
            })
            .depends_on(["password"]);
            let mut form = form(vec![
                FieldDescriptor::password("password", "Password"),
                FieldDescriptor::password("confirm", "Confirm").with_rule(same_as_password),
            ]);
            assert_eq!(form.registry().dependents_of("password"), &[1]);

            form.set_value("password", "abc").unwrap();
            form.set_value("confirm", "abc").unwrap();
            assert!(form.control("confirm").unwrap().valid());

            form.set_value("password", "xyz").unwrap();
            assert!(form.control("confirm").unwrap().has_error("mismatch"));
        }

        #[test]
        fn test_initial_values_validated_with_siblings() {
            let form = form(vec![
                FieldDescriptor::password("password", "Password").with_value("abc"),
                FieldDescriptor::password("confirmPassword", "Confirm")
                    .with_value("xyz")
                    .with_rule(rules::matches("mismatch", "differs", "password")),
            ]);
            assert!(form
                .control("confirmPassword")
                .unwrap()
                .has_error("mismatch"));
        }
    }

    mod lookups {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_unknown_field_is_not_found() {
            let mut form = form(vec![required_name()]);
            assert!(matches!(
                form.set_value("nope", "x"),
                Err(FormError::NotFound { .. })
            ));
            assert!(matches!(form.touch("nope"), Err(FormError::NotFound { .. })));
            assert!(matches!(form.control("nope"), Err(FormError::NotFound { .. })));
        }

        #[test]
        fn test_type_mismatch_leaves_state_unchanged() {
            let mut form = form(vec![FieldDescriptor::checkbox("terms", "Terms")]);
            let before = form.control("terms").unwrap().clone();
            assert!(matches!(
                form.set_value("terms", "yes"),
                Err(FormError::TypeMismatch { .. })
            ));
            assert_eq!(form.control("terms").unwrap(), &before);
        }

        #[test]
        fn test_forms_share_registry_but_not_state() {
            let registry = Arc::new(FieldRegistry::new(vec![required_name()]).unwrap());
            let mut first = Form::new(Arc::clone(&registry), FormOptions::default());
            let second = Form::new(registry, FormOptions::default());
            first.set_value("name", "Ada").unwrap();
            assert!(first.is_valid());
            assert!(!second.is_valid());
            assert_ne!(first.id(), second.id());
        }
    }

    mod touch {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_touch_sets_flag_only() {
            let mut form = form(vec![required_name()]);
            let before = form.control("name").unwrap().error_set().clone();
            let control = form.touch("name").unwrap();
            assert!(control.touched());
            assert!(control.invalid());
            assert!(!control.dirty());
            assert_eq!(control.error_set(), &before);
        }

        #[test]
        fn test_apply_events() {
            let mut form = form(vec![required_name()]);
            form.apply(&FormEvent::set_value("name", "Ada")).unwrap();
            let control = form.apply(&FormEvent::touch("name")).unwrap();
            assert!(control.valid());
            assert!(control.dirty());
            assert!(control.touched());
        }
    }

    mod validate_all {
        use super::*;
        use pretty_assertions::assert_eq;

        fn mixed() -> Form {
            form(vec![
                required_name(),
                FieldDescriptor::text("locked", "Locked")
                    .with_disabled(true)
                    .with_rule(rules::required("nonEmpty", "required")),
            ])
        }

        #[test]
        fn test_reports_union_of_errors() {
            let report = mixed().validate_all();
            assert!(!report.valid);
            assert!(report.field_errors("name").unwrap().contains("nonEmpty"));
            assert_eq!(report.error_count(), 1);
            assert_eq!(report.exempted, vec!["locked".to_string()]);
        }

        #[test]
        fn test_disabled_fields_are_exempt_by_default() {
            let mut form = mixed();
            form.set_value("name", "Ada").unwrap();
            assert!(form.validate_all().valid);
            // The disabled field is still evaluated.
            assert!(form.control("locked").unwrap().invalid());
        }

        #[test]
        fn test_policy_can_gate_disabled_fields() {
            let mut form = mixed().with_policy(ValidationPolicy {
                exempt_disabled: false,
            });
            form.set_value("name", "Ada").unwrap();
            let report = form.validate_all();
            assert!(!report.valid);
            assert!(report.field_errors("locked").is_some());
            assert!(report.exempted.is_empty());
        }

        #[test]
        fn test_is_pure() {
            let mut form = mixed();
            form.touch("name").unwrap();
            let before: Vec<_> = form.controls().iter().cloned().collect();
            let first = form.validate_all();
            let second = form.validate_all();
            assert_eq!(first, second);
            let after: Vec<_> = form.controls().iter().cloned().collect();
            assert_eq!(before, after);
        }

        #[test]
        fn test_submitted_values_skip_disabled() {
            let form = mixed();
            assert_eq!(form.values().len(), 2);
            let submitted = form.submitted_values();
            assert_eq!(submitted.len(), 1);
            assert!(submitted.contains_key("name"));
        }

        #[test]
        fn test_snapshot_serializes() {
            let form = mixed();
            let json = serde_json::to_value(form.snapshot()).unwrap();
            assert_eq!(json["report"]["valid"], serde_json::json!(false));
            assert_eq!(json["controls"][0]["name"], serde_json::json!("name"));
            assert_eq!(
                json["controls"][0]["errors"]["nonEmpty"]["text"],
                serde_json::json!("required")
            );
        }
    }

    #[derive(Debug, Clone)]
    enum Action {
        Set(String),
        Touch,
    }

    fn action() -> impl Strategy<Value = Action> {
        prop_oneof![
            "[ab]{0,3}".prop_map(Action::Set),
            Just(Action::Touch),
        ]
    }

    proptest! {
        #[test]
        fn test_flags_are_monotonic(actions in prop::collection::vec(action(), 0..24)) {
            let mut form = form(vec![required_name()]);
            let (mut was_dirty, mut was_touched) = (false, false);
            for action in actions {
                let errors_before = form.control("name").unwrap().error_set().clone();
                let control = match action {
                    Action::Set(value) => form.set_value("name", value).unwrap(),
                    Action::Touch => {
                        let control = form.touch("name").unwrap();
                        prop_assert_eq!(control.error_set(), &errors_before);
                        control
                    }
                };
                prop_assert!(!was_dirty || control.dirty());
                prop_assert!(!was_touched || control.touched());
                prop_assert_eq!(control.valid(), control.error_set().is_empty());
                prop_assert_eq!(control.invalid(), !control.valid());
                was_dirty = control.dirty();
                was_touched = control.touched();
            }
        }

        #[test]
        fn test_set_value_is_idempotent(value in "[a-z]{0,8}") {
            let field = FieldDescriptor::text("code", "Code")
                .with_rule(rules::required("required", "required"))
                .with_rule(rules::min_length("short", "too short", 3))
                .with_rule(rules::max_length("long", "too long", 5));
            let mut form = form(vec![field]);
            let once = form.set_value("code", value.as_str()).unwrap().clone();
            let twice = form.set_value("code", value.as_str()).unwrap().clone();
            prop_assert_eq!(once.error_set(), twice.error_set());
            prop_assert_eq!(once.valid(), twice.valid());
        }

        #[test]
        fn test_initial_validity_matches_errors(value in "[a-z]{0,4}") {
            let form = form(vec![required_name().with_value(value.as_str())]);
            let control = form.control("name").unwrap();
            prop_assert_eq!(control.valid(), control.errors().is_none());
            prop_assert!(!control.dirty());
            prop_assert!(!control.touched());
        }
    }
}
