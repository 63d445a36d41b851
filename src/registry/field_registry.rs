//! The immutable set of field descriptors backing a form

use super::field::{FieldDescriptor, FieldKind};
use crate::error::{FormError, SchemaError};
use crate::validation::{rules, Rule, RuleId};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Descriptors of one form, in declaration order
#[derive(Debug)]
pub struct FieldRegistry {
    fields: Vec<FieldDescriptor>,
    index: HashMap<String, usize>,
    /// field name -> positions of fields whose rules read it
    dependents: HashMap<String, Vec<usize>>,
}

impl FieldRegistry {
    /// Validate and seal a list of descriptors.
    ///
    /// Implicit constraint rules (`min`, `max`, `step`, `option`) are
    /// attached here unless the field already carries a rule with that id.
    pub fn new(fields: Vec<FieldDescriptor>) -> Result<Self, SchemaError> {
        let mut index = HashMap::with_capacity(fields.len());
        let mut sealed = Vec::with_capacity(fields.len());

        for (position, field) in fields.into_iter().enumerate() {
            if field.name.is_empty() {
                return Err(SchemaError::EmptyName { label: field.label });
            }
            if index.insert(field.name.clone(), position).is_some() {
                return Err(SchemaError::DuplicateField { name: field.name });
            }
            check_value_kind(&field)?;
            check_constraints(&field)?;
            check_options(&field);
            sealed.push(attach_constraint_rules(field)?);
        }

        let mut dependents: HashMap<String, Vec<usize>> = HashMap::new();
        for (position, field) in sealed.iter().enumerate() {
            for rule in field.rules() {
                for target in rule.depends_on() {
                    if !index.contains_key(target) {
                        return Err(SchemaError::UnknownDependency {
                            field: field.name.clone(),
                            rule: rule.id().clone(),
                            target: target.clone(),
                        });
                    }
                    if *target == field.name {
                        continue;
                    }
                    let entry = dependents.entry(target.clone()).or_default();
                    if !entry.contains(&position) {
                        entry.push(position);
                    }
                }
            }
        }

        tracing::debug!("Registered {} form fields", sealed.len());
        Ok(Self {
            fields: sealed,
            index,
            dependents,
        })
    }

    /// Look up a descriptor by name
    pub fn get(&self, name: &str) -> Result<&FieldDescriptor, FormError> {
        self.index_of(name)
            .map(|position| &self.fields[position])
            .ok_or_else(|| FormError::not_found(name))
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub(crate) fn field_at(&self, position: usize) -> &FieldDescriptor {
        &self.fields[position]
    }

    /// All descriptors in declaration order
    pub fn iter(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|field| field.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Positions of fields with rules that read `name`
    pub fn dependents_of(&self, name: &str) -> &[usize] {
        self.dependents.get(name).map(Vec::as_slice).unwrap_or(&[])
    }
}

fn check_value_kind(field: &FieldDescriptor) -> Result<(), SchemaError> {
    if field.kind.accepts(&field.value) {
        return Ok(());
    }
    Err(SchemaError::ValueKind {
        field: field.name.clone(),
        kind: field.kind.tag(),
        actual: field.value.type_name(),
    })
}

fn check_constraints(field: &FieldDescriptor) -> Result<(), SchemaError> {
    if let FieldKind::Number { min, max, step } = &field.kind {
        if let (Some(min), Some(max)) = (min, max) {
            if min > max {
                return Err(SchemaError::constraint(
                    &field.name,
                    format!("min {min} is greater than max {max}"),
                ));
            }
        }
        if let Some(step) = step {
            if !step.is_finite() || *step <= 0.0 {
                return Err(SchemaError::constraint(
                    &field.name,
                    format!("step must be a positive number, got {step}"),
                ));
            }
        }
    }
    Ok(())
}

/// An initial choice outside the options list is tolerated, just reported.
fn check_options(field: &FieldDescriptor) {
    let Some(options) = field.kind.options() else {
        return;
    };
    let Some(value) = field.value.as_text() else {
        return;
    };
    if options.is_empty() || value.is_empty() {
        return;
    }
    if !options.iter().any(|option| option.key == value) {
        tracing::warn!(
            "Field '{}' starts with '{value}', which is not one of its options",
            field.name
        );
    }
}

fn attach_constraint_rules(mut field: FieldDescriptor) -> Result<FieldDescriptor, SchemaError> {
    let mut seen: HashSet<RuleId> = HashSet::new();
    for id in field.rule_ids() {
        if !seen.insert(id.clone()) {
            return Err(SchemaError::DuplicateRule {
                field: field.name.clone(),
                rule: id.clone(),
            });
        }
    }

    let implicit: Vec<Arc<dyn Rule>> = constraint_rules(&field.kind)
        .into_iter()
        .filter(|rule| !seen.contains(rule.id()))
        .collect();
    field.prepend_rules(implicit);
    Ok(field)
}

fn constraint_rules(kind: &FieldKind) -> Vec<Arc<dyn Rule>> {
    let mut implicit: Vec<Arc<dyn Rule>> = Vec::new();
    match kind {
        FieldKind::Number { min, max, step } => {
            if let Some(min) = *min {
                implicit.push(Arc::new(rules::min(
                    "min",
                    format!("must be at least {min}"),
                    min,
                )));
            }
            if let Some(max) = *max {
                implicit.push(Arc::new(rules::max(
                    "max",
                    format!("must be at most {max}"),
                    max,
                )));
            }
            if let Some(step) = *step {
                implicit.push(Arc::new(rules::step(
                    "step",
                    format!("must be in steps of {step}"),
                    step,
                    min.unwrap_or(0.0),
                )));
            }
        }
        FieldKind::Select { options } | FieldKind::Radio { options } if !options.is_empty() => {
            let keys = options
                .iter()
                .filter(|option| !option.disabled)
                .map(|option| option.key.clone())
                .collect();
            implicit.push(Arc::new(rules::one_of(
                "option",
                "not an available option",
                keys,
            )));
        }
        _ => {}
    }
    implicit
}
