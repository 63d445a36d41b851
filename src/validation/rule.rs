//! The rule capability and the error shapes it produces

use crate::registry::{FieldDescriptor, FieldValue};
use crate::state::{ControlState, Controls};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::fmt;

/// Error text recorded in place of a rule that failed to evaluate
pub const FAULT_TEXT: &str = "validator failed";

/// Identifier of a rule within one field
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleId(String);

impl RuleId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for RuleId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RuleId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for RuleId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// A single violated constraint: a message plus the offending value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationError {
    pub text: String,
    pub value: FieldValue,
}

impl ValidationError {
    pub fn new(text: impl Into<String>, value: FieldValue) -> Self {
        Self {
            text: text.into(),
            value,
        }
    }

    /// The synthetic error that stands in for a faulted rule
    pub fn fault(value: FieldValue) -> Self {
        Self::new(FAULT_TEXT, value)
    }
}

/// Errors for one field, keyed by rule id
///
/// Inserting under an existing id replaces the earlier error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<RuleId, ValidationError>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an error, returning the one it replaced
    pub fn insert(&mut self, rule: RuleId, error: ValidationError) -> Option<ValidationError> {
        self.0.insert(rule, error)
    }

    pub fn get(&self, rule: &str) -> Option<&ValidationError> {
        self.0.get(rule)
    }

    pub fn contains(&self, rule: &str) -> bool {
        self.0.contains_key(rule)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&RuleId, &ValidationError)> {
        self.0.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &RuleId> {
        self.0.keys()
    }
}

/// What a rule sees when it runs
///
/// `controls` is present whenever the control lives inside a form; it is
/// absent when a lone control is evaluated.
#[derive(Clone, Copy)]
pub struct RuleContext<'a> {
    descriptor: &'a FieldDescriptor,
    control: &'a ControlState,
    controls: Option<&'a Controls>,
}

impl<'a> RuleContext<'a> {
    pub fn new(
        descriptor: &'a FieldDescriptor,
        control: &'a ControlState,
        controls: Option<&'a Controls>,
    ) -> Self {
        Self {
            descriptor,
            control,
            controls,
        }
    }

    pub fn descriptor(&self) -> &'a FieldDescriptor {
        self.descriptor
    }

    pub fn control(&self) -> &'a ControlState {
        self.control
    }

    /// The value under evaluation
    pub fn value(&self) -> &'a FieldValue {
        self.control.value()
    }

    pub fn controls(&self) -> Option<&'a Controls> {
        self.controls
    }

    /// Look up another control of the same form
    pub fn sibling(&self, name: &str) -> Option<&'a ControlState> {
        self.controls.and_then(|controls| controls.get(name))
    }
}

/// Result of one rule evaluation. `Err` marks a fault, not a violation.
pub type RuleOutcome = anyhow::Result<Option<ValidationError>>;

/// A validation rule attached to a field
pub trait Rule: Send + Sync {
    /// Key under which this rule's error is stored
    fn id(&self) -> &RuleId;

    /// Check the current control state
    fn evaluate(&self, ctx: &RuleContext<'_>) -> RuleOutcome;

    /// Names of other fields whose values this rule reads
    fn depends_on(&self) -> &[String] {
        &[]
    }
}

/// Adapter turning a closure into a [`Rule`]
///
/// A closure that reads siblings through [`RuleContext::sibling`] must list
/// them with [`FnRule::depends_on`], otherwise it is not re-run when they
/// change.
pub struct FnRule<F> {
    id: RuleId,
    deps: Vec<String>,
    f: F,
}

impl<F> FnRule<F> {
    /// Declare the fields this closure reads
    pub fn depends_on<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.deps.extend(fields.into_iter().map(Into::into));
        self
    }
}

impl<F> Rule for FnRule<F>
where
    F: Fn(&RuleContext<'_>) -> RuleOutcome + Send + Sync,
{
    fn id(&self) -> &RuleId {
        &self.id
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> RuleOutcome {
        (self.f)(ctx)
    }

    fn depends_on(&self) -> &[String] {
        &self.deps
    }
}

/// Build a rule from a closure
pub fn from_fn<F>(id: impl Into<RuleId>, f: F) -> FnRule<F>
where
    F: Fn(&RuleContext<'_>) -> RuleOutcome + Send + Sync,
{
    FnRule {
        id: id.into(),
        deps: Vec::new(),
        f,
    }
}
