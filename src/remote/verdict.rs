//! Verdicts of async checks and the rule that reads them

use crate::registry::FieldValue;
use crate::validation::{Rule, RuleContext, RuleId, RuleOutcome, ValidationError};
use anyhow::anyhow;

/// How an async check judged a value
#[derive(Debug, Clone, PartialEq)]
pub enum VerdictOutcome {
    Passed,
    Rejected(ValidationError),
    /// The check itself could not complete
    Failed(String),
}

/// Result of an async check, tied to the value it judged
#[derive(Debug, Clone, PartialEq)]
pub struct Verdict {
    pub value: FieldValue,
    pub outcome: VerdictOutcome,
}

impl Verdict {
    pub fn new(value: FieldValue, outcome: VerdictOutcome) -> Self {
        Self { value, outcome }
    }

    pub fn from_outcome(value: FieldValue, outcome: RuleOutcome) -> Self {
        let outcome = match outcome {
            Ok(None) => VerdictOutcome::Passed,
            Ok(Some(error)) => VerdictOutcome::Rejected(error),
            Err(err) => VerdictOutcome::Failed(format!("{err:#}")),
        };
        Self { value, outcome }
    }
}

/// Rule backed by the latest verdict recorded for it
///
/// A verdict recorded for a different value than the current one is stale
/// and ignored. Without `pending` text a missing verdict passes; with it,
/// the field stays invalid until a fresh verdict arrives.
pub struct RemoteRule {
    id: RuleId,
    pending: Option<String>,
}

impl RemoteRule {
    pub fn new(id: impl Into<RuleId>) -> Self {
        Self {
            id: id.into(),
            pending: None,
        }
    }

    /// Report `text` while no fresh verdict exists
    pub fn pending(mut self, text: impl Into<String>) -> Self {
        self.pending = Some(text.into());
        self
    }
}

impl Rule for RemoteRule {
    fn id(&self) -> &RuleId {
        &self.id
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> RuleOutcome {
        if ctx.value().is_empty() {
            return Ok(None);
        }
        let fresh = ctx
            .control()
            .verdict(self.id.as_str())
            .filter(|verdict| &verdict.value == ctx.value());
        match fresh {
            None => Ok(self
                .pending
                .as_ref()
                .map(|text| ValidationError::new(text.as_str(), ctx.value().clone()))),
            Some(verdict) => match &verdict.outcome {
                VerdictOutcome::Passed => Ok(None),
                VerdictOutcome::Rejected(error) => Ok(Some(error.clone())),
                VerdictOutcome::Failed(reason) => Err(anyhow!("{reason}")),
            },
        }
    }
}
