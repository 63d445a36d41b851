//! Rule evaluation with fault isolation

use super::rule::{RuleContext, ValidationError, ValidationErrors};
use crate::error::RuleFault;
use crate::registry::FieldDescriptor;
use crate::state::{ControlState, Controls};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

/// Outcome of running every rule of one field
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Evaluation {
    pub errors: ValidationErrors,
    pub faults: Vec<RuleFault>,
}

/// Run all rules of `descriptor` against `control`, in declaration order.
///
/// A rule that returns `Err` or panics is recorded as a fault with a
/// synthetic error under its id; the remaining rules still run.
pub fn evaluate(
    descriptor: &FieldDescriptor,
    control: &ControlState,
    controls: Option<&Controls>,
) -> Evaluation {
    let ctx = RuleContext::new(descriptor, control, controls);
    let mut evaluation = Evaluation::default();

    for rule in descriptor.rules() {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| rule.evaluate(&ctx)));
        let reason = match outcome {
            Ok(Ok(None)) => continue,
            Ok(Ok(Some(error))) => {
                evaluation.errors.insert(rule.id().clone(), error);
                continue;
            }
            Ok(Err(err)) => format!("{err:#}"),
            Err(payload) => panic_reason(payload.as_ref()),
        };

        tracing::warn!(
            "Rule '{}' on field '{}' failed: {reason}",
            rule.id(),
            descriptor.name
        );
        evaluation.errors.insert(
            rule.id().clone(),
            ValidationError::fault(control.value().clone()),
        );
        evaluation.faults.push(RuleFault {
            field: descriptor.name.clone(),
            rule: rule.id().clone(),
            reason,
        });
    }

    evaluation
}

fn panic_reason(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        format!("panicked: {message}")
    } else if let Some(message) = payload.downcast_ref::<String>() {
        format!("panicked: {message}")
    } else {
        "panicked".to_string()
    }
}
