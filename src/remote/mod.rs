//! Async checks feeding back into synchronous validation
//!
//! The state engine never awaits. An async check runs outside it, and its
//! verdict is recorded on the control, which re-runs the field's rules; a
//! [`RemoteRule`] turns the verdict into an ordinary validation error.

mod traits;
mod verdict;

pub use traits::AsyncCheck;
#[cfg(test)]
pub use traits::MockAsyncCheck;
pub use verdict::{RemoteRule, Verdict, VerdictOutcome};

use crate::error::FormError;
use crate::registry::FieldValue;
use crate::state::{ControlState, Form};

/// Run a check against a value snapshot
pub async fn check_value<C: AsyncCheck + ?Sized>(check: &C, value: FieldValue) -> Verdict {
    let outcome = check.check(&value).await;
    Verdict::from_outcome(value, outcome)
}

/// Check a field's current value and record the verdict under `rule`.
///
/// Holds the form for the duration of the check. Hosts that keep editing
/// while a check is in flight call [`check_value`] on a snapshot and
/// [`Form::record_verdict`] when it completes; stale verdicts are ignored.
pub async fn run_check<'f, C: AsyncCheck + ?Sized>(
    form: &'f mut Form,
    field: &str,
    rule: &str,
    check: &C,
) -> Result<&'f ControlState, FormError> {
    let value = form.control(field)?.value().clone();
    let verdict = check_value(check, value).await;
    tracing::debug!("Async check '{rule}' on '{field}' finished: {:?}", verdict.outcome);
    form.record_verdict(field, rule, verdict)
}
