//! Trait abstraction for async checks to enable mocking in tests

use crate::registry::FieldValue;
use crate::validation::RuleOutcome;
use async_trait::async_trait;

/// A check that needs to leave the process, e.g. a uniqueness lookup
///
/// Returns `Ok(None)` when the value is acceptable, `Ok(Some(error))` when
/// it is not, and `Err` when the check could not be performed.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AsyncCheck: Send + Sync {
    async fn check(&self, value: &FieldValue) -> RuleOutcome;
}
