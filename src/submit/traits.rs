//! Trait abstraction for submission delivery to enable mocking in tests

use super::pipeline::Submission;
use anyhow::Result;
use async_trait::async_trait;

/// Receiver of validated form data
///
/// Implementations decide where the payload goes (an HTTP endpoint, a
/// queue, a file); the engine only guarantees that what arrives passed
/// `validate_all` and the honeypot check.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SubmissionSink: Send + Sync {
    /// Hand over one submission
    async fn deliver(&mut self, submission: Submission) -> Result<()>;
}
