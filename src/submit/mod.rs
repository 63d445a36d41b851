//! Submission collaborator boundary
//!
//! No transport ships with the crate; hosts implement [`SubmissionSink`].

mod pipeline;
mod traits;

pub use pipeline::{submit, Submission, SubmitOutcome};
pub use traits::SubmissionSink;

#[cfg(test)]
pub use traits::MockSubmissionSink;
