//! formkit - declarative form fields with a validation state engine
//!
//! A form is defined once as a [`FieldRegistry`] of immutable
//! [`FieldDescriptor`]s, then instantiated as a [`Form`] holding one
//! [`ControlState`] per field. Controls change only through value updates
//! and touches; after each change their `valid`/`errors` reflect the current
//! value.
//!
//! ```
//! use formkit::{rules, FieldDescriptor, FieldRegistry, Form, FormOptions};
//! use std::sync::Arc;
//!
//! let registry = FieldRegistry::new(vec![
//!     FieldDescriptor::text("name", "Name").with_rule(rules::required("nonEmpty", "required")),
//! ])?;
//! let mut form = Form::new(Arc::new(registry), FormOptions::default());
//! assert!(form.control("name")?.invalid());
//!
//! form.set_value("name", "hello")?;
//! assert!(form.validate_all().valid);
//! # Ok::<(), formkit::FormError>(())
//! ```

pub mod config;
pub mod error;
pub mod registry;
pub mod remote;
pub mod state;
pub mod submit;
pub mod validation;

pub use config::{EngineConfig, FormOptions, ValidationPolicy};
pub use error::{FormError, RuleFault, SchemaError};
pub use registry::{
    FieldDefinition, FieldDescriptor, FieldKind, FieldRegistry, FieldValue, FormDefinition,
    SelectOption,
};
pub use remote::{AsyncCheck, RemoteRule, Verdict, VerdictOutcome};
pub use state::{ControlSnapshot, ControlState, Controls, Form, FormEvent, FormReport, FormSnapshot};
pub use submit::{submit, Submission, SubmissionSink, SubmitOutcome};
pub use validation::{rules, Rule, RuleContext, RuleId, ValidationError, ValidationErrors};
