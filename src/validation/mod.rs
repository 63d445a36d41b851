//! Validation rules and their evaluation
//!
//! A rule is anything implementing [`Rule`]: a single `evaluate` method that
//! looks at a control (and optionally its siblings) and returns zero or one
//! [`ValidationError`]. Built-in rules live in [`rules`].

mod evaluate;
mod rule;
pub mod rules;

pub use evaluate::{evaluate, Evaluation};
pub use rule::{
    from_fn, FnRule, Rule, RuleContext, RuleId, RuleOutcome, ValidationError, ValidationErrors,
    FAULT_TEXT,
};
