//! Built-in validation rules
//!
//! Every rule except [`Required`] passes on an empty value, so optional
//! fields stay valid until the user types something.

use super::rule::{Rule, RuleContext, RuleId, RuleOutcome, ValidationError};
use crate::registry::FieldValue;
use anyhow::anyhow;
use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
});

fn violation(text: &str, ctx: &RuleContext<'_>) -> RuleOutcome {
    Ok(Some(ValidationError::new(text, ctx.value().clone())))
}

/// Value must be a non-empty string or a checked box
pub struct Required {
    id: RuleId,
    text: String,
}

pub fn required(id: impl Into<RuleId>, text: impl Into<String>) -> Required {
    Required {
        id: id.into(),
        text: text.into(),
    }
}

impl Rule for Required {
    fn id(&self) -> &RuleId {
        &self.id
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> RuleOutcome {
        if ctx.value().is_empty() {
            return violation(&self.text, ctx);
        }
        Ok(None)
    }
}

/// Character-count bounds on text values
pub struct Length {
    id: RuleId,
    text: String,
    min: Option<usize>,
    max: Option<usize>,
}

pub fn min_length(id: impl Into<RuleId>, text: impl Into<String>, length: usize) -> Length {
    Length {
        id: id.into(),
        text: text.into(),
        min: Some(length),
        max: None,
    }
}

pub fn max_length(id: impl Into<RuleId>, text: impl Into<String>, length: usize) -> Length {
    Length {
        id: id.into(),
        text: text.into(),
        min: None,
        max: Some(length),
    }
}

impl Rule for Length {
    fn id(&self) -> &RuleId {
        &self.id
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> RuleOutcome {
        let Some(text) = ctx.value().as_text().filter(|s| !s.is_empty()) else {
            return Ok(None);
        };
        let count = text.chars().count();
        let too_short = self.min.is_some_and(|min| count < min);
        let too_long = self.max.is_some_and(|max| count > max);
        if too_short || too_long {
            return violation(&self.text, ctx);
        }
        Ok(None)
    }
}

/// Numeric lower or upper bound
pub struct Bound {
    id: RuleId,
    text: String,
    limit: f64,
    upper: bool,
}

pub fn min(id: impl Into<RuleId>, text: impl Into<String>, min: f64) -> Bound {
    Bound {
        id: id.into(),
        text: text.into(),
        limit: min,
        upper: false,
    }
}

pub fn max(id: impl Into<RuleId>, text: impl Into<String>, max: f64) -> Bound {
    Bound {
        id: id.into(),
        text: text.into(),
        limit: max,
        upper: true,
    }
}

impl Rule for Bound {
    fn id(&self) -> &RuleId {
        &self.id
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> RuleOutcome {
        let Some(value) = ctx.value().as_number() else {
            return Ok(None);
        };
        let out_of_range = if self.upper {
            value > self.limit
        } else {
            value < self.limit
        };
        if out_of_range {
            return violation(&self.text, ctx);
        }
        Ok(None)
    }
}

/// Number must sit on the grid `base + k * step`
pub struct Step {
    id: RuleId,
    text: String,
    step: f64,
    base: f64,
}

pub fn step(id: impl Into<RuleId>, text: impl Into<String>, step: f64, base: f64) -> Step {
    Step {
        id: id.into(),
        text: text.into(),
        step,
        base,
    }
}

impl Rule for Step {
    fn id(&self) -> &RuleId {
        &self.id
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> RuleOutcome {
        let Some(value) = ctx.value().as_number() else {
            return Ok(None);
        };
        if self.step <= 0.0 {
            return Err(anyhow!("step must be positive, got {}", self.step));
        }
        let steps = (value - self.base) / self.step;
        if (steps - steps.round()).abs() > 1e-9 {
            return violation(&self.text, ctx);
        }
        Ok(None)
    }
}

/// Loose `local@domain.tld` shape check
pub struct Email {
    id: RuleId,
    text: String,
}

pub fn email(id: impl Into<RuleId>, text: impl Into<String>) -> Email {
    Email {
        id: id.into(),
        text: text.into(),
    }
}

impl Rule for Email {
    fn id(&self) -> &RuleId {
        &self.id
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> RuleOutcome {
        match ctx.value().as_text() {
            Some(text) if !text.is_empty() && !EMAIL_RE.is_match(text) => {
                violation(&self.text, ctx)
            }
            _ => Ok(None),
        }
    }
}

/// Absolute URL with a host
pub struct Url {
    id: RuleId,
    text: String,
}

pub fn url(id: impl Into<RuleId>, text: impl Into<String>) -> Url {
    Url {
        id: id.into(),
        text: text.into(),
    }
}

impl Rule for Url {
    fn id(&self) -> &RuleId {
        &self.id
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> RuleOutcome {
        let Some(text) = ctx.value().as_text().filter(|s| !s.is_empty()) else {
            return Ok(None);
        };
        match url::Url::parse(text) {
            Ok(parsed) if parsed.has_host() => Ok(None),
            _ => violation(&self.text, ctx),
        }
    }
}

/// Whole value must match a regular expression
pub struct Pattern {
    id: RuleId,
    text: String,
    regex: Regex,
}

/// Compile a pattern rule. The pattern is anchored at both ends.
pub fn pattern(
    id: impl Into<RuleId>,
    text: impl Into<String>,
    pattern: &str,
) -> Result<Pattern, regex::Error> {
    let regex = Regex::new(&format!("^(?:{pattern})$"))?;
    Ok(Pattern {
        id: id.into(),
        text: text.into(),
        regex,
    })
}

impl Rule for Pattern {
    fn id(&self) -> &RuleId {
        &self.id
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> RuleOutcome {
        match ctx.value().as_text() {
            Some(text) if !text.is_empty() && !self.regex.is_match(text) => {
                violation(&self.text, ctx)
            }
            _ => Ok(None),
        }
    }
}

/// Value must be one of a fixed set of keys
pub struct OneOf {
    id: RuleId,
    text: String,
    keys: Vec<String>,
}

pub fn one_of(id: impl Into<RuleId>, text: impl Into<String>, keys: Vec<String>) -> OneOf {
    OneOf {
        id: id.into(),
        text: text.into(),
        keys,
    }
}

impl Rule for OneOf {
    fn id(&self) -> &RuleId {
        &self.id
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> RuleOutcome {
        let candidate = match ctx.value() {
            FieldValue::Text(s) if s.is_empty() => return Ok(None),
            FieldValue::Text(s) => s.clone(),
            other => other.to_string(),
        };
        if self.keys.iter().any(|key| *key == candidate) {
            return Ok(None);
        }
        violation(&self.text, ctx)
    }
}

/// Value must equal another field's current value
pub struct Matches {
    id: RuleId,
    text: String,
    field: String,
}

pub fn matches(id: impl Into<RuleId>, text: impl Into<String>, field: &str) -> Matches {
    Matches {
        id: id.into(),
        text: text.into(),
        field: field.to_string(),
    }
}

impl Rule for Matches {
    fn id(&self) -> &RuleId {
        &self.id
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> RuleOutcome {
        // A lone control has nothing to compare against.
        let Some(controls) = ctx.controls() else {
            return Ok(None);
        };
        if ctx.value().is_empty() {
            return Ok(None);
        }
        let other = controls
            .get(&self.field)
            .ok_or_else(|| anyhow!("no field named '{}'", self.field))?;
        if other.value() != ctx.value() {
            return violation(&self.text, ctx);
        }
        Ok(None)
    }

    fn depends_on(&self) -> &[String] {
        std::slice::from_ref(&self.field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::FieldDescriptor;
    use crate::state::{ControlState, Controls};

    fn run(rule: &dyn Rule, field: FieldDescriptor) -> Option<ValidationError> {
        let control = ControlState::pristine(&field);
        let ctx = RuleContext::new(&field, &control, None);
        rule.evaluate(&ctx).unwrap()
    }

    fn text(value: &str) -> FieldDescriptor {
        FieldDescriptor::text("f", "F").with_value(value)
    }

    fn number(value: f64) -> FieldDescriptor {
        FieldDescriptor::number("n", "N").with_value(value)
    }

    mod required {
        use super::*;

        #[test]
        fn test_empty_text_fails() {
            let error = run(&required("nonEmpty", "required"), text("")).unwrap();
            assert_eq!(error.text, "required");
            assert_eq!(error.value, FieldValue::from(""));
        }

        #[test]
        fn test_whitespace_counts_as_content() {
            assert!(run(&required("r", "required"), text(" ")).is_none());
        }

        #[test]
        fn test_unchecked_box_fails() {
            let field = FieldDescriptor::checkbox("terms", "Terms");
            assert!(run(&required("r", "must accept"), field.clone()).is_some());
            assert!(run(&required("r", "must accept"), field.with_value(true)).is_none());
        }
    }

    mod length {
        use super::*;

        #[test]
        fn test_min_length_counts_chars() {
            let rule = min_length("min", "too short", 3);
            assert!(run(&rule, text("ab")).is_some());
            assert!(run(&rule, text("äöü")).is_none());
        }

        #[test]
        fn test_max_length() {
            let rule = max_length("max", "too long", 3);
            assert!(run(&rule, text("abcd")).is_some());
            assert!(run(&rule, text("abc")).is_none());
        }

        #[test]
        fn test_empty_passes() {
            assert!(run(&min_length("min", "too short", 3), text("")).is_none());
        }
    }

    mod numeric {
        use super::*;

        #[test]
        fn test_max_violation() {
            let error = run(&max("max", "too big", 10.0), number(15.0)).unwrap();
            assert_eq!(error.value, FieldValue::Number(15.0));
            assert!(run(&max("max", "too big", 10.0), number(10.0)).is_none());
        }

        #[test]
        fn test_min_violation() {
            assert!(run(&min("min", "too small", 1.0), number(0.0)).is_some());
            assert!(run(&min("min", "too small", 1.0), number(1.0)).is_none());
        }

        #[test]
        fn test_step_grid() {
            let rule = step("step", "off grid", 0.5, 1.0);
            assert!(run(&rule, number(2.5)).is_none());
            assert!(run(&rule, number(2.2)).is_some());
        }

        #[test]
        fn test_non_positive_step_faults() {
            let field = number(3.0);
            let control = ControlState::pristine(&field);
            let ctx = RuleContext::new(&field, &control, None);
            assert!(step("step", "off grid", 0.0, 0.0).evaluate(&ctx).is_err());
        }
    }

    mod formats {
        use super::*;

        #[test]
        fn test_email_shape() {
            let rule = email("email", "invalid email");
            assert!(run(&rule, text("someone@example.com")).is_none());
            assert!(run(&rule, text("someone@example")).is_some());
            assert!(run(&rule, text("no at sign")).is_some());
            assert!(run(&rule, text("")).is_none());
        }

        #[test]
        fn test_url_needs_host() {
            let rule = url("url", "invalid url");
            assert!(run(&rule, text("https://example.com/path")).is_none());
            assert!(run(&rule, text("example.com")).is_some());
            assert!(run(&rule, text("mailto:someone@example.com")).is_some());
        }

        #[test]
        fn test_pattern_is_anchored() {
            let rule = pattern("zip", "five digits", r"\d{5}").unwrap();
            assert!(run(&rule, text("12345")).is_none());
            assert!(run(&rule, text("123456")).is_some());
        }

        #[test]
        fn test_invalid_pattern_is_rejected() {
            assert!(pattern("bad", "bad", "(").is_err());
        }
    }

    mod one_of {
        use super::*;

        #[test]
        fn test_membership() {
            let rule = one_of("option", "pick one", vec!["red".into(), "blue".into()]);
            assert!(run(&rule, text("red")).is_none());
            assert!(run(&rule, text("green")).is_some());
            assert!(run(&rule, text("")).is_none());
        }

        #[test]
        fn test_bool_value_compared_as_text() {
            let rule = one_of("option", "pick one", vec!["true".into()]);
            let field = FieldDescriptor::select("s", "S", vec![]).with_value(true);
            assert!(run(&rule, field).is_none());
        }
    }

    mod matches {
        use super::*;

        fn controls(password: &str, confirm: &str) -> (FieldDescriptor, Controls) {
            let password_field = FieldDescriptor::password("password", "Password").with_value(password);
            let confirm_field = FieldDescriptor::password("confirm", "Confirm").with_value(confirm);
            let states = vec![
                ControlState::pristine(&password_field),
                ControlState::pristine(&confirm_field),
            ];
            (confirm_field, Controls::from_states(states))
        }

        #[test]
        fn test_mismatch_and_match() {
            let rule = matches("mismatch", "passwords differ", "password");
            let (field, all) = controls("abc", "abx");
            let ctx = RuleContext::new(&field, all.get("confirm").unwrap(), Some(&all));
            assert!(rule.evaluate(&ctx).unwrap().is_some());

            let (field, all) = controls("abc", "abc");
            let ctx = RuleContext::new(&field, all.get("confirm").unwrap(), Some(&all));
            assert!(rule.evaluate(&ctx).unwrap().is_none());
        }

        #[test]
        fn test_without_context_passes() {
            let rule = matches("mismatch", "passwords differ", "password");
            assert!(run(&rule, text("anything")).is_none());
        }

        #[test]
        fn test_unknown_target_faults() {
            let rule = matches("mismatch", "differs", "missing");
            let (field, all) = controls("abc", "abc");
            let ctx = RuleContext::new(&field, all.get("confirm").unwrap(), Some(&all));
            assert!(rule.evaluate(&ctx).is_err());
        }

        #[test]
        fn test_declares_dependency() {
            let rule = matches("mismatch", "differs", "password");
            assert_eq!(rule.depends_on(), &["password".to_string()]);
        }
    }
}
