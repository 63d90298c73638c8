//! Custom rules registered by name

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{Error, RuleError, ValidationResult, Violation};
use crate::executor::{Halt, Walk};
use crate::rules;
use crate::traits::Value;

/// Outcome of a custom rule: `Ok(None)` passes, `Ok(Some(message))` is a
/// violation, `Err` aborts validation.
pub type RuleResult = Result<Option<String>, RuleError>;

/// Field rule, called with the field label and its present value
pub type RuleFn = Arc<dyn Fn(&str, &Value<'_>) -> RuleResult + Send + Sync>;

/// Whole-record rule over the type-erased record
pub(crate) type RecordRuleFn = Box<dyn Fn(&dyn Any) -> RuleResult + Send + Sync>;

/// Named custom rules available to annotations
#[derive(Clone, Default)]
pub struct RuleSet {
    rules: HashMap<String, RuleFn>,
}

impl RuleSet {
    /// Add or replace a rule. Built-in names are reserved.
    pub fn insert(&mut self, name: impl Into<String>, rule: RuleFn) -> ValidationResult<()> {
        let name = name.into();
        if name.is_empty() || rules::is_builtin(&name) || name.contains(|c| c == '|' || c == ':') {
            return Err(Error::ReservedRule(name));
        }
        self.rules.insert(name, rule);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&RuleFn> {
        self.rules.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.rules.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rule names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.rules.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl std::fmt::Debug for RuleSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleSet").field("rules", &self.names()).finish()
    }
}

/// A custom rule resolved for one field at registration. Later changes to the
/// rule set do not affect it.
#[derive(Clone)]
pub struct BoundRule {
    name: String,
    rule: RuleFn,
}

impl BoundRule {
    pub fn new(name: impl Into<String>, rule: RuleFn) -> Self {
        Self { name: name.into(), rule }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn apply(&self, label: &str, value: Value<'_>, walk: &mut Walk<'_>) -> Result<(), Halt> {
        match (self.rule)(label, &value) {
            Ok(None) => Ok(()),
            Ok(Some(message)) => walk.report(Violation::new(label, message, self.name.as_str())),
            Err(source) => Err(Halt::Failed(Error::Rule {
                field: label.to_string(),
                rule: self.name.clone(),
                source,
            })),
        }
    }
}

impl std::fmt::Debug for BoundRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundRule").field("name", &self.name).finish()
    }
}

/// Run every bound rule against a present value
pub(crate) fn apply_all(rules: &[BoundRule], label: &str, value: Value<'_>, walk: &mut Walk<'_>) -> Result<(), Halt> {
    for rule in rules {
        rule.apply(label, value, walk)?;
    }
    Ok(())
}

fn wrong_kind(expected: &str, found: &Value<'_>) -> RuleError {
    RuleError::new(format!("rule applies to {} fields, found {}", expected, found.kind()))
}

/// Adapt a text-only check into a field rule. Applied to any other kind it
/// fails with a [`RuleError`].
pub fn text_rule<F>(check: F) -> impl Fn(&str, &Value<'_>) -> RuleResult + Send + Sync + 'static
where
    F: Fn(&str, &str) -> Option<String> + Send + Sync + 'static,
{
    move |field: &str, value: &Value<'_>| -> RuleResult {
        match value {
            Value::Text(text) => Ok(check(field, *text)),
            other => Err(wrong_kind("text", other)),
        }
    }
}

/// Adapt an integer-only check into a field rule
pub fn int_rule<F>(check: F) -> impl Fn(&str, &Value<'_>) -> RuleResult + Send + Sync + 'static
where
    F: Fn(&str, i64) -> Option<String> + Send + Sync + 'static,
{
    move |field: &str, value: &Value<'_>| -> RuleResult {
        match value {
            Value::Int(number) => Ok(check(field, *number)),
            other => Err(wrong_kind("integer", other)),
        }
    }
}

/// Adapt a float-only check into a field rule
pub fn float_rule<F>(check: F) -> impl Fn(&str, &Value<'_>) -> RuleResult + Send + Sync + 'static
where
    F: Fn(&str, f64) -> Option<String> + Send + Sync + 'static,
{
    move |field: &str, value: &Value<'_>| -> RuleResult {
        match value {
            Value::Float(number) => Ok(check(field, *number)),
            other => Err(wrong_kind("float", other)),
        }
    }
}
