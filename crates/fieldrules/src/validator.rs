//! The validator: model registration, custom rules and validation entry points

use std::any::{Any, TypeId};
use std::sync::Arc;
use tracing::{debug, trace};

use crate::config::ValidatorConfig;
use crate::error::{Error, RuleError, ValidationResult, Violation, Violations};
use crate::executor::{Mode, Walk};
use crate::model::{Model, Registry};
use crate::traits::{Field, Record, Value};
use crate::validators::custom::{float_rule, int_rule, text_rule, RecordRuleFn, RuleResult, RuleSet};

/// Holds compiled models and custom rules.
///
/// Registration takes `&mut self` and validation `&self`, so a validator
/// that is fully set up can be shared across threads behind an `Arc`.
///
/// ```ignore
/// let mut validator = Validator::new();
/// validator.register::<User>()?;
///
/// let violations = validator.violations(&user)?;
/// for violation in &violations {
///     println!("{violation}");
/// }
/// ```
#[derive(Debug, Default)]
pub struct Validator {
    config: ValidatorConfig,
    registry: Registry,
    rules: RuleSet,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ValidatorConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Compile and cache the model for `T`.
    ///
    /// Every annotation is parsed here, so malformed rules and unknown rule
    /// names fail registration instead of validation. Nested record types
    /// are resolved when validated and may be registered in any order.
    pub fn register<T: Record>(&mut self) -> ValidationResult<()> {
        let type_id = TypeId::of::<T>();
        if self.registry.contains(type_id) {
            return Err(Error::AlreadyRegistered(T::name()));
        }
        let model = Model::compile::<T>(&self.rules, &self.config)?;
        debug!(model = model.name, fields = model.fields.len(), "registered validation model");
        self.registry.insert(type_id, model);
        Ok(())
    }

    /// Register a named field rule. Rules are bound when a model is
    /// registered, so add them before the types that use them.
    pub fn add_rule<R>(&mut self, name: impl Into<String>, rule: R) -> ValidationResult<()>
    where
        R: Fn(&str, &Value<'_>) -> RuleResult + Send + Sync + 'static,
    {
        let name = name.into();
        debug!(rule = %name, "registered custom rule");
        self.rules.insert(name, Arc::new(rule))
    }

    /// Register a rule for text fields
    pub fn add_text_rule<F>(&mut self, name: impl Into<String>, check: F) -> ValidationResult<()>
    where
        F: Fn(&str, &str) -> Option<String> + Send + Sync + 'static,
    {
        self.add_rule(name, text_rule(check))
    }

    /// Register a rule for integer fields
    pub fn add_int_rule<F>(&mut self, name: impl Into<String>, check: F) -> ValidationResult<()>
    where
        F: Fn(&str, i64) -> Option<String> + Send + Sync + 'static,
    {
        self.add_rule(name, int_rule(check))
    }

    /// Register a rule for float fields
    pub fn add_float_rule<F>(&mut self, name: impl Into<String>, check: F) -> ValidationResult<()>
    where
        F: Fn(&str, f64) -> Option<String> + Send + Sync + 'static,
    {
        self.add_rule(name, float_rule(check))
    }

    /// Append a whole-record rule to the model of `T`. Record rules run after
    /// the field checks of the same record, in the order they were added.
    pub fn add_record_rule<T, F>(&mut self, rule: F) -> ValidationResult<()>
    where
        T: Record,
        F: Fn(&T) -> RuleResult + Send + Sync + 'static,
    {
        let model = self
            .registry
            .get_mut(TypeId::of::<T>())
            .ok_or(Error::NotRegistered(T::name()))?;
        let erased: RecordRuleFn = Box::new(move |record: &dyn Any| match record.downcast_ref::<T>() {
            Some(record) => rule(record),
            None => Err(RuleError::new(format!("expected a {} record", T::name()))),
        });
        model.push_record_rule(erased);
        debug!(model = model.name, rules = model.record_rule_count(), "registered record rule");
        Ok(())
    }

    pub fn is_registered<T: Record>(&self) -> bool {
        self.registry.contains(TypeId::of::<T>())
    }

    /// Declared field names of `T`, in model order
    pub fn fields<T: Record>(&self) -> Option<Vec<&'static str>> {
        self.registry.get(TypeId::of::<T>()).map(Model::field_names)
    }

    pub fn rule_names(&self) -> Vec<&str> {
        self.rules.names()
    }

    /// First violation found, or `None` when the record is valid.
    ///
    /// Checking stops at the first violation, so a custom or record rule that
    /// would fail later never runs. The same record can therefore give
    /// `Ok(Some(_))` here and `Err` from [`Validator::violations`].
    pub fn violation<T: Record>(&self, record: &T) -> ValidationResult<Option<Violation>> {
        let found = self.run(Mode::First, T::name(), record)?;
        Ok(found.into_vec().into_iter().next())
    }

    /// Every violation, in field declaration order
    pub fn violations<T: Record>(&self, record: &T) -> ValidationResult<Violations> {
        self.run(Mode::All, T::name(), record)
    }

    /// Like [`Validator::violation`] for a value whose record type is only
    /// known at runtime. `Option` and `Box` layers are unwrapped.
    pub fn violation_of(&self, value: &dyn Field) -> ValidationResult<Option<Violation>> {
        let (name, record) = resolve(value)?;
        let found = self.run(Mode::First, name, record)?;
        Ok(found.into_vec().into_iter().next())
    }

    pub fn violations_of(&self, value: &dyn Field) -> ValidationResult<Violations> {
        let (name, record) = resolve(value)?;
        self.run(Mode::All, name, record)
    }

    fn run(&self, mode: Mode, name: &'static str, record: &dyn Any) -> ValidationResult<Violations> {
        trace!(model = name, ?mode, "validating record");
        let mut walk = Walk::new(&self.registry, mode, *self.config.get_max_depth());
        let outcome = walk.root(name, record);
        walk.finish(outcome)
    }
}

fn resolve(value: &dyn Field) -> ValidationResult<(&'static str, &dyn Any)> {
    let mut current = value.value();
    loop {
        match current {
            Value::Record { record, name } => return Ok((name, record)),
            Value::Optional(Some(inner)) => current = inner.value(),
            Value::Optional(None) => return Err(Error::NotRecord("none")),
            other => return Err(Error::NotRecord(other.kind())),
        }
    }
}

/// Register several record types, stopping at the first error.
///
/// ```ignore
/// register!(validator, User, Address, LineItem)?;
/// ```
#[macro_export]
macro_rules! register {
    ($validator:expr, $($ty:ty),+ $(,)?) => {{
        let validator = &mut $validator;
        let mut result: $crate::ValidationResult<()> = Ok(());
        $(
            if result.is_ok() {
                result = validator.register::<$ty>();
            }
        )+
        result
    }};
}
