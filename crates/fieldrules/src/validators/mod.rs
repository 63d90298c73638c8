//! Constraint builders, one per value kind
//!
//! Each builder consumes the tokens of one field and produces an immutable
//! constraint. All parsing happens here, at registration, so the executor
//! only matches values against already-typed bounds.

pub mod collection;
pub mod custom;
pub mod numeric;
pub mod record;
pub mod text;
pub mod time;

use std::fmt::Display;
use std::str::FromStr;
use tracing::{debug, warn};

use crate::config::ValidatorConfig;
use crate::error::{Error, ValidationResult, Violation};
use crate::executor::{Halt, Walk};
use crate::rules::{self, tokenize, Token};
use crate::traits::{Shape, Value};

pub use collection::{PointerConstraint, SeqConstraint};
pub use custom::{float_rule, int_rule, text_rule, RuleResult};
pub use numeric::{FloatConstraint, IntConstraint};
pub use record::RecordConstraint;
pub use text::TextConstraint;
pub use time::TimeConstraint;

use custom::{BoundRule, RuleSet};

/// Compiled rules for one field or element
#[derive(Debug)]
pub enum Constraint {
    PassThrough,
    Text(TextConstraint),
    Int(IntConstraint),
    Float(FloatConstraint),
    Time(TimeConstraint),
    Seq(SeqConstraint),
    Pointer(PointerConstraint),
    Record(RecordConstraint),
}

impl Constraint {
    pub fn is_pass_through(&self) -> bool {
        matches!(self, Constraint::PassThrough)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Constraint::PassThrough => "pass-through",
            Constraint::Text(_) => "text",
            Constraint::Int(_) => "integer",
            Constraint::Float(_) => "float",
            Constraint::Time(_) => "time",
            Constraint::Seq(_) => "sequence",
            Constraint::Pointer(_) => "pointer",
            Constraint::Record(_) => "record",
        }
    }

    pub(crate) fn check(&self, label: &str, value: Value<'_>, walk: &mut Walk<'_>) -> Result<(), Halt> {
        match self {
            Constraint::PassThrough => Ok(()),
            Constraint::Text(c) => c.check(label, presence(value), walk),
            Constraint::Int(c) => c.check(label, presence(value), walk),
            Constraint::Float(c) => c.check(label, presence(value), walk),
            Constraint::Time(c) => c.check(label, presence(value), walk),
            Constraint::Seq(c) => c.check(label, presence(value), walk),
            Constraint::Record(c) => c.check(label, presence(value), walk),
            Constraint::Pointer(c) => c.check(label, value, walk),
        }
    }
}

/// Compile a top-level field annotation. An empty annotation is a
/// pass-through whatever the field's shape.
pub(crate) fn compile_field(ctx: &BuildCtx<'_>, shape: &Shape, annotation: &str) -> ValidationResult<Constraint> {
    let tokens = tokenize(annotation);
    if tokens.is_empty() {
        return Ok(Constraint::PassThrough);
    }
    compile(ctx, shape, &tokens)
}

pub(crate) fn compile(ctx: &BuildCtx<'_>, shape: &Shape, tokens: &[Token<'_>]) -> ValidationResult<Constraint> {
    match shape {
        Shape::Optional(inner) => {
            let inner = inner.strip_optional();
            if inner.is_scalar() && tokens.iter().any(Token::is_dive) {
                PointerConstraint::build(ctx, inner, tokens).map(Constraint::Pointer)
            } else {
                // Nullable: same rules as the wrapped type, `None` is absent.
                compile(ctx, inner, tokens)
            }
        }
        Shape::Text => TextConstraint::build(ctx, tokens).map(Constraint::Text),
        Shape::Int => IntConstraint::build(ctx, tokens).map(Constraint::Int),
        Shape::Float => FloatConstraint::build(ctx, tokens).map(Constraint::Float),
        Shape::Time => TimeConstraint::build(ctx, tokens).map(Constraint::Time),
        Shape::Seq(element) => SeqConstraint::build(ctx, element, tokens).map(Constraint::Seq),
        Shape::Record { name, .. } => RecordConstraint::build(ctx, *name, tokens).map(Constraint::Record),
        Shape::Opaque => {
            if !tokens.is_empty() {
                debug!(model = ctx.model, field = ctx.field, "ignoring rules on unsupported field type");
            }
            Ok(Constraint::PassThrough)
        }
    }
}

/// Registration context for one field
pub(crate) struct BuildCtx<'b> {
    pub model: &'static str,
    pub field: &'static str,
    pub rules: &'b RuleSet,
    pub config: &'b ValidatorConfig,
}

impl BuildCtx<'_> {
    pub fn malformed(&self, token: &Token<'_>, reason: impl Into<String>) -> Error {
        Error::MalformedRule {
            model: self.model,
            field: self.field,
            rule: token.to_string(),
            reason: reason.into(),
        }
    }

    pub fn unsupported(&self, token: &Token<'_>, kind: &'static str) -> Error {
        Error::UnsupportedRule {
            model: self.model,
            field: self.field,
            rule: token.to_string(),
            kind,
        }
    }

    /// `req`: takes no argument, may appear once
    pub fn required(&self, token: &Token<'_>, slot: &mut bool) -> ValidationResult<()> {
        if token.arg.is_some() {
            return Err(self.malformed(token, "takes no argument"));
        }
        if *slot {
            return Err(self.malformed(token, "duplicate rule"));
        }
        *slot = true;
        Ok(())
    }

    pub fn argument<'t>(&self, token: &Token<'t>) -> ValidationResult<&'t str> {
        match token.arg {
            Some(arg) if !arg.is_empty() => Ok(arg),
            _ => Err(self.malformed(token, "missing argument")),
        }
    }

    pub fn number<N>(&self, token: &Token<'_>) -> ValidationResult<N>
    where
        N: FromStr,
        N::Err: Display,
    {
        self.argument(token)?
            .parse::<N>()
            .map_err(|e: N::Err| self.malformed(token, e.to_string()))
    }

    /// `in:a,b,c`
    pub fn list<N>(&self, token: &Token<'_>) -> ValidationResult<Vec<N>>
    where
        N: FromStr,
        N::Err: Display,
    {
        self.argument(token)?
            .split(',')
            .map(|item| item.parse::<N>().map_err(|e: N::Err| self.malformed(token, e.to_string())))
            .collect()
    }

    /// Store a parsed bound, rejecting a second occurrence of the same rule
    pub fn once<V>(&self, token: &Token<'_>, slot: &mut Option<V>, value: V) -> ValidationResult<()> {
        if slot.is_some() {
            return Err(self.malformed(token, "duplicate rule"));
        }
        *slot = Some(value);
        Ok(())
    }

    /// Resolve a non-built-in token to a registered custom rule
    pub fn custom(&self, token: &Token<'_>, kind: &'static str) -> ValidationResult<Option<BoundRule>> {
        if rules::is_builtin(token.name) {
            return Err(self.unsupported(token, kind));
        }
        match self.rules.get(token.name) {
            Some(rule) if token.arg.is_none() => Ok(Some(BoundRule::new(token.name, rule.clone()))),
            Some(_) => Err(self.malformed(token, "custom rules take no argument")),
            None if self.config.is_strict() => Err(Error::UnknownRule {
                model: self.model,
                field: self.field,
                rule: token.to_string(),
            }),
            None => {
                warn!(model = self.model, field = self.field, rule = %token, "ignoring unknown rule");
                Ok(None)
            }
        }
    }
}

/// Whether a value is there to be checked
#[derive(Debug)]
pub(crate) enum Presence<'v> {
    Absent,
    Present(Value<'v>),
}

/// Zero values are absent. A `Some` is present even when it wraps a zero
/// value, which is how nullable scalars differ from plain ones.
pub(crate) fn presence(value: Value<'_>) -> Presence<'_> {
    match value {
        Value::Optional(None) => Presence::Absent,
        Value::Optional(Some(inner)) => match inner.value() {
            nested @ Value::Optional(_) => presence(nested),
            present => Presence::Present(present),
        },
        value if value.is_zero() => Presence::Absent,
        value => Presence::Present(value),
    }
}

/// Unwrap a present value, reporting `required` when it is absent
pub(crate) fn require<'v>(
    required: bool,
    label: &str,
    presence: Presence<'v>,
    walk: &mut Walk<'_>,
) -> Result<Option<Value<'v>>, Halt> {
    match presence {
        Presence::Present(value) => Ok(Some(value)),
        Presence::Absent if required => {
            walk.report(Violation::required(label))?;
            Ok(None)
        }
        Presence::Absent => Ok(None),
    }
}

pub(crate) fn mismatch(label: &str, expected: &'static str, found: &Value<'_>) -> Halt {
    Halt::Failed(Error::Mismatch {
        field: label.to_string(),
        expected,
        found: found.kind(),
    })
}
