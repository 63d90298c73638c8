//! Text constraints

use regex::Regex;

use super::custom::{apply_all, BoundRule};
use super::{mismatch, require, BuildCtx, Presence};
use crate::error::{codes, Error, ValidationResult, Violation};
use crate::executor::{Halt, Walk};
use crate::rules::{Token, IN, MAX, MIN, REGEX, REQUIRED};
use crate::traits::Value;

/// Text rules. Lengths are counted in characters, not bytes.
#[derive(Debug, Default)]
pub struct TextConstraint {
    required: bool,
    min: Option<usize>,
    max: Option<usize>,
    pattern: Option<Regex>,
    allowed: Option<Vec<String>>,
    rules: Vec<BoundRule>,
}

impl TextConstraint {
    pub(crate) fn build(ctx: &BuildCtx<'_>, tokens: &[Token<'_>]) -> ValidationResult<Self> {
        let mut built = Self::default();
        for token in tokens {
            match token.name {
                REQUIRED => ctx.required(token, &mut built.required)?,
                MIN => ctx.once(token, &mut built.min, ctx.number(token)?)?,
                MAX => ctx.once(token, &mut built.max, ctx.number(token)?)?,
                REGEX => {
                    let pattern = ctx.argument(token)?;
                    let regex = Regex::new(pattern).map_err(|source| Error::Pattern {
                        model: ctx.model,
                        field: ctx.field,
                        pattern: pattern.to_string(),
                        source,
                    })?;
                    ctx.once(token, &mut built.pattern, regex)?;
                }
                IN => ctx.once(token, &mut built.allowed, ctx.list(token)?)?,
                _ => built.rules.extend(ctx.custom(token, "text")?),
            }
        }
        Ok(built)
    }

    pub(crate) fn check(&self, label: &str, presence: Presence<'_>, walk: &mut Walk<'_>) -> Result<(), Halt> {
        let Some(value) = require(self.required, label, presence, walk)? else {
            return Ok(());
        };
        let Value::Text(text) = value else {
            return Err(mismatch(label, "text", &value));
        };

        let length = text.chars().count();
        if let Some(max) = self.max {
            if length > max {
                walk.report(Violation::new(
                    label,
                    format!("{label} can not be longer than {max} characters"),
                    codes::MAX,
                ))?;
            }
        }
        if let Some(min) = self.min {
            if length < min {
                walk.report(Violation::new(
                    label,
                    format!("{label} must be at least {min} characters"),
                    codes::MIN,
                ))?;
            }
        }
        if let Some(pattern) = &self.pattern {
            if !pattern.is_match(text) {
                walk.report(Violation::new(
                    label,
                    format!("{label} must match regex /{}/", pattern.as_str()),
                    codes::PATTERN,
                ))?;
            }
        }
        if let Some(allowed) = &self.allowed {
            if !allowed.iter().any(|candidate| candidate == text) {
                walk.report(Violation::new(
                    label,
                    format!("{label} must be in [{}]", allowed.join(", ")),
                    codes::NOT_IN,
                ))?;
            }
        }
        apply_all(&self.rules, label, value, walk)
    }
}
