//! Integer and float constraints

use super::custom::{apply_all, BoundRule};
use super::{mismatch, require, BuildCtx, Presence};
use crate::error::{codes, ValidationResult, Violation};
use crate::executor::{Halt, Walk};
use crate::rules::{Token, IN, MAX, MIN, REQUIRED};
use crate::traits::Value;

/// Integer rules. Every integer width is checked as `i64`.
#[derive(Debug, Default)]
pub struct IntConstraint {
    required: bool,
    min: Option<i64>,
    max: Option<i64>,
    allowed: Option<Vec<i64>>,
    rules: Vec<BoundRule>,
}

impl IntConstraint {
    pub(crate) fn build(ctx: &BuildCtx<'_>, tokens: &[Token<'_>]) -> ValidationResult<Self> {
        let mut built = Self::default();
        for token in tokens {
            match token.name {
                REQUIRED => ctx.required(token, &mut built.required)?,
                MIN => ctx.once(token, &mut built.min, ctx.number(token)?)?,
                MAX => ctx.once(token, &mut built.max, ctx.number(token)?)?,
                IN => ctx.once(token, &mut built.allowed, ctx.list(token)?)?,
                _ => built.rules.extend(ctx.custom(token, "integer")?),
            }
        }
        Ok(built)
    }

    pub(crate) fn check(&self, label: &str, presence: Presence<'_>, walk: &mut Walk<'_>) -> Result<(), Halt> {
        let Some(value) = require(self.required, label, presence, walk)? else {
            return Ok(());
        };
        let Value::Int(number) = value else {
            return Err(mismatch(label, "integer", &value));
        };

        if let Some(max) = self.max {
            if number > max {
                walk.report(Violation::new(label, format!("{label} can not be greater than {max}"), codes::MAX))?;
            }
        }
        if let Some(min) = self.min {
            if number < min {
                walk.report(Violation::new(label, format!("{label} must be at least {min}"), codes::MIN))?;
            }
        }
        if let Some(allowed) = &self.allowed {
            if !allowed.contains(&number) {
                let listed: Vec<String> = allowed.iter().map(i64::to_string).collect();
                walk.report(Violation::new(
                    label,
                    format!("{label} must be in [{}]", listed.join(", ")),
                    codes::NOT_IN,
                ))?;
            }
        }
        apply_all(&self.rules, label, value, walk)
    }
}

/// Float rules. `in` and `regex` are not supported.
#[derive(Debug, Default)]
pub struct FloatConstraint {
    required: bool,
    min: Option<f64>,
    max: Option<f64>,
    rules: Vec<BoundRule>,
}

impl FloatConstraint {
    pub(crate) fn build(ctx: &BuildCtx<'_>, tokens: &[Token<'_>]) -> ValidationResult<Self> {
        let mut built = Self::default();
        for token in tokens {
            match token.name {
                REQUIRED => ctx.required(token, &mut built.required)?,
                MIN => ctx.once(token, &mut built.min, finite(ctx, token)?)?,
                MAX => ctx.once(token, &mut built.max, finite(ctx, token)?)?,
                _ => built.rules.extend(ctx.custom(token, "float")?),
            }
        }
        Ok(built)
    }

    pub(crate) fn check(&self, label: &str, presence: Presence<'_>, walk: &mut Walk<'_>) -> Result<(), Halt> {
        let Some(value) = require(self.required, label, presence, walk)? else {
            return Ok(());
        };
        let Value::Float(number) = value else {
            return Err(mismatch(label, "float", &value));
        };

        // NaN compares false both ways, so it fails every bound that is set.
        if let Some(max) = self.max {
            if number > max || number.is_nan() {
                walk.report(Violation::new(label, format!("{label} can not be greater than {max}"), codes::MAX))?;
            }
        }
        if let Some(min) = self.min {
            if number < min || number.is_nan() {
                walk.report(Violation::new(label, format!("{label} must be at least {min}"), codes::MIN))?;
            }
        }
        apply_all(&self.rules, label, value, walk)
    }
}

fn finite(ctx: &BuildCtx<'_>, token: &Token<'_>) -> ValidationResult<f64> {
    let bound: f64 = ctx.number(token)?;
    if bound.is_finite() {
        Ok(bound)
    } else {
        Err(ctx.malformed(token, "bound must be a finite number"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::executor::Mode;
    use crate::model::Registry;
    use crate::traits::{Field, Shape};
    use crate::validators::test_support::build;
    use crate::validators::{presence, Constraint};

    fn messages(annotation: &str, shape: Shape, value: Value<'_>) -> Vec<String> {
        let constraint = build(&shape, annotation).unwrap();
        let registry = Registry::default();
        let mut walk = Walk::new(&registry, Mode::All, 8);
        let result = match &constraint {
            Constraint::Int(c) => c.check("Age", presence(value), &mut walk),
            Constraint::Float(c) => c.check("Age", presence(value), &mut walk),
            other => panic!("expected a numeric constraint, got {other:?}"),
        };
        walk.finish(result)
            .unwrap()
            .into_vec()
            .into_iter()
            .map(|v| v.message)
            .collect()
    }

    #[test]
    fn test_int_bounds() {
        assert!(messages("min:3|max:120", Shape::Int, Value::Int(3)).is_empty());
        assert!(messages("min:3|max:120", Shape::Int, Value::Int(120)).is_empty());
        assert_eq!(messages("min:3|max:120", Shape::Int, Value::Int(2)), vec!["Age must be at least 3"]);
        assert_eq!(messages("min:3|max:120", Shape::Int, Value::Int(121)), vec!["Age can not be greater than 120"]);
    }

    #[test]
    fn test_int_negative_bounds() {
        assert!(messages("min:-10|max:-1", Shape::Int, Value::Int(-5)).is_empty());
        assert_eq!(messages("min:-10|max:-1", Shape::Int, Value::Int(-11)), vec!["Age must be at least -10"]);
    }

    #[test]
    fn test_zero_int_is_absent() {
        // A plain zero never reaches the bounds.
        assert!(messages("min:3", Shape::Int, Value::Int(0)).is_empty());
        assert_eq!(messages("req|min:3", Shape::Int, Value::Int(0)), vec!["Age is required"]);
    }

    #[test]
    fn test_nullable_zero_is_present() {
        let age = Some(0i32);
        assert_eq!(messages("req|min:3", <Option<i32>>::shape(), age.value()), vec!["Age must be at least 3"]);
        let missing: Option<i32> = None;
        assert_eq!(messages("req|min:3", <Option<i32>>::shape(), missing.value()), vec!["Age is required"]);
    }

    #[test]
    fn test_int_membership() {
        assert!(messages("in:1,2,3", Shape::Int, Value::Int(2)).is_empty());
        assert_eq!(messages("in:1,2,3", Shape::Int, Value::Int(4)), vec!["Age must be in [1, 2, 3]"]);
        assert!(matches!(build(&Shape::Int, "in:1,two"), Err(Error::MalformedRule { .. })));
    }

    #[test]
    fn test_float_bounds() {
        assert!(messages("min:0.5|max:1.5", Shape::Float, Value::Float(1.0)).is_empty());
        assert_eq!(messages("min:0.5|max:1.5", Shape::Float, Value::Float(0.25)), vec!["Age must be at least 0.5"]);
        assert_eq!(messages("min:0.5|max:1.5", Shape::Float, Value::Float(2.0)), vec!["Age can not be greater than 1.5"]);
    }

    #[test]
    fn test_nan_fails_each_bound() {
        assert_eq!(
            messages("req|min:0|max:1", Shape::Float, Value::Float(f64::NAN)),
            vec!["Age can not be greater than 1", "Age must be at least 0"]
        );
        assert_eq!(messages("min:0", Shape::Float, Value::Float(f64::NAN)), vec!["Age must be at least 0"]);
        assert!(messages("req", Shape::Float, Value::Float(f64::NAN)).is_empty());
    }

    #[test]
    fn test_float_rejects_membership_and_pattern() {
        assert!(matches!(build(&Shape::Float, "in:1.0,2.0"), Err(Error::UnsupportedRule { kind: "float", .. })));
        assert!(matches!(build(&Shape::Float, "regex:^1"), Err(Error::UnsupportedRule { kind: "float", .. })));
        assert!(matches!(build(&Shape::Float, "max:NaN"), Err(Error::MalformedRule { .. })));
    }

    #[test]
    fn test_int_rejects_pattern() {
        assert!(matches!(build(&Shape::Int, "regex:^1"), Err(Error::UnsupportedRule { kind: "integer", .. })));
        assert!(matches!(build(&Shape::Int, "min:1.5"), Err(Error::MalformedRule { .. })));
    }
}
