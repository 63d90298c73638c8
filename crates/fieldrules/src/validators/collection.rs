//! Sequence and pointer constraints, the two containers `dive` reaches into

use super::custom::{apply_all, BoundRule};
use super::{compile, mismatch, require, BuildCtx, Constraint, Presence};
use crate::error::{codes, ValidationResult, Violation};
use crate::executor::{Halt, Walk};
use crate::rules::{split_dive, Token, MAX, MIN, REQUIRED};
use crate::traits::{Shape, Value};

/// Rules for a `Vec<T>` or `[T; N]` field. Bounds count elements.
#[derive(Debug, Default)]
pub struct SeqConstraint {
    required: bool,
    min: Option<usize>,
    max: Option<usize>,
    rules: Vec<BoundRule>,
    element: Option<Box<Constraint>>,
}

impl SeqConstraint {
    pub(crate) fn build(ctx: &BuildCtx<'_>, element: &Shape, tokens: &[Token<'_>]) -> ValidationResult<Self> {
        let (head, tail) = split_dive(tokens);
        let mut built = Self::default();
        for token in head {
            match token.name {
                REQUIRED => ctx.required(token, &mut built.required)?,
                MIN => ctx.once(token, &mut built.min, ctx.number(token)?)?,
                MAX => ctx.once(token, &mut built.max, ctx.number(token)?)?,
                _ => built.rules.extend(ctx.custom(token, "sequence")?),
            }
        }
        if let Some(tail) = tail {
            built.element = Some(Box::new(compile(ctx, element, tail)?));
        }
        Ok(built)
    }

    pub(crate) fn check(&self, label: &str, presence: Presence<'_>, walk: &mut Walk<'_>) -> Result<(), Halt> {
        let Some(value) = require(self.required, label, presence, walk)? else {
            return Ok(());
        };
        let Value::Seq(items) = value else {
            return Err(mismatch(label, "sequence", &value));
        };

        let count = items.len();
        if let Some(max) = self.max {
            if count > max {
                walk.report(Violation::new(
                    label,
                    format!("{label} can not have more than {max} elements"),
                    codes::MAX,
                ))?;
            }
        }
        if let Some(min) = self.min {
            if count < min {
                walk.report(Violation::new(
                    label,
                    format!("{label} must have at least {min} elements"),
                    codes::MIN,
                ))?;
            }
        }
        apply_all(&self.rules, label, value, walk)?;

        let Some(element) = &self.element else {
            return Ok(());
        };
        for index in 0..count {
            if let Some(item) = items.get(index) {
                element.check(&format!("{label}[{index}]"), item.value(), walk)?;
            }
        }
        Ok(())
    }
}

/// Rules for an `Option<scalar>` whose annotation dives into the pointee
#[derive(Debug)]
pub struct PointerConstraint {
    required: bool,
    rules: Vec<BoundRule>,
    target: Box<Constraint>,
}

impl PointerConstraint {
    pub(crate) fn build(ctx: &BuildCtx<'_>, target: &Shape, tokens: &[Token<'_>]) -> ValidationResult<Self> {
        let (head, tail) = split_dive(tokens);
        let mut required = false;
        let mut rules = Vec::new();
        for token in head {
            match token.name {
                REQUIRED => ctx.required(token, &mut required)?,
                _ => rules.extend(ctx.custom(token, "pointer")?),
            }
        }
        let target = compile(ctx, target, tail.unwrap_or_default())?;
        Ok(Self {
            required,
            rules,
            target: Box::new(target),
        })
    }

    pub(crate) fn check(&self, label: &str, value: Value<'_>, walk: &mut Walk<'_>) -> Result<(), Halt> {
        let pointee = match value {
            Value::Optional(None) => {
                if self.required {
                    walk.report(Violation::required(label))?;
                }
                return Ok(());
            }
            Value::Optional(Some(pointee)) => pointee.value(),
            other => other,
        };
        apply_all(&self.rules, label, value, walk)?;
        // The pointee is checked as a plain value: `Some("")` is absent here.
        self.target.check(label, pointee, walk)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::executor::Mode;
    use crate::model::Registry;
    use crate::traits::Field;
    use crate::validators::test_support::build;

    fn violations(annotation: &str, shape: Shape, value: Value<'_>) -> Vec<(String, String)> {
        let constraint = build(&shape, annotation).unwrap();
        let registry = Registry::default();
        let mut walk = Walk::new(&registry, Mode::All, 8);
        let result = constraint.check("Tags", value, &mut walk);
        walk.finish(result)
            .unwrap()
            .into_vec()
            .into_iter()
            .map(|v| (v.field, v.message))
            .collect()
    }

    #[test]
    fn test_dive_reports_element_index() {
        let tags = vec!["a".to_string(), String::new()];
        assert_eq!(
            violations("req|dive|req", <Vec<String>>::shape(), tags.value()),
            vec![("Tags[1]".to_string(), "Tags[1] is required".to_string())]
        );
    }

    #[test]
    fn test_empty_sequence_is_valid() {
        let tags: Vec<String> = Vec::new();
        assert!(violations("req|dive|req", <Vec<String>>::shape(), tags.value()).is_empty());
    }

    #[test]
    fn test_element_count_bounds() {
        let tags = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        assert_eq!(
            violations("max:2", <Vec<String>>::shape(), tags.value()),
            vec![("Tags".to_string(), "Tags can not have more than 2 elements".to_string())]
        );
        assert_eq!(
            violations("min:4", <Vec<String>>::shape(), tags.value()),
            vec![("Tags".to_string(), "Tags must have at least 4 elements".to_string())]
        );
    }

    #[test]
    fn test_element_rules_after_dive() {
        let tags = vec!["ab".to_string(), "abcd".to_string()];
        assert_eq!(
            violations("dive|min:3", <Vec<String>>::shape(), tags.value()),
            vec![("Tags[0]".to_string(), "Tags[0] must be at least 3 characters".to_string())]
        );
    }

    #[test]
    fn test_nested_dive() {
        let nested = vec![vec!["a".to_string()], vec![String::new(), "b".to_string()]];
        assert_eq!(
            violations("dive|dive|req", <Vec<Vec<String>>>::shape(), nested.value()),
            vec![("Tags[1][0]".to_string(), "Tags[1][0] is required".to_string())]
        );
    }

    #[test]
    fn test_optional_sequence_required() {
        let missing: Option<Vec<String>> = None;
        assert_eq!(
            violations("req|dive|req", <Option<Vec<String>>>::shape(), missing.value()),
            vec![("Tags".to_string(), "Tags is required".to_string())]
        );
        assert!(violations("dive|req", <Option<Vec<String>>>::shape(), missing.value()).is_empty());
    }

    #[test]
    fn test_pointer_dive() {
        let shape = <Option<String>>::shape();
        let empty = Some(String::new());
        assert_eq!(
            violations("req|dive|req", shape.clone(), empty.value()),
            vec![("Tags".to_string(), "Tags is required".to_string())]
        );

        let present = Some("a".to_string());
        assert!(violations("req|dive|req", shape.clone(), present.value()).is_empty());

        let missing: Option<String> = None;
        assert_eq!(violations("req|dive|req", shape.clone(), missing.value()).len(), 1);
        assert!(violations("dive|req", shape, missing.value()).is_empty());
    }

    #[test]
    fn test_sequence_of_pointers() {
        let values = vec![Some("a".to_string()), Some(String::new()), None];
        assert_eq!(
            violations("req|dive|req|dive|req", <Vec<Option<String>>>::shape(), values.value()),
            vec![
                ("Tags[1]".to_string(), "Tags[1] is required".to_string()),
                ("Tags[2]".to_string(), "Tags[2] is required".to_string()),
            ]
        );
    }

    #[test]
    fn test_pointer_head_rejects_bounds() {
        assert!(matches!(
            build(&<Option<String>>::shape(), "min:1|dive|req"),
            Err(Error::UnsupportedRule { kind: "pointer", .. })
        ));
    }

    #[test]
    fn test_sequence_rejects_pattern() {
        assert!(matches!(
            build(&<Vec<String>>::shape(), "regex:^a"),
            Err(Error::UnsupportedRule { kind: "sequence", .. })
        ));
    }
}
