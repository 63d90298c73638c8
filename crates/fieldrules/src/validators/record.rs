//! Nested record constraints

use super::custom::{apply_all, BoundRule};
use super::{mismatch, require, BuildCtx, Presence};
use crate::error::ValidationResult;
use crate::executor::{Halt, Walk};
use crate::rules::{split_dive, Token, REQUIRED};
use crate::traits::Value;

/// Descends into a nested record through its registered model. The model is
/// looked up when a value is checked, so self-referential records register
/// without recursion.
#[derive(Debug)]
pub struct RecordConstraint {
    name: &'static str,
    required: bool,
    rules: Vec<BoundRule>,
}

impl RecordConstraint {
    pub(crate) fn build(ctx: &BuildCtx<'_>, name: &'static str, tokens: &[Token<'_>]) -> ValidationResult<Self> {
        let (head, tail) = split_dive(tokens);
        if let Some(first) = tail.and_then(|tail| tail.first()) {
            return Err(ctx.malformed(first, "record fields take no rules after dive"));
        }
        let mut required = false;
        let mut rules = Vec::new();
        for token in head {
            match token.name {
                REQUIRED => ctx.required(token, &mut required)?,
                _ => rules.extend(ctx.custom(token, "record")?),
            }
        }
        Ok(Self { name, required, rules })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub(crate) fn check(&self, label: &str, presence: Presence<'_>, walk: &mut Walk<'_>) -> Result<(), Halt> {
        let Some(value) = require(self.required, label, presence, walk)? else {
            return Ok(());
        };
        let Value::Record { record, name } = value else {
            return Err(mismatch(label, "record", &value));
        };
        apply_all(&self.rules, label, value, walk)?;
        walk.descend(label, name, record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::traits::Shape;
    use crate::validators::test_support::build;
    use crate::validators::Constraint;

    struct Address;

    impl crate::Record for Address {
        fn describe(_: &mut crate::Schema<Self>) {}
    }

    #[test]
    fn test_record_accepts_dive_marker() {
        let shape = Shape::record::<Address>();
        let Constraint::Record(constraint) = build(&shape, "req|dive").unwrap() else {
            panic!("expected a record constraint");
        };
        assert_eq!(constraint.name(), "Address");
    }

    #[test]
    fn test_record_rejects_rules_after_dive() {
        let shape = Shape::record::<Address>();
        let err = build(&shape, "dive|req").unwrap_err();
        assert!(matches!(err, Error::MalformedRule { ref rule, .. } if rule == "req"));
    }

    #[test]
    fn test_record_rejects_bounds() {
        let shape = Shape::record::<Address>();
        assert!(matches!(build(&shape, "min:1"), Err(Error::UnsupportedRule { kind: "record", .. })));
    }
}
