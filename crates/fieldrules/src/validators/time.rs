//! Timestamp constraints
//!
//! `min` and `max` bound the age of the timestamp in whole seconds, measured
//! against the clock at validation time. Future timestamps have negative age.

use chrono::Utc;

use super::custom::{apply_all, BoundRule};
use super::{mismatch, require, BuildCtx, Presence};
use crate::error::{codes, ValidationResult, Violation};
use crate::executor::{Halt, Walk};
use crate::rules::{Token, MAX, MIN, REQUIRED};
use crate::traits::Value;

#[derive(Debug, Default)]
pub struct TimeConstraint {
    required: bool,
    min_age: Option<i64>,
    max_age: Option<i64>,
    rules: Vec<BoundRule>,
}

impl TimeConstraint {
    pub(crate) fn build(ctx: &BuildCtx<'_>, tokens: &[Token<'_>]) -> ValidationResult<Self> {
        let mut built = Self::default();
        for token in tokens {
            match token.name {
                REQUIRED => ctx.required(token, &mut built.required)?,
                MIN => ctx.once(token, &mut built.min_age, ctx.number(token)?)?,
                MAX => ctx.once(token, &mut built.max_age, ctx.number(token)?)?,
                _ => built.rules.extend(ctx.custom(token, "time")?),
            }
        }
        Ok(built)
    }

    pub(crate) fn check(&self, label: &str, presence: Presence<'_>, walk: &mut Walk<'_>) -> Result<(), Halt> {
        let Some(value) = require(self.required, label, presence, walk)? else {
            return Ok(());
        };
        let Value::Time(at) = value else {
            return Err(mismatch(label, "time", &value));
        };

        let age = Utc::now().signed_duration_since(*at).num_seconds();
        if let Some(max) = self.max_age {
            if age > max {
                walk.report(Violation::new(
                    label,
                    format!("{label} can not have age greater than {max} seconds"),
                    codes::MAX,
                ))?;
            }
        }
        if let Some(min) = self.min_age {
            if age < min {
                walk.report(Violation::new(
                    label,
                    format!("{label} must have age at least {min} seconds"),
                    codes::MIN,
                ))?;
            }
        }
        apply_all(&self.rules, label, value, walk)
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
    use chrono::{DateTime, Duration};

    fn messages(annotation: &str, at: &DateTime<Utc>) -> Vec<String> {
        let Constraint::Time(constraint) = build(&Shape::Time, annotation).unwrap() else {
            panic!("expected a time constraint");
        };
        let registry = Registry::default();
        let mut walk = Walk::new(&registry, Mode::All, 8);
        let result = constraint.check("CreatedAt", presence(at.value()), &mut walk);
        walk.finish(result)
            .unwrap()
            .into_vec()
            .into_iter()
            .map(|v| v.message)
            .collect()
    }

    #[test]
    fn test_age_within_bounds() {
        let at = Utc::now() - Duration::hours(1);
        assert!(messages("min:60|max:86400", &at).is_empty());
    }

    #[test]
    fn test_too_old() {
        let at = Utc::now() - Duration::days(2);
        assert_eq!(
            messages("max:86400", &at),
            vec!["CreatedAt can not have age greater than 86400 seconds"]
        );
    }

    #[test]
    fn test_too_young() {
        let at = Utc::now() - Duration::seconds(10);
        assert_eq!(messages("min:3600", &at), vec!["CreatedAt must have age at least 3600 seconds"]);
    }

    #[test]
    fn test_future_timestamp_has_negative_age() {
        let at = Utc::now() + Duration::hours(1);
        assert_eq!(messages("min:0", &at), vec!["CreatedAt must have age at least 0 seconds"]);
    }

    #[test]
    fn test_epoch_is_absent() {
        let epoch = DateTime::<Utc>::default();
        assert_eq!(messages("req|max:10", &epoch), vec!["CreatedAt is required"]);
        assert!(messages("max:10", &epoch).is_empty());
    }

    #[test]
    fn test_time_rejects_membership() {
        assert!(matches!(build(&Shape::Time, "in:1,2"), Err(Error::UnsupportedRule { kind: "time", .. })));
    }
}
