//! Process-wide default validator
//!
//! Convenience for programs that register their models once at startup.
//! Registration takes the write lock; validation only ever takes the read
//! lock, so concurrent validation does not serialize.

use std::sync::OnceLock;
use parking_lot::{RwLock, RwLockReadGuard};

use crate::error::{ValidationResult, Violation, Violations};
use crate::traits::{Record, Value};
use crate::validator::Validator;
use crate::validators::custom::RuleResult;

static DEFAULT_VALIDATOR: OnceLock<RwLock<Validator>> = OnceLock::new();

fn instance() -> &'static RwLock<Validator> {
    DEFAULT_VALIDATOR.get_or_init(|| RwLock::new(Validator::new()))
}

/// Read access to the default validator
pub fn validator() -> RwLockReadGuard<'static, Validator> {
    instance().read()
}

pub fn register<T: Record>() -> ValidationResult<()> {
    instance().write().register::<T>()
}

pub fn add_rule<R>(name: impl Into<String>, rule: R) -> ValidationResult<()>
where
    R: Fn(&str, &Value<'_>) -> RuleResult + Send + Sync + 'static,
{
    instance().write().add_rule(name, rule)
}

pub fn add_text_rule<F>(name: impl Into<String>, check: F) -> ValidationResult<()>
where
    F: Fn(&str, &str) -> Option<String> + Send + Sync + 'static,
{
    instance().write().add_text_rule(name, check)
}

pub fn add_record_rule<T, F>(rule: F) -> ValidationResult<()>
where
    T: Record,
    F: Fn(&T) -> RuleResult + Send + Sync + 'static,
{
    instance().write().add_record_rule(rule)
}

pub fn violation<T: Record>(record: &T) -> ValidationResult<Option<Violation>> {
    instance().read().violation(record)
}

pub fn violations<T: Record>(record: &T) -> ValidationResult<Violations> {
    instance().read().violations(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Schema;

    // Each test uses its own record type: the default validator is shared by
    // every test in the process.
    struct Signup {
        email: String,
    }

    impl Record for Signup {
        fn describe(schema: &mut Schema<Self>) {
            schema.field("Email", "req|regex:@", |s| &s.email);
        }
    }

    struct Coupon {
        code: String,
    }

    impl Record for Coupon {
        fn describe(schema: &mut Schema<Self>) {
            schema.field("Code", "req", |c| &c.code);
        }
    }

    #[test]
    fn test_default_validator() {
        register::<Signup>().unwrap();
        assert!(validator().is_registered::<Signup>());

        let bad = Signup { email: "nobody".to_string() };
        assert_eq!(
            violation(&bad).unwrap().map(|v| v.message),
            Some("Email must match regex /@/".to_string())
        );
        let good = Signup { email: "a@b.c".to_string() };
        assert!(violations(&good).unwrap().is_empty());
    }

    #[test]
    fn test_default_validator_record_rules() {
        register::<Coupon>().unwrap();
        add_record_rule(|coupon: &Coupon| {
            Ok((coupon.code.len() != 8).then(|| "coupon codes have 8 characters".to_string()))
        })
        .unwrap();

        let coupon = Coupon { code: "SHORT".to_string() };
        let found = violations(&coupon).unwrap();
        assert_eq!(found.messages(), vec!["coupon codes have 8 characters"]);
    }
}
