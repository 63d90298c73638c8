//! Compiled models and the registry that holds them

use std::any::{Any, TypeId};
use std::collections::HashMap;

use crate::config::ValidatorConfig;
use crate::error::{codes, Error, ValidationResult, Violation};
use crate::executor::{Halt, Walk};
use crate::schema::{Accessor, Schema};
use crate::traits::Record;
use crate::validators::custom::{RecordRuleFn, RuleSet};
use crate::validators::{compile_field, BuildCtx, Constraint};

/// Compiled rules for one declared field
pub(crate) struct FieldConstraint {
    pub name: &'static str,
    pub get: Option<Accessor>,
    pub constraint: Constraint,
}

/// Everything needed to validate instances of one record type. Fields keep
/// declaration order, which is also the order violations are reported in.
pub(crate) struct Model {
    pub name: &'static str,
    pub fields: Vec<FieldConstraint>,
    record_rules: Vec<RecordRuleFn>,
}

impl Model {
    pub fn compile<T: Record>(rules: &RuleSet, config: &ValidatorConfig) -> ValidationResult<Self> {
        let mut schema = Schema::<T>::new();
        T::describe(&mut schema);
        let name = T::name();

        let fields = schema
            .into_fields()
            .into_iter()
            .map(|declared| -> ValidationResult<FieldConstraint> {
                let ctx = BuildCtx {
                    model: name,
                    field: declared.name,
                    rules,
                    config,
                };
                let constraint = match declared.get {
                    Some(_) => compile_field(&ctx, &declared.shape, &declared.rules)?,
                    None => Constraint::PassThrough,
                };
                Ok(FieldConstraint {
                    name: declared.name,
                    get: declared.get,
                    constraint,
                })
            })
            .collect::<ValidationResult<Vec<_>>>()?;

        Ok(Self {
            name,
            fields,
            record_rules: Vec::new(),
        })
    }

    pub fn push_record_rule(&mut self, rule: RecordRuleFn) {
        self.record_rules.push(rule);
    }

    pub fn record_rule_count(&self) -> usize {
        self.record_rules.len()
    }

    pub fn field_names(&self) -> Vec<&'static str> {
        self.fields.iter().map(|f| f.name).collect()
    }

    /// Check every field, then the whole-record rules
    pub fn check(&self, path: Option<&str>, record: &dyn Any, walk: &mut Walk<'_>) -> Result<(), Halt> {
        for field in &self.fields {
            if field.constraint.is_pass_through() {
                continue;
            }
            let Some(get) = &field.get else {
                continue;
            };
            let label = match path {
                Some(path) => format!("{}.{}", path, field.name),
                None => field.name.to_string(),
            };
            let value = get(record).ok_or_else(|| Error::Mismatch {
                field: label.clone(),
                expected: self.name,
                found: "another record type",
            })?;
            field.constraint.check(&label, value.value(), walk)?;
        }

        let owner = path.unwrap_or(self.name);
        for rule in &self.record_rules {
            match rule(record) {
                Ok(None) => {}
                Ok(Some(message)) => walk.report(Violation::new(owner, message, codes::RECORD))?,
                Err(source) => {
                    return Err(Error::RecordRule {
                        model: self.name,
                        source,
                    }
                    .into())
                }
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Model")
            .field("name", &self.name)
            .field("fields", &self.field_names())
            .field("record_rules", &self.record_rules.len())
            .finish()
    }
}

/// Models by record type
#[derive(Debug, Default)]
pub(crate) struct Registry {
    models: HashMap<TypeId, Model>,
}

impl Registry {
    pub fn get(&self, type_id: TypeId) -> Option<&Model> {
        self.models.get(&type_id)
    }

    pub fn get_mut(&mut self, type_id: TypeId) -> Option<&mut Model> {
        self.models.get_mut(&type_id)
    }

    pub fn contains(&self, type_id: TypeId) -> bool {
        self.models.contains_key(&type_id)
    }

    pub fn insert(&mut self, type_id: TypeId, model: Model) {
        self.models.insert(type_id, model);
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.models.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct User {
        name: String,
        age: i32,
        active: bool,
    }

    impl Record for User {
        fn describe(schema: &mut Schema<Self>) {
            schema
                .field("Name", "req|min:5|max:15", |u| &u.name)
                .field("Age", "min:3|max:120", |u| &u.age)
                .field("Active", "req", |u| &u.active)
                .skip("secret");
        }
    }

    #[test]
    fn test_compile_keeps_positions() {
        let model = Model::compile::<User>(&RuleSet::default(), &ValidatorConfig::default()).unwrap();
        assert_eq!(model.name, "User");
        assert_eq!(model.field_names(), vec!["Name", "Age", "Active", "secret"]);
        assert_eq!(model.fields[0].constraint.kind(), "text");
        assert_eq!(model.fields[1].constraint.kind(), "integer");
        assert!(model.fields[2].constraint.is_pass_through());
        assert!(model.fields[3].constraint.is_pass_through());
    }

    #[test]
    fn test_registration_error_names_the_field() {
        struct Broken {
            count: i64,
        }
        impl Record for Broken {
            fn describe(schema: &mut Schema<Self>) {
                schema.field("Count", "req|min:x", |b| &b.count);
            }
        }

        let err = Model::compile::<Broken>(&RuleSet::default(), &ValidatorConfig::default()).unwrap_err();
        assert!(matches!(err, Error::MalformedRule { model: "Broken", field: "Count", .. }));
        assert!(err.to_string().starts_with("model registration error (Broken.Count `min:x`)"));
    }

    #[test]
    fn test_registry() {
        let mut registry = Registry::default();
        let model = Model::compile::<User>(&RuleSet::default(), &ValidatorConfig::default()).unwrap();
        registry.insert(TypeId::of::<User>(), model);
        assert!(registry.contains(TypeId::of::<User>()));
        assert_eq!(registry.len(), 1);
        assert!(registry.get(TypeId::of::<String>()).is_none());
    }

    #[test]
    fn test_check_walks_fields_in_order() {
        let model = Model::compile::<User>(&RuleSet::default(), &ValidatorConfig::default()).unwrap();
        let mut registry = Registry::default();
        registry.insert(TypeId::of::<User>(), model);

        let user = User {
            name: "Al".to_string(),
            age: 150,
            active: false,
        };
        let mut walk = Walk::new(&registry, crate::executor::Mode::All, 8);
        let outcome = walk.root("User", &user);
        let found = walk.finish(outcome).unwrap();
        assert_eq!(
            found.messages(),
            vec!["Name must be at least 5 characters", "Age can not be greater than 120"]
        );
    }
}
