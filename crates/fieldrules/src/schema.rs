//! Field declarations for record types

use std::any::Any;
use std::marker::PhantomData;
use crate::traits::{Field, Record, Shape};

/// Type-erased field accessor, computed once per field at registration
pub(crate) type Accessor = Box<dyn for<'a> Fn(&'a dyn Any) -> Option<&'a dyn Field> + Send + Sync>;

/// One declared field before compilation
pub(crate) struct FieldDecl {
    pub name: &'static str,
    pub rules: String,
    pub shape: Shape,
    pub get: Option<Accessor>,
}

/// Ordered list of a record's fields, filled in by [`Record::describe`]
///
/// ```ignore
/// impl Record for User {
///     fn describe(schema: &mut Schema<Self>) {
///         schema
///             .field("Name", "req|min:5|max:15", |u| &u.name)
///             .field("Age", "min:3|max:120", |u| &u.age)
///             .skip("password_hash");
///     }
/// }
/// ```
pub struct Schema<T> {
    fields: Vec<FieldDecl>,
    _record: PhantomData<fn(&T)>,
}

impl<T: Record> Schema<T> {
    pub(crate) fn new() -> Self {
        Self {
            fields: Vec::new(),
            _record: PhantomData,
        }
    }

    /// Declare a field with its annotation. An empty annotation is a
    /// pass-through.
    pub fn field<F: Field + 'static>(&mut self, name: &'static str, rules: &str, get: fn(&T) -> &F) -> &mut Self {
        self.fields.push(FieldDecl {
            name,
            rules: rules.to_owned(),
            shape: F::shape(),
            get: Some(erase(get)),
        });
        self
    }

    /// Declare a field that is never validated, keeping positions aligned
    /// with the record's declaration order.
    pub fn skip(&mut self, name: &'static str) -> &mut Self {
        self.fields.push(FieldDecl {
            name,
            rules: String::new(),
            shape: Shape::Opaque,
            get: None,
        });
        self
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub(crate) fn into_fields(self) -> Vec<FieldDecl> {
        self.fields
    }
}

fn erase<T: Record, F: Field + 'static>(get: fn(&T) -> &F) -> Accessor {
    accessor(move |record: &dyn Any| record.downcast_ref::<T>().map(|r| get(r) as &dyn Field))
}

fn accessor<G>(get: G) -> Accessor
where
    G: for<'a> Fn(&'a dyn Any) -> Option<&'a dyn Field> + Send + Sync + 'static,
{
    Box::new(get)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Point {
        x: i32,
        label: String,
    }

    impl Record for Point {
        fn describe(schema: &mut Schema<Self>) {
            schema
                .field("X", "min:0", |p| &p.x)
                .field("Label", "", |p| &p.label)
                .skip("cache");
        }
    }

    #[test]
    fn test_schema_keeps_declaration_order() {
        let mut schema = Schema::<Point>::new();
        Point::describe(&mut schema);
        assert_eq!(schema.len(), 3);

        let fields = schema.into_fields();
        let names: Vec<_> = fields.iter().map(|f| f.name).collect();
        assert_eq!(names, vec!["X", "Label", "cache"]);
        assert_eq!(fields[0].shape, Shape::Int);
        assert_eq!(fields[1].shape, Shape::Text);
        assert!(fields[2].get.is_none());
    }

    #[test]
    fn test_accessor_reads_field() {
        let mut schema = Schema::<Point>::new();
        Point::describe(&mut schema);
        let fields = schema.into_fields();

        let point = Point { x: 7, label: "origin".to_string() };
        let get = fields[0].get.as_ref().unwrap();
        assert_eq!(get(&point as &dyn Any).and_then(|f| f.value().as_i64()), Some(7));

        let get = fields[1].get.as_ref().unwrap();
        assert_eq!(get(&point as &dyn Any).and_then(|f| f.value().as_str()), Some("origin"));

        // Wrong record type yields nothing rather than panicking.
        assert!(get(&42u8 as &dyn Any).is_none());
    }
}
