//! Core field access traits
//!
//! A record declares its fields through [`Record::describe`]. Every field type
//! implements [`Field`], which reports a static [`Shape`] used when the model
//! is compiled and a borrowed [`Value`] used when an instance is checked.

use std::any::{Any, TypeId};
use std::fmt;
use chrono::{DateTime, Utc};
use crate::schema::Schema;

/// A record type that can be registered with a validator
pub trait Record: Any + Sized {
    /// Declare the record's fields, in declaration order.
    fn describe(schema: &mut Schema<Self>);

    /// Name used in messages and errors. Defaults to the type's own name
    /// without module path or generic arguments, so `Page<app::User>` is
    /// `Page`. Override it to tell instantiations of a generic record apart.
    fn name() -> &'static str {
        type_label(std::any::type_name::<Self>())
    }
}

fn type_label(full: &str) -> &str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

/// Static description of a field type, resolved once at registration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shape {
    Text,
    Int,
    Float,
    Time,
    Optional(Box<Shape>),
    Seq(Box<Shape>),
    Record { type_id: TypeId, name: &'static str },
    Opaque,
}

impl Shape {
    pub fn record<T: Record>() -> Self {
        Shape::Record {
            type_id: TypeId::of::<T>(),
            name: T::name(),
        }
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self, Shape::Text | Shape::Int | Shape::Float | Shape::Time)
    }

    /// Shape with every `Optional` layer removed
    pub fn strip_optional(&self) -> &Shape {
        let mut shape = self;
        while let Shape::Optional(inner) = shape {
            shape = inner;
        }
        shape
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Shape::Text => "text",
            Shape::Int => "integer",
            Shape::Float => "float",
            Shape::Time => "time",
            Shape::Optional(_) => "optional",
            Shape::Seq(_) => "sequence",
            Shape::Record { .. } => "record",
            Shape::Opaque => "opaque",
        }
    }
}

/// Borrowed view of one field value
#[derive(Clone, Copy)]
pub enum Value<'a> {
    Text(&'a str),
    Int(i64),
    Float(f64),
    Time(&'a DateTime<Utc>),
    Optional(Option<&'a dyn Field>),
    Seq(&'a dyn Elements),
    Record {
        record: &'a dyn Any,
        name: &'static str,
    },
    Opaque,
}

impl<'a> Value<'a> {
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Text(_) => "text",
            Value::Int(_) => "integer",
            Value::Float(_) => "float",
            Value::Time(_) => "time",
            Value::Optional(_) => "optional",
            Value::Seq(_) => "sequence",
            Value::Record { .. } => "record",
            Value::Opaque => "opaque",
        }
    }

    /// Whether the value is its kind's zero-equivalent. Times at or before
    /// the Unix epoch count as zero, the epoch being `DateTime<Utc>`'s default.
    pub fn is_zero(&self) -> bool {
        match self {
            Value::Text(s) => s.is_empty(),
            Value::Int(i) => *i == 0,
            Value::Float(f) => *f == 0.0,
            Value::Time(t) => t.timestamp() <= 0,
            Value::Optional(inner) => inner.is_none(),
            Value::Seq(_) | Value::Record { .. } | Value::Opaque => false,
        }
    }

    pub fn as_str(&self) -> Option<&'a str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Downcast a record value to its concrete type
    pub fn as_record<T: Record>(&self) -> Option<&'a T> {
        match self {
            Value::Record { record, .. } => record.downcast_ref::<T>(),
            _ => None,
        }
    }
}

impl fmt::Debug for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => f.debug_tuple("Text").field(s).finish(),
            Value::Int(i) => f.debug_tuple("Int").field(i).finish(),
            Value::Float(x) => f.debug_tuple("Float").field(x).finish(),
            Value::Time(t) => f.debug_tuple("Time").field(t).finish(),
            Value::Optional(inner) => f.debug_tuple("Optional").field(&inner.map(|v| v.value())).finish(),
            Value::Seq(items) => f.debug_struct("Seq").field("len", &items.len()).finish(),
            Value::Record { name, .. } => f.debug_struct("Record").field("name", name).finish(),
            Value::Opaque => f.write_str("Opaque"),
        }
    }
}

/// A type that can appear as a record field
pub trait Field {
    fn shape() -> Shape
    where
        Self: Sized;

    fn value(&self) -> Value<'_>;
}

/// Indexed access to the elements of a sequence field
pub trait Elements {
    fn len(&self) -> usize;

    fn get(&self, index: usize) -> Option<&dyn Field>;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Field for String {
    fn shape() -> Shape {
        Shape::Text
    }

    fn value(&self) -> Value<'_> {
        Value::Text(self.as_str())
    }
}

impl Field for &str {
    fn shape() -> Shape {
        Shape::Text
    }

    fn value(&self) -> Value<'_> {
        Value::Text(*self)
    }
}

macro_rules! int_field {
    ($($ty:ty),*) => {
        $(
            impl Field for $ty {
                fn shape() -> Shape {
                    Shape::Int
                }

                fn value(&self) -> Value<'_> {
                    Value::Int(i64::from(*self))
                }
            }
        )*
    };
}

int_field!(i8, i16, i32, i64, u8, u16, u32);

// Values beyond the i64 range saturate at i64::MAX.
macro_rules! wide_int_field {
    ($($ty:ty),*) => {
        $(
            impl Field for $ty {
                fn shape() -> Shape {
                    Shape::Int
                }

                fn value(&self) -> Value<'_> {
                    Value::Int(i64::try_from(*self).unwrap_or(i64::MAX))
                }
            }
        )*
    };
}

wide_int_field!(u64, usize, isize);

impl Field for f32 {
    fn shape() -> Shape {
        Shape::Float
    }

    fn value(&self) -> Value<'_> {
        Value::Float(f64::from(*self))
    }
}

impl Field for f64 {
    fn shape() -> Shape {
        Shape::Float
    }

    fn value(&self) -> Value<'_> {
        Value::Float(*self)
    }
}

impl Field for DateTime<Utc> {
    fn shape() -> Shape {
        Shape::Time
    }

    fn value(&self) -> Value<'_> {
        Value::Time(self)
    }
}

impl Field for bool {
    fn shape() -> Shape {
        Shape::Opaque
    }

    fn value(&self) -> Value<'_> {
        Value::Opaque
    }
}

impl<T: Field> Field for Option<T> {
    fn shape() -> Shape {
        Shape::Optional(Box::new(T::shape()))
    }

    fn value(&self) -> Value<'_> {
        Value::Optional(self.as_ref().map(|v| v as &dyn Field))
    }
}

impl<T: Field> Field for Box<T> {
    fn shape() -> Shape {
        T::shape()
    }

    fn value(&self) -> Value<'_> {
        (**self).value()
    }
}

impl<T: Field> Field for Vec<T> {
    fn shape() -> Shape {
        Shape::Seq(Box::new(T::shape()))
    }

    fn value(&self) -> Value<'_> {
        Value::Seq(self)
    }
}

impl<T: Field> Elements for Vec<T> {
    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn get(&self, index: usize) -> Option<&dyn Field> {
        self.as_slice().get(index).map(|v| v as &dyn Field)
    }
}

impl<T: Field, const N: usize> Field for [T; N] {
    fn shape() -> Shape {
        Shape::Seq(Box::new(T::shape()))
    }

    fn value(&self) -> Value<'_> {
        Value::Seq(self)
    }
}

impl<T: Field, const N: usize> Elements for [T; N] {
    fn len(&self) -> usize {
        N
    }

    fn get(&self, index: usize) -> Option<&dyn Field> {
        self.as_slice().get(index).map(|v| v as &dyn Field)
    }
}

/// Implement [`Field`] for record types so they can be nested inside other
/// records, sequences and options.
///
/// ```ignore
/// record_field!(Address, LineItem);
/// ```
#[macro_export]
macro_rules! record_field {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::Field for $ty {
                fn shape() -> $crate::Shape {
                    $crate::Shape::record::<$ty>()
                }

                fn value(&self) -> $crate::Value<'_> {
                    $crate::Value::Record {
                        record: self,
                        name: <$ty as $crate::Record>::name(),
                    }
                }
            }
        )+
    };
}
