//! # fieldrules
//!
//! Declarative field validation for plain Rust records. Each field carries a
//! compact annotation such as `req|min:5|max:15`; annotations are compiled
//! once per record type when it is registered, and instances are then checked
//! against the compiled model, reporting either the first violation or all of
//! them.
//!
//! ```ignore
//! use fieldrules::{Record, Schema, Validator};
//!
//! struct User {
//!     name: String,
//!     age: u8,
//!     tags: Vec<String>,
//! }
//!
//! impl Record for User {
//!     fn describe(schema: &mut Schema<Self>) {
//!         schema
//!             .field("Name", "req|min:5|max:15", |u| &u.name)
//!             .field("Age", "min:3|max:120", |u| &u.age)
//!             .field("Tags", "req|dive|req", |u| &u.tags);
//!     }
//! }
//!
//! let mut validator = Validator::new();
//! validator.register::<User>()?;
//! if let Some(violation) = validator.violation(&user)? {
//!     eprintln!("{violation}");
//! }
//! ```

pub mod config;
pub mod error;
pub mod global;
pub mod rules;
pub mod schema;
pub mod traits;
pub mod validator;
pub mod validators;

mod executor;
mod model;

// Re-exports for easy access
pub use config::{UnknownRules, ValidatorConfig, ValidatorConfigBuilder};
pub use error::{codes, Error, RuleError, ValidationResult, Violation, Violations};
pub use schema::Schema;
pub use traits::{Elements, Field, Record, Shape, Value};
pub use validator::Validator;
pub use validators::custom::{RuleFn, RuleResult};
