//! Constraint executor
//!
//! A [`Walk`] carries the state of one validation call: the registry used to
//! resolve nested models, the reporting mode and the violations found so far.
//! Checks return [`Halt`] to stop early, either because first-violation mode
//! has its answer or because an error aborts the call.

use std::any::Any;
use tracing::trace;

use crate::error::{Error, ValidationResult, Violation, Violations};
use crate::model::Registry;

/// How many violations a call collects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Mode {
    First,
    All,
}

/// Reason a walk stopped before visiting everything
#[derive(Debug)]
pub(crate) enum Halt {
    /// First-violation mode found its violation
    Full,
    Failed(Error),
}

impl From<Error> for Halt {
    fn from(error: Error) -> Self {
        Halt::Failed(error)
    }
}

pub(crate) struct Walk<'r> {
    registry: &'r Registry,
    mode: Mode,
    max_depth: usize,
    depth: usize,
    found: Vec<Violation>,
}

impl<'r> Walk<'r> {
    pub fn new(registry: &'r Registry, mode: Mode, max_depth: usize) -> Self {
        Self {
            registry,
            mode,
            max_depth,
            depth: 0,
            found: Vec::new(),
        }
    }

    /// Record a violation; in first-violation mode this ends the walk.
    pub fn report(&mut self, violation: Violation) -> Result<(), Halt> {
        trace!(field = %violation.field, code = %violation.code, "violation");
        self.found.push(violation);
        match self.mode {
            Mode::First => Err(Halt::Full),
            Mode::All => Ok(()),
        }
    }

    /// Validate a top-level record
    pub fn root(&mut self, name: &'static str, record: &dyn Any) -> Result<(), Halt> {
        self.enter(None, name, record)
    }

    /// Validate a nested record under `path`
    pub fn descend(&mut self, path: &str, name: &'static str, record: &dyn Any) -> Result<(), Halt> {
        self.enter(Some(path), name, record)
    }

    fn enter(&mut self, path: Option<&str>, name: &'static str, record: &dyn Any) -> Result<(), Halt> {
        let registry = self.registry;
        let model = registry.get(record.type_id()).ok_or(Error::NotRegistered(name))?;
        if self.depth >= self.max_depth {
            return Err(Error::TooDeep {
                field: path.unwrap_or(name).to_string(),
                limit: self.max_depth,
            }
            .into());
        }
        self.depth += 1;
        let result = model.check(path, record, self);
        self.depth -= 1;
        result
    }

    /// Turn the outcome of a walk into the caller's result. Errors win over
    /// any violations collected before them.
    pub fn finish(self, outcome: Result<(), Halt>) -> ValidationResult<Violations> {
        match outcome {
            Ok(()) | Err(Halt::Full) => Ok(Violations::from(self.found)),
            Err(Halt::Failed(error)) => Err(error),
        }
    }
}
