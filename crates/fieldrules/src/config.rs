//! Validator configuration and builder

use serde::{Deserialize, Serialize};
use service_builder::builder;

/// Default limit on nested record depth
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// What registration does with a rule name it does not know
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownRules {
    /// Fail registration with `Error::UnknownRule`
    #[default]
    Reject,
    /// Skip the rule and log a warning
    Ignore,
}

/// Validator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[builder]
pub struct ValidatorConfig {
    /// Handling of unknown rule names
    #[builder(default)]
    pub unknown_rules: UnknownRules,

    /// Maximum nesting of records before validation gives up
    #[builder(default = "DEFAULT_MAX_DEPTH", getter)]
    pub max_depth: usize,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            unknown_rules: UnknownRules::Reject,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ValidatorConfig {
    pub fn is_strict(&self) -> bool {
        self.unknown_rules == UnknownRules::Reject
    }
}

// Add convenience methods to the generated builder
impl ValidatorConfigBuilder {
    pub fn strict(self) -> Self {
        self.unknown_rules(UnknownRules::Reject)
    }

    pub fn lenient(self) -> Self {
        self.unknown_rules(UnknownRules::Ignore)
    }

    pub fn max_depth_limit(self, depth: usize) -> Self {
        self.max_depth(depth)
    }

    pub fn build_config(self) -> ValidatorConfig {
        self.build_with_defaults().unwrap_or_default()
    }
}
