//! Allocation manager configuration
//!
//! Settings can be built in code through [`ManagerConfigBuilder`] or loaded
//! from TOML:
//!
//! ```toml
//! strict_ids = true
//! default_policy = "worst-fit"
//! ```

use crate::core::error::Result;
use crate::core::placement::Policy;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ManagerConfig {
    /// Reject duplicate bin/object ids with an error
    ///
    /// When disabled a duplicate id is ignored and the call succeeds without
    /// changing anything.
    pub strict_ids: bool,

    /// Policy used by `add_object_default`
    pub default_policy: Policy,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        ManagerConfig {
            strict_ids: true,
            default_policy: Policy::BestFit,
        }
    }
}

impl ManagerConfig {
    pub fn builder() -> ManagerConfigBuilder {
        ManagerConfigBuilder::new()
    }

    /// Parse a configuration from TOML; missing fields take their defaults
    pub fn from_toml_str(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }
}

/// Fluent builder for [`ManagerConfig`]
///
/// # Examples
///
/// ```
/// use binpack_rs::{ManagerConfig, Policy};
///
/// let config = ManagerConfig::builder()
///     .strict_ids(false)
///     .default_policy(Policy::WorstFit)
///     .build();
///
/// assert!(!config.strict_ids);
/// assert_eq!(config.default_policy, Policy::WorstFit);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ManagerConfigBuilder {
    config: ManagerConfig,
}

impl ManagerConfigBuilder {
    pub fn new() -> Self {
        ManagerConfigBuilder {
            config: ManagerConfig::default(),
        }
    }

    pub fn strict_ids(mut self, strict: bool) -> Self {
        self.config.strict_ids = strict;
        self
    }

    pub fn default_policy(mut self, policy: Policy) -> Self {
        self.config.default_policy = policy;
        self
    }

    pub fn build(self) -> ManagerConfig {
        self.config
    }
}
