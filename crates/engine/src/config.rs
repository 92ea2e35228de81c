//! Engine configuration via `cadence.toml`
//!
//! Every key is optional; missing keys take their defaults.

use std::path::Path;

use cadence_core::{EngineError, EngineResult};
use serde::{Deserialize, Serialize};

/// Conventional config file name
pub const CONFIG_FILE_NAME: &str = "cadence.toml";

/// Settings for the external resource session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceConfig {
    /// Begin/commit/rollback the resource's own transaction with each unit
    /// of work
    #[serde(default = "default_true")]
    pub handle_transactions: bool,
}

impl Default for ResourceConfig {
    fn default() -> Self {
        Self {
            handle_transactions: true,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_admin_groups() -> Vec<String> {
    vec!["admins".to_string()]
}

fn default_max_attempts() -> u32 {
    3
}

/// Engine configuration loaded from `cadence.toml`
///
/// # Example
///
/// ```toml
/// authorization_enabled = true
/// admin_groups = ["admins", "operators"]
/// max_attempts = 5
///
/// [resource]
/// handle_transactions = false
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Check command permissions against the caller's grants
    #[serde(default)]
    pub authorization_enabled: bool,
    /// Members of these groups bypass permission checks
    #[serde(default = "default_admin_groups")]
    pub admin_groups: Vec<String>,
    /// Attempts per top-level command on optimistic-lock conflicts,
    /// counting the first
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// External resource session settings
    #[serde(default)]
    pub resource: ResourceConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            authorization_enabled: false,
            admin_groups: default_admin_groups(),
            max_attempts: default_max_attempts(),
            resource: ResourceConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable permission checks
    pub fn with_authorization(mut self, enabled: bool) -> Self {
        self.authorization_enabled = enabled;
        self
    }

    /// Replace the admin groups
    pub fn with_admin_groups<I, S>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.admin_groups = groups.into_iter().map(Into::into).collect();
        self
    }

    /// Set the attempt bound for conflict retries
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Enable or disable resource transaction handling
    pub fn with_resource_transactions(mut self, handle: bool) -> Self {
        self.resource.handle_transactions = handle;
        self
    }

    /// Check value ranges
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `max_attempts` is zero.
    pub fn validate(&self) -> EngineResult<()> {
        if self.max_attempts == 0 {
            return Err(EngineError::configuration(
                "max_attempts must be at least 1",
            ));
        }
        Ok(())
    }

    /// Parse and validate TOML text
    pub fn from_toml_str(content: &str) -> EngineResult<Self> {
        let config: EngineConfig = toml::from_str(content)
            .map_err(|e| EngineError::configuration(format!("failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a config file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn from_file(path: &Path) -> EngineResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            EngineError::configuration(format!(
                "failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&content)
    }

    /// Default config file content with comments
    pub fn default_toml() -> &'static str {
        r#"# Cadence engine configuration

# Check command permissions against the caller's grants (default: false)
authorization_enabled = false

# Members of these groups bypass permission checks
admin_groups = ["admins"]

# Attempts per command when an optimistic-lock conflict occurs (default: 3)
max_attempts = 3

[resource]
# Drive the external resource's own transaction (default: true)
handle_transactions = true
"#
    }

    /// Serialize to TOML and write to `path`
    pub fn write_to_file(&self, path: &Path) -> EngineResult<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| EngineError::internal(format!("failed to serialize config: {}", e)))?;
        std::fs::write(path, content).map_err(|e| {
            EngineError::configuration(format!(
                "failed to write config file '{}': {}",
                path.display(),
                e
            ))
        })
    }
}
