//! Configuration management.
//!
//! Values come from an optional file plus `BUFETE__`-prefixed environment
//! variables (`BUFETE__PERMISSIONS__POLICY_FILE=/etc/bufete/policy.toml`).

use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::Result;
use crate::rbac::{self, PermissionTable};
use crate::telemetry::{self, LoggingConfig};

/// Main application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Deployment environment (development, staging, production)
    #[serde(default = "default_environment")]
    pub environment: String,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub permissions: PermissionsConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: default_environment(),
            logging: LoggingConfig::default(),
            permissions: PermissionsConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PermissionsConfig {
    /// Optional TOML policy layered over the built-in table
    #[serde(default)]
    pub policy_file: Option<PathBuf>,

    /// Refuse to start when the policy grants actions its module access denies
    #[serde(default = "default_strict")]
    pub strict: bool,
}

impl Default for PermissionsConfig {
    fn default() -> Self {
        Self {
            policy_file: None,
            strict: default_strict(),
        }
    }
}

fn default_environment() -> String {
    "production".to_string()
}

fn default_strict() -> bool {
    true
}

impl Config {
    /// Load configuration from the environment (and `.env`, if present).
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();
        let config = config::Config::builder()
            .add_source(environment())
            .build()?;
        Ok(config.try_deserialize()?)
    }

    /// Load from a specific file, with environment overrides on top.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(environment())
            .build()?;
        Ok(config.try_deserialize()?)
    }

    /// Build the permission table this configuration describes.
    pub fn permission_table(&self) -> Result<PermissionTable> {
        let table = match &self.permissions.policy_file {
            Some(path) => PermissionTable::from_policy_file(path, self.permissions.strict)?,
            None => PermissionTable::defaults(),
        };
        Ok(table)
    }

    /// Initialize logging, then build and install the process-wide table.
    pub fn bootstrap(&self) -> anyhow::Result<&'static PermissionTable> {
        telemetry::init_logging(&self.logging, &self.environment)?;
        rbac::install(self.permission_table()?)?;
        let table = rbac::global();
        info!(
            environment = %self.environment,
            policy_file = ?self.permissions.policy_file,
            dropped_grants = table.inconsistencies().len(),
            "Permission table ready"
        );
        Ok(table)
    }
}

fn environment() -> config::Environment {
    config::Environment::with_prefix("BUFETE")
        .separator("__")
        .try_parsing(true)
}
