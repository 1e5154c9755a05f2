//! Policy file validation and export.

use anyhow::{Context, Result};
use clap::Subcommand;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tabled::Tabled;

use bufete_core::rbac::{Inconsistency, InconsistencyReason, PermissionTable};

use crate::output::{self, OutputFormat};

#[derive(Subcommand)]
pub enum PolicyCommands {
    /// Check a policy file; fails if any grant would be dropped
    Validate {
        /// Path to the TOML policy file
        file: PathBuf,
    },

    /// Print the effective table as a policy file
    Export {
        /// Write to a file instead of stdout
        #[arg(short = 'f', long)]
        out: Option<PathBuf>,
    },
}

#[derive(Debug, Serialize, Tabled)]
struct InconsistencyRow {
    #[tabled(rename = "Role")]
    role: String,
    #[tabled(rename = "Module")]
    module: String,
    #[tabled(rename = "Action")]
    action: String,
    #[tabled(rename = "Problem")]
    problem: String,
}

impl From<&Inconsistency> for InconsistencyRow {
    fn from(i: &Inconsistency) -> Self {
        let problem = match i.reason {
            InconsistencyReason::UnsupportedAction => "module has no such action".to_string(),
            InconsistencyReason::InsufficientAccess { granted, required } => {
                format!("needs {} access, has {}", required, granted)
            }
        };
        Self {
            role: i.role.to_string(),
            module: i.module.to_string(),
            action: i.action.to_string(),
            problem,
        }
    }
}

/// Load `file` on its own, over the built-in table, and list every grant
/// normalization would drop.
fn check(file: &Path) -> Result<Vec<InconsistencyRow>> {
    let checked = PermissionTable::from_policy_file(file, false)
        .with_context(|| format!("Failed to load policy {}", file.display()))?;
    Ok(checked.inconsistencies().iter().map(Into::into).collect())
}

pub fn validate(file: &Path, format: OutputFormat) -> Result<()> {
    let rows = check(file)?;

    if rows.is_empty() {
        if format == OutputFormat::Table {
            output::print_success(&format!("{} is consistent", file.display()));
        } else {
            output::print_list(&rows, format)?;
        }
        return Ok(());
    }

    output::print_list(&rows, format)?;
    anyhow::bail!(
        "{} has {} inconsistent grant(s)",
        file.display(),
        rows.len()
    );
}

pub fn export(table: &PermissionTable, out: Option<&Path>) -> Result<()> {
    let toml = table.to_policy_toml()?;
    match out {
        Some(path) => {
            std::fs::write(path, toml)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            output::print_success(&format!("Policy written to {}", path.display()));
        }
        None => print!("{}", toml),
    }
    Ok(())
}
