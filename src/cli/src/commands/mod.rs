//! Subcommand implementations.

pub mod access;
pub mod matrix;
pub mod policy;
pub mod roles;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use bufete_core::rbac::PermissionTable;

use crate::output;

/// Default policy location: `<config_dir>/bufete/policy.toml`.
pub fn default_policy_path() -> Option<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join("bufete").join("policy.toml"))
        .filter(|path| path.exists())
}

/// Load the effective table. Dropped grants are reported, not fatal; use
/// `policy validate` to check a file strictly.
pub fn load_table(policy: Option<&Path>) -> Result<PermissionTable> {
    let Some(path) = policy else {
        return Ok(PermissionTable::defaults());
    };
    let table = PermissionTable::from_policy_file(path, false)
        .with_context(|| format!("Failed to load policy {}", path.display()))?;
    if !table.inconsistencies().is_empty() {
        output::print_warning(&format!(
            "{} inconsistent grant(s) dropped from {}",
            table.inconsistencies().len(),
            path.display()
        ));
    }
    Ok(table)
}
