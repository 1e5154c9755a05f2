//! Role listing and description.

use anyhow::Result;
use clap::Subcommand;
use serde::Serialize;
use tabled::Tabled;

use bufete_core::rbac::{PermissionTable, Role};

use crate::output::{self, OutputFormat};

#[derive(Subcommand)]
pub enum RolesCommands {
    /// List every role with its title and reachable modules
    List,

    /// Show a role's description and what it can do in each module
    Describe {
        /// Role identifier (e.g. abogado_senior)
        role: String,
    },
}

#[derive(Debug, Serialize, Tabled)]
struct RoleRow {
    #[tabled(rename = "Role")]
    role: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Modules")]
    modules: usize,
}

pub fn execute(cmd: RolesCommands, table: &PermissionTable, format: OutputFormat) -> Result<()> {
    match cmd {
        RolesCommands::List => {
            let rows: Vec<RoleRow> = Role::ALL
                .into_iter()
                .map(|role| RoleRow {
                    role: role.to_string(),
                    title: table.profile(role).title,
                    modules: table.accessible_modules(role).len(),
                })
                .collect();
            output::print_list(&rows, format)?;
        }

        RolesCommands::Describe { role } => {
            let description = table.describe_role_raw(&role);
            if description.role.is_none() {
                output::print_warning(&format!("'{}' is not a known role", role));
            }

            match format {
                OutputFormat::Table => {
                    output::print_header(&description.title);
                    println!("{}", description.description);
                    println!();
                    for line in &description.available_actions {
                        output::print_detail("•", line);
                    }
                }
                _ => output::print_item(&description, format)?,
            }
        }
    }

    Ok(())
}
