//! The full role × module matrix.

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use bufete_core::rbac::{AccessLevel, Action, Module, PermissionTable, Role};

use crate::output::{self, OutputFormat};

#[derive(Args)]
pub struct MatrixArgs {
    /// Only show this role
    #[arg(short, long)]
    pub role: Option<String>,

    /// Include modules the role cannot reach
    #[arg(long)]
    pub all: bool,
}

#[derive(Debug, Serialize, Tabled)]
struct MatrixRow {
    #[tabled(rename = "Role")]
    role: Role,
    #[tabled(rename = "Module")]
    module: Module,
    #[tabled(skip)]
    access: AccessLevel,
    #[tabled(rename = "Access")]
    #[serde(skip)]
    access_cell: String,
    #[tabled(skip)]
    actions: Vec<Action>,
    #[tabled(rename = "Actions")]
    #[serde(skip)]
    actions_cell: String,
}

fn rows(table: &PermissionTable, roles: &[Role], include_none: bool) -> Vec<MatrixRow> {
    roles
        .iter()
        .flat_map(|&role| Module::ALL.into_iter().map(move |module| (role, module)))
        .filter_map(|(role, module)| {
            let access = table.module_access(role, module);
            if access.is_none() && !include_none {
                return None;
            }
            let actions = table.allowed_actions(role, module);
            let actions_cell = actions
                .iter()
                .map(|a| a.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            Some(MatrixRow {
                role,
                module,
                access,
                access_cell: output::access_cell(&access.to_string()),
                actions,
                actions_cell,
            })
        })
        .collect()
}

pub fn execute(args: MatrixArgs, table: &PermissionTable, format: OutputFormat) -> Result<()> {
    let roles = match args.role {
        Some(role) => vec![role.parse::<Role>()?],
        None => Role::ALL.to_vec(),
    };
    output::print_list(&rows(table, &roles, args.all), format)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_skip_unreachable_modules() {
        let table = PermissionTable::defaults();
        let rows = rows(&table, &[Role::Recepcionista], false);
        assert!(rows.iter().all(|r| !r.access.is_none()));
        assert!(rows.iter().all(|r| r.module != Module::Facturacion));

        let all = rows_len(&table, Role::Recepcionista);
        assert_eq!(all, Module::ALL.len());
    }

    fn rows_len(table: &PermissionTable, role: Role) -> usize {
        rows(table, &[role], true).len()
    }

    #[test]
    fn test_super_admin_row_lists_supported_actions() {
        let table = PermissionTable::defaults();
        let rows = rows(&table, &[Role::SuperAdmin], false);
        let billing = rows.iter().find(|r| r.module == Module::Facturacion).unwrap();
        assert_eq!(billing.actions, Module::Facturacion.supported_actions().to_vec());
    }
}
