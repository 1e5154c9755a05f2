//! Single-cell queries: `access` and `can`.

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use bufete_core::rbac::{AccessLevel, Action, Module, PermissionTable, Role};

use crate::output::{self, OutputFormat};

#[derive(Args)]
pub struct AccessArgs {
    /// Role identifier
    pub role: String,
    /// Module identifier
    pub module: String,
}

#[derive(Args)]
pub struct CanArgs {
    /// Role identifier
    pub role: String,
    /// Module identifier
    pub module: String,
    /// Action identifier (create, edit, delete, approve, pay, cancel, export, send_reminders)
    pub action: String,
}

#[derive(Debug, Serialize)]
struct AccessAnswer {
    role: String,
    module: Module,
    access: AccessLevel,
    actions: Vec<Action>,
}

#[derive(Debug, Serialize)]
struct CanAnswer {
    role: String,
    module: Module,
    action: Action,
    allowed: bool,
}

fn resolve_access(args: AccessArgs, table: &PermissionTable) -> Result<AccessAnswer> {
    let module: Module = args.module.parse()?;
    // Unknown roles are answered (with no access), not rejected.
    let (access, actions) = match Role::parse(&args.role) {
        Some(role) => (
            table.module_access(role, module),
            table.allowed_actions(role, module),
        ),
        None => (AccessLevel::None, Vec::new()),
    };
    Ok(AccessAnswer {
        role: args.role,
        module,
        access,
        actions,
    })
}

fn resolve_can(args: CanArgs, table: &PermissionTable) -> Result<CanAnswer> {
    let module: Module = args.module.parse()?;
    let action: Action = args.action.parse()?;
    let allowed = Role::parse(&args.role)
        .map(|role| table.can_perform(role, module, action))
        .unwrap_or(false);
    Ok(CanAnswer {
        role: args.role,
        module,
        action,
        allowed,
    })
}

pub fn access(args: AccessArgs, table: &PermissionTable, format: OutputFormat) -> Result<()> {
    let answer = resolve_access(args, table)?;

    match format {
        OutputFormat::Table => {
            output::print_detail("role", &answer.role);
            output::print_detail("module", answer.module.label());
            output::print_detail("access", &output::access_cell(answer.access.id()));
            let actions: Vec<String> = answer.actions.iter().map(|a| a.to_string()).collect();
            output::print_detail("actions", &actions.join(", "));
        }
        _ => output::print_item(&answer, format)?,
    }
    Ok(())
}

pub fn can(args: CanArgs, table: &PermissionTable, format: OutputFormat) -> Result<()> {
    let answer = resolve_can(args, table)?;

    match format {
        OutputFormat::Table => {
            println!(
                "{} {} {} in {}",
                output::verdict(answer.allowed),
                answer.role,
                answer.action,
                answer.module
            );
        }
        _ => output::print_item(&answer, format)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn can_args(role: &str, module: &str, action: &str) -> CanArgs {
        CanArgs {
            role: role.to_string(),
            module: module.to_string(),
            action: action.to_string(),
        }
    }

    fn access_args(role: &str, module: &str) -> AccessArgs {
        AccessArgs {
            role: role.to_string(),
            module: module.to_string(),
        }
    }

    #[test]
    fn test_can_answers_from_table() {
        let table = PermissionTable::defaults();
        assert!(resolve_can(can_args("contador", "facturacion", "approve"), &table).unwrap().allowed);
        assert!(!resolve_can(can_args("recepcionista", "facturacion", "delete"), &table).unwrap().allowed);
    }

    #[test]
    fn test_malformed_roles_get_nothing() {
        let table = PermissionTable::defaults();
        assert!(!resolve_can(can_args("socio ", "facturacion", "approve"), &table).unwrap().allowed);

        let answer = resolve_access(access_args(" SUPER-ADMIN", "usuarios"), &table).unwrap();
        assert_eq!(answer.access, AccessLevel::None);
        assert!(answer.actions.is_empty());
    }

    #[test]
    fn test_access_lists_allowed_actions() {
        let table = PermissionTable::defaults();
        let answer = resolve_access(access_args("abogado_junior", "expedientes"), &table).unwrap();
        assert_eq!(answer.access, AccessLevel::Full);
        assert_eq!(answer.actions, vec![Action::Create, Action::Edit, Action::Export]);
    }

    #[test]
    fn test_unknown_module_or_action_is_an_error() {
        let table = PermissionTable::defaults();
        assert!(resolve_access(access_args("socio", "nomina"), &table).is_err());
        assert!(resolve_can(can_args("socio", "gastos", "refund"), &table).is_err());
    }
}
