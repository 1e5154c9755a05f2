//! Loading, validating and installing policy files.

use std::io::Write;

use bufete_core::config::{Config, PermissionsConfig};
use bufete_core::error::ErrorCode;
use bufete_core::rbac::{
    self, AccessLevel, Action, InconsistencyReason, Module, PermissionTable, PolicyError, Role,
};

fn policy_file(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .prefix("bufete-policy")
        .suffix(".toml")
        .tempfile()
        .unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

/// A policy that grants actions under `none` access, the way several pages
/// used to define their own permission objects.
const DRIFTED: &str = r#"
[roles.recepcionista.modules.facturacion]
access = "none"
actions = ["delete", "send_reminders"]

[roles.paralegal.modules.gastos]
access = "view"
actions = ["approve", "export"]
"#;

#[test]
fn test_drifted_policy_rejected_in_strict_mode() {
    let file = policy_file(DRIFTED);
    let err = PermissionTable::from_policy_file(file.path(), true).unwrap_err();

    let list = match err {
        PolicyError::Inconsistent(list) => list,
        other => panic!("expected inconsistency, got {other}"),
    };
    assert_eq!(list.len(), 3);
    assert!(list.iter().all(|i| matches!(
        i.reason,
        InconsistencyReason::InsufficientAccess { .. }
    )));
}

#[test]
fn test_drifted_policy_normalized_in_lenient_mode() {
    let file = policy_file(DRIFTED);
    let table = PermissionTable::from_policy_file(file.path(), false).unwrap();

    for role in Role::ALL {
        for module in Module::ALL {
            if table.module_access(role, module) == AccessLevel::None {
                for action in Action::ALL {
                    assert!(!table.can_perform(role, module, action));
                }
            }
        }
    }
    assert!(table.can_perform(Role::Paralegal, Module::Gastos, Action::Export));
    assert!(!table.can_perform(Role::Paralegal, Module::Gastos, Action::Approve));
}

#[test]
fn test_exported_defaults_load_strictly() {
    let exported = PermissionTable::defaults().to_policy_toml().unwrap();
    let file = policy_file(&exported);
    let table = PermissionTable::from_policy_file(file.path(), true).unwrap();

    for role in Role::ALL {
        for module in Module::ALL {
            assert_eq!(
                table.grant(role, module),
                PermissionTable::defaults().grant(role, module)
            );
        }
    }
}

#[test]
fn test_config_surfaces_policy_errors() {
    let file = policy_file("[roles.super_admin]\ntitle = \"Root\"\n");
    let config = Config {
        permissions: PermissionsConfig {
            policy_file: Some(file.path().to_path_buf()),
            strict: true,
        },
        ..Config::default()
    };
    let err = config.permission_table().unwrap_err();
    assert_eq!(err.code(), ErrorCode::ProtectedRole);
}

#[test]
fn test_install_once() {
    let file = policy_file(
        "[roles.recepcionista.modules.facturacion]\naccess = \"view\"\nactions = [\"export\"]\n",
    );
    let table = PermissionTable::from_policy_file(file.path(), true).unwrap();
    rbac::install(table).unwrap();

    assert_eq!(
        rbac::get_module_access(Role::Recepcionista, Module::Facturacion),
        AccessLevel::View
    );
    assert!(rbac::can_perform(Role::Recepcionista, Module::Facturacion, Action::Export));
    assert!(!rbac::can_perform(Role::Recepcionista, Module::Facturacion, Action::Delete));

    assert!(matches!(
        rbac::install(PermissionTable::defaults()),
        Err(PolicyError::AlreadyInstalled)
    ));
}
