//! Whole-table properties of the permission resolver.
//!
//! These enumerate every (role, module, action) combination, so a change to
//! the built-in table that breaks an invariant fails here.

use bufete_core::rbac::{
    can_perform, describe_role, get_module_access, AccessLevel, Action, Module,
    ModuleCapabilities, PermissionTable, Role,
};

// ============================================================================
// Test Utilities
// ============================================================================

fn every_cell() -> impl Iterator<Item = (Role, Module)> {
    Role::ALL
        .into_iter()
        .flat_map(|role| Module::ALL.into_iter().map(move |module| (role, module)))
}

const UNKNOWN_ROLES: &[&str] = &["", "admin", "becario", "socio ", "SOCIO_", "null", "🦀"];

// ============================================================================
// Totality and deny-wins
// ============================================================================

#[test]
fn test_every_cell_has_a_level() {
    for (role, module) in every_cell() {
        let level = get_module_access(role, module);
        assert!(
            matches!(level, AccessLevel::None | AccessLevel::View | AccessLevel::Full),
            "{role}/{module}"
        );
    }
}

#[test]
fn test_none_means_no_action() {
    for (role, module) in every_cell() {
        if get_module_access(role, module) == AccessLevel::None {
            for action in Action::ALL {
                assert!(
                    !can_perform(role, module, action),
                    "{role} has no access to {module} but may {action}"
                );
            }
        }
    }
}

#[test]
fn test_view_means_no_mutation() {
    for (role, module) in every_cell() {
        if get_module_access(role, module) == AccessLevel::View {
            for action in Action::ALL.into_iter().filter(|a| *a != Action::Export) {
                assert!(
                    !can_perform(role, module, action),
                    "{role} only views {module} but may {action}"
                );
            }
        }
    }
}

#[test]
fn test_super_admin_is_maximal() {
    for module in Module::ALL {
        assert_eq!(get_module_access(Role::SuperAdmin, module), AccessLevel::Full);
    }
    for (role, module) in every_cell() {
        for action in Action::ALL {
            if can_perform(role, module, action) {
                assert!(
                    can_perform(Role::SuperAdmin, module, action),
                    "{role} may {action} in {module} but super_admin may not"
                );
            }
        }
    }
}

#[test]
fn test_recepcionista_cannot_delete_invoices() {
    assert_eq!(
        get_module_access(Role::Recepcionista, Module::Facturacion),
        AccessLevel::None
    );
    assert!(!can_perform(Role::Recepcionista, Module::Facturacion, Action::Delete));
}

// ============================================================================
// Purity
// ============================================================================

#[test]
fn test_repeated_queries_agree() {
    let first: Vec<_> = every_cell()
        .map(|(role, module)| {
            let actions: Vec<bool> = Action::ALL
                .into_iter()
                .map(|a| can_perform(role, module, a))
                .collect();
            (get_module_access(role, module), actions)
        })
        .collect();

    for _ in 0..5 {
        let again: Vec<_> = every_cell()
            .map(|(role, module)| {
                let actions: Vec<bool> = Action::ALL
                    .into_iter()
                    .map(|a| can_perform(role, module, a))
                    .collect();
                (get_module_access(role, module), actions)
            })
            .collect();
        assert_eq!(first, again);
    }
}

#[test]
fn test_concurrent_queries_agree() {
    let expected = describe_role(Role::Contador);
    let handles: Vec<_> = (0..8)
        .map(|_| std::thread::spawn(|| describe_role(Role::Contador)))
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), expected);
    }
}

// ============================================================================
// Malformed input
// ============================================================================

#[test]
fn test_unknown_roles_get_safe_defaults() {
    let table = PermissionTable::defaults();
    for raw in UNKNOWN_ROLES {
        for module in Module::ALL {
            assert_eq!(table.module_access_raw(raw, module.id()), AccessLevel::None, "{raw:?}");
            for action in Action::ALL {
                assert!(!table.can_perform_raw(raw, module.id(), action.id()), "{raw:?}");
            }
        }
        let description = table.describe_role_raw(raw);
        assert!(description.role.is_none());
        assert!(description.available_actions.is_empty());
    }
}

#[test]
fn test_raw_queries_match_typed_queries() {
    let table = PermissionTable::defaults();
    for (role, module) in every_cell() {
        assert_eq!(
            table.module_access_raw(role.id(), module.id()),
            table.module_access(role, module)
        );
        for action in Action::ALL {
            assert_eq!(
                table.can_perform_raw(role.id(), module.id(), action.id()),
                table.can_perform(role, module, action)
            );
        }
    }
}

// ============================================================================
// Descriptions and capabilities
// ============================================================================

#[test]
fn test_description_lists_exactly_visible_modules() {
    let table = PermissionTable::defaults();
    for role in Role::ALL {
        let description = table.describe_role(role);
        let visible = Module::ALL
            .into_iter()
            .filter(|m| !table.module_access(role, *m).is_none())
            .count();
        assert_eq!(description.available_actions.len(), visible, "{role}");
        assert!(!description.title.is_empty());
        assert!(!description.description.is_empty());
    }
}

#[test]
fn test_capabilities_serialize_for_pages() {
    let table = PermissionTable::defaults();
    let caps = ModuleCapabilities::resolve(&table, Role::Contador, Module::Gastos);
    let json = serde_json::to_value(&caps).unwrap();

    assert_eq!(json["module"], "gastos");
    assert_eq!(json["access"], "full");
    assert_eq!(json["can_pay"], true);
    assert_eq!(json["can_approve"], true);
    assert_eq!(json["can_send_reminders"], false);
}
