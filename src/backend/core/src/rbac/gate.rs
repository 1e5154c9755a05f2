//! Page-level gating on top of the permission table.
//!
//! Pages ask once per render for a [`ModuleCapabilities`] snapshot instead
//! of keeping their own permission objects, and use [`require_module`] /
//! [`require_action`] to get an [`AccessDenied`] payload for the
//! access-denied screen.

use metrics::counter;
use serde::Serialize;
use std::fmt;
use tracing::debug;

use super::models::{AccessLevel, Action, Module, Role};
use super::policy::{PermissionTable, RoleDescription};

/// Everything one page needs to decide what to render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleCapabilities {
    pub module: Module,
    pub access: AccessLevel,
    pub can_view: bool,
    pub can_create: bool,
    pub can_edit: bool,
    pub can_delete: bool,
    pub can_approve: bool,
    pub can_pay: bool,
    pub can_cancel: bool,
    pub can_export: bool,
    pub can_send_reminders: bool,
}

impl ModuleCapabilities {
    pub fn resolve(table: &PermissionTable, role: Role, module: Module) -> Self {
        let can = |action| table.can_perform(role, module, action);
        let access = table.module_access(role, module);
        Self {
            module,
            access,
            can_view: !access.is_none(),
            can_create: can(Action::Create),
            can_edit: can(Action::Edit),
            can_delete: can(Action::Delete),
            can_approve: can(Action::Approve),
            can_pay: can(Action::Pay),
            can_cancel: can(Action::Cancel),
            can_export: can(Action::Export),
            can_send_reminders: can(Action::SendReminders),
        }
    }

    /// Capabilities for a session without a recognised role: nothing.
    pub fn denied(module: Module) -> Self {
        Self {
            module,
            access: AccessLevel::None,
            can_view: false,
            can_create: false,
            can_edit: false,
            can_delete: false,
            can_approve: false,
            can_pay: false,
            can_cancel: false,
            can_export: false,
            can_send_reminders: false,
        }
    }

    /// Resolve for an optional session role.
    pub fn for_session(table: &PermissionTable, role: Option<Role>, module: Module) -> Self {
        match role {
            Some(role) => Self::resolve(table, role, module),
            None => Self::denied(module),
        }
    }

    pub fn allows(&self, action: Action) -> bool {
        match action {
            Action::Create => self.can_create,
            Action::Edit => self.can_edit,
            Action::Delete => self.can_delete,
            Action::Approve => self.can_approve,
            Action::Pay => self.can_pay,
            Action::Cancel => self.can_cancel,
            Action::Export => self.can_export,
            Action::SendReminders => self.can_send_reminders,
        }
    }
}

/// A role was refused a module or an action within it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessDenied {
    pub role: Option<Role>,
    pub module: Module,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<Action>,
    pub access: AccessLevel,
    /// What the role *can* do, for the access-denied screen.
    pub role_description: RoleDescription,
}

fn role_label(role: &Option<Role>) -> &'static str {
    role.as_ref().map_or("unknown role", |r| r.id())
}

impl fmt::Display for AccessDenied {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let role = role_label(&self.role);
        match self.action {
            Some(action) => write!(f, "{} may not {} in {}", role, action, self.module),
            None => write!(f, "{} may not access {}", role, self.module),
        }
    }
}

impl std::error::Error for AccessDenied {}

impl AccessDenied {
    fn new(
        table: &PermissionTable,
        role: Option<Role>,
        module: Module,
        action: Option<Action>,
    ) -> Self {
        let access = role.map_or(AccessLevel::None, |r| table.module_access(r, module));
        let role_description = match role {
            Some(r) => table.describe_role(r),
            None => table.describe_role_raw(""),
        };
        counter!("bufete_access_denied_total", "module" => module.id()).increment(1);
        debug!(
            role = role_label(&role),
            module = %module,
            action = ?action,
            "Access denied"
        );
        Self {
            role,
            module,
            action,
            access,
            role_description,
        }
    }
}

/// `Ok(level)` if `role` can see `module` at all.
pub fn require_module(
    table: &PermissionTable,
    role: Option<Role>,
    module: Module,
) -> Result<AccessLevel, AccessDenied> {
    match role.map(|r| table.module_access(r, module)) {
        Some(level) if !level.is_none() => Ok(level),
        _ => Err(AccessDenied::new(table, role, module, None)),
    }
}

/// `Ok(())` if `role` can perform `action` in `module`.
pub fn require_action(
    table: &PermissionTable,
    role: Option<Role>,
    module: Module,
    action: Action,
) -> Result<(), AccessDenied> {
    match role {
        Some(r) if table.can_perform(r, module, action) => Ok(()),
        _ => Err(AccessDenied::new(table, role, module, Some(action))),
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════════
