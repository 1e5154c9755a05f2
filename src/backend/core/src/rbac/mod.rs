//! Role-based access control for the ERP pages.
//!
//! This module provides:
//! - **Models**: the closed sets of roles, modules, actions and access levels
//! - **Roles**: the compiled-in permission table and role descriptions
//! - **Policy**: the normalized [`PermissionTable`] and its pure queries
//! - **Loader**: TOML policy files layered over the defaults
//! - **Gate**: per-page capability snapshots and access-denied payloads
//! - **Session**: the role value handed over by the authentication layer
//! - **Middleware**: a tower layer guarding requests by module/action
//!
//! # Usage
//!
//! ```rust
//! use bufete_core::rbac::{
//!     can_perform, get_module_access, AccessLevel, Action, Module, Role,
//! };
//!
//! assert_eq!(get_module_access(Role::Contador, Module::Facturacion), AccessLevel::Full);
//! assert!(!can_perform(Role::Recepcionista, Module::Facturacion, Action::Delete));
//! ```

pub mod gate;
pub mod loader;
pub mod middleware;
pub mod models;
pub mod policy;
pub mod roles;
pub mod session;

pub use gate::{require_action, require_module, AccessDenied, ModuleCapabilities};
pub use loader::{ModulePolicy, PolicyFile, RolePolicy};
pub use middleware::{RbacContext, RequirePermissionLayer, RequirePermissionService};
pub use models::{AccessLevel, Action, Module, ParseError, Permission, Role};
pub use policy::{
    can_perform, describe_role, get_module_access, global, install, Inconsistency,
    InconsistencyReason, ModuleGrant, PermissionTable, PermissionTableBuilder, PolicyError,
    RoleDescription, RoleProfile,
};
pub use session::{Session, SessionSlot};
