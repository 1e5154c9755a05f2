//! # Bufete Core
//!
//! Canonical role and permission resolution for the Bufete law-firm ERP.
//!
//! ## Architecture
//!
//! - **RBAC**: the static role → module → access/action table, its pure
//!   queries, policy-file overlays, page gates, session role and a tower guard
//! - **Config**: file + environment configuration for logging and policy
//! - **Telemetry**: structured logging via `tracing`
//! - **Error**: stable error codes and JSON error bodies

pub mod config;
pub mod error;
pub mod rbac;
pub mod telemetry;

pub use error::{BufeteError, ErrorCode, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{Config, PermissionsConfig};
    pub use crate::error::{BufeteError, ErrorCode, Result};
    pub use crate::rbac::{
        can_perform, describe_role, get_module_access, require_action, require_module,
        AccessDenied, AccessLevel, Action, Module, ModuleCapabilities, PermissionTable,
        Permission, PolicyError, RbacContext, RequirePermissionLayer, Role, RoleDescription,
        Session, SessionSlot,
    };
    pub use crate::telemetry::{init_logging, LogFormat, LoggingConfig};
}
