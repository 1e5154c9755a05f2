//! The permission table and its resolver.
//!
//! The table answers two questions for the current role:
//! "at what level can this role use module M?" and
//! "may this role perform action A in module M?".
//!
//! Lookups are total. Anything the table does not mention resolves to
//! [`AccessLevel::None`] / `false`. Grants are normalized when the table is
//! built so that deny wins: an action survives only if the module supports
//! it and the role's module access meets the action's required level.

use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::path::PathBuf;
use std::sync::OnceLock;
use thiserror::Error;
use tracing::{debug, warn};

use super::models::{AccessLevel, Action, Module, ParseError, Role};
use super::roles::default_grant;

// ═══════════════════════════════════════════════════════════════════════════════
// Errors
// ═══════════════════════════════════════════════════════════════════════════════

/// Errors raised while building, loading or installing a permission table.
///
/// Queries never fail; these only surface at process start.
#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("Unknown role in policy: {0}")]
    UnknownRole(String),

    #[error("Unknown module in policy: {0}")]
    UnknownModule(String),

    #[error("Unknown action in policy: {0}")]
    UnknownAction(String),

    #[error("Unknown access level in policy: {0}")]
    UnknownAccessLevel(String),

    #[error("The super_admin role cannot be overridden")]
    SuperAdminOverride,

    #[error("Failed to read policy file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse policy: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize policy: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Policy has {} inconsistent grant(s)", .0.len())]
    Inconsistent(Vec<Inconsistency>),

    #[error("A permission table is already installed")]
    AlreadyInstalled,
}

impl From<ParseError> for PolicyError {
    fn from(err: ParseError) -> Self {
        match err {
            ParseError::UnknownRole(s) => Self::UnknownRole(s),
            ParseError::UnknownModule(s) => Self::UnknownModule(s),
            ParseError::UnknownAction(s) | ParseError::InvalidPermission(s) => {
                Self::UnknownAction(s)
            }
            ParseError::UnknownAccessLevel(s) => Self::UnknownAccessLevel(s),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Inconsistencies
// ═══════════════════════════════════════════════════════════════════════════════

/// Why a grant was dropped during normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InconsistencyReason {
    /// The module has no such action.
    UnsupportedAction,
    /// The role's module access is below what the action needs.
    InsufficientAccess {
        granted: AccessLevel,
        required: AccessLevel,
    },
}

/// An action grant that conflicted with the module access and was denied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Inconsistency {
    pub role: Role,
    pub module: Module,
    pub action: Action,
    pub reason: InconsistencyReason,
}

impl fmt::Display for Inconsistency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.reason {
            InconsistencyReason::UnsupportedAction => write!(
                f,
                "{} grants {}:{} but the module has no such action",
                self.role, self.module, self.action
            ),
            InconsistencyReason::InsufficientAccess { granted, required } => write!(
                f,
                "{} grants {}:{} with `{}` access; the action needs `{}`",
                self.role, self.module, self.action, granted, required
            ),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Grants and descriptions
// ═══════════════════════════════════════════════════════════════════════════════

/// Access level plus granted actions for one (role, module) pair.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ModuleGrant {
    pub access: AccessLevel,
    pub actions: BTreeSet<Action>,
}

/// Display text for a role. Overridable by policy files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleProfile {
    pub title: String,
    pub description: String,
}

impl RoleProfile {
    fn builtin(role: Role) -> Self {
        Self {
            title: role.title().to_string(),
            description: role.description().to_string(),
        }
    }
}

/// Human-readable explanation of a role, rendered on access-denied screens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleDescription {
    /// `None` when the role value was not recognised.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    pub title: String,
    pub description: String,
    pub available_actions: Vec<String>,
}

impl RoleDescription {
    fn unknown() -> Self {
        Self {
            role: None,
            title: "Rol desconocido".to_string(),
            description: "El rol de la sesión no es válido; no se concede acceso a ningún módulo."
                .to_string(),
            available_actions: Vec::new(),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Permission Table
// ═══════════════════════════════════════════════════════════════════════════════

/// The complete, normalized Role → Module → grant mapping.
///
/// Built once and then only read; share it behind a `&'static` (see
/// [`install`]/[`global`]) or an `Arc`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionTable {
    grants: HashMap<(Role, Module), ModuleGrant>,
    profiles: HashMap<Role, RoleProfile>,
    inconsistencies: Vec<Inconsistency>,
}

impl PermissionTable {
    /// The compiled-in table.
    pub fn defaults() -> Self {
        PermissionTableBuilder::from_defaults().build()
    }

    /// Start from the compiled-in table and apply changes.
    pub fn builder() -> PermissionTableBuilder {
        PermissionTableBuilder::from_defaults()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Typed queries
    // ─────────────────────────────────────────────────────────────────────────

    /// Access level of `role` for `module`; `None` when not enumerated.
    pub fn module_access(&self, role: Role, module: Module) -> AccessLevel {
        self.grants
            .get(&(role, module))
            .map(|g| g.access)
            .unwrap_or_default()
    }

    /// Whether `role` may perform `action` in `module`.
    pub fn can_perform(&self, role: Role, module: Module, action: Action) -> bool {
        let Some(grant) = self.grants.get(&(role, module)) else {
            return false;
        };
        // Checked again here so a table can never answer past its module level.
        grant.access.allows(action.required_level())
            && module.supports(action)
            && grant.actions.contains(&action)
    }

    /// Full grant for one cell (empty grant when not enumerated).
    pub fn grant(&self, role: Role, module: Module) -> ModuleGrant {
        self.grants.get(&(role, module)).cloned().unwrap_or_default()
    }

    /// Actions `role` may perform in `module`, in declaration order.
    pub fn allowed_actions(&self, role: Role, module: Module) -> Vec<Action> {
        Action::ALL
            .into_iter()
            .filter(|a| self.can_perform(role, module, *a))
            .collect()
    }

    /// Modules `role` can see at all, with their level.
    pub fn accessible_modules(&self, role: Role) -> Vec<(Module, AccessLevel)> {
        Module::ALL
            .into_iter()
            .map(|m| (m, self.module_access(role, m)))
            .filter(|(_, level)| !level.is_none())
            .collect()
    }

    pub fn profile(&self, role: Role) -> RoleProfile {
        self.profiles
            .get(&role)
            .cloned()
            .unwrap_or_else(|| RoleProfile::builtin(role))
    }

    /// Title, description and a per-module summary of what `role` can do.
    ///
    /// The summary is derived from the table, so it always agrees with
    /// [`module_access`](Self::module_access) and
    /// [`can_perform`](Self::can_perform).
    pub fn describe_role(&self, role: Role) -> RoleDescription {
        let profile = self.profile(role);
        let available_actions = self
            .accessible_modules(role)
            .into_iter()
            .map(|(module, level)| {
                let verb = match level {
                    AccessLevel::Full => "gestionar",
                    _ => "consultar",
                };
                let mut parts = vec![verb];
                parts.extend(self.allowed_actions(role, module).iter().map(|a| a.label()));
                format!("{}: {}", module.label(), parts.join(", "))
            })
            .collect();

        RoleDescription {
            role: Some(role),
            title: profile.title,
            description: profile.description,
            available_actions,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // String-keyed queries (values straight from the session layer)
    // ─────────────────────────────────────────────────────────────────────────

    /// Like [`module_access`](Self::module_access); unknown names give `None`.
    pub fn module_access_raw(&self, role: &str, module: &str) -> AccessLevel {
        match (Role::parse(role), Module::parse(module)) {
            (Some(role), Some(module)) => self.module_access(role, module),
            _ => {
                debug!(role, module, "Unrecognised role or module; denying access");
                AccessLevel::None
            }
        }
    }

    /// Like [`can_perform`](Self::can_perform); unknown names give `false`.
    pub fn can_perform_raw(&self, role: &str, module: &str, action: &str) -> bool {
        match (Role::parse(role), Module::parse(module), Action::parse(action)) {
            (Some(role), Some(module), Some(action)) => self.can_perform(role, module, action),
            _ => {
                debug!(role, module, action, "Unrecognised permission query; denying");
                false
            }
        }
    }

    /// Like [`describe_role`](Self::describe_role); unknown roles get a
    /// description with no available actions.
    pub fn describe_role_raw(&self, role: &str) -> RoleDescription {
        match Role::parse(role) {
            Some(role) => self.describe_role(role),
            None => RoleDescription::unknown(),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Validation
    // ─────────────────────────────────────────────────────────────────────────

    /// Grants dropped while building this table.
    pub fn inconsistencies(&self) -> &[Inconsistency] {
        &self.inconsistencies
    }

    /// `Ok` if no grant had to be dropped.
    pub fn validate(&self) -> Result<(), PolicyError> {
        if self.inconsistencies.is_empty() {
            Ok(())
        } else {
            Err(PolicyError::Inconsistent(self.inconsistencies.clone()))
        }
    }
}

impl Default for PermissionTable {
    fn default() -> Self {
        Self::defaults()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Builder
// ═══════════════════════════════════════════════════════════════════════════════

/// Mutable staging area for a [`PermissionTable`].
#[derive(Debug, Clone)]
pub struct PermissionTableBuilder {
    grants: HashMap<(Role, Module), ModuleGrant>,
    profiles: HashMap<Role, RoleProfile>,
}

impl PermissionTableBuilder {
    /// Seed with the compiled-in grants.
    pub fn from_defaults() -> Self {
        let mut grants = HashMap::with_capacity(Role::ALL.len() * Module::ALL.len());
        for role in Role::ALL {
            for module in Module::ALL {
                let grant = default_grant(role, module);
                grants.insert(
                    (role, module),
                    ModuleGrant {
                        access: grant.access,
                        actions: grant.actions_for(module).into_iter().collect(),
                    },
                );
            }
        }
        Self {
            grants,
            profiles: HashMap::new(),
        }
    }

    /// Replace one cell. `super_admin` is fixed and cannot be changed.
    pub fn grant(
        mut self,
        role: Role,
        module: Module,
        access: AccessLevel,
        actions: impl IntoIterator<Item = Action>,
    ) -> Result<Self, PolicyError> {
        if role == Role::SuperAdmin {
            return Err(PolicyError::SuperAdminOverride);
        }
        self.grants.insert(
            (role, module),
            ModuleGrant {
                access,
                actions: actions.into_iter().collect(),
            },
        );
        Ok(self)
    }

    /// Override the title and/or description of a role.
    pub fn profile(
        mut self,
        role: Role,
        title: Option<String>,
        description: Option<String>,
    ) -> Result<Self, PolicyError> {
        if role == Role::SuperAdmin {
            return Err(PolicyError::SuperAdminOverride);
        }
        let mut profile = self
            .profiles
            .remove(&role)
            .unwrap_or_else(|| RoleProfile::builtin(role));
        if let Some(title) = title {
            profile.title = title;
        }
        if let Some(description) = description {
            profile.description = description;
        }
        self.profiles.insert(role, profile);
        Ok(self)
    }

    /// Normalize and freeze. Conflicting grants are dropped (deny wins) and
    /// recorded in [`PermissionTable::inconsistencies`].
    pub fn build(self) -> PermissionTable {
        let mut inconsistencies = Vec::new();
        let mut grants = self.grants;

        for (&(role, module), grant) in grants.iter_mut() {
            let access = grant.access;
            grant.actions.retain(|&action| {
                let reason = if !module.supports(action) {
                    InconsistencyReason::UnsupportedAction
                } else if !access.allows(action.required_level()) {
                    InconsistencyReason::InsufficientAccess {
                        granted: access,
                        required: action.required_level(),
                    }
                } else {
                    return true;
                };
                let inconsistency = Inconsistency {
                    role,
                    module,
                    action,
                    reason,
                };
                warn!(%inconsistency, "Dropping inconsistent grant");
                inconsistencies.push(inconsistency);
                false
            });
        }

        inconsistencies.sort_by_key(|i| (i.role, i.module, i.action));

        PermissionTable {
            grants,
            profiles: self.profiles,
            inconsistencies,
        }
    }

    /// Like [`build`](Self::build) but fails if any grant had to be dropped.
    pub fn build_strict(self) -> Result<PermissionTable, PolicyError> {
        let table = self.build();
        table.validate()?;
        Ok(table)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Process-wide table
// ═══════════════════════════════════════════════════════════════════════════════

static INSTALLED: OnceLock<PermissionTable> = OnceLock::new();
static DEFAULTS: OnceLock<PermissionTable> = OnceLock::new();

/// Install the table every free-function query uses. Call once at start,
/// before the first query.
pub fn install(table: PermissionTable) -> Result<(), PolicyError> {
    INSTALLED
        .set(table)
        .map_err(|_| PolicyError::AlreadyInstalled)?;
    debug!("Permission table installed");
    Ok(())
}

/// The installed table, or the compiled-in defaults when none was installed.
pub fn global() -> &'static PermissionTable {
    INSTALLED
        .get()
        .unwrap_or_else(|| DEFAULTS.get_or_init(PermissionTable::defaults))
}

/// Access level of `role` for `module` in the process-wide table.
pub fn get_module_access(role: Role, module: Module) -> AccessLevel {
    global().module_access(role, module)
}

/// Whether `role` may perform `action` in `module` in the process-wide table.
pub fn can_perform(role: Role, module: Module, action: Action) -> bool {
    global().can_perform(role, module, action)
}

/// Description of `role` from the process-wide table.
pub fn describe_role(role: Role) -> RoleDescription {
    global().describe_role(role)
}

// ═══════════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════════
