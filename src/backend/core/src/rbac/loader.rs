//! TOML policy files layered over the compiled-in table.
//!
//! ```toml
//! [roles.recepcionista]
//! title = "Recepción"
//!
//! [roles.recepcionista.modules.facturacion]
//! access = "view"
//! actions = ["export"]
//! ```
//!
//! Only the cells a file mentions change; everything else keeps its default.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

use super::models::{AccessLevel, Action, Module, Role};
use super::policy::{PermissionTable, PermissionTableBuilder, PolicyError};

/// On-disk policy document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyFile {
    #[serde(default)]
    pub roles: BTreeMap<String, RolePolicy>,
}

/// Overrides for one role.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RolePolicy {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub modules: BTreeMap<String, ModulePolicy>,
}

/// Replacement grant for one module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModulePolicy {
    pub access: String,

    #[serde(default)]
    pub actions: Vec<String>,
}

impl PolicyFile {
    pub fn parse(source: &str) -> Result<Self, PolicyError> {
        Ok(toml::from_str(source)?)
    }

    /// Apply every override onto `builder`. Unknown names are errors.
    pub fn apply(
        &self,
        mut builder: PermissionTableBuilder,
    ) -> Result<PermissionTableBuilder, PolicyError> {
        for (role_name, role_policy) in &self.roles {
            let role: Role = role_name.parse()?;

            if role_policy.title.is_some() || role_policy.description.is_some() {
                builder = builder.profile(
                    role,
                    role_policy.title.clone(),
                    role_policy.description.clone(),
                )?;
            }

            for (module_name, module_policy) in &role_policy.modules {
                let module: Module = module_name.parse()?;
                let access: AccessLevel = module_policy.access.parse()?;
                let actions = module_policy
                    .actions
                    .iter()
                    .map(|a| a.parse::<Action>())
                    .collect::<Result<Vec<_>, _>>()?;
                builder = builder.grant(role, module, access, actions)?;
            }
        }
        Ok(builder)
    }
}

impl PermissionTable {
    /// Defaults overlaid with a policy document. With `strict`, any grant
    /// that normalization would drop fails the load.
    pub fn from_policy_str(source: &str, strict: bool) -> Result<Self, PolicyError> {
        let file = PolicyFile::parse(source)?;
        let builder = file.apply(PermissionTable::builder())?;
        if strict {
            builder.build_strict()
        } else {
            Ok(builder.build())
        }
    }

    /// Read and apply a policy file from disk.
    pub fn from_policy_file(path: impl AsRef<Path>, strict: bool) -> Result<Self, PolicyError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| PolicyError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let table = Self::from_policy_str(&source, strict)?;
        info!(
            path = %path.display(),
            dropped = table.inconsistencies().len(),
            "Loaded permission policy"
        );
        Ok(table)
    }

    /// The effective table as a policy document.
    ///
    /// `super_admin` is omitted: it is fixed and a file naming it would not load.
    pub fn to_policy_file(&self) -> PolicyFile {
        let roles = Role::ALL
            .into_iter()
            .filter(|r| *r != Role::SuperAdmin)
            .map(|role| {
                let profile = self.profile(role);
                let modules = Module::ALL
                    .into_iter()
                    .map(|module| {
                        let policy = ModulePolicy {
                            access: self.module_access(role, module).to_string(),
                            actions: self
                                .allowed_actions(role, module)
                                .iter()
                                .map(|a| a.to_string())
                                .collect(),
                        };
                        (module.to_string(), policy)
                    })
                    .collect();
                let policy = RolePolicy {
                    title: Some(profile.title),
                    description: Some(profile.description),
                    modules,
                };
                (role.to_string(), policy)
            })
            .collect();
        PolicyFile { roles }
    }

    pub fn to_policy_toml(&self) -> Result<String, PolicyError> {
        Ok(toml::to_string_pretty(&self.to_policy_file())?)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    const OVERRIDE: &str = r#"
        [roles.recepcionista]
        title = "Recepción y atención"

        [roles.recepcionista.modules.facturacion]
        access = "view"
        actions = ["export"]

        [roles.abogado_junior.modules.contabilidad]
        access = "view"
    "#;

    #[test]
    fn test_overlay_changes_only_named_cells() {
        let table = PermissionTable::from_policy_str(OVERRIDE, true).unwrap();
        let defaults = PermissionTable::defaults();

        assert_eq!(
            table.module_access(Role::Recepcionista, Module::Facturacion),
            AccessLevel::View
        );
        assert!(table.can_perform(Role::Recepcionista, Module::Facturacion, Action::Export));
        assert!(!table.can_perform(Role::Recepcionista, Module::Facturacion, Action::Delete));
        assert_eq!(
            table.module_access(Role::AbogadoJunior, Module::Contabilidad),
            AccessLevel::View
        );
        assert_eq!(table.describe_role(Role::Recepcionista).title, "Recepción y atención");

        assert_eq!(
            table.grant(Role::Contador, Module::Gastos),
            defaults.grant(Role::Contador, Module::Gastos)
        );
    }

    #[test]
    fn test_empty_file_is_defaults() {
        let table = PermissionTable::from_policy_str("", true).unwrap();
        assert_eq!(table, PermissionTable::defaults());
    }

    #[test]
    fn test_unknown_names_are_errors() {
        let err = PermissionTable::from_policy_str("[roles.becario]\n", true).unwrap_err();
        assert!(matches!(err, PolicyError::UnknownRole(ref r) if r == "becario"));

        let err = PermissionTable::from_policy_str(
            "[roles.socio.modules.nomina]\naccess = \"full\"\n",
            true,
        )
        .unwrap_err();
        assert!(matches!(err, PolicyError::UnknownModule(_)));

        let err = PermissionTable::from_policy_str(
            "[roles.socio.modules.gastos]\naccess = \"full\"\nactions = [\"refund\"]\n",
            true,
        )
        .unwrap_err();
        assert!(matches!(err, PolicyError::UnknownAction(_)));

        let err = PermissionTable::from_policy_str(
            "[roles.socio.modules.gastos]\naccess = \"admin\"\n",
            true,
        )
        .unwrap_err();
        assert!(matches!(err, PolicyError::UnknownAccessLevel(_)));
    }

    #[test]
    fn test_role_keys_must_be_canonical() {
        let src = "[roles.socio.modules.usuarios]\naccess = \"none\"\n\n\
                   [roles.Socio.modules.usuarios]\naccess = \"full\"\nactions = [\"delete\"]\n";
        let err = PermissionTable::from_policy_str(src, false).unwrap_err();
        assert!(matches!(err, PolicyError::UnknownRole(ref r) if r == "Socio"));
    }

    #[test]
    fn test_super_admin_section_rejected() {
        let err = PermissionTable::from_policy_str(
            "[roles.super_admin.modules.usuarios]\naccess = \"view\"\n",
            false,
        )
        .unwrap_err();
        assert!(matches!(err, PolicyError::SuperAdminOverride));
    }

    #[test]
    fn test_strict_and_lenient_modes() {
        let source = r#"
            [roles.secretario.modules.facturacion]
            access = "none"
            actions = ["delete", "send_reminders"]
        "#;

        assert!(matches!(
            PermissionTable::from_policy_str(source, true),
            Err(PolicyError::Inconsistent(ref list)) if list.len() == 2
        ));

        let table = PermissionTable::from_policy_str(source, false).unwrap();
        assert_eq!(table.inconsistencies().len(), 2);
        for action in Action::ALL {
            assert!(!table.can_perform(Role::Secretario, Module::Facturacion, action));
        }
    }

    #[test]
    fn test_export_reloads_to_same_table() {
        let table = PermissionTable::from_policy_str(OVERRIDE, true).unwrap();
        let exported = table.to_policy_toml().unwrap();
        let reloaded = PermissionTable::from_policy_str(&exported, true).unwrap();

        for role in Role::ALL {
            assert_eq!(table.describe_role(role), reloaded.describe_role(role));
            for module in Module::ALL {
                assert_eq!(table.grant(role, module), reloaded.grant(role, module));
            }
        }
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = PermissionTable::from_policy_file("/nonexistent/bufete/policy.toml", true)
            .unwrap_err();
        assert!(err.to_string().contains("/nonexistent/bufete/policy.toml"));
    }
}
