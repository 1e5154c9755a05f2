//! Permission data model: roles, modules, access levels, actions.
//!
//! Every enumeration here is closed. Parsing accepts the canonical id only
//! (`"abogado_senior"`); any other spelling is outside the enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// ═══════════════════════════════════════════════════════════════════════════════
// Parse errors
// ═══════════════════════════════════════════════════════════════════════════════

/// A string did not name a known role, module, action or access level.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Unknown role: {0}")]
    UnknownRole(String),

    #[error("Unknown module: {0}")]
    UnknownModule(String),

    #[error("Unknown action: {0}")]
    UnknownAction(String),

    #[error("Unknown access level: {0}")]
    UnknownAccessLevel(String),

    #[error("Invalid permission (expected `module:action`): {0}")]
    InvalidPermission(String),
}

// ═══════════════════════════════════════════════════════════════════════════════
// Role
// ═══════════════════════════════════════════════════════════════════════════════

/// A named category of user. Assigned by the backend, immutable per session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    SuperAdmin,
    Socio,
    AbogadoSenior,
    AbogadoJunior,
    Paralegal,
    Secretario,
    Administrador,
    Contador,
    Recepcionista,
}

impl Role {
    /// Every role, in table order.
    pub const ALL: [Role; 9] = [
        Role::SuperAdmin,
        Role::Socio,
        Role::AbogadoSenior,
        Role::AbogadoJunior,
        Role::Paralegal,
        Role::Secretario,
        Role::Administrador,
        Role::Contador,
        Role::Recepcionista,
    ];

    /// Canonical identifier, as sent by the backend.
    pub const fn id(&self) -> &'static str {
        match self {
            Self::SuperAdmin => "super_admin",
            Self::Socio => "socio",
            Self::AbogadoSenior => "abogado_senior",
            Self::AbogadoJunior => "abogado_junior",
            Self::Paralegal => "paralegal",
            Self::Secretario => "secretario",
            Self::Administrador => "administrador",
            Self::Contador => "contador",
            Self::Recepcionista => "recepcionista",
        }
    }

    /// Parse a role, returning `None` for anything outside the enumeration.
    pub fn parse(s: &str) -> Option<Self> {
        s.parse().ok()
    }
}

impl FromStr for Role {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|r| r.id() == s)
            .ok_or_else(|| ParseError::UnknownRole(s.to_string()))
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Action
// ═══════════════════════════════════════════════════════════════════════════════

/// A fine-grained operation within a module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Create,
    Edit,
    Delete,
    Approve,
    Pay,
    Cancel,
    Export,
    SendReminders,
}

impl Action {
    pub const ALL: [Action; 8] = [
        Action::Create,
        Action::Edit,
        Action::Delete,
        Action::Approve,
        Action::Pay,
        Action::Cancel,
        Action::Export,
        Action::SendReminders,
    ];

    pub const fn id(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Edit => "edit",
            Self::Delete => "delete",
            Self::Approve => "approve",
            Self::Pay => "pay",
            Self::Cancel => "cancel",
            Self::Export => "export",
            Self::SendReminders => "send_reminders",
        }
    }

    /// Display label used on access-denied screens.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Create => "crear",
            Self::Edit => "editar",
            Self::Delete => "eliminar",
            Self::Approve => "aprobar",
            Self::Pay => "pagar",
            Self::Cancel => "anular",
            Self::Export => "exportar",
            Self::SendReminders => "enviar recordatorios",
        }
    }

    /// Minimum module access an action needs. Only exporting is read-only.
    pub const fn required_level(&self) -> AccessLevel {
        match self {
            Self::Export => AccessLevel::View,
            _ => AccessLevel::Full,
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        s.parse().ok()
    }
}

impl FromStr for Action {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|a| a.id() == s)
            .ok_or_else(|| ParseError::UnknownAction(s.to_string()))
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Module
// ═══════════════════════════════════════════════════════════════════════════════

/// A functional area of the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Module {
    Dashboard,
    Expedientes,
    Clientes,
    Documentos,
    Ocr,
    Calendario,
    Mensajes,
    AsistenteIa,
    Facturacion,
    Gastos,
    Proveedores,
    Contabilidad,
    Reportes,
    Usuarios,
    Configuracion,
}

impl Module {
    pub const ALL: [Module; 15] = [
        Module::Dashboard,
        Module::Expedientes,
        Module::Clientes,
        Module::Documentos,
        Module::Ocr,
        Module::Calendario,
        Module::Mensajes,
        Module::AsistenteIa,
        Module::Facturacion,
        Module::Gastos,
        Module::Proveedores,
        Module::Contabilidad,
        Module::Reportes,
        Module::Usuarios,
        Module::Configuracion,
    ];

    pub const fn id(&self) -> &'static str {
        match self {
            Self::Dashboard => "dashboard",
            Self::Expedientes => "expedientes",
            Self::Clientes => "clientes",
            Self::Documentos => "documentos",
            Self::Ocr => "ocr",
            Self::Calendario => "calendario",
            Self::Mensajes => "mensajes",
            Self::AsistenteIa => "asistente_ia",
            Self::Facturacion => "facturacion",
            Self::Gastos => "gastos",
            Self::Proveedores => "proveedores",
            Self::Contabilidad => "contabilidad",
            Self::Reportes => "reportes",
            Self::Usuarios => "usuarios",
            Self::Configuracion => "configuracion",
        }
    }

    /// Human-readable module name.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Dashboard => "Panel",
            Self::Expedientes => "Expedientes",
            Self::Clientes => "Clientes",
            Self::Documentos => "Documentos",
            Self::Ocr => "OCR",
            Self::Calendario => "Calendario",
            Self::Mensajes => "Mensajes",
            Self::AsistenteIa => "Asistente IA",
            Self::Facturacion => "Facturación",
            Self::Gastos => "Gastos",
            Self::Proveedores => "Proveedores",
            Self::Contabilidad => "Contabilidad",
            Self::Reportes => "Reportes",
            Self::Usuarios => "Usuarios",
            Self::Configuracion => "Configuración",
        }
    }

    /// Actions that mean something in this module. Anything else is never
    /// granted, whatever the table says.
    pub const fn supported_actions(&self) -> &'static [Action] {
        use Action::*;
        match self {
            Self::Dashboard => &[Export],
            Self::Expedientes | Self::Clientes | Self::Documentos => {
                &[Create, Edit, Delete, Export]
            }
            Self::Ocr => &[Create, Delete, Export],
            Self::Calendario => &[Create, Edit, Delete, Cancel, SendReminders],
            Self::Mensajes => &[Create, Delete],
            Self::AsistenteIa => &[Create, Export],
            Self::Facturacion => &[Create, Edit, Delete, Approve, Cancel, Export, SendReminders],
            Self::Gastos => &[Create, Edit, Delete, Approve, Pay, Export],
            Self::Proveedores => &[Create, Edit, Delete, Pay, Export],
            Self::Contabilidad => &[Create, Edit, Approve, Export],
            Self::Reportes => &[Create, Export],
            Self::Usuarios => &[Create, Edit, Delete],
            Self::Configuracion => &[Edit],
        }
    }

    pub fn supports(&self, action: Action) -> bool {
        self.supported_actions().contains(&action)
    }

    pub fn parse(s: &str) -> Option<Self> {
        s.parse().ok()
    }
}

impl FromStr for Module {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.id() == s)
            .ok_or_else(|| ParseError::UnknownModule(s.to_string()))
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Access level
// ═══════════════════════════════════════════════════════════════════════════════

/// Coarse visibility/mutability tier for a module. Ordered `None < View < Full`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum AccessLevel {
    #[default]
    None,
    View,
    Full,
}

impl AccessLevel {
    pub const fn id(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::View => "view",
            Self::Full => "full",
        }
    }

    /// Whether this level satisfies `required`.
    pub fn allows(&self, required: AccessLevel) -> bool {
        *self >= required
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

impl FromStr for AccessLevel {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Self::None),
            "view" => Ok(Self::View),
            "full" => Ok(Self::Full),
            _ => Err(ParseError::UnknownAccessLevel(s.to_string())),
        }
    }
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Permission
// ═══════════════════════════════════════════════════════════════════════════════

/// An action on a module, written `module:action` (e.g. `facturacion:approve`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Permission {
    pub module: Module,
    pub action: Action,
}

impl Permission {
    pub fn new(module: Module, action: Action) -> Self {
        Self { module, action }
    }

    /// Parse a colon-separated permission like `"gastos:pay"`.
    pub fn parse(s: &str) -> Result<Self, ParseError> {
        let (module, action) = s
            .split_once(':')
            .ok_or_else(|| ParseError::InvalidPermission(s.to_string()))?;
        Ok(Self::new(module.parse()?, action.parse()?))
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.module, self.action)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse_is_exact() {
        assert_eq!(Role::parse("abogado_senior"), Some(Role::AbogadoSenior));
        assert_eq!(Role::parse("  Abogado-Senior "), None);
        assert_eq!(Role::parse("SUPER_ADMIN"), None);
        assert_eq!(Role::parse(" super-admin"), None);
        assert_eq!(Role::parse("socio "), None);
        assert_eq!(Role::parse("abogado"), None);
        assert_eq!(Role::parse(""), None);
    }

    #[test]
    fn test_module_action_and_level_parse_is_exact() {
        assert_eq!(Module::parse("asistente_ia"), Some(Module::AsistenteIa));
        assert_eq!(Module::parse("Asistente-IA"), None);
        assert_eq!(Action::parse("send_reminders"), Some(Action::SendReminders));
        assert_eq!(Action::parse(" export"), None);
        assert_eq!("full".parse::<AccessLevel>(), Ok(AccessLevel::Full));
        assert!("FULL".parse::<AccessLevel>().is_err());
    }

    #[test]
    fn test_role_ids_round_trip() {
        for role in Role::ALL {
            assert_eq!(role.id().parse::<Role>().unwrap(), role);
            assert_eq!(role.to_string(), role.id());
        }
    }

    #[test]
    fn test_serde_ids_match_display() {
        for module in Module::ALL {
            let json = serde_json::to_string(&module).unwrap();
            assert_eq!(json, format!("\"{}\"", module.id()));
        }
        assert_eq!(
            serde_json::to_string(&Action::SendReminders).unwrap(),
            "\"send_reminders\""
        );
        assert_eq!(serde_json::to_string(&AccessLevel::View).unwrap(), "\"view\"");
    }

    #[test]
    fn test_access_level_ordering() {
        assert!(AccessLevel::Full.allows(AccessLevel::View));
        assert!(AccessLevel::View.allows(AccessLevel::View));
        assert!(!AccessLevel::View.allows(AccessLevel::Full));
        assert!(!AccessLevel::None.allows(AccessLevel::View));
        assert!(AccessLevel::None.allows(AccessLevel::None));
        assert_eq!(AccessLevel::default(), AccessLevel::None);
    }

    #[test]
    fn test_only_export_is_read_only() {
        for action in Action::ALL {
            let expected = if action == Action::Export {
                AccessLevel::View
            } else {
                AccessLevel::Full
            };
            assert_eq!(action.required_level(), expected, "{action}");
        }
    }

    #[test]
    fn test_module_supported_actions() {
        assert!(Module::Gastos.supports(Action::Pay));
        assert!(Module::Facturacion.supports(Action::SendReminders));
        assert!(!Module::Facturacion.supports(Action::Pay));
        assert!(!Module::Mensajes.supports(Action::Export));
        assert_eq!(Module::Configuracion.supported_actions(), &[Action::Edit]);
    }

    #[test]
    fn test_permission_parse() {
        let perm = Permission::parse("facturacion:approve").unwrap();
        assert_eq!(perm.module, Module::Facturacion);
        assert_eq!(perm.action, Action::Approve);
        assert_eq!(perm.to_string(), "facturacion:approve");

        assert_eq!(
            Permission::parse("facturacion"),
            Err(ParseError::InvalidPermission("facturacion".to_string()))
        );
        assert_eq!(
            Permission::parse("nomina:pay"),
            Err(ParseError::UnknownModule("nomina".to_string()))
        );
        assert_eq!(
            Permission::parse("gastos:refund"),
            Err(ParseError::UnknownAction("refund".to_string()))
        );
    }
}
