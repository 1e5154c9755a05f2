//! Built-in roles and the default permission table.
//!
//! | Role            | Summary                                                        |
//! |-----------------|----------------------------------------------------------------|
//! | super_admin     | Everything, including configuration                            |
//! | socio           | Everything except changing configuration                       |
//! | abogado_senior  | Cases, clients, documents; approves expenses; reads billing    |
//! | abogado_junior  | Works assigned cases; records own expenses                     |
//! | paralegal       | Case support, documents, OCR, calendar                         |
//! | secretario      | Calendar, client intake, incoming documents                    |
//! | administrador   | Billing, expenses, providers, users, configuration             |
//! | contador        | Accounting, billing, expenses, providers, reports              |
//! | recepcionista   | Clients and calendar only                                      |
//!
//! The table is written as one exhaustive `match` per role so that a new
//! [`Role`] variant does not compile until it has an entry.

use super::models::{AccessLevel, Action, Module, Role};

/// Which actions a default grant carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionGrant {
    /// Every action the module supports at the granted level.
    Supported,
    /// Exactly these actions.
    Only(&'static [Action]),
}

/// One cell of the compiled-in table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefaultGrant {
    pub access: AccessLevel,
    pub actions: ActionGrant,
}

impl DefaultGrant {
    /// Expand into the concrete action list for `module`.
    pub fn actions_for(&self, module: Module) -> Vec<Action> {
        match self.actions {
            ActionGrant::Supported => module
                .supported_actions()
                .iter()
                .copied()
                .filter(|a| self.access.allows(a.required_level()))
                .collect(),
            ActionGrant::Only(actions) => actions.to_vec(),
        }
    }
}

const fn none() -> DefaultGrant {
    DefaultGrant {
        access: AccessLevel::None,
        actions: ActionGrant::Only(&[]),
    }
}

const fn view() -> DefaultGrant {
    DefaultGrant {
        access: AccessLevel::View,
        actions: ActionGrant::Only(&[]),
    }
}

const fn view_with(actions: &'static [Action]) -> DefaultGrant {
    DefaultGrant {
        access: AccessLevel::View,
        actions: ActionGrant::Only(actions),
    }
}

const fn full() -> DefaultGrant {
    DefaultGrant {
        access: AccessLevel::Full,
        actions: ActionGrant::Supported,
    }
}

const fn full_with(actions: &'static [Action]) -> DefaultGrant {
    DefaultGrant {
        access: AccessLevel::Full,
        actions: ActionGrant::Only(actions),
    }
}

/// The compiled-in grant for a (role, module) pair.
pub fn default_grant(role: Role, module: Module) -> DefaultGrant {
    use Action::*;
    use Module::*;

    match role {
        Role::SuperAdmin => full(),

        Role::Socio => match module {
            Configuracion => view(),
            _ => full(),
        },

        Role::AbogadoSenior => match module {
            Dashboard | Proveedores => view(),
            Expedientes | Clientes | Documentos | Ocr | Calendario | Mensajes | AsistenteIa => {
                full()
            }
            Facturacion | Reportes => view_with(&[Export]),
            Gastos => full_with(&[Create, Edit, Approve, Export]),
            Contabilidad | Usuarios | Configuracion => none(),
        },

        Role::AbogadoJunior => match module {
            Dashboard | Clientes => view(),
            Expedientes => full_with(&[Create, Edit, Export]),
            Documentos | Gastos => full_with(&[Create, Edit]),
            Ocr => full_with(&[Create]),
            Calendario => full_with(&[Create, Edit, Cancel]),
            Mensajes | AsistenteIa => full(),
            _ => none(),
        },

        Role::Paralegal => match module {
            Dashboard | Clientes => view(),
            Expedientes | Documentos => full_with(&[Create, Edit]),
            Ocr => full_with(&[Create, Export]),
            Calendario => full_with(&[Create, Edit, SendReminders]),
            Mensajes => full(),
            AsistenteIa | Gastos => full_with(&[Create]),
            _ => none(),
        },

        Role::Secretario => match module {
            Dashboard | Expedientes | Facturacion | Proveedores => view(),
            Clientes => full_with(&[Create, Edit]),
            Documentos | Ocr | Gastos => full_with(&[Create]),
            Calendario | Mensajes => full(),
            _ => none(),
        },

        Role::Administrador => match module {
            Dashboard | Expedientes | Contabilidad => view_with(&[Export]),
            Documentos => view(),
            Clientes | Calendario | Mensajes | Gastos | Proveedores | Reportes
            | Configuracion => full(),
            Facturacion => full_with(&[Create, Edit, Cancel, Export, SendReminders]),
            Usuarios => full_with(&[Create, Edit]),
            Ocr | AsistenteIa => none(),
        },

        Role::Contador => match module {
            Dashboard | Clientes => view_with(&[Export]),
            Documentos | Calendario => view(),
            Mensajes | Facturacion | Gastos | Proveedores | Contabilidad | Reportes => full(),
            _ => none(),
        },

        Role::Recepcionista => match module {
            Dashboard => view(),
            Clientes => full_with(&[Create, Edit]),
            Calendario => full_with(&[Create, Edit, SendReminders]),
            Mensajes => full(),
            _ => none(),
        },
    }
}

impl Role {
    /// Title shown on the access-denied screen.
    pub const fn title(&self) -> &'static str {
        match self {
            Self::SuperAdmin => "Superadministrador",
            Self::Socio => "Socio",
            Self::AbogadoSenior => "Abogado sénior",
            Self::AbogadoJunior => "Abogado júnior",
            Self::Paralegal => "Paralegal",
            Self::Secretario => "Secretaría",
            Self::Administrador => "Administración",
            Self::Contador => "Contabilidad",
            Self::Recepcionista => "Recepción",
        }
    }

    pub const fn description(&self) -> &'static str {
        match self {
            Self::SuperAdmin => "Acceso total a todos los módulos y a la configuración del sistema.",
            Self::Socio => {
                "Dirección del despacho: gestiona expedientes, facturación, finanzas y usuarios."
            }
            Self::AbogadoSenior => {
                "Lleva expedientes y clientes, aprueba gastos y consulta la facturación."
            }
            Self::AbogadoJunior => "Trabaja en los expedientes asignados y registra sus gastos.",
            Self::Paralegal => "Apoya en expedientes, documentación, OCR y agenda.",
            Self::Secretario => "Gestiona la agenda, los clientes y la documentación de entrada.",
            Self::Administrador => {
                "Gestiona facturación, gastos, proveedores, usuarios y configuración."
            }
            Self::Contador => "Lleva la contabilidad, la facturación, los gastos y los proveedores.",
            Self::Recepcionista => "Atiende a los clientes y gestiona la agenda.",
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════════
