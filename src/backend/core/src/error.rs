//! Error handling for Bufete Core.
//!
//! Permission queries themselves never fail. Errors come from building the
//! table (policy files, configuration) and from the gates refusing access.
//! Each error maps to a stable [`ErrorCode`] and an HTTP status, and renders
//! as the JSON body the request guard returns.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tracing::{error, warn};

use crate::rbac::{AccessDenied, PolicyError};

/// A specialized Result type for Bufete operations.
pub type Result<T> = std::result::Result<T, BufeteError>;

// ═══════════════════════════════════════════════════════════════════════════════
// Error Codes
// ═══════════════════════════════════════════════════════════════════════════════

/// Machine-readable error codes. Stable; clients may match on them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Authorization (4000-4099)
    Unauthenticated,
    Forbidden,

    // Policy (4100-4199)
    UnknownRole,
    UnknownModule,
    UnknownAction,
    InvalidPolicy,
    InconsistentPolicy,
    ProtectedRole,
    UnknownAccessLevel,

    // Configuration (5000-5099)
    ConfigurationError,
    PolicyFileUnreadable,

    // Internal (9000-9099)
    InternalError,
}

impl ErrorCode {
    pub const fn numeric_code(&self) -> u32 {
        match self {
            Self::Unauthenticated => 4000,
            Self::Forbidden => 4001,

            Self::UnknownRole => 4100,
            Self::UnknownModule => 4101,
            Self::UnknownAction => 4102,
            Self::InvalidPolicy => 4103,
            Self::InconsistentPolicy => 4104,
            Self::ProtectedRole => 4105,
            Self::UnknownAccessLevel => 4106,

            Self::ConfigurationError => 5000,
            Self::PolicyFileUnreadable => 5001,

            Self::InternalError => 9000,
        }
    }

    pub const fn http_status(&self) -> StatusCode {
        match self {
            Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,

            Self::UnknownRole
            | Self::UnknownModule
            | Self::UnknownAction
            | Self::InvalidPolicy
            | Self::InconsistentPolicy
            | Self::ProtectedRole
            | Self::UnknownAccessLevel => StatusCode::UNPROCESSABLE_ENTITY,

            Self::ConfigurationError | Self::PolicyFileUnreadable | Self::InternalError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub const fn category(&self) -> &'static str {
        match self.numeric_code() {
            4000..=4099 => "authorization",
            4100..=4199 => "policy",
            5000..=5099 => "configuration",
            _ => "internal",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Main Error Type
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Error)]
pub enum BufeteError {
    #[error("Authentication required")]
    Unauthenticated,

    #[error(transparent)]
    AccessDenied(#[from] AccessDenied),

    #[error(transparent)]
    Policy(#[from] PolicyError),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl BufeteError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Unauthenticated => ErrorCode::Unauthenticated,
            Self::AccessDenied(_) => ErrorCode::Forbidden,
            Self::Policy(err) => match err {
                PolicyError::UnknownRole(_) => ErrorCode::UnknownRole,
                PolicyError::UnknownModule(_) => ErrorCode::UnknownModule,
                PolicyError::UnknownAction(_) => ErrorCode::UnknownAction,
                PolicyError::UnknownAccessLevel(_) => ErrorCode::UnknownAccessLevel,
                PolicyError::Parse(_) | PolicyError::Serialize(_) => ErrorCode::InvalidPolicy,
                PolicyError::Inconsistent(_) => ErrorCode::InconsistentPolicy,
                PolicyError::SuperAdminOverride => ErrorCode::ProtectedRole,
                PolicyError::Io { .. } => ErrorCode::PolicyFileUnreadable,
                PolicyError::AlreadyInstalled => ErrorCode::InternalError,
            },
            Self::Config(_) => ErrorCode::ConfigurationError,
            Self::Internal(_) => ErrorCode::InternalError,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.code().http_status()
    }

    /// Message safe to show to the end user.
    pub fn user_message(&self) -> String {
        match self {
            Self::Unauthenticated => "Debe iniciar sesión para continuar.".to_string(),
            Self::AccessDenied(denied) => format!(
                "Su rol ({}) no tiene acceso a esta sección.",
                denied.role_description.title
            ),
            Self::Policy(_) | Self::Config(_) | Self::Internal(_) => {
                "Error interno de configuración de permisos.".to_string()
            }
        }
    }

    /// Structured details for the response body.
    fn details(&self) -> Option<serde_json::Value> {
        match self {
            Self::AccessDenied(denied) => serde_json::to_value(denied).ok(),
            Self::Policy(PolicyError::Inconsistent(list)) => serde_json::to_value(list).ok(),
            _ => None,
        }
    }

    fn log(&self) {
        let code = self.code();
        if code.http_status().is_server_error() {
            error!(error_code = %code, category = code.category(), error = %self, "Request failed");
        } else {
            warn!(error_code = %code, category = code.category(), error = %self, "Request rejected");
        }
    }
}

/// JSON body returned for every error.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: ErrorCode,
    pub numeric_code: u32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl From<&BufeteError> for ErrorResponse {
    fn from(err: &BufeteError) -> Self {
        let code = err.code();
        Self {
            success: false,
            error: ErrorBody {
                code,
                numeric_code: code.numeric_code(),
                message: err.user_message(),
                details: err.details(),
            },
        }
    }
}

impl IntoResponse for BufeteError {
    fn into_response(self) -> Response {
        self.log();
        (self.status(), Json(ErrorResponse::from(&self))).into_response()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════════
