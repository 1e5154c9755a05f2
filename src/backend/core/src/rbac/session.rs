//! The role value handed over by the authentication layer.
//!
//! The backend sends the role as a plain string. It is parsed once at login;
//! a value outside the enumeration leaves the session without a role, which
//! every gate treats as "no access".

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use super::models::Role;

/// An authenticated user as far as permission checks are concerned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    pub id: Uuid,
    pub user_id: String,
    /// Parsed role; `None` if the backend sent something unrecognised.
    pub role: Option<Role>,
    /// Role string exactly as received.
    pub raw_role: String,
    pub established_at: DateTime<Utc>,
}

impl Session {
    /// Build a session from the backend's user id and role string.
    pub fn from_backend(user_id: impl Into<String>, raw_role: impl Into<String>) -> Self {
        let user_id = user_id.into();
        let raw_role = raw_role.into();
        let role = Role::parse(&raw_role);
        if role.is_none() {
            warn!(user_id = %user_id, raw_role = %raw_role, "Session role not recognised");
        }
        Self {
            id: Uuid::new_v4(),
            user_id,
            role,
            raw_role,
            established_at: Utc::now(),
        }
    }

    /// Session with an already-typed role.
    pub fn with_role(user_id: impl Into<String>, role: Role) -> Self {
        Self::from_backend(user_id, role.id())
    }
}

/// Holds the current session; replaced on login, cleared on logout.
#[derive(Debug, Clone, Default)]
pub struct SessionSlot {
    inner: Arc<RwLock<Option<Session>>>,
}

impl SessionSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current session. Returns the previous one, if any.
    pub fn login(&self, session: Session) -> Option<Session> {
        info!(
            user_id = %session.user_id,
            role = session.role.map_or("unknown", |r| r.id()),
            "Session established"
        );
        self.inner.write().replace(session)
    }

    /// Clear the current session. Returns it, if there was one.
    pub fn logout(&self) -> Option<Session> {
        let previous = self.inner.write().take();
        if let Some(session) = &previous {
            info!(user_id = %session.user_id, "Session closed");
        }
        previous
    }

    pub fn current(&self) -> Option<Session> {
        self.inner.read().clone()
    }

    /// The role queries should use right now.
    pub fn role(&self) -> Option<Role> {
        self.inner.read().as_ref().and_then(|s| s.role)
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.read().is_some()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_backend_parses_role() {
        let session = Session::from_backend("u-17", "abogado_junior");
        assert_eq!(session.role, Some(Role::AbogadoJunior));
        assert_eq!(session.raw_role, "abogado_junior");
    }

    #[test]
    fn test_malformed_role_is_no_role() {
        for raw in ["Abogado_Junior", " SUPER-ADMIN", "socio "] {
            let session = Session::from_backend("u-19", raw);
            assert!(session.role.is_none(), "{raw:?}");
            assert_eq!(session.raw_role, raw);
        }
    }

    #[test]
    fn test_unknown_role_is_kept_raw() {
        let session = Session::from_backend("u-18", "becario");
        assert!(session.role.is_none());
        assert_eq!(session.raw_role, "becario");
    }

    #[test]
    fn test_login_logout_cycle() {
        let slot = SessionSlot::new();
        assert!(!slot.is_authenticated());
        assert!(slot.role().is_none());

        assert!(slot.login(Session::with_role("ana", Role::Contador)).is_none());
        assert_eq!(slot.role(), Some(Role::Contador));

        let previous = slot.login(Session::with_role("luis", Role::Paralegal));
        assert_eq!(previous.map(|s| s.user_id), Some("ana".to_string()));
        assert_eq!(slot.role(), Some(Role::Paralegal));

        let closed = slot.logout().unwrap();
        assert_eq!(closed.user_id, "luis");
        assert!(slot.role().is_none());
        assert!(slot.logout().is_none());
    }

    #[test]
    fn test_clones_share_state() {
        let slot = SessionSlot::new();
        let view = slot.clone();
        slot.login(Session::with_role("ana", Role::Socio));
        assert_eq!(view.role(), Some(Role::Socio));
    }

    #[test]
    fn test_authenticated_without_role() {
        let slot = SessionSlot::new();
        slot.login(Session::from_backend("x", "intruso"));
        assert!(slot.is_authenticated());
        assert!(slot.role().is_none());
    }
}
