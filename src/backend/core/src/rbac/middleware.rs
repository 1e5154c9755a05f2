//! Tower layer that enforces module access on requests.
//!
//! The authentication layer is expected to put a [`Session`] into the
//! request extensions. This layer checks it against the permission table and
//! either rejects the request with a JSON error or forwards it with an
//! [`RbacContext`] attached.

use axum::{
    body::Body,
    extract::{FromRequestParts, Request},
    http::request::Parts,
    response::{IntoResponse, Response},
};
use futures::future::BoxFuture;
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::{Layer, Service};

use super::gate::{require_action, require_module};
use super::models::{AccessLevel, Action, Module, Permission};
use super::policy::PermissionTable;
use super::session::Session;
use crate::error::BufeteError;

// ═══════════════════════════════════════════════════════════════════════════════
// RBAC Context (extracted in handlers)
// ═══════════════════════════════════════════════════════════════════════════════

/// Inserted into request extensions once the guard has let a request through.
#[derive(Debug, Clone)]
pub struct RbacContext {
    pub session: Session,
    pub module: Module,
    /// Access level the session's role has for `module`.
    pub access: AccessLevel,
    /// The action that was checked, if the guard required one.
    pub checked_action: Option<Action>,
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for RbacContext
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<RbacContext>().cloned().ok_or_else(|| {
            BufeteError::Internal("RBAC context missing; is the guard applied?".to_string())
                .into_response()
        })
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Tower Layer
// ═══════════════════════════════════════════════════════════════════════════════

/// Layer that wraps services with a module/action requirement.
///
/// ```rust,ignore
/// let table = Arc::new(PermissionTable::defaults());
/// let app = Router::new()
///     .route("/facturas/:id/aprobar", post(approve_invoice))
///     .layer(RequirePermissionLayer::action(table, Module::Facturacion, Action::Approve));
/// ```
#[derive(Debug, Clone)]
pub struct RequirePermissionLayer {
    table: Arc<PermissionTable>,
    module: Module,
    action: Option<Action>,
}

impl RequirePermissionLayer {
    /// Require any access to `module`.
    pub fn module(table: Arc<PermissionTable>, module: Module) -> Self {
        Self {
            table,
            module,
            action: None,
        }
    }

    /// Require `action` within `module`.
    pub fn action(table: Arc<PermissionTable>, module: Module, action: Action) -> Self {
        Self {
            table,
            module,
            action: Some(action),
        }
    }

    pub fn from_permission(table: Arc<PermissionTable>, permission: Permission) -> Self {
        Self::action(table, permission.module, permission.action)
    }
}

impl<S> Layer<S> for RequirePermissionLayer {
    type Service = RequirePermissionService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RequirePermissionService {
            inner,
            table: self.table.clone(),
            module: self.module,
            action: self.action,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Tower Service
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
pub struct RequirePermissionService<S> {
    inner: S,
    table: Arc<PermissionTable>,
    module: Module,
    action: Option<Action>,
}

impl<S> RequirePermissionService<S> {
    fn authorize(&self, session: Option<&Session>) -> Result<RbacContext, BufeteError> {
        let session = session.ok_or(BufeteError::Unauthenticated)?;
        let access = require_module(&self.table, session.role, self.module)?;
        if let Some(action) = self.action {
            require_action(&self.table, session.role, self.module, action)?;
        }
        Ok(RbacContext {
            session: session.clone(),
            module: self.module,
            access,
            checked_action: self.action,
        })
    }
}

impl<S> Service<Request<Body>> for RequirePermissionService<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut request: Request<Body>) -> Self::Future {
        let decision = self.authorize(request.extensions().get::<Session>());

        // Take the service that was driven to readiness; leave a fresh clone behind.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        Box::pin(async move {
            match decision {
                Ok(ctx) => {
                    request.extensions_mut().insert(ctx);
                    inner.call(request).await
                }
                Err(err) => Ok(err.into_response()),
            }
        })
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════════
