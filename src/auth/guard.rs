use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use super::{Role, SessionPrincipal};
use crate::content::ContentError;
use crate::store::ContentStore;

/// Who may perform a mutating operation on a content type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthPolicy {
    /// Any signed-in principal, regardless of stored role.
    Authenticated,
    /// The principal's stored role must be one of these.
    Roles(&'static [Role]),
}

pub const SUPER_ADMIN_ONLY: AuthPolicy = AuthPolicy::Roles(&[Role::SuperAdmin]);

/// The actor on whose behalf an authorized operation runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
    pub id: Uuid,
    pub email: String,
    pub role: Option<Role>,
}

/// Decides whether the caller may proceed. Roles are read from the store on every call and never
/// taken from the session token.
#[derive(Clone)]
pub struct AuthorizationGuard {
    store: Arc<dyn ContentStore>,
}

impl AuthorizationGuard {
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self { store }
    }

    pub fn require_authenticated(&self, session: Option<&SessionPrincipal>) -> Result<Principal, ContentError> {
        let session = session.ok_or_else(|| {
            tracing::debug!("rejecting anonymous request");
            ContentError::unauthorized()
        })?;
        Ok(Principal {
            id: session.id,
            email: session.email.clone(),
            role: None,
        })
    }

    pub async fn require_role(
        &self,
        session: Option<&SessionPrincipal>,
        allowed: &[Role],
    ) -> Result<Principal, ContentError> {
        let session = self.require_authenticated(session)?;
        let role = self.resolve_role(session.id).await?;

        match role {
            Some(role) if allowed.contains(&role) => {
                tracing::debug!("principal {} authorized as {}", session.id, role);
                Ok(Principal { role: Some(role), ..session })
            }
            other => {
                tracing::debug!("principal {} with role {:?} not in {:?}", session.id, other, allowed);
                Err(ContentError::unauthorized())
            }
        }
    }

    pub async fn authorize(&self, session: Option<&SessionPrincipal>, policy: AuthPolicy) -> Result<Principal, ContentError> {
        match policy {
            AuthPolicy::Authenticated => self.require_authenticated(session),
            AuthPolicy::Roles(allowed) => self.require_role(session, allowed).await,
        }
    }

    /// The current principal with a freshly resolved role, for `whoami`.
    pub async fn current(&self, session: Option<&SessionPrincipal>) -> Result<Principal, ContentError> {
        let principal = self.require_authenticated(session)?;
        let role = self.resolve_role(principal.id).await?;
        Ok(Principal { role, ..principal })
    }

    /// Grants `role` to the principal registered under `email`. Only super admins may grant.
    pub async fn grant_role(
        &self,
        session: Option<&SessionPrincipal>,
        email: &str,
        role: Role,
    ) -> Result<Principal, ContentError> {
        let granter = self.require_role(session, &[Role::SuperAdmin]).await?;

        let target = self
            .store
            .find_principal_by_email(email)
            .await
            .map_err(ContentError::from_store)?
            .ok_or_else(|| ContentError::NotFound("User not found".to_string()))?;

        self.store
            .set_role(target.id, Some(role))
            .await
            .map_err(ContentError::from_store)?;

        tracing::info!("{} granted {} to {} ({})", granter.email, role, target.email, target.id);
        Ok(Principal {
            id: target.id,
            email: target.email,
            role: Some(role),
        })
    }

    async fn resolve_role(&self, principal_id: Uuid) -> Result<Option<Role>, ContentError> {
        match self.store.find_principal(principal_id).await {
            // A session without a profile row is treated as having no role.
            Ok(principal) => Ok(principal.and_then(|p| p.role)),
            Err(err) => {
                tracing::error!("role lookup for {} failed: {}", principal_id, err);
                Err(ContentError::from_store(err))
            }
        }
    }
}
