//! Actor identity and access resolution
//!
//! The scan core only reads the two flags on `ActorContext`; how they were
//! resolved is the provider's business. `resolve_actor` implements the
//! role-gate used by the built-in providers: the explorer must be enabled,
//! at least one role must be configured, and the actor needs any one of
//! the configured roles.

use serde::{Deserialize, Serialize};

use crate::config::Settings;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorContext {
    pub authenticated: bool,
    pub identity: Option<String>,
    pub roles: Vec<String>,
    pub permitted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub denial_reason: Option<String>,
}

impl ActorContext {
    pub fn guest() -> Self {
        Self {
            authenticated: false,
            identity: None,
            roles: Vec::new(),
            permitted: false,
            denial_reason: Some("authentication required".to_string()),
        }
    }

    pub fn identity_or_anonymous(&self) -> &str {
        self.identity.as_deref().unwrap_or("anonymous")
    }
}

/// Pure role gate over a settings snapshot.
pub fn resolve_actor(identity: &str, roles: &[String], settings: &Settings) -> ActorContext {
    let denial_reason = if !settings.enabled {
        Some("endpoint catalog is disabled".to_string())
    } else if settings.allowed_roles.is_empty() {
        // No configured roles denies everyone, including admins.
        Some("no roles configured for catalog access".to_string())
    } else if !roles.iter().any(|r| settings.allowed_roles.contains(r)) {
        Some(format!(
            "access denied, required roles: {}",
            settings.allowed_roles.join(", ")
        ))
    } else {
        None
    };

    ActorContext {
        authenticated: true,
        identity: Some(identity.to_string()),
        roles: roles.to_vec(),
        permitted: denial_reason.is_none(),
        denial_reason,
    }
}

pub trait ActorProvider: Send + Sync {
    fn actor_context(&self) -> ActorContext;
}

/// Fixed actor, for tests and embedding.
pub struct StaticActorProvider {
    context: ActorContext,
}

impl StaticActorProvider {
    pub fn new(context: ActorContext) -> Self {
        Self { context }
    }
}

impl ActorProvider for StaticActorProvider {
    fn actor_context(&self) -> ActorContext {
        self.context.clone()
    }
}
