//! Explicit session context. The original client kept token and role ids in
//! ambient browser storage; here the session is an object constructed at
//! login, passed to every workflow component, and read-only thereafter.

use secrecy::{ExposeSecret, SecretString};

use crate::domain::actor::{ActorId, Role};
use crate::errors::WorkflowError;

#[derive(Clone)]
pub struct Session {
    role: Role,
    actor_id: Option<ActorId>,
    token: SecretString,
}

impl Session {
    pub fn new(role: Role, actor_id: Option<ActorId>, token: impl Into<String>) -> Self {
        Self { role, actor_id, token: token.into().into() }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn actor_id(&self) -> Option<ActorId> {
        self.actor_id
    }

    /// The actor id, or `MissingActor` if the session was established
    /// without one. Callers check this before issuing any network call.
    pub fn require_actor_id(&self) -> Result<ActorId, WorkflowError> {
        self.actor_id.ok_or(WorkflowError::MissingActor { role: self.role })
    }

    pub fn bearer_token(&self) -> &str {
        self.token.expose_secret()
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("role", &self.role)
            .field("actor_id", &self.actor_id)
            .field("token", &"<redacted>")
            .finish()
    }
}
