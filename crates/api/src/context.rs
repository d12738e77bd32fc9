use ridegate_auth::{ActorView, Role};

/// Role declared by the caller for this request.
///
/// Inserted by the role resolver middleware; every downstream stage reads it
/// from request extensions instead of any shared state.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RoleContext {
    role: Role,
}

impl RoleContext {
    pub fn new(role: Role) -> Self {
        Self { role }
    }

    pub fn role(&self) -> Role {
        self.role
    }
}

/// Authenticated actor for a request that passed the protected-resource gate.
#[derive(Debug, Clone, PartialEq)]
pub struct ActorContext {
    actor: ActorView,
}

impl ActorContext {
    pub fn new(actor: ActorView) -> Self {
        Self { actor }
    }

    pub fn actor(&self) -> &ActorView {
        &self.actor
    }

    pub fn into_actor(self) -> ActorView {
        self.actor
    }
}
