use std::collections::BTreeSet;

use uuid::Uuid;

use crate::capability::Capability;

/// The identity requesting access, as seen by permission checks.
///
/// Implemented by the identity provider (session, token, user record).
/// Every method must be cheap and side-effect free: a single permission
/// evaluation may call them several times.
pub trait Identity: Send + Sync {
    /// Identity key of the actor; `None` for anonymous actors.
    fn subject_id(&self) -> Option<Uuid>;

    fn is_authenticated(&self) -> bool {
        self.subject_id().is_some()
    }

    fn is_staff(&self) -> bool;

    fn is_superuser(&self) -> bool;

    /// Whether the actor holds the named capability.
    fn has_capability(&self, capability: &Capability) -> bool;
}

/// `Actor` is the default [`Identity`] implementation: a user record with
/// flags and an explicit set of granted capabilities.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Actor {
    subject_id: Option<Uuid>,
    is_staff: bool,
    is_superuser: bool,
    is_active: bool,
    capabilities: BTreeSet<Capability>,
}

impl Actor {
    /// Create a new `Actor` builder
    #[must_use]
    pub fn builder() -> ActorBuilder {
        ActorBuilder::default()
    }

    /// Create an anonymous `Actor` with no identity, flags or capabilities
    #[must_use]
    pub fn anonymous() -> Self {
        Self {
            subject_id: None,
            is_staff: false,
            is_superuser: false,
            is_active: false,
            capabilities: BTreeSet::new(),
        }
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.is_active
    }

    /// Capabilities granted explicitly; superusers hold more than these.
    #[must_use]
    pub fn capabilities(&self) -> &BTreeSet<Capability> {
        &self.capabilities
    }

    /// Return a copy of this actor with the staff flag changed.
    #[must_use]
    pub fn with_staff(mut self, is_staff: bool) -> Self {
        self.is_staff = is_staff;
        self
    }
}

impl Identity for Actor {
    fn subject_id(&self) -> Option<Uuid> {
        self.subject_id
    }

    fn is_staff(&self) -> bool {
        self.is_staff
    }

    fn is_superuser(&self) -> bool {
        self.is_superuser
    }

    fn has_capability(&self, capability: &Capability) -> bool {
        if self.subject_id.is_none() || !self.is_active {
            return false;
        }
        self.is_superuser || self.capabilities.contains(capability)
    }
}

pub struct ActorBuilder {
    subject_id: Option<Uuid>,
    is_staff: bool,
    is_superuser: bool,
    is_active: bool,
    capabilities: BTreeSet<Capability>,
}

impl Default for ActorBuilder {
    fn default() -> Self {
        Self {
            subject_id: None,
            is_staff: false,
            is_superuser: false,
            is_active: true,
            capabilities: BTreeSet::new(),
        }
    }
}

impl ActorBuilder {
    #[must_use]
    pub fn subject_id(mut self, subject_id: Uuid) -> Self {
        self.subject_id = Some(subject_id);
        self
    }

    #[must_use]
    pub fn staff(mut self, is_staff: bool) -> Self {
        self.is_staff = is_staff;
        self
    }

    #[must_use]
    pub fn superuser(mut self, is_superuser: bool) -> Self {
        self.is_superuser = is_superuser;
        self
    }

    #[must_use]
    pub fn active(mut self, is_active: bool) -> Self {
        self.is_active = is_active;
        self
    }

    #[must_use]
    pub fn add_capability(mut self, capability: Capability) -> Self {
        self.capabilities.insert(capability);
        self
    }

    #[must_use]
    pub fn build(self) -> Actor {
        Actor {
            subject_id: self.subject_id,
            is_staff: self.is_staff,
            is_superuser: self.is_superuser,
            is_active: self.is_active,
            capabilities: self.capabilities,
        }
    }
}
