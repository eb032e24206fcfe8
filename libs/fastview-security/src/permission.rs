//! Permission predicates.
//!
//! A [`Permission`] is an immutable boolean expression over the requesting
//! actor and, optionally, the record being accessed. It is evaluated in two
//! ways that always agree:
//!
//! - [`Permission::check`] decides for a single record (or for a resource
//!   type when there is no record);
//! - [`Permission::filter`] narrows a whole [`Collection`] by compiling the
//!   expression to a [`Restriction`] the storage layer applies natively.
//!
//! For every row `r` of a collection `c`, `r` survives `filter(actor, c)`
//! exactly when `check(actor, Some(c.schema().resource_type()), Some(r))`.
//!
//! ```
//! use fastview_security::{Actor, Identity, Permission, ResourceType};
//! use uuid::Uuid;
//!
//! let edit = Permission::owner("author") | Permission::Staff;
//! let staff = Actor::builder().subject_id(Uuid::new_v4()).staff(true).build();
//! let entry = ResourceType::new("blog", "Entry");
//! assert!(edit.check(&staff, Some(&entry), None));
//! assert!(!edit.check(&Actor::anonymous(), Some(&entry), None));
//! ```

use std::ops;

use tracing::{debug, warn};

use crate::actor::Identity;
use crate::capability::Capability;
use crate::collection::Collection;
use crate::error::{ConfigurationError, validate_action};
use crate::resource::{Record, ResourceType};
use crate::restriction::Restriction;
use crate::schema::Schema;

/// A node in a permission expression tree.
///
/// Built once at configuration time and evaluated many times; no node holds
/// per-request state, so trees can be shared freely across threads.
///
/// Serialized form (used by configuration files):
///
/// | variant | YAML |
/// |---------|------|
/// | `Public` | `public` |
/// | `Owner("author")` | `{ owner: author }` |
/// | `Capability("change")` | `{ capability: change }` |
/// | `And(a, b)` | `{ and: [a, b] }` |
/// | `Not(a)` | `{ not: a }` |
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    /// Always denies.
    Denied,
    /// Always allows.
    Public,
    /// Actor must be logged in.
    Authenticated,
    /// Actor must have the staff flag.
    Staff,
    /// Actor must have the superuser flag.
    Superuser,
    /// Actor must hold `<app>.<action>_<model>` for the target resource type.
    ///
    /// `action` is typically one of `add`, `change`, `delete` or `view`.
    Capability(String),
    /// The record's foreign key named by the field must point at the actor.
    ///
    /// Anonymous actors always fail.
    Owner(String),
    And(Box<Permission>, Box<Permission>),
    Or(Box<Permission>, Box<Permission>),
    Not(Box<Permission>),
}

impl Permission {
    #[must_use]
    pub fn capability(action: impl Into<String>) -> Self {
        Self::Capability(action.into())
    }

    #[must_use]
    pub fn owner(owner_field: impl Into<String>) -> Self {
        Self::Owner(owner_field.into())
    }

    /// Both permissions must pass.
    #[must_use]
    pub fn and(self, other: Self) -> Self {
        Self::And(Box::new(self), Box::new(other))
    }

    /// Either permission must pass.
    #[must_use]
    pub fn or(self, other: Self) -> Self {
        Self::Or(Box::new(self), Box::new(other))
    }

    /// Allows exactly what `self` denies.
    #[must_use]
    pub fn negate(self) -> Self {
        Self::Not(Box::new(self))
    }

    /// See if `actor` may access `instance`, or the resource type when there
    /// is no instance.
    ///
    /// `resource_type` takes precedence over the instance's own type when
    /// deriving capability names. Missing context never errors: a leaf that
    /// cannot be decided denies.
    #[must_use]
    pub fn check(
        &self,
        actor: &dyn Identity,
        resource_type: Option<&ResourceType>,
        instance: Option<&dyn Record>,
    ) -> bool {
        match self {
            Self::Denied => false,
            Self::Public => true,
            Self::Authenticated => actor.is_authenticated(),
            Self::Staff => actor.is_staff(),
            Self::Superuser => actor.is_superuser(),
            Self::Capability(action) => {
                let capability = match (resource_type, instance) {
                    (Some(rt), _) => Capability::for_action(rt, action),
                    (None, Some(record)) => Capability::for_action(&record.resource_type(), action),
                    (None, None) => return false,
                };
                actor.has_capability(&capability)
            }
            Self::Owner(field) => {
                if !actor.is_authenticated() {
                    return false;
                }
                let (Some(subject_id), Some(record)) = (actor.subject_id(), instance) else {
                    return false;
                };
                record.field_value(field) == Some(subject_id)
            }
            Self::And(left, right) => {
                let can_left = left.check(actor, resource_type, instance);
                can_left && right.check(actor, resource_type, instance)
            }
            Self::Or(left, right) => {
                let can_left = left.check(actor, resource_type, instance);
                can_left || right.check(actor, resource_type, instance)
            }
            Self::Not(inner) => !inner.check(actor, resource_type, instance),
        }
    }

    /// Compile this permission into a restriction over rows of `schema`.
    ///
    /// Actor-only leaves are decided once and become `All` or `Nothing`;
    /// `Owner` becomes a field equality. Negation is applied to the compiled
    /// child by De Morgan push-down, so nested trees stay consistent with
    /// [`Permission::check`].
    ///
    /// # Errors
    /// Returns `ConfigurationError::UnknownField` if an `Owner` field does not
    /// exist on `schema`. This is reported regardless of who the actor is.
    pub fn restriction(
        &self,
        actor: &dyn Identity,
        schema: &Schema,
    ) -> Result<Restriction, ConfigurationError> {
        let constant = |allowed: bool| {
            if allowed {
                Restriction::All
            } else {
                Restriction::Nothing
            }
        };

        Ok(match self {
            Self::Denied => Restriction::Nothing,
            Self::Public => Restriction::All,
            Self::Authenticated | Self::Staff | Self::Superuser => {
                constant(self.check(actor, None, None))
            }
            Self::Capability(_) => constant(self.check(actor, Some(schema.resource_type()), None)),
            Self::Owner(field) => {
                schema.require_field(field)?;
                match actor.subject_id() {
                    Some(subject_id) if actor.is_authenticated() => {
                        Restriction::eq(field.clone(), subject_id)
                    }
                    _ => Restriction::Nothing,
                }
            }
            Self::And(left, right) => {
                let left_r = left.restriction(actor, schema)?;
                let right_r = right.restriction(actor, schema)?;
                Restriction::and(left_r, right_r)
            }
            Self::Or(left, right) => {
                let left_r = left.restriction(actor, schema)?;
                let right_r = right.restriction(actor, schema)?;
                Restriction::or(left_r, right_r)
            }
            Self::Not(inner) => inner.restriction(actor, schema)?.negate(),
        })
    }

    /// Narrow `collection` to the rows `actor` may access.
    ///
    /// # Errors
    /// Returns `ConfigurationError` if the permission cannot be expressed
    /// against the collection's schema.
    pub fn filter<C: Collection>(
        &self,
        actor: &dyn Identity,
        collection: C,
    ) -> Result<C, ConfigurationError> {
        let schema = collection.schema();
        let restriction = self.restriction(actor, schema).inspect_err(|e| {
            warn!(
                resource = %schema.resource_type(),
                error = %e,
                "permission cannot be applied to collection"
            );
        })?;
        debug!(
            resource = %schema.resource_type(),
            restriction = ?restriction,
            fields = ?restriction.fields(),
            "permission restriction built"
        );
        Ok(collection.restrict(restriction))
    }

    /// Structural validation for setup time.
    ///
    /// Checks every leaf without evaluating anything:
    /// - `Capability` actions must be well formed and need a resource type,
    ///   which only `schema` can supply;
    /// - `Owner` fields must exist on `schema` when one is given.
    ///
    /// # Errors
    /// Returns the first `ConfigurationError` found, in left-to-right order.
    pub fn validate(&self, schema: Option<&Schema>) -> Result<(), ConfigurationError> {
        match self {
            Self::Denied | Self::Public | Self::Authenticated | Self::Staff | Self::Superuser => {
                Ok(())
            }
            Self::Capability(action) => {
                validate_action(action)?;
                if schema.is_none() {
                    return Err(ConfigurationError::MissingResourceType {
                        action: action.clone(),
                    });
                }
                Ok(())
            }
            Self::Owner(field) => match schema {
                Some(s) => s.require_field(field),
                None => Ok(()),
            },
            Self::And(left, right) | Self::Or(left, right) => {
                left.validate(schema)?;
                right.validate(schema)
            }
            Self::Not(inner) => inner.validate(schema),
        }
    }
}

impl ops::BitAnd for Permission {
    type Output = Permission;

    fn bitand(self, rhs: Self) -> Self::Output {
        self.and(rhs)
    }
}

impl ops::BitOr for Permission {
    type Output = Permission;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.or(rhs)
    }
}

impl ops::Not for Permission {
    type Output = Permission;

    fn not(self) -> Self::Output {
        self.negate()
    }
}
