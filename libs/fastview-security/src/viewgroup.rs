//! Permission sets for a group of CRUD views over one model.
//!
//! Each view (action) resolves its permission in order:
//! 1. [`Permission::Denied`] if the action is not one of the group's views,
//! 2. the permission set for that view,
//! 3. the permission set for the whole group,
//! 4. [`Permission::Denied`].
//!
//! Everything that can be checked without an actor is checked when the set
//! is built, so typos in action names or owner fields fail at startup rather
//! than denying at request time.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, trace};

use crate::actor::Identity;
use crate::collection::Collection;
use crate::error::ConfigurationError;
use crate::permission::Permission;
use crate::resource::{Record, ResourceType};
use crate::schema::Schema;

/// The list view.
pub const INDEX_VIEW: &str = "index";

/// Views of a model viewgroup, in display order.
pub const DEFAULT_VIEWS: [&str; 5] = [INDEX_VIEW, "detail", "create", "update", "delete"];

/// Views that operate on an existing record.
pub const OBJECT_VIEWS: [&str; 3] = ["detail", "update", "delete"];

static DENIED: Permission = Permission::Denied;

/// Why a view refused access. The view layer maps `LoginRequired` to a login
/// redirect and `Forbidden` to an access-denied response.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AccessDenied {
    #[error("login required")]
    LoginRequired,

    #[error("permission denied for action '{action}'")]
    Forbidden { action: String },
}

#[derive(Clone, Debug)]
pub struct ViewGroupPermissions {
    schema: Option<Schema>,
    views: Vec<String>,
    object_views: BTreeSet<String>,
    permission: Option<Permission>,
    view_permissions: BTreeMap<String, Permission>,
    row_permission: Option<Permission>,
}

impl ViewGroupPermissions {
    #[must_use]
    pub fn builder() -> ViewGroupPermissionsBuilder {
        ViewGroupPermissionsBuilder::default()
    }

    #[must_use]
    pub fn schema(&self) -> Option<&Schema> {
        self.schema.as_ref()
    }

    #[must_use]
    pub fn resource_type(&self) -> Option<&ResourceType> {
        self.schema.as_ref().map(Schema::resource_type)
    }

    pub fn views(&self) -> impl Iterator<Item = &str> {
        self.views.iter().map(String::as_str)
    }

    #[must_use]
    pub fn has_view(&self, action: &str) -> bool {
        self.views.iter().any(|v| v == action)
    }

    /// Permission governing `action`: the view's own, else the group's,
    /// else `Denied`. Actions outside the view list are always `Denied`.
    #[must_use]
    pub fn permission_for(&self, action: &str) -> &Permission {
        if !self.has_view(action) {
            return &DENIED;
        }
        self.view_permissions
            .get(action)
            .or(self.permission.as_ref())
            .unwrap_or(&DENIED)
    }

    /// Extra permission deciding which rows the list view shows.
    #[must_use]
    pub fn row_permission(&self) -> Option<&Permission> {
        self.row_permission.as_ref()
    }

    #[must_use]
    pub fn check(&self, action: &str, actor: &dyn Identity, instance: Option<&dyn Record>) -> bool {
        self.permission_for(action)
            .check(actor, self.resource_type(), instance)
    }

    /// Gate a view.
    ///
    /// # Errors
    /// - `AccessDenied::LoginRequired` if the check fails for an anonymous actor
    /// - `AccessDenied::Forbidden` if it fails for an authenticated one
    pub fn authorize(
        &self,
        action: &str,
        actor: &dyn Identity,
        instance: Option<&dyn Record>,
    ) -> Result<(), AccessDenied> {
        let allowed = self.check(action, actor, instance);
        trace!(
            action,
            allowed,
            authenticated = actor.is_authenticated(),
            "viewgroup access decision"
        );
        if allowed {
            return Ok(());
        }
        if actor.is_authenticated() {
            Err(AccessDenied::Forbidden {
                action: action.to_owned(),
            })
        } else {
            Err(AccessDenied::LoginRequired)
        }
    }

    /// Scope the queryset of `action` to what `actor` may see. The list view
    /// additionally applies the row permission.
    ///
    /// # Errors
    /// Returns `ConfigurationError` if a permission cannot be expressed
    /// against the collection's schema.
    pub fn filter<C: Collection>(
        &self,
        action: &str,
        actor: &dyn Identity,
        collection: C,
    ) -> Result<C, ConfigurationError> {
        let scoped = self.permission_for(action).filter(actor, collection)?;
        match (&self.row_permission, action == INDEX_VIEW) {
            (Some(row_permission), true) => row_permission.filter(actor, scoped),
            _ => Ok(scoped),
        }
    }

    /// Object actions `actor` may perform on `record`, in view order.
    #[must_use]
    pub fn permitted_actions(&self, actor: &dyn Identity, record: &dyn Record) -> Vec<&str> {
        self.views
            .iter()
            .filter(|v| self.object_views.contains(*v))
            .filter(|v| self.check(v, actor, Some(record)))
            .map(String::as_str)
            .collect()
    }
}

pub struct ViewGroupPermissionsBuilder {
    schema: Option<Schema>,
    views: Vec<String>,
    object_views: BTreeSet<String>,
    permission: Option<Permission>,
    view_permissions: BTreeMap<String, Permission>,
    row_permission: Option<Permission>,
}

impl Default for ViewGroupPermissionsBuilder {
    fn default() -> Self {
        Self {
            schema: None,
            views: DEFAULT_VIEWS.iter().map(|v| (*v).to_owned()).collect(),
            object_views: OBJECT_VIEWS.iter().map(|v| (*v).to_owned()).collect(),
            permission: None,
            view_permissions: BTreeMap::new(),
            row_permission: None,
        }
    }
}

impl ViewGroupPermissionsBuilder {
    /// Model the views operate on. Without a schema, capability permissions
    /// are rejected and owner fields go unchecked.
    #[must_use]
    pub fn schema(mut self, schema: Schema) -> Self {
        self.schema = Some(schema);
        self
    }

    /// Replace the set of views, keeping the given order.
    #[must_use]
    pub fn views<I, S>(mut self, views: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.views.clear();
        for view in views {
            let view = view.into();
            if !self.views.contains(&view) {
                self.views.push(view);
            }
        }
        self
    }

    /// Replace the set of views that operate on an existing record.
    #[must_use]
    pub fn object_views<I, S>(mut self, views: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.object_views = views.into_iter().map(Into::into).collect();
        self
    }

    /// Permission for every view without its own.
    #[must_use]
    pub fn permission(mut self, permission: Permission) -> Self {
        self.permission = Some(permission);
        self
    }

    #[must_use]
    pub fn view(mut self, action: impl Into<String>, permission: Permission) -> Self {
        self.view_permissions.insert(action.into(), permission);
        self
    }

    #[must_use]
    pub fn row_permission(mut self, permission: Permission) -> Self {
        self.row_permission = Some(permission);
        self
    }

    /// Validate and build the permission set.
    ///
    /// # Errors
    /// - `UnknownActions` if permissions are set for actions that are not views
    /// - `UnknownField`, `MissingResourceType` or `InvalidAction` from
    ///   [`Permission::validate`] on any configured permission
    pub fn build(self) -> Result<ViewGroupPermissions, ConfigurationError> {
        let unknown: Vec<String> = self
            .view_permissions
            .keys()
            .filter(|action| !self.views.contains(action))
            .cloned()
            .collect();
        if !unknown.is_empty() {
            return Err(ConfigurationError::UnknownActions { actions: unknown });
        }

        let schema = self.schema.as_ref();
        self.permission
            .iter()
            .chain(self.view_permissions.values())
            .chain(self.row_permission.iter())
            .try_for_each(|p| p.validate(schema))?;

        let object_views = self
            .object_views
            .into_iter()
            .filter(|v| self.views.contains(v))
            .collect();

        debug!(
            resource = ?self.schema.as_ref().map(|s| s.resource_type().to_string()),
            views = ?self.views,
            "viewgroup permissions built"
        );

        Ok(ViewGroupPermissions {
            schema: self.schema,
            views: self.views,
            object_views,
            permission: self.permission,
            view_permissions: self.view_permissions,
            row_permission: self.row_permission,
        })
    }
}
