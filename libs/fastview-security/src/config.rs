//! Declarative viewgroup permissions.
//!
//! Permissions live under the `fastview` key of the application config:
//!
//! ```yaml
//! fastview:
//!   viewgroups:
//!     entry:
//!       resource: blog.Entry
//!       fields: [author, blog__owner]
//!       permission: authenticated
//!       permissions:
//!         create: { capability: add }
//!         update: { or: [{ owner: author }, staff] }
//!         delete: superuser
//!       row_permission: { owner: blog__owner }
//! ```
//!
//! Any value can be overridden from the environment with the `FASTVIEW__`
//! prefix and `__` as the path separator, e.g.
//! `FASTVIEW__VIEWGROUPS__ENTRY__PERMISSION=staff`.

use std::collections::BTreeMap;
use std::path::Path;

use figment::Figment;
use figment::providers::{Env, Format, Yaml};
use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;
use crate::permission::Permission;
use crate::resource::ResourceType;
use crate::schema::Schema;
use crate::viewgroup::ViewGroupPermissions;

/// Top-level config key.
pub const CONFIG_KEY: &str = "fastview";

/// Environment variable prefix for overrides.
pub const ENV_PREFIX: &str = "FASTVIEW__";

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("failed to load permissions config: {0}")]
    Load(#[from] Box<figment::Error>),

    #[error("viewgroup '{viewgroup}': invalid resource '{resource}'")]
    InvalidResource {
        viewgroup: String,
        resource: String,
        #[source]
        source: ConfigurationError,
    },

    #[error("viewgroup '{viewgroup}': {source}")]
    Invalid {
        viewgroup: String,
        #[source]
        source: ConfigurationError,
    },
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Load(Box::new(err))
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PermissionsConfig {
    pub viewgroups: BTreeMap<String, ViewGroupConfig>,
}

/// One viewgroup. Without `views` the default CRUD set is used.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ViewGroupConfig {
    /// Model as `"app.Model"`.
    pub resource: Option<String>,
    /// Fields owner permissions may reference.
    pub fields: Vec<String>,
    pub views: Option<Vec<String>>,
    pub object_views: Option<Vec<String>>,
    pub permission: Option<Permission>,
    pub permissions: BTreeMap<String, Permission>,
    pub row_permission: Option<Permission>,
}

impl PermissionsConfig {
    /// Extract the `fastview` section from an already assembled figment.
    /// A missing section yields an empty config.
    ///
    /// # Errors
    /// Returns `ConfigError::Load` if the section does not deserialize.
    pub fn from_figment(figment: &Figment) -> Result<Self, ConfigError> {
        if !figment.contains(CONFIG_KEY) {
            return Ok(Self::default());
        }
        Ok(figment.extract_inner(CONFIG_KEY)?)
    }

    /// # Errors
    /// Returns `ConfigError::Load` on malformed YAML or config shape.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        Self::from_figment(&Figment::new().merge(Yaml::string(yaml)))
    }

    /// Read a YAML file, then apply `FASTVIEW__` environment overrides.
    ///
    /// # Errors
    /// Returns `ConfigError::Load` if the file is unreadable or malformed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let figment = Figment::new()
            .merge(Yaml::file(path))
            .merge(
                Env::prefixed(ENV_PREFIX)
                    .split("__")
                    .map(|key| format!("{CONFIG_KEY}.{}", key.as_str()).into()),
            );
        Self::from_figment(&figment)
    }

    /// Validate every viewgroup and build its permission set.
    ///
    /// # Errors
    /// Returns the first viewgroup that fails validation.
    pub fn build(&self) -> Result<BTreeMap<String, ViewGroupPermissions>, ConfigError> {
        self.viewgroups
            .iter()
            .map(|(name, group)| Ok((name.clone(), group.build(name)?)))
            .collect()
    }
}

impl ViewGroupConfig {
    fn schema(&self, viewgroup: &str) -> Result<Option<Schema>, ConfigError> {
        let Some(resource) = &self.resource else {
            return Ok(None);
        };
        let resource_type: ResourceType =
            resource
                .parse()
                .map_err(|source| ConfigError::InvalidResource {
                    viewgroup: viewgroup.to_owned(),
                    resource: resource.clone(),
                    source,
                })?;
        Ok(Some(
            Schema::new(resource_type).with_fields(self.fields.iter().cloned()),
        ))
    }

    /// Build the permission set for the viewgroup named `viewgroup`.
    ///
    /// # Errors
    /// - `ConfigError::InvalidResource` if `resource` is not `"app.Model"`
    /// - `ConfigError::Invalid` if the permissions do not validate
    pub fn build(&self, viewgroup: &str) -> Result<ViewGroupPermissions, ConfigError> {
        let mut builder = ViewGroupPermissions::builder();
        if let Some(schema) = self.schema(viewgroup)? {
            builder = builder.schema(schema);
        }
        if let Some(views) = &self.views {
            builder = builder.views(views.iter().cloned());
        }
        if let Some(object_views) = &self.object_views {
            builder = builder.object_views(object_views.iter().cloned());
        }
        if let Some(permission) = &self.permission {
            builder = builder.permission(permission.clone());
        }
        for (action, permission) in &self.permissions {
            builder = builder.view(action.clone(), permission.clone());
        }
        if let Some(row_permission) = &self.row_permission {
            builder = builder.row_permission(row_permission.clone());
        }
        builder.build().map_err(|source| ConfigError::Invalid {
            viewgroup: viewgroup.to_owned(),
            source,
        })
    }
}
