use std::fmt;
use std::str::FromStr;

use crate::error::{ConfigurationError, validate_action};
use crate::resource::ResourceType;

/// A named grant held by an actor.
/// Serializes to format: `"{app_label}.{codename}"`
/// Examples:
///  - `"blog.add_entry"`
///  - `"polls.change_question"`
///
/// Model-level capabilities follow the `{action}_{model}` codename convention,
/// see [`Capability::for_action`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Capability {
    /// Application the capability is registered under, e.g. `"blog"`
    app_label: String,

    /// Codename within the application, e.g. `"add_entry"`
    codename: String,
}

impl Capability {
    #[must_use]
    pub fn new(app_label: impl Into<String>, codename: impl Into<String>) -> Self {
        Self {
            app_label: app_label.into(),
            codename: codename.into(),
        }
    }

    /// The capability required to perform `action` on `resource`:
    /// `"{app}.{action}_{model}"` with app and model lower-cased.
    #[must_use]
    pub fn for_action(resource: &ResourceType, action: &str) -> Self {
        Self {
            app_label: resource.app_label().to_lowercase(),
            codename: format!("{action}_{}", resource.model_name().to_lowercase()),
        }
    }

    #[inline]
    #[must_use]
    pub fn app_label(&self) -> &str {
        &self.app_label
    }

    #[inline]
    #[must_use]
    pub fn codename(&self) -> &str {
        &self.codename
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.app_label, self.codename)
    }
}

impl FromStr for Capability {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some((app_label, codename)) = s.split_once('.') else {
            return Err(ConfigurationError::InvalidCapability(s.to_owned()));
        };
        if app_label.is_empty() || validate_action(codename).is_err() {
            return Err(ConfigurationError::InvalidCapability(s.to_owned()));
        }
        Ok(Self::new(app_label, codename))
    }
}

impl serde::Serialize for Capability {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for Capability {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
