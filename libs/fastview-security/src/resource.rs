use std::fmt;
use std::str::FromStr;

use uuid::Uuid;

use crate::error::ConfigurationError;

/// Identifies a model: the application it belongs to and its name.
///
/// Displays and parses as `"app_label.ModelName"`. Capability names are built
/// from the lower-cased form, see [`Capability::for_action`](crate::capability::Capability::for_action).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceType {
    app_label: String,
    model_name: String,
}

impl ResourceType {
    #[must_use]
    pub fn new(app_label: impl Into<String>, model_name: impl Into<String>) -> Self {
        Self {
            app_label: app_label.into(),
            model_name: model_name.into(),
        }
    }

    #[inline]
    #[must_use]
    pub fn app_label(&self) -> &str {
        &self.app_label
    }

    #[inline]
    #[must_use]
    pub fn model_name(&self) -> &str {
        &self.model_name
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.app_label, self.model_name)
    }
}

impl FromStr for ResourceType {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('.') {
            Some((app, model))
                if !app.is_empty() && !model.is_empty() && !model.contains('.') =>
            {
                Ok(Self::new(app, model))
            }
            _ => Err(ConfigurationError::InvalidResourceType(s.to_owned())),
        }
    }
}

impl serde::Serialize for ResourceType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for ResourceType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A concrete record that permissions can be checked against.
///
/// Implemented by whatever the storage layer hands back for a single row.
pub trait Record {
    /// The model this record is an instance of.
    fn resource_type(&self) -> ResourceType;

    /// Value of a foreign-key field identifying another actor or record.
    ///
    /// Returns `None` when the field is null or not present on this record.
    fn field_value(&self, field: &str) -> Option<Uuid>;
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn display_keeps_model_case() {
        let rt = ResourceType::new("Blog", "BlogEntry");
        assert_eq!(rt.to_string(), "Blog.BlogEntry");
    }

    #[test]
    fn parse_resource_type() {
        let rt: ResourceType = "blog.Entry".parse().unwrap();
        assert_eq!(rt.app_label(), "blog");
        assert_eq!(rt.model_name(), "Entry");
    }

    #[test]
    fn parse_rejects_malformed_labels() {
        for bad in ["blog", ".Entry", "blog.", "a.b.c", ""] {
            assert_eq!(
                bad.parse::<ResourceType>(),
                Err(ConfigurationError::InvalidResourceType(bad.to_owned())),
                "{bad}"
            );
        }
    }

    #[test]
    fn serde_uses_label_string() {
        let rt = ResourceType::new("polls", "Question");
        let json = serde_json::to_string(&rt).unwrap();
        assert_eq!(json, r#""polls.Question""#);
        let back: ResourceType = serde_json::from_str(&json).unwrap();
        assert_eq!(back, rt);
    }
}
