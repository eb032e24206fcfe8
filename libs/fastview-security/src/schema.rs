use std::collections::BTreeSet;

use crate::error::ConfigurationError;
use crate::resource::ResourceType;

/// Shape of the rows in a collection: their resource type and the fields a
/// restriction may reference.
///
/// Field names may be lookup paths (e.g. `"blog__owner"`) when the storage
/// layer resolves related fields; the schema only checks names.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Schema {
    resource_type: ResourceType,
    fields: BTreeSet<String>,
}

impl Schema {
    #[must_use]
    pub fn new(resource_type: ResourceType) -> Self {
        Self {
            resource_type,
            fields: BTreeSet::new(),
        }
    }

    #[must_use]
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.fields.insert(field.into());
        self
    }

    #[must_use]
    pub fn with_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields.extend(fields.into_iter().map(Into::into));
        self
    }

    #[inline]
    #[must_use]
    pub fn resource_type(&self) -> &ResourceType {
        &self.resource_type
    }

    #[must_use]
    pub fn has_field(&self, field: &str) -> bool {
        self.fields.contains(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(String::as_str)
    }

    /// Ensure `field` exists on this schema.
    ///
    /// # Errors
    /// Returns `ConfigurationError::UnknownField` if it does not.
    pub fn require_field(&self, field: &str) -> Result<(), ConfigurationError> {
        if self.has_field(field) {
            return Ok(());
        }
        Err(ConfigurationError::UnknownField {
            resource: self.resource_type.to_string(),
            field: field.to_owned(),
        })
    }
}
