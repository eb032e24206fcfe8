use std::collections::HashMap;

use fastview_security::{ConfigurationError, ResourceType, Schema};
use sea_orm::EntityTrait;

/// Maps permission field names to entity columns.
///
/// The registered names double as the [`Schema`] of the collection, so owner
/// permissions are validated against exactly the columns that can be queried.
#[derive(Clone)]
#[must_use]
pub struct FieldMap<E: EntityTrait> {
    schema: Schema,
    map: HashMap<String, E::Column>,
}

impl<E: EntityTrait> FieldMap<E> {
    pub fn new(resource_type: ResourceType) -> Self {
        Self {
            schema: Schema::new(resource_type),
            map: HashMap::new(),
        }
    }

    pub fn insert(mut self, name: impl Into<String>, col: E::Column) -> Self {
        let name = name.into();
        self.schema = self.schema.with_field(name.clone());
        self.map.insert(name, col);
        self
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<E::Column> {
        self.map.get(name).copied()
    }

    /// Column for `name`.
    ///
    /// # Errors
    /// Returns `ConfigurationError::UnknownField` if `name` is not mapped.
    pub fn column(&self, name: &str) -> Result<E::Column, ConfigurationError> {
        self.get(name).ok_or_else(|| ConfigurationError::UnknownField {
            resource: self.schema.resource_type().to_string(),
            field: name.to_owned(),
        })
    }

    #[inline]
    #[must_use]
    pub fn schema(&self) -> &Schema {
        &self.schema
    }
}
