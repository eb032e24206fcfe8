//! In-memory collection backed by a shared row vector.
//!
//! Restrictions accumulate on the collection and are only applied while
//! iterating, so restricting is cheap and never copies rows.

use std::collections::BTreeMap;
use std::sync::Arc;

use uuid::Uuid;

use crate::collection::Collection;
use crate::resource::{Record, ResourceType};
use crate::restriction::Restriction;
use crate::schema::Schema;

/// A simple record: an id, its resource type and a set of foreign-key fields.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Row {
    id: Uuid,
    resource_type: ResourceType,
    fields: BTreeMap<String, Option<Uuid>>,
}

impl Row {
    #[must_use]
    pub fn new(resource_type: ResourceType, id: Uuid) -> Self {
        Self {
            id,
            resource_type,
            fields: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_field(mut self, field: impl Into<String>, value: Uuid) -> Self {
        self.fields.insert(field.into(), Some(value));
        self
    }

    #[must_use]
    pub fn with_null(mut self, field: impl Into<String>) -> Self {
        self.fields.insert(field.into(), None);
        self
    }

    #[inline]
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }
}

impl Record for Row {
    fn resource_type(&self) -> ResourceType {
        self.resource_type.clone()
    }

    fn field_value(&self, field: &str) -> Option<Uuid> {
        self.fields.get(field).copied().flatten()
    }
}

/// Anything stored in a [`MemoryCollection`] needs an identity so callers
/// can ask whether a given row survived filtering.
pub trait Identified {
    fn id(&self) -> Uuid;
}

impl Identified for Row {
    fn id(&self) -> Uuid {
        self.id
    }
}

#[derive(Clone, Debug)]
pub struct MemoryCollection<R> {
    schema: Schema,
    rows: Arc<Vec<R>>,
    restriction: Restriction,
}

impl<R: Record> MemoryCollection<R> {
    #[must_use]
    pub fn new(schema: Schema, rows: Vec<R>) -> Self {
        Self {
            schema,
            rows: Arc::new(rows),
            restriction: Restriction::All,
        }
    }

    /// The restriction accumulated so far.
    #[inline]
    #[must_use]
    pub fn restriction(&self) -> &Restriction {
        &self.restriction
    }

    /// Iterate over the rows that match the accumulated restriction.
    pub fn iter(&self) -> impl Iterator<Item = &R> {
        self.rows.iter().filter(|row| self.restriction.matches(*row))
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.iter().count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    /// All rows, ignoring the restriction.
    #[must_use]
    pub fn unrestricted(&self) -> &[R] {
        &self.rows
    }
}

impl<R: Record + Identified> MemoryCollection<R> {
    #[must_use]
    pub fn contains(&self, id: Uuid) -> bool {
        self.iter().any(|row| row.id() == id)
    }

    #[must_use]
    pub fn ids(&self) -> Vec<Uuid> {
        self.iter().map(Identified::id).collect()
    }
}

impl<R: Record> Collection for MemoryCollection<R> {
    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn restrict(mut self, restriction: Restriction) -> Self {
        self.restriction = Restriction::and(self.restriction, restriction);
        self
    }
}
