use fastview_security::{Collection, Identity, Permission, Restriction, Schema};
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter};
use tracing::warn;

use crate::cond::{build_restriction_condition, deny_all};
use crate::error::DbError;
use crate::field_map::FieldMap;

/// A lazy `SeaORM` select usable as a permission [`Collection`].
///
/// Restrictions become `WHERE` conditions; nothing runs until one of the
/// async executors is awaited.
///
/// # Example
/// ```rust,ignore
/// use fastview_db::EntityCollectionExt;
///
/// let entries = entry::Entity::find()
///     .collection(field_map)
///     .permitted(&permission, &actor)?
///     .all(conn)
///     .await?;
/// ```
#[must_use]
#[derive(Clone)]
pub struct EntityCollection<E: EntityTrait> {
    inner: sea_orm::Select<E>,
    fields: FieldMap<E>,
}

/// Turn a `SeaORM` select into an [`EntityCollection`].
pub trait EntityCollectionExt<E: EntityTrait>: Sized {
    fn collection(self, fields: FieldMap<E>) -> EntityCollection<E>;
}

impl<E> EntityCollectionExt<E> for sea_orm::Select<E>
where
    E: EntityTrait,
{
    fn collection(self, fields: FieldMap<E>) -> EntityCollection<E> {
        EntityCollection {
            inner: self,
            fields,
        }
    }
}

impl<E> Collection for EntityCollection<E>
where
    E: EntityTrait,
    E::Column: ColumnTrait + Copy,
{
    fn schema(&self) -> &Schema {
        self.fields.schema()
    }

    fn restrict(self, restriction: Restriction) -> Self {
        if restriction.is_all() {
            return self;
        }
        let cond = build_restriction_condition(&restriction, &self.fields).unwrap_or_else(|e| {
            warn!(
                resource = %self.fields.schema().resource_type(),
                error = %e,
                "restriction references an unmapped column; denying all rows"
            );
            deny_all()
        });
        self.filter(cond)
    }
}

impl<E> EntityCollection<E>
where
    E: EntityTrait,
    E::Column: ColumnTrait + Copy,
{
    /// Narrow to the rows `actor` may access under `permission`.
    ///
    /// # Errors
    /// Returns `DbError::Configuration` if the permission references a field
    /// the field map does not know.
    pub fn permitted(self, permission: &Permission, actor: &dyn Identity) -> Result<Self, DbError> {
        Ok(permission.filter(actor, self)?)
    }
}

impl<E> EntityCollection<E>
where
    E: EntityTrait,
{
    /// Execute the query and return all matching results.
    ///
    /// # Errors
    /// Returns `DbError::Db` if the database query fails.
    pub async fn all<C>(self, conn: &C) -> Result<Vec<E::Model>, DbError>
    where
        C: ConnectionTrait + Send + Sync,
    {
        Ok(self.inner.all(conn).await?)
    }

    /// Execute the query and return at most one result.
    ///
    /// # Errors
    /// Returns `DbError::Db` if the database query fails.
    pub async fn one<C>(self, conn: &C) -> Result<Option<E::Model>, DbError>
    where
        C: ConnectionTrait + Send + Sync,
    {
        Ok(self.inner.one(conn).await?)
    }

    /// Execute the query and return the number of matching results.
    ///
    /// # Errors
    /// Returns `DbError::Db` if the database query fails.
    pub async fn count<C>(self, conn: &C) -> Result<u64, DbError>
    where
        C: ConnectionTrait + Send + Sync,
        E::Model: sea_orm::FromQueryResult + Send + Sync,
    {
        Ok(self.inner.count(conn).await?)
    }

    /// Add a plain `SeaORM` condition alongside the permission restrictions.
    pub fn filter(mut self, filter: sea_orm::Condition) -> Self {
        self.inner = QueryFilter::filter(self.inner, filter);
        self
    }
}
