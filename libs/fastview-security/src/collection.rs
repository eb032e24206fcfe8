use crate::restriction::Restriction;
use crate::schema::Schema;

/// A lazily evaluated set of rows that can be narrowed by a [`Restriction`].
///
/// Implemented by the storage layer. `restrict` must be a pure derivation:
/// it composes the restriction with whatever the collection already carries
/// (as an AND) and must not materialize rows. Callers that need the original
/// collection keep a clone.
pub trait Collection: Sized {
    /// Shape of the rows in this collection.
    fn schema(&self) -> &Schema;

    /// Narrow this collection to the rows matching `restriction`.
    #[must_use]
    fn restrict(self, restriction: Restriction) -> Self;
}
