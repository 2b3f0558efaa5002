//! Record and Model traits.

use crate::entity::Entity;
use crate::field::FieldInfo;
use crate::relationship::RelationshipInfo;

/// A materialized record a relation can hand back to callers.
pub trait Record {
    /// Mark this record immutable. Called on every fetched record of a
    /// readonly relation.
    fn mark_readonly(&mut self);

    /// Whether the record has been marked immutable.
    fn is_readonly(&self) -> bool;
}

/// A record type with statically known entity metadata.
///
/// Implementing `Model` lets a relation be constructed from the type alone
/// instead of an explicit [`Entity`].
pub trait Model: Record + Sized {
    /// The entity name used in errors and logging.
    const ENTITY_NAME: &'static str;

    /// The name of the database table.
    const TABLE_NAME: &'static str;

    /// The primary key column name.
    const PRIMARY_KEY: &'static str = "id";

    /// Relationship metadata for this model.
    const RELATIONSHIPS: &'static [RelationshipInfo] = &[];

    /// Get field metadata for all columns.
    fn fields() -> &'static [FieldInfo];

    /// Owned entity metadata for this model.
    fn entity() -> Entity {
        Entity::of::<Self>()
    }
}
