//! sqlrel: lazy, composable query relations.
//!
//! A [`Relation`] describes a query over one [`Entity`] without running it.
//! Builder calls return new relations, two relations can be [merged](Relation::merge),
//! and results are fetched through a caller-supplied [`RecordStore`] the first
//! time they are needed, then cached.
//!
//! ```ignore
//! let active = Relation::<Hero>::of_model(store.clone())
//!     .where_eq("active", true)
//!     .order_raw("name");
//! let recent = Relation::<Hero>::of_model(store).limit(5);
//!
//! let mut merged = active.merge(&recent)?;
//! for hero in merged.to_a()? {
//!     println!("{}", hero.name);
//! }
//!
//! // Resolved by name at runtime.
//! let ann = merged.dispatch("find_by_name_and_age", &[Value::from("Ann"), Value::from(30)])?;
//! ```
//!
//! Operations unknown to a relation fail with [`Error::UnknownOperation`];
//! [`Relation::responds_to`] reports the same answer ahead of time.

pub mod finder;
pub mod relation;

pub use sqlrel_core::{
    AssociationInfo, AssociationKind, Attribute, Column, Entity, Error, FieldInfo, LinkTable,
    LinkTableInfo, Model, QueryError, QueryErrorKind, Record, RelationshipInfo, Result, Schema,
    SchemaError, SchemaErrorKind, SqlType, TypeError, Value,
};
pub use sqlrel_query::{
    BinaryOp, ClauseValue, DeleteStatement, Dialect, EagerFetch, Expr, Join, JoinDependency,
    JoinType, Limit, Offset, OrderBy, OrderDirection, Predicate, QuerySpec, RecordStore,
    SpecAccessor,
};

pub use finder::{AttributeConstraints, DynamicMatch, FinderKind, ScopeKind};
pub use relation::{Capability, Dispatched, LoadState, Relation, SequenceOp, Spawn};

/// Commonly used items.
pub mod prelude {
    pub use crate::{
        Dialect, Dispatched, Entity, Error, Expr, Join, Model, OrderBy, Predicate, Record,
        RecordStore, Relation, Result, Value,
    };
}
