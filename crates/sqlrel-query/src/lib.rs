//! Query specification and SQL rendering for sqlrel.
//!
//! `sqlrel-query` holds the structural side of a relation:
//!
//! - [`Predicate`] and [`Expr`] for WHERE conditions
//! - clause types ([`OrderBy`], [`Limit`], [`Offset`], [`Join`])
//! - [`QuerySpec`], the immutable clause snapshot, and its renderer
//! - [`JoinDependency`] / [`EagerFetch`] for association-aware fetches
//! - [`DeleteStatement`] for bulk deletes
//! - the [`RecordStore`] trait relations execute through

pub mod builder;
pub mod clause;
pub mod eager;
pub mod expr;
pub mod join;
pub mod predicate;
pub mod spec;
pub mod store;

pub use builder::DeleteStatement;
pub use clause::{Limit, Offset, OrderBy, OrderDirection};
pub use eager::{EagerFetch, JoinDependency};
pub use expr::{BinaryOp, Dialect, Expr};
pub use join::{Join, JoinType};
pub use predicate::Predicate;
pub use spec::{ClauseValue, QuerySpec, SpecAccessor};
pub use store::RecordStore;
