//! The record store seam.
//!
//! Relations never talk to a database directly. Every fetch, count and
//! mutation goes through a [`RecordStore`] supplied by the caller, which also
//! decides the SQL dialect statements are rendered in.

use sqlrel_core::{Entity, Record, Result, Value};

use crate::eager::EagerFetch;
use crate::expr::Dialect;

/// Execution backend for relations over records of type `R`.
pub trait RecordStore<R: Record> {
    /// Placeholder and quoting style used when rendering statements.
    fn dialect(&self) -> Dialect {
        Dialect::default()
    }

    /// Run a SELECT and instantiate its rows.
    fn find_by_sql(&self, entity: &Entity, sql: &str, params: &[Value]) -> Result<Vec<R>>;

    /// Run a COUNT query.
    fn count(&self, entity: &Entity, sql: &str, params: &[Value]) -> Result<u64>;

    /// Fetch root records together with joined associations.
    ///
    /// May return [`sqlrel_core::Error::NoRootMatches`] when no root record
    /// matched.
    fn find_with_associations(&self, entity: &Entity, fetch: &EagerFetch) -> Result<Vec<R>>;

    /// Load one association for every record in `records` with separate queries.
    fn preload(&self, entity: &Entity, records: &mut [R], association: &str) -> Result<()>;

    /// Destroy one record, running its per-record side effects.
    fn destroy(&self, entity: &Entity, record: &R) -> Result<()>;

    /// Execute a bulk DELETE, returning the number of rows removed.
    fn delete_all(&self, entity: &Entity, sql: &str, params: &[Value]) -> Result<u64>;

    /// Instantiate an unsaved record from attribute values.
    fn build(&self, entity: &Entity, attributes: &[(String, Value)]) -> Result<R>;

    /// Instantiate and persist a record from attribute values.
    fn create(&self, entity: &Entity, attributes: &[(String, Value)]) -> Result<R>;
}
