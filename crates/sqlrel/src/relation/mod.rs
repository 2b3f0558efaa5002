//! Lazy, composable query relations.
//!
//! A [`Relation`] accumulates clauses through builder calls that each return a
//! new relation, runs its query at most once when results are first needed,
//! and caches them until [`Relation::reset`] or [`Relation::reload`].

mod dispatch;
mod load;
mod merge;

use std::cell::OnceCell;
use std::fmt;
use std::sync::Arc;

use sqlrel_core::{Entity, Model, Record, Result, Value};
use sqlrel_query::{DeleteStatement, Expr, Join, OrderBy, Predicate, QuerySpec, RecordStore};

pub use dispatch::{Capability, Dispatched, SequenceOp};

/// Whether a relation's query has run.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadState<R> {
    Unmaterialized,
    Materialized(Vec<R>),
}

/// Explicit overrides for [`Relation::spawn`].
///
/// Every field left as `None` is copied from the source relation.
#[derive(Debug, Clone, Default)]
pub struct Spawn {
    pub spec: Option<QuerySpec>,
    pub readonly: Option<Option<bool>>,
    pub eager_load_associations: Option<Vec<String>>,
    pub preload_associations: Option<Vec<String>>,
}

impl Spawn {
    pub fn spec(spec: QuerySpec) -> Self {
        Self {
            spec: Some(spec),
            ..Self::default()
        }
    }
}

/// A deferred query over records of one entity.
pub struct Relation<R: Record> {
    entity: Arc<Entity>,
    store: Arc<dyn RecordStore<R>>,
    spec: QuerySpec,
    eager_load_associations: Vec<String>,
    preload_associations: Vec<String>,
    readonly: Option<bool>,
    state: LoadState<R>,
    table: OnceCell<String>,
    primary_key: OnceCell<String>,
    first: OnceCell<Option<R>>,
    last: OnceCell<Option<R>>,
}

impl<R: Record> Relation<R> {
    /// An unfiltered relation over every record of `entity`.
    pub fn new(entity: Arc<Entity>, store: Arc<dyn RecordStore<R>>) -> Self {
        let spec = QuerySpec::new(entity.table_name.clone());
        Self {
            entity,
            store,
            spec,
            eager_load_associations: Vec::new(),
            preload_associations: Vec::new(),
            readonly: None,
            state: LoadState::Unmaterialized,
            table: OnceCell::new(),
            primary_key: OnceCell::new(),
            first: OnceCell::new(),
            last: OnceCell::new(),
        }
    }

    /// New relation sharing entity and store, with clause and association
    /// state copied unless overridden. Always starts unmaterialized.
    pub fn spawn(&self, overrides: Spawn) -> Self {
        let table = OnceCell::new();
        if let Some(name) = self.table.get() {
            let _ = table.set(name.clone());
        }
        Self {
            entity: Arc::clone(&self.entity),
            store: Arc::clone(&self.store),
            spec: overrides.spec.unwrap_or_else(|| self.spec.clone()),
            eager_load_associations: overrides
                .eager_load_associations
                .unwrap_or_else(|| self.eager_load_associations.clone()),
            preload_associations: overrides
                .preload_associations
                .unwrap_or_else(|| self.preload_associations.clone()),
            readonly: overrides.readonly.unwrap_or(self.readonly),
            state: LoadState::Unmaterialized,
            table,
            primary_key: OnceCell::new(),
            first: OnceCell::new(),
            last: OnceCell::new(),
        }
    }

    fn with_spec(&self, f: impl FnOnce(QuerySpec) -> QuerySpec) -> Self {
        self.spawn(Spawn::spec(f(self.spec.clone())))
    }

    // ==================== Accessors ====================

    pub fn entity(&self) -> &Entity {
        &self.entity
    }

    pub fn spec(&self) -> &QuerySpec {
        &self.spec
    }

    pub fn eager_load_associations(&self) -> &[String] {
        &self.eager_load_associations
    }

    pub fn preload_associations(&self) -> &[String] {
        &self.preload_associations
    }

    /// The readonly flag as set (`None` when never set).
    pub fn readonly_value(&self) -> Option<bool> {
        self.readonly
    }

    /// Table this relation selects from.
    pub fn table(&self) -> &str {
        self.table.get_or_init(|| self.entity.table_name.clone())
    }

    /// Primary key column of the entity.
    pub fn primary_key(&self) -> &str {
        self.primary_key
            .get_or_init(|| self.entity.primary_key.clone())
    }

    /// Whether results are cached.
    pub fn loaded(&self) -> bool {
        matches!(self.state, LoadState::Materialized(_))
    }

    pub fn load_state(&self) -> &LoadState<R> {
        &self.state
    }

    /// Render the SELECT this relation would run.
    pub fn to_sql(&self) -> String {
        self.spec.build(self.store.dialect()).0
    }

    // ==================== Builder ====================

    /// Filter by `column = value`. Array values filter with `IN`, NULL with `IS NULL`.
    pub fn where_eq(&self, column: &str, value: impl Into<Value>) -> Self {
        let predicate = Predicate::condition(&self.qualify(column), value);
        self.with_spec(|spec| spec.filter(predicate))
    }

    /// Filter by several `column = value` pairs.
    pub fn where_all<S, V, I>(&self, pairs: I) -> Self
    where
        S: AsRef<str>,
        V: Into<Value>,
        I: IntoIterator<Item = (S, V)>,
    {
        let predicates: Vec<_> = pairs
            .into_iter()
            .map(|(column, value)| Predicate::condition(&self.qualify(column.as_ref()), value))
            .collect();
        self.with_spec(|mut spec| {
            spec.wheres.extend(predicates);
            spec
        })
    }

    /// Filter by an arbitrary expression. `column = literal` is kept as an
    /// equality predicate.
    pub fn filter(&self, expr: impl Into<Predicate>) -> Self {
        let predicate = expr.into();
        self.with_spec(|spec| spec.filter(predicate))
    }

    pub fn where_raw(&self, sql: impl Into<String>) -> Self {
        let predicate = Predicate::raw(sql);
        self.with_spec(|spec| spec.filter(predicate))
    }

    pub fn joins(&self, join: Join) -> Self {
        self.with_spec(|spec| spec.join(join))
    }

    pub fn joins_raw(&self, sql: impl Into<String>) -> Self {
        self.joins(Join::raw(sql))
    }

    pub fn order(&self, order: OrderBy) -> Self {
        self.with_spec(|spec| spec.order_by(order))
    }

    pub fn order_raw(&self, sql: impl Into<String>) -> Self {
        self.order(OrderBy::raw(sql))
    }

    pub fn group(&self, columns: &[&str]) -> Self {
        self.with_spec(|spec| spec.group_by(columns))
    }

    pub fn select(&self, columns: &[&str]) -> Self {
        self.with_spec(|spec| spec.select(columns))
    }

    pub fn limit(&self, n: u64) -> Self {
        self.with_spec(|spec| spec.limit(n))
    }

    pub fn offset(&self, n: u64) -> Self {
        self.with_spec(|spec| spec.offset(n))
    }

    pub fn from(&self, sources: &[&str]) -> Self {
        self.with_spec(|spec| spec.from_sources(sources))
    }

    /// Join-load associations (appended in order).
    pub fn eager_load(&self, names: &[&str]) -> Self {
        let mut eager = self.eager_load_associations.clone();
        eager.extend(names.iter().map(|n| (*n).to_string()));
        self.spawn(Spawn {
            eager_load_associations: Some(eager),
            ..Spawn::default()
        })
    }

    /// Load associations with separate queries after the primary fetch.
    pub fn preload(&self, names: &[&str]) -> Self {
        let mut preload = self.preload_associations.clone();
        preload.extend(names.iter().map(|n| (*n).to_string()));
        self.spawn(Spawn {
            preload_associations: Some(preload),
            ..Spawn::default()
        })
    }

    pub fn readonly(&self, flag: bool) -> Self {
        self.spawn(Spawn {
            readonly: Some(Some(flag)),
            ..Spawn::default()
        })
    }

    fn qualify(&self, column: &str) -> String {
        if column.contains('.') {
            column.to_string()
        } else {
            format!("{}.{}", self.table(), column)
        }
    }

    // ==================== Sizing ====================

    /// Number of records: the cached length when loaded, otherwise a COUNT query.
    pub fn size(&self) -> Result<u64> {
        if let LoadState::Materialized(records) = &self.state {
            return Ok(records.len() as u64);
        }
        let (sql, params) = self.spec.build_count(self.store.dialect());
        tracing::trace!(sql = %sql, params = params.len(), "Counting records");
        self.store.count(&self.entity, &sql, &params)
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.size()? == 0)
    }

    /// Whether any record exists, without materializing.
    pub fn any(&self) -> Result<bool> {
        Ok(!self.is_empty()?)
    }

    /// Whether any record satisfies `predicate`. Materializes.
    pub fn any_matching(&mut self, predicate: impl FnMut(&R) -> bool) -> Result<bool> {
        Ok(self.to_a()?.iter().any(predicate))
    }

    /// Whether more than one record exists.
    ///
    /// A limited relation is materialized so the limit is honored; otherwise
    /// this counts.
    pub fn many(&mut self) -> Result<bool> {
        if self.spec.has_limit() {
            return Ok(self.to_a()?.len() > 1);
        }
        Ok(self.size()? > 1)
    }

    /// Whether more than one record satisfies `predicate`. Materializes.
    pub fn many_matching(&mut self, mut predicate: impl FnMut(&R) -> bool) -> Result<bool> {
        Ok(self.to_a()?.iter().filter(|r| predicate(*r)).take(2).count() > 1)
    }

    // ==================== Sequence pass-through ====================

    pub fn length(&mut self) -> Result<usize> {
        Ok(self.to_a()?.len())
    }

    pub fn each(&mut self, f: impl FnMut(&R)) -> Result<()> {
        self.to_a()?.iter().for_each(f);
        Ok(())
    }

    pub fn map<T>(&mut self, f: impl FnMut(&R) -> T) -> Result<Vec<T>> {
        Ok(self.to_a()?.iter().map(f).collect())
    }

    pub fn collect<T>(&mut self, f: impl FnMut(&R) -> T) -> Result<Vec<T>> {
        self.map(f)
    }

    /// Whether every record satisfies `predicate`.
    pub fn all(&mut self, predicate: impl FnMut(&R) -> bool) -> Result<bool> {
        Ok(self.to_a()?.iter().all(predicate))
    }

    pub fn iter_records(&mut self) -> Result<std::slice::Iter<'_, R>> {
        Ok(self.to_a()?.iter())
    }

    // ==================== First / last ====================

    /// First record: from the cache when loaded, otherwise fetched with
    /// `LIMIT 1` and memoized until reset.
    pub fn first(&self) -> Result<Option<&R>> {
        if let LoadState::Materialized(records) = &self.state {
            return Ok(records.first());
        }
        if self.first.get().is_none() {
            let record = self.limit(1).fetch_single()?;
            let _ = self.first.set(record);
        }
        Ok(self.first.get().and_then(Option::as_ref))
    }

    /// Last record: from the cache when loaded, otherwise fetched with the
    /// ordering reversed (primary key descending when unordered).
    pub fn last(&self) -> Result<Option<&R>> {
        if let LoadState::Materialized(records) = &self.state {
            return Ok(records.last());
        }
        if self.last.get().is_none() {
            let record = self.reverse_order().limit(1).fetch_single()?;
            let _ = self.last.set(record);
        }
        Ok(self.last.get().and_then(Option::as_ref))
    }

    /// Same relation with every ORDER BY term reversed.
    pub fn reverse_order(&self) -> Self {
        let order = if self.spec.order.is_empty() {
            vec![Expr::qualified(self.table(), self.primary_key()).desc()]
        } else {
            self.spec.order.iter().map(OrderBy::reverse).collect()
        };
        self.with_spec(|mut spec| {
            spec.order = order;
            spec
        })
    }

    fn fetch_single(mut self) -> Result<Option<R>> {
        self.load()?;
        Ok(self.take_records().into_iter().next())
    }

    // ==================== Mutation ====================

    /// Destroy every record in order through the store, then reset.
    ///
    /// Stops at the first failure: earlier destroys stand and the cache is
    /// left as it was.
    #[tracing::instrument(level = "debug", skip(self), fields(entity = %self.entity.name))]
    pub fn destroy_all(&mut self) -> Result<Vec<R>> {
        self.load()?;
        for record in self.cached() {
            self.store.destroy(&self.entity, record)?;
        }
        let destroyed = self.take_records();
        tracing::debug!(count = destroyed.len(), "Destroyed records");
        self.reset();
        Ok(destroyed)
    }

    /// Bulk delete matching rows without instantiating them, then reset.
    #[tracing::instrument(level = "debug", skip(self), fields(entity = %self.entity.name))]
    pub fn delete_all(&mut self) -> Result<u64> {
        let (sql, params) =
            DeleteStatement::from_spec(&self.spec).build_with_dialect(self.store.dialect());
        tracing::trace!(sql = %sql, params = params.len(), "Deleting records");
        let deleted = self.store.delete_all(&self.entity, &sql, &params)?;
        tracing::debug!(deleted, "Deleted records");
        self.reset();
        Ok(deleted)
    }

    /// Delete by primary key; an array value deletes every listed id.
    pub fn delete(&self, id_or_ids: impl Into<Value>) -> Result<u64> {
        let pk = self.primary_key().to_string();
        self.where_eq(&pk, id_or_ids).delete_all()
    }

    // ==================== Lifecycle ====================

    /// Drop the cache so the next read queries again.
    pub fn reload(&mut self) -> &mut Self {
        tracing::debug!(entity = %self.entity.name, "Reloading relation");
        self.state = LoadState::Unmaterialized;
        self.reset()
    }

    /// Clear cached records and memoized first/last.
    pub fn reset(&mut self) -> &mut Self {
        self.state = LoadState::Unmaterialized;
        self.first.take();
        self.last.take();
        self
    }

    fn cached(&self) -> &[R] {
        match &self.state {
            LoadState::Materialized(records) => records,
            LoadState::Unmaterialized => &[],
        }
    }

    fn take_records(&mut self) -> Vec<R> {
        match std::mem::replace(&mut self.state, LoadState::Unmaterialized) {
            LoadState::Materialized(records) => records,
            LoadState::Unmaterialized => Vec::new(),
        }
    }
}

impl<M: Model> Relation<M> {
    /// A relation over a statically described model.
    pub fn of_model(store: Arc<dyn RecordStore<M>>) -> Self {
        Self::new(Arc::new(M::entity()), store)
    }
}

impl<R: Record> fmt::Debug for Relation<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Relation")
            .field("entity", &self.entity.name)
            .field("spec", &self.spec)
            .field("eager_load_associations", &self.eager_load_associations)
            .field("preload_associations", &self.preload_associations)
            .field("readonly", &self.readonly)
            .field("loaded", &self.loaded())
            .finish_non_exhaustive()
    }
}
