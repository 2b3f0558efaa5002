//! Materialization.

use sqlrel_core::{Error, Record, Result};
use sqlrel_query::{EagerFetch, JoinDependency};

use super::{LoadState, Relation};

impl<R: Record> Relation<R> {
    /// The relation's records, running the query on first access.
    ///
    /// Once loaded, later calls return the cache without touching the store.
    pub fn to_a(&mut self) -> Result<&[R]> {
        self.load()?;
        Ok(self.cached())
    }

    pub(super) fn load(&mut self) -> Result<()> {
        if self.loaded() {
            return Ok(());
        }
        let records = self.fetch()?;
        self.state = LoadState::Materialized(records);
        Ok(())
    }

    #[tracing::instrument(level = "debug", skip(self), fields(entity = %self.entity.name))]
    fn fetch(&self) -> Result<Vec<R>> {
        for association in &self.preload_associations {
            if self.entity.find_association(association).is_none() {
                return Err(Error::UnknownAssociation {
                    entity: self.entity.name.clone(),
                    association: association.clone(),
                });
            }
        }

        let dialect = self.store.dialect();
        let mut records = if self.eager_load_associations.is_empty() {
            let (sql, params) = self.spec.build(dialect);
            tracing::trace!(sql = %sql, params = params.len(), "Fetching records");
            self.store.find_by_sql(&self.entity, &sql, &params)?
        } else {
            let dependency = JoinDependency::new(&self.entity, &self.eager_load_associations)?;
            let fetch = EagerFetch::new(&self.spec, dependency, dialect);
            tracing::trace!(
                associations = ?self.eager_load_associations,
                conditions = ?fetch.conditions,
                "Fetching records with associations"
            );
            match self.store.find_with_associations(&self.entity, &fetch) {
                Ok(records) => records,
                Err(Error::NoRootMatches) => {
                    tracing::warn!(
                        entity = %self.entity.name,
                        "Association loader matched no root records, treating as empty"
                    );
                    Vec::new()
                }
                Err(e) => return Err(e),
            }
        };

        for association in &self.preload_associations {
            self.store.preload(&self.entity, &mut records, association)?;
        }

        if self.readonly == Some(true) {
            records.iter_mut().for_each(R::mark_readonly);
        }

        tracing::debug!(count = records.len(), "Relation materialized");
        Ok(records)
    }
}
