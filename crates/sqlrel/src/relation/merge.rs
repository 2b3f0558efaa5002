//! Combining two relations over the same entity.

use std::ops::BitAnd;

use sqlrel_core::{Error, Record, Result};
use sqlrel_query::QuerySpec;

use super::{Relation, Spawn};

impl<R: Record> Relation<R> {
    /// Merge `other` into this relation.
    ///
    /// - Joins, grouping and ordering from both are appended, this relation's first.
    /// - Limit, offset, select list and sources are taken from `other`, even
    ///   when `other` leaves them unset.
    /// - Eager-load and preload lists are concatenated; readonly comes from `other`.
    /// - WHERE predicates start from this relation's; each of `other`'s is
    ///   appended in order, and an equality predicate first drops every
    ///   accumulated equality on the same column.
    ///
    /// Fails with `TypeMismatch` if the relations are over different entities.
    #[tracing::instrument(
        level = "debug",
        skip(self, other),
        fields(entity = %self.entity.name, other = %other.entity.name)
    )]
    pub fn merge(&self, other: &Relation<R>) -> Result<Relation<R>> {
        if self.entity.name != other.entity.name {
            return Err(Error::TypeMismatch {
                expected: self.entity.name.clone(),
                found: other.entity.name.clone(),
            });
        }

        let mut spec = QuerySpec::new(self.table());
        for source in [&self.spec, &other.spec] {
            spec.joins.extend(source.joins.iter().cloned());
            spec.group.extend(source.group.iter().cloned());
            spec.order.extend(source.order.iter().cloned());
            spec.limit = source.limit;
            spec.offset = source.offset;
            spec.select.clone_from(&source.select);
            spec.from.clone_from(&source.from);
        }

        let mut wheres = self.spec.wheres.clone();
        for predicate in &other.spec.wheres {
            if predicate.is_equality() {
                wheres.retain(|existing| !existing.same_equality_column(predicate));
            }
            wheres.push(predicate.clone());
        }
        spec.wheres = wheres;

        let mut eager = self.eager_load_associations.clone();
        eager.extend(other.eager_load_associations.iter().cloned());
        let mut preload = self.preload_associations.clone();
        preload.extend(other.preload_associations.iter().cloned());

        tracing::debug!(
            wheres = spec.wheres.len(),
            eager = eager.len(),
            preload = preload.len(),
            "Merged relations"
        );

        Ok(self.spawn(Spawn {
            spec: Some(spec),
            readonly: Some(other.readonly),
            eager_load_associations: Some(eager),
            preload_associations: Some(preload),
        }))
    }
}

impl<R: Record> BitAnd<&Relation<R>> for &Relation<R> {
    type Output = Result<Relation<R>>;

    fn bitand(self, other: &Relation<R>) -> Self::Output {
        self.merge(other)
    }
}
