//! Bulk DELETE statement.

use sqlrel_core::Value;

use crate::expr::Dialect;
use crate::predicate::Predicate;
use crate::spec::QuerySpec;

/// DELETE query built from a spec's table and WHERE predicates.
///
/// Joins, ordering and pagination are not part of a bulk delete and are
/// ignored.
#[derive(Debug, Clone)]
pub struct DeleteStatement {
    table: String,
    wheres: Vec<Predicate>,
}

impl DeleteStatement {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            wheres: Vec::new(),
        }
    }

    pub fn from_spec(spec: &QuerySpec) -> Self {
        Self {
            table: spec.table.clone(),
            wheres: spec.wheres.clone(),
        }
    }

    /// Add a WHERE condition.
    pub fn filter(mut self, predicate: impl Into<Predicate>) -> Self {
        self.wheres.push(predicate.into());
        self
    }

    /// Build the DELETE SQL and parameters with specific dialect.
    pub fn build_with_dialect(&self, dialect: Dialect) -> (String, Vec<Value>) {
        let mut params = Vec::new();
        let mut sql = format!("DELETE FROM {}", dialect.quote_identifier(&self.table));

        if !self.wheres.is_empty() {
            let parts: Vec<_> = self
                .wheres
                .iter()
                .map(|w| w.build_with_dialect(dialect, &mut params, 0))
                .collect();
            sql.push_str(" WHERE ");
            sql.push_str(&parts.join(" AND "));
        }

        (sql, params)
    }
}
