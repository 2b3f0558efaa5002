//! Structural query representation.
//!
//! A [`QuerySpec`] is a plain snapshot of every clause a relation has
//! accumulated. Relations replace it wholesale on each builder call; nothing
//! here performs I/O.

use sqlrel_core::Value;

use crate::clause::{Limit, Offset, OrderBy};
use crate::expr::Dialect;
use crate::join::Join;
use crate::predicate::Predicate;

/// The clause state of one query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuerySpec {
    /// Base table selected from.
    pub table: String,
    /// WHERE predicates, ANDed in order.
    pub wheres: Vec<Predicate>,
    pub joins: Vec<Join>,
    /// GROUP BY fragments.
    pub group: Vec<String>,
    pub order: Vec<OrderBy>,
    pub limit: Option<Limit>,
    pub offset: Option<Offset>,
    /// Projected columns; empty selects `table.*`.
    pub select: Vec<String>,
    /// Source fragments replacing the base table in FROM.
    pub from: Vec<String>,
}

impl QuerySpec {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            ..Self::default()
        }
    }

    /// Add a WHERE predicate.
    pub fn filter(mut self, predicate: impl Into<Predicate>) -> Self {
        self.wheres.push(predicate.into());
        self
    }

    pub fn join(mut self, join: Join) -> Self {
        self.joins.push(join);
        self
    }

    pub fn group_by(mut self, columns: &[&str]) -> Self {
        self.group.extend(columns.iter().map(|c| (*c).to_string()));
        self
    }

    pub fn order_by(mut self, order: OrderBy) -> Self {
        self.order.push(order);
        self
    }

    pub fn limit(mut self, n: u64) -> Self {
        self.limit = Some(Limit(n));
        self
    }

    pub fn offset(mut self, n: u64) -> Self {
        self.offset = Some(Offset(n));
        self
    }

    pub fn select(mut self, columns: &[&str]) -> Self {
        self.select.extend(columns.iter().map(|c| (*c).to_string()));
        self
    }

    pub fn from_sources(mut self, sources: &[&str]) -> Self {
        self.from.extend(sources.iter().map(|s| (*s).to_string()));
        self
    }

    pub fn has_limit(&self) -> bool {
        self.limit.is_some()
    }

    /// Render the WHERE predicates (without the `WHERE` keyword).
    ///
    /// Returns `None` when there are no predicates.
    pub fn build_conditions(
        &self,
        dialect: Dialect,
        params: &mut Vec<Value>,
        offset: usize,
    ) -> Option<String> {
        if self.wheres.is_empty() {
            return None;
        }
        let parts: Vec<_> = self
            .wheres
            .iter()
            .map(|w| w.build_with_dialect(dialect, params, offset))
            .collect();
        Some(parts.join(" AND "))
    }

    /// Build the SELECT statement and its parameters.
    pub fn build(&self, dialect: Dialect) -> (String, Vec<Value>) {
        self.build_select(dialect, &[])
    }

    /// Build the SELECT statement with extra joins appended after the spec's own.
    pub fn build_select(&self, dialect: Dialect, extra_joins: &[Join]) -> (String, Vec<Value>) {
        let mut params = Vec::new();
        let mut sql = String::from("SELECT ");

        if self.select.is_empty() {
            sql.push_str(&format!("{}.*", dialect.quote_identifier(&self.table)));
        } else {
            sql.push_str(&self.select.join(", "));
        }

        self.push_body(&mut sql, &mut params, dialect, extra_joins);

        // ORDER BY
        if !self.order.is_empty() {
            sql.push_str(" ORDER BY ");
            let order_strs: Vec<_> = self
                .order
                .iter()
                .map(|o| o.build_with_dialect(dialect, &mut params, 0))
                .collect();
            sql.push_str(&order_strs.join(", "));
        }

        // LIMIT
        if let Some(Limit(n)) = self.limit {
            sql.push_str(&format!(" LIMIT {}", n));
        }

        // OFFSET
        if let Some(Offset(n)) = self.offset {
            sql.push_str(&format!(" OFFSET {}", n));
        }

        (sql, params)
    }

    /// Build a COUNT statement for the rows this spec would return.
    ///
    /// Ordering is dropped. A limited or offset spec is counted through a
    /// subquery so the count respects the window.
    pub fn build_count(&self, dialect: Dialect) -> (String, Vec<Value>) {
        if self.limit.is_some() || self.offset.is_some() {
            let (inner, params) = self.build(dialect);
            return (
                format!("SELECT COUNT(*) FROM ({}) AS {}", inner, dialect.quote_identifier("subquery")),
                params,
            );
        }

        let mut params = Vec::new();
        let mut sql = String::from("SELECT COUNT(*)");
        self.push_body(&mut sql, &mut params, dialect, &[]);
        (sql, params)
    }

    // FROM, JOIN, WHERE, GROUP BY
    fn push_body(
        &self,
        sql: &mut String,
        params: &mut Vec<Value>,
        dialect: Dialect,
        extra_joins: &[Join],
    ) {
        sql.push_str(" FROM ");
        if self.from.is_empty() {
            sql.push_str(&dialect.quote_identifier(&self.table));
        } else {
            sql.push_str(&self.from.join(", "));
        }

        for join in self.joins.iter().chain(extra_joins) {
            sql.push_str(&join.build_with_dialect(dialect, params, 0));
        }

        if let Some(conditions) = self.build_conditions(dialect, params, 0) {
            sql.push_str(" WHERE ");
            sql.push_str(&conditions);
        }

        if !self.group.is_empty() {
            sql.push_str(" GROUP BY ");
            sql.push_str(&self.group.join(", "));
        }
    }

    /// Read one clause through a named accessor.
    pub fn read(&self, accessor: SpecAccessor, dialect: Dialect) -> ClauseValue {
        match accessor {
            SpecAccessor::ToSql => ClauseValue::Sql(self.build(dialect).0),
            SpecAccessor::WhereClauses => ClauseValue::List(
                self.wheres
                    .iter()
                    .map(|w| w.build_with_dialect(dialect, &mut Vec::new(), 0))
                    .collect(),
            ),
            SpecAccessor::Joins => ClauseValue::List(
                self.joins
                    .iter()
                    .map(|j| j.build_with_dialect(dialect, &mut Vec::new(), 0).trim_start().to_string())
                    .collect(),
            ),
            SpecAccessor::GroupClauses => ClauseValue::List(self.group.clone()),
            SpecAccessor::OrderClauses => ClauseValue::List(
                self.order
                    .iter()
                    .map(|o| o.build_with_dialect(dialect, &mut Vec::new(), 0))
                    .collect(),
            ),
            SpecAccessor::SelectClauses => ClauseValue::List(self.select.clone()),
            SpecAccessor::FromClauses => ClauseValue::List(self.from.clone()),
            SpecAccessor::Taken => ClauseValue::Count(self.limit.map(|Limit(n)| n)),
            SpecAccessor::Skipped => ClauseValue::Count(self.offset.map(|Offset(n)| n)),
        }
    }
}

/// Named read accessors over a [`QuerySpec`], reachable by name at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecAccessor {
    ToSql,
    WhereClauses,
    Joins,
    GroupClauses,
    OrderClauses,
    SelectClauses,
    FromClauses,
    Taken,
    Skipped,
}

impl SpecAccessor {
    pub const ALL: [SpecAccessor; 9] = [
        SpecAccessor::ToSql,
        SpecAccessor::WhereClauses,
        SpecAccessor::Joins,
        SpecAccessor::GroupClauses,
        SpecAccessor::OrderClauses,
        SpecAccessor::SelectClauses,
        SpecAccessor::FromClauses,
        SpecAccessor::Taken,
        SpecAccessor::Skipped,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            SpecAccessor::ToSql => "to_sql",
            SpecAccessor::WhereClauses => "where_clauses",
            SpecAccessor::Joins => "joins",
            SpecAccessor::GroupClauses => "group_clauses",
            SpecAccessor::OrderClauses => "order_clauses",
            SpecAccessor::SelectClauses => "select_clauses",
            SpecAccessor::FromClauses => "from_clauses",
            SpecAccessor::Taken => "taken",
            SpecAccessor::Skipped => "skipped",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.name() == name)
    }
}

/// Result of reading a clause accessor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClauseValue {
    Sql(String),
    List(Vec<String>),
    Count(Option<u64>),
}
