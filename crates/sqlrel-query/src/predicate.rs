//! Filter predicates.
//!
//! A relation's WHERE clause is an ordered list of predicates ANDed together.
//! Equality predicates (`column = value`) are kept structurally so that merge
//! can find and replace them by column; everything else is a general
//! predicate carried as an opaque expression.

use sqlrel_core::{Column, Value};

use crate::expr::{Dialect, Expr};

#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// `column = value`
    Equality { column: Column, value: Value },
    /// Any other boolean expression.
    General(Expr),
}

impl Predicate {
    /// Equality predicate on a (possibly `table.`-qualified) column.
    pub fn eq(column: &str, value: impl Into<Value>) -> Self {
        Predicate::Equality {
            column: Column::parse(column),
            value: value.into(),
        }
    }

    /// Condition for a `column => value` pair.
    ///
    /// Scalars and NULL become equality predicates; NULL renders as
    /// `IS NULL`. Arrays become a general `IN` predicate, which takes no part
    /// in merge replacement.
    pub fn condition(column: &str, value: impl Into<Value>) -> Self {
        let column = Column::parse(column);
        match value.into() {
            Value::Array(values) => {
                let list: Vec<Expr> = values.into_iter().map(Expr::Literal).collect();
                Predicate::General(column_expr(&column).in_list(list))
            }
            value => Predicate::Equality { column, value },
        }
    }

    pub fn raw(sql: impl Into<String>) -> Self {
        Predicate::General(Expr::raw(sql))
    }

    pub fn is_equality(&self) -> bool {
        matches!(self, Predicate::Equality { .. })
    }

    /// The constrained column, for equality predicates only.
    pub fn equality_column(&self) -> Option<&Column> {
        match self {
            Predicate::Equality { column, .. } => Some(column),
            Predicate::General(_) => None,
        }
    }

    /// Whether both are equality predicates on the same column name.
    pub fn same_equality_column(&self, other: &Predicate) -> bool {
        match (self.equality_column(), other.equality_column()) {
            (Some(a), Some(b)) => a.same_column(b),
            _ => false,
        }
    }

    /// Generate SQL for this predicate and collect its parameters.
    pub fn build_with_dialect(
        &self,
        dialect: Dialect,
        params: &mut Vec<Value>,
        offset: usize,
    ) -> String {
        match self {
            Predicate::Equality {
                column,
                value: Value::Null,
            } => column_expr(column)
                .is_null()
                .build_with_dialect(dialect, params, offset),
            Predicate::Equality { column, value } => column_expr(column)
                .eq(Expr::Literal(value.clone()))
                .build_with_dialect(dialect, params, offset),
            Predicate::General(expr @ (Expr::Binary { .. } | Expr::Raw(_))) => {
                // Binary ORs and raw fragments could bind looser than the
                // surrounding AND chain.
                expr.clone()
                    .paren()
                    .build_with_dialect(dialect, params, offset)
            }
            Predicate::General(expr) => expr.build_with_dialect(dialect, params, offset),
        }
    }
}

fn column_expr(column: &Column) -> Expr {
    Expr::Column {
        table: column.table.clone(),
        name: column.name.clone(),
    }
}

impl From<Expr> for Predicate {
    fn from(expr: Expr) -> Self {
        if let Some((table, name, value)) = expr.as_column_equality() {
            let column = match table {
                Some(table) => Column::qualified(table, name),
                None => Column::new(name),
            };
            return Predicate::Equality {
                column,
                value: value.clone(),
            };
        }
        Predicate::General(expr)
    }
}
