//! JOIN clause types.

use sqlrel_core::Value;

use crate::expr::{Dialect, Expr};

/// A JOIN clause.
#[derive(Debug, Clone, PartialEq)]
pub enum Join {
    /// A structured join against a table.
    Table {
        /// Type of join
        join_type: JoinType,
        /// Table to join
        table: String,
        /// Optional table alias
        alias: Option<String>,
        /// ON condition
        on: Expr,
    },
    /// A raw join fragment, e.g. `"INNER JOIN teams ON teams.id = heroes.team_id"`.
    Raw(String),
}

/// Types of SQL joins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinType {
    Inner,
    Left,
    Right,
    Full,
}

impl JoinType {
    /// Get the SQL keyword for this join type.
    pub const fn as_str(&self) -> &'static str {
        match self {
            JoinType::Inner => "INNER JOIN",
            JoinType::Left => "LEFT JOIN",
            JoinType::Right => "RIGHT JOIN",
            JoinType::Full => "FULL JOIN",
        }
    }
}

impl Join {
    fn table(join_type: JoinType, table: impl Into<String>, on: Expr) -> Self {
        Join::Table {
            join_type,
            table: table.into(),
            alias: None,
            on,
        }
    }

    /// Create an INNER JOIN.
    pub fn inner(table: impl Into<String>, on: Expr) -> Self {
        Self::table(JoinType::Inner, table, on)
    }

    /// Create a LEFT JOIN.
    pub fn left(table: impl Into<String>, on: Expr) -> Self {
        Self::table(JoinType::Left, table, on)
    }

    /// Create a RIGHT JOIN.
    pub fn right(table: impl Into<String>, on: Expr) -> Self {
        Self::table(JoinType::Right, table, on)
    }

    /// Create a FULL OUTER JOIN.
    pub fn full(table: impl Into<String>, on: Expr) -> Self {
        Self::table(JoinType::Full, table, on)
    }

    pub fn raw(sql: impl Into<String>) -> Self {
        Join::Raw(sql.into())
    }

    /// Set an alias for the joined table. No effect on raw joins.
    pub fn alias(mut self, name: impl Into<String>) -> Self {
        if let Join::Table { alias, .. } = &mut self {
            *alias = Some(name.into());
        }
        self
    }

    /// Generate SQL and collect parameters with a specific dialect.
    ///
    /// The result carries a leading space so joins can be appended directly
    /// after the FROM clause.
    pub fn build_with_dialect(
        &self,
        dialect: Dialect,
        params: &mut Vec<Value>,
        offset: usize,
    ) -> String {
        match self {
            Join::Table {
                join_type,
                table,
                alias,
                on,
            } => {
                let mut sql = format!(
                    " {} {}",
                    join_type.as_str(),
                    dialect.quote_identifier(table)
                );
                if let Some(alias) = alias {
                    sql.push_str(" AS ");
                    sql.push_str(&dialect.quote_identifier(alias));
                }
                let on_sql = on.build_with_dialect(dialect, params, offset);
                sql.push_str(" ON ");
                sql.push_str(&on_sql);
                sql
            }
            Join::Raw(sql) => format!(" {}", sql.trim()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_left_join_with_alias() {
        let join = Join::left(
            "teams",
            Expr::qualified("t", "id").eq(Expr::qualified("heroes", "team_id")),
        )
        .alias("t");
        let mut params = Vec::new();
        let sql = join.build_with_dialect(Dialect::Postgres, &mut params, 0);
        assert_eq!(
            sql,
            " LEFT JOIN \"teams\" AS \"t\" ON \"t\".\"id\" = \"heroes\".\"team_id\""
        );
        assert!(params.is_empty());
    }

    #[test]
    fn test_join_condition_binds_params() {
        let join = Join::inner(
            "teams",
            Expr::qualified("teams", "active").eq(true),
        );
        let mut params = vec![Value::Int(1)];
        let sql = join.build_with_dialect(Dialect::Sqlite, &mut params, 0);
        assert!(sql.ends_with("= ?2"));
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn test_raw_join_ignores_alias() {
        let join = Join::raw("INNER JOIN teams ON teams.id = heroes.team_id ").alias("x");
        let sql = join.build_with_dialect(Dialect::Mysql, &mut Vec::new(), 0);
        assert_eq!(sql, " INNER JOIN teams ON teams.id = heroes.team_id");
    }
}
