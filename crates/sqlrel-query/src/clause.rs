//! SQL clause types (ORDER BY, LIMIT, OFFSET).

use sqlrel_core::Value;

use crate::expr::{Dialect, Expr};

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OrderDirection {
    #[default]
    Asc,
    Desc,
}

impl OrderDirection {
    pub const fn as_str(self) -> &'static str {
        match self {
            OrderDirection::Asc => "ASC",
            OrderDirection::Desc => "DESC",
        }
    }

    pub const fn reverse(self) -> Self {
        match self {
            OrderDirection::Asc => OrderDirection::Desc,
            OrderDirection::Desc => OrderDirection::Asc,
        }
    }
}

/// One ORDER BY term.
#[derive(Debug, Clone, PartialEq)]
pub enum OrderBy {
    /// A structured term: expression plus direction.
    Expr {
        expr: Expr,
        direction: OrderDirection,
    },
    /// A raw SQL fragment such as `"name"` or `"age DESC, name"`.
    Raw(String),
}

impl OrderBy {
    /// Create an ascending order by column.
    pub fn asc(column: impl Into<String>) -> Self {
        Expr::col(column).asc()
    }

    /// Create a descending order by column.
    pub fn desc(column: impl Into<String>) -> Self {
        Expr::col(column).desc()
    }

    pub fn raw(sql: impl Into<String>) -> Self {
        OrderBy::Raw(sql.into())
    }

    /// The same term sorted the other way.
    ///
    /// Raw fragments are reversed per top-level comma-separated item: a
    /// trailing `ASC`/`DESC` is swapped, otherwise `DESC` is appended. A
    /// trailing `NULLS FIRST`/`NULLS LAST` stays last and is flipped.
    pub fn reverse(&self) -> Self {
        match self {
            OrderBy::Expr { expr, direction } => OrderBy::Expr {
                expr: expr.clone(),
                direction: direction.reverse(),
            },
            OrderBy::Raw(sql) => OrderBy::Raw(
                split_top_level(sql)
                    .into_iter()
                    .map(reverse_raw_item)
                    .collect::<Vec<_>>()
                    .join(", "),
            ),
        }
    }

    /// Generate SQL for this ORDER BY term.
    pub fn build_with_dialect(
        &self,
        dialect: Dialect,
        params: &mut Vec<Value>,
        offset: usize,
    ) -> String {
        match self {
            OrderBy::Expr { expr, direction } => format!(
                "{} {}",
                expr.build_with_dialect(dialect, params, offset),
                direction.as_str()
            ),
            OrderBy::Raw(sql) => sql.clone(),
        }
    }
}

/// Split on commas outside parentheses.
fn split_top_level(sql: &str) -> Vec<&str> {
    let mut items = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in sql.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                items.push(sql[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    items.push(sql[start..].trim());
    items
}

fn reverse_raw_item(item: &str) -> String {
    let upper = item.to_ascii_uppercase();
    for (suffix, flipped) in [(" NULLS FIRST", "NULLS LAST"), (" NULLS LAST", "NULLS FIRST")] {
        if upper.ends_with(suffix) {
            let term = item[..item.len() - suffix.len()].trim_end();
            return format!("{} {flipped}", reverse_direction(term));
        }
    }
    reverse_direction(item)
}

fn reverse_direction(item: &str) -> String {
    let upper = item.to_ascii_uppercase();
    if let Some(stripped) = upper.strip_suffix(" DESC") {
        format!("{} ASC", item[..stripped.len()].trim_end())
    } else if let Some(stripped) = upper.strip_suffix(" ASC") {
        format!("{} DESC", item[..stripped.len()].trim_end())
    } else {
        format!("{item} DESC")
    }
}

/// LIMIT clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limit(pub u64);

/// OFFSET clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Offset(pub u64);
