//! Attribute metadata and column references.

use serde::{Deserialize, Serialize};

use crate::types::SqlType;

/// Static metadata about a model field, declared alongside a [`crate::Model`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldInfo {
    /// Rust field name
    pub name: &'static str,
    /// Database column name (may differ from field name)
    pub column_name: &'static str,
    /// SQL type for this field
    pub sql_type: SqlType,
    /// Whether this field is nullable
    pub nullable: bool,
    /// Whether this is a primary key
    pub primary_key: bool,
}

impl FieldInfo {
    /// Create a new field info with minimal required data.
    pub const fn new(name: &'static str, column_name: &'static str, sql_type: SqlType) -> Self {
        Self {
            name,
            column_name,
            sql_type,
            nullable: false,
            primary_key: false,
        }
    }

    /// Set nullable flag.
    pub const fn nullable(mut self, value: bool) -> Self {
        self.nullable = value;
        self
    }

    /// Set primary key flag.
    pub const fn primary_key(mut self, value: bool) -> Self {
        self.primary_key = value;
        self
    }
}

/// Owned attribute metadata held by an [`crate::Entity`].
///
/// Dynamic finders match against `name`; rendered predicates use `column`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    #[serde(default)]
    pub column: Option<String>,
    #[serde(default = "default_sql_type")]
    pub sql_type: SqlType,
    #[serde(default)]
    pub nullable: bool,
}

fn default_sql_type() -> SqlType {
    SqlType::Text
}

impl Attribute {
    pub fn new(name: impl Into<String>, sql_type: SqlType) -> Self {
        Self {
            name: name.into(),
            column: None,
            sql_type,
            nullable: false,
        }
    }

    /// Column backing this attribute (defaults to the attribute name).
    pub fn column_name(&self) -> &str {
        self.column.as_deref().unwrap_or(&self.name)
    }
}

impl From<&FieldInfo> for Attribute {
    fn from(info: &FieldInfo) -> Self {
        Self {
            name: info.name.to_string(),
            column: (info.column_name != info.name).then(|| info.column_name.to_string()),
            sql_type: info.sql_type.clone(),
            nullable: info.nullable,
        }
    }
}

/// A column reference used in queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    /// Table name (optional, for joins)
    pub table: Option<String>,
    /// Column name
    pub name: String,
}

impl Column {
    /// Create a new column reference.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            table: None,
            name: name.into(),
        }
    }

    /// Create a column reference with table prefix.
    pub fn qualified(table: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            table: Some(table.into()),
            name: name.into(),
        }
    }

    /// Parse `"table.column"` or `"column"`.
    pub fn parse(reference: &str) -> Self {
        match reference.split_once('.') {
            Some((table, name)) => Self::qualified(table, name),
            None => Self::new(reference),
        }
    }

    /// Two references name the same column when their unqualified names agree.
    pub fn same_column(&self, other: &Column) -> bool {
        self.name == other.name
    }
}
