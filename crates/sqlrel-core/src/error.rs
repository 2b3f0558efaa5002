//! Error types for relation operations.

use std::fmt;

/// The primary error type for all sqlrel operations.
#[derive(Debug)]
pub enum Error {
    /// Two relations bound to different entities were merged.
    TypeMismatch {
        /// Entity of the receiving relation
        expected: String,
        /// Entity of the relation being merged in
        found: String,
    },
    /// An operation name could not be resolved by any dispatch strategy.
    UnknownOperation {
        /// Entity the relation is bound to
        entity: String,
        /// The operation name as requested
        operation: String,
    },
    /// Raised by association loaders when no root record matched.
    ///
    /// The relation materializer recovers from this locally; callers of
    /// `to_a` never observe it.
    NoRootMatches,
    /// An eager/preload association name is not declared on the entity.
    UnknownAssociation { entity: String, association: String },
    /// A dynamic finder was called with the wrong number of arguments.
    InvalidArguments {
        operation: String,
        expected: usize,
        found: usize,
    },
    /// A bang finder found no matching record.
    RecordNotFound { entity: String, message: String },
    /// Query execution errors (store-owned)
    Query(QueryError),
    /// Type conversion errors
    Type(TypeError),
    /// Entity/schema metadata errors
    Schema(SchemaError),
    /// Serialization/deserialization errors
    Serde(String),
    /// Custom error with message
    Custom(String),
}

#[derive(Debug)]
pub struct QueryError {
    pub kind: QueryErrorKind,
    pub sql: Option<String>,
    pub message: String,
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryErrorKind {
    /// Syntax error in SQL
    Syntax,
    /// Constraint violation (unique, foreign key, etc.)
    Constraint,
    /// Table or column not found
    NotFound,
    /// Permission denied
    Permission,
    /// Other database error
    Database,
}

#[derive(Debug)]
pub struct TypeError {
    pub expected: &'static str,
    pub actual: String,
    pub column: Option<String>,
}

#[derive(Debug)]
pub struct SchemaError {
    pub kind: SchemaErrorKind,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaErrorKind {
    /// Entity registered twice
    DuplicateEntity,
    /// Entity not found in the registry
    EntityNotFound,
    /// Invalid entity definition
    Invalid,
}

impl Error {
    /// Build a store-side query error carrying the offending SQL.
    pub fn query(kind: QueryErrorKind, sql: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Query(QueryError {
            kind,
            sql: Some(sql.into()),
            message: message.into(),
            source: None,
        })
    }

    /// Is this the association loader's "no root matches" signal?
    pub fn is_no_root_matches(&self) -> bool {
        matches!(self, Error::NoRootMatches)
    }

    /// Get the SQL that caused this error, if available
    pub fn sql(&self) -> Option<&str> {
        match self {
            Error::Query(q) => q.sql.as_deref(),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::TypeMismatch { expected, found } => write!(
                f,
                "Cannot merge a {} relation with {} relation",
                found, expected
            ),
            Error::UnknownOperation { entity, operation } => {
                write!(f, "undefined operation '{}' for {} relation", operation, entity)
            }
            Error::NoRootMatches => write!(f, "no root records matched the association load"),
            Error::UnknownAssociation {
                entity,
                association,
            } => write!(
                f,
                "association named '{}' was not found on {}",
                association, entity
            ),
            Error::InvalidArguments {
                operation,
                expected,
                found,
            } => write!(
                f,
                "wrong number of arguments for '{}' ({} for {})",
                operation, found, expected
            ),
            Error::RecordNotFound { entity, message } => {
                write!(f, "Couldn't find {} {}", entity, message)
            }
            Error::Query(e) => write!(f, "Query error: {}", e.message),
            Error::Type(e) => write!(f, "Type error: {}", e),
            Error::Schema(e) => write!(f, "Schema error: {}", e.message),
            Error::Serde(msg) => write!(f, "Serialization error: {}", msg),
            Error::Custom(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Query(e) => e
                .source
                .as_deref()
                .map(|err| err as &(dyn std::error::Error + 'static)),
            _ => None,
        }
    }
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.sql {
            Some(sql) => write!(f, "{} (in: {})", self.message, sql),
            None => write!(f, "{}", self.message),
        }
    }
}

impl fmt::Display for TypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(col) = &self.column {
            write!(
                f,
                "expected {} for column '{}', found {}",
                self.expected, col, self.actual
            )
        } else {
            write!(f, "expected {}, found {}", self.expected, self.actual)
        }
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl From<QueryError> for Error {
    fn from(err: QueryError) -> Self {
        Error::Query(err)
    }
}

impl From<TypeError> for Error {
    fn from(err: TypeError) -> Self {
        Error::Type(err)
    }
}

impl From<SchemaError> for Error {
    fn from(err: SchemaError) -> Self {
        Error::Schema(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serde(err.to_string())
    }
}

/// Result type alias for sqlrel operations.
pub type Result<T> = std::result::Result<T, Error>;
