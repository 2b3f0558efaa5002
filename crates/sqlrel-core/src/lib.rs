//! Core types and traits for sqlrel.
//!
//! This crate provides the foundational abstractions shared by the query layer
//! and the relation facade:
//!
//! - `Value` for dynamically-typed predicate operands and parameters
//! - `Entity` / `Schema` for record-kind metadata
//! - `Record` and `Model` traits implemented by materialized records
//! - `Error` / `Result` used throughout the workspace

pub mod entity;
pub mod error;
pub mod field;
pub mod model;
pub mod relationship;
pub mod types;
pub mod value;

pub use entity::{Entity, Schema};
pub use error::{
    Error, QueryError, QueryErrorKind, Result, SchemaError, SchemaErrorKind, TypeError,
};
pub use field::{Attribute, Column, FieldInfo};
pub use model::{Model, Record};
pub use relationship::{
    AssociationInfo, AssociationKind, LinkTable, LinkTableInfo, RelationshipInfo,
};
pub use types::SqlType;
pub use value::Value;
