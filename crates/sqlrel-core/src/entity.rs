//! Entity metadata and the schema registry.
//!
//! An [`Entity`] describes one record kind: its table, primary key, attributes
//! and associations. Relations hold an `Arc<Entity>` instead of looking the
//! metadata up globally; a [`Schema`] is an explicit registry of them that can
//! be built in code or loaded from JSON.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SchemaError, SchemaErrorKind};
use crate::field::Attribute;
use crate::model::Model;
use crate::relationship::AssociationInfo;

fn default_primary_key() -> String {
    "id".to_string()
}

/// Metadata for one record kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub name: String,
    pub table_name: String,
    #[serde(default = "default_primary_key")]
    pub primary_key: String,
    #[serde(default)]
    pub attributes: Vec<Attribute>,
    #[serde(default)]
    pub associations: Vec<AssociationInfo>,
}

impl Entity {
    pub fn new(name: impl Into<String>, table_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            table_name: table_name.into(),
            primary_key: default_primary_key(),
            attributes: Vec::new(),
            associations: Vec::new(),
        }
    }

    /// Build entity metadata from a statically described model.
    pub fn of<M: Model>() -> Self {
        Self {
            name: M::ENTITY_NAME.to_string(),
            table_name: M::TABLE_NAME.to_string(),
            primary_key: M::PRIMARY_KEY.to_string(),
            attributes: M::fields().iter().map(Attribute::from).collect(),
            associations: M::RELATIONSHIPS.iter().map(AssociationInfo::from).collect(),
        }
    }

    pub fn primary_key(mut self, column: impl Into<String>) -> Self {
        self.primary_key = column.into();
        self
    }

    pub fn attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub fn association(mut self, association: AssociationInfo) -> Self {
        self.associations.push(association);
        self
    }

    /// Look up an attribute by name.
    pub fn find_attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Whether every name is a declared attribute.
    ///
    /// An empty name list never matches.
    pub fn has_attributes<S: AsRef<str>>(&self, names: &[S]) -> bool {
        !names.is_empty()
            && names
                .iter()
                .all(|name| self.find_attribute(name.as_ref()).is_some())
    }

    /// Look up an association by name.
    pub fn find_association(&self, name: &str) -> Option<&AssociationInfo> {
        self.associations.iter().find(|a| a.name == name)
    }

    pub fn attribute_names(&self) -> impl Iterator<Item = &str> {
        self.attributes.iter().map(|a| a.name.as_str())
    }

    fn validate(&self) -> Result<()> {
        if self.table_name.is_empty() {
            return Err(SchemaError {
                kind: SchemaErrorKind::Invalid,
                message: format!("entity '{}' has no table name", self.name),
            }
            .into());
        }
        if !self.attributes.is_empty() && self.find_attribute(&self.primary_key).is_none() {
            return Err(SchemaError {
                kind: SchemaErrorKind::Invalid,
                message: format!(
                    "primary key '{}' is not an attribute of '{}'",
                    self.primary_key, self.name
                ),
            }
            .into());
        }
        Ok(())
    }
}

#[derive(Deserialize)]
struct SchemaDocument {
    entities: Vec<Entity>,
}

/// A registry of entities keyed by entity name.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    entities: HashMap<String, Arc<Entity>>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a registry from a JSON document of the form `{"entities": [...]}`.
    pub fn from_json(json: &str) -> Result<Self> {
        let document: SchemaDocument = serde_json::from_str(json)?;
        let mut schema = Self::new();
        for entity in document.entities {
            schema.register(entity)?;
        }
        tracing::debug!(entities = schema.len(), "Loaded entity schema");
        Ok(schema)
    }

    /// Register an entity, returning the shared handle.
    pub fn register(&mut self, entity: Entity) -> Result<Arc<Entity>> {
        entity.validate()?;
        if self.entities.contains_key(&entity.name) {
            return Err(SchemaError {
                kind: SchemaErrorKind::DuplicateEntity,
                message: format!("entity '{}' is already registered", entity.name),
            }
            .into());
        }
        let entity = Arc::new(entity);
        self.entities.insert(entity.name.clone(), Arc::clone(&entity));
        Ok(entity)
    }

    pub fn entity(&self, name: &str) -> Result<Arc<Entity>> {
        self.entities.get(name).cloned().ok_or_else(|| {
            SchemaError {
                kind: SchemaErrorKind::EntityNotFound,
                message: format!("no entity named '{}'", name),
            }
            .into()
        })
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::types::SqlType;

    const SCHEMA: &str = r#"{
        "entities": [
            {
                "name": "Hero",
                "table_name": "heroes",
                "attributes": [
                    {"name": "id", "sql_type": "big_int"},
                    {"name": "name", "sql_type": "text"},
                    {"name": "age", "sql_type": "integer", "nullable": true}
                ],
                "associations": [
                    {"name": "team", "related_table": "teams", "local_key": "team_id"}
                ]
            },
            {"name": "Team", "table_name": "teams"}
        ]
    }"#;

    #[test]
    fn test_from_json() {
        let schema = Schema::from_json(SCHEMA).unwrap();
        assert_eq!(schema.len(), 2);

        let hero = schema.entity("Hero").unwrap();
        assert_eq!(hero.primary_key, "id");
        assert!(hero.has_attributes(&["name", "age"]));
        assert!(!hero.has_attributes(&["name", "rank"]));
        assert!(hero.find_association("team").is_some());
        assert_eq!(hero.find_attribute("age").unwrap().sql_type, SqlType::Integer);
    }

    #[test]
    fn test_empty_attribute_list_never_matches() {
        let hero = Entity::new("Hero", "heroes").attribute(Attribute::new("id", SqlType::BigInt));
        assert!(!hero.has_attributes::<&str>(&[]));
    }

    #[test]
    fn test_unknown_entity() {
        let schema = Schema::from_json(SCHEMA).unwrap();
        let err = schema.entity("Villain").unwrap_err();
        assert!(matches!(
            err,
            Error::Schema(SchemaError {
                kind: SchemaErrorKind::EntityNotFound,
                ..
            })
        ));
    }

    #[test]
    fn test_duplicate_entity_rejected() {
        let mut schema = Schema::new();
        schema.register(Entity::new("Hero", "heroes")).unwrap();
        let err = schema.register(Entity::new("Hero", "heroes_v2")).unwrap_err();
        assert!(matches!(
            err,
            Error::Schema(SchemaError {
                kind: SchemaErrorKind::DuplicateEntity,
                ..
            })
        ));
    }

    #[test]
    fn test_primary_key_must_be_attribute() {
        let entity = Entity::new("Hero", "heroes")
            .primary_key("uuid")
            .attribute(Attribute::new("id", SqlType::BigInt));
        let err = Schema::new().register(entity).unwrap_err();
        assert!(err.to_string().contains("primary key 'uuid'"));
    }

    #[test]
    fn test_malformed_json() {
        let err = Schema::from_json("{\"entities\": 3}").unwrap_err();
        assert!(matches!(err, Error::Serde(_)));
    }
}
