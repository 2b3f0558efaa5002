//! Association metadata.
//!
//! Associations name the related table and the key columns needed to join it.
//! The eager-load join planner and the preload collaborator both read them.

use serde::{Deserialize, Serialize};

/// The type of relationship between two entities.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssociationKind {
    /// One-to-one: `Hero` has one `Profile`.
    OneToOne,
    /// Many-to-one: many `Hero`s belong to one `Team`.
    #[default]
    ManyToOne,
    /// One-to-many: one `Team` has many `Hero`s.
    OneToMany,
    /// Many-to-many: `Hero`s have many `Power`s via a link table.
    ManyToMany,
}

/// Static link-table description for many-to-many relationships.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkTableInfo {
    /// The link table name (e.g., `"hero_powers"`).
    pub table_name: &'static str,
    /// Column in link table pointing to the local model (e.g., `"hero_id"`).
    pub local_column: &'static str,
    /// Column in link table pointing to the remote model (e.g., `"power_id"`).
    pub remote_column: &'static str,
}

impl LinkTableInfo {
    pub const fn new(
        table_name: &'static str,
        local_column: &'static str,
        remote_column: &'static str,
    ) -> Self {
        Self {
            table_name,
            local_column,
            remote_column,
        }
    }
}

/// Static relationship metadata declared on a [`crate::Model`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelationshipInfo {
    /// Name of the relationship field.
    pub name: &'static str,
    /// The related model's table name.
    pub related_table: &'static str,
    pub kind: AssociationKind,
    /// Local foreign key column (for ManyToOne).
    pub local_key: Option<&'static str>,
    /// Remote foreign key column (for OneToMany / OneToOne).
    pub remote_key: Option<&'static str>,
    /// Link table for ManyToMany relationships.
    pub link_table: Option<LinkTableInfo>,
}

impl RelationshipInfo {
    pub const fn new(name: &'static str, related_table: &'static str, kind: AssociationKind) -> Self {
        Self {
            name,
            related_table,
            kind,
            local_key: None,
            remote_key: None,
            link_table: None,
        }
    }

    pub const fn local_key(mut self, key: &'static str) -> Self {
        self.local_key = Some(key);
        self
    }

    pub const fn remote_key(mut self, key: &'static str) -> Self {
        self.remote_key = Some(key);
        self
    }

    pub const fn link_table(mut self, info: LinkTableInfo) -> Self {
        self.link_table = Some(info);
        self
    }
}

/// Owned link-table description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkTable {
    pub table_name: String,
    pub local_column: String,
    pub remote_column: String,
}

/// Owned association metadata held by an [`crate::Entity`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssociationInfo {
    pub name: String,
    pub related_table: String,
    #[serde(default)]
    pub kind: AssociationKind,
    #[serde(default)]
    pub local_key: Option<String>,
    #[serde(default)]
    pub remote_key: Option<String>,
    #[serde(default)]
    pub link_table: Option<LinkTable>,
}

impl AssociationInfo {
    pub fn new(name: impl Into<String>, related_table: impl Into<String>, kind: AssociationKind) -> Self {
        Self {
            name: name.into(),
            related_table: related_table.into(),
            kind,
            local_key: None,
            remote_key: None,
            link_table: None,
        }
    }

    pub fn local_key(mut self, key: impl Into<String>) -> Self {
        self.local_key = Some(key.into());
        self
    }

    pub fn remote_key(mut self, key: impl Into<String>) -> Self {
        self.remote_key = Some(key.into());
        self
    }

    pub fn link_table(
        mut self,
        table_name: impl Into<String>,
        local_column: impl Into<String>,
        remote_column: impl Into<String>,
    ) -> Self {
        self.link_table = Some(LinkTable {
            table_name: table_name.into(),
            local_column: local_column.into(),
            remote_column: remote_column.into(),
        });
        self
    }
}

impl From<&RelationshipInfo> for AssociationInfo {
    fn from(info: &RelationshipInfo) -> Self {
        Self {
            name: info.name.to_string(),
            related_table: info.related_table.to_string(),
            kind: info.kind,
            local_key: info.local_key.map(str::to_string),
            remote_key: info.remote_key.map(str::to_string),
            link_table: info.link_table.map(|link| LinkTable {
                table_name: link.table_name.to_string(),
                local_column: link.local_column.to_string(),
                remote_column: link.remote_column.to_string(),
            }),
        }
    }
}
