//! Eager loading join planning.
//!
//! A [`JoinDependency`] resolves association names against an entity and
//! produces the LEFT JOINs needed to fetch the associated rows in the same
//! query. [`EagerFetch`] bundles it with the rest of a relation's clauses for
//! the record store's association-aware finder.

use sqlrel_core::{AssociationInfo, AssociationKind, Entity, Error, Result, Value};

use crate::clause::{Limit, Offset, OrderBy};
use crate::expr::{Dialect, Expr};
use crate::join::Join;
use crate::spec::QuerySpec;

/// Association joins for one eager-load request, in request order.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinDependency {
    base_table: String,
    base_primary_key: String,
    associations: Vec<AssociationInfo>,
}

impl JoinDependency {
    /// Resolve `names` against the entity's associations.
    ///
    /// Fails with `UnknownAssociation` on the first name the entity does not
    /// declare. Repeated names are kept; each contributes its own joins.
    pub fn new<S: AsRef<str>>(entity: &Entity, names: &[S]) -> Result<Self> {
        let associations = names
            .iter()
            .map(|name| {
                entity
                    .find_association(name.as_ref())
                    .cloned()
                    .ok_or_else(|| Error::UnknownAssociation {
                        entity: entity.name.clone(),
                        association: name.as_ref().to_string(),
                    })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            base_table: entity.table_name.clone(),
            base_primary_key: entity.primary_key.clone(),
            associations,
        })
    }

    pub fn associations(&self) -> &[AssociationInfo] {
        &self.associations
    }

    pub fn is_empty(&self) -> bool {
        self.associations.is_empty()
    }

    /// LEFT JOINs for every association, in order.
    pub fn joins(&self) -> Vec<Join> {
        self.associations
            .iter()
            .flat_map(|assoc| self.association_joins(assoc))
            .collect()
    }

    fn association_joins(&self, assoc: &AssociationInfo) -> Vec<Join> {
        let parent = self.base_table.as_str();
        let related = assoc.related_table.as_str();
        let remote_pk = assoc.remote_key.as_deref().unwrap_or("id");

        match assoc.kind {
            AssociationKind::ManyToOne | AssociationKind::OneToOne => {
                // parent.fk = related.pk
                let local_key = assoc.local_key.as_deref().unwrap_or("id");
                vec![Join::left(
                    related,
                    Expr::qualified(parent, local_key).eq(Expr::qualified(related, remote_pk)),
                )]
            }
            AssociationKind::OneToMany => {
                // related.fk = parent.pk
                let local_pk = assoc
                    .local_key
                    .as_deref()
                    .unwrap_or(&self.base_primary_key);
                vec![Join::left(
                    related,
                    Expr::qualified(related, remote_pk).eq(Expr::qualified(parent, local_pk)),
                )]
            }
            AssociationKind::ManyToMany => {
                let Some(link) = &assoc.link_table else {
                    tracing::warn!(
                        association = %assoc.name,
                        "many-to-many association has no link table; skipping join"
                    );
                    return Vec::new();
                };
                let local_pk = assoc
                    .local_key
                    .as_deref()
                    .unwrap_or(&self.base_primary_key);
                vec![
                    Join::left(
                        link.table_name.as_str(),
                        Expr::qualified(parent, local_pk)
                            .eq(Expr::qualified(link.table_name.as_str(), link.local_column.as_str())),
                    ),
                    Join::left(
                        related,
                        Expr::qualified(link.table_name.as_str(), link.remote_column.as_str())
                            .eq(Expr::qualified(related, remote_pk)),
                    ),
                ]
            }
        }
    }
}

/// Everything an association-aware finder needs to run one eager fetch.
#[derive(Debug, Clone)]
pub struct EagerFetch {
    pub select: Vec<String>,
    pub joins: Vec<Join>,
    pub group: Vec<String>,
    pub order: Vec<OrderBy>,
    /// Rendered WHERE conditions, if any.
    pub conditions: Option<String>,
    /// Parameters bound by `conditions`.
    pub params: Vec<Value>,
    pub limit: Option<Limit>,
    pub offset: Option<Offset>,
    pub from: Vec<String>,
    pub join_dependency: JoinDependency,
    spec: QuerySpec,
}

impl EagerFetch {
    pub fn new(spec: &QuerySpec, join_dependency: JoinDependency, dialect: Dialect) -> Self {
        let mut params = Vec::new();
        let conditions = spec.build_conditions(dialect, &mut params, 0);
        Self {
            select: spec.select.clone(),
            joins: spec.joins.clone(),
            group: spec.group.clone(),
            order: spec.order.clone(),
            conditions,
            params,
            limit: spec.limit,
            offset: spec.offset,
            from: spec.from.clone(),
            join_dependency,
            spec: spec.clone(),
        }
    }

    /// Single SELECT with the association joins appended after the
    /// relation's own joins.
    pub fn build(&self, dialect: Dialect) -> (String, Vec<Value>) {
        self.spec
            .build_select(dialect, &self.join_dependency.joins())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predicate::Predicate;

    fn hero() -> Entity {
        Entity::new("Hero", "heroes")
            .association(
                AssociationInfo::new("team", "teams", AssociationKind::ManyToOne).local_key("team_id"),
            )
            .association(
                AssociationInfo::new("posts", "posts", AssociationKind::OneToMany).remote_key("hero_id"),
            )
            .association(
                AssociationInfo::new("powers", "powers", AssociationKind::ManyToMany)
                    .link_table("hero_powers", "hero_id", "power_id"),
            )
    }

    fn render(joins: &[Join]) -> Vec<String> {
        joins
            .iter()
            .map(|j| j.build_with_dialect(Dialect::Postgres, &mut Vec::new(), 0))
            .collect()
    }

    #[test]
    fn test_many_to_one_join() {
        let dep = JoinDependency::new(&hero(), &["team"]).unwrap();
        assert_eq!(
            render(&dep.joins()),
            vec![" LEFT JOIN \"teams\" ON \"heroes\".\"team_id\" = \"teams\".\"id\""]
        );
    }

    #[test]
    fn test_one_to_many_join_uses_entity_primary_key() {
        let dep = JoinDependency::new(&hero().primary_key("hero_id"), &["posts"]).unwrap();
        assert_eq!(
            render(&dep.joins()),
            vec![" LEFT JOIN \"posts\" ON \"posts\".\"hero_id\" = \"heroes\".\"hero_id\""]
        );
    }

    #[test]
    fn test_many_to_many_joins_through_link_table() {
        let dep = JoinDependency::new(&hero(), &["powers"]).unwrap();
        let joins = render(&dep.joins());
        assert_eq!(joins.len(), 2);
        assert!(joins[0].contains("\"hero_powers\".\"hero_id\""));
        assert!(joins[1].contains("\"hero_powers\".\"power_id\" = \"powers\".\"id\""));
    }

    #[test]
    fn test_unknown_association() {
        let err = JoinDependency::new(&hero(), &["team", "villains"]).unwrap_err();
        assert!(matches!(
            err,
            Error::UnknownAssociation { ref association, .. } if association == "villains"
        ));
    }

    #[test]
    fn test_eager_fetch_carries_clauses() {
        let spec = QuerySpec::new("heroes")
            .filter(Predicate::eq("active", true))
            .order_by(OrderBy::raw("name"))
            .limit(5);
        let dep = JoinDependency::new(&hero(), &["team"]).unwrap();
        let fetch = EagerFetch::new(&spec, dep, Dialect::Postgres);

        assert_eq!(fetch.conditions.as_deref(), Some("\"active\" = $1"));
        assert_eq!(fetch.params, vec![Value::Bool(true)]);
        assert_eq!(fetch.limit, Some(Limit(5)));

        let (sql, params) = fetch.build(Dialect::Postgres);
        assert_eq!(
            sql,
            "SELECT \"heroes\".* FROM \"heroes\" LEFT JOIN \"teams\" ON \"heroes\".\"team_id\" = \"teams\".\"id\" \
             WHERE \"active\" = $1 ORDER BY name LIMIT 5"
        );
        assert_eq!(params.len(), 1);
    }
}
