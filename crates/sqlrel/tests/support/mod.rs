//! Shared fixtures for relation integration tests.
#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::sync::Arc;

use sqlrel::{
    AssociationKind, Dialect, EagerFetch, Entity, Error, FieldInfo, Model, Record,
    RecordStore, Relation, RelationshipInfo, Result, SqlType, Value,
};

#[derive(Debug, Clone, PartialEq)]
pub struct Hero {
    pub id: i64,
    pub name: String,
    pub age: i32,
    pub active: bool,
    pub readonly: bool,
}

impl Hero {
    pub fn new(id: i64, name: &str, age: i32) -> Self {
        Self {
            id,
            name: name.to_string(),
            age,
            active: true,
            readonly: false,
        }
    }

    fn from_attributes(id: i64, attributes: &[(String, Value)]) -> Self {
        let mut hero = Hero::new(id, "", 0);
        for (name, value) in attributes {
            match (name.as_str(), value) {
                ("name", Value::Text(s)) => hero.name.clone_from(s),
                ("age", Value::Int(n)) => hero.age = *n,
                ("active", Value::Bool(b)) => hero.active = *b,
                _ => {}
            }
        }
        hero
    }
}

impl Record for Hero {
    fn mark_readonly(&mut self) {
        self.readonly = true;
    }

    fn is_readonly(&self) -> bool {
        self.readonly
    }
}

impl Model for Hero {
    const ENTITY_NAME: &'static str = "Hero";
    const TABLE_NAME: &'static str = "heroes";
    const RELATIONSHIPS: &'static [RelationshipInfo] = &[RelationshipInfo::new(
        "team",
        "teams",
        AssociationKind::ManyToOne,
    )
    .local_key("team_id")];

    fn fields() -> &'static [FieldInfo] {
        static FIELDS: [FieldInfo; 5] = [
            FieldInfo::new("id", "id", SqlType::BigInt).primary_key(true),
            FieldInfo::new("name", "name", SqlType::Text),
            FieldInfo::new("age", "age", SqlType::Integer),
            FieldInfo::new("active", "active", SqlType::Boolean),
            FieldInfo::new("team_id", "team_id", SqlType::BigInt).nullable(true),
        ];
        &FIELDS
    }
}

/// In-memory store that records every statement it is asked to run.
///
/// SELECTs return the next scripted result if one is queued, otherwise a
/// copy of `rows`.
#[derive(Default)]
pub struct MemoryStore {
    pub rows: RefCell<Vec<Hero>>,
    pub scripted: RefCell<VecDeque<Vec<Hero>>>,
    pub selects: RefCell<Vec<(String, Vec<Value>)>>,
    pub counts: RefCell<Vec<(String, Vec<Value>)>>,
    pub deletes: RefCell<Vec<(String, Vec<Value>)>>,
    pub eager_fetches: RefCell<Vec<Vec<String>>>,
    pub preloads: RefCell<Vec<String>>,
    pub destroyed: RefCell<Vec<i64>>,
    pub fail_destroy_id: Cell<Option<i64>>,
    pub created: RefCell<Vec<Hero>>,
    pub built: RefCell<Vec<Hero>>,
    pub deleted_rows: Cell<u64>,
}

impl MemoryStore {
    pub fn with_rows(rows: Vec<Hero>) -> Arc<Self> {
        let store = Self::default();
        *store.rows.borrow_mut() = rows;
        Arc::new(store)
    }

    pub fn script(&self, result: Vec<Hero>) {
        self.scripted.borrow_mut().push_back(result);
    }

    pub fn select_count(&self) -> usize {
        self.selects.borrow().len()
    }

    pub fn count_queries(&self) -> usize {
        self.counts.borrow().len()
    }

    pub fn last_select(&self) -> (String, Vec<Value>) {
        self.selects
            .borrow()
            .last()
            .cloned()
            .expect("no SELECT was run")
    }

    fn next_rows(&self) -> Vec<Hero> {
        self.scripted
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| self.rows.borrow().clone())
    }
}

impl RecordStore<Hero> for MemoryStore {
    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }

    fn find_by_sql(&self, _: &Entity, sql: &str, params: &[Value]) -> Result<Vec<Hero>> {
        self.selects
            .borrow_mut()
            .push((sql.to_string(), params.to_vec()));
        Ok(self.next_rows())
    }

    fn count(&self, _: &Entity, sql: &str, params: &[Value]) -> Result<u64> {
        self.counts
            .borrow_mut()
            .push((sql.to_string(), params.to_vec()));
        Ok(self.rows.borrow().len() as u64)
    }

    fn find_with_associations(&self, _: &Entity, fetch: &EagerFetch) -> Result<Vec<Hero>> {
        self.eager_fetches.borrow_mut().push(
            fetch
                .join_dependency
                .associations()
                .iter()
                .map(|a| a.name.clone())
                .collect(),
        );
        Ok(self.next_rows())
    }

    fn preload(&self, _: &Entity, _: &mut [Hero], association: &str) -> Result<()> {
        self.preloads.borrow_mut().push(association.to_string());
        Ok(())
    }

    fn destroy(&self, _: &Entity, record: &Hero) -> Result<()> {
        if self.fail_destroy_id.get() == Some(record.id) {
            return Err(Error::Custom(format!("cannot destroy hero {}", record.id)));
        }
        self.destroyed.borrow_mut().push(record.id);
        Ok(())
    }

    fn delete_all(&self, _: &Entity, sql: &str, params: &[Value]) -> Result<u64> {
        self.deletes
            .borrow_mut()
            .push((sql.to_string(), params.to_vec()));
        Ok(self.deleted_rows.get())
    }

    fn build(&self, _: &Entity, attributes: &[(String, Value)]) -> Result<Hero> {
        let hero = Hero::from_attributes(0, attributes);
        self.built.borrow_mut().push(hero.clone());
        Ok(hero)
    }

    fn create(&self, _: &Entity, attributes: &[(String, Value)]) -> Result<Hero> {
        let id = self.created.borrow().len() as i64 + 100;
        let hero = Hero::from_attributes(id, attributes);
        self.created.borrow_mut().push(hero.clone());
        Ok(hero)
    }
}

pub fn heroes(store: &Arc<MemoryStore>) -> Relation<Hero> {
    Relation::<Hero>::of_model(store.clone())
}

pub fn sample_heroes() -> Vec<Hero> {
    vec![
        Hero::new(1, "Ann", 30),
        Hero::new(2, "Bob", 41),
        Hero::new(3, "Cid", 25),
    ]
}
