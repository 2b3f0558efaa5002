mod support;

use sqlrel::{Error, LoadState, Value};
use support::{Hero, MemoryStore, heroes, sample_heroes};

#[test]
fn test_relation_runs_query_once_until_reload() {
    let store = MemoryStore::with_rows(sample_heroes());
    let mut relation = heroes(&store).where_eq("active", true);

    assert!(!relation.loaded());
    assert_eq!(relation.to_a().unwrap().len(), 3);
    assert_eq!(relation.to_a().unwrap().len(), 3);
    assert_eq!(store.select_count(), 1);

    let (sql, params) = store.last_select();
    assert_eq!(
        sql,
        "SELECT \"heroes\".* FROM \"heroes\" WHERE \"heroes\".\"active\" = ?1"
    );
    assert_eq!(params, vec![Value::Bool(true)]);

    relation.reload();
    assert!(!relation.loaded());
    assert_eq!(store.select_count(), 1);
    relation.to_a().unwrap();
    assert_eq!(store.select_count(), 2);
}

#[test]
fn test_builders_leave_source_relation_untouched() {
    let store = MemoryStore::with_rows(sample_heroes());
    let mut base = heroes(&store);
    base.to_a().unwrap();

    let limited = base.limit(2);
    assert!(base.loaded());
    assert!(!limited.loaded());
    assert!(base.spec().limit.is_none());
    assert!(limited.to_sql().ends_with("LIMIT 2"));
}

#[test]
fn test_is_empty_agrees_loaded_and_unloaded() {
    for rows in [sample_heroes(), Vec::new()] {
        let expected = rows.is_empty();
        let store = MemoryStore::with_rows(rows);
        let mut relation = heroes(&store).where_eq("active", true);

        let unloaded = relation.is_empty().unwrap();
        assert_eq!(store.count_queries(), 1);
        relation.to_a().unwrap();
        let loaded = relation.is_empty().unwrap();
        assert_eq!(store.count_queries(), 1);

        assert_eq!(unloaded, expected);
        assert_eq!(loaded, unloaded);
        assert_eq!(relation.any().unwrap(), !expected);
    }
}

#[test]
fn test_is_empty_counts_unless_loaded() {
    let store = MemoryStore::with_rows(sample_heroes());
    let mut relation = heroes(&store);

    assert!(!relation.is_empty().unwrap());
    assert_eq!(store.count_queries(), 1);
    assert_eq!(store.select_count(), 0);

    store.script(Vec::new());
    relation.to_a().unwrap();
    assert!(relation.is_empty().unwrap());
    assert!(!relation.any().unwrap());
    assert_eq!(relation.size().unwrap(), 0);
    assert_eq!(store.count_queries(), 1);
}

#[test]
fn test_readonly_marks_only_when_set_true() {
    let store = MemoryStore::with_rows(sample_heroes());

    let mut readonly = heroes(&store).readonly(true);
    assert!(readonly.to_a().unwrap().iter().all(|h| h.readonly));

    let mut plain = heroes(&store);
    assert_eq!(plain.readonly_value(), None);
    assert!(plain.to_a().unwrap().iter().all(|h| !h.readonly));

    let mut cleared = heroes(&store).readonly(false);
    assert!(cleared.to_a().unwrap().iter().all(|h| !h.readonly));
}

#[test]
fn test_destroy_all_stops_at_first_failure_without_reset() {
    let store = MemoryStore::with_rows(sample_heroes());
    store.fail_destroy_id.set(Some(2));
    let mut relation = heroes(&store);

    let err = relation.destroy_all().unwrap_err();
    assert!(matches!(err, Error::Custom(_)));
    assert_eq!(*store.destroyed.borrow(), vec![1]);
    assert!(relation.loaded());
    assert_eq!(relation.length().unwrap(), 3);
    assert_eq!(store.select_count(), 1);
}

#[test]
fn test_destroy_all_returns_records_and_resets() {
    let store = MemoryStore::with_rows(sample_heroes());
    let mut relation = heroes(&store);

    let destroyed = relation.destroy_all().unwrap();
    assert_eq!(destroyed, sample_heroes());
    assert_eq!(*store.destroyed.borrow(), vec![1, 2, 3]);
    assert!(!relation.loaded());
    assert_eq!(relation.load_state(), &LoadState::Unmaterialized);
}

#[test]
fn test_many_materializes_limited_relation() {
    let store = MemoryStore::with_rows(sample_heroes());

    let mut unlimited = heroes(&store);
    assert!(unlimited.many().unwrap());
    assert!(!unlimited.loaded());
    assert_eq!(store.count_queries(), 1);

    store.script(vec![Hero::new(1, "Ann", 30)]);
    let mut limited = heroes(&store).limit(1);
    assert!(!limited.many().unwrap());
    assert!(limited.loaded());
    assert_eq!(store.count_queries(), 1);
}

#[test]
fn test_many_and_any_with_predicates_materialize() {
    let store = MemoryStore::with_rows(sample_heroes());
    let mut relation = heroes(&store);

    assert!(relation.any_matching(|h| h.age > 40).unwrap());
    assert!(!relation.many_matching(|h| h.age > 40).unwrap());
    assert!(relation.many_matching(|h| h.age >= 30).unwrap());
    assert!(relation.all(|h| h.active).unwrap());
    assert_eq!(
        relation.map(|h| h.name.clone()).unwrap(),
        vec!["Ann", "Bob", "Cid"]
    );
    assert_eq!(store.select_count(), 1);
}

#[test]
fn test_first_and_last_memoize_until_reset() {
    let store = MemoryStore::with_rows(sample_heroes());
    let mut relation = heroes(&store).order_raw("name");

    store.script(vec![Hero::new(1, "Ann", 30)]);
    assert_eq!(relation.first().unwrap().map(|h| h.id), Some(1));
    assert_eq!(relation.first().unwrap().map(|h| h.id), Some(1));
    assert_eq!(store.select_count(), 1);
    assert!(store.last_select().0.ends_with("ORDER BY name LIMIT 1"));

    store.script(vec![Hero::new(3, "Cid", 25)]);
    assert_eq!(relation.last().unwrap().map(|h| h.id), Some(3));
    assert_eq!(store.select_count(), 2);
    assert!(store.last_select().0.ends_with("ORDER BY name DESC LIMIT 1"));

    relation.reset();
    store.script(vec![Hero::new(2, "Bob", 41)]);
    assert_eq!(relation.first().unwrap().map(|h| h.id), Some(2));
    assert_eq!(store.select_count(), 3);
}

#[test]
fn test_last_without_order_sorts_by_primary_key() {
    let store = MemoryStore::with_rows(sample_heroes());
    let relation = heroes(&store);

    relation.last().unwrap();
    assert!(
        store
            .last_select()
            .0
            .ends_with("ORDER BY \"heroes\".\"id\" DESC LIMIT 1")
    );
}

#[test]
fn test_first_and_last_use_cache_when_loaded() {
    let store = MemoryStore::with_rows(sample_heroes());
    let mut relation = heroes(&store);
    relation.to_a().unwrap();

    assert_eq!(relation.first().unwrap().map(|h| h.id), Some(1));
    assert_eq!(relation.last().unwrap().map(|h| h.id), Some(3));
    assert_eq!(store.select_count(), 1);
}

#[test]
fn test_delete_all_renders_conditions_and_resets() {
    let store = MemoryStore::with_rows(sample_heroes());
    store.deleted_rows.set(2);
    let mut relation = heroes(&store).where_eq("name", "Ann").order_raw("name");
    relation.to_a().unwrap();

    assert_eq!(relation.delete_all().unwrap(), 2);
    assert!(!relation.loaded());
    let deletes = store.deletes.borrow();
    assert_eq!(
        deletes[0].0,
        "DELETE FROM \"heroes\" WHERE \"heroes\".\"name\" = ?1"
    );
    assert_eq!(deletes[0].1, vec![Value::from("Ann")]);
}

#[test]
fn test_delete_by_id_list_uses_in() {
    let store = MemoryStore::with_rows(sample_heroes());
    let relation = heroes(&store);

    relation.delete(vec![1_i64, 2]).unwrap();
    relation.delete(3_i64).unwrap();

    let deletes = store.deletes.borrow();
    assert_eq!(
        deletes[0].0,
        "DELETE FROM \"heroes\" WHERE \"heroes\".\"id\" IN (?1, ?2)"
    );
    assert_eq!(deletes[0].1, vec![Value::BigInt(1), Value::BigInt(2)]);
    assert_eq!(
        deletes[1].0,
        "DELETE FROM \"heroes\" WHERE \"heroes\".\"id\" = ?1"
    );
}

#[test]
fn test_eager_load_and_preload_run_through_store() {
    let store = MemoryStore::with_rows(sample_heroes());
    let mut relation = heroes(&store).eager_load(&["team"]).preload(&["team"]);

    assert_eq!(relation.to_a().unwrap().len(), 3);
    assert_eq!(store.select_count(), 0);
    assert_eq!(*store.eager_fetches.borrow(), vec![vec!["team".to_string()]]);
    assert_eq!(*store.preloads.borrow(), vec!["team".to_string()]);
}

#[test]
fn test_unknown_eager_association_fails_before_query() {
    let store = MemoryStore::with_rows(sample_heroes());
    let mut relation = heroes(&store).eager_load(&["sidekicks"]);

    let err = relation.to_a().unwrap_err();
    assert!(matches!(
        err,
        Error::UnknownAssociation { ref association, .. } if association == "sidekicks"
    ));
    assert!(store.eager_fetches.borrow().is_empty());
    assert!(!relation.loaded());
}

#[test]
fn test_table_and_primary_key_come_from_entity() {
    let store = MemoryStore::with_rows(Vec::new());
    let relation = heroes(&store);
    assert_eq!(relation.table(), "heroes");
    assert_eq!(relation.primary_key(), "id");
    assert_eq!(relation.to_sql(), "SELECT \"heroes\".* FROM \"heroes\"");
}
