use bench_dashboard_wasm::domain::{
    benchmark::{BenchmarkResult, KeyValueStorage, ReferenceStore},
    errors::BenchError,
    reference::ReferenceName,
};
use bench_dashboard_wasm::infrastructure::storage::{BrowserReferenceStore, MemoryStorage};
use futures::executor::block_on;
use quickcheck_macros::quickcheck;

fn store() -> BrowserReferenceStore<MemoryStorage> {
    BrowserReferenceStore::new(MemoryStorage::new(), "test")
}

fn results(means: &[(&str, f64)]) -> Vec<BenchmarkResult> {
    means.iter().map(|(id, mean)| BenchmarkResult::new(*id, *mean)).collect()
}

#[test]
fn save_then_load_returns_the_same_entries() {
    let store = store();
    let saved = results(&[("fine/fill", 12.5), ("tile/sort", 800.0)]);

    let name = block_on(store.save("baseline", &saved)).unwrap();
    assert_eq!(name.value(), "baseline");
    assert_eq!(block_on(store.load("baseline")).unwrap(), saved);
}

#[test]
fn extra_statistics_survive_storage() {
    let store = store();
    let mut result = BenchmarkResult::new("fine/fill", 12.5);
    result.statistics.extra.insert("stddev_ns".to_string(), serde_json::json!(0.75));
    result.simd_variant = "avx2".to_string();

    block_on(store.save("stats", std::slice::from_ref(&result))).unwrap();
    assert_eq!(block_on(store.load("stats")).unwrap(), vec![result]);
}

#[test]
fn names_are_sanitized_on_save_and_lookup() {
    let store = store();
    let name = block_on(store.save("My Run!", &results(&[("a", 1.0)]))).unwrap();
    assert_eq!(name.value(), "My_Run_");

    assert_eq!(block_on(store.load("My_Run_")).unwrap().len(), 1);
    assert_eq!(block_on(store.load("My Run!")).unwrap().len(), 1);
}

#[test]
fn empty_names_are_rejected() {
    let store = store();
    assert_eq!(block_on(store.save("   ", &results(&[("a", 1.0)]))), Err(BenchError::EmptyName));
    assert!(store.storage().keys().is_empty());
}

#[test]
fn list_is_newest_first() {
    let store = store();
    for name in ["first", "second", "third"] {
        block_on(store.save(name, &results(&[("a", 1.0)]))).unwrap();
    }

    let index = block_on(store.list()).unwrap();
    let names: Vec<&str> = index.iter().map(|entry| entry.name.value()).collect();
    assert_eq!(names, ["third", "second", "first"]);
    assert!(index.windows(2).all(|pair| pair[0].created_at > pair[1].created_at));
}

#[test]
fn saving_an_existing_name_overwrites_it() {
    let store = store();
    block_on(store.save("main", &results(&[("a", 1.0)]))).unwrap();
    block_on(store.save("other", &results(&[("a", 1.0)]))).unwrap();
    block_on(store.save("main", &results(&[("a", 2.0), ("b", 3.0)]))).unwrap();

    let index = block_on(store.list()).unwrap();
    assert_eq!(index.len(), 2);
    assert_eq!(index[0].name.value(), "main");
    assert_eq!(index[0].benchmark_count, 2);
    assert_eq!(block_on(store.load("main")).unwrap(), results(&[("a", 2.0), ("b", 3.0)]));
}

#[test]
fn index_and_bodies_use_namespaced_keys() {
    let store = store();
    block_on(store.save("main", &results(&[("a", 1.0)]))).unwrap();

    let name = ReferenceName::sanitize("main").unwrap();
    assert_eq!(store.index_key(), "test.references.index");
    assert_eq!(store.body_key(&name), "test.references.body.main");
    assert_eq!(store.storage().keys(), ["test.references.body.main", "test.references.index"]);
}

#[test]
fn delete_removes_index_entry_and_body() {
    let store = store();
    block_on(store.save("gone", &results(&[("a", 1.0)]))).unwrap();
    block_on(store.save("kept", &results(&[("a", 1.0)]))).unwrap();

    block_on(store.delete("gone")).unwrap();

    assert_eq!(block_on(store.load("gone")), Err(BenchError::NotFound("gone".to_string())));
    let index = block_on(store.list()).unwrap();
    assert_eq!(index.len(), 1);
    assert_eq!(index[0].name.value(), "kept");
    assert!(!store.storage().keys().iter().any(|key| key.ends_with(".gone")));
}

#[test]
fn deleting_an_unknown_name_is_a_no_op() {
    let store = store();
    block_on(store.save("kept", &results(&[("a", 1.0)]))).unwrap();
    let before = store.storage().keys();

    block_on(store.delete("never-saved")).unwrap();
    block_on(store.delete("")).unwrap();

    assert_eq!(store.storage().keys(), before);
}

#[test]
fn loading_an_unknown_name_is_not_found() {
    let store = store();
    assert_eq!(block_on(store.load("missing")), Err(BenchError::NotFound("missing".to_string())));
    assert_eq!(block_on(store.load("")), Err(BenchError::NotFound(String::new())));
}

#[test]
fn corrupt_index_surfaces_as_serialization_error() {
    let store = store();
    store.storage().set(&store.index_key(), "not json").unwrap();
    assert!(matches!(block_on(store.list()), Err(BenchError::Serialization(_))));
}

#[quickcheck]
fn sanitized_names_use_the_safe_charset(raw: String) -> bool {
    match ReferenceName::sanitize(&raw) {
        Ok(name) => {
            !name.value().is_empty()
                && name.value().chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
                && name.value().chars().count() == raw.trim().chars().count()
        }
        Err(err) => err == BenchError::EmptyName && raw.trim().is_empty(),
    }
}

#[quickcheck]
fn sanitizing_twice_changes_nothing(raw: String) -> bool {
    match ReferenceName::sanitize(&raw) {
        Ok(name) => ReferenceName::sanitize(name.value()).as_ref() == Ok(&name),
        Err(_) => true,
    }
}
