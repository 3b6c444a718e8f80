use std::{env, fs, path::PathBuf};

use uuid::Uuid;

use scout_storage::{Change, FileStore, KvStore, MemoryStore};

fn temp_store_path() -> PathBuf {
	env::temp_dir().join(format!("scout_store_test_{}", Uuid::new_v4().simple())).join("state.json")
}

fn exercise(store: &dyn KvStore) {
	assert_eq!(store.get("missing").expect("get failed"), None);

	store.set("a", "1").expect("set failed");
	store.set("a", "2").expect("set failed");

	assert_eq!(store.get("a").expect("get failed").as_deref(), Some("2"));

	store.remove("a").expect("remove failed");
	store.remove("a").expect("second remove must be a no-op");

	assert_eq!(store.get("a").expect("get failed"), None);

	store
		.apply(&[Change::set("x", "1"), Change::set("y", "2"), Change::remove("x")])
		.expect("apply failed");

	assert_eq!(store.get("x").expect("get failed"), None);
	assert_eq!(store.get("y").expect("get failed").as_deref(), Some("2"));
}

#[test]
fn memory_store_round_trips_values() {
	exercise(&MemoryStore::new());
}

#[test]
fn file_store_round_trips_values() {
	let path = temp_store_path();

	exercise(&FileStore::open(&path).expect("open failed"));

	if let Some(parent) = path.parent() {
		let _ = fs::remove_dir_all(parent);
	}
}

#[test]
fn file_store_survives_reopen() {
	let path = temp_store_path();

	{
		let store = FileStore::open(&path).expect("open failed");

		store.set("auth_token", "abc").expect("set failed");
	}

	let reopened = FileStore::open(&path).expect("reopen failed");

	assert_eq!(reopened.get("auth_token").expect("get failed").as_deref(), Some("abc"));

	if let Some(parent) = path.parent() {
		let _ = fs::remove_dir_all(parent);
	}
}

#[test]
fn json_helpers_report_invalid_values() {
	let store = MemoryStore::new();

	scout_storage::write_json(&store, "list", &vec!["a", "b"]).expect("write failed");

	let list: Option<Vec<String>> = scout_storage::read_json(&store, "list").expect("read failed");

	assert_eq!(list, Some(vec!["a".to_string(), "b".to_string()]));

	store.set("broken", "{not json").expect("set failed");

	let err = scout_storage::read_json::<Vec<String>>(&store, "broken")
		.expect_err("Expected invalid value error.");

	assert!(err.to_string().contains("Invalid broken value"));
}
