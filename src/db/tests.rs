#![allow(clippy::unwrap_used)]

use super::*;

#[test]
fn test_read_missing_key() {
    let db = Database::open_in_memory().unwrap();
    assert_eq!(db.read("my-subs").unwrap(), None);
}

#[test]
fn test_write_then_read() {
    let mut db = Database::open_in_memory().unwrap();
    db.write("my-subs", "[]").unwrap();
    assert_eq!(db.read("my-subs").unwrap().as_deref(), Some("[]"));
}

#[test]
fn test_write_overwrites_wholesale() {
    let mut db = Database::open_in_memory().unwrap();
    db.write("my-subs", r#"[{"id":1}]"#).unwrap();
    db.write("my-subs", "[]").unwrap();
    assert_eq!(db.read("my-subs").unwrap().as_deref(), Some("[]"));
    assert_eq!(db.keys().unwrap(), vec!["my-subs".to_string()]);
}

#[test]
fn test_keys_are_independent() {
    let mut db = Database::open_in_memory().unwrap();
    db.write("a", "1").unwrap();
    db.write("b", "2").unwrap();
    assert_eq!(db.read("a").unwrap().as_deref(), Some("1"));
    assert_eq!(db.read("b").unwrap().as_deref(), Some("2"));
}

#[test]
fn test_migrate_is_idempotent() {
    let mut db = Database::open_in_memory().unwrap();
    db.write("my-subs", "[]").unwrap();
    db.migrate().unwrap();
    let version: i32 = db
        .conn
        .query_row("SELECT version FROM schema_version", [], |row| row.get(0))
        .unwrap();
    assert_eq!(version, schema::CURRENT_VERSION);
    assert_eq!(db.read("my-subs").unwrap().as_deref(), Some("[]"));
}

#[test]
fn test_file_database_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("subtrack.db");
    {
        let mut db = Database::open(&path).unwrap();
        db.write("my-subs", "[1,2,3]").unwrap();
    }
    let db = Database::open(&path).unwrap();
    assert_eq!(db.read("my-subs").unwrap().as_deref(), Some("[1,2,3]"));
}

#[test]
fn test_memory_blob_store() {
    let mut blobs = MemoryBlobStore::default();
    assert_eq!(blobs.read("k").unwrap(), None);
    blobs.write("k", "v").unwrap();
    assert_eq!(blobs.read("k").unwrap().as_deref(), Some("v"));
}
