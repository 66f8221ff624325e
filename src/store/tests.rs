#![allow(clippy::unwrap_used)]

use rust_decimal_macros::dec;

use super::*;
use crate::db::{Database, MemoryBlobStore};
use crate::error::ValidationError;

fn draft(name: &str, price: &str, start: &str, cycle: &str) -> SubscriptionDraft {
    SubscriptionDraft {
        name: name.into(),
        price: price.into(),
        start_date: start.into(),
        cycle: cycle.into(),
    }
}

fn empty_store() -> SubscriptionStore<MemoryBlobStore> {
    SubscriptionStore::load(MemoryBlobStore::default()).unwrap()
}

fn seeded_store() -> SubscriptionStore<MemoryBlobStore> {
    let mut store = empty_store();
    store.add(&draft("Netflix", "15.49", "2024-01-31", "monthly")).unwrap();
    store.add(&draft("Domain", "12", "2024-03-01", "yearly")).unwrap();
    store.add(&draft("Gym", "40", "2024-02-10", "monthly")).unwrap();
    store
}

fn persisted(store: &SubscriptionStore<MemoryBlobStore>) -> Vec<Subscription> {
    let raw = store.blobs().read(STORAGE_KEY).unwrap().unwrap();
    serde_json::from_str(&raw).unwrap()
}

/// Blob store whose writes always fail.
#[derive(Default)]
struct ReadOnlyBlobs {
    inner: MemoryBlobStore,
}

impl BlobStore for ReadOnlyBlobs {
    fn read(&self, key: &str) -> anyhow::Result<Option<String>> {
        self.inner.read(key)
    }

    fn write(&mut self, _key: &str, _value: &str) -> anyhow::Result<()> {
        anyhow::bail!("disk full")
    }
}

// ── Loading ───────────────────────────────────────────────────

#[test]
fn test_load_absent_is_empty() {
    let store = empty_store();
    assert!(store.is_empty());
    assert_eq!(store.blobs().read(STORAGE_KEY).unwrap(), None);
}

#[test]
fn test_load_existing() {
    let mut blobs = MemoryBlobStore::default();
    blobs
        .write(
            STORAGE_KEY,
            r##"[{"id":5,"name":"Spotify","price":9.99,"startDate":"2024-05-01","cycle":"monthly","color":"#10B981","cancelled":true}]"##,
        )
        .unwrap();
    let store = SubscriptionStore::load(blobs).unwrap();
    assert_eq!(store.len(), 1);
    let sub = store.get(SubscriptionId(5)).unwrap();
    assert_eq!(sub.name, "Spotify");
    assert!(sub.cancelled);
}

#[test]
fn test_load_corrupt_falls_back_to_empty_and_keeps_backup() {
    let mut db = Database::open_in_memory().unwrap();
    db.write(STORAGE_KEY, "{not valid json").unwrap();
    let store = SubscriptionStore::load(db).unwrap();
    assert!(store.is_empty());

    let keys = store.blobs().keys().unwrap();
    let backup = keys
        .iter()
        .find(|k| k.starts_with("my-subs.corrupt-"))
        .unwrap();
    assert_eq!(
        store.blobs().read(backup).unwrap().as_deref(),
        Some("{not valid json")
    );
}

#[test]
fn test_corrupt_data_is_backed_up_only_once() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("subtrack.db");
    let mut db = Database::open(&path).unwrap();
    db.write(STORAGE_KEY, "{not valid json").unwrap();
    drop(db);

    for _ in 0..3 {
        let store = SubscriptionStore::load(Database::open(&path).unwrap()).unwrap();
        assert!(store.is_empty());
        assert_eq!(
            store.blobs().read(STORAGE_KEY).unwrap().as_deref(),
            Some("[]")
        );
    }

    let keys = Database::open(&path).unwrap().keys().unwrap();
    let backups = keys
        .iter()
        .filter(|k| k.starts_with("my-subs.corrupt-"))
        .count();
    assert_eq!(backups, 1);
}

#[test]
fn test_load_invalid_record_falls_back_to_empty() {
    let mut blobs = MemoryBlobStore::default();
    blobs
        .write(STORAGE_KEY, r#"[{"id":1,"name":"","price":1}]"#)
        .unwrap();
    let store = SubscriptionStore::load(blobs).unwrap();
    assert!(store.is_empty());
}

// ── add ───────────────────────────────────────────────────────

#[test]
fn test_add_assigns_id_color_and_persists() {
    let mut store = empty_store();
    let sub = store
        .add(&draft("  Netflix ", "15.49", "2024-01-31", "monthly"))
        .unwrap();
    assert_eq!(sub.name, "Netflix");
    assert_eq!(sub.price, dec!(15.49));
    assert_eq!(sub.cycle, Cycle::Monthly);
    assert!(!sub.cancelled);
    assert!(PaletteColor::all().contains(&sub.color));
    assert_eq!(persisted(&store), vec![sub]);
}

#[test]
fn test_add_keeps_insertion_order_and_unique_ids() {
    let store = seeded_store();
    let names: Vec<&str> = store.subscriptions().iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["Netflix", "Domain", "Gym"]);
    let ids: HashSet<SubscriptionId> = store.subscriptions().iter().map(|s| s.id).collect();
    assert_eq!(ids.len(), 3);
}

#[test]
fn test_add_rejects_empty_name() {
    let mut store = seeded_store();
    let err = store.add(&draft("   ", "5", "2024-01-01", "monthly")).unwrap_err();
    assert!(matches!(err, StoreError::Validation(ValidationError::EmptyName)));
    assert_eq!(store.len(), 3);
    assert_eq!(persisted(&store).len(), 3);
}

#[test]
fn test_add_rejects_negative_price() {
    let mut store = seeded_store();
    let err = store.add(&draft("Bad", "-1", "2024-01-01", "monthly")).unwrap_err();
    assert!(matches!(
        err,
        StoreError::Validation(ValidationError::NegativePrice(_))
    ));
    assert_eq!(store.len(), 3);
}

#[test]
fn test_add_rejects_price_beyond_limit_and_keeps_data() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("subtrack.db");
    {
        let mut store = SubscriptionStore::load(Database::open(&path).unwrap()).unwrap();
        store.add(&draft("Netflix", "15.49", "2024-01-31", "monthly")).unwrap();
        store.add(&draft("Domain", "12", "2024-03-01", "yearly")).unwrap();
        let err = store
            .add(&draft("Huge", "79228162514264337593543950335", "2024-01-01", "monthly"))
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::Validation(ValidationError::PriceTooLarge(_))
        ));
    }
    let store = SubscriptionStore::load(Database::open(&path).unwrap()).unwrap();
    assert_eq!(store.len(), 2);
}

#[test]
fn test_add_rejects_fractional_cents() {
    let mut store = seeded_store();
    let err = store
        .add(&draft("Precise", "1.23456789012345678", "2024-01-01", "monthly"))
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::Validation(ValidationError::PricePrecision(_))
    ));
    assert_eq!(persisted(&store).len(), 3);
}

#[test]
fn test_prices_at_the_limits_reload_exactly() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("subtrack.db");
    {
        let mut store = SubscriptionStore::load(Database::open(&path).unwrap()).unwrap();
        store.add(&draft("Top", "1000000", "2024-01-01", "yearly")).unwrap();
        store.add(&draft("Just under", "999999.99", "2024-01-01", "monthly")).unwrap();
        store.add(&draft("Cent", "0.01", "2024-01-01", "monthly")).unwrap();
    }
    let store = SubscriptionStore::load(Database::open(&path).unwrap()).unwrap();
    let prices: Vec<_> = store.subscriptions().iter().map(|s| s.price).collect();
    assert_eq!(prices, [dec!(1000000), dec!(999999.99), dec!(0.01)]);
}

#[test]
fn test_add_rejects_bad_date_and_cycle() {
    let mut store = empty_store();
    assert!(store.add(&draft("A", "1", "2024-13-01", "monthly")).is_err());
    assert!(store.add(&draft("A", "1", "2024-01-01", "weekly")).is_err());
    assert!(store.is_empty());
}

#[test]
fn test_ids_never_reused_after_delete() {
    let mut store = empty_store();
    let first = store.add(&draft("A", "1", "2024-01-01", "monthly")).unwrap();
    store.delete(first.id).unwrap();
    let second = store.add(&draft("B", "1", "2024-01-01", "monthly")).unwrap();
    assert!(second.id > first.id);
}

// ── update ────────────────────────────────────────────────────

#[test]
fn test_update_in_place() {
    let mut store = seeded_store();
    let id = store.subscriptions()[1].id;
    let patch = SubscriptionPatch {
        price: Some("15".into()),
        cycle: Some("monthly".into()),
        ..Default::default()
    };
    let updated = store.update(id, &patch).unwrap();
    assert_eq!(updated.name, "Domain");
    assert_eq!(updated.price, dec!(15));
    assert_eq!(updated.cycle, Cycle::Monthly);
    assert_eq!(store.subscriptions()[1], updated);
    assert_eq!(persisted(&store)[1], updated);
}

#[test]
fn test_update_not_found() {
    let mut store = seeded_store();
    let patch = SubscriptionPatch {
        name: Some("X".into()),
        ..Default::default()
    };
    let err = store.update(SubscriptionId(1), &patch).unwrap_err();
    assert!(matches!(err, StoreError::NotFound(SubscriptionId(1))));
}

#[test]
fn test_update_validates_changed_fields() {
    let mut store = seeded_store();
    let before = store.subscriptions().to_vec();
    let id = before[0].id;
    let patch = SubscriptionPatch {
        name: Some("Renamed".into()),
        price: Some("-3".into()),
        ..Default::default()
    };
    assert!(store.update(id, &patch).is_err());
    assert_eq!(store.subscriptions(), before.as_slice());
}

// ── delete / toggle / recolor ─────────────────────────────────

#[test]
fn test_delete() {
    let mut store = seeded_store();
    let id = store.subscriptions()[0].id;
    assert!(store.delete(id).unwrap());
    assert_eq!(store.len(), 2);
    assert!(store.get(id).is_none());
    assert_eq!(persisted(&store).len(), 2);
}

#[test]
fn test_delete_missing_is_noop() {
    let mut store = seeded_store();
    assert!(!store.delete(SubscriptionId(42)).unwrap());
    assert_eq!(store.len(), 3);
}

#[test]
fn test_toggle_cancelled() {
    let mut store = seeded_store();
    let id = store.subscriptions()[2].id;
    assert!(store.toggle_cancelled(id).unwrap());
    assert!(store.get(id).unwrap().cancelled);
    assert!(persisted(&store)[2].cancelled);
    assert!(store.toggle_cancelled(id).unwrap());
    assert!(!store.get(id).unwrap().cancelled);
    assert!(!store.toggle_cancelled(SubscriptionId(42)).unwrap());
}

#[test]
fn test_recolor() {
    let mut store = seeded_store();
    let id = store.subscriptions()[0].id;
    assert!(store.recolor(id, "#14B8A6").unwrap());
    assert_eq!(store.get(id).unwrap().color, PaletteColor::Teal);
    assert!(store.recolor(id, "pink").unwrap());
    assert_eq!(persisted(&store)[0].color, PaletteColor::Pink);
}

#[test]
fn test_recolor_outside_palette_is_rejected() {
    let mut store = seeded_store();
    let id = store.subscriptions()[0].id;
    let before = store.get(id).unwrap().color;
    for bad in ["#9CA3AF", "#123456", "purple"] {
        let err = store.recolor(id, bad).unwrap_err();
        assert!(matches!(
            err,
            StoreError::Validation(ValidationError::InvalidColor(_))
        ));
        assert_eq!(store.get(id).unwrap().color, before);
    }
}

#[test]
fn test_recolor_missing_is_noop() {
    let mut store = seeded_store();
    assert!(!store.recolor(SubscriptionId(42), "red").unwrap());
}

// ── Persistence failures ──────────────────────────────────────

#[test]
fn test_failed_write_leaves_state_unchanged() {
    let mut store = SubscriptionStore::load(ReadOnlyBlobs::default()).unwrap();
    let err = store
        .add(&draft("Netflix", "15.49", "2024-01-31", "monthly"))
        .unwrap_err();
    assert!(matches!(err, StoreError::Persistence(_)));
    assert!(!err.is_user_error());
    assert!(store.is_empty());
}

#[test]
fn test_encode_failure_is_not_a_user_error() {
    let cause = serde_json::from_str::<u8>("x").unwrap_err();
    let err = StoreError::Encode(cause);
    assert!(!err.is_user_error());
    assert_eq!(err.to_string(), "failed to encode subscriptions");
    assert!(std::error::Error::source(&err).is_some());
}

// ── Snapshots ─────────────────────────────────────────────────

#[test]
fn test_export_is_pretty_json_array() {
    let store = seeded_store();
    let bytes = store.export_snapshot().unwrap();
    let text = String::from_utf8(bytes).unwrap();
    assert!(text.starts_with("[\n  {"));
    assert!(text.contains("\"startDate\": \"2024-01-31\""));
}

#[test]
fn test_export_import_roundtrip() {
    let mut store = seeded_store();
    let id = store.subscriptions()[1].id;
    store.toggle_cancelled(id).unwrap();
    let original = store.subscriptions().to_vec();
    let bytes = store.export_snapshot().unwrap();

    let mut other = empty_store();
    other.add(&draft("Leftover", "1", "2020-01-01", "yearly")).unwrap();
    assert_eq!(other.import_snapshot(&bytes).unwrap(), 3);
    assert_eq!(other.subscriptions(), original.as_slice());
    assert_eq!(persisted(&other), original);
}

#[test]
fn test_import_malformed_json_leaves_store_unchanged() {
    let mut store = seeded_store();
    let before = store.subscriptions().to_vec();
    let err = store.import_snapshot(b"{not valid json").unwrap_err();
    assert!(matches!(err, StoreError::Import(ImportError::Malformed(_))));
    assert_eq!(store.subscriptions(), before.as_slice());
    assert_eq!(persisted(&store), before);
}

#[test]
fn test_import_non_array_is_rejected() {
    let mut store = seeded_store();
    let err = store.import_snapshot(br#"{"subs": []}"#).unwrap_err();
    assert!(matches!(err, StoreError::Import(ImportError::NotAnArray)));
    assert_eq!(store.len(), 3);
}

#[test]
fn test_import_empty_array_clears_store() {
    let mut store = seeded_store();
    assert_eq!(store.import_snapshot(b"[]").unwrap(), 0);
    assert!(store.is_empty());
    assert!(persisted(&store).is_empty());
}

#[test]
fn test_import_validates_each_record() {
    let mut store = seeded_store();

    let missing_id = br##"[{"name":"x","price":1,"startDate":"2024-01-01","cycle":"monthly","color":"#EF4444"}]"##;
    assert!(matches!(
        store.import_snapshot(missing_id).unwrap_err(),
        StoreError::Import(ImportError::Record { index: 0, .. })
    ));

    let negative = br##"[
        {"id":1,"name":"ok","price":1,"startDate":"2024-01-01","cycle":"monthly","color":"#EF4444"},
        {"id":2,"name":"bad","price":-4,"startDate":"2024-01-01","cycle":"monthly","color":"#EF4444"}
    ]"##;
    assert!(matches!(
        store.import_snapshot(negative).unwrap_err(),
        StoreError::Import(ImportError::Invalid { index: 1, .. })
    ));

    let fractional = br##"[{"id":1,"name":"x","price":1.234,"startDate":"2024-01-01","cycle":"monthly","color":"#EF4444"}]"##;
    assert!(matches!(
        store.import_snapshot(fractional).unwrap_err(),
        StoreError::Import(ImportError::Invalid {
            index: 0,
            source: ValidationError::PricePrecision(_),
        })
    ));

    let duplicate = br##"[
        {"id":1,"name":"a","price":1,"startDate":"2024-01-01","cycle":"monthly","color":"#EF4444"},
        {"id":1,"name":"b","price":1,"startDate":"2024-01-01","cycle":"yearly","color":"#EF4444"}
    ]"##;
    assert!(matches!(
        store.import_snapshot(duplicate).unwrap_err(),
        StoreError::Import(ImportError::DuplicateId { index: 1, .. })
    ));

    assert_eq!(store.len(), 3);
}

#[test]
fn test_ids_after_import_stay_unique() {
    let mut store = empty_store();
    let far_future = br##"[{"id":99999999999999,"name":"a","price":1,"startDate":"2024-01-01","cycle":"monthly","color":"#EF4444"}]"##;
    store.import_snapshot(far_future).unwrap();
    let added = store.add(&draft("b", "1", "2024-01-01", "monthly")).unwrap();
    assert_eq!(added.id, SubscriptionId(100_000_000_000_000));
}

// ── Files ─────────────────────────────────────────────────────

#[test]
fn test_export_file_name() {
    let today = NaiveDate::from_ymd_opt(2025, 10, 19).unwrap();
    assert_eq!(export_file_name(today), "subscriptions-2025-10-19.json");
}

#[test]
fn test_export_to_dir_and_import_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let today = NaiveDate::from_ymd_opt(2025, 10, 19).unwrap();
    let store = seeded_store();
    let path = store.export_to_file(dir.path(), today).unwrap();
    assert_eq!(path, dir.path().join("subscriptions-2025-10-19.json"));

    let mut db_store = SubscriptionStore::load(Database::open_in_memory().unwrap()).unwrap();
    assert_eq!(db_store.import_from_file(&path).unwrap(), 3);
    assert_eq!(db_store.subscriptions(), store.subscriptions());
}

#[test]
fn test_import_from_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = seeded_store();
    assert!(store.import_from_file(&dir.path().join("nope.json")).is_err());
    assert_eq!(store.len(), 3);
}

#[test]
fn test_store_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("subtrack.db");
    let added = {
        let mut store = SubscriptionStore::load(Database::open(&path).unwrap()).unwrap();
        store.add(&draft("Netflix", "15.49", "2024-01-31", "monthly")).unwrap()
    };
    let store = SubscriptionStore::load(Database::open(&path).unwrap()).unwrap();
    assert_eq!(store.subscriptions(), &[added]);
}
