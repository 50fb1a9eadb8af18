//! Record store: append-only, snapshot-persisted storage of saved cards.
//!
//! The whole record set lives in memory and is serialized to a single blob
//! under [`SNAPSHOT_KEY`] after every insert. A separate marker under
//! [`VERSION_KEY`] records the schema version; a missing or mismatched
//! marker resets the store to empty.
//!
//! If the storage backend fails while opening, the store is disabled:
//! inserts report "not persisted" and listings are empty.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::cards::models::{ContactRecord, PersistedRecord};

pub const SNAPSHOT_KEY: &str = "business_cards_db";
pub const VERSION_KEY: &str = "business_cards_db_version";
/// Bump when the record layout changes. Older snapshots are discarded.
pub const SCHEMA_VERSION: u32 = 3;
/// Page size for "recent records" listings.
pub const RECENT_PAGE_SIZE: usize = 20;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to encode snapshot: {0}")]
    Encode(#[from] serde_json::Error),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Byte-valued key/value backend the snapshot is written to.
pub trait SnapshotStorage: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;
    fn set(&self, key: &str, value: &[u8]) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

impl<T: SnapshotStorage + ?Sized> SnapshotStorage for Arc<T> {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

/// One file per key inside a directory. Writes replace the file atomically.
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }
}

impl SnapshotStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        match fs::read(self.path(key)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), StorageError> {
        let tmp = self.dir.join(format!("{key}.tmp"));
        fs::write(&tmp, value)?;
        fs::rename(&tmp, self.path(key))?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Snapshot {
    schema_version: u32,
    next_id: i64,
    records: Vec<PersistedRecord>,
}

impl Snapshot {
    fn empty() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            next_id: 1,
            records: Vec::new(),
        }
    }

    fn decode(bytes: &[u8]) -> Option<Self> {
        match serde_json::from_slice::<Snapshot>(bytes) {
            Ok(s) if s.schema_version == SCHEMA_VERSION => Some(s),
            Ok(s) => {
                warn!(
                    "Snapshot carries schema version {}, expected {}",
                    s.schema_version, SCHEMA_VERSION
                );
                None
            }
            Err(e) => {
                warn!("Failed to decode existing snapshot: {e}");
                None
            }
        }
    }
}

struct Engine {
    storage: Box<dyn SnapshotStorage>,
    snapshot: Mutex<Snapshot>,
}

impl Engine {
    fn open(storage: Box<dyn SnapshotStorage>) -> Result<Self, StoreError> {
        let marker = storage.get(VERSION_KEY)?;
        let data = storage.get(SNAPSHOT_KEY)?;
        let current = SCHEMA_VERSION.to_string();

        let loaded = match (marker, data) {
            (Some(marker), Some(data)) if marker == current.as_bytes() => Snapshot::decode(&data),
            _ => None,
        };

        let snapshot = match loaded {
            Some(snapshot) => {
                info!(
                    "Loaded record store snapshot ({} records)",
                    snapshot.records.len()
                );
                snapshot
            }
            None => {
                info!("Snapshot version mismatch or no snapshot found, creating new store");
                storage.remove(SNAPSHOT_KEY)?;
                let fresh = Snapshot::empty();
                write_snapshot(storage.as_ref(), &fresh)?;
                storage.set(VERSION_KEY, current.as_bytes())?;
                fresh
            }
        };

        Ok(Self {
            storage,
            snapshot: Mutex::new(snapshot),
        })
    }

    fn lock(&self) -> MutexGuard<'_, Snapshot> {
        self.snapshot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn write_snapshot(storage: &dyn SnapshotStorage, snapshot: &Snapshot) -> Result<(), StoreError> {
    let bytes = serde_json::to_vec(snapshot)?;
    storage.set(SNAPSHOT_KEY, &bytes)?;
    Ok(())
}

/// Saved business cards, most recent first on read.
pub struct RecordStore {
    engine: Option<Engine>,
}

impl RecordStore {
    /// Opens the store over `storage`, resetting it when the schema version
    /// does not match. Never fails; a broken backend yields a disabled store.
    pub fn open(storage: Box<dyn SnapshotStorage>) -> Self {
        match Engine::open(storage) {
            Ok(engine) => Self {
                engine: Some(engine),
            },
            Err(e) => {
                warn!("Record store unavailable, saving is disabled: {e}");
                Self::disabled()
            }
        }
    }

    /// A store that accepts nothing and lists nothing.
    pub fn disabled() -> Self {
        Self { engine: None }
    }

    pub fn is_available(&self) -> bool {
        self.engine.is_some()
    }

    /// Appends `record` with the next id and the current time, then rewrites
    /// the snapshot. Returns `Ok(None)` when the store is disabled. A failed
    /// write leaves the store as it was.
    pub fn insert(&self, record: ContactRecord) -> Result<Option<PersistedRecord>, StoreError> {
        let Some(engine) = &self.engine else {
            debug!("Record store disabled, insert skipped");
            return Ok(None);
        };

        let mut snapshot = engine.lock();
        let persisted = PersistedRecord {
            id: snapshot.next_id,
            created_at: Utc::now(),
            record,
        };
        snapshot.records.push(persisted.clone());
        snapshot.next_id += 1;

        if let Err(e) = write_snapshot(engine.storage.as_ref(), &snapshot) {
            snapshot.records.pop();
            snapshot.next_id -= 1;
            return Err(e);
        }

        info!("Saved business card record {}", persisted.id);
        Ok(Some(persisted))
    }

    /// Up to `limit` records, newest first.
    pub fn list_recent(&self, limit: usize) -> Vec<PersistedRecord> {
        let Some(engine) = &self.engine else {
            return Vec::new();
        };

        let mut records = engine.lock().records.clone();
        records.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        records.truncate(limit);
        records
    }

    pub fn len(&self) -> usize {
        self.engine
            .as_ref()
            .map(|engine| engine.lock().records.len())
            .unwrap_or(0)
    }
}


#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use super::testing::MemoryStorage;
    use super::*;

    fn card(name: &str) -> ContactRecord {
        ContactRecord {
            name: name.to_string(),
            company: "株式会社サンプル".to_string(),
            image_url: "/uploads/business-cards/business-card-1.png".to_string(),
            raw_text: format!("{{\"name\":\"{name}\"}}"),
            ..Default::default()
        }
    }

    fn open_shared(storage: &Arc<MemoryStorage>) -> RecordStore {
        RecordStore::open(Box::new(storage.clone()))
    }

    #[test]
    fn test_open_on_empty_storage_persists_fresh_schema() {
        let storage = Arc::new(MemoryStorage::default());
        let store = open_shared(&storage);

        assert!(store.is_available());
        assert_eq!(store.len(), 0);
        assert_eq!(storage.raw(VERSION_KEY).unwrap(), b"3");
        assert!(storage.raw(SNAPSHOT_KEY).is_some());
    }

    #[test]
    fn test_insert_then_list_round_trips_fields() {
        let store = open_shared(&Arc::new(MemoryStorage::default()));
        let record = card("山田太郎");

        let saved = store.insert(record.clone()).unwrap().unwrap();
        assert_eq!(saved.id, 1);

        let recent = store.list_recent(1);
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].record, record);
        assert_eq!(recent[0].id, saved.id);
        assert_eq!(recent[0].created_at, saved.created_at);
    }

    #[test]
    fn test_ids_increase_and_listing_is_newest_first() {
        let store = open_shared(&Arc::new(MemoryStorage::default()));
        for name in ["a", "b", "c"] {
            store.insert(card(name)).unwrap();
        }

        let ids: Vec<i64> = store.list_recent(RECENT_PAGE_SIZE).iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }

    #[test]
    fn test_listing_is_capped_at_limit() {
        let store = open_shared(&Arc::new(MemoryStorage::default()));
        for i in 0..25 {
            store.insert(card(&format!("person {i}"))).unwrap();
        }

        let recent = store.list_recent(RECENT_PAGE_SIZE);
        assert_eq!(recent.len(), 20);
        assert_eq!(recent[0].id, 25);
        assert_eq!(recent[19].id, 6);
    }

    #[test]
    fn test_records_survive_reopen() {
        let storage = Arc::new(MemoryStorage::default());
        open_shared(&storage).insert(card("佐藤")).unwrap();

        let reopened = open_shared(&storage);
        let recent = reopened.list_recent(RECENT_PAGE_SIZE);
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].record.name, "佐藤");

        let next = reopened.insert(card("鈴木")).unwrap().unwrap();
        assert_eq!(next.id, 2);
    }

    #[test]
    fn test_older_version_marker_resets_store() {
        let storage = Arc::new(MemoryStorage::default());
        open_shared(&storage).insert(card("old")).unwrap();
        storage.put_raw(VERSION_KEY, b"2");

        let reopened = open_shared(&storage);
        assert_eq!(reopened.len(), 0);
        assert_eq!(storage.raw(VERSION_KEY).unwrap(), b"3");

        // The discarded data is gone from storage as well.
        assert_eq!(open_shared(&storage).len(), 0);
    }

    #[test]
    fn test_snapshot_with_stale_schema_tag_resets_store() {
        let storage = Arc::new(MemoryStorage::default());
        storage.put_raw(VERSION_KEY, b"3");
        storage.put_raw(
            SNAPSHOT_KEY,
            br#"{"schema_version":2,"next_id":5,"records":[]}"#,
        );

        let store = open_shared(&storage);
        assert_eq!(store.len(), 0);
        assert_eq!(store.insert(card("x")).unwrap().unwrap().id, 1);
    }

    #[test]
    fn test_corrupt_snapshot_resets_store() {
        let storage = Arc::new(MemoryStorage::default());
        storage.put_raw(VERSION_KEY, b"3");
        storage.put_raw(SNAPSHOT_KEY, b"\x00\x01 not json");

        let store = open_shared(&storage);
        assert!(store.is_available());
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn test_unavailable_backend_disables_store() {
        let storage = Arc::new(MemoryStorage::default());
        storage.fail_reads.store(true, Ordering::SeqCst);

        let store = open_shared(&storage);
        assert!(!store.is_available());
        assert!(store.insert(card("x")).unwrap().is_none());
        assert!(store.list_recent(RECENT_PAGE_SIZE).is_empty());
    }

    #[test]
    fn test_failed_write_rolls_back_insert() {
        let storage = Arc::new(MemoryStorage::default());
        let store = open_shared(&storage);
        store.insert(card("kept")).unwrap();

        storage.fail_writes.store(true, Ordering::SeqCst);
        assert!(store.insert(card("lost")).is_err());
        assert_eq!(store.len(), 1);

        storage.fail_writes.store(false, Ordering::SeqCst);
        let next = store.insert(card("after")).unwrap().unwrap();
        assert_eq!(next.id, 2);
    }

    #[test]
    fn test_file_storage_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();

        let store = RecordStore::open(Box::new(FileStorage::new(dir.path()).unwrap()));
        store.insert(card("田中")).unwrap();
        drop(store);

        let reopened = RecordStore::open(Box::new(FileStorage::new(dir.path()).unwrap()));
        let recent = reopened.list_recent(RECENT_PAGE_SIZE);
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].record.name, "田中");
        assert!(dir.path().join(SNAPSHOT_KEY).exists());
        assert!(!dir.path().join(format!("{SNAPSHOT_KEY}.tmp")).exists());
    }

    #[test]
    fn test_file_storage_missing_key_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("nested")).unwrap();
        assert!(storage.get("absent").unwrap().is_none());
        storage.remove("absent").unwrap();
        assert!(storage.dir().exists());
    }
}
