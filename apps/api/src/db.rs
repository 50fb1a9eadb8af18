use std::path::Path;

use tracing::{info, warn};

use crate::cards::store::{FileStorage, RecordStore};

/// Opens the card record store under `data_dir`.
/// Falls back to a disabled store if the directory cannot be used.
pub fn open_record_store(data_dir: &Path) -> RecordStore {
    info!("Opening record store in {}...", data_dir.display());

    match FileStorage::new(data_dir) {
        Ok(storage) => {
            let dir = storage.dir().to_path_buf();
            let store = RecordStore::open(Box::new(storage));
            if store.is_available() {
                info!(
                    "Record store ready at {} ({} records)",
                    dir.display(),
                    store.len()
                );
            }
            store
        }
        Err(e) => {
            warn!("Cannot use {} for the record store: {e}", data_dir.display());
            RecordStore::disabled()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opens_store_in_fresh_directory() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_record_store(&dir.path().join("data"));
        assert!(store.is_available());
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn test_unusable_directory_disables_store() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("not-a-dir");
        std::fs::write(&file, b"x").unwrap();

        let store = open_record_store(&file.join("data"));
        assert!(!store.is_available());
    }
}
