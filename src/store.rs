use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::Result;

pub const INVOICES: &str = "invoices";
pub const PAYMENTS: &str = "payments";

/// Named collections, each loaded and saved as a whole.
pub trait Store {
    fn load<T: DeserializeOwned>(&self, name: &str) -> Result<Vec<T>>;
    fn save<T: Serialize>(&self, name: &str, records: &[T]) -> Result<()>;
}

/// One pretty-printed JSON array per collection under `dir`.
#[derive(Debug, Clone)]
pub struct JsonStore {
    dir: PathBuf,
}

impl JsonStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.json", name))
    }
}

impl Store for JsonStore {
    fn load<T: DeserializeOwned>(&self, name: &str) -> Result<Vec<T>> {
        let path = self.path_for(name);
        if !path.exists() {
            debug!(store = name, "Store file missing, starting empty");
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&path)?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&content)?)
    }

    fn save<T: Serialize>(&self, name: &str, records: &[T]) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(name);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_string_pretty(records)?)?;
        fs::rename(&tmp, &path)?;
        debug!(store = name, records = records.len(), path = %path.display(), "Saved store");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::invoice;
    use crate::model::{Invoice, Payment};
    use tempfile::TempDir;

    #[test]
    fn test_missing_store_loads_empty() {
        let tmp = TempDir::new().unwrap();
        let store = JsonStore::new(tmp.path().join("store"));
        let invoices: Vec<Invoice> = store.load(INVOICES).unwrap();
        assert!(invoices.is_empty());
    }

    #[test]
    fn test_save_then_load() {
        let tmp = TempDir::new().unwrap();
        let store = JsonStore::new(tmp.path().join("store"));
        let invoices = vec![invoice(1, "Acme", "2024-01-01", 100.0), invoice(2, "Beta", "2024-02-01", 5.5)];

        store.save(INVOICES, &invoices).unwrap();
        let loaded: Vec<Invoice> = store.load(INVOICES).unwrap();
        assert_eq!(loaded, invoices);
        assert!(!tmp.path().join("store/invoices.json.tmp").exists());

        let payments: Vec<Payment> = store.load(PAYMENTS).unwrap();
        assert!(payments.is_empty());
    }

    #[test]
    fn test_save_overwrites_whole_collection() {
        let tmp = TempDir::new().unwrap();
        let store = JsonStore::new(tmp.path());
        store.save(INVOICES, &[invoice(1, "Acme", "2024-01-01", 1.0)]).unwrap();
        store.save::<Invoice>(INVOICES, &[]).unwrap();
        let loaded: Vec<Invoice> = store.load(INVOICES).unwrap();
        assert!(loaded.is_empty());
    }

    #[test]
    fn test_corrupt_store_is_an_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("invoices.json"), "{ not json").unwrap();
        let store = JsonStore::new(tmp.path());
        assert!(store.load::<Invoice>(INVOICES).is_err());
    }
}
