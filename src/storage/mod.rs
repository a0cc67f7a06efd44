use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreErr {
    #[error("failed to open store: {0}")]
    Open(String),
    #[error("store backend failure: {0}")]
    Backend(#[from] sled::Error),
}

/// Contract the database core expects from an ordered key-value store:
/// point writes, point reads, and ascending prefix iteration.
pub trait Store {
    fn set(&self, key: &[u8], value: &[u8]) -> Result<(), StoreErr>;

    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreErr>;

    /// All entries whose key starts with `prefix`, in ascending
    /// lexicographic key order. Each call starts a fresh iteration.
    fn scan(&self, prefix: &[u8])
    -> Box<dyn Iterator<Item = Result<(Vec<u8>, Vec<u8>), StoreErr>> + '_>;
}

/// On-disk store backed by sled.
pub struct SledStore {
    db: sled::Db,
}

impl SledStore {
    pub fn open(path: &Path) -> Result<Self, StoreErr> {
        let db = sled::open(path).map_err(|e| StoreErr::Open(e.to_string()))?;
        Ok(Self { db })
    }

    pub fn flush(&self) -> Result<(), StoreErr> {
        self.db.flush()?;
        Ok(())
    }
}

impl Store for SledStore {
    fn set(&self, key: &[u8], value: &[u8]) -> Result<(), StoreErr> {
        self.db.insert(key, value)?;
        Ok(())
    }

    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreErr> {
        Ok(self.db.get(key)?.map(|v| v.to_vec()))
    }

    fn scan(
        &self,
        prefix: &[u8],
    ) -> Box<dyn Iterator<Item = Result<(Vec<u8>, Vec<u8>), StoreErr>> + '_> {
        Box::new(self.db.scan_prefix(prefix).map(|kv| {
            kv.map(|(k, v)| (k.to_vec(), v.to_vec()))
                .map_err(StoreErr::from)
        }))
    }
}

/// In-memory store for tests and ephemeral sessions. Single-threaded,
/// like the rest of the core.
pub struct MemStore {
    entries: RefCell<BTreeMap<Vec<u8>, Vec<u8>>>,
}

impl MemStore {
    pub fn new() -> Self {
        Self {
            entries: RefCell::new(BTreeMap::new()),
        }
    }
}

impl Default for MemStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Store for MemStore {
    fn set(&self, key: &[u8], value: &[u8]) -> Result<(), StoreErr> {
        self.entries
            .borrow_mut()
            .insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreErr> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn scan(
        &self,
        prefix: &[u8],
    ) -> Box<dyn Iterator<Item = Result<(Vec<u8>, Vec<u8>), StoreErr>> + '_> {
        let matches: Vec<_> = self
            .entries
            .borrow()
            .range(prefix.to_vec()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, v)| Ok((k.clone(), v.clone())))
            .collect();
        Box::new(matches.into_iter())
    }
}
