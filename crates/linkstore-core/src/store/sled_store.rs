//! Embedded sled backend. Same key space as etcd, kept in a single default tree.

use super::KvBackend;
use crate::error::{StoreError, StoreResult};
use async_trait::async_trait;
use std::path::Path;

pub struct SledBackend {
    db: sled::Db,
}

impl SledBackend {
    /// Opens or creates the database at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let db = sled::open(path)?;
        Ok(Self { db })
    }

    /// In-memory database removed on drop.
    pub fn temporary() -> StoreResult<Self> {
        let db = sled::Config::new().temporary(true).open()?;
        Ok(Self { db })
    }
}

fn key_to_string(key: &[u8]) -> StoreResult<String> {
    String::from_utf8(key.to_vec()).map_err(|e| StoreError::Encoding(e.to_string()))
}

#[async_trait]
impl KvBackend for SledBackend {
    fn name(&self) -> &'static str {
        "sled"
    }

    async fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        Ok(self.db.get(key.as_bytes())?.map(|iv| iv.to_vec()))
    }

    async fn put(&self, key: &str, value: &[u8]) -> StoreResult<()> {
        self.db.insert(key.as_bytes(), value)?;
        Ok(())
    }

    async fn put_if_absent(&self, key: &str, value: &[u8]) -> StoreResult<Option<Vec<u8>>> {
        match self
            .db
            .compare_and_swap(key.as_bytes(), None as Option<&[u8]>, Some(value))?
        {
            Ok(()) => Ok(None),
            Err(conflict) => Ok(conflict.current.map(|iv| iv.to_vec())),
        }
    }

    async fn scan_prefix(&self, prefix: &str) -> StoreResult<Vec<(String, Vec<u8>)>> {
        let mut out = Vec::new();
        for item in self.db.scan_prefix(prefix.as_bytes()) {
            let (k, v) = item?;
            out.push((key_to_string(&k)?, v.to_vec()));
        }
        Ok(out)
    }

    async fn delete(&self, key: &str) -> StoreResult<bool> {
        Ok(self.db.remove(key.as_bytes())?.is_some())
    }

    async fn delete_prefix(&self, prefix: &str) -> StoreResult<u64> {
        let keys: Vec<sled::IVec> = self
            .db
            .scan_prefix(prefix.as_bytes())
            .keys()
            .collect::<Result<_, _>>()?;
        let mut removed = 0;
        for key in keys {
            if self.db.remove(key)?.is_some() {
                removed += 1;
            }
        }
        Ok(removed)
    }
}
