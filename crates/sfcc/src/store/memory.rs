//! In-process store.

use std::collections::BTreeMap;
use std::sync::RwLock;

use serde_json::Value;

use super::{SecretStore, StoreChange};
use crate::Result;

/// A [`SecretStore`] that lives only as long as the process.
///
/// Useful for tests and for embedding the session logic in a longer-running
/// program that handles persistence itself.
#[derive(Debug, Default)]
pub struct MemorySecretStore {
    entries: RwLock<BTreeMap<String, Value>>,
}

impl MemorySecretStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SecretStore for MemorySecretStore {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: Value) -> Result<()> {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.insert(key.to_string(), value);
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.remove(key);
        Ok(())
    }

    fn apply(&self, changes: Vec<StoreChange<'_>>) -> Result<()> {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        for change in changes {
            match change {
                StoreChange::Set(key, value) => {
                    entries.insert(key.to_string(), value);
                }
                StoreChange::Delete(key) => {
                    entries.remove(key);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn set_get_delete() {
        let store = MemorySecretStore::new();
        assert!(store.is_empty());

        store.set("SFCC_CLIENT_ID", json!("cid")).unwrap();
        assert_eq!(store.get("SFCC_CLIENT_ID").unwrap(), Some(json!("cid")));

        store.delete("SFCC_CLIENT_ID").unwrap();
        assert_eq!(store.get("SFCC_CLIENT_ID").unwrap(), None);
        store.delete("SFCC_CLIENT_ID").unwrap();
    }

    #[test]
    fn apply_batch() {
        let store = MemorySecretStore::new();
        store.set("b", json!(1)).unwrap();
        store
            .apply(vec![
                StoreChange::Set("a", json!(true)),
                StoreChange::Delete("b"),
            ])
            .unwrap();
        assert_eq!(store.get("a").unwrap(), Some(json!(true)));
        assert_eq!(store.get("b").unwrap(), None);
        assert_eq!(store.len(), 1);
    }
}
