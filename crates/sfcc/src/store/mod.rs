//! Durable key/value persistence for session state.
//!
//! The store knows nothing about what it holds; interpreting values is the
//! [`SessionManager`](crate::SessionManager)'s job.

mod file;
mod memory;

use std::sync::Arc;

use serde_json::Value;

use crate::Result;

pub use file::FileSecretStore;
pub use memory::MemorySecretStore;

/// Key holding the last successfully authenticated client id.
pub const CLIENT_ID: &str = "SFCC_CLIENT_ID";
/// Key holding the current bearer token.
pub const CLIENT_TOKEN: &str = "SFCC_CLIENT_TOKEN";
/// Key holding the auto-renewal flag.
pub const CLIENT_RENEW_TOKEN: &str = "SFCC_CLIENT_RENEW_TOKEN";
/// Key holding the basic-encoded credential used for renewal.
pub const CLIENT_RENEW_BASE: &str = "SFCC_CLIENT_RENEW_BASE";

/// A single mutation in a batch passed to [`SecretStore::apply`].
#[derive(Debug, Clone, PartialEq)]
pub enum StoreChange<'a> {
    Set(&'a str, Value),
    Delete(&'a str),
}

/// Key/value persistence backing the session.
///
/// Every `set`/`delete` is durable when it returns.
pub trait SecretStore: Send + Sync {
    /// Read a value. Absent keys yield `None`.
    fn get(&self, key: &str) -> Result<Option<Value>>;

    /// Write a value.
    fn set(&self, key: &str, value: Value) -> Result<()>;

    /// Remove a value. Removing an absent key is not an error.
    fn delete(&self, key: &str) -> Result<()>;

    /// Apply several changes.
    ///
    /// Implementations backed by a single file should override this so the
    /// batch lands in one write.
    fn apply(&self, changes: Vec<StoreChange<'_>>) -> Result<()> {
        for change in changes {
            match change {
                StoreChange::Set(key, value) => self.set(key, value)?,
                StoreChange::Delete(key) => self.delete(key)?,
            }
        }
        Ok(())
    }
}

impl<T: SecretStore + ?Sized> SecretStore for &T {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: Value) -> Result<()> {
        (**self).set(key, value)
    }

    fn delete(&self, key: &str) -> Result<()> {
        (**self).delete(key)
    }

    fn apply(&self, changes: Vec<StoreChange<'_>>) -> Result<()> {
        (**self).apply(changes)
    }
}

impl<T: SecretStore + ?Sized> SecretStore for Arc<T> {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: Value) -> Result<()> {
        (**self).set(key, value)
    }

    fn delete(&self, key: &str) -> Result<()> {
        (**self).delete(key)
    }

    fn apply(&self, changes: Vec<StoreChange<'_>>) -> Result<()> {
        (**self).apply(changes)
    }
}
