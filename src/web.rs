//! Browser `localStorage` provider.

use web_sys::Storage;

use crate::error::{Error, Result};
use crate::storage::KeyValueStore;

/// `window.localStorage` as a [`KeyValueStore`].
pub struct LocalStorage {
    inner: Storage,
}

impl LocalStorage {
    /// Bind to the current window's local storage.
    pub fn open() -> Result<Self> {
        let window = web_sys::window()
            .ok_or_else(|| Error::Storage("no browser window available".to_string()))?;
        let inner = window
            .local_storage()
            .map_err(|_| Error::Storage("localStorage is not accessible".to_string()))?
            .ok_or_else(|| Error::Storage("localStorage is disabled".to_string()))?;
        Ok(Self { inner })
    }
}

impl KeyValueStore for LocalStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.inner
            .get_item(key)
            .map_err(|_| Error::Storage(format!("failed to read localStorage key {key}")))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.inner
            .set_item(key, value)
            .map_err(|_| Error::Storage(format!("failed to write localStorage key {key}")))
    }
}
