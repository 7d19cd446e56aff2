//! Browser `localStorage` behind the core key-value store trait.

use pumpflux::storage::{KeyValueStore, StorageResult};
use pumpflux::StorageError;
use wasm_bindgen::JsValue;

#[derive(Clone, Copy, Default)]
pub struct LocalStorage;

fn storage() -> StorageResult<web_sys::Storage> {
    web_sys::window()
        .ok_or_else(|| StorageError::Unavailable("no window".to_string()))?
        .local_storage()
        .map_err(js_error)?
        .ok_or_else(|| StorageError::Unavailable("localStorage is disabled".to_string()))
}

fn js_error(e: JsValue) -> StorageError {
    StorageError::Unavailable(e.as_string().unwrap_or_else(|| format!("{:?}", e)))
}

impl KeyValueStore for LocalStorage {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        storage()?.get_item(key).map_err(js_error)
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        storage()?.set_item(key, value).map_err(js_error)
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        storage()?.remove_item(key).map_err(js_error)
    }
}
