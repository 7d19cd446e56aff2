//! Favorite templates, persisted as a JSON array of ids.

use std::collections::BTreeSet;
use tracing::{debug, warn};

use crate::storage::{KeyValueStore, StorageResult};

/// Storage key shared with the browser UI.
pub const FAVORITES_KEY: &str = "favoriteTemplates";

pub struct FavoritesStore<S> {
    store: S,
    ids: BTreeSet<i64>,
}

impl<S: KeyValueStore> FavoritesStore<S> {
    /// Read favorites from `store`. A corrupt entry is removed and the set
    /// starts empty; only a failing store is an error.
    pub fn load(store: S) -> StorageResult<Self> {
        let ids = match store.get(FAVORITES_KEY)? {
            None => BTreeSet::new(),
            Some(raw) => match serde_json::from_str::<Vec<i64>>(&raw) {
                Ok(ids) => ids.into_iter().collect(),
                Err(e) => {
                    warn!("Resetting unreadable favorites entry: {}", e);
                    store.remove(FAVORITES_KEY)?;
                    BTreeSet::new()
                }
            },
        };
        debug!(count = ids.len(), "Loaded favorites");
        Ok(Self { store, ids })
    }

    /// Flip `id` and persist. Returns whether it is now a favorite.
    pub fn toggle(&mut self, id: i64) -> StorageResult<bool> {
        let now_favorite = if self.ids.remove(&id) {
            false
        } else {
            self.ids.insert(id);
            true
        };
        if let Err(e) = self.persist() {
            // keep memory consistent with what is stored
            if now_favorite {
                self.ids.remove(&id);
            } else {
                self.ids.insert(id);
            }
            return Err(e);
        }
        debug!(id, now_favorite, "Toggled favorite");
        Ok(now_favorite)
    }

    fn persist(&self) -> StorageResult<()> {
        let ids: Vec<i64> = self.ids.iter().copied().collect();
        self.store.set(FAVORITES_KEY, &serde_json::to_string(&ids)?)
    }

    pub fn contains(&self, id: i64) -> bool {
        self.ids.contains(&id)
    }

    pub fn ids(&self) -> &BTreeSet<i64> {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}
