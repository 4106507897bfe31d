//! In-memory document store.
//!
//! Holds the document in process memory. Used by tests and by callers that
//! embed the services without touching the user's real configuration.

use crate::Result;
use crate::models::ConfigDocument;
use crate::storage::traits::DocumentStore;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Document store kept entirely in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    document: Mutex<Option<ConfigDocument>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that already holds `document`.
    #[must_use]
    pub fn with_document(document: ConfigDocument) -> Self {
        Self {
            document: Mutex::new(Some(document)),
        }
    }

    /// Returns a copy of the stored document, if any has been saved.
    #[must_use]
    pub fn snapshot(&self) -> Option<ConfigDocument> {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, Option<ConfigDocument>> {
        self.document.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl DocumentStore for MemoryStore {
    fn load(&self) -> Result<ConfigDocument> {
        Ok(self.lock().clone().unwrap_or_default())
    }

    fn save(&self, document: &ConfigDocument) -> Result<()> {
        *self.lock() = Some(document.clone());
        Ok(())
    }

    fn exists(&self) -> Result<bool> {
        Ok(self.lock().is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_before_save_is_default() {
        let store = MemoryStore::new();
        assert_eq!(store.load().expect("load"), ConfigDocument::default());
        assert!(!store.exists().expect("exists"));
        assert!(store.snapshot().is_none());
    }

    #[test]
    fn test_loaded_documents_are_independent_copies() {
        let store = MemoryStore::new();
        let mut doc = store.load().expect("load");
        doc.initialized = true;

        assert!(!store.load().expect("load").initialized);

        store.save(&doc).expect("save");
        assert!(store.load().expect("load").initialized);
        assert!(store.exists().expect("exists"));
    }
}
