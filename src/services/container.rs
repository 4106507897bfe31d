//! Service container.
//!
//! Wires one [`DocumentStore`] into every service so the CLI can hand out
//! registries that all see the same document.

use std::sync::Arc;

use super::{ConfigRegistry, DirectoryResolver, GroupRegistry, MatchMode, TransferService};
use crate::config::MultiGitConfig;
use crate::storage::{DocumentStore, JsonFileStore};

/// Container for the services sharing one config document.
pub struct ServiceContainer {
    store: Arc<dyn DocumentStore>,
    match_mode: MatchMode,
}

impl ServiceContainer {
    /// Creates a container backed by `config.json` in the configured
    /// directory.
    #[must_use]
    pub fn from_config(config: &MultiGitConfig) -> Self {
        let store: Arc<dyn DocumentStore> = Arc::new(JsonFileStore::new(config.store_path()));
        Self {
            store,
            match_mode: config.match_mode,
        }
    }

    /// Creates a container over an existing store.
    #[must_use]
    pub fn with_store(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            match_mode: MatchMode::default(),
        }
    }

    /// Sets the directory match mode.
    #[must_use]
    pub const fn with_match_mode(mut self, mode: MatchMode) -> Self {
        self.match_mode = mode;
        self
    }

    /// Returns the underlying store.
    #[must_use]
    pub fn store(&self) -> Arc<dyn DocumentStore> {
        Arc::clone(&self.store)
    }

    /// Returns the identity registry.
    #[must_use]
    pub fn registry(&self) -> ConfigRegistry {
        ConfigRegistry::new(self.store())
    }

    /// Returns the group registry.
    #[must_use]
    pub fn groups(&self) -> GroupRegistry {
        GroupRegistry::new(self.store())
    }

    /// Returns the directory resolver.
    #[must_use]
    pub fn directories(&self) -> DirectoryResolver {
        DirectoryResolver::new(self.store()).with_match_mode(self.match_mode)
    }

    /// Returns the export/import service.
    #[must_use]
    pub fn transfer(&self) -> TransferService {
        TransferService::new(self.store())
    }
}
