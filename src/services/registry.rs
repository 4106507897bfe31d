//! Identity registry service.
//!
//! CRUD over the identities stored in the config document. Identities are
//! keyed by name and kept in creation order; upserting an existing name
//! replaces the record where it stands.

use std::sync::Arc;

use super::update_document;
use crate::models::Identity;
use crate::storage::DocumentStore;
use crate::{Error, Result};

/// Service for identity records.
pub struct ConfigRegistry {
    store: Arc<dyn DocumentStore>,
}

impl ConfigRegistry {
    /// Creates a registry over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Inserts `identity`, or replaces the identity with the same name.
    ///
    /// Returns true if an existing identity was replaced.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read or written.
    pub fn upsert(&self, identity: Identity) -> Result<bool> {
        let name = identity.name.clone();
        let replaced = update_document(self.store.as_ref(), |doc| Ok(doc.upsert(identity)))?;

        tracing::info!(identity = %name, replaced, "Identity saved");
        Ok(replaced)
    }

    /// Removes the identity called `name`.
    ///
    /// Removing an unknown identity is not an error; the return value tells
    /// whether anything was removed. Group member lists are left untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read or written.
    pub fn remove(&self, name: &str) -> Result<bool> {
        let removed = update_document(self.store.as_ref(), |doc| Ok(doc.remove(name)))?;

        if removed {
            tracing::info!(identity = %name, "Identity removed");
        }
        Ok(removed)
    }

    /// Returns the identity called `name`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn get(&self, name: &str) -> Result<Option<Identity>> {
        Ok(self.store.load()?.find(name).cloned())
    }

    /// Returns the identity called `name`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigNotFound`] if no such identity exists, or an
    /// error if the store cannot be read.
    pub fn require(&self, name: &str) -> Result<Identity> {
        self.get(name)?
            .ok_or_else(|| Error::ConfigNotFound(name.to_string()))
    }

    /// Returns true if an identity called `name` exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn contains(&self, name: &str) -> Result<bool> {
        Ok(self.store.load()?.position(name).is_some())
    }

    /// Lists all identities in creation order.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn list(&self) -> Result<Vec<Identity>> {
        Ok(self.store.load()?.configs)
    }

    /// Marks multigit as initialized.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read or written.
    pub fn set_initialized(&self) -> Result<()> {
        update_document(self.store.as_ref(), |doc| {
            doc.initialized = true;
            Ok(())
        })
    }

    /// Returns true if multigit has been initialized.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn is_initialized(&self) -> Result<bool> {
        Ok(self.store.load()?.initialized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn create_test_registry() -> (Arc<MemoryStore>, ConfigRegistry) {
        let store = Arc::new(MemoryStore::new());
        let registry = ConfigRegistry::new(store.clone());
        (store, registry)
    }

    fn identity(name: &str, email: &str) -> Identity {
        Identity::new(name, "Jane Doe", email, format!("id_ed25519_{name}"))
    }

    #[test]
    fn test_upsert_twice_keeps_one_record_at_original_position() {
        let (_, registry) = create_test_registry();

        registry.upsert(identity("work", "jane@corp.example")).expect("upsert");
        registry.upsert(identity("personal", "jane@home.example")).expect("upsert");
        let replaced = registry
            .upsert(identity("work", "jane@newcorp.example"))
            .expect("upsert");

        assert!(replaced);
        let all = registry.list().expect("list");
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].name, "work");
        assert_eq!(all[0].user_email, "jane@newcorp.example");
        assert_eq!(all[1].name, "personal");
    }

    #[test]
    fn test_remove_then_get_is_not_found() {
        let (_, registry) = create_test_registry();
        registry.upsert(identity("work", "jane@corp.example")).expect("upsert");

        assert!(registry.remove("work").expect("remove"));
        assert!(registry.get("work").expect("get").is_none());
        assert!(matches!(
            registry.require("work"),
            Err(Error::ConfigNotFound(name)) if name == "work"
        ));
    }

    #[test]
    fn test_remove_absent_is_a_no_op() {
        let (store, registry) = create_test_registry();

        assert!(!registry.remove("ghost").expect("remove"));
        assert!(store.snapshot().is_none(), "nothing should have been written");
    }

    #[test]
    fn test_remove_leaves_group_membership_in_place() {
        let (store, registry) = create_test_registry();
        registry.upsert(identity("work", "jane@corp.example")).expect("upsert");
        let mut doc = store.load().expect("load");
        doc.groups
            .insert("clients".to_string(), vec!["work".to_string()]);
        store.save(&doc).expect("save");

        registry.remove("work").expect("remove");

        let doc = store.load().expect("load");
        assert_eq!(doc.groups["clients"], vec!["work".to_string()]);
    }

    #[test]
    fn test_initialized_flag() {
        let (_, registry) = create_test_registry();

        assert!(!registry.is_initialized().expect("is_initialized"));
        registry.set_initialized().expect("set_initialized");
        assert!(registry.is_initialized().expect("is_initialized"));
    }

    #[test]
    fn test_contains() {
        let (_, registry) = create_test_registry();
        registry.upsert(identity("work", "jane@corp.example")).expect("upsert");

        assert!(registry.contains("work").expect("contains"));
        assert!(!registry.contains("personal").expect("contains"));
    }
}
