//! Group management service.
//!
//! Groups are named, ordered sets of identity names stored in the config
//! document's `groups` map.
//!
//! # Membership bookkeeping
//!
//! | Operation | Effect on `groups` | Effect on `Identity::group` |
//! |-----------|--------------------|-----------------------------|
//! | Create group | new empty list (fails if the key exists) | none |
//! | Add to group | created lazily, name appended once | set to the group |
//! | Remove from group | name dropped if present | cleared if it named this group |
//! | Delete group | key removed (fails if absent) | cleared on every identity naming it |
//!
//! The membership map allows an identity in several groups, while the
//! identity's own `group` field only remembers the most recent
//! `add_to_group`. Removing an identity from the registry does not purge it
//! from member lists.
//!
//! # Example
//!
//! ```rust,ignore
//! use multigit::services::GroupRegistry;
//!
//! let groups = GroupRegistry::new(store);
//! groups.create_group("clients")?;
//! groups.add_to_group("acme", "clients")?;
//! assert_eq!(groups.list_members("clients")?, vec!["acme"]);
//! ```

use std::sync::Arc;

use super::update_document;
use crate::storage::DocumentStore;
use crate::{Error, Result};

/// Service for identity groups.
pub struct GroupRegistry {
    store: Arc<dyn DocumentStore>,
}

impl GroupRegistry {
    /// Creates a group registry over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    // =========================================================================
    // Group Operations
    // =========================================================================

    /// Creates an empty group.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AlreadyExists`] if the group exists, or an error if
    /// the store cannot be read or written.
    pub fn create_group(&self, name: &str) -> Result<()> {
        update_document(self.store.as_ref(), |doc| {
            if doc.groups.contains_key(name) {
                return Err(Error::AlreadyExists {
                    kind: "group",
                    name: name.to_string(),
                });
            }
            doc.groups.insert(name.to_string(), Vec::new());
            Ok(())
        })?;

        tracing::info!(group = %name, "Group created");
        Ok(())
    }

    /// Deletes a group and clears it from every identity that references it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::GroupNotFound`] if the group does not exist, or an
    /// error if the store cannot be read or written.
    pub fn delete_group(&self, name: &str) -> Result<()> {
        let cleared = update_document(self.store.as_ref(), |doc| {
            if doc.groups.remove(name).is_none() {
                return Err(Error::GroupNotFound(name.to_string()));
            }

            let mut cleared = 0usize;
            for identity in &mut doc.configs {
                if identity.group.as_deref() == Some(name) {
                    identity.group = None;
                    cleared += 1;
                }
            }
            Ok(cleared)
        })?;

        tracing::info!(group = %name, cleared, "Group deleted");
        Ok(())
    }

    /// Lists group names in key order.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn list_groups(&self) -> Result<Vec<String>> {
        Ok(self.store.load()?.groups.into_keys().collect())
    }

    /// Returns true if the group exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn group_exists(&self, name: &str) -> Result<bool> {
        Ok(self.store.load()?.groups.contains_key(name))
    }

    // =========================================================================
    // Member Operations
    // =========================================================================

    /// Adds an identity to a group, creating the group if needed.
    ///
    /// Adding an existing member does not duplicate it. The identity's
    /// `group` field is set to `group` either way.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigNotFound`] if the identity does not exist, or
    /// an error if the store cannot be read or written.
    pub fn add_to_group(&self, identity: &str, group: &str) -> Result<()> {
        update_document(self.store.as_ref(), |doc| {
            let record = doc
                .find_mut(identity)
                .ok_or_else(|| Error::ConfigNotFound(identity.to_string()))?;
            record.group = Some(group.to_string());

            let members = doc.groups.entry(group.to_string()).or_default();
            if !members.iter().any(|m| m == identity) {
                members.push(identity.to_string());
            }
            Ok(())
        })?;

        tracing::info!(identity = %identity, group = %group, "Identity added to group");
        Ok(())
    }

    /// Removes an identity from a group.
    ///
    /// Missing groups and non-members are ignored. The identity's `group`
    /// field is cleared only if it names this group.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read or written.
    pub fn remove_from_group(&self, identity: &str, group: &str) -> Result<()> {
        let removed = update_document(self.store.as_ref(), |doc| {
            let Some(members) = doc.groups.get_mut(group) else {
                return Ok(false);
            };
            let before = members.len();
            members.retain(|m| m != identity);
            let removed = members.len() != before;

            if let Some(record) = doc.find_mut(identity) {
                if record.group.as_deref() == Some(group) {
                    record.group = None;
                }
            }
            Ok(removed)
        })?;

        if removed {
            tracing::info!(identity = %identity, group = %group, "Identity removed from group");
        }
        Ok(())
    }

    /// Lists the members of a group in insertion order.
    ///
    /// Returns an empty list for an unknown group.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn list_members(&self, group: &str) -> Result<Vec<String>> {
        Ok(self
            .store
            .load()?
            .groups
            .remove(group)
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Identity;
    use crate::services::ConfigRegistry;
    use crate::storage::MemoryStore;

    fn create_test_service() -> (ConfigRegistry, GroupRegistry) {
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
        let registry = ConfigRegistry::new(Arc::clone(&store));
        registry
            .upsert(Identity::new("work", "Jane", "jane@corp.example", "id_work"))
            .expect("upsert");
        registry
            .upsert(Identity::new("oss", "Jane", "jane@oss.example", "id_oss"))
            .expect("upsert");
        (registry, GroupRegistry::new(store))
    }

    #[test]
    fn test_create_group_twice_fails() {
        let (_, groups) = create_test_service();

        groups.create_group("g").expect("create");
        let result = groups.create_group("g");

        assert!(matches!(
            result,
            Err(Error::AlreadyExists { kind: "group", ref name }) if name == "g"
        ));
        assert!(groups.list_members("g").expect("members").is_empty());
    }

    #[test]
    fn test_add_missing_identity_fails() {
        let (_, groups) = create_test_service();

        let result = groups.add_to_group("missing-id", "g");
        assert!(matches!(result, Err(Error::ConfigNotFound(ref name)) if name == "missing-id"));
        assert!(!groups.group_exists("g").expect("exists"));
    }

    #[test]
    fn test_add_creates_group_lazily_and_suppresses_duplicates() {
        let (registry, groups) = create_test_service();

        groups.add_to_group("work", "clients").expect("add");
        groups.add_to_group("oss", "clients").expect("add");
        groups.add_to_group("work", "clients").expect("add");

        assert_eq!(
            groups.list_members("clients").expect("members"),
            vec!["work".to_string(), "oss".to_string()]
        );
        let work = registry.require("work").expect("work");
        assert_eq!(work.group.as_deref(), Some("clients"));
    }

    #[test]
    fn test_group_field_tracks_most_recent_add() {
        let (registry, groups) = create_test_service();

        groups.add_to_group("work", "a").expect("add");
        groups.add_to_group("work", "b").expect("add");

        assert_eq!(groups.list_members("a").expect("a"), vec!["work".to_string()]);
        assert_eq!(groups.list_members("b").expect("b"), vec!["work".to_string()]);
        assert_eq!(
            registry.require("work").expect("work").group.as_deref(),
            Some("b")
        );
    }

    #[test]
    fn test_remove_from_group_only_clears_matching_group_field() {
        let (registry, groups) = create_test_service();
        groups.add_to_group("work", "a").expect("add");
        groups.add_to_group("work", "b").expect("add");

        groups.remove_from_group("work", "a").expect("remove");

        assert!(groups.list_members("a").expect("a").is_empty());
        assert_eq!(
            registry.require("work").expect("work").group.as_deref(),
            Some("b")
        );

        groups.remove_from_group("work", "b").expect("remove");
        assert!(registry.require("work").expect("work").group.is_none());
    }

    #[test]
    fn test_remove_from_missing_group_is_a_no_op() {
        let (_, groups) = create_test_service();
        groups.remove_from_group("work", "nope").expect("remove");
        assert!(!groups.group_exists("nope").expect("exists"));
    }

    #[test]
    fn test_delete_group_clears_group_fields() {
        let (registry, groups) = create_test_service();
        groups.add_to_group("work", "g").expect("add");
        groups.add_to_group("oss", "g").expect("add");

        groups.delete_group("g").expect("delete");

        assert!(groups.list_groups().expect("groups").is_empty());
        for identity in registry.list().expect("list") {
            assert!(identity.group.is_none(), "{} still in group", identity.name);
        }
    }

    #[test]
    fn test_delete_missing_group_fails() {
        let (_, groups) = create_test_service();
        assert!(matches!(
            groups.delete_group("g"),
            Err(Error::GroupNotFound(ref name)) if name == "g"
        ));
    }

    #[test]
    fn test_list_groups_in_key_order() {
        let (_, groups) = create_test_service();
        groups.create_group("zeta").expect("create");
        groups.create_group("alpha").expect("create");

        assert_eq!(
            groups.list_groups().expect("groups"),
            vec!["alpha".to_string(), "zeta".to_string()]
        );
    }
}
