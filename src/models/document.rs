//! The persisted configuration document.
//!
//! Everything multigit knows lives in one [`ConfigDocument`]. It is loaded
//! fresh for every operation and written back after every mutation, so the
//! helpers here are plain in-memory edits with no I/O.
//!
//! Documents written by older releases may lack `groups`, `autoSwitchEnabled`
//! or `directoryMappings`, and may carry `null` where a value is expected.
//! Those fields deserialize to their empty defaults instead of failing.

use super::Identity;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Group name to ordered member identity names.
pub type GroupMap = BTreeMap<String, Vec<String>>;

/// Canonical directory path to identity name.
pub type DirectoryMap = BTreeMap<String, String>;

/// All persisted multigit state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigDocument {
    /// Whether `multigit init` has run.
    #[serde(default, deserialize_with = "null_as_default")]
    pub initialized: bool,
    /// Identities in creation order.
    #[serde(default, deserialize_with = "lenient_configs")]
    pub configs: Vec<Identity>,
    /// Named groups of identity names.
    #[serde(default, deserialize_with = "null_as_default")]
    pub groups: GroupMap,
    /// Whether directory based switching is enabled.
    #[serde(default, deserialize_with = "null_as_default")]
    pub auto_switch_enabled: bool,
    /// Directory mappings keyed by canonical absolute path.
    #[serde(default, deserialize_with = "null_as_default")]
    pub directory_mappings: DirectoryMap,
}

impl ConfigDocument {
    /// Creates an empty, uninitialized document.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of the identity called `name`.
    #[must_use]
    pub fn position(&self, name: &str) -> Option<usize> {
        self.configs.iter().position(|c| c.name == name)
    }

    /// Looks up an identity by name.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&Identity> {
        self.configs.iter().find(|c| c.name == name)
    }

    /// Looks up an identity by name for modification.
    pub fn find_mut(&mut self, name: &str) -> Option<&mut Identity> {
        self.configs.iter_mut().find(|c| c.name == name)
    }

    /// Inserts or replaces an identity by name.
    ///
    /// A replaced identity keeps its position. Returns true if an existing
    /// identity was replaced.
    pub fn upsert(&mut self, identity: Identity) -> bool {
        match self.position(&identity.name) {
            Some(index) => {
                self.configs[index] = identity;
                true
            },
            None => {
                self.configs.push(identity);
                false
            },
        }
    }

    /// Removes the identity called `name`. Returns true if one was removed.
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.configs.len();
        self.configs.retain(|c| c.name != name);
        self.configs.len() != before
    }
}

/// Deserializes `null` as the type's default.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accepts a missing or non-array `configs` as empty; array elements must
/// still be valid identities.
fn lenient_configs<'de, D>(deserializer: D) -> Result<Vec<Identity>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    match value {
        serde_json::Value::Array(_) => serde_json::from_value(value).map_err(D::Error::custom),
        _ => Ok(Vec::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(name: &str, email: &str) -> Identity {
        Identity::new(name, "User", email, format!("id_{name}"))
    }

    #[test]
    fn test_upsert_appends_then_replaces_in_place() {
        let mut doc = ConfigDocument::new();
        assert!(!doc.upsert(identity("a", "a@x.io")));
        assert!(!doc.upsert(identity("b", "b@x.io")));
        assert!(!doc.upsert(identity("c", "c@x.io")));

        assert!(doc.upsert(identity("b", "b2@x.io")));

        let names: Vec<&str> = doc.configs.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert_eq!(doc.configs[1].user_email, "b2@x.io");
    }

    #[test]
    fn test_remove_reports_whether_anything_changed() {
        let mut doc = ConfigDocument::new();
        doc.upsert(identity("a", "a@x.io"));

        assert!(!doc.remove("missing"));
        assert!(doc.remove("a"));
        assert!(doc.configs.is_empty());
    }

    #[test]
    fn test_legacy_document_defaults_missing_fields() {
        let json = r#"{"initialized":true,"configs":[{"name":"w","displayName":"W","userName":"U","userEmail":"u@x.io","sshKeyName":"k"}]}"#;
        let doc: ConfigDocument = serde_json::from_str(json).expect("parse");

        assert!(doc.initialized);
        assert_eq!(doc.configs.len(), 1);
        assert!(doc.groups.is_empty());
        assert!(!doc.auto_switch_enabled);
        assert!(doc.directory_mappings.is_empty());
    }

    #[test]
    fn test_nulls_and_non_array_configs_default() {
        let json = r#"{"initialized":null,"configs":{"oops":1},"groups":null,"autoSwitchEnabled":null,"directoryMappings":null}"#;
        let doc: ConfigDocument = serde_json::from_str(json).expect("parse");
        assert_eq!(doc, ConfigDocument::default());
    }

    #[test]
    fn test_invalid_identity_in_array_is_an_error() {
        let json = r#"{"configs":[{"name":"w"}]}"#;
        assert!(serde_json::from_str::<ConfigDocument>(json).is_err());
    }

    #[test]
    fn test_serializes_with_camel_case_keys() {
        let mut doc = ConfigDocument::new();
        doc.auto_switch_enabled = true;
        doc.directory_mappings
            .insert("/home/u/work".to_string(), "work".to_string());

        let json = serde_json::to_value(&doc).expect("serialize");
        assert_eq!(json["autoSwitchEnabled"], true);
        assert_eq!(json["directoryMappings"]["/home/u/work"], "work");
        assert!(json["groups"].as_object().is_some_and(serde_json::Map::is_empty));
    }
}
