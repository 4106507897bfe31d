//! Export and import of identities and groups.
//!
//! Imports merge into the current document: identities are upserted by
//! name and imported groups replace same-named groups wholesale. The
//! `initialized` flag, auto-switch flag and directory mappings are never
//! touched by an import.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::sync::Arc;

use super::update_document;
use crate::models::{ExportData, ImportSummary};
use crate::storage::DocumentStore;
use crate::{Error, Result};

/// Service for export/import.
pub struct TransferService {
    store: Arc<dyn DocumentStore>,
}

impl TransferService {
    /// Creates a transfer service over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Exports all identities and groups.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn export_all(&self) -> Result<ExportData> {
        let document = self.store.load()?;
        Ok(ExportData::new(document.configs, document.groups))
    }

    /// Merges `payload` into the current document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if an identity or group member in
    /// `payload` is unsafe to write to disk, in which case nothing is
    /// stored, or an error if the store cannot be read or written.
    pub fn import_all(&self, payload: ExportData) -> Result<ImportSummary> {
        payload.validate()?;

        let summary = update_document(self.store.as_ref(), |doc| {
            let mut summary = ImportSummary::default();
            for identity in payload.configs {
                let name = identity.name.clone();
                if doc.upsert(identity) {
                    summary.updated.push(name);
                } else {
                    summary.added.push(name);
                }
            }
            for (group, members) in payload.groups {
                summary.groups.push(group.clone());
                doc.groups.insert(group, members);
            }
            Ok(summary)
        })?;

        tracing::info!(
            added = summary.added.len(),
            updated = summary.updated.len(),
            groups = summary.groups.len(),
            "Import merged"
        );
        Ok(summary)
    }

    /// Exports to a pretty-printed JSON file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read or the file cannot be
    /// written.
    pub fn export_to_file(&self, path: impl AsRef<Path>) -> Result<ExportData> {
        let path = path.as_ref();
        let export = self.export_all()?;
        fs::write(path, export.to_json()?)
            .map_err(|e| Error::file_system("write export file", path, e))?;

        tracing::info!(path = %path.display(), configs = export.configs.len(), "Exported");
        Ok(export)
    }

    /// Imports the export file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if the file does not exist or is not
    /// a valid export, [`Error::FileSystem`] if it cannot be read, or an
    /// error if the store cannot be read or written.
    pub fn import_from_file(&self, path: impl AsRef<Path>) -> Result<ImportSummary> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                Error::InvalidConfig(format!("file not found: {}", path.display()))
            } else {
                Error::file_system("read import file", path, e)
            }
        })?;

        self.import_all(ExportData::from_json(&contents)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ConfigDocument, GroupMap, Identity};
    use crate::services::{ConfigRegistry, GroupRegistry};
    use crate::storage::MemoryStore;
    use tempfile::TempDir;

    fn identity(name: &str, email: &str) -> Identity {
        Identity::new(name, "Jane", email, format!("id_{name}"))
    }

    fn populated_store() -> Arc<dyn DocumentStore> {
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
        let registry = ConfigRegistry::new(Arc::clone(&store));
        registry.upsert(identity("work", "jane@corp.example")).expect("upsert");
        registry.upsert(identity("oss", "jane@oss.example")).expect("upsert");
        GroupRegistry::new(Arc::clone(&store))
            .add_to_group("work", "clients")
            .expect("group");
        store
    }

    #[test]
    fn test_export_contains_configs_and_groups() {
        let service = TransferService::new(populated_store());

        let export = service.export_all().expect("export");
        let names: Vec<&str> = export.configs.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["work", "oss"]);
        assert_eq!(export.groups["clients"], vec!["work".to_string()]);
        assert_eq!(export.version, "1.0.0");
    }

    #[test]
    fn test_import_into_empty_store_round_trips() {
        let export = TransferService::new(populated_store())
            .export_all()
            .expect("export");

        let target: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
        let service = TransferService::new(Arc::clone(&target));
        let summary = service.import_all(export.clone()).expect("import");

        assert_eq!(summary.added, vec!["work".to_string(), "oss".to_string()]);
        assert!(summary.updated.is_empty());
        let doc = target.load().expect("load");
        assert_eq!(doc.configs, export.configs);
        assert_eq!(doc.groups, export.groups);
    }

    #[test]
    fn test_import_twice_is_idempotent() {
        let export = TransferService::new(populated_store())
            .export_all()
            .expect("export");
        let target: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
        let service = TransferService::new(Arc::clone(&target));

        service.import_all(export.clone()).expect("first import");
        let after_first = target.load().expect("load");
        let summary = service.import_all(export).expect("second import");

        assert!(summary.added.is_empty());
        assert_eq!(summary.updated.len(), 2);
        assert_eq!(target.load().expect("load"), after_first);
    }

    #[test]
    fn test_import_merges_without_touching_local_state() {
        let mut existing = ConfigDocument::new();
        existing.initialized = true;
        existing.auto_switch_enabled = true;
        existing.upsert(identity("work", "old@corp.example"));
        existing.upsert(identity("home", "jane@home.example"));
        existing
            .groups
            .insert("clients".to_string(), vec!["home".to_string()]);
        existing.groups.insert("keep".to_string(), Vec::new());
        existing
            .directory_mappings
            .insert("/home/jane/work".to_string(), "work".to_string());
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::with_document(existing));

        let mut payload = ExportData::new(
            vec![identity("work", "new@corp.example"), identity("oss", "jane@oss.example")],
            Default::default(),
        );
        payload
            .groups
            .insert("clients".to_string(), vec!["work".to_string()]);

        TransferService::new(Arc::clone(&store))
            .import_all(payload)
            .expect("import");

        let doc = store.load().expect("load");
        let names: Vec<&str> = doc.configs.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["work", "home", "oss"]);
        assert_eq!(doc.configs[0].user_email, "new@corp.example");
        assert_eq!(doc.groups["clients"], vec!["work".to_string()]);
        assert!(doc.groups.contains_key("keep"));
        assert!(doc.initialized);
        assert!(doc.auto_switch_enabled);
        assert_eq!(doc.directory_mappings.len(), 1);
    }

    #[test]
    fn test_import_rejects_unsafe_identity_before_writing() {
        let store = Arc::new(MemoryStore::new());
        let mut bad = identity("evil", "x@y.z");
        bad.name = "x/../../../evil".to_string();
        let payload = ExportData::new(vec![identity("ok", "ok@y.z"), bad], GroupMap::default());

        let err = TransferService::new(store.clone())
            .import_all(payload)
            .unwrap_err();

        assert!(matches!(err, Error::InvalidConfig(_)));
        assert!(store.snapshot().is_none());
    }

    #[test]
    fn test_import_rejects_shell_in_key_name() {
        let store = Arc::new(MemoryStore::new());
        let mut bad = identity("work", "x@y.z");
        bad.ssh_key_name = "k; touch /tmp/x".to_string();

        let result = TransferService::new(store.clone())
            .import_all(ExportData::new(vec![bad], GroupMap::default()));

        assert!(matches!(result, Err(Error::InvalidConfig(_))));
        assert!(store.snapshot().is_none());
    }

    #[test]
    fn test_file_round_trip() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let file = dir.path().join("export.json");

        TransferService::new(populated_store())
            .export_to_file(&file)
            .expect("export");

        let target: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
        let summary = TransferService::new(Arc::clone(&target))
            .import_from_file(&file)
            .expect("import");
        assert_eq!(summary.added.len(), 2);
        assert_eq!(target.load().expect("load").groups.len(), 1);
    }

    #[test]
    fn test_import_missing_file_is_invalid_config() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let service = TransferService::new(Arc::new(MemoryStore::new()));

        let err = service
            .import_from_file(dir.path().join("nope.json"))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(ref msg) if msg.contains("file not found")));
    }

    #[test]
    fn test_import_without_configs_is_rejected_and_store_untouched() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let file = dir.path().join("bad.json");
        fs::write(&file, r#"{"version":"1.0.0","groups":{"g":[]}}"#).expect("write");

        let store = Arc::new(MemoryStore::new());
        let err = TransferService::new(store.clone())
            .import_from_file(&file)
            .unwrap_err();

        assert!(matches!(err, Error::InvalidConfig(_)));
        assert!(store.snapshot().is_none());
    }
}
