//! Export file format.

use super::{Identity, is_valid_identity_name};
use super::document::{GroupMap, null_as_default};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Version written into every export.
pub const EXPORT_FORMAT_VERSION: &str = "1.0.0";

/// Portable snapshot of identities and groups.
///
/// Directory mappings and flags are machine specific and are not exported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportData {
    /// Export format version.
    #[serde(default)]
    pub version: String,
    /// Exported identities.
    pub configs: Vec<Identity>,
    /// Exported groups.
    #[serde(default, deserialize_with = "null_as_default")]
    pub groups: GroupMap,
    /// When the export was produced.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exported_at: Option<DateTime<Utc>>,
}

impl ExportData {
    /// Builds an export stamped with the current time.
    #[must_use]
    pub fn new(configs: Vec<Identity>, groups: GroupMap) -> Self {
        Self {
            version: EXPORT_FORMAT_VERSION.to_string(),
            configs,
            groups,
            exported_at: Some(Utc::now()),
        }
    }

    /// Parses an import payload.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if `json` is not valid JSON, has no
    /// `configs` field, `configs` is not an array, or an entry is not a
    /// valid identity, including the checks in [`ExportData::validate`].
    pub fn from_json(json: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(json)
            .map_err(|e| Error::InvalidConfig(format!("failed to parse import file: {e}")))?;

        if !value.get("configs").is_some_and(serde_json::Value::is_array) {
            return Err(Error::InvalidConfig(
                "invalid export file format: missing configs array".to_string(),
            ));
        }

        let export: Self = serde_json::from_value(value)
            .map_err(|e| Error::InvalidConfig(format!("failed to parse import file: {e}")))?;
        export.validate()?;
        Ok(export)
    }

    /// Rejects identities whose names or key names are not plain file
    /// names, and group members that could not name an identity.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] describing the first bad entry.
    pub fn validate(&self) -> Result<()> {
        for identity in &self.configs {
            identity
                .validate()
                .map_err(|e| Error::InvalidConfig(format!("invalid export file: {e}")))?;
        }
        for (group, members) in &self.groups {
            if let Some(member) = members.iter().find(|m| !is_valid_identity_name(m)) {
                return Err(Error::InvalidConfig(format!(
                    "invalid export file: group \"{group}\" has invalid member {member:?}"
                )));
            }
        }
        Ok(())
    }

    /// Serializes the export as pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| Error::InvalidConfig(format!("failed to serialize export: {e}")))
    }
}

/// Outcome of merging an import into the current document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSummary {
    /// Identities that did not exist before.
    pub added: Vec<String>,
    /// Identities that replaced an existing record.
    pub updated: Vec<String>,
    /// Groups written by the import.
    pub groups: Vec<String>,
}

impl ImportSummary {
    /// One line description of the import.
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "{} added, {} updated, {} groups",
            self.added.len(),
            self.updated.len(),
            self.groups.len()
        )
    }
}
