//! Directory to identity resolution.
//!
//! Directory mappings associate a canonical absolute path with an identity
//! name. [`DirectoryResolver::resolve`] picks the mapping whose key is the
//! longest match for a path, which lets `~/work` and `~/work/oss` map to
//! different identities.
//!
//! # Matching
//!
//! Both the stored keys and the queried path are canonicalized without
//! touching the filesystem (see [`canonicalize_with_base`]). A key matches
//! according to [`MatchMode`]:
//!
//! - [`MatchMode::Prefix`]: plain string prefix. `/home/user` matches
//!   `/home/user2` as well as `/home/user/src`.
//! - [`MatchMode::Segment`]: the key must be the whole path or end at a path
//!   separator within it. `/home/user` matches `/home/user/src` but not
//!   `/home/user2`.
//!
//! Among matching keys the longest wins. Keys are scanned in sorted order
//! and only a strictly longer key replaces the current best, so equal-length
//! candidates resolve to the first in sorted order.

use std::path::{Component, MAIN_SEPARATOR, Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;

use super::update_document;
use crate::models::DirectoryMap;
use crate::storage::DocumentStore;
use crate::{Error, Result};

/// How a mapping key is compared with a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// String prefix comparison.
    #[default]
    Prefix,
    /// Prefix comparison on path segment boundaries.
    Segment,
}

impl MatchMode {
    /// Returns the mode as a string slice.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Prefix => "prefix",
            Self::Segment => "segment",
        }
    }

    /// Parses a mode name, case-insensitively.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "prefix" => Some(Self::Prefix),
            "segment" | "segments" => Some(Self::Segment),
            _ => None,
        }
    }

    /// Returns true if the mapping `key` covers `path`.
    #[must_use]
    pub fn matches(self, key: &str, path: &str) -> bool {
        if !path.starts_with(key) {
            return false;
        }
        match self {
            Self::Prefix => true,
            Self::Segment => {
                key.ends_with(MAIN_SEPARATOR)
                    || path.len() == key.len()
                    || path[key.len()..].starts_with(MAIN_SEPARATOR)
            },
        }
    }
}

/// Service for directory mappings and the auto-switch flag.
pub struct DirectoryResolver {
    store: Arc<dyn DocumentStore>,
    mode: MatchMode,
}

impl DirectoryResolver {
    /// Creates a resolver over `store` using [`MatchMode::Prefix`].
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            mode: MatchMode::default(),
        }
    }

    /// Sets the match mode.
    #[must_use]
    pub const fn with_match_mode(mut self, mode: MatchMode) -> Self {
        self.mode = mode;
        self
    }

    /// Returns the match mode in use.
    #[must_use]
    pub const fn match_mode(&self) -> MatchMode {
        self.mode
    }

    /// Maps `path` to `identity`, replacing any mapping for the same path.
    ///
    /// Returns the canonical key that was stored.
    ///
    /// # Errors
    ///
    /// Returns an error if a relative path cannot be resolved against the
    /// current directory, or if the store cannot be read or written.
    pub fn add_mapping(&self, path: impl AsRef<Path>, identity: &str) -> Result<String> {
        let key = canonicalize(path.as_ref())?;
        update_document(self.store.as_ref(), |doc| {
            doc.directory_mappings
                .insert(key.clone(), identity.to_string());
            Ok(())
        })?;

        tracing::info!(path = %key, identity = %identity, "Directory mapping added");
        Ok(key)
    }

    /// Removes the mapping stored for exactly `path`.
    ///
    /// Returns true if a mapping was removed; an absent mapping is not an
    /// error.
    ///
    /// # Errors
    ///
    /// Returns an error if a relative path cannot be resolved against the
    /// current directory, or if the store cannot be read or written.
    pub fn remove_mapping(&self, path: impl AsRef<Path>) -> Result<bool> {
        let key = canonicalize(path.as_ref())?;
        let removed = update_document(self.store.as_ref(), |doc| {
            Ok(doc.directory_mappings.remove(&key).is_some())
        })?;

        if removed {
            tracing::info!(path = %key, "Directory mapping removed");
        }
        Ok(removed)
    }

    /// Returns the identity mapped to `path`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if a relative path cannot be resolved against the
    /// current directory, or if the store cannot be read.
    pub fn resolve(&self, path: impl AsRef<Path>) -> Result<Option<String>> {
        let target = canonicalize(path.as_ref())?;
        let document = self.store.load()?;
        let resolved =
            find_best_match(&document.directory_mappings, &target, self.mode).map(str::to_string);

        tracing::debug!(
            path = %target,
            mode = self.mode.as_str(),
            identity = resolved.as_deref().unwrap_or("<none>"),
            "Resolved directory"
        );
        Ok(resolved)
    }

    /// Returns the identity mapped to the current working directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the current directory cannot be determined or the
    /// store cannot be read.
    pub fn resolve_current(&self) -> Result<Option<String>> {
        self.resolve(current_dir()?)
    }

    /// Lists `(path, identity)` mappings in key order.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn list_mappings(&self) -> Result<Vec<(String, String)>> {
        Ok(self
            .store
            .load()?
            .directory_mappings
            .into_iter()
            .collect())
    }

    /// Enables auto-switching.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read or written.
    pub fn enable(&self) -> Result<()> {
        self.set_enabled(true)
    }

    /// Disables auto-switching.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read or written.
    pub fn disable(&self) -> Result<()> {
        self.set_enabled(false)
    }

    /// Returns true if auto-switching is enabled.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn is_enabled(&self) -> Result<bool> {
        Ok(self.store.load()?.auto_switch_enabled)
    }

    fn set_enabled(&self, enabled: bool) -> Result<()> {
        update_document(self.store.as_ref(), |doc| {
            doc.auto_switch_enabled = enabled;
            Ok(())
        })?;
        tracing::info!(enabled, "Auto-switch updated");
        Ok(())
    }
}

/// Finds the identity whose mapping key is the longest match for `path`.
///
/// `path` must already be canonical.
#[must_use]
pub fn find_best_match<'a>(
    mappings: &'a DirectoryMap,
    path: &str,
    mode: MatchMode,
) -> Option<&'a str> {
    let mut best: Option<(&str, &str)> = None;
    for (key, identity) in mappings {
        if !mode.matches(key, path) {
            continue;
        }
        if best.is_none_or(|(best_key, _)| key.len() > best_key.len()) {
            best = Some((key.as_str(), identity.as_str()));
        }
    }
    best.map(|(_, identity)| identity)
}

/// Canonicalizes `path`, resolving relative paths against the current
/// working directory.
fn canonicalize(path: &Path) -> Result<String> {
    if path.is_absolute() {
        return Ok(canonicalize_with_base(path, Path::new("")));
    }
    Ok(canonicalize_with_base(path, &current_dir()?))
}

fn current_dir() -> Result<PathBuf> {
    std::env::current_dir().map_err(|e| Error::file_system("read current directory", ".", e))
}

/// Canonicalizes `path` lexically.
///
/// Relative paths are joined onto `base`. `.` components are dropped, `..`
/// removes the previous component (never above the root), and trailing
/// separators disappear. Symlinks are not resolved.
#[must_use]
pub fn canonicalize_with_base(path: &Path, base: &Path) -> String {
    let joined;
    let path = if path.is_absolute() {
        path
    } else {
        joined = base.join(path);
        joined.as_path()
    };

    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => normalized.push(component.as_os_str()),
            Component::CurDir => {},
            Component::ParentDir => {
                if normalized.parent().is_some() {
                    normalized.pop();
                }
            },
            Component::Normal(part) => normalized.push(part),
        }
    }

    normalized.to_string_lossy().into_owned()
}
