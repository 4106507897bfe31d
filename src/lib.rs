//! # multigit
//!
//! Manage multiple named git identities on a single machine.
//!
//! multigit keeps a small JSON document of identities (user name, email and
//! SSH key), generates `use-<name>` switch scripts and shell aliases for them,
//! and can map directories to identities so a shell hook can switch
//! automatically.
//!
//! ## Features
//!
//! - Identity registry with upsert-by-name semantics
//! - Named groups of identities
//! - Longest-prefix directory resolution for auto-switching
//! - Export/import with merge into existing state
//! - Script, alias, SSH key and git hook helpers for the CLI
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use multigit::{ConfigRegistry, DirectoryResolver, Identity, MemoryStore};
//!
//! let store = Arc::new(MemoryStore::new());
//! let registry = ConfigRegistry::new(store.clone());
//! registry.upsert(Identity::new("work", "Jane Doe", "jane@corp.example", "id_ed25519_work"))?;
//!
//! let resolver = DirectoryResolver::new(store);
//! resolver.add_mapping("/home/jane/work", "work")?;
//! assert_eq!(resolver.resolve("/home/jane/work/api")?.as_deref(), Some("work"));
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![forbid(unsafe_code)]
#![allow(clippy::multiple_crate_versions)]

use std::path::PathBuf;

use thiserror::Error as ThisError;

// Module declarations
pub mod cli;
pub mod config;
pub mod git;
pub mod models;
pub mod observability;
pub mod services;
pub mod shell;
pub mod ssh;
pub mod storage;

// Re-exports for convenience
pub use config::MultiGitConfig;
pub use models::{ConfigDocument, ExportData, Identity, ImportSummary};
pub use services::{
    ConfigRegistry, DirectoryResolver, GroupRegistry, MatchMode, ServiceContainer,
    TransferService,
};
pub use storage::{DocumentStore, JsonFileStore, MemoryStore};

/// Error type for multigit operations.
///
/// # Error Variant Triggers
///
/// | Variant | Raised When |
/// |---------|-------------|
/// | `FileSystem` | Reading or writing the store, an export file, a script or a shell profile fails |
/// | `InvalidConfig` | Persisted or imported JSON is malformed, or an import payload has no `configs` array |
/// | `ConfigNotFound` | An operation names an identity that is not registered |
/// | `AlreadyExists` | Creating a group (or SSH key, or identity without `--force`) that already exists |
/// | `GroupNotFound` | Deleting a group that does not exist |
/// | `SshKeyNotFound` | Adding an identity whose key file is missing and generation was not requested |
/// | `InvalidInput` | CLI-level validation fails (identity name, email, shell name) |
/// | `CommandFailed` | `git` or `ssh-keygen` could not be spawned or exited unsuccessfully |
/// | `OperationFailed` | Process-level setup such as logging initialization fails |
#[derive(Debug, ThisError)]
pub enum Error {
    /// A filesystem operation failed.
    ///
    /// The underlying I/O error is kept as the error source.
    #[error("failed to {operation} '{}': {source}", path.display())]
    FileSystem {
        /// What was being attempted (e.g. "write config file").
        operation: String,
        /// The path involved.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Persisted or imported configuration could not be understood.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// The named identity does not exist.
    #[error("configuration \"{0}\" not found")]
    ConfigNotFound(String),

    /// The named entity already exists.
    #[error("{kind} \"{name}\" already exists")]
    AlreadyExists {
        /// Kind of entity ("group", "configuration", "SSH key").
        kind: &'static str,
        /// Name of the entity.
        name: String,
    },

    /// The named group does not exist.
    #[error("group \"{0}\" does not exist")]
    GroupNotFound(String),

    /// The SSH private key for an identity is missing.
    #[error("SSH key not found at {}", .0.display())]
    SshKeyNotFound(PathBuf),

    /// Invalid input was provided.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// An external command failed.
    #[error("command '{command}' failed: {cause}")]
    CommandFailed {
        /// The command that was run.
        command: String,
        /// The underlying cause.
        cause: String,
    },

    /// A general operation failed.
    #[error("operation '{operation}' failed: {cause}")]
    OperationFailed {
        /// The operation that failed.
        operation: String,
        /// The underlying cause.
        cause: String,
    },
}

impl Error {
    /// Builds a [`Error::FileSystem`] from an I/O error.
    pub fn file_system(
        operation: impl Into<String>,
        path: impl Into<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Self::FileSystem {
            operation: operation.into(),
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for multigit operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_error_display() {
        let err = Error::ConfigNotFound("work".to_string());
        assert_eq!(err.to_string(), "configuration \"work\" not found");

        let err = Error::AlreadyExists {
            kind: "group",
            name: "clients".to_string(),
        };
        assert_eq!(err.to_string(), "group \"clients\" already exists");

        let err = Error::GroupNotFound("clients".to_string());
        assert_eq!(err.to_string(), "group \"clients\" does not exist");

        let err = Error::InvalidConfig("missing configs array".to_string());
        assert_eq!(err.to_string(), "invalid config: missing configs array");
    }

    #[test]
    fn test_file_system_error_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = Error::file_system("write config file", "/tmp/config.json", io);

        assert_eq!(
            err.to_string(),
            "failed to write config file '/tmp/config.json': denied"
        );
        let source = err.source().expect("source should be preserved");
        assert_eq!(source.to_string(), "denied");
    }
}
