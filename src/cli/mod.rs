//! CLI command implementations.
//!
//! Each submodule implements one command family. Handlers print their
//! results to stdout and return [`Result`]; argument parsing lives in the
//! binary.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `init` / `setup` | Create the script directory and mark multigit initialized |
//! | `add` / `list` / `remove` | Manage identities, their switch scripts and aliases |
//! | `set-local` | Pin an identity in the current repository |
//! | `export` / `import` | Move identities and groups between machines |
//! | `auto-switch` | Directory mappings and the auto-switch flag |
//! | `group` | Named groups of identities |
//! | `hook` | Pre-commit hook installation |
//!
//! # Example Usage
//!
//! ```bash
//! multigit init --add-to-path
//! multigit add work --user-name "Jane Doe" --user-email jane@corp.example --generate-ssh-key
//! multigit auto-switch add ~/work work
//! multigit auto-switch current
//! ```

// Allow print_stdout in CLI module (consistent with main.rs)
#![allow(clippy::print_stdout)]

pub mod auto_switch;
pub mod group;
pub mod hook;
pub mod identity;
pub mod init;
pub mod transfer;

use std::io::{self, BufRead, Write};

use crate::config::MultiGitConfig;
use crate::services::ServiceContainer;
use crate::{Error, Result};

/// Configuration and services shared by all commands.
pub struct Context {
    /// Resolved configuration.
    pub config: MultiGitConfig,
    /// Services over the configured store.
    pub services: ServiceContainer,
}

impl Context {
    /// Creates a context backed by the configured store.
    #[must_use]
    pub fn new(config: MultiGitConfig) -> Self {
        let services = ServiceContainer::from_config(&config);
        Self { config, services }
    }

    /// Creates a context with explicit services.
    #[must_use]
    pub const fn with_services(config: MultiGitConfig, services: ServiceContainer) -> Self {
        Self { config, services }
    }
}

/// Asks a yes/no question on stdin. Anything but `y`/`yes` is a no.
///
/// # Errors
///
/// Returns an error if stdin cannot be read.
pub fn confirm(prompt: &str) -> Result<bool> {
    print!("{prompt} [y/N] ");
    io::stdout().flush().map_err(|e| Error::OperationFailed {
        operation: "flush_stdout".to_string(),
        cause: e.to_string(),
    })?;

    read_confirmation(&mut io::stdin().lock())
}

fn read_confirmation(input: &mut impl BufRead) -> Result<bool> {
    let mut line = String::new();
    input.read_line(&mut line).map_err(|e| Error::OperationFailed {
        operation: "read_stdin".to_string(),
        cause: e.to_string(),
    })?;

    let answer = line.trim();
    Ok(answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes"))
}
