//! `hook` command.

use std::path::PathBuf;

use super::Context;
use crate::{Error, Result, git};

fn current_dir() -> Result<PathBuf> {
    std::env::current_dir().map_err(|e| Error::file_system("read current directory", ".", e))
}

/// Runs `multigit hook install` in the current repository.
///
/// # Errors
///
/// Returns an error if the current directory is not a repository root or
/// the hook cannot be written.
pub fn execute_install(ctx: &Context) -> Result<()> {
    let names: Vec<String> = ctx
        .services
        .registry()
        .list()?
        .into_iter()
        .map(|identity| identity.name)
        .collect();

    let path = git::install_pre_commit_hook(&current_dir()?, &names)?;
    println!("Pre-commit hook installed at {}", path.display());
    println!("The hook shows the active git identity before each commit.");
    Ok(())
}

/// Runs `multigit hook uninstall` in the current repository.
///
/// # Errors
///
/// Returns an error if the hook exists but cannot be removed.
pub fn execute_uninstall() -> Result<()> {
    if git::uninstall_pre_commit_hook(&current_dir()?)? {
        println!("Pre-commit hook uninstalled.");
    } else {
        println!("No pre-commit hook installed.");
    }
    Ok(())
}
