//! `auto-switch` command.
//!
//! Directory mappings are stored even while auto-switching is disabled; the
//! flag only tells shell integrations whether to act on them.

use std::path::Path;

use super::Context;
use crate::Result;

/// Runs `multigit auto-switch enable`.
///
/// # Errors
///
/// Returns an error if the store cannot be updated.
pub fn execute_enable(ctx: &Context) -> Result<()> {
    ctx.services.directories().enable()?;
    println!("Auto-switch enabled.");
    Ok(())
}

/// Runs `multigit auto-switch disable`.
///
/// # Errors
///
/// Returns an error if the store cannot be updated.
pub fn execute_disable(ctx: &Context) -> Result<()> {
    ctx.services.directories().disable()?;
    println!("Auto-switch disabled.");
    Ok(())
}

/// Runs `multigit auto-switch status`.
///
/// # Errors
///
/// Returns an error if the store cannot be read.
pub fn execute_status(ctx: &Context) -> Result<()> {
    let directories = ctx.services.directories();
    let enabled = directories.is_enabled()?;

    println!("Auto-switch: {}", if enabled { "enabled" } else { "disabled" });
    println!("Match mode: {}", directories.match_mode().as_str());

    let mappings = directories.list_mappings()?;
    if mappings.is_empty() {
        println!("No directory mappings.");
    } else {
        println!();
        println!("Directory mappings:");
        for (path, identity) in mappings {
            println!("  {path} -> {identity}");
        }
    }
    Ok(())
}

/// Runs `multigit auto-switch add`.
///
/// The identity is not required to exist yet; a warning is printed when it
/// does not.
///
/// # Errors
///
/// Returns an error if the path cannot be resolved or the store cannot be
/// updated.
pub fn execute_add(ctx: &Context, path: &Path, identity: &str) -> Result<()> {
    if !ctx.services.registry().contains(identity)? {
        tracing::warn!(identity = %identity, "Mapping to an unregistered identity");
        println!("Warning: configuration \"{identity}\" does not exist yet.");
    }

    let key = ctx.services.directories().add_mapping(path, identity)?;
    println!("Added mapping: {key} -> {identity}");
    Ok(())
}

/// Runs `multigit auto-switch remove`.
///
/// # Errors
///
/// Returns an error if the path cannot be resolved or the store cannot be
/// updated.
pub fn execute_remove(ctx: &Context, path: &Path) -> Result<()> {
    if ctx.services.directories().remove_mapping(path)? {
        println!("Removed mapping for: {}", path.display());
    } else {
        println!("No mapping for: {}", path.display());
    }
    Ok(())
}

/// Runs `multigit auto-switch current`, resolving `path` or the current
/// directory.
///
/// # Errors
///
/// Returns an error if the path cannot be resolved or the store cannot be
/// read.
pub fn execute_current(ctx: &Context, path: Option<&Path>) -> Result<()> {
    let directories = ctx.services.directories();
    let resolved = match path {
        Some(path) => directories.resolve(path)?,
        None => directories.resolve_current()?,
    };

    match resolved {
        Some(identity) => println!("{identity}"),
        None => println!("No mapping found for this directory."),
    }
    Ok(())
}
