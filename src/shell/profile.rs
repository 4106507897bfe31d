//! Shell profile editing.
//!
//! The bash/zsh profile carries one alias block:
//!
//! ```text
//! # Multi-Git Configuration Aliases
//! alias use-work='~/.bin/use-work.sh'
//! alias use-personal='~/.bin/use-personal.sh'
//! ```
//!
//! The block runs from the marker line to the first line that is not blank,
//! a comment or a `use-` alias. Rewriting the block removes the old one and
//! appends a fresh one at the end of the file. `PowerShell` profiles carry
//! `use-<name>` functions under their own marker instead.
//!
//! The string functions here are pure; [`ProfileEditor`] applies them to the
//! profile file.

use std::path::{Path, PathBuf};

use super::{ShellKind, read_or_empty, write_file};
use crate::Result;
use crate::config::MultiGitConfig;
use crate::models::Identity;

/// Marker line opening the alias block.
pub const ALIAS_MARKER: &str = "# Multi-Git Configuration Aliases";

/// Marker line preceding `PowerShell` functions.
pub const FUNCTION_MARKER: &str = "# Multi-Git PowerShell Functions";

const FUNCTION_COMMENT_PREFIX: &str = "# PowerShell function for ";

/// Returns the alias line for identity `name`.
///
/// `bin_dir` is embedded verbatim, e.g. `~/.bin`.
#[must_use]
pub fn alias_line(name: &str, bin_dir: &str) -> String {
    format!(
        "alias use-{name}='{}/use-{name}.sh'",
        bin_dir.trim_end_matches('/')
    )
}

/// Removes any existing alias block from `content` and appends one for
/// `identities`.
#[must_use]
pub fn replace_alias_block(content: &str, identities: &[Identity], bin_dir: &str) -> String {
    let mut updated = strip_alias_block(content);
    if !updated.is_empty() && !updated.ends_with('\n') {
        updated.push('\n');
    }

    updated.push('\n');
    updated.push_str(ALIAS_MARKER);
    updated.push('\n');
    for identity in identities {
        updated.push_str(&alias_line(&identity.name, bin_dir));
        updated.push('\n');
    }
    updated
}

fn strip_alias_block(content: &str) -> String {
    let lines: Vec<&str> = content.split('\n').collect();
    match alias_block_range(&lines) {
        Some((start, end)) => [&lines[..start], &lines[end..]].concat().join("\n"),
        None => content.to_string(),
    }
}

/// Locates the alias block: the marker line plus the comment, blank and
/// `alias use-` lines that follow it. The end index is exclusive.
fn alias_block_range(lines: &[&str]) -> Option<(usize, usize)> {
    let start = lines.iter().position(|line| line.contains(ALIAS_MARKER))?;
    let end = lines
        .iter()
        .enumerate()
        .skip(start + 1)
        .find(|(_, line)| {
            let line = line.trim();
            !line.is_empty() && !line.starts_with('#') && !line.starts_with("alias use-")
        })
        .map_or(lines.len(), |(index, _)| index);
    Some((start, end))
}

/// Drops the alias line for identity `name` from the alias block.
///
/// Lines outside the block are left alone. Content without an alias block
/// is returned unchanged.
#[must_use]
pub fn remove_alias(content: &str, name: &str) -> String {
    let lines: Vec<&str> = content.split('\n').collect();
    let Some((start, end)) = alias_block_range(&lines) else {
        return content.to_string();
    };
    let needle = format!("alias use-{name}=");
    lines
        .iter()
        .enumerate()
        .filter(|(index, line)| !(start < *index && *index < end) || !line.contains(&needle))
        .map(|(_, line)| *line)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Appends a `PATH` export for `bin_dir` unless the profile already
/// mentions it.
///
/// Returns `None` when no change is needed. `bin_dir` may start with `~/`,
/// which is written as `$HOME/` in the export.
#[must_use]
pub fn ensure_bin_on_path(content: &str, bin_dir: &str) -> Option<String> {
    let bin_dir = bin_dir.trim_end_matches('/');
    let home_form = bin_dir
        .strip_prefix("~/")
        .map_or_else(|| bin_dir.to_string(), |rest| format!("$HOME/{rest}"));
    let tilde_form = home_form
        .strip_prefix("$HOME/")
        .map_or_else(|| bin_dir.to_string(), |rest| format!("~/{rest}"));

    if content.contains(&home_form) || content.contains(&tilde_form) {
        return None;
    }

    let mut updated = content.to_string();
    if !updated.is_empty() && !updated.ends_with('\n') {
        updated.push('\n');
    }
    updated.push_str(&format!("\nexport PATH=\"{home_form}:$PATH\"\n"));
    Some(updated)
}

fn is_function_header(line: &str, name: &str) -> bool {
    line.trim_start()
        .strip_prefix("function use-")
        .and_then(|rest| rest.strip_prefix(name))
        .is_some_and(|rest| rest.is_empty() || rest.starts_with([' ', '{']))
}

/// Removes the `use-<name>` function (and its heading comment) from a
/// `PowerShell` profile.
#[must_use]
pub fn remove_powershell_function(content: &str, name: &str) -> String {
    let mut kept: Vec<&str> = Vec::new();
    let mut in_function = false;

    for line in content.split('\n') {
        if in_function {
            if line.trim() == "}" {
                in_function = false;
            }
            continue;
        }
        if is_function_header(line, name) {
            in_function = true;
            if kept
                .last()
                .is_some_and(|prev| prev.starts_with(FUNCTION_COMMENT_PREFIX))
            {
                kept.pop();
            }
            continue;
        }
        kept.push(line);
    }

    kept.join("\n")
}

/// Replaces or appends the `use-<name>` function in a `PowerShell` profile.
#[must_use]
pub fn upsert_powershell_function(content: &str, name: &str, function: &str) -> String {
    let mut updated = remove_powershell_function(content, name);
    if !updated.contains(FUNCTION_MARKER) {
        updated.push_str(&format!("\n{FUNCTION_MARKER}\n"));
    }
    if !updated.ends_with('\n') {
        updated.push('\n');
    }
    updated.push_str(function);
    updated
}

/// Applies alias and `PATH` edits to the shell profile file.
#[derive(Debug, Clone)]
pub struct ProfileEditor {
    path: PathBuf,
    shell: ShellKind,
    bin_dir: String,
}

impl ProfileEditor {
    /// Creates an editor for the configured shell profile.
    #[must_use]
    pub fn from_config(config: &MultiGitConfig) -> Self {
        Self::new(
            config.profile_path(),
            config.shell,
            MultiGitConfig::display_path(&config.bin_dir),
        )
    }

    /// Creates an editor for the profile at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, shell: ShellKind, bin_dir: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            shell,
            bin_dir: bin_dir.into(),
        }
    }

    /// Returns the profile path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Rewrites the alias block for `identities`.
    ///
    /// Does nothing for `PowerShell`, whose functions are installed by
    /// [`ScriptWriter`](super::ScriptWriter). Returns true if the profile
    /// was written.
    ///
    /// # Errors
    ///
    /// Returns an error if the profile cannot be read or written.
    pub fn sync_aliases(&self, identities: &[Identity]) -> Result<bool> {
        if self.shell.is_powershell() {
            return Ok(false);
        }
        let content = read_or_empty(&self.path)?;
        let updated = replace_alias_block(&content, identities, &self.bin_dir);
        self.write_if_changed(&content, &updated)
    }

    /// Removes the alias for identity `name`.
    ///
    /// # Errors
    ///
    /// Returns an error if the profile cannot be read or written.
    pub fn remove_alias(&self, name: &str) -> Result<bool> {
        if self.shell.is_powershell() {
            return Ok(false);
        }
        let content = read_or_empty(&self.path)?;
        let updated = remove_alias(&content, name);
        self.write_if_changed(&content, &updated)
    }

    /// Adds the script directory to `PATH` if the profile does not already
    /// mention it. Creates the profile if it is missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the profile cannot be read or written.
    pub fn ensure_bin_on_path(&self) -> Result<bool> {
        if self.shell.is_powershell() {
            return Ok(false);
        }
        let content = read_or_empty(&self.path)?;
        match ensure_bin_on_path(&content, &self.bin_dir) {
            Some(updated) => self.write_if_changed(&content, &updated),
            None => Ok(false),
        }
    }

    /// Returns true if the profile already mentions the script directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the profile cannot be read.
    pub fn has_bin_on_path(&self) -> Result<bool> {
        let content = read_or_empty(&self.path)?;
        Ok(ensure_bin_on_path(&content, &self.bin_dir).is_none())
    }

    fn write_if_changed(&self, before: &str, after: &str) -> Result<bool> {
        if before == after {
            return Ok(false);
        }
        write_file(&self.path, after)?;
        tracing::debug!(profile = %self.path.display(), "Shell profile updated");
        Ok(true)
    }
}
