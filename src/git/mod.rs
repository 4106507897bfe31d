//! Git operations.
//!
//! Repository-local identity configuration and the pre-commit hook. All git
//! access goes through the `git` binary, invoked without a shell.

mod hooks;

pub use hooks::{
    PRE_COMMIT_HOOK, install_pre_commit_hook, render_pre_commit_hook, uninstall_pre_commit_hook,
};

use std::path::Path;
use std::process::Command;

use crate::models::Identity;
use crate::{Error, Result};

/// Returns true if `repo` has a `.git` entry.
#[must_use]
pub fn is_repository(repo: &Path) -> bool {
    repo.join(".git").exists()
}

/// Fails with [`Error::InvalidInput`] unless `repo` is a repository root.
pub(crate) fn require_repository(repo: &Path) -> Result<()> {
    if is_repository(repo) {
        Ok(())
    } else {
        Err(Error::InvalidInput(format!(
            "not a git repository: {} (run this from a repository root)",
            repo.display()
        )))
    }
}

/// Returns the `core.sshCommand` value pinning `ssh_key`.
///
/// The key path is single-quoted for the shell git runs the command with.
#[must_use]
pub fn ssh_command(ssh_key: &Path) -> String {
    let key = ssh_key.display().to_string().replace('\'', "'\\''");
    format!("ssh -i '{key}' -F /dev/null")
}

/// Sets `user.name`, `user.email` and `core.sshCommand` in the repository's
/// local config.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] if `repo` is not a repository root, or
/// [`Error::CommandFailed`] if a `git config` call fails.
pub fn set_local_identity(repo: &Path, identity: &Identity, ssh_key: &Path) -> Result<()> {
    require_repository(repo)?;

    let settings = [
        ("user.name", identity.user_name.clone()),
        ("user.email", identity.user_email.clone()),
        ("core.sshCommand", ssh_command(ssh_key)),
    ];
    for (key, value) in settings {
        let mut command = Command::new("git");
        command.current_dir(repo).args(["config", key, &value]);
        run_command(&mut command, "git config")?;
    }

    tracing::info!(repo = %repo.display(), identity = %identity.name, "Local identity set");
    Ok(())
}

/// Runs `command` and returns its trimmed stdout.
///
/// # Errors
///
/// Returns [`Error::CommandFailed`] if the command cannot be spawned or
/// exits unsuccessfully.
pub(crate) fn run_command(command: &mut Command, name: &str) -> Result<String> {
    tracing::debug!(command = %name, "Running external command");

    let output = command.output().map_err(|e| Error::CommandFailed {
        command: name.to_string(),
        cause: e.to_string(),
    })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        let cause = if stderr.is_empty() {
            output.status.to_string()
        } else {
            stderr
        };
        return Err(Error::CommandFailed {
            command: name.to_string(),
            cause,
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_ssh_command() {
        assert_eq!(
            ssh_command(Path::new("/home/jane/.ssh/id_work")),
            "ssh -i '/home/jane/.ssh/id_work' -F /dev/null"
        );
        assert_eq!(
            ssh_command(Path::new("/home/Jane Doe/.ssh/it's")),
            "ssh -i '/home/Jane Doe/.ssh/it'\\''s' -F /dev/null"
        );
    }

    #[test]
    fn test_set_local_identity_requires_repository() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let identity = Identity::new("work", "Jane", "jane@corp.example", "id_work");

        let result = set_local_identity(dir.path(), &identity, Path::new("/tmp/id_work"));
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_run_command_reports_missing_binary() {
        let mut command = Command::new("multigit-definitely-not-a-binary");
        let result = run_command(&mut command, "missing");
        assert!(matches!(result, Err(Error::CommandFailed { ref command, .. }) if command == "missing"));
    }

    #[test]
    fn test_set_local_identity_writes_repo_config() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let mut init = Command::new("git");
        init.current_dir(dir.path()).args(["init", "-q"]);
        if run_command(&mut init, "git init").is_err() {
            // git is not installed everywhere
            return;
        }

        let identity = Identity::new("work", "Jane Doe", "jane@corp.example", "id_work");
        set_local_identity(dir.path(), &identity, Path::new("/keys/id_work")).expect("set");

        let mut read = Command::new("git");
        read.current_dir(dir.path()).args(["config", "--local", "user.email"]);
        assert_eq!(run_command(&mut read, "git config").expect("read"), "jane@corp.example");

        let mut read = Command::new("git");
        read.current_dir(dir.path()).args(["config", "--local", "core.sshCommand"]);
        assert_eq!(
            run_command(&mut read, "git config").expect("read"),
            "ssh -i '/keys/id_work' -F /dev/null"
        );
    }
}
