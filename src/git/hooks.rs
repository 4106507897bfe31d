//! Pre-commit hook installation.
//!
//! The hook prints the identity git will commit as, plus the configured
//! identity names, and never blocks the commit.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use super::require_repository;
use crate::shell::script::remove_if_exists;
use crate::shell::write_executable;
use crate::Result;

/// Hook file name under `.git/hooks`.
pub const PRE_COMMIT_HOOK: &str = "pre-commit";

fn hook_path(repo: &Path) -> PathBuf {
    repo.join(".git").join("hooks").join(PRE_COMMIT_HOOK)
}

/// Renders the pre-commit hook listing `identity_names`.
#[must_use]
pub fn render_pre_commit_hook(identity_names: &[String]) -> String {
    let mut hook = String::from(
        "#!/bin/bash\n\
         # Multi-Git Pre-commit Hook\n\
         # Shows which git identity this commit will use\n\n\
         CURRENT_NAME=$(git config user.name)\n\
         CURRENT_EMAIL=$(git config user.email)\n\n\
         echo \"Current Git identity: $CURRENT_NAME <$CURRENT_EMAIL>\"\n",
    );
    let _ = writeln!(
        hook,
        "echo \"Available configs: {}\"\n",
        identity_names.join(", ")
    );
    hook.push_str("exit 0\n");
    hook
}

/// Installs the pre-commit hook into `repo`, replacing any existing one.
///
/// Returns the hook path.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`](crate::Error::InvalidInput) if `repo` is
/// not a repository root, or [`Error::FileSystem`](crate::Error::FileSystem)
/// if the hook cannot be written.
pub fn install_pre_commit_hook(repo: &Path, identity_names: &[String]) -> Result<PathBuf> {
    require_repository(repo)?;

    let path = hook_path(repo);
    write_executable(&path, &render_pre_commit_hook(identity_names))?;

    tracing::info!(hook = %path.display(), "Pre-commit hook installed");
    Ok(path)
}

/// Removes the pre-commit hook from `repo`.
///
/// Returns false if there was no hook.
///
/// # Errors
///
/// Returns [`Error::FileSystem`](crate::Error::FileSystem) if the hook
/// exists but cannot be removed.
pub fn uninstall_pre_commit_hook(repo: &Path) -> Result<bool> {
    let removed = remove_if_exists(&hook_path(repo))?;
    if removed {
        tracing::info!(repo = %repo.display(), "Pre-commit hook removed");
    }
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use tempfile::TempDir;

    fn create_test_repo() -> TempDir {
        let dir = TempDir::new().expect("Failed to create temp dir");
        std::fs::create_dir(dir.path().join(".git")).expect("create .git");
        dir
    }

    #[test]
    fn test_render_lists_identities() {
        let hook = render_pre_commit_hook(&["work".to_string(), "oss".to_string()]);

        assert!(hook.starts_with("#!/bin/bash\n"));
        assert!(hook.contains("echo \"Available configs: work, oss\""));
        assert!(hook.trim_end().ends_with("exit 0"));
    }

    #[test]
    fn test_install_requires_repository() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let result = install_pre_commit_hook(dir.path(), &[]);
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_install_creates_hooks_dir_and_uninstall_removes() {
        let repo = create_test_repo();

        let path = install_pre_commit_hook(repo.path(), &["work".to_string()]).expect("install");
        assert_eq!(path, repo.path().join(".git/hooks/pre-commit"));
        assert!(std::fs::read_to_string(&path).expect("read").contains("work"));

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&path).expect("metadata").permissions().mode();
            assert_eq!(mode & 0o111, 0o111);
        }

        assert!(uninstall_pre_commit_hook(repo.path()).expect("uninstall"));
        assert!(!path.exists());
        assert!(!uninstall_pre_commit_hook(repo.path()).expect("uninstall again"));
    }
}
