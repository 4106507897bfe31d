//! Shell integration.
//!
//! Generates the `use-<name>` switch scripts and keeps the shell profile's
//! alias block in sync with the registered identities.
//!
//! - [`script`]: switch script rendering and installation
//! - [`profile`]: alias block, `PATH` export and `PowerShell` function editing

pub mod profile;
pub mod script;

pub use profile::{
    ALIAS_MARKER, FUNCTION_MARKER, ProfileEditor, alias_line, ensure_bin_on_path,
    remove_alias, remove_powershell_function, replace_alias_block, upsert_powershell_function,
};
pub use script::{ScriptWriter, render_switch_script};

use std::fmt;
use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// Shell flavors multigit can generate for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShellKind {
    /// Z shell.
    Zsh,
    /// Bourne-again shell.
    Bash,
    /// Windows `PowerShell`.
    PowerShell,
    /// Anything else; treated like zsh.
    #[default]
    Unknown,
}

impl ShellKind {
    /// Detects the shell from the platform and `$SHELL`.
    #[must_use]
    pub fn detect() -> Self {
        let shell = std::env::var("SHELL").unwrap_or_default();
        Self::detect_from(cfg!(windows), &shell)
    }

    /// Detects the shell from explicit inputs.
    #[must_use]
    pub fn detect_from(is_windows: bool, shell_env: &str) -> Self {
        if is_windows {
            Self::PowerShell
        } else if shell_env.contains("zsh") {
            Self::Zsh
        } else if shell_env.contains("bash") {
            Self::Bash
        } else {
            Self::Unknown
        }
    }

    /// Parses a supported shell name, case-insensitively.
    ///
    /// Returns `None` for shells multigit cannot generate for.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "zsh" => Some(Self::Zsh),
            "bash" => Some(Self::Bash),
            "powershell" | "pwsh" => Some(Self::PowerShell),
            _ => None,
        }
    }

    /// Returns the shell as a string slice.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Zsh => "zsh",
            Self::Bash => "bash",
            Self::PowerShell => "powershell",
            Self::Unknown => "unknown",
        }
    }

    /// Returns true for `PowerShell`.
    #[must_use]
    pub const fn is_powershell(&self) -> bool {
        matches!(self, Self::PowerShell)
    }

    /// Returns the profile file this shell reads at start-up.
    #[must_use]
    pub fn profile_path(&self, home: &Path) -> PathBuf {
        match self {
            Self::Zsh | Self::Unknown => home.join(".zshrc"),
            Self::Bash => home.join(".bash_profile"),
            Self::PowerShell => home
                .join("Documents")
                .join("WindowsPowerShell")
                .join("Microsoft.PowerShell_profile.ps1"),
        }
    }
}

impl fmt::Display for ShellKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Writes `contents` to `path`, creating parent directories.
pub(crate) fn write_file(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .map_err(|e| Error::file_system("create directory", parent, e))?;
    }
    std::fs::write(path, contents).map_err(|e| Error::file_system("write", path, e))
}

/// Writes `contents` to `path` and marks it executable on Unix.
pub(crate) fn write_executable(path: &Path, contents: &str) -> Result<()> {
    write_file(path, contents)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))
            .map_err(|e| Error::file_system("set permissions on", path, e))?;
    }

    Ok(())
}

/// Reads `path`, treating a missing file as empty.
pub(crate) fn read_or_empty(path: &Path) -> Result<String> {
    match std::fs::read_to_string(path) {
        Ok(contents) => Ok(contents),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(String::new()),
        Err(e) => Err(Error::file_system("read", path, e)),
    }
}
