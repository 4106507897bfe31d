//! Switch script generation.
//!
//! A switch script sets the global `user.name`, `user.email` and
//! `core.sshCommand`, turns off GPG commit signing and reloads the SSH agent
//! with the identity's key. Bash and zsh get an executable
//! `<bin_dir>/use-<name>.sh`; `PowerShell` gets a `use-<name>` function in the
//! profile.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use super::{ShellKind, profile, read_or_empty, write_executable, write_file};
use crate::config::MultiGitConfig;
use crate::models::Identity;
use crate::{Error, Result};

/// Renders the switch script for `identity`.
///
/// `ssh_dir` is embedded verbatim for bash/zsh (typically `~/.ssh`).
/// `PowerShell` always resolves keys under `$env:USERPROFILE\.ssh`.
#[must_use]
pub fn render_switch_script(identity: &Identity, shell: ShellKind, ssh_dir: &str) -> String {
    if shell.is_powershell() {
        render_powershell(identity)
    } else {
        render_posix(identity, ssh_dir)
    }
}

fn render_posix(identity: &Identity, ssh_dir: &str) -> String {
    let label = identity.label();
    let user_name = posix_quote(&identity.user_name);
    let user_email = posix_quote(&identity.user_email);
    let key_path = format!("{}/{}", ssh_dir.trim_end_matches('/'), identity.ssh_key_name);
    let key = posix_path(&key_path);
    let key_arg = ssh_command_path(&key_path);

    let mut script = String::from("#!/bin/bash\nexport GPG_TTY=$(tty)\n\n");
    let _ = writeln!(script, "# Set Git identity for {label}");
    let _ = writeln!(script, "git config --global user.name \"{user_name}\"");
    let _ = writeln!(script, "git config --global user.email \"{user_email}\"\n");
    let _ = writeln!(script, "# Force Git to use {} private key", identity.name);
    let _ = writeln!(
        script,
        "git config --global core.sshCommand \"ssh -i {key_arg} -F /dev/null\"\n"
    );
    script.push_str("# Disable GPG commit signing\n");
    script.push_str("git config --global --unset user.signingkey 2>/dev/null || true\n");
    script.push_str("git config --global commit.gpgsign false\n\n");
    script.push_str("# Update SSH agent\n");
    script.push_str("ssh-add -D 2>/dev/null || true\n");
    let _ = writeln!(script, "ssh-add \"{key}\"\n");
    let _ = writeln!(script, "echo \"Name: {user_name}\"");
    let _ = writeln!(script, "echo \"Email: {user_email}\"");
    let _ = writeln!(script, "echo \"Switched to {} identity\"", posix_quote(label));
    script
}

fn render_powershell(identity: &Identity) -> String {
    let label = identity.label();
    let user_name = powershell_quote(&identity.user_name);
    let user_email = powershell_quote(&identity.user_email);

    let mut script = String::new();
    let _ = writeln!(script, "# PowerShell function for {label}");
    let _ = writeln!(script, "function {} {{", identity.command_name());
    script.push_str("    $env:GPG_TTY = $PSSession.TTY\n\n");
    script.push_str("    # Set Git identity\n");
    let _ = writeln!(script, "    git config --global user.name \"{user_name}\"");
    let _ = writeln!(script, "    git config --global user.email \"{user_email}\"\n");
    script.push_str("    # Set SSH key\n");
    let _ = writeln!(
        script,
        "    $sshKeyPath = \"$env:USERPROFILE\\.ssh\\{}\"",
        powershell_quote(&identity.ssh_key_name)
    );
    script.push_str("    git config --global core.sshCommand \"ssh -i '$sshKeyPath' -F NUL\"\n\n");
    script.push_str("    # Disable GPG signing\n");
    script.push_str("    git config --global --unset user.signingkey 2>$null\n");
    script.push_str("    git config --global commit.gpgsign false\n\n");
    let _ = writeln!(
        script,
        "    Write-Host \"Name: {user_name}\" -ForegroundColor Green"
    );
    let _ = writeln!(
        script,
        "    Write-Host \"Email: {user_email}\" -ForegroundColor Green"
    );
    let _ = writeln!(
        script,
        "    Write-Host \"Switched to {} identity\" -ForegroundColor Green",
        powershell_quote(label)
    );
    script.push_str("}\n");
    script
}

/// Escapes a value for a double-quoted POSIX shell string.
fn posix_quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '"' | '\\' | '$' | '`') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Returns the leading-`~` remainder of `path`, if it is home relative.
fn home_relative(path: &str) -> Option<&str> {
    path.strip_prefix('~')
        .filter(|rest| rest.is_empty() || rest.starts_with('/'))
}

/// Escapes `path` for a double-quoted POSIX string, writing a leading `~`
/// as `$HOME` so it still expands inside the quotes.
fn posix_path(path: &str) -> String {
    home_relative(path).map_or_else(
        || posix_quote(path),
        |rest| format!("$HOME{}", posix_quote(rest)),
    )
}

/// Quotes `path` as the `-i` argument inside a double-quoted
/// `core.sshCommand` value.
///
/// The script expands `$HOME` when it runs; the single quotes survive into
/// the stored value for the shell git uses to run ssh.
fn ssh_command_path(path: &str) -> String {
    let (home, rest) = home_relative(path).map_or(("", path), |rest| ("$HOME", rest));
    format!("'{home}{}'", posix_quote(&rest.replace('\'', "'\\''")))
}

/// Escapes a value for a double-quoted `PowerShell` string.
fn powershell_quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '"' | '$' | '`') {
            out.push('`');
        }
        out.push(c);
    }
    out
}

/// Installs and removes switch scripts.
#[derive(Debug, Clone)]
pub struct ScriptWriter {
    bin_dir: PathBuf,
    ssh_dir: String,
    shell: ShellKind,
    profile_path: PathBuf,
}

impl ScriptWriter {
    /// Creates a writer from the configured paths and shell.
    #[must_use]
    pub fn from_config(config: &MultiGitConfig) -> Self {
        Self {
            bin_dir: config.bin_dir.clone(),
            ssh_dir: MultiGitConfig::display_path(&config.ssh_dir),
            shell: config.shell,
            profile_path: config.profile_path(),
        }
    }

    /// Creates a writer with explicit paths.
    #[must_use]
    pub fn new(
        bin_dir: impl Into<PathBuf>,
        ssh_dir: impl Into<String>,
        shell: ShellKind,
        profile_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            bin_dir: bin_dir.into(),
            ssh_dir: ssh_dir.into(),
            shell,
            profile_path: profile_path.into(),
        }
    }

    /// Returns the script path for identity `name`.
    #[must_use]
    pub fn script_path(&self, name: &str) -> PathBuf {
        self.bin_dir.join(format!("use-{name}.sh"))
    }

    /// Installs the switch script for `identity`.
    ///
    /// Returns the file that was written: the script for bash/zsh, the
    /// profile for `PowerShell`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FileSystem`] if the script or profile cannot be
    /// written.
    pub fn write(&self, identity: &Identity) -> Result<PathBuf> {
        let script = render_switch_script(identity, self.shell, &self.ssh_dir);

        if self.shell.is_powershell() {
            let content = read_or_empty(&self.profile_path)?;
            let updated = profile::upsert_powershell_function(&content, &identity.name, &script);
            write_file(&self.profile_path, &updated)?;
            tracing::info!(identity = %identity.name, profile = %self.profile_path.display(), "PowerShell function installed");
            return Ok(self.profile_path.clone());
        }

        let path = self.script_path(&identity.name);
        write_executable(&path, &script)?;
        tracing::info!(identity = %identity.name, path = %path.display(), "Switch script written");
        Ok(path)
    }

    /// Removes the switch script for identity `name`.
    ///
    /// Returns true if something was removed. A missing script is not an
    /// error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FileSystem`] if the script or profile cannot be
    /// updated.
    pub fn remove(&self, name: &str) -> Result<bool> {
        if self.shell.is_powershell() {
            let content = read_or_empty(&self.profile_path)?;
            let updated = profile::remove_powershell_function(&content, name);
            if updated == content {
                return Ok(false);
            }
            write_file(&self.profile_path, &updated)?;
            return Ok(true);
        }

        remove_if_exists(&self.script_path(name))
    }
}

/// Removes `path`, returning false if it did not exist.
pub(crate) fn remove_if_exists(path: &Path) -> Result<bool> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(Error::file_system("remove", path, e)),
    }
}
