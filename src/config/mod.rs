//! Configuration management.
//!
//! [`MultiGitConfig`] holds the paths and behavior knobs used by the CLI.
//! Values come from an optional TOML file and are then overridden by
//! environment variables:
//!
//! | Variable | Field |
//! |----------|-------|
//! | `MULTIGIT_HOME` | `config_dir` |
//! | `MULTIGIT_BIN_DIR` | `bin_dir` |
//! | `MULTIGIT_SSH_DIR` | `ssh_dir` |
//! | `MULTIGIT_SHELL` | `shell` |
//! | `MULTIGIT_MATCH_MODE` | `match_mode` |

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::services::MatchMode;
use crate::shell::ShellKind;
use crate::storage::persistence::CONFIG_FILE_NAME;
use crate::{Error, Result};

/// Environment variable naming an explicit config file.
pub const CONFIG_PATH_ENV: &str = "MULTIGIT_CONFIG_PATH";

/// Main configuration for multigit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiGitConfig {
    /// Directory holding `config.json`.
    pub config_dir: PathBuf,
    /// Directory receiving `use-<name>.sh` scripts.
    pub bin_dir: PathBuf,
    /// Directory holding SSH keys.
    pub ssh_dir: PathBuf,
    /// Shell to generate scripts and aliases for.
    pub shell: ShellKind,
    /// Shell profile to edit; derived from `shell` when unset.
    pub profile_path: Option<PathBuf>,
    /// How directory mappings are matched.
    pub match_mode: MatchMode,
}

/// Configuration file structure (for TOML parsing).
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Config directory.
    pub config_dir: Option<String>,
    /// Script directory.
    pub bin_dir: Option<String>,
    /// SSH key directory.
    pub ssh_dir: Option<String>,
    /// Shell name.
    pub shell: Option<String>,
    /// Shell profile path.
    pub profile_path: Option<String>,
    /// Directory match mode.
    pub match_mode: Option<MatchMode>,
}

impl Default for MultiGitConfig {
    fn default() -> Self {
        let home = home_dir();
        Self {
            config_dir: home.join(".multi-git"),
            bin_dir: home.join(".bin"),
            ssh_dir: home.join(".ssh"),
            shell: ShellKind::detect(),
            profile_path: None,
            match_mode: MatchMode::default(),
        }
    }
}

impl MultiGitConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| Error::file_system("read config file", path, e))?;

        let file: ConfigFile = toml::from_str(&contents).map_err(|e| {
            Error::InvalidConfig(format!("failed to parse {}: {e}", path.display()))
        })?;

        tracing::debug!(path = %path.display(), "Loaded config file");
        Ok(Self::from_config_file(file))
    }

    /// Loads configuration from the default location.
    ///
    /// Checks the following paths in order:
    /// 1. Platform-specific config dir (`~/Library/Application Support/multigit/` on macOS)
    /// 2. XDG config dir (`~/.config/multigit/` for Unix compatibility)
    ///
    /// Returns default configuration if no config file is found. A file that
    /// exists but fails to parse is logged and skipped.
    #[must_use]
    pub fn load_default() -> Self {
        for candidate in default_candidates() {
            if !candidate.exists() {
                continue;
            }
            match Self::load_from_file(&candidate) {
                Ok(config) => return config,
                Err(e) => {
                    tracing::warn!(path = %candidate.display(), error = %e, "Ignoring unreadable config file");
                },
            }
        }
        Self::default()
    }

    /// Loads configuration from `path` when given, else from
    /// `$MULTIGIT_CONFIG_PATH`, else from the default location, then applies
    /// environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicitly named file cannot be loaded.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let explicit = path.map(Path::to_path_buf).or_else(|| {
            std::env::var(CONFIG_PATH_ENV)
                .ok()
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from)
        });

        let mut config = match explicit {
            Some(path) => Self::load_from_file(&path)?,
            None => Self::load_default(),
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Converts a `ConfigFile` to `MultiGitConfig`.
    fn from_config_file(file: ConfigFile) -> Self {
        let mut config = Self::default();

        if let Some(dir) = file.config_dir {
            config.config_dir = expand_home(&dir);
        }
        if let Some(dir) = file.bin_dir {
            config.bin_dir = expand_home(&dir);
        }
        if let Some(dir) = file.ssh_dir {
            config.ssh_dir = expand_home(&dir);
        }
        if let Some(shell) = file.shell {
            match ShellKind::parse(&shell) {
                Some(kind) => config.shell = kind,
                None => tracing::warn!(value = %shell, "Unknown shell in config file, keeping detected shell"),
            }
        }
        if let Some(profile) = file.profile_path {
            config.profile_path = Some(expand_home(&profile));
        }
        if let Some(mode) = file.match_mode {
            config.match_mode = mode;
        }

        config
    }

    /// Applies overrides from the process environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_env_overrides_from(|key| std::env::var(key).ok());
    }

    /// Applies overrides using `lookup` to read variables.
    pub fn apply_env_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(dir) = value("MULTIGIT_HOME") {
            self.config_dir = expand_home(&dir);
        }
        if let Some(dir) = value("MULTIGIT_BIN_DIR") {
            self.bin_dir = expand_home(&dir);
        }
        if let Some(dir) = value("MULTIGIT_SSH_DIR") {
            self.ssh_dir = expand_home(&dir);
        }
        if let Some(shell) = value("MULTIGIT_SHELL") {
            match ShellKind::parse(&shell) {
                Some(kind) => self.shell = kind,
                None => tracing::warn!(value = %shell, "Unknown MULTIGIT_SHELL, keeping current shell"),
            }
        }
        if let Some(mode) = value("MULTIGIT_MATCH_MODE") {
            match MatchMode::parse(&mode) {
                Some(mode) => self.match_mode = mode,
                None => tracing::warn!(value = %mode, "Unknown MULTIGIT_MATCH_MODE, keeping default"),
            }
        }
    }

    /// Sets the config directory.
    #[must_use]
    pub fn with_config_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_dir = path.into();
        self
    }

    /// Sets the script directory.
    #[must_use]
    pub fn with_bin_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.bin_dir = path.into();
        self
    }

    /// Sets the SSH key directory.
    #[must_use]
    pub fn with_ssh_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.ssh_dir = path.into();
        self
    }

    /// Sets the shell.
    #[must_use]
    pub fn with_shell(mut self, shell: ShellKind) -> Self {
        self.shell = shell;
        self
    }

    /// Sets the shell profile path.
    #[must_use]
    pub fn with_profile_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.profile_path = Some(path.into());
        self
    }

    /// Returns the path of the JSON config document.
    #[must_use]
    pub fn store_path(&self) -> PathBuf {
        self.config_dir.join(CONFIG_FILE_NAME)
    }

    /// Returns the switch script path for identity `name`.
    #[must_use]
    pub fn script_path(&self, name: &str) -> PathBuf {
        self.bin_dir.join(format!("use-{name}.sh"))
    }

    /// Returns the path of SSH key `key_name`.
    #[must_use]
    pub fn ssh_key_path(&self, key_name: &str) -> PathBuf {
        self.ssh_dir.join(key_name)
    }

    /// Returns the shell profile to edit.
    #[must_use]
    pub fn profile_path(&self) -> PathBuf {
        self.profile_path
            .clone()
            .unwrap_or_else(|| self.shell.profile_path(&home_dir()))
    }

    /// Returns `dir` with the home directory abbreviated to `~`.
    ///
    /// Used for paths embedded in generated scripts and aliases.
    #[must_use]
    pub fn display_path(dir: &Path) -> String {
        let home = home_dir();
        dir.strip_prefix(&home).map_or_else(
            |_| dir.display().to_string(),
            |rest| {
                if rest.as_os_str().is_empty() {
                    "~".to_string()
                } else {
                    format!("~/{}", rest.display())
                }
            },
        )
    }
}

/// Returns the user's home directory, or `.` if it cannot be determined.
#[must_use]
pub fn home_dir() -> PathBuf {
    directories::BaseDirs::new().map_or_else(|| PathBuf::from("."), |d| d.home_dir().to_path_buf())
}

/// Expands a leading `~` to the home directory.
#[must_use]
pub fn expand_home(path: &str) -> PathBuf {
    expand_home_with(path, &home_dir())
}

fn expand_home_with(path: &str, home: &Path) -> PathBuf {
    if path == "~" {
        return home.to_path_buf();
    }
    path.strip_prefix("~/")
        .map_or_else(|| PathBuf::from(path), |rest| home.join(rest))
}

fn default_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    if let Some(base_dirs) = directories::BaseDirs::new() {
        candidates.push(base_dirs.config_dir().join("multigit").join("config.toml"));
        candidates.push(
            base_dirs
                .home_dir()
                .join(".config")
                .join("multigit")
                .join("config.toml"),
        );
    }
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_default_paths_live_under_home() {
        let config = MultiGitConfig::default();
        let home = home_dir();

        assert_eq!(config.config_dir, home.join(".multi-git"));
        assert_eq!(config.bin_dir, home.join(".bin"));
        assert_eq!(config.ssh_dir, home.join(".ssh"));
        assert_eq!(config.match_mode, MatchMode::Prefix);
        assert_eq!(config.store_path(), home.join(".multi-git").join("config.json"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
config_dir = "/tmp/mg"
bin_dir = "~/scripts"
shell = "bash"
match_mode = "segment"
"#,
        )
        .expect("write");

        let config = MultiGitConfig::load_from_file(&path).expect("load");

        assert_eq!(config.config_dir, PathBuf::from("/tmp/mg"));
        assert_eq!(config.bin_dir, home_dir().join("scripts"));
        assert_eq!(config.shell, ShellKind::Bash);
        assert_eq!(config.match_mode, MatchMode::Segment);
    }

    #[test]
    fn test_load_from_file_rejects_bad_toml() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "match_mode = \"sideways\"").expect("write");

        let result = MultiGitConfig::load_from_file(&path);
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_load_from_missing_file() {
        let result = MultiGitConfig::load_from_file(Path::new("/nonexistent/multigit.toml"));
        assert!(matches!(result, Err(Error::FileSystem { .. })));
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("MULTIGIT_HOME", "/srv/mg"),
            ("MULTIGIT_BIN_DIR", "/srv/bin"),
            ("MULTIGIT_SHELL", "zsh"),
            ("MULTIGIT_MATCH_MODE", "Segment"),
            ("MULTIGIT_SSH_DIR", "  "),
        ]
        .into_iter()
        .collect();
        let mut config = MultiGitConfig::default();
        let ssh_dir = config.ssh_dir.clone();

        config.apply_env_overrides_from(|key| vars.get(key).map(|v| (*v).to_string()));

        assert_eq!(config.config_dir, PathBuf::from("/srv/mg"));
        assert_eq!(config.bin_dir, PathBuf::from("/srv/bin"));
        assert_eq!(config.shell, ShellKind::Zsh);
        assert_eq!(config.match_mode, MatchMode::Segment);
        assert_eq!(config.ssh_dir, ssh_dir, "blank values are ignored");
    }

    #[test]
    fn test_unknown_match_mode_is_ignored() {
        let mut config = MultiGitConfig::default();
        config.apply_env_overrides_from(|key| {
            (key == "MULTIGIT_MATCH_MODE").then(|| "fuzzy".to_string())
        });
        assert_eq!(config.match_mode, MatchMode::Prefix);
    }

    #[test]
    fn test_unknown_shell_keeps_current_shell() {
        let mut config = MultiGitConfig {
            shell: ShellKind::Bash,
            ..MultiGitConfig::default()
        };
        config.apply_env_overrides_from(|key| (key == "MULTIGIT_SHELL").then(|| "fish".to_string()));
        assert_eq!(config.shell, ShellKind::Bash);
    }

    #[test]
    fn test_unknown_shell_in_file_keeps_detected_shell() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "shell = \"tcsh\"").expect("write");

        let config = MultiGitConfig::load_from_file(&path).expect("load");
        assert_eq!(config.shell, MultiGitConfig::default().shell);
    }

    #[test]
    fn test_expand_home() {
        let home = Path::new("/home/jane");
        assert_eq!(expand_home_with("~", home), PathBuf::from("/home/jane"));
        assert_eq!(expand_home_with("~/.bin", home), PathBuf::from("/home/jane/.bin"));
        assert_eq!(expand_home_with("/opt/bin", home), PathBuf::from("/opt/bin"));
        assert_eq!(expand_home_with("~other", home), PathBuf::from("~other"));
    }

    #[test]
    fn test_script_path() {
        let config = MultiGitConfig::default().with_bin_dir("/opt/bin");
        assert_eq!(config.script_path("work"), PathBuf::from("/opt/bin/use-work.sh"));
    }

    #[test]
    fn test_display_path_abbreviates_home() {
        let home = home_dir();
        assert_eq!(MultiGitConfig::display_path(&home.join(".ssh")), "~/.ssh");
        assert_eq!(MultiGitConfig::display_path(&home), "~");
        assert_eq!(MultiGitConfig::display_path(Path::new("/opt/keys")), "/opt/keys");
    }

    #[test]
    fn test_explicit_profile_path_wins() {
        let config = MultiGitConfig::default()
            .with_shell(ShellKind::Zsh)
            .with_profile_path("/tmp/profile");
        assert_eq!(config.profile_path(), PathBuf::from("/tmp/profile"));
    }
}
