//! Git identity records.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity names become file names (`use-<name>.sh`) and alias names, so
/// they are restricted to a shell-safe alphabet.
static IDENTITY_NAME: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_.-]*$").ok());

/// A named git identity: user name, email and SSH key.
///
/// Serialized with camelCase field names; `directoryPath` and `group` are
/// omitted when unset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    /// Unique key of the identity.
    pub name: String,
    /// Human readable label ("Work", "Personal").
    #[serde(default)]
    pub display_name: String,
    /// Value for `git config user.name`.
    pub user_name: String,
    /// Value for `git config user.email`.
    pub user_email: String,
    /// File name of the private key inside the SSH directory.
    pub ssh_key_name: String,
    /// Directory this identity was mapped to, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory_path: Option<String>,
    /// Group most recently assigned through the group registry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
}

impl Identity {
    /// Creates an identity with a display name derived from `name`.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        user_name: impl Into<String>,
        user_email: impl Into<String>,
        ssh_key_name: impl Into<String>,
    ) -> Self {
        let name = name.into();
        Self {
            display_name: default_display_name(&name),
            name,
            user_name: user_name.into(),
            user_email: user_email.into(),
            ssh_key_name: ssh_key_name.into(),
            directory_path: None,
            group: None,
        }
    }

    /// Sets the display name.
    #[must_use]
    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = display_name.into();
        self
    }

    /// Sets the directory path.
    #[must_use]
    pub fn with_directory_path(mut self, path: impl Into<String>) -> Self {
        self.directory_path = Some(path.into());
        self
    }

    /// Sets the group.
    #[must_use]
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Returns the display name, falling back to the identity name.
    #[must_use]
    pub fn label(&self) -> &str {
        if self.display_name.trim().is_empty() {
            &self.name
        } else {
            &self.display_name
        }
    }

    /// Name of the shell command that switches to this identity.
    #[must_use]
    pub fn command_name(&self) -> String {
        format!("use-{}", self.name)
    }

    /// Checks the fields that end up in file names and generated shell
    /// text.
    ///
    /// Returns a description of the first problem found.
    pub fn validate(&self) -> Result<(), String> {
        if !is_valid_identity_name(&self.name) {
            return Err(format!("invalid identity name {:?}", self.name));
        }
        if !is_valid_key_name(&self.ssh_key_name) {
            return Err(format!(
                "identity \"{}\" has invalid SSH key name {:?}",
                self.name, self.ssh_key_name
            ));
        }
        for (field, value) in [
            ("display name", &self.display_name),
            ("user name", &self.user_name),
            ("user email", &self.user_email),
        ] {
            if value.chars().any(char::is_control) {
                return Err(format!(
                    "identity \"{}\" has control characters in its {field}",
                    self.name
                ));
            }
        }
        Ok(())
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}>", self.user_name, self.user_email)
    }
}

/// Default SSH key file name for an identity.
#[must_use]
pub fn default_ssh_key_name(name: &str) -> String {
    format!("id_ed25519_{name}")
}

/// Capitalizes the first character of `name`.
#[must_use]
pub fn default_display_name(name: &str) -> String {
    let mut chars = name.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

/// Returns true if `name` can be used as an identity name.
#[must_use]
pub fn is_valid_identity_name(name: &str) -> bool {
    IDENTITY_NAME
        .as_ref()
        .is_some_and(|pattern| pattern.is_match(name))
}

/// Returns true if `name` is a plain file name usable inside the SSH
/// directory.
#[must_use]
pub fn is_valid_key_name(name: &str) -> bool {
    is_valid_identity_name(name)
}

/// Email validation helper.
///
/// Accepts `local@domain.tld` with no whitespace and non-empty labels.
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }

    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 {
        return false;
    }

    let local = parts[0];
    let domain = parts[1];
    if local.is_empty() {
        return false;
    }

    let domain_parts: Vec<&str> = domain.split('.').collect();
    if domain_parts.len() < 2 {
        return false;
    }

    domain_parts.iter().all(|part| !part.is_empty())
}
