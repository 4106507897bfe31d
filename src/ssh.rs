//! SSH key helpers.
//!
//! Keys are generated with the system `ssh-keygen`, invoked directly
//! without a shell and with an empty passphrase.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::git::run_command;
use crate::models::default_ssh_key_name;
use crate::{Error, Result};

/// Default RSA key size.
pub const DEFAULT_RSA_BITS: u32 = 4096;

/// Key algorithm to generate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyType {
    /// Ed25519 key.
    #[default]
    Ed25519,
    /// RSA key of the given size.
    Rsa {
        /// Key size in bits.
        bits: u32,
    },
}

impl KeyType {
    /// Parses `ed25519` or `rsa` (with [`DEFAULT_RSA_BITS`]),
    /// case-insensitively.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "ed25519" => Some(Self::Ed25519),
            "rsa" => Some(Self::Rsa {
                bits: DEFAULT_RSA_BITS,
            }),
            _ => None,
        }
    }

    /// Default key file name for identity `name`.
    #[must_use]
    pub fn default_key_name(self, name: &str) -> String {
        match self {
            Self::Ed25519 => default_ssh_key_name(name),
            Self::Rsa { .. } => format!("id_rsa_{name}"),
        }
    }

    fn keygen_args(self) -> Vec<String> {
        match self {
            Self::Ed25519 => vec!["-t".to_string(), "ed25519".to_string()],
            Self::Rsa { bits } => vec![
                "-t".to_string(),
                "rsa".to_string(),
                "-b".to_string(),
                bits.to_string(),
            ],
        }
    }
}

/// Returns the public key path for a private key path.
#[must_use]
pub fn public_key_path(private_key: &Path) -> PathBuf {
    let mut path = OsString::from(private_key.as_os_str());
    path.push(".pub");
    PathBuf::from(path)
}

/// Generates `<ssh_dir>/<key_name>` and its `.pub` companion.
///
/// Returns the private key path.
///
/// # Errors
///
/// Returns [`Error::AlreadyExists`] if the private key already exists,
/// [`Error::FileSystem`] if `ssh_dir` cannot be created, or
/// [`Error::CommandFailed`] if `ssh-keygen` fails or does not produce both
/// files.
pub fn generate_key(
    ssh_dir: &Path,
    key_name: &str,
    email: &str,
    key_type: KeyType,
) -> Result<PathBuf> {
    let key_path = ssh_dir.join(key_name);
    if key_path.exists() {
        return Err(Error::AlreadyExists {
            kind: "SSH key",
            name: key_path.display().to_string(),
        });
    }

    std::fs::create_dir_all(ssh_dir)
        .map_err(|e| Error::file_system("create directory", ssh_dir, e))?;

    let mut command = Command::new("ssh-keygen");
    command
        .args(key_type.keygen_args())
        .arg("-C")
        .arg(email)
        .arg("-f")
        .arg(&key_path)
        .args(["-N", "", "-q"]);
    run_command(&mut command, "ssh-keygen")?;

    if !key_path.exists() || !public_key_path(&key_path).exists() {
        return Err(Error::CommandFailed {
            command: "ssh-keygen".to_string(),
            cause: format!("key files missing after generating {}", key_path.display()),
        });
    }

    tracing::info!(path = %key_path.display(), "SSH key generated");
    Ok(key_path)
}

/// Reads the public key for `private_key`, trimmed.
///
/// # Errors
///
/// Returns [`Error::SshKeyNotFound`] if the `.pub` file is missing, or
/// [`Error::FileSystem`] if it cannot be read.
pub fn public_key(private_key: &Path) -> Result<String> {
    let path = public_key_path(private_key);
    match std::fs::read_to_string(&path) {
        Ok(contents) => Ok(contents.trim().to_string()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(Error::SshKeyNotFound(path)),
        Err(e) => Err(Error::file_system("read public key", &path, e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_public_key_path() {
        assert_eq!(
            public_key_path(Path::new("/home/jane/.ssh/id_ed25519_work")),
            PathBuf::from("/home/jane/.ssh/id_ed25519_work.pub")
        );
    }

    #[test]
    fn test_keygen_args() {
        assert_eq!(KeyType::Ed25519.keygen_args(), vec!["-t", "ed25519"]);
        assert_eq!(
            KeyType::Rsa { bits: 2048 }.keygen_args(),
            vec!["-t", "rsa", "-b", "2048"]
        );
    }

    #[test]
    fn test_parse_and_default_key_names() {
        assert_eq!(KeyType::parse("ED25519"), Some(KeyType::Ed25519));
        assert_eq!(
            KeyType::parse("rsa"),
            Some(KeyType::Rsa {
                bits: DEFAULT_RSA_BITS
            })
        );
        assert_eq!(KeyType::parse("dsa"), None);
        assert_eq!(KeyType::Ed25519.default_key_name("work"), "id_ed25519_work");
        assert_eq!(KeyType::Rsa { bits: 2048 }.default_key_name("work"), "id_rsa_work");
    }

    #[test]
    fn test_generate_refuses_to_overwrite() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        std::fs::write(dir.path().join("id_work"), "existing").expect("write");

        let result = generate_key(dir.path(), "id_work", "jane@corp.example", KeyType::Ed25519);

        assert!(matches!(result, Err(Error::AlreadyExists { kind: "SSH key", .. })));
        assert_eq!(
            std::fs::read_to_string(dir.path().join("id_work")).expect("read"),
            "existing"
        );
    }

    #[test]
    fn test_public_key_reads_and_trims() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let key = dir.path().join("id_work");
        std::fs::write(public_key_path(&key), "ssh-ed25519 AAAA jane@corp.example\n").expect("write");

        assert_eq!(
            public_key(&key).expect("public key"),
            "ssh-ed25519 AAAA jane@corp.example"
        );
    }

    #[test]
    fn test_public_key_missing() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let result = public_key(&dir.path().join("id_none"));
        assert!(matches!(result, Err(Error::SshKeyNotFound(_))));
    }

    #[test]
    fn test_generate_key_when_keygen_available() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let ssh_dir = dir.path().join(".ssh");

        match generate_key(&ssh_dir, "id_test", "jane@corp.example", KeyType::Ed25519) {
            Ok(path) => {
                assert_eq!(path, ssh_dir.join("id_test"));
                let public = public_key(&path).expect("public key");
                assert!(public.starts_with("ssh-ed25519 "));
                assert!(public.ends_with("jane@corp.example"));
            },
            // ssh-keygen is not installed everywhere
            Err(e) => assert!(matches!(e, Error::CommandFailed { .. }), "unexpected error: {e}"),
        }
    }
}
