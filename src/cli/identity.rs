//! `add`, `list`, `remove` and `set-local` commands.

use std::path::{Path, PathBuf};

use super::{Context, confirm, init};
use crate::models::{Identity, is_valid_email, is_valid_identity_name, is_valid_key_name};
use crate::shell::{ProfileEditor, ScriptWriter};
use crate::ssh::{self, KeyType};
use crate::{Error, Result, git};

/// Arguments for `multigit add`.
#[derive(Debug, Clone, Default)]
pub struct AddArgs {
    /// Identity name.
    pub name: String,
    /// Git `user.name`.
    pub user_name: String,
    /// Git `user.email`.
    pub user_email: String,
    /// Display name; defaults to the capitalized name.
    pub display_name: Option<String>,
    /// SSH key file name; defaults to `id_ed25519_<name>` (`id_rsa_<name>`
    /// for RSA).
    pub ssh_key: Option<String>,
    /// Generate the key if it does not exist.
    pub generate_ssh_key: bool,
    /// Algorithm for a generated key; also picks the default key name.
    pub key_type: KeyType,
    /// Replace an existing identity.
    pub force: bool,
}

/// What `add` did.
#[derive(Debug, Clone)]
pub struct AddOutcome {
    /// The stored identity.
    pub identity: Identity,
    /// Whether an existing identity was replaced.
    pub replaced: bool,
    /// Public key of a freshly generated SSH key.
    pub generated_public_key: Option<String>,
    /// Script or profile that received the switch command.
    pub script_path: PathBuf,
}

/// Validates `args`, ensures the SSH key exists, writes the switch script,
/// stores the identity and refreshes the alias block.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] for a bad name, user name or email,
/// [`Error::AlreadyExists`] if the identity exists and `force` is unset,
/// [`Error::SshKeyNotFound`] if the key is missing and generation was not
/// requested, or an error from key generation, script writing or the store.
pub fn add_identity(ctx: &Context, args: &AddArgs) -> Result<AddOutcome> {
    validate(args)?;

    let key_name = args
        .ssh_key
        .clone()
        .unwrap_or_else(|| args.key_type.default_key_name(&args.name));
    let key_path = ctx.config.ssh_key_path(&key_name);

    let mut identity = Identity::new(
        args.name.as_str(),
        args.user_name.trim(),
        args.user_email.trim(),
        key_name.as_str(),
    );
    if let Some(display_name) = args.display_name.as_deref().filter(|d| !d.trim().is_empty()) {
        identity = identity.with_display_name(display_name.trim());
    }

    identity.validate().map_err(Error::InvalidInput)?;

    let registry = ctx.services.registry();
    if !registry.is_initialized()? {
        init::initialize(ctx, false)?;
    }

    if registry.contains(&args.name)? && !args.force {
        return Err(Error::AlreadyExists {
            kind: "configuration",
            name: args.name.clone(),
        });
    }

    let generated_public_key = if key_path.exists() {
        None
    } else if args.generate_ssh_key {
        let path = ssh::generate_key(
            &ctx.config.ssh_dir,
            &key_name,
            &args.user_email,
            args.key_type,
        )?;
        Some(ssh::public_key(&path)?)
    } else {
        return Err(Error::SshKeyNotFound(key_path));
    };

    let script_path = ScriptWriter::from_config(&ctx.config).write(&identity)?;
    let replaced = registry.upsert(identity.clone())?;
    ProfileEditor::from_config(&ctx.config).sync_aliases(&registry.list()?)?;

    Ok(AddOutcome {
        identity,
        replaced,
        generated_public_key,
        script_path,
    })
}

fn validate(args: &AddArgs) -> Result<()> {
    if !is_valid_identity_name(&args.name) {
        return Err(Error::InvalidInput(format!(
            "identity name '{}' may only contain letters, digits, '.', '_' and '-'",
            args.name
        )));
    }
    if let Some(key) = args.ssh_key.as_deref().filter(|key| !is_valid_key_name(key)) {
        return Err(Error::InvalidInput(format!(
            "SSH key name '{key}' must be a plain file name inside the SSH directory"
        )));
    }
    if args.user_name.trim().is_empty() {
        return Err(Error::InvalidInput("user name is required".to_string()));
    }
    if !is_valid_email(args.user_email.trim()) {
        return Err(Error::InvalidInput(format!(
            "'{}' is not a valid email address",
            args.user_email
        )));
    }
    Ok(())
}

/// Runs `multigit add`.
///
/// # Errors
///
/// Returns an error if the identity cannot be added.
pub fn execute_add(ctx: &Context, args: &AddArgs) -> Result<()> {
    let outcome = add_identity(ctx, args)?;
    let identity = &outcome.identity;

    if let Some(public_key) = &outcome.generated_public_key {
        println!("Generated SSH key {}", identity.ssh_key_name);
        println!("Public key:");
        println!("{public_key}");
        println!("Add this key to your GitHub/GitLab account.");
        println!();
    }

    let verb = if outcome.replaced { "updated" } else { "added" };
    println!("Configuration \"{}\" {verb}.", identity.name);
    println!("Switch script: {}", outcome.script_path.display());
    println!();
    println!("Next steps:");
    println!("  1. Reload your shell: source {}", ctx.config.profile_path().display());
    println!("  2. Use: {}", identity.command_name());
    println!(
        "  3. Add the public key to your git host: cat {}.pub",
        ctx.config.ssh_key_path(&identity.ssh_key_name).display()
    );
    Ok(())
}

/// Runs `multigit list`.
///
/// # Errors
///
/// Returns an error if the store cannot be read.
pub fn execute_list(ctx: &Context) -> Result<()> {
    let registry = ctx.services.registry();
    if !registry.is_initialized()? {
        println!("Multi-Git is not initialized. Run: multigit init");
        return Ok(());
    }

    let identities = registry.list()?;
    if identities.is_empty() {
        println!("No configurations found. Add one with: multigit add <name>");
        return Ok(());
    }

    println!("Configured git identities:");
    println!();
    for (index, identity) in identities.iter().enumerate() {
        println!("{}. {}", index + 1, identity.label());
        println!("   Name: {}", identity.user_name);
        println!("   Email: {}", identity.user_email);
        println!(
            "   SSH Key: {}",
            ctx.config.ssh_key_path(&identity.ssh_key_name).display()
        );
        if let Some(group) = &identity.group {
            println!("   Group: {group}");
        }
        println!("   Command: {}", identity.command_name());
        println!();
    }
    Ok(())
}

/// Removes an identity with its switch script and alias.
///
/// Returns the removed identity.
///
/// # Errors
///
/// Returns [`Error::ConfigNotFound`] if the identity does not exist, or an
/// error if the script, profile or store cannot be updated.
pub fn remove_identity(ctx: &Context, name: &str) -> Result<Identity> {
    let registry = ctx.services.registry();
    let identity = registry.require(name)?;

    ScriptWriter::from_config(&ctx.config).remove(name)?;
    registry.remove(name)?;

    let editor = ProfileEditor::from_config(&ctx.config);
    editor.remove_alias(name)?;
    let remaining = registry.list()?;
    if !remaining.is_empty() {
        editor.sync_aliases(&remaining)?;
    }

    Ok(identity)
}

/// Runs `multigit remove`.
///
/// # Errors
///
/// Returns an error if the identity cannot be removed.
pub fn execute_remove(ctx: &Context, name: &str, force: bool) -> Result<()> {
    ctx.services.registry().require(name)?;

    if !force && !confirm(&format!("Remove configuration \"{name}\"?"))? {
        println!("Cancelled.");
        return Ok(());
    }

    remove_identity(ctx, name)?;
    println!("Configuration \"{name}\" removed.");
    Ok(())
}

/// Applies identity `name` to the repository at `repo`.
///
/// # Errors
///
/// Returns [`Error::ConfigNotFound`] if the identity does not exist, or an
/// error if `repo` is not a repository or `git config` fails.
pub fn set_local(ctx: &Context, name: &str, repo: &Path) -> Result<Identity> {
    let identity = ctx.services.registry().require(name)?;
    let key_path = ctx.config.ssh_key_path(&identity.ssh_key_name);
    git::set_local_identity(repo, &identity, &key_path)?;
    Ok(identity)
}

/// Runs `multigit set-local` in the current directory.
///
/// # Errors
///
/// Returns an error if the identity cannot be applied.
pub fn execute_set_local(ctx: &Context, name: &str) -> Result<()> {
    let cwd = std::env::current_dir()
        .map_err(|e| Error::file_system("read current directory", ".", e))?;
    let identity = set_local(ctx, name, &cwd)?;

    println!("Set local git config for this repository:");
    println!("   Name: {}", identity.user_name);
    println!("   Email: {}", identity.user_email);
    println!("   SSH Key: {}", identity.ssh_key_name);
    Ok(())
}
