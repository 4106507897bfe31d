//! `init` and `setup` commands.

use super::Context;
use crate::config::MultiGitConfig;
use crate::shell::ProfileEditor;
use crate::{Error, Result};

/// Outcome of initialization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InitReport {
    /// Whether multigit was already initialized.
    pub already_initialized: bool,
    /// Whether the profile was created.
    pub profile_created: bool,
    /// Whether a `PATH` export was appended to the profile.
    pub path_added: bool,
    /// Whether the profile already put the script directory on `PATH`.
    pub bin_on_path: bool,
}

/// Creates the script directory and profile, optionally puts the script
/// directory on `PATH`, and marks multigit initialized.
///
/// # Errors
///
/// Returns an error if a directory or file cannot be created, or the store
/// cannot be updated.
pub fn initialize(ctx: &Context, add_to_path: bool) -> Result<InitReport> {
    let registry = ctx.services.registry();
    let mut report = InitReport {
        already_initialized: registry.is_initialized()?,
        ..InitReport::default()
    };

    let bin_dir = &ctx.config.bin_dir;
    std::fs::create_dir_all(bin_dir)
        .map_err(|e| Error::file_system("create directory", bin_dir, e))?;

    let editor = ProfileEditor::from_config(&ctx.config);
    if !ctx.config.shell.is_powershell() && !editor.path().exists() {
        crate::shell::write_file(editor.path(), "")?;
        report.profile_created = true;
    }

    report.bin_on_path = editor.has_bin_on_path()?;
    if add_to_path && !report.bin_on_path {
        report.path_added = editor.ensure_bin_on_path()?;
        report.bin_on_path = report.path_added;
    }

    registry.set_initialized()?;
    tracing::info!(bin_dir = %bin_dir.display(), "Initialized");
    Ok(report)
}

/// Runs `multigit init`.
///
/// # Errors
///
/// Returns an error if initialization fails.
pub fn execute(ctx: &Context, add_to_path: bool) -> Result<()> {
    let report = initialize(ctx, add_to_path)?;
    print_report(ctx, &report);
    println!("Multi-Git initialized successfully.");
    print_next_steps(ctx);
    Ok(())
}

/// Runs `multigit setup`: initializes if needed and prints next steps.
///
/// # Errors
///
/// Returns an error if initialization fails.
pub fn execute_setup(ctx: &Context, add_to_path: bool) -> Result<()> {
    if ctx.services.registry().is_initialized()? && !add_to_path {
        println!("Already initialized, skipping init step.");
    } else {
        let report = initialize(ctx, add_to_path)?;
        print_report(ctx, &report);
    }

    println!("Setup complete.");
    print_next_steps(ctx);
    Ok(())
}

fn print_report(ctx: &Context, report: &InitReport) {
    let profile = ctx.config.profile_path();
    if report.already_initialized {
        println!("Multi-Git was already initialized; refreshing.");
    }
    if report.profile_created {
        println!("Created {}", profile.display());
    }
    if report.path_added {
        println!(
            "Added {} to PATH in {}",
            MultiGitConfig::display_path(&ctx.config.bin_dir),
            profile.display()
        );
    } else if !report.bin_on_path && !ctx.config.shell.is_powershell() {
        println!(
            "{} is not on PATH. Re-run with --add-to-path or add it to {} yourself.",
            MultiGitConfig::display_path(&ctx.config.bin_dir),
            profile.display()
        );
    }
}

fn print_next_steps(ctx: &Context) {
    println!();
    println!("Next steps:");
    println!("  1. Reload your shell: source {}", ctx.config.profile_path().display());
    println!("  2. Add an identity: multigit add <name> --user-name <name> --user-email <email>");
    println!("  3. Switch with: use-<name>");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shell::ShellKind;
    use tempfile::TempDir;

    fn create_test_context(dir: &TempDir) -> Context {
        let config = MultiGitConfig::default()
            .with_config_dir(dir.path().join(".multi-git"))
            .with_bin_dir(dir.path().join(".bin"))
            .with_ssh_dir(dir.path().join(".ssh"))
            .with_shell(ShellKind::Zsh)
            .with_profile_path(dir.path().join(".zshrc"));
        Context::new(config)
    }

    #[test]
    fn test_initialize_creates_bin_dir_and_profile() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let ctx = create_test_context(&dir);

        let report = initialize(&ctx, false).expect("init");

        assert!(!report.already_initialized);
        assert!(report.profile_created);
        assert!(!report.path_added);
        assert!(dir.path().join(".bin").is_dir());
        assert!(ctx.services.registry().is_initialized().expect("initialized"));
    }

    #[test]
    fn test_initialize_twice_adds_path_once() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let ctx = create_test_context(&dir);

        let first = initialize(&ctx, true).expect("init");
        let second = initialize(&ctx, true).expect("reinit");

        assert!(first.path_added);
        assert!(second.already_initialized);
        assert!(!second.path_added);
        assert!(second.bin_on_path);

        let profile = std::fs::read_to_string(dir.path().join(".zshrc")).expect("read");
        assert_eq!(profile.matches("export PATH=").count(), 1);
    }
}
