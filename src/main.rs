//! Binary entry point for multigit.
//!
//! This binary provides the CLI interface for managing git identities.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(missing_docs)]
// Allow print_stderr in main binary for CLI output
#![allow(clippy::print_stderr)]
#![allow(clippy::print_stdout)]
// Allow needless_pass_by_value for command functions
#![allow(clippy::needless_pass_by_value)]
// Allow multiple crate versions from transitive dependencies
#![allow(clippy::multiple_crate_versions)]

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use multigit::MultiGitConfig;
use multigit::cli::{Context, auto_switch, group, hook, identity, init, transfer};
use multigit::observability::{self, InitOptions};
use multigit::ssh::{DEFAULT_RSA_BITS, KeyType};
use std::path::PathBuf;
use std::process::ExitCode;

/// multigit - Manage multiple git identities on one machine.
#[derive(Parser)]
#[command(name = "multigit")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
enum Commands {
    /// Initialize multigit.
    Init {
        /// Add the script directory to PATH in the shell profile.
        #[arg(long)]
        add_to_path: bool,
    },

    /// Initialize if needed and print next steps.
    Setup {
        /// Add the script directory to PATH in the shell profile.
        #[arg(long)]
        add_to_path: bool,
    },

    /// Add or update an identity.
    Add {
        /// Identity name (used for `use-<name>`).
        name: String,

        /// Git user.name.
        #[arg(long)]
        user_name: String,

        /// Git user.email.
        #[arg(long)]
        user_email: String,

        /// Display name (default: capitalized name).
        #[arg(long)]
        display_name: Option<String>,

        /// SSH key file name inside the SSH directory (default: `id_ed25519_<name>`).
        #[arg(long)]
        ssh_key: Option<String>,

        /// Generate the SSH key if it does not exist.
        #[arg(long)]
        generate_ssh_key: bool,

        /// Key algorithm: ed25519 or rsa.
        #[arg(long, default_value = "ed25519", value_parser = parse_key_type)]
        key_type: KeyType,

        /// Key size for RSA keys.
        #[arg(long, default_value_t = DEFAULT_RSA_BITS)]
        rsa_bits: u32,

        /// Overwrite an existing identity.
        #[arg(short, long)]
        force: bool,
    },

    /// List identities.
    List,

    /// Remove an identity.
    Remove {
        /// Identity name.
        name: String,

        /// Skip the confirmation prompt.
        #[arg(short, long)]
        force: bool,
    },

    /// Export identities and groups as JSON.
    Export {
        /// Output file (default: stdout).
        file: Option<PathBuf>,
    },

    /// Import identities and groups from an export file.
    Import {
        /// Export file to import.
        file: PathBuf,
    },

    /// Apply an identity to the current repository only.
    SetLocal {
        /// Identity name.
        name: String,
    },

    /// Manage the pre-commit hook in the current repository.
    Hook {
        /// Hook action.
        #[command(subcommand)]
        action: HookAction,
    },

    /// Manage directory-based identity switching.
    AutoSwitch {
        /// Auto-switch action.
        #[command(subcommand)]
        action: AutoSwitchAction,
    },

    /// Manage identity groups.
    Group {
        /// Group action.
        #[command(subcommand)]
        action: GroupAction,
    },

    /// Generate shell completions.
    Completions {
        /// Target shell.
        shell: Shell,
    },
}

/// Hook actions.
#[derive(Subcommand)]
enum HookAction {
    /// Install the pre-commit hook.
    Install,
    /// Remove the pre-commit hook.
    Uninstall,
}

/// Auto-switch actions.
#[derive(Subcommand)]
enum AutoSwitchAction {
    /// Enable auto-switching.
    Enable,
    /// Disable auto-switching.
    Disable,
    /// Show the flag and all mappings.
    Status,
    /// Map a directory to an identity.
    Add {
        /// Directory path.
        path: PathBuf,
        /// Identity name.
        name: String,
    },
    /// Remove a directory mapping.
    Remove {
        /// Directory path.
        path: PathBuf,
    },
    /// Print the identity mapped to a directory.
    Current {
        /// Directory path (default: current directory).
        path: Option<PathBuf>,
    },
}

/// Group actions.
#[derive(Subcommand)]
enum GroupAction {
    /// Create an empty group.
    Create {
        /// Group name.
        group: String,
    },
    /// Add an identity to a group.
    Add {
        /// Group name.
        group: String,
        /// Identity name.
        name: String,
    },
    /// Remove an identity from a group.
    Remove {
        /// Group name.
        group: String,
        /// Identity name.
        name: String,
    },
    /// Delete a group.
    Delete {
        /// Group name.
        group: String,
    },
    /// List groups and their members.
    List,
    /// Show the identities in a group.
    Show {
        /// Group name.
        group: String,
    },
}

/// Main entry point.
fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    if let Err(e) = observability::init_from_env(InitOptions {
        verbose: cli.verbose,
    }) {
        eprintln!("Failed to initialize logging: {e}");
        return ExitCode::FAILURE;
    }

    let config = match MultiGitConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        },
    };

    match run_command(cli.command, config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        },
    }
}

/// Runs the selected command.
fn run_command(command: Commands, config: MultiGitConfig) -> Result<(), Box<dyn std::error::Error>> {
    if let Commands::Completions { shell } = command {
        clap_complete::generate(shell, &mut Cli::command(), "multigit", &mut std::io::stdout());
        return Ok(());
    }

    let ctx = Context::new(config);
    match command {
        Commands::Init { add_to_path } => init::execute(&ctx, add_to_path)?,

        Commands::Setup { add_to_path } => init::execute_setup(&ctx, add_to_path)?,

        Commands::Add {
            name,
            user_name,
            user_email,
            display_name,
            ssh_key,
            generate_ssh_key,
            key_type,
            rsa_bits,
            force,
        } => identity::execute_add(
            &ctx,
            &identity::AddArgs {
                name,
                user_name,
                user_email,
                display_name,
                ssh_key,
                generate_ssh_key,
                key_type: match key_type {
                    KeyType::Rsa { .. } => KeyType::Rsa { bits: rsa_bits },
                    KeyType::Ed25519 => KeyType::Ed25519,
                },
                force,
            },
        )?,

        Commands::List => identity::execute_list(&ctx)?,

        Commands::Remove { name, force } => identity::execute_remove(&ctx, &name, force)?,

        Commands::Export { file } => transfer::execute_export(&ctx, file.as_deref())?,

        Commands::Import { file } => transfer::execute_import(&ctx, &file)?,

        Commands::SetLocal { name } => identity::execute_set_local(&ctx, &name)?,

        Commands::Hook { action } => cmd_hook(&ctx, action)?,

        Commands::AutoSwitch { action } => cmd_auto_switch(&ctx, action)?,

        Commands::Group { action } => cmd_group(&ctx, action)?,

        Commands::Completions { .. } => {},
    }
    Ok(())
}

/// Parses the `--key-type` value.
fn parse_key_type(s: &str) -> Result<KeyType, String> {
    KeyType::parse(s).ok_or_else(|| format!("unknown key type '{s}' (expected ed25519 or rsa)"))
}

/// Hook command.
fn cmd_hook(ctx: &Context, action: HookAction) -> multigit::Result<()> {
    match action {
        HookAction::Install => hook::execute_install(ctx),
        HookAction::Uninstall => hook::execute_uninstall(),
    }
}

/// Auto-switch command.
fn cmd_auto_switch(ctx: &Context, action: AutoSwitchAction) -> multigit::Result<()> {
    match action {
        AutoSwitchAction::Enable => auto_switch::execute_enable(ctx),
        AutoSwitchAction::Disable => auto_switch::execute_disable(ctx),
        AutoSwitchAction::Status => auto_switch::execute_status(ctx),
        AutoSwitchAction::Add { path, name } => auto_switch::execute_add(ctx, &path, &name),
        AutoSwitchAction::Remove { path } => auto_switch::execute_remove(ctx, &path),
        AutoSwitchAction::Current { path } => auto_switch::execute_current(ctx, path.as_deref()),
    }
}

/// Group command.
fn cmd_group(ctx: &Context, action: GroupAction) -> multigit::Result<()> {
    match action {
        GroupAction::Create { group } => group::execute_create(ctx, &group),
        GroupAction::Add { group, name } => group::execute_add(ctx, &group, &name),
        GroupAction::Remove { group, name } => group::execute_remove(ctx, &group, &name),
        GroupAction::Delete { group } => group::execute_delete(ctx, &group),
        GroupAction::List => group::execute_list(ctx),
        GroupAction::Show { group } => group::execute_show(ctx, &group),
    }
}
