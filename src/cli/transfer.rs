//! `export` and `import` commands.

use std::path::Path;

use super::Context;
use crate::models::ImportSummary;
use crate::shell::{ProfileEditor, ScriptWriter};
use crate::Result;

/// Runs `multigit export`. Without a file the JSON goes to stdout.
///
/// # Errors
///
/// Returns an error if the store cannot be read or the file cannot be
/// written.
pub fn execute_export(ctx: &Context, file: Option<&Path>) -> Result<()> {
    let transfer = ctx.services.transfer();
    match file {
        Some(path) => {
            let export = transfer.export_to_file(path)?;
            println!(
                "Exported {} configuration(s) and {} group(s) to {}",
                export.configs.len(),
                export.groups.len(),
                path.display()
            );
        },
        None => println!("{}", transfer.export_all()?.to_json()?),
    }
    Ok(())
}

/// Imports `file`, then writes switch scripts for the imported identities
/// and refreshes the alias block.
///
/// # Errors
///
/// Returns an error if the file is missing or invalid, or if scripts, the
/// profile or the store cannot be updated.
pub fn import_file(ctx: &Context, file: &Path) -> Result<ImportSummary> {
    let summary = ctx.services.transfer().import_from_file(file)?;

    let registry = ctx.services.registry();
    let writer = ScriptWriter::from_config(&ctx.config);
    for name in summary.added.iter().chain(&summary.updated) {
        if let Some(identity) = registry.get(name)? {
            writer.write(&identity)?;
        }
    }
    ProfileEditor::from_config(&ctx.config).sync_aliases(&registry.list()?)?;

    Ok(summary)
}

/// Runs `multigit import`.
///
/// # Errors
///
/// Returns an error if the import fails.
pub fn execute_import(ctx: &Context, file: &Path) -> Result<()> {
    let summary = import_file(ctx, file)?;

    println!("Imported from {}: {}", file.display(), summary.summary());
    println!();
    println!("Next steps:");
    println!("  1. Reload your shell: source {}", ctx.config.profile_path().display());
    println!("  2. Verify: multigit list");
    Ok(())
}
