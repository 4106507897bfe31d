//! `group` command.

use super::Context;
use crate::Result;

/// Runs `multigit group create`.
///
/// # Errors
///
/// Returns an error if the group exists or the store cannot be updated.
pub fn execute_create(ctx: &Context, group: &str) -> Result<()> {
    ctx.services.groups().create_group(group)?;
    println!("Group \"{group}\" created.");
    Ok(())
}

/// Runs `multigit group add`.
///
/// # Errors
///
/// Returns an error if the identity does not exist or the store cannot be
/// updated.
pub fn execute_add(ctx: &Context, group: &str, identity: &str) -> Result<()> {
    ctx.services.groups().add_to_group(identity, group)?;
    println!("Added \"{identity}\" to group \"{group}\".");
    Ok(())
}

/// Runs `multigit group remove`.
///
/// # Errors
///
/// Returns an error if the store cannot be updated.
pub fn execute_remove(ctx: &Context, group: &str, identity: &str) -> Result<()> {
    ctx.services.groups().remove_from_group(identity, group)?;
    println!("Removed \"{identity}\" from group \"{group}\".");
    Ok(())
}

/// Runs `multigit group delete`.
///
/// # Errors
///
/// Returns an error if the group does not exist or the store cannot be
/// updated.
pub fn execute_delete(ctx: &Context, group: &str) -> Result<()> {
    ctx.services.groups().delete_group(group)?;
    println!("Group \"{group}\" deleted.");
    Ok(())
}

/// Runs `multigit group list`.
///
/// # Errors
///
/// Returns an error if the store cannot be read.
pub fn execute_list(ctx: &Context) -> Result<()> {
    let groups = ctx.services.groups();
    let names = groups.list_groups()?;
    if names.is_empty() {
        println!("No groups found.");
        return Ok(());
    }

    for name in names {
        println!("{name}:");
        let members = groups.list_members(&name)?;
        if members.is_empty() {
            println!("  (empty)");
        }
        for member in members {
            println!("  - {member}");
        }
    }
    Ok(())
}

/// Runs `multigit group show`.
///
/// Members that are no longer registered are listed as missing.
///
/// # Errors
///
/// Returns an error if the store cannot be read.
pub fn execute_show(ctx: &Context, group: &str) -> Result<()> {
    let members = ctx.services.groups().list_members(group)?;
    if members.is_empty() {
        println!("Group \"{group}\" is empty or does not exist.");
        return Ok(());
    }

    let registry = ctx.services.registry();
    println!("Group \"{group}\":");
    for member in members {
        match registry.get(&member)? {
            Some(identity) => {
                println!("  {} ({})", identity.label(), identity.name);
                println!("    Name: {}", identity.user_name);
                println!("    Email: {}", identity.user_email);
            },
            None => println!("  {member} (missing)"),
        }
    }
    Ok(())
}
