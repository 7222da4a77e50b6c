use anyhow::Result;

use super::helpers::{arm_client, confirm};
use crate::arm::ResourceManager;
use crate::cli::config::load_config;
use crate::cli::DestroyArgs;

pub async fn execute_destroy(args: DestroyArgs) -> Result<()> {
    let config = load_config()?;
    let client = arm_client(args.subscription, &config)?;

    eprintln!("Destroying workshop environment\n");
    eprintln!("Subscription:   {}", client.subscription_id());
    eprintln!("Resource Group: {}", args.resource_group);
    eprintln!();

    if !client.group_exists(&args.resource_group).await? {
        eprintln!("Resource group does not exist (skipping)");
        return Ok(());
    }

    if !args.force {
        eprintln!("This will delete the resource group and every resource in it.");
        if !confirm("Are you sure?")? {
            eprintln!("Aborted.");
            return Ok(());
        }
    }

    eprintln!("\n==> Deleting resource group");
    client.delete_group(&args.resource_group).await?;
    eprintln!("    ✓ Resource group deletion initiated");
    eprintln!("    Note: Deletion may take several minutes to complete");

    Ok(())
}
