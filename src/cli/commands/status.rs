use anyhow::Result;

use super::helpers::arm_client;
use crate::arm::{ProvisioningState, ResourceManager};
use crate::cli::config::load_config;
use crate::cli::StatusArgs;

pub async fn execute_status(args: StatusArgs) -> Result<()> {
    let config = load_config()?;
    let client = arm_client(args.subscription, &config)?;
    let deployment = args
        .deployment
        .unwrap_or_else(|| args.resource_group.clone());

    eprintln!("Checking deployment status...\n");
    eprintln!("Subscription:   {}", client.subscription_id());
    eprintln!("Resource Group: {}", args.resource_group);
    eprintln!();

    eprintln!("Resource Group:");
    if client.group_exists(&args.resource_group).await? {
        eprintln!("  [ok] {}", args.resource_group);
    } else {
        eprintln!("  [missing] {} (not found)", args.resource_group);
        return Ok(());
    }

    eprintln!();
    eprintln!("Deployment:");
    match client
        .find_deployment(&args.resource_group, &deployment)
        .await?
    {
        Some(state) => {
            let label = match state.provisioning_state() {
                ProvisioningState::Succeeded => "ok",
                ProvisioningState::Failed | ProvisioningState::Canceled => "failed",
                _ => "pending",
            };
            eprintln!("  [{}] {}", label, deployment);
            eprintln!("  [{}] State: {}", label, state.provisioning_state());
            if let Some(ref ts) = state.properties.timestamp {
                eprintln!("  Updated: {}", ts);
            }
            if let Some(error) = state.error_message() {
                eprintln!("  Error: {}", error);
            }
            if let Some(ref outputs) = state.properties.outputs {
                eprintln!("  Outputs:");
                println!("{}", serde_json::to_string_pretty(outputs)?);
            }
        }
        None => {
            eprintln!("  [missing] {} (not found)", deployment);
        }
    }

    eprintln!();
    eprintln!("[ok] Status check complete");

    Ok(())
}
