use anyhow::{bail, Result};
use std::path::Path;

use crate::cli::config::{Config, CONFIG_FILENAME};
use crate::cli::InitArgs;

pub fn execute_init(args: InitArgs) -> Result<()> {
    // Check if config already exists
    if Path::new(CONFIG_FILENAME).exists() && !args.force {
        bail!(
            "{} already exists. Use --force to overwrite.",
            CONFIG_FILENAME
        );
    }

    let config = Config {
        location: args.location,
        subscription_id: args.subscription,
        prefix: args.prefix,
        mode: args.mode,
    };

    // Reject an unknown mode before writing it
    config.deployment_mode()?;

    config.save()?;

    eprintln!("Created {}", CONFIG_FILENAME);
    if let Some(ref location) = config.location {
        eprintln!("  location: {}", location);
    }
    if let Some(ref subscription) = config.subscription_id {
        eprintln!("  subscription_id: {}", subscription);
    }
    if let Some(ref prefix) = config.prefix {
        eprintln!("  prefix: {}", prefix);
    }
    if let Some(ref mode) = config.mode {
        eprintln!("  mode: {}", mode);
    }
    eprintln!();
    eprintln!("Next: azworkshops create <name> --template azuredeploy.json");

    Ok(())
}
