// src/cli/commands/helpers.rs
use anyhow::{bail, Result};

use crate::arm::{resolve_credentials, ArmClient, DeploymentMode};
use crate::cli::config::Config;
use crate::cli::TemplateArgs;
use crate::naming::DEFAULT_PREFIX;
use crate::params::{self, TemplateParams};
use crate::provision::{TemplateSource, DEFAULT_TEMPLATE_VERSION};

const DEFAULT_LOCATION: &str = "westus";

/// Resolve location from args or config
pub fn resolve_location(location_arg: Option<String>, config: &Option<Config>) -> String {
    location_arg
        .or_else(|| config.as_ref().and_then(|c| c.location.clone()))
        .unwrap_or_else(|| {
            eprintln!(
                "    Note: No location specified, using default: {}",
                DEFAULT_LOCATION
            );
            DEFAULT_LOCATION.to_string()
        })
}

/// Resolve resource group prefix from args or config
pub fn resolve_prefix(prefix_arg: Option<String>, config: &Option<Config>) -> String {
    prefix_arg
        .or_else(|| config.as_ref().and_then(|c| c.prefix.clone()))
        .unwrap_or_else(|| DEFAULT_PREFIX.to_string())
}

/// Resolve deployment mode from args or config
pub fn resolve_mode(mode_arg: Option<&str>, config: &Option<Config>) -> Result<DeploymentMode> {
    if let Some(mode) = mode_arg {
        return mode.parse();
    }

    match config {
        Some(config) => Ok(config.deployment_mode()?.unwrap_or_default()),
        None => Ok(DeploymentMode::default()),
    }
}

/// Build an ARM client from resolved credentials.
///
/// `AZURE_RESOURCE_MANAGER_ENDPOINT` overrides the public-cloud endpoint.
pub fn arm_client(subscription_arg: Option<String>, config: &Option<Config>) -> Result<ArmClient> {
    let configured = config.as_ref().and_then(|c| c.subscription_id.clone());
    let creds = resolve_credentials(subscription_arg, configured)?;

    match std::env::var("AZURE_RESOURCE_MANAGER_ENDPOINT") {
        Ok(endpoint) if !endpoint.trim().is_empty() => {
            ArmClient::with_base_url(&endpoint, creds.token, creds.subscription_id)
        }
        _ => ArmClient::new(creds.token, creds.subscription_id),
    }
}

/// Collect template parameters: parameters file first, then `--param` overrides
pub fn template_params(args: &TemplateArgs) -> Result<TemplateParams> {
    let from_file = match &args.parameters_file {
        Some(path) => params::load_parameters_file(path)?,
        None => TemplateParams::new(),
    };

    let from_cli = args
        .params
        .iter()
        .map(|raw| params::parse_param(raw))
        .collect::<Result<Vec<_>>>()?;

    Ok(params::merge(from_file, from_cli))
}

/// Template source from `--template` or `--template-uri`
pub fn template_source(args: &TemplateArgs) -> Result<TemplateSource> {
    match (&args.template, &args.template_uri) {
        (Some(path), None) => Ok(TemplateSource::File(path.into())),
        (None, Some(uri)) => Ok(TemplateSource::Uri {
            uri: uri.clone(),
            version: args
                .template_version
                .clone()
                .unwrap_or_else(|| DEFAULT_TEMPLATE_VERSION.to_string()),
        }),
        _ => bail!("Exactly one of --template or --template-uri is required"),
    }
}

/// Read a yes/no confirmation from stdin
pub fn confirm(prompt: &str) -> Result<bool> {
    use std::io::{self, Write};

    eprint!("{} (yes/no): ", prompt);
    io::stderr().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim() == "yes")
}
