use anyhow::Result;
use std::io::IsTerminal;
use std::time::Duration;

use super::helpers::{
    arm_client, resolve_location, resolve_mode, resolve_prefix, template_params, template_source,
};
use crate::arm::PollConfig;
use crate::cli::config::load_config;
use crate::cli::CreateArgs;
use crate::provision::{Provisioner, TemplateSource};

pub async fn execute_create(args: CreateArgs) -> Result<()> {
    let config = load_config()?;
    let template = &args.template;

    let location = resolve_location(template.location.clone(), &config);
    let prefix = resolve_prefix(template.prefix.clone(), &config);
    let mode = resolve_mode(template.mode.as_deref(), &config)?;
    let source = template_source(template)?;
    let params = template_params(template)?;

    let client = arm_client(args.subscription.clone(), &config)?;

    eprintln!("==> Provisioning workshop '{}'", template.name);
    eprintln!("    Subscription: {}", client.subscription_id());
    eprintln!("    Location:     {}", location);
    eprintln!("    Mode:         {}", mode);
    match &source {
        TemplateSource::File(path) => eprintln!("    Template:     {}", path.display()),
        TemplateSource::Uri { uri, version } => {
            eprintln!("    Template:     {} ({})", uri, version)
        }
    }
    if !params.is_empty() {
        eprintln!(
            "    Parameters:   {}",
            params.keys().cloned().collect::<Vec<_>>().join(", ")
        );
    }
    eprintln!();

    let show_progress = !args.quiet && std::io::stderr().is_terminal();
    let provisioner = Provisioner::new(client)
        .with_prefix(&prefix)
        .with_mode(mode)
        .with_poll_config(PollConfig {
            interval: Duration::from_secs(args.poll_interval.max(1)),
            timeout: Duration::from_secs(args.timeout),
        })
        .with_wait(!args.no_wait)
        .with_progress(show_progress);

    let resource_group = match &source {
        TemplateSource::File(path) => {
            provisioner
                .create(&template.name, &location, path, &params)
                .await?
        }
        TemplateSource::Uri { uri, version } => {
            provisioner
                .create_with_uri(&template.name, &location, uri, version, &params)
                .await?
        }
    };

    eprintln!();
    if args.no_wait {
        eprintln!("[ok] Deployment submitted to {}", resource_group);
        eprintln!();
        eprintln!("Check status:");
        eprintln!("  azworkshops status {}", resource_group);
    } else {
        eprintln!("[ok] Workshop environment ready: {}", resource_group);
        eprintln!();
        eprintln!("Tear down with:");
        eprintln!("  azworkshops destroy {}", resource_group);
    }

    // Resource group name on stdout for scripting
    println!("{}", resource_group);

    Ok(())
}
