use anyhow::{Context, Result};
use chrono::Utc;

use super::helpers::{
    resolve_location, resolve_mode, resolve_prefix, template_params, template_source,
};
use crate::cli::config::load_config;
use crate::cli::PlanArgs;
use crate::provision::build_plan;

pub fn execute_plan(args: PlanArgs) -> Result<()> {
    let config = load_config()?;
    let template = &args.template;

    let location = resolve_location(template.location.clone(), &config);
    let prefix = resolve_prefix(template.prefix.clone(), &config);
    let mode = resolve_mode(template.mode.as_deref(), &config)?;
    let source = template_source(template)?;
    let params = template_params(template)?;

    let plan = build_plan(
        &prefix,
        mode,
        Utc::now(),
        &template.name,
        &location,
        &source,
        &params,
    )?;

    eprintln!("==> Azure Deployment Plan\n");
    eprintln!("Resource Group:");
    eprintln!("  - Name:     {}", plan.resource_group);
    eprintln!("  - Location: {}", plan.group.location);
    eprintln!();
    eprintln!("Deployment:");
    eprintln!("  - Name: {}", plan.resource_group);
    eprintln!("  - Mode: {}", mode);
    eprintln!("  - Body:");

    let body = serde_json::to_string_pretty(&plan.deployment)
        .context("Failed to serialize deployment")?;
    println!("{}", body);

    eprintln!();
    eprintln!("Note: the timestamp in the name is taken again when you run create.");

    Ok(())
}
