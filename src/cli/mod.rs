pub mod commands;
pub mod config;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "azworkshops")]
#[command(about = "Provision Azure workshop environments from ARM templates")]
#[command(version)]
pub struct Cli {
    /// Emit logs as JSON (filter with RUST_LOG)
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a .azworkshops.toml with defaults for this directory
    Init(InitArgs),
    /// Create a resource group and deploy a template into it
    Create(CreateArgs),
    /// Dry-run: show the resource group name and deployment payload
    Plan(PlanArgs),
    /// Show resource group and deployment status
    Status(StatusArgs),
    /// Delete a resource group and everything in it
    Destroy(DestroyArgs),
}

#[derive(clap::Args)]
pub struct InitArgs {
    /// Default Azure region
    #[arg(long)]
    pub location: Option<String>,

    /// Default subscription ID
    #[arg(long)]
    pub subscription: Option<String>,

    /// Resource group name prefix
    #[arg(long)]
    pub prefix: Option<String>,

    /// Default deployment mode (complete or incremental)
    #[arg(long)]
    pub mode: Option<String>,

    /// Overwrite an existing config file
    #[arg(long)]
    pub force: bool,
}

/// Template location and parameters shared by `create` and `plan`
#[derive(clap::Args, Clone)]
pub struct TemplateArgs {
    /// Workshop name (resource group becomes <prefix>_<name>_<timestamp>)
    pub name: String,

    /// Local ARM template file (sent inline)
    #[arg(long, conflicts_with = "template_uri", required_unless_present = "template_uri")]
    pub template: Option<String>,

    /// URI of a remote ARM template
    #[arg(long)]
    pub template_uri: Option<String>,

    /// contentVersion of the remote template
    #[arg(long, requires = "template_uri")]
    pub template_version: Option<String>,

    /// Azure region (falls back to .azworkshops.toml, then westus)
    #[arg(long, env = "AZWORKSHOPS_LOCATION")]
    pub location: Option<String>,

    /// Template parameter as key=value (repeatable; value parsed as JSON when valid)
    #[arg(long = "param", short = 'p', value_name = "KEY=VALUE")]
    pub params: Vec<String>,

    /// JSON parameters file (flat object or ARM parameters file)
    #[arg(long)]
    pub parameters_file: Option<String>,

    /// Deployment mode: complete or incremental
    #[arg(long, env = "AZWORKSHOPS_MODE")]
    pub mode: Option<String>,

    /// Resource group name prefix
    #[arg(long, env = "AZWORKSHOPS_PREFIX")]
    pub prefix: Option<String>,
}

#[derive(clap::Args)]
pub struct CreateArgs {
    #[command(flatten)]
    pub template: TemplateArgs,

    /// Subscription ID (falls back to .azworkshops.toml, then `az account show`)
    #[arg(long, env = "AZURE_SUBSCRIPTION_ID")]
    pub subscription: Option<String>,

    /// Return once the deployment is submitted
    #[arg(long)]
    pub no_wait: bool,

    /// Give up waiting after this many seconds
    #[arg(long, default_value = "3600")]
    pub timeout: u64,

    /// Seconds between deployment status checks
    #[arg(long, default_value = "5")]
    pub poll_interval: u64,

    /// Hide progress spinners
    #[arg(long, short = 'q')]
    pub quiet: bool,
}

#[derive(clap::Args)]
pub struct PlanArgs {
    #[command(flatten)]
    pub template: TemplateArgs,
}

#[derive(clap::Args)]
pub struct StatusArgs {
    /// Resource group name
    pub resource_group: String,

    /// Deployment name (defaults to the resource group name)
    #[arg(long)]
    pub deployment: Option<String>,

    /// Subscription ID
    #[arg(long, env = "AZURE_SUBSCRIPTION_ID")]
    pub subscription: Option<String>,
}

#[derive(clap::Args)]
pub struct DestroyArgs {
    /// Resource group name
    pub resource_group: String,

    /// Subscription ID
    #[arg(long, env = "AZURE_SUBSCRIPTION_ID")]
    pub subscription: Option<String>,

    /// Skip confirmation prompt
    #[arg(long)]
    pub force: bool,
}
