use anyhow::{bail, Context, Result};
use std::env;
use std::process::Command;

const MANAGEMENT_RESOURCE: &str = "https://management.azure.com/";

/// Resolved ARM credentials
pub struct Credentials {
    pub token: String,
    pub subscription_id: String,
}

/// Execute az CLI command and return stdout
fn run_az(args: &[&str]) -> Result<String> {
    let output = Command::new("az")
        .args(args)
        .output()
        .context("Failed to execute az command. Is Azure CLI installed?")?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!("az command failed: {}", stderr.trim());
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Account operations (subscription and token) via the Azure CLI login
pub struct AccountCli;

impl AccountCli {
    pub fn new() -> Self {
        Self
    }

    /// Get current subscription ID
    pub fn get_subscription_id(&self) -> Result<String> {
        run_az(&["account", "show", "--query", "id", "-o", "tsv"])
            .context("Failed to get subscription ID. Run 'az login' first.")
    }

    /// Get a bearer token for the management endpoint
    pub fn get_access_token(&self) -> Result<String> {
        run_az(&[
            "account",
            "get-access-token",
            "--resource",
            MANAGEMENT_RESOURCE,
            "--query",
            "accessToken",
            "-o",
            "tsv",
        ])
        .context("Failed to get an access token. Run 'az login' first.")
    }
}

impl Default for AccountCli {
    fn default() -> Self {
        Self::new()
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Pick the subscription from the first source that has one
fn pick_subscription(
    subscription_arg: Option<String>,
    env_value: Option<String>,
    configured: Option<String>,
) -> Option<String> {
    subscription_arg.or(env_value).or(configured)
}

/// Resolve token and subscription.
///
/// Token: `AZURE_ACCESS_TOKEN`, else `az account get-access-token`.
/// Subscription: argument, `AZURE_SUBSCRIPTION_ID`, config, then `az account show`.
pub fn resolve_credentials(
    subscription_arg: Option<String>,
    configured_subscription: Option<String>,
) -> Result<Credentials> {
    let account = AccountCli::new();

    let token = match non_empty_env("AZURE_ACCESS_TOKEN") {
        Some(token) => token,
        None => account.get_access_token()?,
    };

    let subscription_id = match pick_subscription(
        subscription_arg,
        non_empty_env("AZURE_SUBSCRIPTION_ID"),
        configured_subscription,
    ) {
        Some(id) => id,
        None => account.get_subscription_id()?,
    };

    if token.is_empty() {
        bail!("Empty access token. Run 'az login' or set AZURE_ACCESS_TOKEN");
    }

    Ok(Credentials {
        token,
        subscription_id,
    })
}
