use anyhow::{bail, Result};
use chrono::{DateTime, Utc};

/// Default prefix for generated resource group names
pub const DEFAULT_PREFIX: &str = "azworkshops";

const MAX_RESOURCE_GROUP_LEN: usize = 90;

/// Timestamp used in group names and the `timestamp` template parameter
pub fn timestamp(now: DateTime<Utc>) -> String {
    now.format("%Y%m%d%H%M%S").to_string()
}

pub fn resource_group_name(prefix: &str, name: &str, timestamp: &str) -> String {
    format!("{}_{}_{}", prefix, name, timestamp)
}

/// Validate against ARM's resource group naming rules
pub fn validate_resource_group_name(name: &str) -> Result<()> {
    if name.is_empty() {
        bail!("Resource group name must not be empty");
    }

    let len = name.chars().count();
    if len > MAX_RESOURCE_GROUP_LEN {
        bail!(
            "Resource group name '{}' is too long ({} chars, max {})\n\
            Use a shorter workshop name or prefix.",
            name,
            len,
            MAX_RESOURCE_GROUP_LEN
        );
    }

    if let Some(bad) = name
        .chars()
        .find(|c| !(c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | '(' | ')')))
    {
        bail!(
            "Resource group name '{}' contains invalid character '{}'\n\
            Allowed: letters, digits, '_', '-', '.', '(' and ')'",
            name,
            bad
        );
    }

    if name.ends_with('.') {
        bail!("Resource group name '{}' must not end with '.'", name);
    }

    Ok(())
}
