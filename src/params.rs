//! Template parameters supplied on the command line or in a parameters file.

use anyhow::{bail, Context, Result};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::Path;

/// Caller-supplied template parameters, before ARM `{ "value": ... }` wrapping
pub type TemplateParams = BTreeMap<String, Value>;

/// Parse a `key=value` pair. The value is read as JSON when it parses,
/// otherwise kept as a plain string.
pub fn parse_param(raw: &str) -> Result<(String, Value)> {
    let (key, value) = raw
        .split_once('=')
        .with_context(|| format!("Invalid parameter '{}': expected key=value", raw))?;

    let key = key.trim();
    if key.is_empty() {
        bail!("Invalid parameter '{}': empty key", raw);
    }

    let value = serde_json::from_str::<Value>(value)
        .unwrap_or_else(|_| Value::String(value.to_string()));

    Ok((key.to_string(), value))
}

/// Load parameters from a JSON file.
///
/// Accepts a flat object (`{"adminUser": "lab"}`) or an ARM parameters file
/// (`{"parameters": {"adminUser": {"value": "lab"}}}`).
pub fn load_parameters_file(path: impl AsRef<Path>) -> Result<TemplateParams> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read parameters file {}", path.display()))?;
    let value: Value = serde_json::from_str(&content)
        .with_context(|| format!("Invalid JSON in parameters file {}", path.display()))?;

    parameters_from_value(value)
        .with_context(|| format!("Invalid parameters file {}", path.display()))
}

fn parameters_from_value(value: Value) -> Result<TemplateParams> {
    let Value::Object(mut root) = value else {
        bail!("expected a JSON object");
    };

    if !is_arm_parameters_file(&root)? {
        return Ok(root.into_iter().collect());
    }

    match root.remove("parameters") {
        Some(Value::Object(wrapped)) => unwrap_arm_parameters(wrapped),
        Some(_) => bail!("'parameters' must be an object"),
        None => Ok(TemplateParams::new()),
    }
}

/// ARM parameters files carry a `$schema`, or wrap every entry in `value`/`reference`.
/// A `parameters` object that wraps only some of its entries is ambiguous and rejected.
fn is_arm_parameters_file(root: &Map<String, Value>) -> Result<bool> {
    if root.contains_key("$schema") {
        return Ok(true);
    }

    let Some(Value::Object(entries)) = root.get("parameters") else {
        return Ok(false);
    };

    let wrapped = entries.values().filter(|entry| is_wrapped(entry)).count();

    if wrapped == 0 {
        Ok(false)
    } else if wrapped == entries.len() {
        Ok(true)
    } else {
        let plain: Vec<&str> = entries
            .iter()
            .filter(|(_, entry)| !is_wrapped(entry))
            .map(|(key, _)| key.as_str())
            .collect();
        bail!(
            "'parameters' mixes wrapped entries ({{\"value\": ...}}) with plain ones: {}",
            plain.join(", ")
        )
    }
}

fn is_wrapped(entry: &Value) -> bool {
    matches!(entry, Value::Object(obj) if obj.contains_key("value") || obj.contains_key("reference"))
}

fn unwrap_arm_parameters(wrapped: Map<String, Value>) -> Result<TemplateParams> {
    let mut params = TemplateParams::new();
    for (key, entry) in wrapped {
        match entry {
            Value::Object(mut obj) if obj.contains_key("value") => {
                let value = obj.remove("value").unwrap_or(Value::Null);
                params.insert(key, value);
            }
            Value::Object(obj) if obj.contains_key("reference") => {
                bail!("parameter '{}': Key Vault references are not supported", key);
            }
            _ => bail!("parameter '{}': expected an object with a 'value' field", key),
        }
    }
    Ok(params)
}

/// Merge file parameters with command-line parameters; the latter win
pub fn merge(
    file: TemplateParams,
    cli: impl IntoIterator<Item = (String, Value)>,
) -> TemplateParams {
    let mut merged = file;
    merged.extend(cli);
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_param_string() {
        let (k, v) = parse_param("adminUser=labadmin").unwrap();
        assert_eq!(k, "adminUser");
        assert_eq!(v, json!("labadmin"));
    }

    #[test]
    fn test_parse_param_json_values() {
        assert_eq!(parse_param("count=3").unwrap().1, json!(3));
        assert_eq!(parse_param("enabled=true").unwrap().1, json!(true));
        assert_eq!(
            parse_param(r#"tags={"owner":"lab"}"#).unwrap().1,
            json!({"owner": "lab"})
        );
        assert_eq!(parse_param(r#"name="007""#).unwrap().1, json!("007"));
    }

    #[test]
    fn test_parse_param_keeps_everything_after_first_equals() {
        let (k, v) = parse_param("conn=a=b").unwrap();
        assert_eq!(k, "conn");
        assert_eq!(v, json!("a=b"));
    }

    #[test]
    fn test_parse_param_empty_value() {
        assert_eq!(parse_param("suffix=").unwrap().1, json!(""));
    }

    #[test]
    fn test_parse_param_rejects_malformed() {
        assert!(parse_param("novalue").is_err());
        assert!(parse_param("=value").is_err());
    }

    #[test]
    fn test_flat_parameters_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"adminUser": "lab", "nodeCount": 2}}"#).unwrap();

        let params = load_parameters_file(file.path()).unwrap();
        assert_eq!(params.get("adminUser"), Some(&json!("lab")));
        assert_eq!(params.get("nodeCount"), Some(&json!(2)));
    }

    #[test]
    fn test_arm_parameters_file_is_unwrapped() {
        let value = json!({
            "$schema": "https://schema.management.azure.com/schemas/2019-04-01/deploymentParameters.json#",
            "contentVersion": "1.0.0.0",
            "parameters": {
                "adminUser": { "value": "lab" },
                "sizes": { "value": ["small", "large"] }
            }
        });

        let params = parameters_from_value(value).unwrap();
        assert_eq!(params.len(), 2);
        assert_eq!(params.get("sizes"), Some(&json!(["small", "large"])));
    }

    #[test]
    fn test_key_vault_reference_rejected() {
        let value = json!({
            "parameters": {
                "password": { "reference": { "keyVault": { "id": "x" }, "secretName": "pw" } }
            }
        });

        let err = parameters_from_value(value).unwrap_err();
        assert!(err.to_string().contains("Key Vault"));
    }

    #[test]
    fn test_flat_file_with_parameters_key_stays_flat() {
        let value = json!({ "parameters": "not-wrapped", "region": "eastus" });

        let params = parameters_from_value(value).unwrap();
        assert_eq!(params.get("parameters"), Some(&json!("not-wrapped")));
        assert_eq!(params.get("region"), Some(&json!("eastus")));
    }

    #[test]
    fn test_mixed_wrapped_and_plain_parameters_rejected() {
        let value = json!({
            "parameters": {
                "adminUser": { "value": "lab" },
                "nodeCount": 2
            }
        });

        let err = parameters_from_value(value).unwrap_err();
        assert!(err.to_string().contains("nodeCount"));
    }

    #[test]
    fn test_wrapped_parameters_without_schema() {
        let value = json!({
            "contentVersion": "1.0.0.0",
            "parameters": { "adminUser": { "value": "lab" } }
        });

        let params = parameters_from_value(value).unwrap();
        assert_eq!(params.len(), 1);
        assert_eq!(params.get("adminUser"), Some(&json!("lab")));
    }

    #[test]
    fn test_non_object_file_rejected() {
        assert!(parameters_from_value(json!([1, 2])).is_err());
    }

    #[test]
    fn test_merge_cli_overrides_file() {
        let file = TemplateParams::from([
            ("a".to_string(), json!(1)),
            ("b".to_string(), json!(2)),
        ]);
        let merged = merge(file, vec![("b".to_string(), json!("cli"))]);
        assert_eq!(merged.get("a"), Some(&json!(1)));
        assert_eq!(merged.get("b"), Some(&json!("cli")));
    }
}
