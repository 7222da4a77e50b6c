use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Request body for creating a resource group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceGroupParams {
    pub location: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
}

impl ResourceGroupParams {
    pub fn new(location: &str) -> Self {
        Self {
            location: location.to_string(),
            tags: BTreeMap::new(),
        }
    }
}

/// How ARM reconciles resources already present in the group
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeploymentMode {
    #[default]
    Complete,
    Incremental,
}

impl DeploymentMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeploymentMode::Complete => "Complete",
            DeploymentMode::Incremental => "Incremental",
        }
    }
}

impl fmt::Display for DeploymentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeploymentMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "complete" => Ok(DeploymentMode::Complete),
            "incremental" => Ok(DeploymentMode::Incremental),
            other => anyhow::bail!(
                "Unknown deployment mode '{}'. Available: complete, incremental",
                other
            ),
        }
    }
}

/// Remote template reference
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateLink {
    pub uri: String,
    pub content_version: String,
}

/// A single deployment parameter, wrapped the way ARM expects it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterValue {
    pub value: Value,
}

impl ParameterValue {
    pub fn new(value: impl Into<Value>) -> Self {
        Self {
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentProperties {
    pub mode: DeploymentMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_link: Option<TemplateLink>,
    pub parameters: BTreeMap<String, ParameterValue>,
}

/// Request body for creating a template deployment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deployment {
    pub properties: DeploymentProperties,
}

/// Provisioning state reported by ARM for a deployment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProvisioningState {
    Accepted,
    Running,
    Creating,
    Updating,
    Succeeded,
    Failed,
    Canceled,
    Deleting,
    Other(String),
}

impl ProvisioningState {
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "accepted" => ProvisioningState::Accepted,
            "running" => ProvisioningState::Running,
            "creating" => ProvisioningState::Creating,
            "updating" => ProvisioningState::Updating,
            "succeeded" => ProvisioningState::Succeeded,
            "failed" => ProvisioningState::Failed,
            "canceled" | "cancelled" => ProvisioningState::Canceled,
            "deleting" => ProvisioningState::Deleting,
            _ => ProvisioningState::Other(s.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ProvisioningState::Accepted => "Accepted",
            ProvisioningState::Running => "Running",
            ProvisioningState::Creating => "Creating",
            ProvisioningState::Updating => "Updating",
            ProvisioningState::Succeeded => "Succeeded",
            ProvisioningState::Failed => "Failed",
            ProvisioningState::Canceled => "Canceled",
            ProvisioningState::Deleting => "Deleting",
            ProvisioningState::Other(s) => s,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ProvisioningState::Succeeded | ProvisioningState::Failed | ProvisioningState::Canceled
        )
    }
}

impl fmt::Display for ProvisioningState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ProvisioningState {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ProvisioningState {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(ProvisioningState::parse(&s))
    }
}

/// ARM error detail (`{"code": ..., "message": ..., "details": [...]}`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArmErrorDetail {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<ArmErrorDetail>,
}

impl fmt::Display for ArmErrorDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)?;
        for detail in &self.details {
            write!(f, "; {}", detail)?;
        }
        Ok(())
    }
}

/// Standard ARM error envelope
#[derive(Debug, Deserialize)]
pub(crate) struct ArmErrorResponse {
    pub error: ArmErrorDetail,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentStatusProperties {
    pub provisioning_state: ProvisioningState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ArmErrorDetail>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outputs: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

/// Deployment as returned by the PUT and GET calls (fields we consume)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeploymentState {
    #[serde(default)]
    pub name: String,
    pub properties: DeploymentStatusProperties,
}

impl DeploymentState {
    pub fn provisioning_state(&self) -> &ProvisioningState {
        &self.properties.provisioning_state
    }

    /// Flattened error message, if ARM reported one
    pub fn error_message(&self) -> Option<String> {
        self.properties.error.as_ref().map(|e| e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deployment_serializes_template_link_camel_case() {
        let deployment = Deployment {
            properties: DeploymentProperties {
                mode: DeploymentMode::Complete,
                template: None,
                template_link: Some(TemplateLink {
                    uri: "https://example.com/azuredeploy.json".to_string(),
                    content_version: "1.0.0.0".to_string(),
                }),
                parameters: BTreeMap::from([(
                    "location".to_string(),
                    ParameterValue::new("westus"),
                )]),
            },
        };

        let value = serde_json::to_value(&deployment).unwrap();
        assert_eq!(
            value,
            json!({
                "properties": {
                    "mode": "Complete",
                    "templateLink": {
                        "uri": "https://example.com/azuredeploy.json",
                        "contentVersion": "1.0.0.0"
                    },
                    "parameters": {
                        "location": { "value": "westus" }
                    }
                }
            })
        );
    }

    #[test]
    fn test_resource_group_params_omit_empty_tags() {
        let value = serde_json::to_value(ResourceGroupParams::new("eastus")).unwrap();
        assert_eq!(value, json!({ "location": "eastus" }));
    }

    #[test]
    fn test_provisioning_state_parse_is_case_insensitive() {
        assert_eq!(
            ProvisioningState::parse("succeeded"),
            ProvisioningState::Succeeded
        );
        assert_eq!(ProvisioningState::parse("Failed"), ProvisioningState::Failed);
        assert_eq!(
            ProvisioningState::parse("Cancelled"),
            ProvisioningState::Canceled
        );
        assert_eq!(
            ProvisioningState::parse("Validating"),
            ProvisioningState::Other("Validating".to_string())
        );
    }

    #[test]
    fn test_terminal_states() {
        assert!(ProvisioningState::Succeeded.is_terminal());
        assert!(ProvisioningState::Failed.is_terminal());
        assert!(ProvisioningState::Canceled.is_terminal());
        assert!(!ProvisioningState::Running.is_terminal());
        assert!(!ProvisioningState::Other("Validating".into()).is_terminal());
    }

    #[test]
    fn test_deployment_state_error_message_includes_details() {
        let state: DeploymentState = serde_json::from_value(json!({
            "name": "dep",
            "properties": {
                "provisioningState": "Failed",
                "error": {
                    "code": "DeploymentFailed",
                    "message": "At least one resource deployment operation failed.",
                    "details": [{ "code": "Conflict", "message": "Name taken" }]
                }
            }
        }))
        .unwrap();

        assert_eq!(state.provisioning_state(), &ProvisioningState::Failed);
        let msg = state.error_message().unwrap();
        assert!(msg.starts_with("DeploymentFailed: At least one"));
        assert!(msg.contains("Conflict: Name taken"));
    }

    #[test]
    fn test_deployment_mode_from_str() {
        assert_eq!(
            "incremental".parse::<DeploymentMode>().unwrap(),
            DeploymentMode::Incremental
        );
        assert_eq!(
            "Complete".parse::<DeploymentMode>().unwrap(),
            DeploymentMode::Complete
        );
        assert!("partial".parse::<DeploymentMode>().is_err());
    }
}
