use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::types::{ArmErrorResponse, Deployment, DeploymentState, ResourceGroupParams};
use super::ResourceManager;

pub const MANAGEMENT_ENDPOINT: &str = "https://management.azure.com";
pub const API_VERSION: &str = "2021-04-01";

/// Azure Resource Manager REST client
pub struct ArmClient {
    client: Client,
    base_url: String,
    token: String,
    subscription_id: String,
}

impl ArmClient {
    pub fn new(token: String, subscription_id: String) -> Result<Self> {
        Self::with_base_url(MANAGEMENT_ENDPOINT, token, subscription_id)
    }

    /// Client against a non-default endpoint (sovereign clouds, mock servers)
    pub fn with_base_url(base_url: &str, token: String, subscription_id: String) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("azworkshops/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            subscription_id,
        })
    }

    pub fn subscription_id(&self) -> &str {
        &self.subscription_id
    }

    fn group_url(&self, name: &str) -> String {
        format!(
            "{}/subscriptions/{}/resourcegroups/{}?api-version={}",
            self.base_url,
            urlencoding::encode(&self.subscription_id),
            urlencoding::encode(name),
            API_VERSION
        )
    }

    fn deployment_url(&self, group: &str, name: &str) -> String {
        format!(
            "{}/subscriptions/{}/resourcegroups/{}/providers/Microsoft.Resources/deployments/{}?api-version={}",
            self.base_url,
            urlencoding::encode(&self.subscription_id),
            urlencoding::encode(group),
            urlencoding::encode(name),
            API_VERSION
        )
    }

    /// Decode a successful JSON body or turn the ARM error envelope into an error
    async fn parse<T: DeserializeOwned>(response: Response, what: &str) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            return Err(error_from_response(response, what).await);
        }

        response
            .json()
            .await
            .with_context(|| format!("Failed to parse response for {}", what))
    }

    /// Fetch a deployment, returning `None` when ARM answers 404 `DeploymentNotFound`.
    ///
    /// Any other failure (auth, throttling, a missing resource group) is an error.
    pub async fn find_deployment(
        &self,
        group: &str,
        name: &str,
    ) -> Result<Option<DeploymentState>> {
        let url = self.deployment_url(group, name);
        debug!(resource_group = group, deployment = name, "GET deployment");

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .await
            .with_context(|| format!("GET deployment '{}'", name))?;

        let what = format!("Fetching deployment '{}' in resource group '{}'", name, group);
        if response.status() == StatusCode::NOT_FOUND {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return match serde_json::from_str::<ArmErrorResponse>(&body) {
                Ok(envelope) if envelope.error.code == "DeploymentNotFound" => {
                    debug!(resource_group = group, deployment = name, "deployment not found");
                    Ok(None)
                }
                _ => Err(error_from_body(status, &body, &what)),
            };
        }

        Self::parse(response, &what).await.map(Some)
    }
}

/// Build an error from a non-success response, preferring ARM's `error` envelope
async fn error_from_response(response: Response, what: &str) -> anyhow::Error {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    error_from_body(status, &body, what)
}

fn error_from_body(status: StatusCode, body: &str, what: &str) -> anyhow::Error {
    match serde_json::from_str::<ArmErrorResponse>(body) {
        Ok(envelope) => anyhow::anyhow!("{} failed ({}): {}", what, status, envelope.error),
        Err(_) if body.trim().is_empty() => anyhow::anyhow!("{} failed ({})", what, status),
        Err(_) => anyhow::anyhow!("{} failed ({}): {}", what, status, body.trim()),
    }
}

#[async_trait]
impl ResourceManager for ArmClient {
    async fn group_exists(&self, name: &str) -> Result<bool> {
        let url = self.group_url(name);
        debug!(resource_group = name, "HEAD resource group");

        let response = self
            .client
            .head(&url)
            .bearer_auth(&self.token)
            .send()
            .await
            .with_context(|| format!("Failed to check if resource group '{}' exists", name))?;

        match response.status() {
            StatusCode::NO_CONTENT | StatusCode::OK => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            status => bail!(
                "Failed to check if resource group '{}' exists ({})",
                name,
                status
            ),
        }
    }

    async fn create_group(&self, name: &str, params: &ResourceGroupParams) -> Result<()> {
        let url = self.group_url(name);
        debug!(resource_group = name, location = %params.location, "PUT resource group");

        let response = self
            .client
            .put(&url)
            .bearer_auth(&self.token)
            .json(params)
            .send()
            .await
            .with_context(|| {
                format!(
                    "Failed to create resource group '{}' in region '{}'",
                    name, params.location
                )
            })?;

        if !response.status().is_success() {
            return Err(
                error_from_response(response, &format!("Creating resource group '{}'", name)).await,
            );
        }

        Ok(())
    }

    async fn delete_group(&self, name: &str) -> Result<()> {
        let url = self.group_url(name);
        debug!(resource_group = name, "DELETE resource group");

        let response = self
            .client
            .delete(&url)
            .bearer_auth(&self.token)
            .send()
            .await
            .with_context(|| format!("Failed to delete resource group '{}'", name))?;

        match response.status() {
            StatusCode::OK | StatusCode::ACCEPTED | StatusCode::NO_CONTENT => Ok(()),
            StatusCode::NOT_FOUND => {
                debug!(resource_group = name, "resource group already deleted");
                Ok(())
            }
            _ => Err(error_from_response(
                response,
                &format!("Deleting resource group '{}'", name),
            )
            .await),
        }
    }

    async fn create_deployment(
        &self,
        group: &str,
        name: &str,
        deployment: &Deployment,
    ) -> Result<DeploymentState> {
        let url = self.deployment_url(group, name);
        debug!(
            resource_group = group,
            deployment = name,
            mode = %deployment.properties.mode,
            "PUT deployment"
        );

        let response = self
            .client
            .put(&url)
            .bearer_auth(&self.token)
            .json(deployment)
            .send()
            .await
            .with_context(|| {
                format!(
                    "Failed to submit deployment '{}' to resource group '{}'",
                    name, group
                )
            })?;

        Self::parse(
            response,
            &format!("Deployment '{}' in resource group '{}'", name, group),
        )
        .await
    }

    async fn get_deployment(&self, group: &str, name: &str) -> Result<DeploymentState> {
        self.find_deployment(group, name).await?.with_context(|| {
            format!(
                "Deployment '{}' not found in resource group '{}'",
                name, group
            )
        })
    }
}
