// src/arm/mod.rs
//! Azure Resource Manager plumbing: payload types, the REST client,
//! credential discovery and deployment polling.

mod client;
mod credentials;
mod poll;
mod types;

use anyhow::Result;
use async_trait::async_trait;

pub use client::{ArmClient, API_VERSION, MANAGEMENT_ENDPOINT};
pub use credentials::{resolve_credentials, AccountCli, Credentials};
pub use poll::{poll_deployment, PollConfig, ProgressCallback, ProgressEvent};
pub use types::{
    ArmErrorDetail, Deployment, DeploymentMode, DeploymentProperties, DeploymentState,
    DeploymentStatusProperties, ParameterValue, ProvisioningState, ResourceGroupParams,
    TemplateLink,
};

/// Resource group and deployment operations used by the provisioner.
///
/// `ArmClient` talks to the real API; tests substitute an in-memory
/// implementation to observe call order and payloads.
#[async_trait]
pub trait ResourceManager: Send + Sync {
    /// Check if resource group exists
    async fn group_exists(&self, name: &str) -> Result<bool>;

    /// Create (or update) resource group
    async fn create_group(&self, name: &str, params: &ResourceGroupParams) -> Result<()>;

    /// Delete resource group. A group that is already gone is not an error.
    async fn delete_group(&self, name: &str) -> Result<()>;

    /// Submit a template deployment into a resource group
    async fn create_deployment(
        &self,
        group: &str,
        name: &str,
        deployment: &Deployment,
    ) -> Result<DeploymentState>;

    /// Fetch the current state of a deployment
    async fn get_deployment(&self, group: &str, name: &str) -> Result<DeploymentState>;
}
