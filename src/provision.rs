//! Resource group provisioning.
//!
//! A run derives a unique group name, refuses to reuse an existing group,
//! creates the group, submits the template deployment (named after the
//! group) and waits for it to finish. Each step runs in order and the
//! first error is returned to the caller unchanged.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::Value;
use std::collections::BTreeMap;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use crate::arm::{
    poll_deployment, Deployment, DeploymentMode, DeploymentProperties, ParameterValue,
    PollConfig, ProgressCallback, ProgressEvent, ResourceGroupParams, ResourceManager, TemplateLink,
};
use crate::naming::{self, DEFAULT_PREFIX};
use crate::params::TemplateParams;

/// Default `contentVersion` for linked templates
pub const DEFAULT_TEMPLATE_VERSION: &str = "1.0.0.0";

#[derive(Debug)]
pub enum ProvisionError {
    GroupExists(String),
    DeploymentFailed {
        deployment: String,
        state: String,
        message: String,
    },
    Timeout {
        deployment: String,
        timeout: Duration,
        last_state: String,
    },
}

impl std::fmt::Display for ProvisionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProvisionError::GroupExists(name) => {
                write!(f, "Resource group '{}' already exists.", name)
            }
            ProvisionError::DeploymentFailed {
                deployment,
                state,
                message,
            } => write!(
                f,
                "Deployment '{}' finished in state {}: {}",
                deployment, state, message
            ),
            ProvisionError::Timeout {
                deployment,
                timeout,
                last_state,
            } => write!(
                f,
                "Timed out waiting for deployment '{}' after {}s (last state: {})",
                deployment,
                timeout.as_secs(),
                last_state
            ),
        }
    }
}

impl std::error::Error for ProvisionError {}

/// Where the deployment template comes from
#[derive(Debug, Clone)]
pub enum TemplateSource {
    /// Local JSON file, sent inline
    File(PathBuf),
    /// Remote template referenced by URI
    Uri { uri: String, version: String },
}

/// Everything needed to provision, computed without touching the API
#[derive(Debug, Clone)]
pub struct Plan {
    pub resource_group: String,
    pub group: ResourceGroupParams,
    pub deployment: Deployment,
}

/// Read and parse a local template file
pub fn load_template(path: impl AsRef<Path>) -> Result<Value> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read template {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Template {} is not valid JSON", path.display()))
}

/// Deployment parameters: `timestamp` and `location`, then the caller's
/// parameters (which may override both)
pub fn deployment_parameters(
    timestamp: &str,
    location: &str,
    template_params: &TemplateParams,
) -> BTreeMap<String, ParameterValue> {
    let mut parameters = BTreeMap::new();
    parameters.insert("timestamp".to_string(), ParameterValue::new(timestamp));
    parameters.insert("location".to_string(), ParameterValue::new(location));

    for (key, value) in template_params {
        parameters.insert(key.clone(), ParameterValue::new(value.clone()));
    }

    parameters
}

/// Compute the group name and payloads for a run without calling the API.
///
/// One timestamp is used for both the group name and the `timestamp`
/// parameter.
pub fn build_plan(
    prefix: &str,
    mode: DeploymentMode,
    now: DateTime<Utc>,
    name: &str,
    location: &str,
    source: &TemplateSource,
    template_params: &TemplateParams,
) -> Result<Plan> {
    let timestamp = naming::timestamp(now);
    let resource_group = naming::resource_group_name(prefix, name, &timestamp);
    naming::validate_resource_group_name(&resource_group)?;

    let (template, template_link) = match source {
        TemplateSource::File(path) => (Some(load_template(path)?), None),
        TemplateSource::Uri { uri, version } => (
            None,
            Some(TemplateLink {
                uri: uri.clone(),
                content_version: version.clone(),
            }),
        ),
    };

    Ok(Plan {
        resource_group,
        group: ResourceGroupParams::new(location),
        deployment: Deployment {
            properties: DeploymentProperties {
                mode,
                template,
                template_link,
                parameters: deployment_parameters(&timestamp, location, template_params),
            },
        },
    })
}

fn spinner_style() -> ProgressStyle {
    ProgressStyle::default_spinner()
        .template("{spinner:.green} {msg} [{elapsed_precise}]")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

/// Clear the spinner when the step fails
async fn step<T>(pb: &ProgressBar, fut: impl Future<Output = Result<T>>) -> Result<T> {
    let result = fut.await;
    if result.is_err() {
        pb.finish_and_clear();
    }
    result
}

/// Creates resource groups and deploys templates into them
pub struct Provisioner<M: ResourceManager> {
    manager: M,
    prefix: String,
    mode: DeploymentMode,
    poll: PollConfig,
    wait: bool,
    show_progress: bool,
    clock: fn() -> DateTime<Utc>,
}

impl<M: ResourceManager> Provisioner<M> {
    pub fn new(manager: M) -> Self {
        Self {
            manager,
            prefix: DEFAULT_PREFIX.to_string(),
            mode: DeploymentMode::default(),
            poll: PollConfig::default(),
            wait: true,
            show_progress: true,
            clock: Utc::now,
        }
    }

    pub fn with_prefix(mut self, prefix: &str) -> Self {
        self.prefix = prefix.to_string();
        self
    }

    pub fn with_mode(mut self, mode: DeploymentMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_poll_config(mut self, poll: PollConfig) -> Self {
        self.poll = poll;
        self
    }

    /// Return once the deployment is submitted instead of waiting for it
    pub fn with_wait(mut self, wait: bool) -> Self {
        self.wait = wait;
        self
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    pub fn manager(&self) -> &M {
        &self.manager
    }

    /// Create a resource group and deploy a local template file into it.
    /// Returns the resource group name.
    pub async fn create(
        &self,
        name: &str,
        location: &str,
        template: impl AsRef<Path>,
        template_params: &TemplateParams,
    ) -> Result<String> {
        let source = TemplateSource::File(template.as_ref().to_path_buf());
        let plan = self.plan(name, location, &source, template_params)?;
        self.provision(plan).await
    }

    /// Create a resource group and deploy a template referenced by URI.
    /// Returns the resource group name.
    pub async fn create_with_uri(
        &self,
        name: &str,
        location: &str,
        template_uri: &str,
        template_version: &str,
        template_params: &TemplateParams,
    ) -> Result<String> {
        let source = TemplateSource::Uri {
            uri: template_uri.to_string(),
            version: template_version.to_string(),
        };
        let plan = self.plan(name, location, &source, template_params)?;
        self.provision(plan).await
    }

    /// Compute the group name and payloads for a run
    pub fn plan(
        &self,
        name: &str,
        location: &str,
        source: &TemplateSource,
        template_params: &TemplateParams,
    ) -> Result<Plan> {
        build_plan(
            &self.prefix,
            self.mode,
            (self.clock)(),
            name,
            location,
            source,
            template_params,
        )
    }

    fn spinner(&self, message: String) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new_spinner();
        pb.set_style(spinner_style());
        pb.set_message(message);
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    }

    async fn provision(&self, plan: Plan) -> Result<String> {
        let name = plan.resource_group;

        let pb = self.spinner(format!(
            "Creating resource group '{}'...",
            name.as_str().yellow()
        ));

        let exists = step(&pb, self.manager.group_exists(&name)).await?;
        if exists {
            pb.finish_and_clear();
            return Err(ProvisionError::GroupExists(name).into());
        }

        info!(resource_group = %name, location = %plan.group.location, "creating resource group");
        step(&pb, self.manager.create_group(&name, &plan.group)).await?;
        pb.finish_with_message(format!("✓ Created resource group '{}'", name.as_str().yellow()));

        let pb = self.spinner("Deploying resources (this may take some time)...".to_string());

        info!(resource_group = %name, mode = %plan.deployment.properties.mode, "submitting deployment");
        let submitted = step(
            &pb,
            self.manager.create_deployment(&name, &name, &plan.deployment),
        )
        .await?;

        // A terminal PUT state still goes through poll_deployment, which maps it without a GET
        if !self.wait && !submitted.provisioning_state().is_terminal() {
            pb.finish_with_message(format!(
                "Deployment submitted ({})",
                submitted.provisioning_state()
            ));
            return Ok(name);
        }

        let pb_clone = pb.clone();
        let on_progress: ProgressCallback = Box::new(move |event: ProgressEvent| {
            if let ProgressEvent::Polling { state, .. } = event {
                pb_clone.set_message(format!(
                    "Deploying resources (this may take some time)... {}",
                    state
                ));
            }
        });

        step(
            &pb,
            poll_deployment(
                &self.manager,
                &name,
                &name,
                submitted,
                &self.poll,
                Some(on_progress),
            ),
        )
        .await?;

        pb.finish_with_message("✓ Deployment succeeded");
        info!(resource_group = %name, "deployment succeeded");

        Ok(name)
    }
}
