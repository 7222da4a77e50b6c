#![allow(dead_code)] // Test helpers appear unused when compiled independently

use anyhow::{bail, Result};
use async_trait::async_trait;
use azworkshops::arm::{
    ArmClient, Deployment, DeploymentState, DeploymentStatusProperties, ProvisioningState,
    ResourceGroupParams, ResourceManager,
};
use chrono::{DateTime, TimeZone, Utc};
use std::collections::VecDeque;
use std::sync::Mutex;
use wiremock::MockServer;

pub const SUBSCRIPTION: &str = "00000000-0000-0000-0000-000000000001";
pub const TOKEN: &str = "test-token";

/// Fixed clock: 2026-10-18 12:30:05 UTC
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 18, 12, 30, 5).unwrap()
}

pub const FIXED_TIMESTAMP: &str = "20261018123005";

pub fn deployment_state(state: &str) -> DeploymentState {
    DeploymentState {
        name: "deployment".to_string(),
        properties: DeploymentStatusProperties {
            provisioning_state: ProvisioningState::parse(state),
            error: None,
            outputs: None,
            timestamp: None,
        },
    }
}

/// One observed call against the resource manager
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    GroupExists(String),
    CreateGroup(String, ResourceGroupParams),
    DeleteGroup(String),
    CreateDeployment {
        group: String,
        name: String,
        deployment: Deployment,
    },
    GetDeployment {
        group: String,
        name: String,
    },
}

/// In-memory resource manager that records every call
pub struct RecordingManager {
    calls: Mutex<Vec<Call>>,
    existing: bool,
    fail_group_exists: Option<String>,
    fail_create_group: Option<String>,
    fail_create_deployment: Option<String>,
    submitted_state: String,
    poll_states: Mutex<VecDeque<String>>,
}

impl RecordingManager {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            existing: false,
            fail_group_exists: None,
            fail_create_group: None,
            fail_create_deployment: None,
            submitted_state: "Succeeded".to_string(),
            poll_states: Mutex::new(VecDeque::new()),
        }
    }

    /// Report every group as already present
    pub fn with_existing_group(mut self) -> Self {
        self.existing = true;
        self
    }

    pub fn failing_group_exists(mut self, message: &str) -> Self {
        self.fail_group_exists = Some(message.to_string());
        self
    }

    pub fn failing_create_group(mut self, message: &str) -> Self {
        self.fail_create_group = Some(message.to_string());
        self
    }

    pub fn failing_create_deployment(mut self, message: &str) -> Self {
        self.fail_create_deployment = Some(message.to_string());
        self
    }

    /// State returned by the deployment PUT, then by successive GETs
    pub fn with_states(mut self, submitted: &str, polled: &[&str]) -> Self {
        self.submitted_state = submitted.to_string();
        self.poll_states = Mutex::new(polled.iter().map(|s| s.to_string()).collect());
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl ResourceManager for RecordingManager {
    async fn group_exists(&self, name: &str) -> Result<bool> {
        self.record(Call::GroupExists(name.to_string()));
        match &self.fail_group_exists {
            Some(message) => bail!("{}", message),
            None => Ok(self.existing),
        }
    }

    async fn create_group(&self, name: &str, params: &ResourceGroupParams) -> Result<()> {
        self.record(Call::CreateGroup(name.to_string(), params.clone()));
        match &self.fail_create_group {
            Some(message) => bail!("{}", message),
            None => Ok(()),
        }
    }

    async fn delete_group(&self, name: &str) -> Result<()> {
        self.record(Call::DeleteGroup(name.to_string()));
        Ok(())
    }

    async fn create_deployment(
        &self,
        group: &str,
        name: &str,
        deployment: &Deployment,
    ) -> Result<DeploymentState> {
        self.record(Call::CreateDeployment {
            group: group.to_string(),
            name: name.to_string(),
            deployment: deployment.clone(),
        });
        match &self.fail_create_deployment {
            Some(message) => bail!("{}", message),
            None => Ok(deployment_state(&self.submitted_state)),
        }
    }

    async fn get_deployment(&self, group: &str, name: &str) -> Result<DeploymentState> {
        self.record(Call::GetDeployment {
            group: group.to_string(),
            name: name.to_string(),
        });
        let next = self.poll_states.lock().unwrap().pop_front();
        match next {
            Some(state) => Ok(deployment_state(&state)),
            None => bail!("no more scripted deployment states"),
        }
    }
}

/// ARM client pointed at a mock server
pub fn mock_client(server: &MockServer) -> ArmClient {
    ArmClient::with_base_url(&server.uri(), TOKEN.to_string(), SUBSCRIPTION.to_string()).unwrap()
}

pub fn group_path(group: &str) -> String {
    format!("/subscriptions/{}/resourcegroups/{}", SUBSCRIPTION, group)
}

pub fn deployment_path(group: &str, name: &str) -> String {
    format!(
        "/subscriptions/{}/resourcegroups/{}/providers/Microsoft.Resources/deployments/{}",
        SUBSCRIPTION, group, name
    )
}
