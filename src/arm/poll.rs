//! Deployment polling.
//!
//! ARM accepts a deployment PUT immediately and reconciles in the
//! background. The provisioner polls the deployment until it reaches a
//! terminal provisioning state, reporting each observation through an
//! optional callback so the CLI can drive a spinner.

use anyhow::Result;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

use super::types::{DeploymentState, ProvisioningState};
use super::ResourceManager;
use crate::provision::ProvisionError;

/// Progress events emitted while waiting on a deployment
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    Started { deployment: String },
    Polling {
        deployment: String,
        state: ProvisioningState,
        elapsed: Duration,
    },
    Completed { deployment: String },
    Failed { deployment: String, error: String },
}

/// Callback type for progress updates
pub type ProgressCallback = Box<dyn Fn(ProgressEvent) + Send + Sync>;

#[derive(Clone, Debug)]
pub struct PollConfig {
    pub interval: Duration,
    pub timeout: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            timeout: Duration::from_secs(60 * 60),
        }
    }
}

fn emit(callback: &Option<ProgressCallback>, event: ProgressEvent) {
    if let Some(cb) = callback {
        cb(event);
    }
}

/// Turn a terminal state into the caller's result
fn finish(
    state: DeploymentState,
    name: &str,
    on_progress: &Option<ProgressCallback>,
) -> Result<DeploymentState> {
    match state.provisioning_state() {
        ProvisioningState::Succeeded => {
            emit(
                on_progress,
                ProgressEvent::Completed {
                    deployment: name.to_string(),
                },
            );
            Ok(state)
        }
        other => {
            let error = state
                .error_message()
                .unwrap_or_else(|| format!("Deployment finished with state: {}", other));
            emit(
                on_progress,
                ProgressEvent::Failed {
                    deployment: name.to_string(),
                    error: error.clone(),
                },
            );
            Err(ProvisionError::DeploymentFailed {
                deployment: name.to_string(),
                state: other.to_string(),
                message: error,
            }
            .into())
        }
    }
}

/// Poll a deployment until it reaches a terminal state.
///
/// `config.timeout` bounds the whole wait, including a GET that never
/// answers.
///
/// `initial` is the state returned by the submitting PUT; when it is
/// already terminal no GET is issued.
pub async fn poll_deployment(
    manager: &dyn ResourceManager,
    group: &str,
    name: &str,
    initial: DeploymentState,
    config: &PollConfig,
    on_progress: Option<ProgressCallback>,
) -> Result<DeploymentState> {
    let start = Instant::now();

    emit(
        &on_progress,
        ProgressEvent::Started {
            deployment: name.to_string(),
        },
    );

    let mut state = initial;
    loop {
        let elapsed = start.elapsed();
        let current = state.provisioning_state().clone();
        debug!(
            deployment = name,
            state = %current,
            elapsed_secs = elapsed.as_secs(),
            "deployment state"
        );

        emit(
            &on_progress,
            ProgressEvent::Polling {
                deployment: name.to_string(),
                state: current.clone(),
                elapsed,
            },
        );

        if current.is_terminal() {
            return finish(state, name, &on_progress);
        }

        let remaining = config.timeout.saturating_sub(elapsed);
        if remaining.is_zero() {
            return Err(timed_out(name, config, &current, &on_progress));
        }

        tokio::time::sleep(config.interval.min(remaining)).await;

        let remaining = config.timeout.saturating_sub(start.elapsed());
        state = match tokio::time::timeout(remaining, manager.get_deployment(group, name)).await
        {
            Ok(result) => result?,
            Err(_) => {
                debug!(deployment = name, "deployment GET outlived the timeout");
                return Err(timed_out(name, config, &current, &on_progress));
            }
        };
    }
}

fn timed_out(
    name: &str,
    config: &PollConfig,
    last_state: &ProvisioningState,
    on_progress: &Option<ProgressCallback>,
) -> anyhow::Error {
    emit(
        on_progress,
        ProgressEvent::Failed {
            deployment: name.to_string(),
            error: format!("Timed out after {}s", config.timeout.as_secs()),
        },
    );
    ProvisionError::Timeout {
        deployment: name.to_string(),
        timeout: config.timeout,
        last_state: last_state.to_string(),
    }
    .into()
}
