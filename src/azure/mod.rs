//! Azure control-plane capabilities consumed by the deployers.
//!
//! The deployers only see the [`WebApps`], [`Resources`] and [`DeploymentHandle`] traits.
//! [`ArmClient`] implements them over the ARM REST API; tests swap in doubles.

pub mod auth;
mod client;
mod resources;
mod web;

use async_trait::async_trait;
use bytes::Bytes;
use serde::Deserialize;
use std::time::Duration;

use crate::error::ApiError;

pub use auth::{AccessToken, ClientSecretCredential, AUTHORITY_HOST};
pub use client::{ArmClient, MANAGEMENT_ENDPOINT};
pub use resources::ArmDeployment;

/// Interval between status reads while waiting on a deployment
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Coarse deployment state as seen by the polling loops
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeploymentStatus {
    Running,
    Succeeded,
    Failed,
}

impl DeploymentStatus {
    /// Map an ARM `provisioningState` onto the tri-state.
    ///
    /// `Canceled` is terminal without success, so it counts as failed. Everything that is not
    /// terminal (`Accepted`, `Running`, `Creating`, ...) is still running.
    pub fn from_provisioning_state(state: &str) -> Self {
        match state {
            "Succeeded" => DeploymentStatus::Succeeded,
            "Failed" | "Canceled" => DeploymentStatus::Failed,
            _ => DeploymentStatus::Running,
        }
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, DeploymentStatus::Running)
    }
}

/// A resource returned by a resource-group listing
#[derive(Debug, Clone, Deserialize)]
pub struct GenericResource {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

/// Function App operations
#[async_trait]
pub trait WebApps: Send + Sync {
    /// Download the publish-profile XML (with secrets) as received, chunk by chunk.
    async fn publishing_profile_xml(
        &self,
        resource_group: &str,
        name: &str,
    ) -> Result<Vec<Bytes>, ApiError>;

    async fn sync_function_triggers(&self, resource_group: &str, name: &str)
        -> Result<(), ApiError>;
}

/// Resource-group level operations
#[async_trait]
pub trait Resources: Send + Sync {
    /// List resources in the group whose name equals `name`
    async fn list_by_name(
        &self,
        resource_group: &str,
        name: &str,
    ) -> Result<Vec<GenericResource>, ApiError>;

    /// Submit an incremental deployment of `template` and return without waiting for it.
    async fn begin_deployment(
        &self,
        resource_group: &str,
        deployment_name: &str,
        template: &serde_json::Value,
    ) -> Result<Box<dyn DeploymentHandle>, ApiError>;
}

/// Pollable reference to an in-flight deployment
#[async_trait]
pub trait DeploymentHandle: Send + Sync {
    async fn status(&self) -> Result<DeploymentStatus, ApiError>;

    fn poll_interval(&self) -> Duration {
        DEFAULT_POLL_INTERVAL
    }

    /// Block until the deployment is terminal. Never returns `Running`.
    async fn wait(&self) -> Result<DeploymentStatus, ApiError> {
        loop {
            let status = self.status().await?;
            if status.is_terminal() {
                return Ok(status);
            }
            tokio::time::sleep(self.poll_interval()).await;
        }
    }
}
