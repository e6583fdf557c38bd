use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use super::{ArmClient, DeploymentHandle, DeploymentStatus, GenericResource, Resources};
use crate::error::ApiError;

const RESOURCES_API_VERSION: &str = "2021-04-01";

#[derive(Deserialize)]
struct ResourceList {
    #[serde(default)]
    value: Vec<GenericResource>,
    #[serde(rename = "nextLink", default)]
    next_link: Option<String>,
}

#[derive(Deserialize)]
struct DeploymentExtended {
    #[serde(default)]
    properties: Option<DeploymentProperties>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeploymentProperties {
    #[serde(default)]
    provisioning_state: Option<String>,
}

impl DeploymentExtended {
    fn status(&self) -> DeploymentStatus {
        self.properties
            .as_ref()
            .and_then(|p| p.provisioning_state.as_deref())
            .map(DeploymentStatus::from_provisioning_state)
            .unwrap_or(DeploymentStatus::Running)
    }
}

/// OData filter matching a resource by exact name
pub(crate) fn name_filter(name: &str) -> String {
    format!("name eq '{}'", name.replace('\'', "''"))
}

impl ArmClient {
    fn deployment_url(&self, resource_group: &str, deployment_name: &str) -> String {
        self.url(&format!(
            "{}/providers/Microsoft.Resources/deployments/{}?api-version={}",
            Self::group_path(resource_group),
            urlencoding::encode(deployment_name),
            RESOURCES_API_VERSION
        ))
    }
}

#[async_trait]
impl Resources for ArmClient {
    async fn list_by_name(
        &self,
        resource_group: &str,
        name: &str,
    ) -> Result<Vec<GenericResource>, ApiError> {
        let mut url = self.url(&format!(
            "{}/resources?$filter={}&api-version={}",
            Self::group_path(resource_group),
            urlencoding::encode(&name_filter(name)),
            RESOURCES_API_VERSION
        ));

        let mut resources = Vec::new();
        loop {
            let page: ResourceList = self.get_json(&url).await?;
            resources.extend(page.value);
            match page.next_link {
                Some(next) if !next.is_empty() => url = next,
                _ => break,
            }
        }
        Ok(resources)
    }

    async fn begin_deployment(
        &self,
        resource_group: &str,
        deployment_name: &str,
        template: &serde_json::Value,
    ) -> Result<Box<dyn DeploymentHandle>, ApiError> {
        let url = self.deployment_url(resource_group, deployment_name);
        let body = serde_json::json!({
            "properties": {
                "mode": "Incremental",
                "template": template,
            }
        });

        let accepted: DeploymentExtended = self.put_json(&url, &body).await?;
        tracing::info!(
            deployment = deployment_name,
            resource_group,
            status = ?accepted.status(),
            "deployment submitted"
        );

        Ok(Box::new(ArmDeployment {
            client: self.clone(),
            url,
            name: deployment_name.to_string(),
        }))
    }
}

/// Handle to an ARM deployment submitted by [`ArmClient`]
pub struct ArmDeployment {
    client: ArmClient,
    url: String,
    name: String,
}

#[async_trait]
impl DeploymentHandle for ArmDeployment {
    async fn status(&self) -> Result<DeploymentStatus, ApiError> {
        let deployment: DeploymentExtended = self.client.get_json(&self.url).await?;
        let status = deployment.status();
        tracing::debug!(deployment = %self.name, ?status, "status read");
        Ok(status)
    }

    fn poll_interval(&self) -> Duration {
        self.client.poll_interval()
    }
}
