use anyhow::{bail, Context, Result};
use std::collections::HashMap;
use std::time::Duration;

use super::poll::{poll_all, wait_single, Worklist};
use super::targets::LogicAppTarget;
use super::template::{build_envelope, load_template, DeploymentNaming};
use crate::azure::{DeploymentHandle, Resources};
use crate::error::DeployError;

/// Deploys workflow templates into existing Logic Apps of one resource group
pub struct LogicAppDeployer<'a> {
    resources: &'a dyn Resources,
    resource_group: String,
    naming: DeploymentNaming,
}

impl<'a> LogicAppDeployer<'a> {
    pub fn new(resources: &'a dyn Resources, resource_group: &str, naming: DeploymentNaming) -> Self {
        Self {
            resources,
            resource_group: resource_group.to_string(),
            naming,
        }
    }

    /// Location of the existing Logic App named `name`
    pub async fn discover_location(&self, name: &str) -> Result<String> {
        let matches = self
            .resources
            .list_by_name(&self.resource_group, name)
            .await
            .with_context(|| format!("Failed to look up Logic App '{}'", name))?;

        let Some(resource) = matches.into_iter().next() else {
            return Err(DeployError::ResourceNotFound {
                name: name.to_string(),
                resource_group: self.resource_group.clone(),
            }
            .into());
        };

        resource
            .location
            .filter(|l| !l.is_empty())
            .with_context(|| format!("Logic App '{}' has no location", name))
    }

    /// Submit the deployment for one target and return its handle without waiting
    pub async fn submit(&self, target: &LogicAppTarget) -> Result<Box<dyn DeploymentHandle>> {
        eprintln!("Deployment started | Name: {}", target.name);

        let location = self.discover_location(&target.name).await?;
        let template = load_template(&target.template_path)?;
        let envelope = build_envelope(&target.name, &location, template);
        let deployment_name = self.naming.deployment_name(&target.name);

        tracing::info!(
            logic_app = %target.name,
            %location,
            deployment = %deployment_name,
            "submitting deployment"
        );

        self.resources
            .begin_deployment(&self.resource_group, &deployment_name, &envelope)
            .await
            .with_context(|| format!("Failed to submit deployment for '{}'", target.name))
    }

    /// Deploy one template and block until it finishes
    pub async fn deploy_single(&self, target: &LogicAppTarget) -> Result<()> {
        let handle = self.submit(target).await?;
        wait_single(&target.name, handle.as_ref()).await
    }

    /// Submit every target, then poll them together until all succeed or one fails
    pub async fn deploy_multiple(
        &self,
        targets: &[LogicAppTarget],
        interval: Duration,
    ) -> Result<Vec<String>> {
        // Sanitizing and truncation can map two targets onto one deployment name
        let mut names: HashMap<String, &str> = HashMap::new();
        for target in targets {
            let deployment_name = self.naming.deployment_name(&target.name);
            if let Some(first) = names.insert(deployment_name.clone(), &target.name) {
                bail!(
                    "Logic Apps '{}' and '{}' map to the same deployment name '{}'",
                    first,
                    target.name,
                    deployment_name
                );
            }
        }

        let mut worklist = Worklist::new();
        for target in targets {
            let handle = self.submit(target).await?;
            worklist.push(target.name.clone(), handle);
        }
        poll_all(&mut worklist, interval).await
    }
}
