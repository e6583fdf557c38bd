use anyhow::{Context, Result};
use std::time::Duration;

use crate::azure::{DeploymentHandle, DeploymentStatus};
use crate::error::DeployError;

/// Deployments still being tracked, in submission order
pub struct Worklist {
    entries: Vec<(String, Box<dyn DeploymentHandle>)>,
    total: usize,
}

impl Worklist {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            total: 0,
        }
    }

    pub fn push(&mut self, name: impl Into<String>, handle: Box<dyn DeploymentHandle>) {
        self.entries.push((name.into(), handle));
        self.total += 1;
    }

    /// Deployments not yet observed as succeeded
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn completed(&self) -> usize {
        self.total - self.entries.len()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }
}

impl Default for Worklist {
    fn default() -> Self {
        Self::new()
    }
}

/// Wait for one deployment to finish and report the outcome
pub async fn wait_single(name: &str, handle: &dyn DeploymentHandle) -> Result<()> {
    let status = handle
        .wait()
        .await
        .with_context(|| format!("Failed to read status of deployment for '{}'", name))?;

    match status {
        DeploymentStatus::Succeeded => {
            eprintln!("Deployment success | Name: {}", name);
            Ok(())
        }
        DeploymentStatus::Failed => Err(DeployError::DeploymentFailed {
            name: name.to_string(),
        }
        .into()),
        DeploymentStatus::Running => {
            anyhow::bail!("Deployment for '{}' stopped waiting while still running", name)
        }
    }
}

/// Sweep the worklist until every deployment has succeeded.
///
/// Succeeded entries are reported and dropped as they are seen. The first failure ends the
/// loop with an error and leaves the remaining deployments running remotely. Returns the
/// names in completion order.
pub async fn poll_all(worklist: &mut Worklist, interval: Duration) -> Result<Vec<String>> {
    let mut completed = Vec::with_capacity(worklist.len());

    while !worklist.is_empty() {
        let mut i = 0;
        while i < worklist.entries.len() {
            let (name, handle) = &worklist.entries[i];
            let status = handle
                .status()
                .await
                .with_context(|| format!("Failed to read status of deployment for '{}'", name))?;

            match status {
                DeploymentStatus::Succeeded => {
                    let (name, _) = worklist.entries.remove(i);
                    eprintln!("Deployment success | Name: {}", name);
                    completed.push(name);
                }
                DeploymentStatus::Failed => {
                    return Err(DeployError::DeploymentFailed { name: name.clone() }.into());
                }
                DeploymentStatus::Running => i += 1,
            }
        }

        eprintln!(
            "Deployments still running | Status: [{}/{}]",
            worklist.completed(),
            worklist.total()
        );
        tracing::debug!(pending = ?worklist.names().collect::<Vec<_>>(), "sweep finished");

        if worklist.is_empty() {
            break;
        }
        tokio::time::sleep(interval).await;
    }

    Ok(completed)
}
