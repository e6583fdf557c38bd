use anyhow::{Context, Result};
use serde_json::{json, Value};
use std::path::Path;

/// Fixed prefix of every deployment name created by this tool
pub const DEPLOYMENT_PREFIX: &str = "logic_app_deploy";

const TEMPLATE_SCHEMA: &str =
    "https://schema.management.azure.com/schemas/2019-04-01/deploymentTemplate.json#";
const WORKFLOW_TYPE: &str = "Microsoft.Logic/workflows";
const WORKFLOW_API_VERSION: &str = "2017-07-01";

// ARM limit on deployment names
const MAX_DEPLOYMENT_NAME: usize = 64;

/// How deployment names are derived. Both schemes include the target, so names are
/// distinct within one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeploymentNaming {
    /// `<prefix>_<version>_<target>`: stable across runs of the same version, so a rerun can
    /// collide with a deployment still running from an earlier invocation.
    Versioned,
    /// `<prefix>_<version>_<target>_<timestamp>`
    Unique { timestamp: String },
}

impl DeploymentNaming {
    pub fn unique_now() -> Self {
        DeploymentNaming::Unique {
            timestamp: chrono::Utc::now().format("%Y%m%d%H%M%S").to_string(),
        }
    }

    pub fn deployment_name(&self, target: &str) -> String {
        let base = format!("{}_{}", DEPLOYMENT_PREFIX, env!("CARGO_PKG_VERSION"));
        let suffix = match self {
            DeploymentNaming::Versioned => String::new(),
            DeploymentNaming::Unique { timestamp } => format!("_{}", timestamp),
        };

        let room = MAX_DEPLOYMENT_NAME.saturating_sub(base.len() + 1 + suffix.len());
        let target: String = target
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || "-_.()".contains(c) {
                    c
                } else {
                    '-'
                }
            })
            .take(room)
            .collect();
        format!("{}_{}{}", base, target, suffix)
    }
}

/// Read a workflow definition from disk
pub fn load_template(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read template {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Template {} is not valid JSON", path.display()))
}

/// Wrap a workflow definition in an ARM deployment template targeting one Logic App
pub fn build_envelope(logic_app: &str, location: &str, template: Value) -> Value {
    json!({
        "$schema": TEMPLATE_SCHEMA,
        "contentVersion": "1.0.0.0",
        "parameters": {},
        "variables": {},
        "resources": [
            {
                "type": WORKFLOW_TYPE,
                "apiVersion": WORKFLOW_API_VERSION,
                "name": logic_app,
                "location": location,
                "properties": template
            }
        ]
    })
}
