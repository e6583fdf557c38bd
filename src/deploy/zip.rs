use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use std::path::Path;

use super::profile::PublishProfile;
use crate::error::DeployError;

/// Build a Basic `Authorization` header value
pub fn basic_auth_header(user: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{}:{}", user, password)))
}

/// Pushes ZIP artifacts to the Kudu `zipdeploy` endpoint of a publish profile
pub struct ZipDeployer {
    client: Client,
    scheme: String,
}

impl ZipDeployer {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            scheme: "https".to_string(),
        }
    }

    /// Override the URL scheme (plain `http` for local test servers)
    pub fn with_scheme(mut self, scheme: &str) -> Self {
        self.scheme = scheme.to_string();
        self
    }

    pub fn deploy_url(&self, profile: &PublishProfile) -> String {
        format!("{}://{}/api/zipdeploy", self.scheme, profile.publish_url)
    }

    /// Upload `path` in one POST. Anything but 200 is a failed deployment.
    pub async fn deploy_zip(&self, profile: &PublishProfile, path: &Path) -> Result<()> {
        if !path.exists() {
            return Err(DeployError::PathNotFound(path.to_path_buf()).into());
        }

        let content = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read artifact {}", path.display()))?;

        eprintln!("Deployment started | path: {}", path.display());
        tracing::info!(
            bytes = content.len(),
            url = %self.deploy_url(profile),
            "uploading artifact"
        );

        let response = self
            .client
            .post(self.deploy_url(profile))
            .header(
                AUTHORIZATION,
                basic_auth_header(&profile.user_name, &profile.user_pwd),
            )
            .header(CONTENT_TYPE, "application/zip")
            .body(content)
            .send()
            .await
            .context("Failed to send ZIP deploy request")?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(DeployError::UploadFailed {
                status: status.as_u16(),
                body,
            }
            .into());
        }

        eprintln!("Deployment finished with status code: {}", status.as_u16());
        Ok(())
    }
}
