use async_trait::async_trait;
use bytes::Bytes;
use reqwest::StatusCode;

use super::{ArmClient, WebApps};
use crate::error::ApiError;

const WEB_API_VERSION: &str = "2022-03-01";

impl ArmClient {
    fn site_url(&self, resource_group: &str, name: &str, action: &str) -> String {
        self.url(&format!(
            "{}/providers/Microsoft.Web/sites/{}/{}?api-version={}",
            Self::group_path(resource_group),
            urlencoding::encode(name),
            action,
            WEB_API_VERSION
        ))
    }
}

#[async_trait]
impl WebApps for ArmClient {
    async fn publishing_profile_xml(
        &self,
        resource_group: &str,
        name: &str,
    ) -> Result<Vec<Bytes>, ApiError> {
        let url = self.site_url(resource_group, name, "publishxml");
        tracing::debug!(url = %url, "POST");

        let body = serde_json::json!({ "format": "WebDeploy" });
        let response = self
            .send(|token| self.http().post(&url).bearer_auth(token).json(&body))
            .await?;
        let mut response = Self::check(response).await?;

        let mut chunks = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            chunks.push(chunk);
        }
        tracing::debug!(chunks = chunks.len(), "publish profile received");
        Ok(chunks)
    }

    /// 204 is the documented success. Any other 2xx is reported as an invalid status,
    /// which is how the service answers a sync that did in fact go through.
    async fn sync_function_triggers(
        &self,
        resource_group: &str,
        name: &str,
    ) -> Result<(), ApiError> {
        let url = self.site_url(resource_group, name, "syncfunctiontriggers");
        tracing::debug!(url = %url, "POST");

        let response = self
            .send(|token| {
                self.http()
                    .post(&url)
                    .bearer_auth(token)
                    .header(reqwest::header::CONTENT_LENGTH, 0)
            })
            .await?;

        let status = response.status();
        if status == StatusCode::NO_CONTENT {
            return Ok(());
        }
        if status.is_success() {
            return Err(ApiError::invalid_status(status));
        }
        let body = response.text().await.unwrap_or_default();
        Err(Self::error_from_body(status, &body))
    }
}
