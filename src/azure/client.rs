use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use super::auth::{AccessToken, ClientSecretCredential};
use super::DEFAULT_POLL_INTERVAL;
use crate::error::ApiError;

/// Public-cloud Azure Resource Manager endpoint
pub const MANAGEMENT_ENDPOINT: &str = "https://management.azure.com";

/// ARM REST client bound to one subscription.
///
/// Clones share the bearer token, so a refresh made by one is seen by all.
#[derive(Clone)]
pub struct ArmClient {
    client: Client,
    endpoint: String,
    subscription: String,
    token: Arc<RwLock<AccessToken>>,
    refresher: Option<Arc<TokenRefresher>>,
    poll_interval: Duration,
}

struct TokenRefresher {
    credential: ClientSecretCredential,
    scope: String,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    code: Option<String>,
    message: String,
}

impl ArmClient {
    pub fn new(client: Client, subscription: &str, token: AccessToken) -> Self {
        Self {
            client,
            endpoint: MANAGEMENT_ENDPOINT.to_string(),
            subscription: subscription.to_string(),
            token: Arc::new(RwLock::new(token)),
            refresher: None,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Fetch a new token from `credential` when a request is answered with 401
    pub fn with_credential(mut self, credential: ClientSecretCredential, scope: &str) -> Self {
        self.refresher = Some(Arc::new(TokenRefresher {
            credential,
            scope: scope.to_string(),
        }));
        self
    }

    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = endpoint.trim_end_matches('/').to_string();
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn subscription(&self) -> &str {
        &self.subscription
    }

    pub(crate) fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Absolute URL for a path below `/subscriptions/{id}`
    pub(crate) fn url(&self, path: &str) -> String {
        format!(
            "{}/subscriptions/{}{}",
            self.endpoint,
            urlencoding::encode(&self.subscription),
            path
        )
    }

    /// Path of a resource group, with the name percent-encoded
    pub(crate) fn group_path(resource_group: &str) -> String {
        format!("/resourceGroups/{}", urlencoding::encode(resource_group))
    }

    pub(crate) fn http(&self) -> &Client {
        &self.client
    }

    /// Send the request built by `request` with the current bearer token.
    ///
    /// A 401 triggers one token refresh and one resend when a credential is attached.
    pub(crate) async fn send<F>(&self, request: F) -> Result<Response, ApiError>
    where
        F: Fn(&str) -> RequestBuilder,
    {
        let token = self.token.read().await.secret().to_string();
        let response = request(&token).send().await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }
        let Some(refresher) = &self.refresher else {
            return Ok(response);
        };

        tracing::info!("access token rejected, requesting a new one");
        let fresh = refresher
            .credential
            .get_token(&self.client, &refresher.scope)
            .await?;
        let token = fresh.secret().to_string();
        *self.token.write().await = fresh;

        Ok(request(&token).send().await?)
    }

    /// GET an absolute URL and decode the JSON body
    pub(crate) async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ApiError> {
        tracing::debug!(url, "GET");
        let response = self
            .send(|token| self.client.get(url).bearer_auth(token))
            .await?;
        let response = Self::check(response).await?;
        Ok(response.json().await?)
    }

    /// PUT a JSON body to an absolute URL and decode the JSON reply
    pub(crate) async fn put_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        tracing::debug!(url, "PUT");
        let response = self
            .send(|token| self.client.put(url).bearer_auth(token).json(body))
            .await?;
        let response = Self::check(response).await?;
        Ok(response.json().await?)
    }

    /// Turn a non-success response into an [`ApiError`] carrying ARM's error message
    pub(crate) async fn check(response: Response) -> Result<Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(Self::error_from_body(status, &body))
    }

    pub(crate) fn error_from_body(status: StatusCode, body: &str) -> ApiError {
        match serde_json::from_str::<ErrorResponse>(body) {
            Ok(ErrorResponse { error }) => {
                let message = match error.code {
                    Some(code) => format!("({}) {}", code, error.message),
                    None => error.message,
                };
                ApiError::with_status(status.as_u16(), message)
            }
            Err(_) if body.trim().is_empty() => ApiError::invalid_status(status),
            Err(_) => ApiError::with_status(
                status.as_u16(),
                format!("{} {}", status.as_u16(), body.trim()),
            ),
        }
    }
}
