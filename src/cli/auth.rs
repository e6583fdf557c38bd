use anyhow::{Context, Result};
use reqwest::Client;

use super::config::{require, Config};
use super::AzureArgs;
use crate::azure::auth::management_scope;
use crate::azure::{ArmClient, ClientSecretCredential, AUTHORITY_HOST, MANAGEMENT_ENDPOINT};

/// Service principal and endpoints after merging flags, environment and config
#[derive(Debug)]
pub struct Credentials {
    pub subscription: String,
    pub credential: ClientSecretCredential,
    pub management_endpoint: String,
}

/// Merge `args` (flags and env) over `config` and fail on anything still missing
pub fn resolve_credentials(args: AzureArgs, config: &Config) -> Result<Credentials> {
    let subscription = require(args.subscription, config.subscription.as_ref(), "subscription")?;
    let tenant = require(args.tenant, config.tenant.as_ref(), "tenant")?;
    let client_id = require(args.client_id, config.client_id.as_ref(), "client_id")?;
    let client_secret = require(args.client_secret, None, "client_secret")?;

    let authority_host = args
        .authority_host
        .or_else(|| config.authority_host.clone())
        .unwrap_or_else(|| AUTHORITY_HOST.to_string());
    let management_endpoint = args
        .management_endpoint
        .or_else(|| config.management_endpoint.clone())
        .unwrap_or_else(|| MANAGEMENT_ENDPOINT.to_string());

    Ok(Credentials {
        subscription,
        credential: ClientSecretCredential::new(&tenant, &client_id, &client_secret)
            .with_authority_host(&authority_host),
        management_endpoint,
    })
}

/// HTTP client shared by the token exchange, ARM calls and uploads
pub fn http_client() -> Result<Client> {
    Client::builder()
        .user_agent(concat!("azure-deploy/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to build HTTP client")
}

/// Authenticate and return an ARM client bound to the subscription
pub async fn connect(http: &Client, creds: &Credentials) -> Result<ArmClient> {
    let scope = management_scope(&creds.management_endpoint);
    let token = creds
        .credential
        .get_token(http, &scope)
        .await
        .context("Failed to authenticate with Azure")?;

    tracing::info!(subscription = %creds.subscription, "authenticated");
    Ok(ArmClient::new(http.clone(), &creds.subscription, token)
        .with_endpoint(&creds.management_endpoint)
        .with_credential(creds.credential.clone(), &scope))
}
