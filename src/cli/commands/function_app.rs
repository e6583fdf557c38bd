use anyhow::Result;

use crate::cli::auth::{connect, http_client, resolve_credentials};
use crate::cli::config::{require, Config};
use crate::cli::FunctionAppCli;
use crate::deploy::{resolve_publish_profile, sync_function_app_triggers, ZipDeployer};
use crate::error::DeployError;

/// Fetch the ZipDeploy profile, upload the package, then sync triggers
pub async fn execute_function_app(args: FunctionAppCli) -> Result<()> {
    let config = Config::load()?.unwrap_or_default();
    let resource_group = require(
        args.resource_group_name,
        config.resource_group.as_ref(),
        "resource_group_name",
    )?;
    let creds = resolve_credentials(args.azure, &config)?;

    let http = http_client()?;
    let arm = connect(&http, &creds).await?;

    let profile = resolve_publish_profile(&arm, &resource_group, &args.name)
        .await?
        .ok_or_else(|| DeployError::ProfileNotFound {
            function_app: args.name.clone(),
        })?;

    ZipDeployer::new(http).deploy_zip(&profile, &args.path).await?;

    sync_function_app_triggers(&arm, &resource_group, &args.name).await?;
    Ok(())
}
