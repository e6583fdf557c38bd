use anyhow::Result;
use std::time::Duration;

use crate::azure::DEFAULT_POLL_INTERVAL;
use crate::cli::auth::{connect, http_client, resolve_credentials};
use crate::cli::config::{require, Config};
use crate::cli::LogicAppCli;
use crate::deploy::{collect_targets, DeploymentNaming, LogicAppDeployer, TargetMode};

/// Deploy one template file, or every `.json` template below a directory
pub async fn execute_logic_app(args: LogicAppCli) -> Result<()> {
    // Path problems are reported before any credentials are used
    let (mode, targets) = collect_targets(&args.path)?;

    let config = Config::load()?.unwrap_or_default();
    let resource_group = require(
        args.resource_group_name,
        config.resource_group.as_ref(),
        "resource_group_name",
    )?;
    let creds = resolve_credentials(args.azure, &config)?;

    if targets.is_empty() {
        eprintln!("No .json templates found in {}", args.path.display());
        return Ok(());
    }

    let interval = args
        .poll_interval
        .or(config.poll_interval_secs)
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_POLL_INTERVAL);
    let naming = if args.unique_name || config.unique_deployment_names.unwrap_or(false) {
        DeploymentNaming::unique_now()
    } else {
        DeploymentNaming::Versioned
    };

    let http = http_client()?;
    let arm = connect(&http, &creds).await?.with_poll_interval(interval);
    let deployer = LogicAppDeployer::new(&arm, &resource_group, naming);

    match mode {
        TargetMode::Single => deployer.deploy_single(&targets[0]).await,
        TargetMode::Directory => deployer
            .deploy_multiple(&targets, interval)
            .await
            .map(|_| ()),
    }
}
