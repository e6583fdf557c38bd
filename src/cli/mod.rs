pub mod auth;
pub mod commands;
pub mod config;

use clap::Parser;
use std::ffi::OsString;
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize tracing for the CLI binaries.
/// Uses RUST_LOG for filtering (defaults to warn so progress output stays readable).
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_ansi(true))
        .with(filter)
        .init();
}

/// Rewrite the two-letter `-rg` flag into its long form, which clap cannot express as a short.
pub fn normalize_args<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    args.into_iter()
        .map(|arg| match arg.to_str() {
            Some("-rg") => OsString::from("--resource_group_name"),
            Some(s) if s.starts_with("-rg=") => {
                OsString::from(format!("--resource_group_name={}", &s["-rg=".len()..]))
            }
            _ => arg,
        })
        .collect()
}

/// Service principal and endpoint flags shared by both tools
#[derive(clap::Args, Debug, Default)]
pub struct AzureArgs {
    /// [Azure] Subscription ID
    #[arg(long, env = "AZURE_SUBSCRIPTION_ID")]
    pub subscription: Option<String>,

    /// [Azure] Tenant ID
    #[arg(long, env = "AZURE_TENANT_ID")]
    pub tenant: Option<String>,

    /// [Azure] Client ID
    #[arg(long = "client_id", visible_alias = "client-id", env = "AZURE_CLIENT_ID")]
    pub client_id: Option<String>,

    /// [Azure] Client Secret
    #[arg(
        long = "client_secret",
        visible_alias = "client-secret",
        env = "AZURE_CLIENT_SECRET",
        hide_env_values = true
    )]
    pub client_secret: Option<String>,

    /// Resource Manager endpoint (sovereign clouds)
    #[arg(long, env = "AZURE_MANAGEMENT_ENDPOINT")]
    pub management_endpoint: Option<String>,

    /// Identity platform host used for the token exchange
    #[arg(long, env = "AZURE_AUTHORITY_HOST")]
    pub authority_host: Option<String>,
}

#[derive(Parser, Debug)]
#[command(name = "function-app-deploy")]
#[command(about = "Deploy a ZIP package to an Azure Function App and sync its triggers")]
#[command(version)]
pub struct FunctionAppCli {
    /// Resource Group name
    #[arg(
        short = 'g',
        long = "resource_group_name",
        visible_alias = "resource-group-name",
        env = "AZURE_RESOURCE_GROUP"
    )]
    pub resource_group_name: Option<String>,

    /// Function App name
    #[arg(short = 'n', long = "name")]
    pub name: String,

    /// Path to the ZIP package
    #[arg(short = 'p', long = "path")]
    pub path: PathBuf,

    #[command(flatten)]
    pub azure: AzureArgs,
}

#[derive(Parser, Debug)]
#[command(name = "logic-app-deploy")]
#[command(about = "Deploy Logic App workflow templates through ARM deployments")]
#[command(version)]
pub struct LogicAppCli {
    /// Resource Group name
    #[arg(
        short = 'g',
        long = "resource_group_name",
        visible_alias = "resource-group-name",
        env = "AZURE_RESOURCE_GROUP"
    )]
    pub resource_group_name: Option<String>,

    /// Path to directory or JSON template
    #[arg(short = 'p', long = "path")]
    pub path: PathBuf,

    /// Suffix deployment names with the Logic App name and a timestamp
    #[arg(long)]
    pub unique_name: bool,

    /// Seconds between status sweeps
    #[arg(long)]
    pub poll_interval: Option<u64>,

    #[command(flatten)]
    pub azure: AzureArgs,
}
