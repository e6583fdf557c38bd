use azure_deploy::cli::{self, commands, LogicAppCli};
use clap::Parser;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    cli::init_tracing();
    let args = LogicAppCli::parse_from(cli::normalize_args(std::env::args_os()));
    commands::execute_logic_app(args).await
}
