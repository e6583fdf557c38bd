use azure_deploy::cli::{self, commands, FunctionAppCli};
use clap::Parser;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    cli::init_tracing();
    let args = FunctionAppCli::parse_from(cli::normalize_args(std::env::args_os()));
    commands::execute_function_app(args).await
}
