use anyhow::Result;
use clap::Parser;
use poolfolio::application::{Cli, CommandExecutor};
use poolfolio::shared::config::ConfigLoader;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let cli = Cli::parse();
    let config = ConfigLoader::load(cli.config.as_deref())?;
    CommandExecutor::execute(cli.command, config).await?;
    Ok(())
}
