use clap::Parser;
use lan_discovery::core::logging::init_logging;
use lan_discovery::{Cli, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = ServerConfig::load(&cli)?;
    init_logging(config.log_format);

    lan_discovery::run(config).await?;
    Ok(())
}
