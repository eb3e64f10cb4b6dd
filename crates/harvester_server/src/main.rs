use clap::Parser;
use harvester_engine::JobEngine;
use harvester_server::{logging, serve, Cli};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::initialize(cli.log, cli.log_level);

    let engine = JobEngine::new(cli.engine_settings())?;
    serve(cli.bind, engine).await?;
    Ok(())
}
