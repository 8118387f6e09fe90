use anyhow::Result;
use clap::Parser;
use utility_pipeline::{cli::StageArgs, observability, stages::normalize};

#[tokio::main]
async fn main() -> Result<()> {
    observability::init_tracing();

    let cfg = StageArgs::parse().load_config()?;
    normalize::run(&cfg).await?;
    Ok(())
}
