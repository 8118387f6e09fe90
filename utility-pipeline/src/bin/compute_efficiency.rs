use anyhow::Result;
use clap::Parser;
use utility_pipeline::{cli::StageArgs, observability, stages::efficiency};

fn main() -> Result<()> {
    observability::init_tracing();

    let cfg = StageArgs::parse().load_config()?;
    efficiency::run(&cfg)?;
    Ok(())
}
