use anyhow::Result;
use clap::Parser;
use time::OffsetDateTime;
use utility_pipeline::{
    cli::StageArgs, observability, stages::fetch_weather, weather::OpenMeteoClient,
};

#[tokio::main]
async fn main() -> Result<()> {
    observability::init_tracing();

    let cfg = StageArgs::parse().load_config()?;
    let client = OpenMeteoClient::new(&cfg.weather)?;
    let today = OffsetDateTime::now_utc().date();

    fetch_weather::run(&cfg, &client, today).await?;
    Ok(())
}
