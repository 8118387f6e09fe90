use anyhow::Result;
use clap::Parser;
use utility_pipeline::{
    cli::StageArgs,
    extraction::{OpenAiBillParser, PdfText},
    observability,
    stages::extract,
};

#[tokio::main]
async fn main() -> Result<()> {
    // The API key usually lives in a local .env file.
    dotenvy::dotenv().ok();
    observability::init_tracing();

    let cfg = StageArgs::parse().load_config()?;
    let parser = OpenAiBillParser::from_env(&cfg.extraction)?;

    let summary = extract::run(&cfg, &PdfText, &parser).await?;
    for (path, reason) in &summary.failed {
        tracing::warn!(bill = %path.display(), %reason, "skipped bill");
    }
    Ok(())
}
