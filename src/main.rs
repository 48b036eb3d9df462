use clap::Parser;
use smart_survey_api::cli::{self, Cli};
use smart_survey_api::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so local runs pick up PG_*, STORAGE_* and friends
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let config = AppConfig::from_env();
    cli::init_tracing(&config);

    if let Err(e) = cli::run(cli, config).await {
        tracing::error!("Fatal: {:#}", e);
        return Err(e);
    }

    Ok(())
}
