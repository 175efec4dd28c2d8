use clap::Parser;
use euronote::utils::{logger, validation::Validate};
use euronote::{build_cache, BofApiClient, CliConfig, EuroNoteService};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    logger::init_cli_logger(config.verbose);

    tracing::info!("Starting euronote");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    if let Err(e) = config.validate() {
        tracing::error!("Configuration validation failed: {}", e);
        eprintln!("{}", e);
        std::process::exit(1);
    }

    let cache = build_cache(&config).await?;
    let api = Arc::new(BofApiClient::new(config.api_base_url.clone()));
    let service = EuroNoteService::new(api, cache, config.currency_filter());

    let filters = config.filters();
    tracing::info!(
        "Aggregating banknote circulation between {} and {}",
        filters.start_period,
        filters.end_period
    );

    match service.get_note_summaries(&filters).await {
        Ok(summaries) => {
            tracing::info!("Aggregated {} denominations", summaries.len());
            println!("{}", serde_json::to_string_pretty(&summaries)?);
        }
        Err(e) => {
            tracing::error!("Aggregation failed: {}", e);
            eprintln!("{}", e);
            std::process::exit(1);
        }
    }

    Ok(())
}
