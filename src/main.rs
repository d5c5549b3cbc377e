//! oaistat - Summarize OpenAI API usage and cost

use oaistat::{
    aggregation::Aggregator,
    cli::{Cli, Command, FetchArgs, FileArgs},
    config::resolve_credentials,
    filters::UsageFilter,
};
use clap::Parser;
use oaistat_core::aggregation_types::UsageReport;
use oaistat_core::error::Result;
use oaistat_core::provider::UsageSource;
use oaistat_core::timezone::TimezoneConfig;
use oaistat_core::types::PricingScheme;
use oaistat_pricing::{CostCalculator, PricingSnapshot, PricingTable};
use oaistat_terminal::output::get_formatter;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize logging on stderr. --verbose and --quiet override RUST_LOG.
fn init_logging(cli: &Cli) {
    let filter = if cli.quiet {
        tracing_subscriber::EnvFilter::new("error")
    } else if cli.verbose {
        tracing_subscriber::EnvFilter::new("oaistat=info")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("oaistat=warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// The usage endpoint never reports characters or audio seconds
fn warn_unmetered_usage(report: &UsageReport, table: &PricingTable) {
    for row in &report.models {
        let unit = match table.get(&row.model).map(|rates| rates.scheme) {
            Some(PricingScheme::PerSecond) => "audio seconds",
            Some(PricingScheme::PerCharacter) => "characters",
            _ => continue,
        };
        if row.counters.requests > 0 {
            warn!(
                "{} is billed by {} but the usage API does not report them; \
                 its cost shows as $0.00. Use a CSV export for accurate costs",
                row.model, unit
            );
        }
    }
}

async fn run_fetch(
    args: FetchArgs,
    aggregator: &Aggregator,
    show_progress: bool,
) -> Result<UsageReport> {
    let credentials = resolve_credentials(args.api_key.as_deref(), args.config.as_deref()).await?;

    let loader = match args.until {
        Some(until) => oaistat_provider_api::DataLoader::for_range(credentials, args.date, until)?,
        None => oaistat_provider_api::DataLoader::for_date(credentials, args.date),
    }
    .with_base_url(args.base_url)
    .with_progress(show_progress);

    info!("Fetching usage for {} day(s)", loader.dates().len());
    let records = loader.load_all().await?;
    aggregator.report(records)
}

async fn run_file(args: FileArgs, aggregator: &Aggregator) -> Result<UsageReport> {
    let mut filter = UsageFilter::new().with_timezone(aggregator.timezone_config().clone());
    if let Some(since) = args.since {
        filter = filter.with_since(since);
    }
    if let Some(until) = args.until {
        filter = filter.with_until(until);
    }
    filter.validate()?;

    let loader = oaistat_provider_csv::DataLoader::new(&args.path);
    info!("Reading usage from {}", loader.path().display());
    let records = filter.apply(loader.load_all().await?);
    aggregator.report(records)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli);

    let snapshot = PricingSnapshot::load(cli.pricing.as_deref()).await?;
    let color = !cli.json && is_terminal::is_terminal(std::io::stdout());
    let formatter = get_formatter(cli.json, color);

    if matches!(cli.command, Command::Pricing) {
        println!("{}", formatter.format_pricing(&snapshot));
        return Ok(());
    }

    let tz_config = TimezoneConfig::from_cli(cli.timezone.as_deref())?;
    info!("Using timezone: {}", tz_config.display_name());

    let (normalizer, table) = snapshot.into_parts();
    let table = Arc::new(table);
    let cost_calculator = Arc::new(CostCalculator::new(Arc::clone(&table)));
    let aggregator = Aggregator::new(normalizer, cost_calculator, tz_config);

    let mut report = match cli.command {
        Command::Fetch(args) => {
            let report = run_fetch(args, &aggregator, color).await?;
            warn_unmetered_usage(&report, &table);
            report
        }
        Command::File(args) => run_file(args, &aggregator).await?,
        Command::Pricing => return Ok(()),
    };

    report.sort_models(cli.sort);
    println!("{}", formatter.format_report(&report));

    Ok(())
}
