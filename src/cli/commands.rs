use crate::analyzers::SummaryAnalyzer;
use crate::cli::args::{AggregateArgs, Cli, Commands, FetchArgs};
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::fetch::Fetcher;
use crate::processors::{Aggregator, GeoJoiner};
use tracing::info;

pub async fn run(cli: Cli) -> Result<()> {
    let mut config = PipelineConfig::load(Some(cli.config.as_path()))?;
    if let Some(dir) = &cli.data_dir {
        config.data_dir = dir.to_string_lossy().into_owned();
    }

    match cli.command {
        Commands::Fetch(args) => {
            apply_fetch_args(&mut config, &args)?;
            fetch(&config).await?;
        }

        Commands::Aggregate(args) => {
            apply_aggregate_args(&mut config, &args)?;
            aggregate(&config, args.keep_temp)?;
        }

        Commands::Geojoin => {
            geojoin(&config)?;
        }

        Commands::Run {
            fetch: fetch_args,
            aggregate: aggregate_args,
        } => {
            apply_fetch_args(&mut config, &fetch_args)?;
            apply_aggregate_args(&mut config, &aggregate_args)?;

            fetch(&config).await?;
            aggregate(&config, aggregate_args.keep_temp)?;
            geojoin(&config)?;
            println!("Pipeline complete!");
        }

        Commands::Info { file, sample } => {
            let path = file.unwrap_or_else(|| config.layout().geo_output());
            println!("Analyzing {}", path.display());

            let stats = SummaryAnalyzer::new().analyze_file(&path, sample)?;
            println!("\n{}", stats.summary());
            if sample > 0 && !stats.sample.is_empty() {
                println!("\nSample rows:\n{}", stats.sample_table());
            }
        }
    }

    Ok(())
}

/// Fold fetch flags into the loaded configuration and re-validate
pub fn apply_fetch_args(config: &mut PipelineConfig, args: &FetchArgs) -> Result<()> {
    if let Some(start) = &args.start_date {
        config.fetch.start_date = start.clone();
    }
    if let Some(end) = &args.end_date {
        config.fetch.end_date = end.clone();
    }
    if args.max_stations.is_some() {
        config.fetch.max_stations = args.max_stations;
    }
    config.check()
}

pub fn apply_aggregate_args(config: &mut PipelineConfig, args: &AggregateArgs) -> Result<()> {
    if let Some(threshold) = args.threshold {
        config.aggregate.threshold = threshold;
    }
    config.check()
}

async fn fetch(config: &PipelineConfig) -> Result<()> {
    let output = config.layout().raw_document();
    println!("Fetching station data into {}", output.display());

    let summary = Fetcher::new(&config.fetch, config.aggregate.threshold)?
        .run(&output)
        .await?;

    println!("{}", summary.report());
    Ok(())
}

fn aggregate(config: &PipelineConfig, keep_temp: bool) -> Result<()> {
    let layout = config.layout();
    println!(
        "Aggregating raw documents in {} (threshold {:.1} °C)",
        layout.root().display(),
        config.aggregate.threshold
    );

    let report = Aggregator::new(layout, config.aggregate.threshold)
        .with_keep_temp(keep_temp)
        .run()?;

    info!(
        "Aggregation finished: {} rows, {} failures",
        report.rows_written,
        report.failures.len()
    );
    println!("\n{}", report.summary());
    Ok(())
}

fn geojoin(config: &PipelineConfig) -> Result<()> {
    let summary = GeoJoiner::new(config.layout()).run()?;
    println!(
        "Wrote {} features for {} stations in {} to {}",
        summary.features,
        summary.stations,
        summary.crs,
        summary.output.display()
    );
    Ok(())
}
