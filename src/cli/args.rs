use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::utils::constants::DEFAULT_CONFIG_FILE;

#[derive(Parser)]
#[command(name = "dwd-heat-days")]
#[command(about = "Count days at or above 35 °C per DWD station and year, published as GeoJSON")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Log file path")]
    pub log_file: Option<PathBuf>,

    #[arg(
        short,
        long,
        global = true,
        default_value = DEFAULT_CONFIG_FILE,
        help = "Configuration file (TOML); ignored if absent"
    )]
    pub config: PathBuf,

    #[arg(short, long, global = true, help = "Data directory [default: dwd_weather_data]")]
    pub data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Download daily climate data for all stations into the raw document
    Fetch(FetchArgs),

    /// Count threshold days per station and year from the raw documents
    Aggregate(AggregateArgs),

    /// Reproject the yearly summary and write the GeoJSON layer
    Geojoin,

    /// Run fetch, aggregate and geojoin in sequence
    Run {
        #[command(flatten)]
        fetch: FetchArgs,

        #[command(flatten)]
        aggregate: AggregateArgs,
    },

    /// Display statistics about a summary or GeoJSON output file
    Info {
        #[arg(short, long, help = "File to inspect [default: the GeoJSON output]")]
        file: Option<PathBuf>,

        #[arg(short, long, default_value = "10")]
        sample: usize,
    },
}

#[derive(clap::Args, Debug, Clone, Default)]
pub struct FetchArgs {
    #[arg(long, help = "First day to request (YYYY-MM-DD)")]
    pub start_date: Option<String>,

    #[arg(long, help = "Last day to request (YYYY-MM-DD)")]
    pub end_date: Option<String>,

    #[arg(long, help = "Download at most this many stations")]
    pub max_stations: Option<usize>,
}

#[derive(clap::Args, Debug, Clone, Default)]
pub struct AggregateArgs {
    #[arg(long, help = "Threshold in °C [default: 35.0]")]
    pub threshold: Option<f64>,

    #[arg(long, help = "Keep checkpoint files after a successful run")]
    pub keep_temp: bool,
}
