//! Pipeline configuration.
//!
//! Values are layered: built-in defaults, then an optional TOML file, then
//! `HEATDAYS_*` environment variables (`__` separates nested keys, e.g.
//! `HEATDAYS_FETCH__START_DATE`). Command line flags are applied last by the
//! CLI layer.

use chrono::NaiveDate;
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;
use validator::Validate;

use crate::error::{ProcessingError, Result};
use crate::fetch::ClimateParameter;
use crate::utils::constants::{
    DEFAULT_DATA_DIR, DEFAULT_USER_AGENT, DWD_BASE_URL, END_DATE, START_DATE,
    TEMPERATURE_THRESHOLD,
};
use crate::utils::DataLayout;

pub const ENV_PREFIX: &str = "HEATDAYS";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct PipelineConfig {
    #[validate(length(min = 1))]
    pub data_dir: String,

    #[validate(nested)]
    pub fetch: FetchConfig,

    #[validate(nested)]
    pub aggregate: AggregateConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct FetchConfig {
    #[validate(length(min = 1))]
    pub base_url: String,

    pub start_date: String,

    pub end_date: String,

    #[validate(length(min = 1))]
    pub parameters: Vec<String>,

    /// Stop after this many stations; unset means all
    #[serde(default)]
    pub max_stations: Option<usize>,

    #[validate(length(min = 1))]
    pub user_agent: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct AggregateConfig {
    #[validate(range(min = -100.0, max = 100.0))]
    pub threshold: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            data_dir: DEFAULT_DATA_DIR.to_string(),
            fetch: FetchConfig::default(),
            aggregate: AggregateConfig::default(),
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            base_url: DWD_BASE_URL.to_string(),
            start_date: START_DATE.to_string(),
            end_date: END_DATE.to_string(),
            parameters: vec![ClimateParameter::TemperatureAirMax2m.name().to_string()],
            max_stations: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl Default for AggregateConfig {
    fn default() -> Self {
        Self {
            threshold: TEMPERATURE_THRESHOLD,
        }
    }
}

impl PipelineConfig {
    /// Load defaults, the optional config file and the environment
    pub fn load(config_file: Option<&Path>) -> Result<Self> {
        Self::load_layers(config_file, environment(None))
    }

    fn load_layers(config_file: Option<&Path>, environment: Environment) -> Result<Self> {
        let defaults = serde_json::to_string(&Self::default())?;

        let mut builder =
            Config::builder().add_source(File::from_str(&defaults, FileFormat::Json));

        if let Some(path) = config_file {
            debug!("Reading configuration from {}", path.display());
            builder = builder.add_source(File::from(path).required(false));
        }

        let settings = builder.add_source(environment).build()?;

        let config: Self = settings.try_deserialize()?;
        config.check()?;

        Ok(config)
    }

    /// Validate field constraints and cross-field rules
    pub fn check(&self) -> Result<()> {
        self.validate()?;

        let (start, end) = self.fetch.date_range()?;
        if start > end {
            return Err(ProcessingError::Config(format!(
                "start_date {} is after end_date {}",
                start, end
            )));
        }

        self.fetch.climate_parameters()?;

        Ok(())
    }

    pub fn layout(&self) -> DataLayout {
        DataLayout::new(PathBuf::from(&self.data_dir))
    }
}

impl FetchConfig {
    pub fn date_range(&self) -> Result<(NaiveDate, NaiveDate)> {
        let parse = |value: &str, field: &str| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|e| {
                ProcessingError::Config(format!("Invalid {} '{}': {}", field, value, e))
            })
        };

        Ok((
            parse(&self.start_date, "start_date")?,
            parse(&self.end_date, "end_date")?,
        ))
    }

    pub fn climate_parameters(&self) -> Result<Vec<ClimateParameter>> {
        self.parameters
            .iter()
            .map(|name| {
                ClimateParameter::from_name(name).ok_or_else(|| {
                    ProcessingError::Config(format!("Unsupported parameter '{}'", name))
                })
            })
            .collect()
    }
}

/// `HEATDAYS_` prefix, `__` between nested keys. `vars` replaces the process
/// environment when given.
fn environment(vars: Option<HashMap<String, String>>) -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .list_separator(",")
        .with_list_parse_key("fetch.parameters")
        .try_parsing(true)
        .source(vars)
}
