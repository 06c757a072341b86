/// Heat day threshold in degrees Celsius
pub const TEMPERATURE_THRESHOLD: f64 = 35.0;

/// Offset between Kelvin and Celsius
pub const KELVIN_OFFSET: f64 = 273.15;

/// DWD marks missing observations with this value
pub const MISSING_VALUE_SENTINEL: f64 = -999.0;

/// Historical request window
pub const START_DATE: &str = "1963-12-31";
pub const END_DATE: &str = "2023-12-31";

/// Request descriptors recorded in the raw document
pub const RESOLUTION: &str = "daily";
pub const PERIOD: &str = "historical";
pub const DATASET: &str = "climate_summary";

/// DWD open data endpoints
pub const DWD_BASE_URL: &str =
    "https://opendata.dwd.de/climate_environment/CDC/observations_germany/climate/daily/kl/historical/";
pub const DWD_STATIONS_FILE: &str = "KL_Tageswerte_Beschreibung_Stationen.txt";
pub const DWD_ARCHIVE_PREFIX: &str = "tageswerte_KL_";
pub const DWD_PRODUCT_PREFIX: &str = "produkt_klima_tag";
pub const DEFAULT_USER_AGENT: &str = concat!("dwd-heat-days/", env!("CARGO_PKG_VERSION"));

/// Directory and file names
pub const DEFAULT_DATA_DIR: &str = "dwd_weather_data";
pub const RAW_DOCUMENT_FILE: &str = "all_stations_data.geojson";
pub const RAW_DOCUMENT_EXTENSION: &str = "geojson";
pub const TEMP_DIR: &str = "temp";
pub const CHECKPOINT_PREFIX: &str = "temp_";
pub const SUMMARY_FILE: &str = "station_data_per_year.json";
pub const GEO_OUTPUT_FILE: &str = "processed_station_data_per_year.geojson";
pub const DEFAULT_CONFIG_FILE: &str = "dwd-heat-days.toml";

/// Output column naming the station
pub const STATION_ID_COLUMN: &str = "Stations_id";

/// Coordinate reference systems
pub const SOURCE_EPSG: u16 = 4326;
pub const TARGET_EPSG: u16 = 31467;

/// Number of lines shown when a checkpoint cannot be aggregated
pub const PREVIEW_LINES: usize = 5;

/// Processing defaults
pub const DEFAULT_BUFFER_SIZE: usize = 8192 * 16; // 128KB
