//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.medaltally.toml` files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default configuration file name, looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = ".medaltally.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Input data settings.
    #[serde(default)]
    pub data: DataConfig,

    /// Aggregation settings.
    #[serde(default)]
    pub query: QueryConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// General application settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

/// Input data settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Path to the results file.
    #[serde(default = "default_results")]
    pub results: String,

    /// Path to the NOC to region lookup file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regions: Option<String>,

    /// Field delimiter of the results file.
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            results: default_results(),
            regions: None,
            delimiter: default_delimiter(),
        }
    }
}

fn default_results() -> String {
    "data/athlete_events.csv".to_string()
}

fn default_delimiter() -> char {
    ','
}

/// Aggregation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryConfig {
    /// Grouping dimensions, in key order.
    #[serde(default = "default_dimensions")]
    pub dimensions: Vec<String>,

    /// `medals` or `entries`.
    #[serde(default = "default_mode")]
    pub mode: String,

    /// Column to sort by, descending: gold, silver, bronze or total.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<String>,

    /// Keep only this many rows after sorting.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top: Option<usize>,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            dimensions: default_dimensions(),
            mode: default_mode(),
            sort_by: None,
            top: None,
        }
    }
}

fn default_dimensions() -> Vec<String> {
    vec!["Year".to_string()]
}

fn default_mode() -> String {
    "medals".to_string()
}

/// Report settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// `markdown`, `json` or `csv`.
    #[serde(default = "default_format")]
    pub format: String,

    /// Output file; stdout when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            format: default_format(),
            output: None,
        }
    }
}

fn default_format() -> String {
    "markdown".to_string()
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(CONFIG_FILE_NAME);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// Only arguments given explicitly on the command line override the file.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref data) = args.data {
            self.data.results = data.display().to_string();
        }
        if let Some(ref regions) = args.regions {
            self.data.regions = Some(regions.display().to_string());
        }
        if let Some(delimiter) = args.delimiter {
            self.data.delimiter = delimiter;
        }

        if let Some(ref by) = args.by {
            self.query.dimensions = by.clone();
        }
        if let Some(mode) = args.mode {
            self.query.mode = mode.as_str().to_string();
        }
        if let Some(sort_by) = args.sort_by {
            self.query.sort_by = Some(sort_by.as_str().to_string());
        }
        if let Some(top) = args.top {
            self.query.top = Some(top);
        }

        if let Some(format) = args.format {
            self.report.format = format.as_str().to_string();
        }
        if let Some(ref output) = args.output {
            self.report.output = Some(output.display().to_string());
        }

        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
