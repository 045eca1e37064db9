//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation. Options left unset fall back to the
//! configuration file.

use clap::{Parser, ValueEnum};
use medaltally::analysis::{AggregationMode, MedalColumn};
use medaltally::models::{Season, Sex};
use std::path::PathBuf;

/// MedalTally - Olympic medal tables by any combination of attributes
///
/// Loads a table of athlete results and counts medals (or entries) per
/// unique combination of the chosen columns.
///
/// Examples:
///   medaltally --data athlete_events.csv --by Year,Season
///   medaltally --data athlete_events.csv --regions noc_regions.csv --by region --top 10
///   medaltally --data canada.csv --by Sport --sort-by gold --top 10 --format json
///   medaltally --data athlete_events.csv --by Age --mode entries --sex f
///   medaltally --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Results file (CSV with a header row)
    #[arg(short, long, value_name = "FILE", env = "MEDALTALLY_DATA")]
    pub data: Option<PathBuf>,

    /// NOC to region lookup file (columns NOC, region)
    ///
    /// Required to group or filter by region unless the results file
    /// already carries a region column.
    #[arg(long, value_name = "FILE")]
    pub regions: Option<PathBuf>,

    /// Field delimiter of the results file
    #[arg(long, value_name = "CHAR")]
    pub delimiter: Option<char>,

    /// Columns to group by (comma-separated, in order)
    ///
    /// Example: --by Year,Season
    #[arg(short, long, value_name = "COLUMNS", value_delimiter = ',')]
    pub by: Option<Vec<String>>,

    /// Count medals or every entry
    #[arg(short, long, value_name = "MODE")]
    pub mode: Option<ModeArg>,

    /// Sort rows descending by this column
    #[arg(short, long, value_name = "COLUMN")]
    pub sort_by: Option<SortColumn>,

    /// Keep only the first N rows (sorts by total unless --sort-by is given)
    #[arg(short, long, value_name = "N")]
    pub top: Option<usize>,

    /// Only this sport ("All Sports" for every sport)
    #[arg(long, value_name = "SPORT")]
    pub sport: Option<String>,

    /// Only this region ("All regions" for every region)
    #[arg(long, value_name = "REGION")]
    pub region: Option<String>,

    /// Only this NOC country code
    #[arg(long, value_name = "CODE")]
    pub noc: Option<String>,

    /// Only athletes of this sex
    #[arg(long, value_name = "SEX")]
    pub sex: Option<SexArg>,

    /// Only games of this season
    #[arg(long, value_name = "SEASON")]
    pub season: Option<SeasonArg>,

    /// Earliest year to include
    #[arg(long, value_name = "YEAR")]
    pub from: Option<i32>,

    /// Latest year to include
    #[arg(long, value_name = "YEAR")]
    pub to: Option<i32>,

    /// Output format
    #[arg(short, long, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Output file path (stdout when omitted)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .medaltally.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (errors only)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .medaltally.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Markdown table (default)
    #[default]
    Markdown,
    /// JSON document
    Json,
    /// CSV table
    Csv,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Markdown => "markdown",
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
        }
    }
}

/// Aggregation mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    /// Medal winners only, split into Gold/Silver/Bronze/Total
    Medals,
    /// Every entry, medal or not
    Entries,
}

impl ModeArg {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModeArg::Medals => "medals",
            ModeArg::Entries => "entries",
        }
    }
}

impl From<ModeArg> for AggregationMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Medals => AggregationMode::MedalsOnly,
            ModeArg::Entries => AggregationMode::AllEntries,
        }
    }
}

/// Sort column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SortColumn {
    Gold,
    Silver,
    Bronze,
    Total,
}

impl SortColumn {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortColumn::Gold => "gold",
            SortColumn::Silver => "silver",
            SortColumn::Bronze => "bronze",
            SortColumn::Total => "total",
        }
    }
}

impl From<SortColumn> for MedalColumn {
    fn from(column: SortColumn) -> Self {
        match column {
            SortColumn::Gold => MedalColumn::Gold,
            SortColumn::Silver => MedalColumn::Silver,
            SortColumn::Bronze => MedalColumn::Bronze,
            SortColumn::Total => MedalColumn::Total,
        }
    }
}

/// Sex filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SexArg {
    #[value(alias = "female")]
    F,
    #[value(alias = "male")]
    M,
}

impl From<SexArg> for Sex {
    fn from(sex: SexArg) -> Self {
        match sex {
            SexArg::F => Sex::Female,
            SexArg::M => Sex::Male,
        }
    }
}

/// Season filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SeasonArg {
    Summer,
    Winter,
}

impl From<SeasonArg> for Season {
    fn from(season: SeasonArg) -> Self {
        match season {
            SeasonArg::Summer => Season::Summer,
            SeasonArg::Winter => Season::Winter,
        }
    }
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let (Some(from), Some(to)) = (self.from, self.to) {
            if from > to {
                return Err(format!("--from ({}) must not be after --to ({})", from, to));
            }
        }

        if self.top == Some(0) {
            return Err("--top must be at least 1".to_string());
        }

        if let Some(ref by) = self.by {
            if by.iter().all(|c| c.trim().is_empty()) {
                return Err("--by needs at least one column".to_string());
            }
        }

        if let Some(delimiter) = self.delimiter {
            if !delimiter.is_ascii() {
                return Err("Delimiter must be a single ASCII character".to_string());
            }
        }

        for path in [&self.data, &self.regions].into_iter().flatten() {
            if !path.is_file() {
                return Err(format!("File does not exist: {}", path.display()));
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    ///
    /// `verbose_default` comes from the config file; `--quiet` overrides it.
    pub fn log_level(&self, verbose_default: bool) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose || verbose_default {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
