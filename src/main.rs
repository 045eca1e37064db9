//! MedalTally - Olympic medal tables from the command line
//!
//! Loads an athlete results file, applies the requested filters, counts
//! medals (or entries) per group and writes the table as Markdown, JSON
//! or CSV.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Error (bad arguments, unreadable data, unknown column, etc.)

mod cli;
mod config;

use anyhow::{anyhow, bail, Context, Result};
use chrono::Utc;
use clap::ValueEnum;
use cli::{Args, ModeArg, OutputFormat, SortColumn};
use config::{Config, CONFIG_FILE_NAME};
use medaltally::analysis::{
    self, AggregationKey, AggregationMode, Dimension, MedalColumn, RowFilter,
};
use medaltally::data::{self, LoadOptions};
use medaltally::error::AggregateError;
use medaltally::models::{Report, ReportMetadata, ResultTable};
use medaltally::report;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // The config file can raise the log level, so load it first
    let (mut config, source) = match load_config(&args) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    };
    config.merge_with_args(&args);

    init_logging(args.log_level(config.general.verbose));

    info!("MedalTally v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);
    log_config_source(&source);

    if let Err(e) = run_tally(&args, config) {
        error!("Tally failed: {:#}", e);
        eprintln!("\nError: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Handle --init-config: generate a default .medaltally.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(CONFIG_FILE_NAME);

    if path.exists() {
        eprintln!(
            "{} already exists. Remove it first or edit it manually.",
            CONFIG_FILE_NAME
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", CONFIG_FILE_NAME))?;

    println!("Created {} with default settings.", CONFIG_FILE_NAME);
    println!("   Edit it to set the data files, grouping columns and report format.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
///
/// Logs go to stderr so a report written to stdout stays clean.
fn init_logging(level: tracing::Level) {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("Warning: a tracing subscriber was already installed");
    }
}

/// Run the complete load, filter, aggregate and report workflow.
fn run_tally(args: &Args, config: Config) -> Result<()> {
    let start_time = Instant::now();

    // Resolve the query before touching the data so bad input fails fast
    let key = AggregationKey::parse(&config.query.dimensions)
        .context("Invalid grouping columns")?;
    let mode: AggregationMode = ModeArg::from_str(&config.query.mode, true)
        .map_err(|e| anyhow!("Invalid mode '{}': {}", config.query.mode, e))?
        .into();
    let sort_by: Option<MedalColumn> = config
        .query
        .sort_by
        .as_deref()
        .map(|s| {
            SortColumn::from_str(s, true).map_err(|e| anyhow!("Invalid sort column '{}': {}", s, e))
        })
        .transpose()?
        .map(Into::into);
    let format = OutputFormat::from_str(&config.report.format, true)
        .map_err(|e| anyhow!("Invalid report format '{}': {}", config.report.format, e))?;

    // Step 1: Load the data
    let table = load_table(&config, !args.quiet)?;

    // Step 2: Filter
    let filter = build_filter(args);
    if filter.region.is_some() && !table.has_column(Dimension::Region) {
        return Err(AggregateError::FieldNotFound(Dimension::Region.column_name().to_string()))
            .context("Filtering by region needs --regions or a region column");
    }
    let filtered = filter.apply(&table);
    if !filter.is_empty() {
        info!(
            "{} of {} rows match: {}",
            filtered.len(),
            table.len(),
            filter.describe().join("; ")
        );
    }

    // Step 3: Aggregate
    info!("Counting {} by {}", mode, key);
    let mut tally = analysis::tally(&filtered, &key, mode)?;

    // Step 4: Order and truncate
    let order = tally.order_and_limit(sort_by, config.query.top);

    // Step 5: Build and write the report
    let metadata = ReportMetadata {
        source: config.data.results.clone(),
        dimensions: key.column_names(),
        dimension_labels: key.labels(),
        filters: filter.describe(),
        sorted_by: order.map(|c| c.to_string()),
        top: config.query.top,
        rows_considered: filtered.len(),
        generated_at: Utc::now(),
        duration_seconds: start_time.elapsed().as_secs_f64(),
    };
    let report = Report::new(metadata, tally);

    let output = match format {
        OutputFormat::Markdown => report::generate_markdown_report(&report),
        OutputFormat::Json => report::generate_json_report(&report)?,
        OutputFormat::Csv => report::generate_csv_report(&report)?,
    };

    match config.report.output {
        Some(ref path) => {
            std::fs::write(path, &output)
                .with_context(|| format!("Failed to write report to {}", path))?;
            info!("Report with {} rows saved to {}", report.tally.len(), path);
        }
        None => print!("{}", output),
    }

    Ok(())
}

/// Load the results file and join the region lookup if configured.
fn load_table(config: &Config, show_progress: bool) -> Result<ResultTable> {
    if !config.data.delimiter.is_ascii() {
        bail!("Delimiter must be a single ASCII character");
    }

    let options = LoadOptions {
        delimiter: config.data.delimiter as u8,
        show_progress,
    };

    let path = Path::new(&config.data.results);
    let mut table = data::load_results(path, &options)
        .with_context(|| format!("Failed to load results from {}", path.display()))?;

    if let Some(ref regions) = config.data.regions {
        let lookup = data::load_regions(Path::new(regions))
            .with_context(|| format!("Failed to load regions from {}", regions))?;
        table = table.with_regions(&lookup);
    }

    Ok(table)
}

/// Translate the filter flags into a row filter.
fn build_filter(args: &Args) -> RowFilter {
    let mut filter = RowFilter::new().with_years(args.from, args.to);

    if let Some(ref sport) = args.sport {
        filter = filter.with_sport(sport);
    }
    if let Some(ref region) = args.region {
        filter = filter.with_region(region);
    }
    if let Some(ref noc) = args.noc {
        filter = filter.with_noc(noc);
    }
    if let Some(sex) = args.sex {
        filter = filter.with_sex(sex.into());
    }
    if let Some(season) = args.season {
        filter = filter.with_season(season.into());
    }

    filter
}

/// Where the active configuration came from.
enum ConfigSource {
    Explicit(PathBuf),
    Default,
    Builtin,
    /// The default file exists but could not be used.
    Invalid(String),
}

/// Load configuration from file or use defaults.
///
/// Runs before logging is set up, so nothing is logged here; see
/// [`log_config_source`].
fn load_config(args: &Args) -> Result<(Config, ConfigSource)> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        let config = Config::load(config_path)?;
        return Ok((config, ConfigSource::Explicit(config_path.clone())));
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => Ok((config, ConfigSource::Default)),
        Ok(None) => Ok((Config::default(), ConfigSource::Builtin)),
        Err(e) => Ok((Config::default(), ConfigSource::Invalid(format!("{:#}", e)))),
    }
}

fn log_config_source(source: &ConfigSource) {
    match source {
        ConfigSource::Explicit(path) => info!("Loaded config from: {}", path.display()),
        ConfigSource::Default => info!("Loaded default config from {}", CONFIG_FILE_NAME),
        ConfigSource::Builtin => debug!("No config file found, using defaults"),
        ConfigSource::Invalid(e) => warn!("Failed to load config: {}", e),
    }
}
