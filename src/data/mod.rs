//! Loading of result tables from delimited text.
//!
//! The results file has a header row and one entry per line. Cells that
//! read `NA` (or are empty) become absent values. The optional NOC lookup
//! file maps country codes to country names.

use crate::analysis::Dimension;
use crate::error::LoadError;
use crate::models::{Medal, ResultRow, ResultTable, Season, Sex};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info};

/// Columns every results file must carry.
pub const REQUIRED_COLUMNS: &[&str] = &["ID", "Medal"];

/// Markers for a missing value in the source data.
const MISSING_MARKERS: &[&str] = &["NA", "NaN", "nan"];

/// Options for loading a results file.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Field delimiter.
    pub delimiter: u8,
    /// Whether to show a spinner while reading.
    pub show_progress: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            show_progress: false,
        }
    }
}

/// One line of the results file, as text.
#[derive(Debug, Deserialize)]
struct RawResult {
    #[serde(rename = "ID")]
    id: String,
    #[serde(rename = "Name", default)]
    name: Option<String>,
    #[serde(rename = "Sex", default)]
    sex: Option<String>,
    #[serde(rename = "Age", default)]
    age: Option<String>,
    #[serde(rename = "Height", default)]
    height: Option<String>,
    #[serde(rename = "Weight", default)]
    weight: Option<String>,
    #[serde(rename = "Team", default)]
    team: Option<String>,
    #[serde(rename = "NOC", default)]
    noc: Option<String>,
    #[serde(rename = "Games", default)]
    games: Option<String>,
    #[serde(rename = "Year", default)]
    year: Option<String>,
    #[serde(rename = "Season", default)]
    season: Option<String>,
    #[serde(rename = "City", default)]
    city: Option<String>,
    #[serde(rename = "Sport", default)]
    sport: Option<String>,
    #[serde(rename = "Event", default)]
    event: Option<String>,
    #[serde(rename = "Medal", default)]
    medal: Option<String>,
    #[serde(default)]
    region: Option<String>,
}

impl RawResult {
    fn into_row(self, line: u64) -> Result<ResultRow, LoadError> {
        let id = parse_int(&self.id)
            .and_then(|v| u32::try_from(v).ok())
            .ok_or_else(|| invalid(line, "ID", &self.id))?;

        Ok(ResultRow {
            id,
            name: present(self.name),
            sex: parse_field::<Sex>(self.sex, line, "Sex")?,
            age: parse_int_field(self.age, line, "Age")?
                .map(u32::try_from)
                .transpose()
                .map_err(|_| invalid(line, "Age", "negative"))?,
            height: parse_field::<f64>(self.height, line, "Height")?,
            weight: parse_field::<f64>(self.weight, line, "Weight")?,
            team: present(self.team),
            noc: present(self.noc),
            games: present(self.games),
            year: parse_int_field(self.year, line, "Year")?
                .map(i32::try_from)
                .transpose()
                .map_err(|_| invalid(line, "Year", "out of range"))?,
            season: parse_field::<Season>(self.season, line, "Season")?,
            city: present(self.city),
            sport: present(self.sport),
            event: present(self.event),
            medal: parse_field::<Medal>(self.medal, line, "Medal")?,
            region: present(self.region),
        })
    }
}

/// One line of the NOC lookup file.
#[derive(Debug, Deserialize)]
struct RawRegion {
    #[serde(rename = "NOC")]
    noc: String,
    #[serde(default)]
    region: Option<String>,
}

/// Load a results file from disk.
pub fn load_results(path: &Path, options: &LoadOptions) -> Result<ResultTable, LoadError> {
    info!("Loading results from {}", path.display());

    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })?;

    read_results(file, options)
}

/// Read results from any byte source.
pub fn read_results<R: Read>(source: R, options: &LoadOptions) -> Result<ResultTable, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(options.delimiter)
        .trim(csv::Trim::All)
        .from_reader(source);

    let headers = reader.headers()?.clone();
    for required in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == *required) {
            return Err(LoadError::MissingColumn(required.to_string()));
        }
    }

    let schema: Vec<Dimension> = Dimension::ALL
        .iter()
        .copied()
        .filter(|d| headers.iter().any(|h| h == d.column_name()))
        .collect();
    debug!(
        "Result columns: {}",
        schema
            .iter()
            .map(|d| d.column_name())
            .collect::<Vec<_>>()
            .join(", ")
    );

    let progress = spinner(options.show_progress);
    let mut rows = Vec::new();

    for record in reader.records() {
        let record = record?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let raw: RawResult = record.deserialize(Some(&headers))?;
        rows.push(raw.into_row(line)?);

        if rows.len() % 10_000 == 0 {
            progress.set_message(format!("Read {} rows", rows.len()));
        }
    }

    progress.finish_and_clear();
    info!("Loaded {} result rows", rows.len());

    Ok(ResultTable::with_schema(rows, schema))
}

/// Load the NOC to country-name lookup from disk.
pub fn load_regions(path: &Path) -> Result<HashMap<String, String>, LoadError> {
    info!("Loading NOC regions from {}", path.display());

    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })?;

    read_regions(file)
}

/// Read the NOC lookup from any byte source. Codes without a region are skipped.
pub fn read_regions<R: Read>(source: R) -> Result<HashMap<String, String>, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(source);

    let headers = reader.headers()?.clone();
    for required in ["NOC", "region"] {
        if !headers.iter().any(|h| h == required) {
            return Err(LoadError::MissingColumn(required.to_string()));
        }
    }

    let mut regions = HashMap::new();
    for record in reader.deserialize::<RawRegion>() {
        let record = record?;
        if let Some(region) = present(record.region) {
            regions.insert(record.noc, region);
        }
    }

    debug!("Loaded {} NOC regions", regions.len());
    Ok(regions)
}

fn spinner(show: bool) -> ProgressBar {
    if !show {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.set_message("Reading results...");
    pb
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty() && !MISSING_MARKERS.contains(&v.as_str()))
}

fn invalid(line: u64, column: &'static str, value: &str) -> LoadError {
    LoadError::InvalidValue {
        line,
        column,
        value: value.to_string(),
    }
}

fn parse_field<T: FromStr>(
    value: Option<String>,
    line: u64,
    column: &'static str,
) -> Result<Option<T>, LoadError> {
    present(value)
        .map(|v| v.parse::<T>().map_err(|_| invalid(line, column, &v)))
        .transpose()
}

/// Integers written as `24` or `24.0` (the latter when a float column held gaps).
fn parse_int(value: &str) -> Option<i64> {
    value.parse::<i64>().ok().or_else(|| {
        value
            .parse::<f64>()
            .ok()
            .filter(|f| f.fract() == 0.0)
            .map(|f| f as i64)
    })
}

fn parse_int_field(
    value: Option<String>,
    line: u64,
    column: &'static str,
) -> Result<Option<i64>, LoadError> {
    present(value)
        .map(|v| parse_int(&v).ok_or_else(|| invalid(line, column, &v)))
        .transpose()
}
