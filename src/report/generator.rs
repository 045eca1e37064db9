//! Report generation.
//!
//! Renders a tally as a Markdown document, a JSON document or a CSV table.

use crate::analysis::{generate_summary_text, MedalTotals, Tally};
use crate::models::{Report, ReportMetadata};
use anyhow::Result;
use std::io::Write;

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &Report) -> String {
    let mut output = String::new();

    output.push_str(&format!("# {}\n\n", report_title(report)));

    output.push_str(&generate_metadata_section(&report.metadata));

    if let Some(ref totals) = report.totals {
        output.push_str(&generate_totals_section(totals));
    }

    output.push_str(&generate_table_section(
        &heading_labels(&report.metadata),
        &report.tally,
    ));

    output.push_str(&generate_footer());

    output
}

fn report_title(report: &Report) -> String {
    let what = match report.tally {
        Tally::Medals(_) => "Medal tally",
        Tally::Entries(_) => "Entry count",
    };

    let by = heading_labels(&report.metadata).join(", ");

    match report.metadata.top {
        Some(_) => format!("{} by {}, top {}", what, by, report.tally.len()),
        None => format!("{} by {}", what, by),
    }
}

/// Display labels for the grouping columns, column names if none were set.
fn heading_labels(metadata: &ReportMetadata) -> Vec<String> {
    if metadata.dimension_labels.len() == metadata.dimensions.len() {
        metadata.dimension_labels.clone()
    } else {
        metadata.dimensions.clone()
    }
}

/// Escape a value for use inside a Markdown table cell.
fn escape_cell(value: &str) -> String {
    value.replace('|', "\\|")
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Source:** `{}`\n", metadata.source));
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!(
        "- **Grouped by:** {}\n",
        heading_labels(metadata).join(", ")
    ));
    if metadata.filters.is_empty() {
        section.push_str("- **Filters:** none\n");
    } else {
        section.push_str(&format!("- **Filters:** {}\n", metadata.filters.join("; ")));
    }
    if let Some(ref column) = metadata.sorted_by {
        section.push_str(&format!("- **Sorted by:** {} (descending)\n", column));
    }
    section.push_str(&format!(
        "- **Rows considered:** {}\n",
        metadata.rows_considered
    ));
    section.push_str(&format!(
        "- **Duration:** {:.2}s\n",
        metadata.duration_seconds
    ));
    section.push('\n');

    section
}

/// Generate the medals-shown section.
fn generate_totals_section(totals: &MedalTotals) -> String {
    let mut section = String::new();

    section.push_str("## Medals Shown\n\n");
    section.push_str(&generate_summary_text(totals));
    section.push_str("\n\n");

    section
}

/// Generate the results table.
fn generate_table_section(labels: &[String], tally: &Tally) -> String {
    let mut section = String::new();

    section.push_str("## Results\n\n");

    if tally.is_empty() {
        section.push_str("No rows matched.\n\n");
        return section;
    }

    let counts = count_headers(tally);
    let header: Vec<String> = labels
        .iter()
        .map(|l| escape_cell(l))
        .chain(counts.iter().map(|c| c.to_string()))
        .collect();

    section.push_str(&format!("| {} |\n", header.join(" | ")));
    let alignment: Vec<&str> = labels
        .iter()
        .map(|_| ":---")
        .chain(counts.iter().map(|_| "---:"))
        .collect();
    section.push_str(&format!("|{}|\n", alignment.join("|")));

    for cells in table_cells(tally) {
        let cells: Vec<String> = cells.iter().map(|c| escape_cell(c)).collect();
        section.push_str(&format!("| {} |\n", cells.join(" | ")));
    }
    section.push('\n');

    section
}

/// Generate the report footer.
fn generate_footer() -> String {
    "---\n\n*Report generated by MedalTally*\n".to_string()
}

fn count_headers(tally: &Tally) -> &'static [&'static str] {
    match tally {
        Tally::Medals(_) => &["Gold", "Silver", "Bronze", "Total"],
        Tally::Entries(_) => &["Entries"],
    }
}

/// Each row as display strings: key values then counts.
fn table_cells(tally: &Tally) -> Vec<Vec<String>> {
    match tally {
        Tally::Medals(rows) => rows
            .iter()
            .map(|r| {
                let mut cells: Vec<String> = r.key.iter().map(ToString::to_string).collect();
                cells.extend([r.gold, r.silver, r.bronze, r.total].map(|c| c.to_string()));
                cells
            })
            .collect(),
        Tally::Entries(rows) => rows
            .iter()
            .map(|r| {
                let mut cells: Vec<String> = r.key.iter().map(ToString::to_string).collect();
                cells.push(r.entries.to_string());
                cells
            })
            .collect(),
    }
}

/// Generate a JSON report.
pub fn generate_json_report(report: &Report) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

/// Write the tally as CSV: one column per dimension, then the counts.
pub fn write_csv_report<W: Write>(report: &Report, writer: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);

    let header: Vec<&str> = report
        .metadata
        .dimensions
        .iter()
        .map(String::as_str)
        .chain(count_headers(&report.tally).iter().copied())
        .collect();
    writer.write_record(&header)?;

    for cells in table_cells(&report.tally) {
        writer.write_record(&cells)?;
    }

    writer.flush()?;
    Ok(())
}

/// Generate a CSV report as a string.
pub fn generate_csv_report(report: &Report) -> Result<String> {
    let mut buffer = Vec::new();
    write_csv_report(report, &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{DimensionValue, EntryCountRow, MedalCountRow};
    use chrono::Utc;

    fn create_test_metadata() -> ReportMetadata {
        ReportMetadata {
            source: "data/athlete_events.csv".to_string(),
            dimensions: vec!["Year".to_string(), "Season".to_string()],
            dimension_labels: vec!["Year".to_string(), "Season".to_string()],
            filters: vec!["region = Canada".to_string()],
            sorted_by: Some("Total".to_string()),
            top: Some(10),
            rows_considered: 42,
            generated_at: Utc::now(),
            duration_seconds: 0.25,
        }
    }

    fn create_test_report() -> Report {
        Report::new(
            create_test_metadata(),
            Tally::Medals(vec![
                MedalCountRow::from_counts(
                    vec![DimensionValue::Int(2010), "Winter".into()],
                    [14, 7, 5],
                ),
                MedalCountRow::from_counts(
                    vec![DimensionValue::Int(2016), "Summer".into()],
                    [4, 3, 15],
                ),
            ]),
        )
    }

    #[test]
    fn test_generate_markdown_report() {
        let report = create_test_report();
        let markdown = generate_markdown_report(&report);

        assert!(markdown.contains("# Medal tally by Year, Season, top 2\n"));
        assert!(markdown.contains("## Metadata"));
        assert!(markdown.contains("region = Canada"));
        assert!(markdown.contains("## Medals Shown"));
        assert!(markdown.contains("Total: 48"));
        assert!(markdown.contains("| Year | Season | Gold | Silver | Bronze | Total |"));
        assert!(markdown.contains("| 2010 | Winter | 14 | 7 | 5 | 26 |"));
    }

    #[test]
    fn test_generate_markdown_for_entries() {
        let report = Report::new(
            create_test_metadata(),
            Tally::Entries(vec![EntryCountRow {
                key: vec![DimensionValue::Int(2010), "Winter".into()],
                entries: 206,
            }]),
        );
        let markdown = generate_markdown_report(&report);

        assert!(markdown.starts_with("# Entry count by Year, Season"));
        assert!(!markdown.contains("## Medals Shown"));
        assert!(markdown.contains("| 2010 | Winter | 206 |"));
    }

    #[test]
    fn test_generate_markdown_empty_table() {
        let report = Report::new(create_test_metadata(), Tally::Medals(Vec::new()));
        let markdown = generate_markdown_report(&report);
        assert!(markdown.contains("No rows matched."));
    }

    #[test]
    fn test_markdown_uses_dimension_labels() {
        let mut metadata = create_test_metadata();
        metadata.dimensions = vec!["Age".to_string(), "NOC".to_string()];
        metadata.dimension_labels = vec!["Athlete ages".to_string(), "Country code".to_string()];
        metadata.top = None;
        let report = Report::new(
            metadata,
            Tally::Medals(vec![MedalCountRow::from_counts(
                vec![DimensionValue::Int(23), "NOR".into()],
                [1, 0, 0],
            )]),
        );

        let markdown = generate_markdown_report(&report);

        assert!(markdown.starts_with("# Medal tally by Athlete ages, Country code\n"));
        assert!(markdown.contains("Grouped by:** Athlete ages, Country code"));
        assert!(markdown.contains("| Athlete ages | Country code | Gold | Silver | Bronze | Total |"));

        let csv = generate_csv_report(&report).unwrap();
        assert!(csv.starts_with("Age,NOC,Gold,Silver,Bronze,Total"));
    }

    #[test]
    fn test_markdown_escapes_pipes_in_cells() {
        let mut metadata = create_test_metadata();
        metadata.dimensions = vec!["Event".to_string()];
        metadata.dimension_labels = vec!["Sport event".to_string()];
        let report = Report::new(
            metadata,
            Tally::Medals(vec![MedalCountRow::from_counts(
                vec!["Sailing | Mixed Two Person".into()],
                [0, 1, 0],
            )]),
        );

        let markdown = generate_markdown_report(&report);

        assert!(markdown.contains("| Sailing \\| Mixed Two Person | 0 | 1 | 0 | 1 |"));
        assert!(markdown.contains("# Medal tally by Sport event, top 1\n"));
    }

    #[test]
    fn test_generate_metadata_section() {
        let mut metadata = create_test_metadata();
        metadata.filters.clear();
        metadata.sorted_by = None;

        let section = generate_metadata_section(&metadata);

        assert!(section.contains("data/athlete_events.csv"));
        assert!(section.contains("Filters:** none"));
        assert!(section.contains("Rows considered:** 42"));
        assert!(!section.contains("Sorted by"));
    }

    #[test]
    fn test_generate_json_report() {
        let report = create_test_report();
        let json = generate_json_report(&report).unwrap();

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["tally"]["mode"], "medals");
        assert_eq!(value["tally"]["rows"][0]["key"][0], 2010);
        assert_eq!(value["tally"]["rows"][0]["total"], 26);
        assert_eq!(value["totals"]["bronze"], 20);
    }

    #[test]
    fn test_generate_csv_report() {
        let report = create_test_report();
        let csv = generate_csv_report(&report).unwrap();

        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("Year,Season,Gold,Silver,Bronze,Total"));
        assert_eq!(lines.next(), Some("2010,Winter,14,7,5,26"));
        assert_eq!(lines.next(), Some("2016,Summer,4,3,15,22"));
        assert_eq!(lines.next(), None);
    }
}
