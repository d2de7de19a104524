use crate::core::reports::{format_date, format_salary};
use crate::domain::model::Record;
use crate::utils::error::{Result, RosterError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Csv,
}

/// Renders the visible rows in the requested format.
pub fn render(records: &[Record], columns: &[String], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Table => Ok(render_table(records, columns)),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(records)?),
        OutputFormat::Csv => render_csv(records, columns),
    }
}

pub fn render_csv(records: &[Record], columns: &[String]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(columns)?;
    for record in records {
        writer.write_record(columns.iter().map(|column| record.text(column)))?;
    }

    let bytes = writer.into_inner().map_err(|e| RosterError::ProcessingError {
        message: format!("CSV buffer flush failed: {}", e),
    })?;
    String::from_utf8(bytes).map_err(|e| RosterError::ProcessingError {
        message: format!("CSV output is not UTF-8: {}", e),
    })
}

/// Plain-text table with padded columns. Salary and date columns use the
/// dashboard's display format.
pub fn render_table(records: &[Record], columns: &[String]) -> String {
    let rows: Vec<Vec<String>> = records
        .iter()
        .map(|record| columns.iter().map(|column| display_cell(record, column)).collect())
        .collect();

    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(i, column)| {
            rows.iter()
                .map(|row| row[i].chars().count())
                .chain(std::iter::once(column.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    push_row(&mut out, columns.iter().map(String::as_str), &widths);
    push_row(
        &mut out,
        widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>().iter().map(String::as_str),
        &widths,
    );
    for row in &rows {
        push_row(&mut out, row.iter().map(String::as_str), &widths);
    }
    out
}

fn push_row<'a>(out: &mut String, cells: impl Iterator<Item = &'a str>, widths: &[usize]) {
    let line = cells
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
        .collect::<Vec<_>>()
        .join("  ");
    out.push_str(line.trim_end());
    out.push('\n');
}

fn display_cell(record: &Record, column: &str) -> String {
    if column.ends_with("salary_c") {
        format_salary(record.get(column))
    } else if column.ends_with("date_c") || column.ends_with("date_of_birth_c") {
        format_date(record.get(column))
    } else {
        record.text(column)
    }
}
