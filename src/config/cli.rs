use crate::core::compare::SortDirection;
use crate::core::export::OutputFormat;
use crate::core::query::QueryParams;
use crate::core::view::EntityKind;
use crate::utils::error::{Result, RosterError};
use crate::utils::validation::{validate_non_empty_string, validate_path, Validate};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "staff-roster")]
#[command(about = "Search, filter and sort employee, student and department records")]
pub struct Cli {
    #[arg(long, help = "TOML config file")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Read <table>.json snapshots from this directory instead of the API")]
    pub data_dir: Option<PathBuf>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List records of one entity through the search/filter/sort pipeline
    List(ListArgs),
    /// Department summaries with employee counts
    Departments,
    /// Dashboard reports
    Report {
        #[arg(value_enum)]
        kind: ReportKind,
    },
}

#[derive(Debug, Args)]
pub struct ListArgs {
    #[arg(value_enum)]
    pub entity: EntityKind,

    #[arg(long, default_value = "")]
    pub search: String,

    /// FIELD=VALUE, repeatable; an empty VALUE means "All"
    #[arg(long = "filter", value_parser = parse_filter)]
    pub filters: Vec<(String, String)>,

    #[arg(long)]
    pub sort: Option<String>,

    #[arg(long)]
    pub desc: bool,

    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    #[arg(long)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportKind {
    Overview,
    Salary,
    Status,
    Students,
}

fn parse_filter(raw: &str) -> std::result::Result<(String, String), String> {
    let (field, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected FIELD=VALUE, got '{}'", raw))?;
    Ok((field.trim().to_string(), value.to_string()))
}

impl ListArgs {
    pub fn query_params(&self) -> QueryParams {
        let direction = if self.desc {
            SortDirection::Descending
        } else {
            SortDirection::Ascending
        };

        let mut params = QueryParams::new().search(self.search.clone());
        for (field, value) in &self.filters {
            params = params.filter(field.clone(), value.clone());
        }
        if let Some(key) = &self.sort {
            params = params.sort_by(key.clone(), direction);
        } else {
            params.sort_direction = direction;
        }
        params
    }
}

impl Validate for ListArgs {
    fn validate(&self) -> Result<()> {
        for (field, _) in &self.filters {
            validate_non_empty_string("--filter", field)?;
        }
        if let Some(key) = &self.sort {
            validate_non_empty_string("--sort", key)?;
        }
        if let Some(path) = &self.output {
            let path = path.to_str().ok_or_else(|| RosterError::InvalidConfigValueError {
                field: "--output".to_string(),
                value: path.display().to_string(),
                reason: "Path is not valid UTF-8".to_string(),
            })?;
            validate_path("--output", path)?;
        }
        Ok(())
    }
}
