pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use adapters::{JsonFileSource, RemoteRecordSource};
pub use config::TomlConfig;
pub use core::{
    ComparatorKind, EntityKind, ListView, ListViewConfig, ListViewEngine, ListViewPipeline,
    OutputFormat, QueryParams, SortDirection, ViewDefinition,
};
pub use domain::{model::Record, ports::RecordSource};
pub use utils::error::{Result, RosterError};
