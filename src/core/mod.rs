pub mod compare;
pub mod engine;
pub mod export;
pub mod list_view;
pub mod query;
pub mod reports;
pub mod view;

pub use compare::{ComparatorKind, SortDirection};
pub use engine::{EntityView, ListViewEngine};
pub use export::OutputFormat;
pub use list_view::{ListView, ListViewConfig, ListViewPipeline};
pub use query::QueryParams;
pub use view::{EntityKind, ViewDefinition};
