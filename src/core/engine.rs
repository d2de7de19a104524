use crate::core::list_view::{ListView, ListViewPipeline};
use crate::core::query::QueryParams;
use crate::core::reports::{self, DepartmentOverview, EmployeeReport, StudentStats};
use crate::core::view::{EntityKind, ViewDefinition};
use crate::domain::model::Record;
use crate::domain::ports::RecordSource;
use crate::utils::error::Result;
use std::collections::BTreeMap;

/// A configured list view: its table definition plus the built pipeline.
#[derive(Debug, Clone)]
pub struct EntityView {
    pub definition: ViewDefinition,
    pub pipeline: ListViewPipeline,
}

/// Loads record snapshots through an injected [`RecordSource`] and runs the
/// list-view pipeline over them.
pub struct ListViewEngine<S: RecordSource> {
    source: S,
    views: BTreeMap<EntityKind, EntityView>,
}

impl<S: RecordSource> ListViewEngine<S> {
    /// Builds every view up front so a bad view table fails before any load.
    pub fn new(source: S, overrides: &BTreeMap<EntityKind, ViewDefinition>) -> Result<Self> {
        let mut views = BTreeMap::new();
        for entity in EntityKind::ALL {
            let definition = overrides
                .get(&entity)
                .cloned()
                .unwrap_or_else(|| entity.builtin_definition());
            let pipeline = definition.pipeline()?;
            tracing::debug!(
                "🔧 {} view: table={}, sort keys=[{}]",
                entity,
                definition.table,
                pipeline.config().sort_keys().join(", ")
            );
            views.insert(entity, EntityView { definition, pipeline });
        }
        Ok(Self { source, views })
    }

    pub fn with_builtin_views(source: S) -> Result<Self> {
        Self::new(source, &BTreeMap::new())
    }

    pub fn view(&self, entity: EntityKind) -> &EntityView {
        // new() 已為每個 EntityKind 建立檢視
        &self.views[&entity]
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub async fn load(&self, entity: EntityKind) -> Result<Vec<Record>> {
        let table = &self.view(entity).definition.table;
        self.source.list_all(table).await
    }

    pub async fn get(&self, entity: EntityKind, id: i64) -> Result<Record> {
        let table = &self.view(entity).definition.table;
        self.source.get_by_id(table, id).await
    }

    /// Validates the query, loads a fresh snapshot, and applies the pipeline.
    pub async fn run(&self, entity: EntityKind, params: &QueryParams) -> Result<ListView> {
        let view = self.view(entity);
        view.pipeline.validate_params(params)?;

        let records = self.load(entity).await?;
        let result = view.pipeline.apply(&records, params)?;

        tracing::info!(
            "🔍 {}: {} of {} records visible (search={:?}, filters={})",
            entity,
            result.matched_count,
            result.total_count,
            params.search_text,
            params.exact_filters.len()
        );
        Ok(result)
    }

    pub async fn department_overview(&self) -> Result<DepartmentOverview> {
        let departments = self.load(EntityKind::Departments).await?;
        let employees = self.load(EntityKind::Employees).await?;
        Ok(reports::department_overview(&departments, &employees))
    }

    pub async fn employee_report(&self) -> Result<EmployeeReport> {
        let employees = self.load(EntityKind::Employees).await?;
        reports::employee_report(&employees)
    }

    pub async fn student_stats(&self) -> Result<StudentStats> {
        let students = self.load(EntityKind::Students).await?;
        Ok(reports::student_stats(&students))
    }
}
