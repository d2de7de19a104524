use crate::core::compare::ComparatorKind;
use crate::core::list_view::{ListViewConfig, ListViewPipeline};
use crate::domain::model::{Record, ID_FIELD};
use crate::utils::error::{Result, RosterError};
use crate::utils::validation::{validate_field_names, validate_non_empty_string};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-entity view table, loadable from `[views.<entity>]` in the config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewDefinition {
    pub table: String,
    pub noun: String,
    pub searchable_fields: Vec<String>,
    pub sort_fields: BTreeMap<String, ComparatorKind>,
    /// 衍生鍵：以空白串接的欄位清單（例如 full_name = first + last）
    #[serde(default)]
    pub derived_keys: BTreeMap<String, Vec<String>>,
    /// 衍生鍵的比較方式，預設為不分大小寫字串
    #[serde(default)]
    pub derived_sort: BTreeMap<String, ComparatorKind>,
    pub default_sort: String,
    /// 表格欄位；未設定時為 Id + 可搜尋欄位 + 可排序欄位
    #[serde(default)]
    pub columns: Vec<String>,
}

impl ViewDefinition {
    pub fn display_columns(&self) -> Vec<String> {
        if !self.columns.is_empty() {
            return self.columns.clone();
        }
        let mut columns = vec![ID_FIELD.to_string()];
        for field in self.searchable_fields.iter().chain(self.sort_fields.keys()) {
            if !columns.contains(field) {
                columns.push(field.clone());
            }
        }
        columns
    }

    pub fn build_config(&self) -> Result<ListViewConfig> {
        validate_non_empty_string("table", &self.table)?;

        let mut builder = ListViewConfig::builder()
            .searchable(self.searchable_fields.iter().cloned())
            .default_sort(self.default_sort.clone());

        for (field, kind) in &self.sort_fields {
            builder = builder.sort_field(field.clone(), *kind);
        }

        for (name, parts) in &self.derived_keys {
            validate_field_names(&format!("derived_keys.{}", name), parts)?;
            if parts.is_empty() {
                return Err(RosterError::InvalidConfigValueError {
                    field: format!("derived_keys.{}", name),
                    value: String::new(),
                    reason: "Derived key needs at least one field".to_string(),
                });
            }
            let parts = parts.clone();
            let kind = self.derived_sort.get(name).copied().unwrap_or_default();
            builder = builder.derived_key_with(name.clone(), kind, move |record: &Record| {
                joined_fields(record, &parts)
            });
        }

        builder.build()
    }

    pub fn pipeline(&self) -> Result<ListViewPipeline> {
        Ok(ListViewPipeline::new(self.build_config()?))
    }
}

fn joined_fields(record: &Record, parts: &[String]) -> serde_json::Value {
    let joined = parts
        .iter()
        .map(|field| record.text(field))
        .collect::<Vec<_>>()
        .join(" ");
    serde_json::Value::String(joined.trim().to_string())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum EntityKind {
    Employees,
    Students,
    Departments,
}

impl EntityKind {
    pub const ALL: [EntityKind; 3] = [
        EntityKind::Employees,
        EntityKind::Students,
        EntityKind::Departments,
    ];

    pub fn key(self) -> &'static str {
        match self {
            EntityKind::Employees => "employees",
            EntityKind::Students => "students",
            EntityKind::Departments => "departments",
        }
    }

    /// 外部服務的欄位名稱（*_c）為準
    pub fn builtin_definition(self) -> ViewDefinition {
        match self {
            EntityKind::Employees => ViewDefinition {
                table: "employees_c".to_string(),
                noun: "employees".to_string(),
                searchable_fields: strings(&[
                    "first_name_c",
                    "last_name_c",
                    "email_c",
                    "department_c",
                    "role_c",
                ]),
                sort_fields: sort_table(&[
                    ("first_name_c", ComparatorKind::Lexicographic),
                    ("last_name_c", ComparatorKind::Lexicographic),
                    ("email_c", ComparatorKind::Lexicographic),
                    ("department_c", ComparatorKind::Lexicographic),
                    ("role_c", ComparatorKind::Lexicographic),
                    ("status_c", ComparatorKind::Lexicographic),
                    ("salary_c", ComparatorKind::Numeric),
                    ("start_date_c", ComparatorKind::Chronological),
                ]),
                derived_keys: full_name_key(),
                derived_sort: BTreeMap::new(),
                default_sort: "first_name_c".to_string(),
                columns: strings(&[
                    "Id",
                    "first_name_c",
                    "last_name_c",
                    "email_c",
                    "department_c",
                    "role_c",
                    "status_c",
                    "salary_c",
                    "start_date_c",
                ]),
            },
            EntityKind::Students => ViewDefinition {
                table: "students_c".to_string(),
                noun: "students".to_string(),
                searchable_fields: strings(&["first_name_c", "last_name_c", "email_c", "Tags"]),
                sort_fields: sort_table(&[
                    ("first_name_c", ComparatorKind::Lexicographic),
                    ("last_name_c", ComparatorKind::Lexicographic),
                    ("email_c", ComparatorKind::Lexicographic),
                    ("grade_level_c", ComparatorKind::Numeric),
                    ("date_of_birth_c", ComparatorKind::Chronological),
                ]),
                derived_keys: full_name_key(),
                derived_sort: BTreeMap::new(),
                default_sort: "first_name_c".to_string(),
                columns: strings(&[
                    "Id",
                    "first_name_c",
                    "last_name_c",
                    "email_c",
                    "grade_level_c",
                    "date_of_birth_c",
                    "Tags",
                ]),
            },
            EntityKind::Departments => ViewDefinition {
                table: "departments_c".to_string(),
                noun: "departments".to_string(),
                searchable_fields: strings(&["name_c", "manager_c", "description_c"]),
                sort_fields: sort_table(&[
                    ("name_c", ComparatorKind::Lexicographic),
                    ("manager_c", ComparatorKind::Lexicographic),
                    ("employee_count_c", ComparatorKind::Numeric),
                ]),
                derived_keys: BTreeMap::new(),
                derived_sort: BTreeMap::new(),
                default_sort: "name_c".to_string(),
                // 員工人數以 `departments` 指令重新計算的為準，不顯示儲存值
                columns: strings(&["Id", "name_c", "manager_c", "description_c"]),
            },
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn sort_table(items: &[(&str, ComparatorKind)]) -> BTreeMap<String, ComparatorKind> {
    items.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

fn full_name_key() -> BTreeMap<String, Vec<String>> {
    BTreeMap::from([(
        "full_name".to_string(),
        strings(&["first_name_c", "last_name_c"]),
    )])
}
