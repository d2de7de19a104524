//! Dashboard summaries computed from record snapshots: stat cards,
//! status and salary distributions, department overview, student grades.

use crate::core::compare::{coerce_number, parse_instant, ComparatorKind, SortDirection};
use crate::core::list_view::ListViewConfig;
use crate::core::list_view::ListViewPipeline;
use crate::core::query::QueryParams;
use crate::domain::model::Record;
use crate::utils::error::Result;
use serde::Serialize;
use std::collections::BTreeMap;

pub const STATUS_ACTIVE: &str = "active";
pub const STATUS_INACTIVE: &str = "inactive";
pub const STATUS_ON_LEAVE: &str = "on_leave";
pub const STATUS_PENDING: &str = "pending";

/// 狀態選項（值, 顯示名稱）
pub const STATUS_OPTIONS: [(&str, &str); 4] = [
    (STATUS_ACTIVE, "Active"),
    (STATUS_INACTIVE, "Inactive"),
    (STATUS_ON_LEAVE, "On Leave"),
    (STATUS_PENDING, "Pending"),
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DepartmentCount {
    pub name: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmployeeStats {
    pub total_employees: usize,
    pub active_employees: usize,
    pub on_leave: usize,
    pub total_departments: usize,
    pub departments: Vec<DepartmentCount>,
}

/// Stat cards; departments are listed in order of first appearance.
pub fn employee_stats(employees: &[Record]) -> EmployeeStats {
    let mut departments: Vec<DepartmentCount> = Vec::new();
    for employee in employees {
        let name = employee.text("department_c");
        match departments.iter_mut().find(|d| d.name == name) {
            Some(entry) => entry.count += 1,
            None => departments.push(DepartmentCount { name, count: 1 }),
        }
    }

    EmployeeStats {
        total_employees: employees.len(),
        active_employees: count_status(employees, STATUS_ACTIVE),
        on_leave: count_status(employees, STATUS_ON_LEAVE),
        total_departments: departments.len(),
        departments,
    }
}

fn count_status(employees: &[Record], status: &str) -> usize {
    employees
        .iter()
        .filter(|employee| employee.text("status_c") == status)
        .count()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusSlice {
    pub status: &'static str,
    pub label: &'static str,
    pub count: usize,
}

pub fn status_distribution(employees: &[Record]) -> Vec<StatusSlice> {
    STATUS_OPTIONS
        .iter()
        .map(|&(status, label)| StatusSlice {
            status,
            label,
            count: count_status(employees, status),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalaryBucket {
    pub label: &'static str,
    pub min: f64,
    /// `None` 表示無上限
    pub max: Option<f64>,
    pub count: usize,
}

const SALARY_RANGES: [(&str, f64, Option<f64>); 5] = [
    ("Under $50K", 0.0, Some(50_000.0)),
    ("$50K - $75K", 50_000.0, Some(75_000.0)),
    ("$75K - $100K", 75_000.0, Some(100_000.0)),
    ("$100K - $125K", 100_000.0, Some(125_000.0)),
    ("Over $125K", 125_000.0, None),
];

/// Buckets are `[min, max)`. Records without a numeric salary are skipped.
pub fn salary_distribution(employees: &[Record]) -> Vec<SalaryBucket> {
    let salaries: Vec<f64> = numeric_salaries(employees).collect();
    SALARY_RANGES
        .iter()
        .map(|&(label, min, max)| SalaryBucket {
            label,
            min,
            max,
            count: salaries
                .iter()
                .filter(|s| **s >= min && max.map_or(true, |max| **s < max))
                .count(),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalarySummary {
    pub average: f64,
    pub highest: f64,
    pub lowest: f64,
}

pub fn salary_summary(employees: &[Record]) -> Option<SalarySummary> {
    let salaries: Vec<f64> = numeric_salaries(employees).collect();
    if salaries.is_empty() {
        return None;
    }
    let total: f64 = salaries.iter().sum();
    Some(SalarySummary {
        average: total / salaries.len() as f64,
        highest: salaries.iter().copied().fold(f64::MIN, f64::max),
        lowest: salaries.iter().copied().fold(f64::MAX, f64::min),
    })
}

fn numeric_salaries(employees: &[Record]) -> impl Iterator<Item = f64> + '_ {
    employees.iter().filter_map(|employee| match employee.get("salary_c") {
        Some(serde_json::Value::String(s)) if s.trim().is_empty() => None,
        value => coerce_number(value),
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DepartmentSummary {
    pub id: Option<i64>,
    pub name: String,
    pub manager: Option<String>,
    pub description: String,
    pub employee_count: usize,
}

impl DepartmentSummary {
    /// 仍有員工的部門不可刪除
    pub fn can_delete(&self) -> bool {
        self.employee_count == 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DepartmentOverview {
    pub departments: Vec<DepartmentSummary>,
    pub total_departments: usize,
    pub total_employees: usize,
    pub average_per_department: usize,
}

/// Department cards with employee counts recomputed from the employee
/// snapshot rather than trusting the stored `employee_count_c`.
pub fn department_overview(departments: &[Record], employees: &[Record]) -> DepartmentOverview {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for employee in employees {
        *counts.entry(employee.text("department_c")).or_default() += 1;
    }

    let summaries: Vec<DepartmentSummary> = departments
        .iter()
        .map(|department| {
            let name = department.text("name_c");
            let manager = Some(department.text("manager_c")).filter(|m| !m.is_empty());
            DepartmentSummary {
                id: department.id(),
                employee_count: counts.get(&name).copied().unwrap_or(0),
                description: department.text("description_c"),
                manager,
                name,
            }
        })
        .collect();

    let total_employees: usize = summaries.iter().map(|d| d.employee_count).sum();
    let average_per_department = if summaries.is_empty() {
        0
    } else {
        (total_employees as f64 / summaries.len() as f64).round() as usize
    };

    DepartmentOverview {
        total_departments: summaries.len(),
        total_employees,
        average_per_department,
        departments: summaries,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradeGroup {
    pub grade: i64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentStats {
    pub total_students: usize,
    pub grade_groups: Vec<GradeGroup>,
}

/// Grade groups ascend by grade; students without a numeric grade are not grouped.
pub fn student_stats(students: &[Record]) -> StudentStats {
    let mut groups: BTreeMap<i64, usize> = BTreeMap::new();
    for grade in students
        .iter()
        .filter_map(|student| coerce_number(student.get("grade_level_c")))
    {
        *groups.entry(grade as i64).or_default() += 1;
    }

    StudentStats {
        total_students: students.len(),
        grade_groups: groups
            .into_iter()
            .map(|(grade, count)| GradeGroup { grade, count })
            .collect(),
    }
}

/// The `limit` most recently started employees, newest first.
pub fn recent_hires(employees: &[Record], limit: usize) -> Result<Vec<Record>> {
    let pipeline = ListViewPipeline::new(
        ListViewConfig::builder()
            .sort_field("start_date_c", ComparatorKind::Chronological)
            .default_sort("start_date_c")
            .build()?,
    );
    let params = QueryParams::new().sort_by("start_date_c", SortDirection::Descending);
    let mut view = pipeline.apply(employees, &params)?;
    view.visible.truncate(limit);
    Ok(view.visible)
}

/// Everything the reports page shows for employees, from one snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmployeeReport {
    pub stats: EmployeeStats,
    pub status: Vec<StatusSlice>,
    pub salary_buckets: Vec<SalaryBucket>,
    pub salary: Option<SalarySummary>,
    pub recent_hires: Vec<Record>,
}

pub fn employee_report(employees: &[Record]) -> Result<EmployeeReport> {
    Ok(EmployeeReport {
        stats: employee_stats(employees),
        status: status_distribution(employees),
        salary_buckets: salary_distribution(employees),
        salary: salary_summary(employees),
        recent_hires: recent_hires(employees, RECENT_HIRES_LIMIT)?,
    })
}

pub const RECENT_HIRES_LIMIT: usize = 5;

/// `$75,000`; empty for zero or missing salaries.
pub fn format_salary(value: Option<&serde_json::Value>) -> String {
    let Some(amount) = coerce_number(value).filter(|n| *n != 0.0) else {
        return String::new();
    };
    let rounded = amount.round() as i64;
    let digits = rounded.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if rounded < 0 {
        format!("-${}", grouped)
    } else {
        format!("${}", grouped)
    }
}

/// `Mar 1, 2023`; empty when the value is not a date.
pub fn format_date(value: Option<&serde_json::Value>) -> String {
    parse_instant(value)
        .map(|instant| instant.format("%b %-d, %Y").to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn employee(id: i64, department: &str, status: &str, salary: serde_json::Value) -> Record {
        Record::new()
            .with("Id", id)
            .with("department_c", department)
            .with("status_c", status)
            .with("salary_c", salary)
    }

    fn staff() -> Vec<Record> {
        vec![
            employee(1, "Engineering", "active", json!(120000)),
            employee(2, "Sales", "on_leave", json!(48000)),
            employee(3, "Engineering", "active", json!("75000")),
            employee(4, "Marketing", "pending", json!(null)),
            employee(5, "Sales", "inactive", json!(130000)),
        ]
    }

    #[test]
    fn test_employee_stats() {
        let stats = employee_stats(&staff());
        assert_eq!(stats.total_employees, 5);
        assert_eq!(stats.active_employees, 2);
        assert_eq!(stats.on_leave, 1);
        assert_eq!(stats.total_departments, 3);
        assert_eq!(
            stats.departments[0],
            DepartmentCount {
                name: "Engineering".to_string(),
                count: 2
            }
        );
        assert_eq!(stats.departments[2].name, "Marketing");
    }

    #[test]
    fn test_status_distribution_covers_every_status() {
        let slices = status_distribution(&staff());
        let counts: Vec<usize> = slices.iter().map(|s| s.count).collect();
        assert_eq!(counts, vec![2, 1, 1, 1]);
        assert_eq!(slices[2].label, "On Leave");
    }

    #[test]
    fn test_salary_distribution_bucket_edges() {
        let buckets = salary_distribution(&staff());
        let counts: Vec<usize> = buckets.iter().map(|b| b.count).collect();
        // 75000 落在 [75K, 100K)；null 不計
        assert_eq!(counts, vec![1, 0, 1, 1, 1]);
    }

    #[test]
    fn test_salary_summary() {
        let summary = salary_summary(&staff()).unwrap();
        assert_eq!(summary.highest, 130000.0);
        assert_eq!(summary.lowest, 48000.0);
        assert_eq!(summary.average, (120000.0 + 48000.0 + 75000.0 + 130000.0) / 4.0);

        assert!(salary_summary(&[]).is_none());
    }

    #[test]
    fn test_department_overview_recounts_employees() {
        let departments = vec![
            Record::new()
                .with("Id", 1)
                .with("name_c", "Engineering")
                .with("manager_c", "Grace Hopper")
                .with("employee_count_c", 40),
            Record::new().with("Id", 2).with("name_c", "Sales"),
            Record::new().with("Id", 3).with("name_c", "Legal"),
        ];

        let overview = department_overview(&departments, &staff());
        assert_eq!(overview.total_departments, 3);
        assert_eq!(overview.departments[0].employee_count, 2);
        assert_eq!(overview.departments[0].manager.as_deref(), Some("Grace Hopper"));
        assert_eq!(overview.departments[1].manager, None);
        assert!(overview.departments[2].can_delete());
        assert!(!overview.departments[1].can_delete());
        assert_eq!(overview.total_employees, 4);
        assert_eq!(overview.average_per_department, 1);

        assert_eq!(department_overview(&[], &staff()).average_per_department, 0);
    }

    #[test]
    fn test_student_stats_groups_ascending() {
        let students = vec![
            Record::new().with("grade_level_c", 11),
            Record::new().with("grade_level_c", "9"),
            Record::new().with("grade_level_c", 11),
            Record::new(),
        ];
        let stats = student_stats(&students);
        assert_eq!(stats.total_students, 4);
        assert_eq!(
            stats.grade_groups,
            vec![GradeGroup { grade: 9, count: 1 }, GradeGroup { grade: 11, count: 2 }]
        );
    }

    #[test]
    fn test_recent_hires_newest_first() {
        let employees = vec![
            Record::new().with("Id", 1).with("start_date_c", "2021-07-15"),
            Record::new().with("Id", 2).with("start_date_c", "2023-03-01"),
            Record::new().with("Id", 3).with("start_date_c", ""),
            Record::new().with("Id", 4).with("start_date_c", "2022-01-10"),
        ];
        let recent = recent_hires(&employees, 2).unwrap();
        let ids: Vec<i64> = recent.iter().filter_map(Record::id).collect();
        assert_eq!(ids, vec![2, 4]);
    }

    #[test]
    fn test_formatters() {
        assert_eq!(format_salary(Some(&json!(75000))), "$75,000");
        assert_eq!(format_salary(Some(&json!("1234567.6"))), "$1,234,568");
        assert_eq!(format_salary(Some(&json!(999))), "$999");
        assert_eq!(format_salary(Some(&json!(0))), "");
        assert_eq!(format_salary(None), "");

        assert_eq!(format_date(Some(&json!("2023-03-01"))), "Mar 1, 2023");
        assert_eq!(format_date(Some(&json!("not a date"))), "");
    }
}
