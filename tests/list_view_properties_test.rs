use serde_json::{json, Value};
use staff_roster::core::list_view::ListViewPipeline;
use staff_roster::{
    ComparatorKind, EntityKind, ListViewConfig, QueryParams, Record, SortDirection,
};

fn employee(id: i64, first: &str, last: &str, department: &str, salary: Value) -> Record {
    Record::new()
        .with("Id", id)
        .with("first_name_c", first)
        .with("last_name_c", last)
        .with("email_c", format!("{}.{}@example.com", first, last).to_lowercase())
        .with("department_c", department)
        .with("role_c", "Staff")
        .with("salary_c", salary)
}

fn roster() -> Vec<Record> {
    vec![
        employee(1, "John", "Smith", "Sales", json!(60000)),
        employee(2, "Alice", "Jones", "Engineering", json!(95000)),
        employee(3, "Jane", "Smith", "Engineering", json!("88000")),
        employee(4, "Bob", "Brown", "Marketing", json!(null)),
        employee(5, "Carol", "White", "Engineering", json!(72000)),
    ]
}

fn ids(records: &[Record]) -> Vec<i64> {
    records.iter().filter_map(Record::id).collect()
}

fn employees_pipeline() -> ListViewPipeline {
    EntityKind::Employees.builtin_definition().pipeline().unwrap()
}

#[test]
fn test_search_then_filter_end_to_end() {
    let pipeline = employees_pipeline();
    let records = roster();

    let searched = pipeline
        .apply(&records, &QueryParams::new().search("smith"))
        .unwrap();
    assert_eq!(searched.matched_count, 2);

    let params = QueryParams::new()
        .search("smith")
        .filter("department_c", "Engineering");
    let view = pipeline.apply(&records, &params).unwrap();

    assert_eq!(ids(&view.visible), vec![3]);
    assert_eq!(view.matched_count, 1);
    assert_eq!(view.total_count, 5);
    assert_eq!(view.banner("employees"), "Showing 1 of 5 employees");
}

#[test]
fn test_empty_params_keeps_everything_in_default_order() {
    let pipeline = employees_pipeline();
    let records = roster();

    let view = pipeline.apply(&records, &QueryParams::default()).unwrap();

    assert_eq!(view.matched_count, records.len());
    assert_eq!(view.total_count, records.len());
    // first_name_c ascending
    assert_eq!(ids(&view.visible), vec![2, 4, 5, 3, 1]);
}

#[test]
fn test_every_visible_record_matches_search_and_excluded_do_not() {
    let pipeline = employees_pipeline();
    let records = roster();
    let view = pipeline
        .apply(&records, &QueryParams::new().search("ENG"))
        .unwrap();

    let visible = ids(&view.visible);
    let fields = ["first_name_c", "last_name_c", "email_c", "department_c", "role_c"];
    for record in &records {
        let hit = fields
            .iter()
            .any(|f| record.text(f).to_lowercase().contains("eng"));
        assert_eq!(hit, visible.contains(&record.id().unwrap()));
    }
}

#[test]
fn test_adding_filter_never_grows_result() {
    let pipeline = employees_pipeline();
    let records = roster();
    let base = QueryParams::new().search("e");
    let before = pipeline.apply(&records, &base).unwrap();
    let after = pipeline
        .apply(&records, &base.clone().filter("department_c", "Engineering"))
        .unwrap();

    assert!(after.visible.len() <= before.visible.len());
    assert!(after.visible.iter().all(|r| r.text("department_c") == "Engineering"));
}

#[test]
fn test_numeric_sort_with_missing_and_string_salaries() {
    let pipeline = ListViewPipeline::new(
        ListViewConfig::builder()
            .sort_field("salary_c", ComparatorKind::Numeric)
            .default_sort("salary_c")
            .build()
            .unwrap(),
    );
    let records = vec![
        Record::new().with("Id", 1).with("salary_c", 50000),
        Record::new().with("Id", 2).with("salary_c", "70000"),
        Record::new().with("Id", 3).with("salary_c", json!(null)),
        Record::new().with("Id", 4).with("salary_c", 120000),
    ];

    let view = pipeline.apply(&records, &QueryParams::default()).unwrap();
    assert_eq!(ids(&view.visible), vec![3, 1, 2, 4]);
}

#[test]
fn test_chronological_descending_puts_unparseable_last() {
    let pipeline = ListViewPipeline::new(
        ListViewConfig::builder()
            .sort_field("start_date_c", ComparatorKind::Chronological)
            .default_sort("start_date_c")
            .build()
            .unwrap(),
    );
    let records = vec![
        Record::new().with("Id", 1).with("start_date_c", "2023-03-01"),
        Record::new().with("Id", 2).with("start_date_c", "2021-07-15"),
        Record::new().with("Id", 3).with("start_date_c", ""),
    ];

    let params = QueryParams::new().sort_by("start_date_c", SortDirection::Descending);
    let view = pipeline.apply(&records, &params).unwrap();
    assert_eq!(ids(&view.visible), vec![1, 2, 3]);
}

#[test]
fn test_stable_in_both_directions() {
    let pipeline = employees_pipeline();
    let records = roster();

    let asc = pipeline
        .apply(
            &records,
            &QueryParams::new().sort_by("department_c", SortDirection::Ascending),
        )
        .unwrap();
    // Engineering ties keep input order 2, 3, 5
    assert_eq!(ids(&asc.visible), vec![2, 3, 5, 4, 1]);

    let desc = pipeline
        .apply(
            &records,
            &QueryParams::new().sort_by("department_c", SortDirection::Descending),
        )
        .unwrap();
    assert_eq!(ids(&desc.visible), vec![1, 4, 2, 3, 5]);
}

#[test]
fn test_apply_is_idempotent_and_leaves_input_untouched() {
    let pipeline = employees_pipeline();
    let records = roster();
    let snapshot = records.clone();
    let params = QueryParams::new()
        .search("a")
        .sort_by("salary_c", SortDirection::Descending);

    let first = pipeline.apply(&records, &params).unwrap();
    let second = pipeline.apply(&records, &params).unwrap();

    assert_eq!(first, second);
    assert_eq!(records, snapshot);
}

#[test]
fn test_full_name_derived_key() {
    let pipeline = employees_pipeline();
    let params = QueryParams::new().sort_by("full_name", SortDirection::Ascending);
    let view = pipeline.apply(&roster(), &params).unwrap();
    assert_eq!(ids(&view.visible), vec![2, 4, 5, 3, 1]);
}
