use datagrid_lib::columns::ColumnRegistry;
use datagrid_lib::model::{CellValue, Column, ColumnType, GridRow, Record};
use datagrid_lib::query::{
    FilterLogic, FilterOperator, FilterPredicate, FilterSet, SearchQuery, filter_indices,
    search_indices,
};

fn people() -> (ColumnRegistry, Vec<Record>) {
    let registry = ColumnRegistry::new(vec![
        Column::new("name", "Name"),
        Column::new("age", "Age").column_type(ColumnType::Number),
        Column::new("joined", "Joined").column_type(ColumnType::Date),
        Column::new("notes", "Notes").searchable(false),
    ]);
    let rows = vec![
        Record::new("1")
            .set("name", "Alice")
            .set("age", 34)
            .set("joined", "2021-04-01")
            .set("notes", "manager"),
        Record::new("2")
            .set("name", "bob")
            .set("age", "27")
            .set("joined", "2023-11-15T08:00:00Z"),
        Record::new("3").set("name", "Carol").set("age", "n/a"),
        Record::new("4").set("name", "").set("age", 51).set("notes", "alice's boss"),
    ];
    (registry, rows)
}

fn keys(rows: &[Record], indices: &[usize]) -> Vec<String> {
    indices.iter().map(|&i| rows[i].key()).collect()
}

fn apply(predicates: Vec<FilterPredicate>, logic: FilterLogic) -> Vec<String> {
    let (registry, rows) = people();
    let mut filters = FilterSet::new();
    for predicate in predicates {
        filters.insert(predicate);
    }
    keys(&rows, &filter_indices(&rows, &registry, &filters, logic))
}

fn matching(predicate: FilterPredicate) -> Vec<String> {
    apply(vec![predicate], FilterLogic::And)
}

#[test]
fn test_numeric_filter_drops_non_numeric_and_missing() {
    let registry =
        ColumnRegistry::new(vec![Column::new("age", "Age").column_type(ColumnType::Number)]);
    let rows = vec![
        Record::new("a").set("age", 5),
        Record::new("b").set("age", "x"),
        Record::new("c").set("age", CellValue::Missing),
    ];
    let mut filters = FilterSet::new();
    filters.insert(FilterPredicate::gt("age", "3"));

    let indices = filter_indices(&rows, &registry, &filters, FilterLogic::And);
    assert_eq!(keys(&rows, &indices), vec!["a"]);
}

#[test]
fn test_string_operators_ignore_case() {
    assert_eq!(matching(FilterPredicate::contains("name", "AL")), vec!["1"]);
    assert_eq!(matching(FilterPredicate::equals("name", "BOB")), vec!["2"]);
    assert_eq!(matching(FilterPredicate::starts_with("name", "car")), vec!["3"]);
    assert_eq!(matching(FilterPredicate::ends_with("name", "OL")), vec!["3"]);
}

#[test]
fn test_string_operators_on_date_column_use_cell_text() {
    assert_eq!(matching(FilterPredicate::equals("joined", "2021-04-01")), vec!["1"]);
    assert_eq!(matching(FilterPredicate::ends_with("joined", "04-01")), vec!["1"]);
    assert_eq!(matching(FilterPredicate::starts_with("joined", "2023-11")), vec!["2"]);
    assert_eq!(matching(FilterPredicate::contains("joined", "t08:00")), vec!["2"]);
}

#[test]
fn test_string_operators_on_number_column_use_cell_text() {
    let registry = ColumnRegistry::new(vec![
        Column::new("salary", "Salary").column_type(ColumnType::Currency),
        Column::new("age", "Age").column_type(ColumnType::Number),
    ]);
    let rows = vec![
        Record::new("a").set("salary", "1200.50").set("age", "027"),
        Record::new("b").set("salary", 1200.5).set("age", 27),
    ];
    let run = |predicate: FilterPredicate| {
        let mut filters = FilterSet::new();
        filters.insert(predicate);
        keys(&rows, &filter_indices(&rows, &registry, &filters, FilterLogic::And))
    };

    assert_eq!(run(FilterPredicate::equals("salary", "1200.50")), vec!["a"]);
    assert_eq!(run(FilterPredicate::equals("salary", "1200.5")), vec!["b"]);
    assert_eq!(run(FilterPredicate::ends_with("salary", ".50")), vec!["a"]);
    assert_eq!(run(FilterPredicate::starts_with("age", "0")), vec!["a"]);
    assert_eq!(run(FilterPredicate::gte("salary", "1200.5")), vec!["a", "b"]);
}

#[test]
fn test_numeric_operators_coerce_text() {
    assert_eq!(matching(FilterPredicate::lt("age", "30")), vec!["2"]);
    assert_eq!(matching(FilterPredicate::gte("age", "34")), vec!["1", "4"]);
    assert_eq!(matching(FilterPredicate::lte("age", "abc")), Vec::<String>::new());
}

#[test]
fn test_date_comparison() {
    assert_eq!(matching(FilterPredicate::gt("joined", "2022-01-01")), vec!["2"]);
    assert_eq!(matching(FilterPredicate::lt("joined", "2022-01-01")), vec!["1"]);
}

#[test]
fn test_empty_and_not_empty() {
    assert_eq!(matching(FilterPredicate::empty("name")), vec!["4"]);
    assert_eq!(matching(FilterPredicate::not_empty("name")), vec!["1", "2", "3"]);
    assert_eq!(matching(FilterPredicate::empty("joined")), vec!["3", "4"]);
}

#[test]
fn test_and_or_logic() {
    let predicates = || {
        vec![
            FilterPredicate::gt("age", "30"),
            FilterPredicate::contains("name", "b"),
        ]
    };
    assert_eq!(apply(predicates(), FilterLogic::And), Vec::<String>::new());
    assert_eq!(apply(predicates(), FilterLogic::Or), vec!["1", "2", "4"]);
}

#[test]
fn test_predicate_without_value_is_inactive() {
    let predicate = FilterPredicate::contains("name", "");
    assert!(!predicate.is_active());
    assert_eq!(apply(vec![predicate], FilterLogic::And).len(), 4);
}

#[test]
fn test_operator_parsing() {
    assert_eq!("notEmpty".parse::<FilterOperator>().unwrap(), FilterOperator::NotEmpty);
    assert_eq!("GTE".parse::<FilterOperator>().unwrap(), FilterOperator::Gte);
    assert!("between".parse::<FilterOperator>().is_err());
}

#[test]
fn test_filter_set_json_shape() {
    let json = r#"{"age": {"field": "age", "operator": "gt", "value": "3"}}"#;
    let filters: FilterSet = serde_json::from_str(json).unwrap();
    assert_eq!(filters.get("age"), Some(&FilterPredicate::gt("age", "3")));
}

// =============================================================================
// Search
// =============================================================================

#[test]
fn test_search_matches_any_searchable_column() {
    let (registry, rows) = people();
    let all: Vec<usize> = (0..rows.len()).collect();

    let found = search_indices(&rows, &all, &registry, &SearchQuery::new("ALICE"));
    assert_eq!(keys(&rows, &found), vec!["1"]);

    let found = search_indices(&rows, &all, &registry, &SearchQuery::new("5"));
    assert_eq!(keys(&rows, &found), vec!["2", "4"]);
}

#[test]
fn test_search_skips_non_searchable_columns() {
    let (registry, rows) = people();
    let all: Vec<usize> = (0..rows.len()).collect();
    let found = search_indices(&rows, &all, &registry, &SearchQuery::new("boss"));
    assert!(found.is_empty());
}

#[test]
fn test_empty_search_keeps_everything() {
    let (registry, rows) = people();
    let subset = vec![3, 1];
    assert_eq!(search_indices(&rows, &subset, &registry, &SearchQuery::new("")), subset);
}
