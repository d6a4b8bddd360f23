use datagrid_lib::export::{ExportFormat, ExportOrder};
use datagrid_lib::model::{Column, ColumnType, Record};
use datagrid_lib::query::{FilterPredicate, SortDirection, SortState};
use datagrid_lib::{Grid, GridConfig};

fn grid(config: GridConfig) -> Grid<Record> {
    let columns = vec![
        Column::new("id", "ID").visible(false),
        Column::new("name", "Name"),
        Column::new("score", "Score").column_type(ColumnType::Number),
        Column::new("comment", "Comment, quoted"),
    ];
    let mut grid = Grid::new(columns, config);
    grid.set_rows(vec![
        Record::new("1").set("id", 1).set("name", "Zed").set("score", 7).set("comment", "fine"),
        Record::new("2")
            .set("id", 2)
            .set("name", "Amy")
            .set("score", 9.5)
            .set("comment", r#"said "wow""#),
        Record::new("3").set("id", 3).set("name", "Bob").set("score", 2),
        Record::new("4")
            .set("id", 4)
            .set("name", "Cy")
            .set("score", 8)
            .set("comment", "multi\nline"),
    ]);
    grid
}

fn parse(content: &str) -> (Vec<String>, Vec<Vec<String>>) {
    let mut reader = csv::ReaderBuilder::new().from_reader(content.as_bytes());
    let headers = reader.headers().unwrap().iter().map(String::from).collect();
    let records = reader
        .records()
        .map(|r| r.unwrap().iter().map(String::from).collect())
        .collect();
    (headers, records)
}

#[test]
fn test_export_filtered_rows_in_source_order() {
    let mut grid = grid(GridConfig::default());
    grid.set_filter(FilterPredicate::gte("score", "7"));
    grid.set_sort(SortState::single("name", SortDirection::Asc));

    let artifact = grid.export("scores", ExportFormat::Csv).unwrap();
    assert_eq!(artifact.file_name, "scores.csv");
    assert_eq!(artifact.row_count, 3);

    let (headers, records) = parse(&artifact.content);
    assert_eq!(headers, vec!["Name", "Score", "Comment, quoted"]);
    assert_eq!(
        records,
        vec![
            vec!["Zed", "7", "fine"],
            vec!["Amy", "9.5", r#"said "wow""#],
            vec!["Cy", "8", "multi\nline"],
        ]
    );
}

#[test]
fn test_export_sorted_when_configured() {
    let mut grid = grid(GridConfig::default().with_export_order(ExportOrder::Sorted));
    grid.set_sort(SortState::single("name", SortDirection::Asc));

    let artifact = grid.export("scores", ExportFormat::Xlsx).unwrap();
    assert_eq!(artifact.file_name, "scores.xlsx");
    let (_, records) = parse(&artifact.content);
    let names: Vec<&str> = records.iter().map(|r| r[0].as_str()).collect();
    assert_eq!(names, vec!["Amy", "Bob", "Cy", "Zed"]);
}

#[test]
fn test_export_follows_column_order_and_visibility() {
    let mut grid = grid(GridConfig::default());
    grid.move_column("score", "name");
    grid.set_column_visible("comment", false);
    grid.set_column_visible("id", true);

    let artifact = grid.export("x", ExportFormat::Csv).unwrap();
    let (headers, records) = parse(&artifact.content);
    assert_eq!(headers, vec!["ID", "Score", "Name"]);
    assert_eq!(records[0], vec!["1", "7", "Zed"]);
}

#[test]
fn test_export_quotes_every_value() {
    let mut grid = grid(GridConfig::default());
    grid.set_search("bob");
    let artifact = grid.export("x", ExportFormat::Csv).unwrap();
    assert_eq!(artifact.content, "Name,Score,\"Comment, quoted\"\n\"Bob\",\"2\",\"\"\n");
}

#[test]
fn test_export_custom_delimiter() {
    let mut grid = grid(GridConfig::default().with_delimiter(';'));
    grid.set_search("amy");
    let artifact = grid.export("x", ExportFormat::Csv).unwrap();
    assert!(artifact.content.starts_with("Name;Score;\"Comment, quoted\"\n"));
}

#[test]
fn test_export_invalid_delimiter_is_an_error() {
    let mut grid = grid(GridConfig::default().with_delimiter('→'));
    assert!(grid.export("x", ExportFormat::Csv).is_err());
}
