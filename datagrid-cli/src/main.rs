use std::fs::{self, File};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::Parser;
use log::LevelFilter;
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode, WriteLogger};

use datagrid_lib::export::ExportFormat;
use datagrid_lib::model::{Column, ColumnType, Record, has_iso_date_prefix};
use datagrid_lib::query::{
    FilterLogic, FilterOperator, FilterPredicate, SortDirection, SortKey, SortState,
};
use datagrid_lib::{Grid, GridConfig};

/// Filter, sort and page through JSON rows the way the grid renders them.
#[derive(Debug, Parser)]
#[command(name = "datagrid", version)]
struct Args {
    /// JSON file holding an array of row objects
    rows: PathBuf,

    /// JSON file holding an array of column descriptors (inferred from the rows if omitted)
    #[arg(short, long)]
    columns: Option<PathBuf>,

    /// JSON file holding grid configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// Field holding each row's unique key
    #[arg(short, long, default_value = "id")]
    key: String,

    /// Filter as FIELD:OPERATOR[:VALUE], e.g. age:gt:30 or email:notEmpty
    #[arg(short, long = "filter")]
    filters: Vec<String>,

    /// Combine filters with AND or OR
    #[arg(long)]
    logic: Option<FilterLogic>,

    /// Free-text search across searchable columns
    #[arg(short, long)]
    search: Option<String>,

    /// Sort key as FIELD[:asc|desc]; repeat for a multi-key sort
    #[arg(long = "sort")]
    sorts: Vec<String>,

    /// Viewport height in pixels
    #[arg(long, default_value_t = 400.0)]
    height: f64,

    /// Scroll offset in pixels
    #[arg(long, default_value_t = 0.0)]
    scroll: f64,

    /// Export the filtered rows to BASE.csv / BASE.xlsx instead of printing
    #[arg(short, long, value_name = "BASE")]
    export: Option<String>,

    /// Export format
    #[arg(long, default_value = "csv")]
    format: ExportFormat,

    /// Directory the export is written to
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// Write logs to a file instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

// ============================================================================
// Setup
// ============================================================================

fn init_logging(args: &Args) -> Result<()> {
    let level = match args.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    match &args.log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create log file {}", path.display()))?;
            WriteLogger::init(level, Config::default(), file)?;
        }
        None => {
            TermLogger::init(level, Config::default(), TerminalMode::Stderr, ColorChoice::Auto)?;
        }
    }
    Ok(())
}

fn read_json(path: &Path) -> Result<serde_json::Value> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Invalid JSON in {}", path.display()))
}

/// One column per field seen in the rows, typed by its first non-null value.
fn infer_columns(rows: &serde_json::Value) -> Vec<Column> {
    let Some(items) = rows.as_array() else {
        return Vec::new();
    };
    let mut columns: Vec<Column> = Vec::new();
    for object in items.iter().filter_map(|item| item.as_object()) {
        for (field, value) in object {
            if value.is_null() || columns.iter().any(|c| &c.field == field) {
                continue;
            }
            let column_type = match value {
                serde_json::Value::Number(_) => ColumnType::Number,
                serde_json::Value::Bool(_) => ColumnType::Boolean,
                serde_json::Value::String(s) if has_iso_date_prefix(s) => ColumnType::Date,
                _ => ColumnType::Text,
            };
            columns.push(Column::new(field.as_str(), field.as_str()).column_type(column_type));
        }
    }
    columns
}

fn parse_filter(spec: &str) -> Result<FilterPredicate> {
    let mut parts = spec.splitn(3, ':');
    let (Some(field), Some(operator)) = (parts.next(), parts.next()) else {
        bail!("Filter '{}' must look like FIELD:OPERATOR[:VALUE]", spec);
    };
    let operator: FilterOperator = operator.parse().map_err(anyhow::Error::msg)?;
    let value = parts.next().unwrap_or_default();
    if operator.requires_value() && value.is_empty() {
        bail!("Filter operator '{}' needs a value", operator);
    }
    Ok(FilterPredicate::new(field, operator, value))
}

fn parse_sort(specs: &[String]) -> Result<SortState> {
    let mut keys = specs
        .iter()
        .map(|spec| {
            let (field, direction) = match spec.split_once(':') {
                Some((field, direction)) => {
                    let direction: SortDirection =
                        direction.parse().map_err(anyhow::Error::msg)?;
                    (field, direction)
                }
                None => (spec.as_str(), SortDirection::Asc),
            };
            Ok(SortKey::new(field, direction))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(if keys.len() == 1 {
        SortState::Single(keys.remove(0))
    } else {
        SortState::multi(keys)
    })
}

// ============================================================================
// Output
// ============================================================================

fn print_window(grid: &mut Grid<Record>) {
    let total = grid.derived_len();
    let window = grid.visible_window();
    let fields: Vec<String> = grid.columns().iter().map(|c| c.field.clone()).collect();

    let header: Vec<String> = fields
        .iter()
        .filter_map(|field| grid.header_label(field))
        .collect();
    println!("#\t{}", header.join("\t"));

    let rows: Vec<(usize, Record)> = grid
        .visible_rows()
        .into_iter()
        .map(|(pos, row)| (pos, row.clone()))
        .collect();
    for (pos, row) in &rows {
        let cells: Vec<String> = fields
            .iter()
            .map(|field| {
                grid.cell_display(row, field)
                    .map(|display| display.to_string())
                    .unwrap_or_default()
            })
            .collect();
        println!("{}\t{}", pos, cells.join("\t"));
    }

    match window.end_index() {
        Some(end) => eprintln!(
            "rows {}-{} of {} ({} loaded)",
            window.start_index(),
            end,
            total,
            grid.rows().len()
        ),
        None => eprintln!("no rows ({} loaded)", grid.rows().len()),
    }
}

// ============================================================================
// Main
// ============================================================================

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args)?;

    let mut config = match &args.config {
        Some(path) => serde_json::from_value::<GridConfig>(read_json(path)?)
            .with_context(|| format!("Invalid grid config in {}", path.display()))?,
        None => GridConfig::default(),
    };
    if let Some(logic) = args.logic {
        config = config.with_filter_logic(logic);
    }

    let rows = read_json(&args.rows)?;
    let columns = match &args.columns {
        Some(path) => serde_json::from_value::<Vec<Column>>(read_json(path)?)
            .with_context(|| format!("Invalid column descriptors in {}", path.display()))?,
        None => infer_columns(&rows),
    };
    log::debug!("Loaded {} columns", columns.len());

    let mut grid = Grid::new(columns, config);
    grid.mount();
    grid.set_rows_json(&rows, &args.key);

    for spec in &args.filters {
        let predicate = parse_filter(spec)?;
        if !grid.set_filter(predicate) {
            log::warn!("Filter '{}' was not applied", spec);
        }
    }
    if let Some(search) = &args.search {
        grid.set_search(search.as_str());
    }
    let sort = parse_sort(&args.sorts)?;
    if sort.is_sorted() && !grid.set_sort(sort) {
        log::warn!("Sort was not applied");
    }

    if let Some(base) = &args.export {
        let artifact = grid.export(base, args.format)?;
        let path = args.out_dir.join(&artifact.file_name);
        fs::write(&path, &artifact.content)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        eprintln!("Exported {} rows to {}", artifact.row_count, path.display());
        return Ok(());
    }

    grid.set_viewport_height(args.height);
    grid.scroll_to(args.scroll, std::time::Instant::now());
    print_window(&mut grid);
    Ok(())
}
