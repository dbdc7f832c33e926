//! Subcommands.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Args;
use clap::Subcommand;
use clap::ValueEnum;
use log::info;
use refgrid_lib::Entity;
use refgrid_lib::Grid;
use refgrid_lib::backend::CrudBackend;
use refgrid_lib::backend::FallbackBackend;
use refgrid_lib::backend::HttpBackend;
use refgrid_lib::backend::MemoryBackend;
use refgrid_lib::entities::Hospitals;
use refgrid_lib::entities::Notifications;
use refgrid_lib::grid::Modifiers;
use refgrid_lib::grid::NoticeKind;
use refgrid_lib::model::Value;
use refgrid_lib::settings::LayoutStore;
use refgrid_lib::settings::SqliteStore;

use crate::error::CliError;

/// Options shared by every subcommand.
pub struct Context {
    pub api_url: String,
    pub timeout: Duration,
    pub offline: bool,
    pub settings_db: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Table {
    Hospitals,
    Notifications,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Format {
    Csv,
    Excel,
}

/// Filter and sort options.
#[derive(Debug, Args)]
pub struct ViewArgs {
    /// Case-insensitive text matched against every field.
    #[arg(long)]
    filter: Option<String>,

    /// Keep rows whose column equals the value (`column=value`, repeatable).
    #[arg(long = "where", value_parser = parse_assignment)]
    conditions: Vec<(String, String)>,

    /// Column to sort by.
    #[arg(long)]
    sort: Option<String>,

    /// Sort descending.
    #[arg(long, requires = "sort", default_value_t = false)]
    desc: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print one page of a table.
    List {
        #[arg(value_enum)]
        table: Table,
        #[command(flatten)]
        view: ViewArgs,
        #[arg(long, default_value_t = 1)]
        page: usize,
        #[arg(long, default_value_t = 50)]
        page_size: usize,
    },
    /// Write the filtered rows to a file.
    Export {
        #[arg(value_enum)]
        table: Table,
        #[command(flatten)]
        view: ViewArgs,
        #[arg(long, value_enum, default_value_t = Format::Csv)]
        format: Format,
        /// Directory to write into.
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
    /// Copy one cell's value down a column and save.
    Fill {
        #[arg(value_enum)]
        table: Table,
        #[arg(long)]
        column: String,
        /// Row whose value is copied.
        #[arg(long)]
        from: String,
        /// Rows to fill, comma separated.
        #[arg(long, value_delimiter = ',', required = true)]
        to: Vec<String>,
        /// Show the changes without saving them.
        #[arg(long, default_value_t = false)]
        dry_run: bool,
    },
    /// Change fields of one row.
    Edit {
        #[arg(value_enum)]
        table: Table,
        #[arg(long)]
        id: String,
        /// `column=value`, repeatable. Values are parsed as JSON when possible.
        #[arg(long = "set", value_parser = parse_assignment, required = true)]
        fields: Vec<(String, String)>,
    },
    /// Create a record from a JSON object.
    Add {
        #[arg(value_enum)]
        table: Table,
        record: String,
    },
    /// Delete rows by ID.
    Delete {
        #[arg(value_enum)]
        table: Table,
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Show or change the column layout.
    Columns {
        #[arg(value_enum)]
        table: Table,
        /// Hide a visible column or show a hidden one (repeatable).
        #[arg(long)]
        toggle: Vec<String>,
        /// `column=pixels`, repeatable.
        #[arg(long = "width", value_parser = parse_width)]
        widths: Vec<(String, u32)>,
        /// Forget the saved layout before applying other changes.
        #[arg(long, default_value_t = false)]
        reset: bool,
    },
}

impl Command {
    fn table(&self) -> Table {
        match self {
            Command::List { table, .. }
            | Command::Export { table, .. }
            | Command::Fill { table, .. }
            | Command::Edit { table, .. }
            | Command::Add { table, .. }
            | Command::Delete { table, .. }
            | Command::Columns { table, .. } => *table,
        }
    }
}

fn parse_assignment(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected column=value, got {:?}", s))?;
    if key.is_empty() {
        return Err("column name is empty".to_string());
    }
    Ok((key.to_string(), value.to_string()))
}

fn parse_width(s: &str) -> Result<(String, u32), String> {
    let (column, width) = parse_assignment(s)?;
    let width = width
        .parse()
        .map_err(|_| format!("invalid width {:?}", width))?;
    Ok((column, width))
}

/// JSON literal if it parses as one, otherwise the raw text.
fn parse_value(raw: &str) -> Value {
    serde_json::from_str::<serde_json::Value>(raw)
        .map(|json| Value::from_json(&json))
        .unwrap_or_else(|_| Value::from(raw))
}

pub async fn run(context: &Context, command: Command) -> Result<(), CliError> {
    match command.table() {
        Table::Hospitals => execute::<Hospitals>(context, command).await,
        Table::Notifications => execute::<Notifications>(context, command).await,
    }
}

fn backend<E: Entity>(context: &Context) -> Result<Arc<dyn CrudBackend>, CliError> {
    if context.offline {
        info!("Offline, serving sample {}", E::TABLE);
        return Ok(Arc::new(MemoryBackend::new().with_samples::<E>()));
    }
    let http = HttpBackend::builder()
        .url(&context.api_url)
        .timeout(context.timeout)
        .build()?;
    Ok(Arc::new(FallbackBackend::for_entity::<E>(http)))
}

async fn layout_store(context: &Context) -> Result<LayoutStore, CliError> {
    let Some(path) = &context.settings_db else {
        return Ok(LayoutStore::in_memory());
    };
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    Ok(LayoutStore::new(SqliteStore::open(path).await?))
}

fn report_notice<E: Entity>(grid: &Grid<E>) {
    if let Some(notice) = grid.notice() {
        match notice.kind {
            NoticeKind::Error => eprintln!("{}", notice.message),
            _ => println!("{}", notice.message),
        }
    }
}

fn apply_view<E: Entity>(grid: &mut Grid<E>, view: ViewArgs) {
    if let Some(filter) = view.filter {
        grid.set_global_filter(filter);
    }
    for (column, value) in view.conditions {
        let mut values: Vec<String> = grid
            .query()
            .column_filters
            .get(&column)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default();
        values.push(value);
        grid.set_column_filter(&column, values);
    }
    if let Some(column) = view.sort {
        grid.sort_by(&column);
        if view.desc {
            grid.sort_by(&column);
        }
    }
}

fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        return format!("{:<width$}", s, width = width);
    }
    let mut out: String = s.chars().take(width.saturating_sub(1)).collect();
    out.push('~');
    out
}

fn print_page<E: Entity>(grid: &Grid<E>) {
    let columns = grid.visible_columns();
    let widths: Vec<usize> = columns
        .iter()
        .map(|c| (c.width as usize / 8).max(4))
        .collect();

    let header: Vec<String> = columns
        .iter()
        .zip(&widths)
        .map(|(c, w)| truncate(&c.title, *w))
        .collect();
    println!("{:>5}  {}", "#", header.join(" | "));

    for (index, row) in grid.page_rows().into_iter().enumerate() {
        let cells: Vec<String> = columns
            .iter()
            .zip(&widths)
            .map(|(c, w)| truncate(&row.get_display(&c.accessor), *w))
            .collect();
        println!("{:>5}  {}", grid.row_number(index), cells.join(" | "));
    }

    println!(
        "Page {} of {} ({} rows)",
        grid.page(),
        grid.page_count(),
        grid.filtered_rows().len()
    );
}

async fn execute<E: Entity>(context: &Context, command: Command) -> Result<(), CliError> {
    let store = layout_store(context).await?;
    let mut grid = Grid::<E>::new(backend::<E>(context)?);
    grid.load_settings(&store).await?;
    grid.refresh().await;
    report_notice(&grid);

    match command {
        Command::List {
            view,
            page,
            page_size,
            ..
        } => {
            apply_view(&mut grid, view);
            grid.set_page_size(page_size)?;
            grid.set_page(page);
            print_page(&grid);
        }
        Command::Export {
            view, format, out, ..
        } => {
            apply_view(&mut grid, view);
            let export = match format {
                Format::Csv => grid.export_csv(),
                Format::Excel => grid.export_excel(),
            };
            let path = export.write_to(&out)?;
            info!("Wrote {}", path.display());
            report_notice(&grid);
            println!("{}", path.display());
        }
        Command::Fill {
            column,
            from,
            to,
            dry_run,
            ..
        } => {
            if !grid.pointer_down(&from, &column) {
                return Err(CliError::Usage(format!(
                    "row {} has no value in {} to fill",
                    from, column
                )));
            }
            for id in &to {
                grid.pointer_enter(id, &column);
            }
            grid.pointer_up();

            for change in grid.pending_changes().iter() {
                println!(
                    "{} {}: {:?} -> {:?}",
                    change.row_id,
                    change.column_id,
                    change.old_value.as_display(),
                    change.new_value.as_display()
                );
            }
            if !dry_run {
                grid.save_all().await;
                for result in grid.save_results() {
                    println!("{}", result.message);
                }
                report_notice(&grid);
            }
        }
        Command::Edit { id, fields, .. } => {
            grid.start_editing(&id)?;
            for (column, raw) in fields {
                grid.edit_field(&column, parse_value(&raw))?;
            }
            grid.save_edit().await?;
            report_notice(&grid);
        }
        Command::Add { record, .. } => {
            let record: serde_json::Value = serde_json::from_str(&record)?;
            let row = grid.add_record(record).await?;
            report_notice(&grid);
            println!("{}", serde_json::to_string_pretty(&row.to_json())?);
        }
        Command::Delete { ids, .. } => {
            for id in &ids {
                grid.select_row(id, Modifiers::CTRL);
            }
            if let Some(report) = grid.delete_selected().await {
                for (id, message) in &report.failed {
                    eprintln!("{}: {}", id, message);
                }
            }
            report_notice(&grid);
        }
        Command::Columns {
            toggle,
            widths,
            reset,
            ..
        } => {
            if reset {
                grid.reset_layout(&store).await?;
            }
            for column in &toggle {
                grid.toggle_column_visibility(column)?;
            }
            for (column, width) in &widths {
                grid.resize_column(column, *width)?;
            }
            if !toggle.is_empty() || !widths.is_empty() {
                grid.persist_settings(&store).await?;
            }

            for column in grid.columns() {
                println!(
                    "{:<16} {:<20} {:>5}px {}",
                    column.accessor,
                    column.title,
                    column.width,
                    if column.visible { "shown" } else { "hidden" }
                );
            }
        }
    }
    Ok(())
}
