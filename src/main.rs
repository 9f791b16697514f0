mod render;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use log::info;
use serde_json::json;

use rusty_scrip::data::filter::{distinct_values, numeric_bounds};
use rusty_scrip::data::loader;
use rusty_scrip::data::resolve::{resolve, INSTRUMENT_CANDIDATES};
use rusty_scrip::session::Session;
use rusty_scrip::store::{Access, Workspace, WorkspaceConfig};
use rusty_scrip::{CellValue, Table};

// ---------------------------------------------------------------------------
// Command line
// ---------------------------------------------------------------------------

#[derive(Parser)]
#[command(name = "rusty-scrip")]
#[command(about = "Upload a CSV or spreadsheet, pick an instrument and view the filtered rows")]
struct Cli {
    /// Workspace holding the scrip master and trade history.
    #[arg(long, global = true, env = "RUSTY_SCRIP_DATA_DIR", default_value = "data")]
    data_dir: PathBuf,
    /// Act with admin privileges (replace / delete the scrip master).
    #[arg(long, global = true, env = "RUSTY_SCRIP_ADMIN", default_value_t = false)]
    admin: bool,
    /// Comma-separated header names to try for the instrument column.
    #[arg(long, global = true, value_delimiter = ',')]
    candidates: Vec<String>,
    #[arg(long, global = true, default_value_t = false)]
    json: bool,
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Column names and types of a file.
    Columns { file: PathBuf },
    /// Distinct values of a column.
    Values {
        file: PathBuf,
        /// Defaults to the resolved instrument column.
        #[arg(long)]
        column: Option<String>,
    },
    /// Filter a file by instrument and optional strike.
    View {
        file: PathBuf,
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Shared reference table.
    Master {
        #[command(subcommand)]
        command: MasterCommand,
    },
    /// Per-upload trade history.
    History {
        #[command(subcommand)]
        command: HistoryCommand,
    },
}

#[derive(clap::Args)]
struct FilterArgs {
    /// Filter on this column instead of the resolved instrument column.
    #[arg(long)]
    column: Option<String>,
    #[arg(long)]
    value: Option<String>,
    #[arg(long, default_value = "SEM_STRIKE_PRICE")]
    strike_column: String,
    /// Keep rows whose strike equals this number.
    #[arg(long)]
    strike: Option<f64>,
    #[arg(long, default_value_t = 50)]
    limit: usize,
}

#[derive(Subcommand)]
enum MasterCommand {
    Show {
        #[arg(long, default_value_t = 50)]
        limit: usize,
    },
    Upload { file: PathBuf },
    Delete,
    Filter {
        #[command(flatten)]
        filter: FilterArgs,
    },
}

#[derive(Subcommand)]
enum HistoryCommand {
    Upload {
        file: PathBuf,
        #[arg(long, default_value = "trade_history")]
        prefix: String,
    },
    List,
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let candidates: Vec<&str> = if cli.candidates.is_empty() {
        INSTRUMENT_CANDIDATES.to_vec()
    } else {
        cli.candidates.iter().map(String::as_str).collect()
    };
    let access = Access::from_flag(cli.admin);

    match &cli.command {
        Commands::Columns { file } => {
            let table = read_table(file)?;
            print_columns(&table, &candidates, cli.json)
        }
        Commands::Values { file, column } => {
            let table = read_table(file)?;
            let column = match column {
                Some(c) => c.as_str(),
                None => resolve(&table, &candidates)
                    .with_context(|| missing_candidates(&candidates))?,
            };
            let values = distinct_values(&table, column)?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&values)?);
            } else {
                for v in &values {
                    println!("{v}");
                }
            }
            Ok(())
        }
        Commands::View { file, filter } => {
            let table = read_table(file)?;
            let name = display_name(file);
            run_filter(&name, table, &candidates, filter, cli.json)
        }
        Commands::Master { command } => {
            let workspace = Workspace::open(&WorkspaceConfig::at(&cli.data_dir))?;
            run_master(&workspace, access, command, &candidates, cli.json)
        }
        Commands::History { command } => {
            let workspace = Workspace::open(&WorkspaceConfig::at(&cli.data_dir))?;
            run_history(&workspace, command, cli.json)
        }
    }
}

fn run_master(
    workspace: &Workspace,
    access: Access,
    command: &MasterCommand,
    candidates: &[&str],
    json: bool,
) -> Result<()> {
    match command {
        MasterCommand::Show { limit } => {
            let table = require_master(workspace)?;
            print_table(&table, *limit, json)
        }
        MasterCommand::Upload { file } => {
            let table = read_table(file)?;
            workspace.replace_master(access, &table)?;
            println!(
                "Scrip master updated: {} rows ({})",
                table.len(),
                workspace.master_path().display()
            );
            Ok(())
        }
        MasterCommand::Delete => {
            if workspace.delete_master(access)? {
                println!("Scrip master deleted.");
            } else {
                println!("No scrip master to delete.");
            }
            Ok(())
        }
        MasterCommand::Filter { filter } => {
            let table = require_master(workspace)?;
            let name = display_name(workspace.master_path());
            run_filter(&name, table, candidates, filter, json)
        }
    }
}

fn run_history(workspace: &Workspace, command: &HistoryCommand, json: bool) -> Result<()> {
    match command {
        HistoryCommand::Upload { file, prefix } => {
            let table = read_table(file)?;
            let now = chrono::Local::now().naive_local();
            let path = workspace.save_history(prefix, &table, now)?;
            println!("Trade history saved to {}", path.display());
            Ok(())
        }
        HistoryCommand::List => {
            let files = workspace.list_history()?;
            if json {
                let names: Vec<String> = files.iter().map(|p| display_name(p)).collect();
                println!("{}", serde_json::to_string_pretty(&names)?);
            } else if files.is_empty() {
                println!("No trade history uploaded yet.");
            } else {
                for path in &files {
                    let rows = workspace.load_history(path).map(|t| t.len());
                    match rows {
                        Ok(n) => println!("{}  ({n} rows)", display_name(path)),
                        Err(e) => println!("{}  (unreadable: {e})", display_name(path)),
                    }
                }
            }
            Ok(())
        }
    }
}

/// Resolve the instrument column, apply the selection and the strike slider,
/// then print what is left.
fn run_filter(
    name: &str,
    table: Table,
    candidates: &[&str],
    args: &FilterArgs,
    json: bool,
) -> Result<()> {
    let mut session = Session::default();
    let override_column = args.column.as_deref().map(|c| [c]);
    let candidates = override_column.as_ref().map_or(candidates, |c| c.as_slice());
    session.set_table(name, Arc::new(table), candidates);

    if let Some(text) = &args.value {
        let (column, kind) = match (&session.table, &session.instrument_column) {
            (Some(table), Some(column)) => (column.clone(), table.column(column)?.kind()),
            _ => bail!(missing_candidates(candidates)),
        };
        let Some(value) = CellValue::parse_for(kind, text) else {
            bail!("'{text}' is not a valid {kind} value for column '{column}'");
        };
        let rows = session.select(value)?.len();
        info!("{rows} rows match {column} = {text}");
    }

    if let Some(strike) = args.strike {
        if let Some(view) = session.current_view() {
            if let Ok((lo, hi)) = numeric_bounds(view, &args.strike_column) {
                info!("{} spans {lo}..={hi}", args.strike_column);
            }
        }
        session.select_range(&args.strike_column, strike)?;
    }

    let view = session
        .current_view()
        .context("no table loaded")?;
    if json {
        let out = json!({
            "source": session.source_name,
            "column": session.instrument_column,
            "selection": session.selection,
            "notice": session.status_message,
            "table": view,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        if let Some(notice) = &session.status_message {
            eprintln!("{notice}");
        }
        print!("{}", render::format_table(view, args.limit));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn print_columns(table: &Table, candidates: &[&str], json: bool) -> Result<()> {
    let instrument = resolve(table, candidates);
    if json {
        let columns: Vec<_> = table
            .columns()
            .iter()
            .map(|c| json!({ "name": c.name, "kind": c.kind().label() }))
            .collect();
        let out = json!({
            "rows": table.len(),
            "columns": columns,
            "instrument_column": instrument,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }
    for c in table.columns() {
        let marker = if Some(c.name.as_str()) == instrument { "  *" } else { "" };
        println!("{}  [{}]{marker}", c.name, c.kind());
    }
    println!("({} rows)", table.len());
    Ok(())
}

fn print_table(table: &Table, limit: usize, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(table)?);
    } else {
        print!("{}", render::format_table(table, limit));
    }
    Ok(())
}

fn read_table(path: &Path) -> Result<Table> {
    let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let table = loader::load(&bytes, &display_name(path))
        .with_context(|| format!("loading {}", path.display()))?;
    Ok(table)
}

fn require_master(workspace: &Workspace) -> Result<Table> {
    workspace
        .load_master()?
        .context("No scrip master uploaded yet (an admin must upload one)")
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn missing_candidates(candidates: &[&str]) -> String {
    format!(
        "none of the expected columns were found: {}",
        candidates.join(", ")
    )
}
