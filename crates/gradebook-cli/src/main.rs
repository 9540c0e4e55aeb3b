//! `gradebook` - inspect and edit course grade tables
//!
//! Inputs are JSON documents read from a file argument or stdin; results are
//! printed to stdout as JSON. Logs go to stderr.

use anyhow::{Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command};
use gradebook_service::{GradeService, GradebookConfig, StoreConfig};
use gradebook_table::{CourseId, GradeTable, Patches, RawRow, RawTable};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::io::Read;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Rows accepted by `upsert`: a single row object or an array of rows
#[derive(Deserialize)]
#[serde(untagged)]
enum RowsInput {
    One(RawRow),
    Many(Vec<RawRow>),
}

impl RowsInput {
    fn into_rows(self) -> Vec<RawRow> {
        match self {
            Self::One(row) => vec![row],
            Self::Many(rows) => rows,
        }
    }
}

fn course_arg() -> Arg {
    Arg::new("course")
        .required(true)
        .help("Course id from the catalog")
}

fn input_arg() -> Arg {
    Arg::new("input")
        .help("JSON input file; reads stdin when absent or '-'")
}

fn cli() -> Command {
    Command::new("gradebook")
        .version(gradebook_service::VERSION)
        .about("Per-course gradebooks with validated edits")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(clap::value_parser!(PathBuf))
                .help("TOML configuration file"),
        )
        .arg(
            Arg::new("db")
                .long("db")
                .global(true)
                .value_parser(clap::value_parser!(PathBuf))
                .help("SQLite database file, overriding the configured store"),
        )
        .arg(
            Arg::new("catalog")
                .long("catalog")
                .global(true)
                .value_parser(clap::value_parser!(PathBuf))
                .help("YAML course catalog, overriding the configured path"),
        )
        .subcommand(
            Command::new("show")
                .about("Print the full table, computed columns included")
                .arg(course_arg()),
        )
        .subcommand(
            Command::new("stats")
                .about("Print per-column statistics")
                .arg(course_arg()),
        )
        .subcommand(
            Command::new("load")
                .about("Replace a course table with a raw table document")
                .arg(course_arg())
                .arg(input_arg()),
        )
        .subcommand(
            Command::new("add-columns")
                .about("Add empty columns to every row")
                .arg(course_arg())
                .arg(
                    Arg::new("columns")
                        .required(true)
                        .action(ArgAction::Append)
                        .help("Column ids to add"),
                ),
        )
        .subcommand(
            Command::new("upsert")
                .about("Insert or replace rows (object or array of objects)")
                .arg(course_arg())
                .arg(input_arg()),
        )
        .subcommand(
            Command::new("patch")
                .about("Overwrite cells: {rowId: {colId: value}}")
                .arg(course_arg())
                .arg(input_arg()),
        )
        .subcommand(Command::new("clear").about("Remove every stored course table"))
}

fn load_config(matches: &ArgMatches) -> Result<GradebookConfig> {
    let mut config = match matches.get_one::<PathBuf>("config") {
        Some(path) => GradebookConfig::from_path(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => GradebookConfig::new(),
    };
    if let Some(db) = matches.get_one::<PathBuf>("db") {
        config = config.with_store(StoreConfig::Sqlite { path: db.clone() });
    }
    if let Some(catalog) = matches.get_one::<PathBuf>("catalog") {
        config = config.with_catalog_path(catalog.clone());
    }
    Ok(config)
}

fn init_tracing(config: &GradebookConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn read_json<T: DeserializeOwned>(args: &ArgMatches) -> Result<T> {
    let text = match args.get_one::<String>("input").map(String::as_str) {
        None | Some("-") => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("reading stdin")?;
            text
        }
        Some(path) => std::fs::read_to_string(path).with_context(|| format!("reading {path}"))?,
    };
    serde_json::from_str(&text).context("parsing JSON input")
}

fn course_of(args: &ArgMatches) -> Result<CourseId> {
    args.get_one::<String>("course")
        .map(|c| CourseId::new(c.as_str()))
        .context("missing course id")
}

fn print_table(table: &GradeTable) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(&table.get_full_table())?);
    Ok(())
}

async fn run(service: &GradeService, matches: &ArgMatches) -> Result<()> {
    match matches.subcommand() {
        Some(("show", args)) => {
            let table = service.get_grades(&course_of(args)?).await?;
            print_table(&table)
        }
        Some(("stats", args)) => {
            let stats = service.column_stats(&course_of(args)?).await?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
            Ok(())
        }
        Some(("load", args)) => {
            let raw: RawTable = read_json(args)?;
            let table = service.load(&course_of(args)?, raw).await?;
            print_table(&table)
        }
        Some(("add-columns", args)) => {
            let columns: Vec<&str> = args
                .get_many::<String>("columns")
                .map(|cols| cols.map(String::as_str).collect())
                .unwrap_or_default();
            let table = service
                .add_columns(&course_of(args)?, columns.as_slice())
                .await?;
            print_table(&table)
        }
        Some(("upsert", args)) => {
            let rows: RowsInput = read_json(args)?;
            let table = service
                .upsert_rows(&course_of(args)?, rows.into_rows())
                .await?;
            print_table(&table)
        }
        Some(("patch", args)) => {
            let patches: Patches = read_json(args)?;
            let table = service.patch(&course_of(args)?, &patches).await?;
            print_table(&table)
        }
        Some(("clear", _)) => {
            service.clear().await?;
            Ok(())
        }
        _ => anyhow::bail!("unknown command"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let matches = cli().get_matches();
    let config = load_config(&matches)?;
    init_tracing(&config);

    let service = GradeService::from_config(&config).context("opening gradebook")?;
    let outcome = run(&service, &matches).await;
    if let Err(err) = service.close().await {
        tracing::warn!("Failed to close store: {}", err);
    }
    outcome
}
