//! CLI smoke entry point.
//!
//! # Responsibility
//! - Open the inventory database described by a config file.
//! - Print paged listings and search hits for quick local sanity checks.

use basement_core::config::MEMORY_DB_PATH;
use basement_core::{
    core_version, init_logging_from_config, open_db, open_db_in_memory, search_all, CoreConfig,
    EntityKind, ListPage, ListService, ListSource, SearchQuery, SqliteAreaRepository,
    SqliteBoxRepository, SqliteItemRepository, SqliteShelfRepository,
};
use clap::{Parser, Subcommand, ValueEnum};
use log::info;
use std::error::Error;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "basement", version, about = "Basement inventory storage CLI")]
struct CliArgs {
    /// TOML config file; defaults apply when omitted.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Overrides `db_path` from the config.
    #[arg(long, value_name = "PATH")]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the core version.
    Version,
    /// List one kind of entity, one page at a time.
    List {
        #[arg(value_enum)]
        kind: KindArg,
        /// Label prefix filter.
        #[arg(long, default_value = "")]
        query: String,
        #[arg(long, default_value_t = 1)]
        page: u32,
        /// Rows per page; the config page size when omitted.
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Search labels, descriptions and parent labels across all kinds.
    Search {
        text: String,
        #[arg(long, value_enum)]
        kind: Option<KindArg>,
        #[arg(long, default_value_t = 20)]
        limit: u32,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum KindArg {
    Item,
    Box,
    Shelf,
    Area,
}

impl From<KindArg> for EntityKind {
    fn from(value: KindArg) -> Self {
        match value {
            KindArg::Item => EntityKind::Item,
            KindArg::Box => EntityKind::Box,
            KindArg::Shelf => EntityKind::Shelf,
            KindArg::Area => EntityKind::Area,
        }
    }
}

fn main() -> ExitCode {
    let args = CliArgs::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: CliArgs) -> Result<(), Box<dyn Error>> {
    let mut config = match &args.config {
        Some(path) => CoreConfig::load(path)?,
        None => CoreConfig::default(),
    };
    if let Some(db) = args.db {
        config.use_memory_db = db == Path::new(MEMORY_DB_PATH);
        config.db_path = db;
        config.validate()?;
    }

    if let Command::Version = args.command {
        println!("basement_core version={}", core_version());
        return Ok(());
    }

    init_logging_from_config(&config)?;
    let conn = if config.use_memory_db {
        open_db_in_memory()?
    } else {
        open_db(&config.db_path)?
    };
    info!("event=cli_start module=cli status=ok");

    match args.command {
        Command::Version => {}
        Command::List {
            kind,
            query,
            page,
            limit,
        } => {
            let page_size = config.page_size;
            let page_data = match EntityKind::from(kind) {
                EntityKind::Item => {
                    list_page(SqliteItemRepository::try_new(&conn)?, page_size, &query, limit, page)?
                }
                EntityKind::Box => {
                    list_page(SqliteBoxRepository::try_new(&conn)?, page_size, &query, limit, page)?
                }
                EntityKind::Shelf => list_page(
                    SqliteShelfRepository::try_new(&conn)?,
                    page_size,
                    &query,
                    limit,
                    page,
                )?,
                EntityKind::Area => {
                    list_page(SqliteAreaRepository::try_new(&conn)?, page_size, &query, limit, page)?
                }
            };
            print_page(&page_data);
        }
        Command::Search { text, kind, limit } => {
            let mut query = SearchQuery::new(text);
            query.kind = kind.map(EntityKind::from);
            query.limit = limit;
            for row in search_all(&conn, &query)? {
                println!(
                    "{:<5} {} {} in={}",
                    row.kind,
                    row.id,
                    row.label,
                    row.parent_label().unwrap_or("-")
                );
            }
        }
    }

    Ok(())
}

fn list_page<S: ListSource>(
    source: S,
    page_size: u32,
    query: &str,
    limit: Option<u32>,
    page: u32,
) -> Result<ListPage, Box<dyn Error>> {
    Ok(ListService::new(source, page_size).list_page(query, limit, page)?)
}

fn print_page(page: &ListPage) {
    for row in &page.rows {
        println!(
            "{} {} in={}",
            row.id,
            row.label,
            row.parent_label().unwrap_or("-")
        );
    }
    let buttons = page
        .pagination
        .buttons
        .iter()
        .map(|button| {
            if button.selected {
                format!("[{}]", button.text)
            } else {
                button.text.clone()
            }
        })
        .collect::<Vec<_>>();
    println!(
        "page {}/{} ({} rows) {}",
        page.pagination.current_page,
        page.pagination.total_pages,
        page.pagination.total_count,
        buttons.join(" ")
    );
}
