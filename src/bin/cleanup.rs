//! Delete spaces created by these examples and, optionally, the demo
//! tables/views and schema.
//!
//! Flags: `--tables` also drops demo tables/views, `--schema` drops the
//! demo schema. An optional `--profile=<name>` pulls a token from the
//! workspace CLI.

use anyhow::Result;
use genie_spaces_rust::{
    AppConfig, HttpStore, Space, SpaceStore, StatementRequest, StatementStore,
};
use std::io::{self, BufRead, Write};

const DEMO_TITLES: &[&str] = &[
    "Finance Metrics Space",
    "Finance Data Space",
    "Finance Analytics Space",
];

fn find_demo_spaces(store: &HttpStore) -> Result<Vec<Space>> {
    let spaces = store.list_spaces()?;
    Ok(spaces
        .into_iter()
        .filter(|s| {
            let title = s.title.to_lowercase();
            DEMO_TITLES.iter().any(|kw| title.contains(&kw.to_lowercase()))
        })
        .collect())
}

fn drop_demo_tables(store: &HttpStore, config: &AppConfig) -> Result<()> {
    let warehouse_id = config.warehouse_id.clone().unwrap_or_default();
    for name in ["invoices", "payments", "accounts", "mv_invoice"] {
        let object = config.table(name);
        let mut response = store.execute_statement(&StatementRequest::new(
            format!("DROP TABLE IF EXISTS {object}"),
            warehouse_id.clone(),
        ))?;
        if !response.succeeded() {
            // Views need a different DROP.
            response = store.execute_statement(&StatementRequest::new(
                format!("DROP VIEW IF EXISTS {object}"),
                warehouse_id.clone(),
            ))?;
        }
        println!("  {}: {:?}", object, response.state());
    }
    Ok(())
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{prompt} [y/N] ");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().eq_ignore_ascii_case("y"))
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut config = AppConfig::load()?;
    if let Some(profile) = args
        .iter()
        .find_map(|a| a.strip_prefix("--profile="))
    {
        config = config.with_cli_token(profile)?;
    }
    let store = HttpStore::new(config.clone());

    println!("=== Finding Demo Spaces ===");
    let demo_spaces = find_demo_spaces(&store)?;
    if demo_spaces.is_empty() {
        println!("  No demo spaces found.");
    } else {
        for space in &demo_spaces {
            println!("  {}: {}", space.space_id, space.title);
        }
        println!("\nFound {} space(s) to delete.", demo_spaces.len());
        if confirm("Delete these spaces?")? {
            for space in &demo_spaces {
                store.delete_space(&space.space_id)?;
                println!("  Deleted: {}", space.title);
            }
        } else {
            println!("  Skipped space deletion.");
        }
    }

    if args.iter().any(|a| a == "--tables") {
        println!("\n=== Dropping Demo Tables/Views ===");
        drop_demo_tables(&store, &config)?;
    }

    if args.iter().any(|a| a == "--schema") {
        println!("\n=== Dropping Demo Schema ===");
        let warehouse_id = config.warehouse_id.clone().unwrap_or_default();
        let response = store.execute_statement(&StatementRequest::new(
            format!("DROP SCHEMA IF EXISTS {}.{}", config.catalog, config.schema),
            warehouse_id,
        ))?;
        println!("  {}.{}: {:?}", config.catalog, config.schema, response.state());
    }

    if !args.iter().any(|a| a == "--tables" || a == "--schema") {
        println!("\nTip: use --tables to also drop demo tables, --schema to drop the schema.");
    }

    Ok(())
}
