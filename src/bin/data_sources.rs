//! Full data-source lifecycle on a space: list spaces, create one with
//! sorted tables, remove a table, and print the resulting config.

use anyhow::Result;
use genie_spaces_rust::{
    logic, merge, AppConfig, ConfigDocument, HttpStore, NewSpace, SpaceStore, TableSource,
    TextInstruction,
};

fn create_space_with_data_sources(store: &HttpStore, config: &AppConfig) -> Result<String> {
    let mut doc = ConfigDocument::new();
    merge::replace_list(
        doc.tables_mut(),
        vec![
            TableSource::new(config.table("invoices")),
            TableSource::new(config.table("payments")),
            TableSource::new(config.table("accounts")),
        ],
    );
    merge::replace_list(
        doc.text_instructions_mut(),
        vec![TextInstruction::new(vec![
            "This space answers questions about invoices, payments, and accounts.".to_string(),
        ])],
    );

    let mut space = NewSpace::new("Finance Data Space")
        .description("Space for financial data exploration")
        .document(&doc)?;
    if let Some(warehouse_id) = config.warehouse_id.clone() {
        space = space.warehouse_id(warehouse_id);
    }
    Ok(store.create_space(&space)?.space_id)
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut config = AppConfig::load()?;
    if let Some(profile) = std::env::args().nth(1) {
        config = config.with_cli_token(&profile)?;
    }
    let store = HttpStore::new(config.clone());

    println!("=== List Spaces ===");
    for space in store.list_spaces()?.iter().take(5) {
        println!("  {}: {}", space.space_id, space.title);
    }

    println!("\n=== Create Space with Data Sources ===");
    let space_id = create_space_with_data_sources(&store, &config)?;
    println!("Space created: {space_id}");

    println!("\n=== Remove Data Source ===");
    let removed = logic::remove_data_source(&store, &space_id, &config.table("accounts"))?;
    println!("Removed {} entry(ies): {}", removed, config.table("accounts"));

    println!("\n=== Current Config ===");
    let doc = logic::fetch_document(&store, &space_id)?;
    for table in doc.tables() {
        println!("  {}", table.identifier);
    }

    Ok(())
}
