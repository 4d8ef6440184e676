//! Add/update metrics on a space, two ways: inline measures in the config
//! document, and an externally governed metric view created via SQL DDL
//! and attached to the space's data sources.

use anyhow::Result;
use genie_spaces_rust::{
    logic, merge, AppConfig, ConfigDocument, HttpStore, NewSpace, SpaceStore, SqlSnippet,
    StatementRequest, StatementStore, TableSource, TextInstruction,
};

fn create_space_with_inline_measures(store: &HttpStore, config: &AppConfig) -> Result<String> {
    let mut doc = ConfigDocument::new();
    doc.tables_mut()
        .push(TableSource::new(config.table("invoices")));
    merge::replace_list(
        doc.text_instructions_mut(),
        vec![TextInstruction::new(vec![
            "This space answers questions about financial invoices.".to_string(),
        ])],
    );
    merge::replace_list(
        doc.measures_mut(),
        vec![
            SqlSnippet::new("SUM(amount)", "total_revenue"),
            SqlSnippet::new("COUNT(DISTINCT invoice_id)", "invoice_count"),
            SqlSnippet::new("AVG(amount)", "avg_invoice_amount"),
        ],
    );
    merge::normalize(&mut doc);

    let mut space = NewSpace::new("Finance Metrics Space")
        .description("Space with inline financial measures")
        .document(&doc)?;
    if let Some(warehouse_id) = config.warehouse_id.clone() {
        space = space.warehouse_id(warehouse_id);
    }
    let created = store.create_space(&space)?;
    Ok(created.space_id)
}

fn metric_view_ddl(config: &AppConfig) -> String {
    format!(
        r#"CREATE OR REPLACE VIEW {view}
WITH METRICS
LANGUAGE YAML
AS $$
  version: 1.1
  comment: "Invoice financial metrics"

  source: {source}

  dimensions:
    - name: Company ID
      expr: company_id

    - name: Status
      expr: status

  measures:
    - name: Total Revenue
      expr: SUM(amount)

    - name: Invoice Count
      expr: COUNT(DISTINCT invoice_id)
$$;"#,
        view = config.table("mv_invoice"),
        source = config.table("invoices"),
    )
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut config = AppConfig::load()?;
    if let Some(profile) = std::env::args().nth(1) {
        config = config.with_cli_token(&profile)?;
    }
    let store = HttpStore::new(config.clone());

    println!("=== Approach A: Inline Measures ===");
    let space_id = create_space_with_inline_measures(&store, &config)?;
    println!("Space created: {space_id}");

    println!("\nUpdating inline measures...");
    logic::replace_measures(
        &store,
        &space_id,
        vec![
            SqlSnippet::new("SUM(amount)", "total_revenue"),
            SqlSnippet::new(
                "SUM(amount) / NULLIF(COUNT(DISTINCT invoice_id), 0)",
                "revenue_per_invoice",
            ),
        ],
    )?;
    println!("Measures updated.");

    println!("\n=== Approach B: Metric Views ===");
    let warehouse_id = config.warehouse_id.clone().unwrap_or_default();
    let response =
        store.execute_statement(&StatementRequest::new(metric_view_ddl(&config), warehouse_id))?;
    if response.succeeded() {
        println!("Metric view created: {}", config.table("mv_invoice"));
        logic::attach_metric_view(&store, &space_id, &config.table("mv_invoice"))?;
        println!("Metric view attached.");
    } else {
        println!(
            "Metric view DDL not supported on this workspace (state: {:?})",
            response.state()
        );
    }

    Ok(())
}
