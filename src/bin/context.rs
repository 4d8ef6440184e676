//! Create a space populated with every context source type (text
//! instructions, example question SQL, filters, expressions, measures,
//! sample questions, per-column configs), export it, then append to the
//! text instruction and resubmit.

use anyhow::Result;
use genie_spaces_rust::{
    logic, merge, AppConfig, ColumnConfig, ConfigDocument, ExampleQuestionSql, HttpStore,
    NewSpace, SampleQuestion, SpaceStore, SqlSnippet, TableSource, TextInstruction,
};

fn build_full_context_document(config: &AppConfig) -> ConfigDocument {
    let mut doc = ConfigDocument::new();

    merge::replace_list(
        doc.sample_questions_mut(),
        vec![
            SampleQuestion::new("What is our total revenue this quarter?"),
            SampleQuestion::new("Which companies have the most overdue invoices?"),
            SampleQuestion::new("Show me payment trends over the last 6 months."),
            SampleQuestion::new("What is the average invoice amount by company?"),
        ],
    );

    let invoices = TableSource {
        identifier: config.table("invoices"),
        column_configs: Some(vec![
            ColumnConfig {
                column_name: "amount".to_string(),
                enable_format_assistance: Some(true),
                ..ColumnConfig::default()
            },
            ColumnConfig {
                column_name: "company_id".to_string(),
                enable_entity_matching: Some(true),
                enable_format_assistance: Some(true),
                ..ColumnConfig::default()
            },
            ColumnConfig {
                column_name: "status".to_string(),
                enable_entity_matching: Some(true),
                enable_format_assistance: Some(true),
                ..ColumnConfig::default()
            },
        ]),
        ..TableSource::default()
    };
    merge::replace_list(
        doc.tables_mut(),
        vec![
            invoices,
            TableSource::new(config.table("accounts")),
            TableSource::new(config.table("payments")),
        ],
    );

    merge::replace_list(
        doc.text_instructions_mut(),
        vec![TextInstruction::new(vec![
            "This space answers questions about financial invoices and payments. ".to_string(),
            "All monetary values are in USD unless stated otherwise.\n".to_string(),
            "Key joins:\n".to_string(),
            "- invoices.company_id = accounts.account_id\n".to_string(),
            "- invoices.invoice_id = payments.invoice_id\n".to_string(),
        ])],
    );

    merge::replace_list(
        doc.example_question_sqls_mut(),
        vec![
            ExampleQuestionSql::new(
                vec!["Total revenue by quarter".to_string()],
                vec![
                    format!(
                        "SELECT fiscal_quarter, SUM(amount) AS total_revenue FROM {} ",
                        config.table("invoices")
                    ),
                    "GROUP BY fiscal_quarter ORDER BY fiscal_quarter".to_string(),
                ],
            ),
            ExampleQuestionSql::new(
                vec!["Overdue invoices by company".to_string()],
                vec![
                    "SELECT a.company_name, COUNT(*) AS overdue_count ".to_string(),
                    format!("FROM {} i ", config.table("invoices")),
                    format!("JOIN {} a ON i.company_id = a.account_id ", config.table("accounts")),
                    "WHERE i.status = 'OVERDUE' GROUP BY a.company_name".to_string(),
                ],
            ),
        ],
    );

    merge::replace_list(
        doc.filters_mut(),
        vec![
            SqlSnippet::new("invoices.status = 'PAID'", "Paid invoices only"),
            SqlSnippet::new(
                "invoices.invoice_date >= DATE_ADD(CURRENT_DATE(), -90)",
                "Last 90 days",
            ),
        ],
    );
    merge::replace_list(
        doc.expressions_mut(),
        vec![SqlSnippet::new(
            "CASE WHEN amount > 10000 THEN 'Large' WHEN amount > 1000 THEN 'Medium' ELSE 'Small' END",
            "invoice_size",
        )],
    );
    merge::replace_list(
        doc.measures_mut(),
        vec![
            SqlSnippet::new("SUM(amount)", "total_revenue"),
            SqlSnippet::new("COUNT(DISTINCT invoice_id)", "invoice_count"),
            SqlSnippet::new(
                "SUM(CASE WHEN status = 'OVERDUE' THEN amount ELSE 0 END)",
                "overdue_amount",
            ),
        ],
    );

    merge::normalize(&mut doc);
    doc
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut config = AppConfig::load()?;
    if let Some(profile) = std::env::args().nth(1) {
        config = config.with_cli_token(&profile)?;
    }
    let store = HttpStore::new(config.clone());

    println!("=== Create Space with Full Context ===");
    let doc = build_full_context_document(&config);
    let mut space = NewSpace::new("Finance Analytics Space")
        .description("Comprehensive financial analytics with full context")
        .document(&doc)?;
    if let Some(warehouse_id) = config.warehouse_id.clone() {
        space = space.warehouse_id(warehouse_id);
    }
    let space_id = store.create_space(&space)?.space_id;
    println!("Space created: {space_id}");

    println!("\n=== Export Context ===");
    let mut exported = logic::fetch_document(&store, &space_id)?;
    if let Some(instructions) = exported.instructions.as_ref() {
        println!(
            "Context present: text={}, examples={}, snippets={}",
            instructions.text_instructions.is_some(),
            instructions.example_question_sqls.is_some(),
            instructions.sql_snippets.is_some(),
        );
    }

    println!("\n=== Update Context ===");
    if let Some(first) = exported.text_instructions_mut().first_mut() {
        first
            .content
            .push("\nAdditional rule: Fiscal year starts in January.".to_string());
    }
    logic::submit_document(&store, &space_id, &mut exported)?;
    println!("Context updated.");

    Ok(())
}
