use genie_spaces_rust::{
    logic, merge, AccessControlRequest, ApiError, ConfigDocument, MemoryStore, NewSpace,
    PermissionLevel, PermissionStore, SpaceStore, SpaceUpdate, SqlSnippet, StatementRequest,
    StatementStore, TableSource, TextInstruction,
};
use std::time::Duration;

fn create_space_with_tables(store: &MemoryStore, tables: &[&str]) -> String {
    let mut doc = ConfigDocument::new();
    merge::replace_list(
        doc.tables_mut(),
        tables.iter().map(|t| TableSource::new(*t)).collect(),
    );
    let space = NewSpace::new("Finance Data Space")
        .description("lifecycle test space")
        .document(&doc)
        .unwrap();
    store.create_space(&space).unwrap().space_id
}

#[test]
fn add_data_source_is_visible_and_sorted_after_refetch() {
    let store = MemoryStore::new();
    let space_id = create_space_with_tables(&store, &["c.s.invoices", "c.s.payments"]);

    logic::add_data_source(&store, &space_id, "c.s.accounts").unwrap();

    let doc = logic::fetch_document(&store, &space_id).unwrap();
    let ids: Vec<_> = doc.tables().iter().map(|t| t.identifier.as_str()).collect();
    assert_eq!(ids, vec!["c.s.accounts", "c.s.invoices", "c.s.payments"]);
}

#[test]
fn remove_data_source_drops_the_table_and_survives_refetch() {
    let store = MemoryStore::new();
    let space_id =
        create_space_with_tables(&store, &["c.s.accounts", "c.s.invoices", "c.s.payments"]);

    let removed = logic::remove_data_source(&store, &space_id, "c.s.accounts").unwrap();
    assert_eq!(removed, 1);

    let doc = logic::fetch_document(&store, &space_id).unwrap();
    assert_eq!(doc.tables().len(), 2);
    assert!(doc.tables().iter().all(|t| t.identifier != "c.s.accounts"));
}

#[test]
fn remove_of_absent_identifier_is_not_an_error() {
    let store = MemoryStore::new();
    let space_id = create_space_with_tables(&store, &["c.s.invoices"]);

    let removed = logic::remove_data_source(&store, &space_id, "c.s.never_added").unwrap();
    assert_eq!(removed, 0);
    assert_eq!(logic::fetch_document(&store, &space_id).unwrap().tables().len(), 1);
}

#[test]
fn replace_data_sources_overwrites_the_full_list() {
    let store = MemoryStore::new();
    let space_id = create_space_with_tables(&store, &["c.s.old"]);

    logic::replace_data_sources(
        &store,
        &space_id,
        &["c.s.payments".to_string(), "c.s.accounts".to_string()],
    )
    .unwrap();

    let doc = logic::fetch_document(&store, &space_id).unwrap();
    let ids: Vec<_> = doc.tables().iter().map(|t| t.identifier.as_str()).collect();
    assert_eq!(ids, vec!["c.s.accounts", "c.s.payments"]);
}

#[test]
fn unsorted_submission_is_rejected_with_conflict() {
    let store = MemoryStore::new();
    let space_id = create_space_with_tables(&store, &["c.s.a"]);

    // Bypass the merge protocol and PATCH a deliberately unsorted list.
    let raw = r#"{"version":2,"data_sources":{"tables":[{"identifier":"c.s.b"},{"identifier":"c.s.a"}]}}"#;
    let err = store
        .update_space(&space_id, &SpaceUpdate::serialized(raw))
        .unwrap_err();
    assert!(matches!(err, ApiError::Conflict(_)), "got {err:?}");
}

#[test]
fn second_text_instruction_is_rejected_with_validation_error() {
    let store = MemoryStore::new();
    let space_id = create_space_with_tables(&store, &["c.s.a"]);

    let mut doc = logic::fetch_document(&store, &space_id).unwrap();
    merge::add_entry(
        doc.text_instructions_mut(),
        TextInstruction::new(vec!["first".to_string()]),
    );
    merge::add_entry(
        doc.text_instructions_mut(),
        TextInstruction::new(vec!["second".to_string()]),
    );
    let err = logic::submit_document(&store, &space_id, &mut doc).unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)), "got {err:?}");
}

#[test]
fn duplicate_table_identifier_is_rejected_with_validation_error() {
    let store = MemoryStore::new();
    let space_id = create_space_with_tables(&store, &["c.s.invoices"]);

    // The protocol does not deduplicate; the store rejects the duplicate.
    let err = logic::add_data_source(&store, &space_id, "c.s.invoices").unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)), "got {err:?}");
}

#[test]
fn measures_added_out_of_order_come_back_sorted() {
    let store = MemoryStore::new();
    let space_id = create_space_with_tables(&store, &["c.s.invoices"]);

    let mut doc = logic::fetch_document(&store, &space_id).unwrap();
    let mut b = SqlSnippet::new("SUM(amount)", "total");
    b.id = "b".to_string();
    let mut a = SqlSnippet::new("AVG(amount)", "average");
    a.id = "a".to_string();
    merge::add_entry(doc.measures_mut(), b);
    merge::add_entry(doc.measures_mut(), a);
    logic::submit_document(&store, &space_id, &mut doc).unwrap();

    let fetched = logic::fetch_document(&store, &space_id).unwrap();
    let ids: Vec<String> = fetched
        .instructions
        .unwrap()
        .sql_snippets
        .unwrap()
        .measures
        .unwrap()
        .into_iter()
        .map(|m| m.id)
        .collect();
    assert_eq!(ids, vec!["a", "b"]);
}

#[test]
fn deleted_space_is_gone() {
    let store = MemoryStore::new();
    let space_id = create_space_with_tables(&store, &["c.s.a"]);

    store.delete_space(&space_id).unwrap();

    let err = store.get_space(&space_id, true).unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)), "got {err:?}");
    let err = store.delete_space(&space_id).unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)), "got {err:?}");
}

#[test]
fn list_spaces_omits_the_serialized_config() {
    let store = MemoryStore::new();
    create_space_with_tables(&store, &["c.s.a"]);
    create_space_with_tables(&store, &["c.s.b"]);

    let spaces = store.list_spaces().unwrap();
    assert_eq!(spaces.len(), 2);
    assert!(spaces.iter().all(|s| s.serialized_space.is_none()));
}

#[test]
fn grants_are_additive_and_replace_is_destructive() {
    let store = MemoryStore::new();
    let space_id = create_space_with_tables(&store, &["c.s.a"]);

    let levels = store.get_permission_levels(&space_id).unwrap();
    assert_eq!(levels.len(), 4);

    store
        .grant_permissions(
            &space_id,
            &[AccessControlRequest::user(
                "analyst@company.com",
                PermissionLevel::CanRead,
            )],
        )
        .unwrap();
    let after_second = store
        .grant_permissions(
            &space_id,
            &[
                AccessControlRequest::user("analyst@company.com", PermissionLevel::CanEdit),
                AccessControlRequest::group("finance-admins", PermissionLevel::CanManage),
            ],
        )
        .unwrap();

    // Additive: the analyst keeps CAN_READ and gains CAN_EDIT.
    assert_eq!(after_second.access_control_list.len(), 2);
    let analyst = after_second
        .access_control_list
        .iter()
        .find(|e| e.principal() == "analyst@company.com")
        .unwrap();
    assert_eq!(
        analyst.levels(),
        vec![PermissionLevel::CanRead, PermissionLevel::CanEdit]
    );

    // Destructive: PUT replaces everything.
    let replaced = store
        .replace_permissions(
            &space_id,
            &[AccessControlRequest::service_principal(
                "etl-sp",
                PermissionLevel::CanRun,
            )],
        )
        .unwrap();
    assert_eq!(replaced.access_control_list.len(), 1);
    assert_eq!(replaced.access_control_list[0].principal(), "etl-sp");
}

#[test]
fn permissions_on_unknown_space_are_not_found() {
    let store = MemoryStore::new();
    let err = store.get_permissions(&"nope".to_string()).unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)), "got {err:?}");
}

#[test]
fn statements_execute_and_poll_to_a_terminal_state() {
    let store = MemoryStore::new();
    let response = store
        .execute_statement(&StatementRequest::new("SELECT 1", "wh-123"))
        .unwrap();
    assert!(response.statement_id.is_some());

    let settled =
        logic::wait_for_statement(&store, response, 5, Duration::from_millis(1)).unwrap();
    assert!(settled.succeeded());
}

#[test]
fn empty_statement_is_rejected() {
    let store = MemoryStore::new();
    let err = store
        .execute_statement(&StatementRequest::new("   ", "wh-123"))
        .unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)), "got {err:?}");
}

#[test]
fn unknown_branches_survive_the_full_round_trip() {
    let store = MemoryStore::new();
    let raw = r#"{"version":2,"experimental":{"flag":true},"data_sources":{"tables":[{"identifier":"c.s.t","comment":"keep"}]}}"#;
    let space = NewSpace {
        title: "Finance Data Space".to_string(),
        description: None,
        warehouse_id: None,
        serialized_space: Some(raw.to_string()),
    };
    let space_id = store.create_space(&space).unwrap().space_id;

    logic::add_data_source(&store, &space_id, "c.s.new").unwrap();

    let doc = logic::fetch_document(&store, &space_id).unwrap();
    assert_eq!(
        doc.extra.get("experimental"),
        Some(&serde_json::json!({"flag": true}))
    );
    let kept = doc
        .tables()
        .iter()
        .find(|t| t.identifier == "c.s.t")
        .unwrap();
    assert_eq!(kept.extra.get("comment"), Some(&serde_json::json!("keep")));
}
