//! High-level fetch/mutate/submit operations on a space's config document.
//!
//! Each operation here is one non-atomic read-modify-write transaction:
//! fetch the serialized document, apply a single logical mutation through
//! the merge protocol, normalize, and submit the whole document back.
//! The remote store uses no optimistic-concurrency token, so a concurrent
//! writer between the fetch and the submit is silently overwritten
//! (last-writer-wins). Callers that need stronger guarantees must serialize
//! access themselves.

use crate::logic::merge;
use crate::model::{
    ConfigDocument, ExampleQuestionSql, Id, MetricView, SampleQuestion, SpaceUpdate, SqlSnippet,
    StatementResponse, TableSource, TextInstruction,
};
use crate::store::{SpaceStore, StatementStore};
use crate::{ApiError, Result};
use std::thread;
use std::time::Duration;

/// Fetch and parse the config document of a space.
pub fn fetch_document<S: SpaceStore + ?Sized>(store: &S, space_id: &Id) -> Result<ConfigDocument> {
    let space = store.get_space(space_id, true)?;
    let raw = space.serialized_space.ok_or_else(|| {
        ApiError::NotFound(format!("space {space_id} returned no serialized config"))
    })?;
    Ok(ConfigDocument::from_serialized(&raw)?)
}

/// Normalize, serialize, and send `doc` as a full replacement of the
/// space's configuration.
pub fn submit_document<S: SpaceStore + ?Sized>(
    store: &S,
    space_id: &Id,
    doc: &mut ConfigDocument,
) -> Result<()> {
    merge::normalize(doc);
    let raw = doc.to_serialized()?;
    store.update_space(space_id, &SpaceUpdate::serialized(raw))?;
    Ok(())
}

/// Attach a table or view to a space.
pub fn add_data_source<S: SpaceStore + ?Sized>(
    store: &S,
    space_id: &Id,
    identifier: &str,
) -> Result<()> {
    let mut doc = fetch_document(store, space_id)?;
    merge::add_entry(doc.tables_mut(), TableSource::new(identifier));
    submit_document(store, space_id, &mut doc)
}

/// Detach a table or view. Returns how many entries were removed; an
/// absent identifier removes nothing and is not an error.
pub fn remove_data_source<S: SpaceStore + ?Sized>(
    store: &S,
    space_id: &Id,
    identifier: &str,
) -> Result<usize> {
    let mut doc = fetch_document(store, space_id)?;
    let removed = merge::remove_entry(doc.tables_mut(), |t| t.identifier == identifier);
    submit_document(store, space_id, &mut doc)?;
    Ok(removed)
}

/// Replace every data source on a space with the given identifiers.
pub fn replace_data_sources<S: SpaceStore + ?Sized>(
    store: &S,
    space_id: &Id,
    identifiers: &[String],
) -> Result<()> {
    let mut doc = fetch_document(store, space_id)?;
    let tables = identifiers.iter().map(TableSource::new).collect();
    merge::replace_list(doc.tables_mut(), tables);
    submit_document(store, space_id, &mut doc)
}

/// Reference an externally governed metric view from the space.
pub fn attach_metric_view<S: SpaceStore + ?Sized>(
    store: &S,
    space_id: &Id,
    identifier: &str,
) -> Result<()> {
    let mut doc = fetch_document(store, space_id)?;
    doc.metric_views_mut().push(MetricView::new(identifier));
    submit_document(store, space_id, &mut doc)
}

/// Set the space's free-text instruction, replacing any existing one.
/// The remote API allows at most one entry, so this is a wholesale
/// replacement rather than an append.
pub fn set_text_instruction<S: SpaceStore + ?Sized>(
    store: &S,
    space_id: &Id,
    content: Vec<String>,
) -> Result<()> {
    let mut doc = fetch_document(store, space_id)?;
    merge::replace_list(
        doc.text_instructions_mut(),
        vec![TextInstruction::new(content)],
    );
    submit_document(store, space_id, &mut doc)
}

/// Add a curated question/SQL example.
pub fn add_example_question_sql<S: SpaceStore + ?Sized>(
    store: &S,
    space_id: &Id,
    question: Vec<String>,
    sql: Vec<String>,
) -> Result<()> {
    let mut doc = fetch_document(store, space_id)?;
    merge::add_entry(
        doc.example_question_sqls_mut(),
        ExampleQuestionSql::new(question, sql),
    );
    submit_document(store, space_id, &mut doc)
}

pub fn add_filter<S: SpaceStore + ?Sized>(
    store: &S,
    space_id: &Id,
    filter: SqlSnippet,
) -> Result<()> {
    let mut doc = fetch_document(store, space_id)?;
    merge::add_entry(doc.filters_mut(), filter);
    submit_document(store, space_id, &mut doc)
}

pub fn add_expression<S: SpaceStore + ?Sized>(
    store: &S,
    space_id: &Id,
    expression: SqlSnippet,
) -> Result<()> {
    let mut doc = fetch_document(store, space_id)?;
    merge::add_entry(doc.expressions_mut(), expression);
    submit_document(store, space_id, &mut doc)
}

pub fn add_measure<S: SpaceStore + ?Sized>(
    store: &S,
    space_id: &Id,
    measure: SqlSnippet,
) -> Result<()> {
    let mut doc = fetch_document(store, space_id)?;
    merge::add_entry(doc.measures_mut(), measure);
    submit_document(store, space_id, &mut doc)
}

/// Replace the full set of inline measures.
pub fn replace_measures<S: SpaceStore + ?Sized>(
    store: &S,
    space_id: &Id,
    measures: Vec<SqlSnippet>,
) -> Result<()> {
    let mut doc = fetch_document(store, space_id)?;
    merge::replace_list(doc.measures_mut(), measures);
    submit_document(store, space_id, &mut doc)
}

/// Add a sample question shown in the space UI.
pub fn add_sample_question<S: SpaceStore + ?Sized>(
    store: &S,
    space_id: &Id,
    question: &str,
) -> Result<()> {
    let mut doc = fetch_document(store, space_id)?;
    merge::add_entry(doc.sample_questions_mut(), SampleQuestion::new(question));
    submit_document(store, space_id, &mut doc)
}

/// Poll a submitted statement until it reaches a terminal state or
/// `max_polls` is exhausted. Returns the last response either way.
pub fn wait_for_statement<S: StatementStore + ?Sized>(
    store: &S,
    response: StatementResponse,
    max_polls: u32,
    poll_interval: Duration,
) -> Result<StatementResponse> {
    let mut current = response;
    for _ in 0..max_polls {
        if current.state().is_some_and(|state| state.is_terminal()) {
            return Ok(current);
        }
        // No id to poll with; report what we have.
        let Some(id) = current.statement_id.clone() else {
            return Ok(current);
        };
        thread::sleep(poll_interval);
        current = store.get_statement(&id)?;
    }
    Ok(current)
}
