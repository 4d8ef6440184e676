//! Read-modify-sorted-write merge protocol for space config documents.
//!
//! The remote store requires every identifier-keyed list in a submitted
//! document to be sorted ascending by its key: `identifier` for
//! `data_sources.tables`, `id` for every other keyed list. This module
//! provides the list mutations and the [`normalize`] pass that re-establishes
//! that invariant before a document is sent back as a full replacement.
//!
//! The protocol is a stateless transform: a caller brackets it with one
//! `fetch` and one `submit`, and the remote store sees a whole-document
//! overwrite. Nothing here deduplicates keys — inserting an entry whose key
//! already exists is a caller error the remote store may reject.

use crate::model::{
    ConfigDocument, ExampleQuestionSql, SampleQuestion, SqlSnippet, TableSource, TextInstruction,
};
use itertools::Itertools;

/// Sort key of an entry in an identifier-keyed list.
pub trait SortKeyed {
    fn sort_key(&self) -> &str;
}

impl SortKeyed for TableSource {
    fn sort_key(&self) -> &str {
        &self.identifier
    }
}

impl SortKeyed for TextInstruction {
    fn sort_key(&self) -> &str {
        &self.id
    }
}

impl SortKeyed for ExampleQuestionSql {
    fn sort_key(&self) -> &str {
        &self.id
    }
}

impl SortKeyed for SqlSnippet {
    fn sort_key(&self) -> &str {
        &self.id
    }
}

impl SortKeyed for SampleQuestion {
    fn sort_key(&self) -> &str {
        &self.id
    }
}

/// Sort a list ascending by its declared key. Keys are unique, so no
/// tie-break is needed; the sort is stable regardless.
pub fn sort_entries<T: SortKeyed>(list: &mut [T]) {
    list.sort_by(|a, b| a.sort_key().cmp(b.sort_key()));
}

/// Append `entry` and re-sort the list.
pub fn add_entry<T: SortKeyed>(list: &mut Vec<T>, entry: T) {
    list.push(entry);
    sort_entries(list);
}

/// Remove every entry matching `predicate`, returning how many were
/// removed. Zero matches leaves the list unchanged and is not an error.
pub fn remove_entry<T, F>(list: &mut Vec<T>, predicate: F) -> usize
where
    F: Fn(&T) -> bool,
{
    let before = list.len();
    list.retain(|entry| !predicate(entry));
    before - list.len()
}

/// Discard the current contents and substitute `entries`, sorted.
pub fn replace_list<T: SortKeyed>(list: &mut Vec<T>, entries: Vec<T>) {
    *list = entries;
    sort_entries(list);
}

/// Re-sort every known identifier-keyed list in the document. Idempotent;
/// untouched branches (including unmodeled ones) are left as-is.
///
/// `data_sources.metric_views` carries no sort requirement and is not
/// reordered.
pub fn normalize(doc: &mut ConfigDocument) {
    if let Some(sources) = doc.data_sources.as_mut() {
        if let Some(tables) = sources.tables.as_mut() {
            sort_entries(tables);
        }
    }
    if let Some(instructions) = doc.instructions.as_mut() {
        if let Some(texts) = instructions.text_instructions.as_mut() {
            sort_entries(texts);
        }
        if let Some(examples) = instructions.example_question_sqls.as_mut() {
            sort_entries(examples);
        }
        if let Some(snippets) = instructions.sql_snippets.as_mut() {
            for list in [
                snippets.filters.as_mut(),
                snippets.expressions.as_mut(),
                snippets.measures.as_mut(),
            ]
            .into_iter()
            .flatten()
            {
                sort_entries(list);
            }
        }
    }
    if let Some(settings) = doc.config.as_mut() {
        if let Some(questions) = settings.sample_questions.as_mut() {
            sort_entries(questions);
        }
    }
}

fn is_sorted<T: SortKeyed>(list: &[T]) -> bool {
    list.iter()
        .tuple_windows()
        .all(|(a, b)| a.sort_key() <= b.sort_key())
}

fn sorted_or_absent<T: SortKeyed>(list: Option<&[T]>) -> bool {
    list.map_or(true, is_sorted)
}

/// Whether every keyed list already satisfies its sort invariant. The
/// remote store rejects submissions for which this is false.
pub fn is_normalized(doc: &ConfigDocument) -> bool {
    let tables_ok = sorted_or_absent(
        doc.data_sources
            .as_ref()
            .and_then(|sources| sources.tables.as_deref()),
    );

    let instructions_ok = doc.instructions.as_ref().map_or(true, |instructions| {
        let snippets_ok = instructions.sql_snippets.as_ref().map_or(true, |snippets| {
            [
                snippets.filters.as_deref(),
                snippets.expressions.as_deref(),
                snippets.measures.as_deref(),
            ]
            .into_iter()
            .flatten()
            .all(is_sorted)
        });
        sorted_or_absent(instructions.text_instructions.as_deref())
            && sorted_or_absent(instructions.example_question_sqls.as_deref())
            && snippets_ok
    });

    let questions_ok = sorted_or_absent(
        doc.config
            .as_ref()
            .and_then(|settings| settings.sample_questions.as_deref()),
    );

    tables_ok && instructions_ok && questions_ok
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MetricView;

    fn snippet(id: &str, sql: &str, name: &str) -> SqlSnippet {
        SqlSnippet {
            id: id.to_string(),
            sql: vec![sql.to_string()],
            display_name: name.to_string(),
            extra: serde_json::Map::new(),
        }
    }

    #[test]
    fn normalize_sorts_tables_by_identifier() {
        let mut doc = ConfigDocument::new();
        doc.tables_mut().push(TableSource::new("c.s.payments"));
        doc.tables_mut().push(TableSource::new("c.s.accounts"));

        normalize(&mut doc);

        let ids: Vec<_> = doc.tables().iter().map(|t| t.identifier.as_str()).collect();
        assert_eq!(ids, vec!["c.s.accounts", "c.s.payments"]);
    }

    #[test]
    fn add_entry_keeps_measures_sorted_by_id() {
        let mut doc = ConfigDocument::new();
        add_entry(doc.measures_mut(), snippet("b", "SUM(amount)", "total"));
        add_entry(doc.measures_mut(), snippet("a", "AVG(amount)", "average"));
        normalize(&mut doc);

        let ids: Vec<_> = doc
            .instructions
            .as_ref()
            .unwrap()
            .sql_snippets
            .as_ref()
            .unwrap()
            .measures
            .as_ref()
            .unwrap()
            .iter()
            .map(|m| m.id.as_str())
            .collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn normalize_is_idempotent() {
        let mut doc = ConfigDocument::new();
        doc.tables_mut().push(TableSource::new("c.s.z"));
        doc.tables_mut().push(TableSource::new("c.s.a"));
        doc.filters_mut().push(snippet("9", "x > 0", "positive"));
        doc.filters_mut().push(snippet("1", "x < 0", "negative"));
        doc.sample_questions_mut().push(SampleQuestion {
            id: "zz".to_string(),
            question: vec!["What changed?".to_string()],
            extra: serde_json::Map::new(),
        });

        normalize(&mut doc);
        let once = doc.clone();
        normalize(&mut doc);
        assert_eq!(doc, once);
    }

    #[test]
    fn every_keyed_list_is_non_decreasing_after_mutations() {
        let mut doc = ConfigDocument::new();
        add_entry(doc.tables_mut(), TableSource::new("c.s.m"));
        add_entry(doc.tables_mut(), TableSource::new("c.s.a"));
        replace_list(
            doc.expressions_mut(),
            vec![snippet("c", "a+b", "sum"), snippet("a", "a-b", "diff")],
        );
        remove_entry(doc.tables_mut(), |t| t.identifier == "c.s.m");
        add_entry(
            doc.example_question_sqls_mut(),
            ExampleQuestionSql {
                id: "q2".to_string(),
                question: vec!["total?".to_string()],
                sql: vec!["SELECT 1".to_string()],
                extra: serde_json::Map::new(),
            },
        );

        assert!(is_normalized(&doc));
    }

    #[test]
    fn remove_entry_on_absent_key_is_a_noop() {
        let mut doc = ConfigDocument::new();
        doc.tables_mut().push(TableSource::new("c.s.a"));
        doc.tables_mut().push(TableSource::new("c.s.b"));
        normalize(&mut doc);
        let before = doc.clone();

        let removed = remove_entry(doc.tables_mut(), |t| t.identifier == "c.s.missing");
        normalize(&mut doc);

        assert_eq!(removed, 0);
        assert_eq!(doc, before);
    }

    #[test]
    fn normalize_preserves_untouched_fields_byte_for_byte() {
        let raw = r#"{"version":2,"custom_branch":{"nested":[1,2,3]},"instructions":{"text_instructions":[{"id":"t1","content":["keep me"],"origin":"manual"}]}}"#;
        let mut doc = ConfigDocument::from_serialized(raw).unwrap();
        let before = doc.to_serialized().unwrap();
        normalize(&mut doc);
        assert_eq!(doc.to_serialized().unwrap(), before);
    }

    #[test]
    fn metric_views_are_not_reordered() {
        let mut doc = ConfigDocument::new();
        doc.metric_views_mut().push(MetricView::new("c.s.mv_b"));
        doc.metric_views_mut().push(MetricView::new("c.s.mv_a"));
        normalize(&mut doc);

        let ids: Vec<_> = doc
            .data_sources
            .as_ref()
            .unwrap()
            .metric_views
            .as_ref()
            .unwrap()
            .iter()
            .map(|v| v.identifier.as_str())
            .collect();
        assert_eq!(ids, vec!["c.s.mv_b", "c.s.mv_a"]);
    }

    #[test]
    fn is_normalized_detects_unsorted_lists() {
        let mut doc = ConfigDocument::new();
        doc.tables_mut().push(TableSource::new("c.s.b"));
        doc.tables_mut().push(TableSource::new("c.s.a"));
        assert!(!is_normalized(&doc));
        normalize(&mut doc);
        assert!(is_normalized(&doc));
    }
}
