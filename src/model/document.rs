use crate::model::Id;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The nested config document attached to a space.
///
/// The remote API transmits this document as a JSON-encoded *string* embedded
/// in the outer request/response payload (double encoding). Use
/// [`ConfigDocument::from_serialized`] / [`ConfigDocument::to_serialized`] at
/// that boundary; the document must never be sent as a native nested object.
///
/// Every struct in the tree carries a flattened `extra` map so branches this
/// client does not model are round-tripped unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigDocument {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_sources: Option<DataSources>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<Instructions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<SpaceSettings>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataSources {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tables: Option<Vec<TableSource>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metric_views: Option<Vec<MetricView>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A table or view attached to a space. Identifiers use the three-level
/// `catalog.schema.table` namespace.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableSource {
    pub identifier: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column_configs: Option<Vec<ColumnConfig>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TableSource {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            ..Self::default()
        }
    }
}

/// Per-column synonyms, format hints, and entity matching for a table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColumnConfig {
    pub column_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_entity_matching: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_format_assistance: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// An externally governed metric view referenced by identifier.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricView {
    pub identifier: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl MetricView {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            extra: Map::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Instructions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_instructions: Option<Vec<TextInstruction>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example_question_sqls: Option<Vec<ExampleQuestionSql>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sql_snippets: Option<SqlSnippets>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Free-text domain knowledge. The remote API accepts at most one entry;
/// that cardinality rule is enforced server-side, not here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextInstruction {
    pub id: Id,
    pub content: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TextInstruction {
    pub fn new(content: Vec<String>) -> Self {
        Self {
            id: crate::model::generate_id(),
            content,
            extra: Map::new(),
        }
    }
}

/// A curated question/SQL pair used as a trusted example.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExampleQuestionSql {
    pub id: Id,
    pub question: Vec<String>,
    pub sql: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ExampleQuestionSql {
    pub fn new(question: Vec<String>, sql: Vec<String>) -> Self {
        Self {
            id: crate::model::generate_id(),
            question,
            sql,
            extra: Map::new(),
        }
    }
}

/// Named SQL snippet categories: pre-defined filters, calculated
/// expressions, and aggregation measures.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SqlSnippets {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filters: Option<Vec<SqlSnippet>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expressions: Option<Vec<SqlSnippet>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub measures: Option<Vec<SqlSnippet>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SqlSnippet {
    pub id: Id,
    pub sql: Vec<String>,
    pub display_name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SqlSnippet {
    pub fn new(sql: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: crate::model::generate_id(),
            sql: vec![sql.into()],
            display_name: display_name.into(),
            extra: Map::new(),
        }
    }
}

/// UI-facing settings, serialized under the `config` key of the document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpaceSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample_questions: Option<Vec<SampleQuestion>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SampleQuestion {
    pub id: Id,
    pub question: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SampleQuestion {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            id: crate::model::generate_id(),
            question: vec![question.into()],
            extra: Map::new(),
        }
    }
}

impl ConfigDocument {
    /// Current schema version tag for documents created by this client.
    pub const CURRENT_VERSION: u32 = 2;

    pub fn new() -> Self {
        Self {
            version: Some(Self::CURRENT_VERSION),
            ..Self::default()
        }
    }

    /// Parse the document out of the string-embedded JSON form.
    pub fn from_serialized(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Serialize the document into the string-embedded JSON form expected
    /// by the outer payload.
    pub fn to_serialized(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    // Get-or-create accessors for optional branches. These replace the
    // untyped `setdefault` chains of a dynamic-mapping approach: mutating
    // callers materialize exactly the branch they touch.

    pub fn data_sources_mut(&mut self) -> &mut DataSources {
        self.data_sources.get_or_insert_with(DataSources::default)
    }

    pub fn tables_mut(&mut self) -> &mut Vec<TableSource> {
        self.data_sources_mut().tables.get_or_insert_with(Vec::new)
    }

    pub fn metric_views_mut(&mut self) -> &mut Vec<MetricView> {
        self.data_sources_mut()
            .metric_views
            .get_or_insert_with(Vec::new)
    }

    pub fn instructions_mut(&mut self) -> &mut Instructions {
        self.instructions.get_or_insert_with(Instructions::default)
    }

    pub fn text_instructions_mut(&mut self) -> &mut Vec<TextInstruction> {
        self.instructions_mut()
            .text_instructions
            .get_or_insert_with(Vec::new)
    }

    pub fn example_question_sqls_mut(&mut self) -> &mut Vec<ExampleQuestionSql> {
        self.instructions_mut()
            .example_question_sqls
            .get_or_insert_with(Vec::new)
    }

    pub fn sql_snippets_mut(&mut self) -> &mut SqlSnippets {
        self.instructions_mut()
            .sql_snippets
            .get_or_insert_with(SqlSnippets::default)
    }

    pub fn filters_mut(&mut self) -> &mut Vec<SqlSnippet> {
        self.sql_snippets_mut().filters.get_or_insert_with(Vec::new)
    }

    pub fn expressions_mut(&mut self) -> &mut Vec<SqlSnippet> {
        self.sql_snippets_mut()
            .expressions
            .get_or_insert_with(Vec::new)
    }

    pub fn measures_mut(&mut self) -> &mut Vec<SqlSnippet> {
        self.sql_snippets_mut()
            .measures
            .get_or_insert_with(Vec::new)
    }

    pub fn settings_mut(&mut self) -> &mut SpaceSettings {
        self.config.get_or_insert_with(SpaceSettings::default)
    }

    pub fn sample_questions_mut(&mut self) -> &mut Vec<SampleQuestion> {
        self.settings_mut()
            .sample_questions
            .get_or_insert_with(Vec::new)
    }

    /// Read-only view of the tables list, if present.
    pub fn tables(&self) -> &[TableSource] {
        self.data_sources
            .as_ref()
            .and_then(|ds| ds.tables.as_deref())
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_document_deserializes_with_empty_branches() {
        let doc = ConfigDocument::from_serialized(r#"{"version": 2}"#).unwrap();
        assert_eq!(doc.version, Some(2));
        assert!(doc.data_sources.is_none());
        assert!(doc.instructions.is_none());
        assert!(doc.config.is_none());
    }

    #[test]
    fn unknown_branches_survive_a_round_trip() {
        let raw = r#"{"version":2,"experimental_flags":{"beta":true},"data_sources":{"tables":[{"identifier":"c.s.t","row_filter":"region = 'EU'"}]}}"#;
        let doc = ConfigDocument::from_serialized(raw).unwrap();
        assert_eq!(
            doc.extra.get("experimental_flags"),
            Some(&serde_json::json!({"beta": true}))
        );

        let reparsed = ConfigDocument::from_serialized(&doc.to_serialized().unwrap()).unwrap();
        assert_eq!(doc, reparsed);
        assert_eq!(
            reparsed.tables()[0].extra.get("row_filter"),
            Some(&serde_json::json!("region = 'EU'"))
        );
    }

    #[test]
    fn serialized_form_is_an_embedded_json_string() {
        let mut doc = ConfigDocument::new();
        doc.tables_mut().push(TableSource::new("c.s.invoices"));

        // The document travels as a string field inside the outer payload.
        let raw = doc.to_serialized().unwrap();
        let outer = serde_json::json!({ "serialized_space": raw });
        let embedded = outer["serialized_space"].as_str().unwrap();
        assert_eq!(ConfigDocument::from_serialized(embedded).unwrap(), doc);
    }

    #[test]
    fn accessors_materialize_missing_branches() {
        let mut doc = ConfigDocument::new();
        assert!(doc.instructions.is_none());
        doc.measures_mut().push(SqlSnippet::new("SUM(amount)", "total"));
        assert_eq!(
            doc.instructions
                .as_ref()
                .unwrap()
                .sql_snippets
                .as_ref()
                .unwrap()
                .measures
                .as_ref()
                .unwrap()
                .len(),
            1
        );
    }

    #[test]
    fn missing_required_fields_fail_to_parse() {
        // display_name is required on snippets
        let raw = r#"{"instructions":{"sql_snippets":{"measures":[{"id":"a","sql":["SUM(x)"]}]}}}"#;
        assert!(ConfigDocument::from_serialized(raw).is_err());
    }
}
