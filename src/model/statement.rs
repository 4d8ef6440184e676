use crate::model::Id;
use serde::{Deserialize, Serialize};

/// A SQL statement submitted to the statement-execution API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatementRequest {
    pub statement: String,
    pub warehouse_id: String,
    pub format: String,
    pub wait_timeout: String,
}

impl StatementRequest {
    pub fn new(statement: impl Into<String>, warehouse_id: impl Into<String>) -> Self {
        Self {
            statement: statement.into(),
            warehouse_id: warehouse_id.into(),
            format: "JSON_ARRAY".to_string(),
            wait_timeout: "50s".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatementState {
    Pending,
    Running,
    Succeeded,
    Failed,
    Canceled,
    Closed,
}

impl StatementState {
    /// Terminal states never transition further; polling should stop.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, StatementState::Pending | StatementState::Running)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementError {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementStatus {
    pub state: StatementState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<StatementError>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatementResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub statement_id: Option<Id>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<StatementStatus>,
}

impl StatementResponse {
    pub fn state(&self) -> Option<StatementState> {
        self.status.as_ref().map(|s| s.state)
    }

    pub fn succeeded(&self) -> bool {
        self.state() == Some(StatementState::Succeeded)
    }
}
