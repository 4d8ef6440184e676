use crate::logic::merge::{self, SortKeyed};
use crate::model::{
    generate_id, AccessControlEntry, AccessControlRequest, ConfigDocument, Id, NewSpace,
    ObjectPermissions, PermissionGrant, PermissionLevel, PermissionLevelInfo, Space, SpaceUpdate,
    StatementRequest, StatementResponse, StatementState, StatementStatus,
};
use crate::store::traits::{PermissionStore, SpaceStore, StatementStore};
use crate::{ApiError, Result};
use itertools::Itertools;
use parking_lot::Mutex;
use std::collections::HashMap;

/// In-process stand-in for the remote workspace API, used by the
/// integration tests and offline demos.
///
/// It enforces the remote store's documented submit-side preconditions:
/// the serialized document must parse, every identifier-keyed list must be
/// sorted (rejected with `Conflict` otherwise), keys must be unique, and
/// at most one text instruction may be present (`ValidationError`).
#[derive(Default)]
pub struct MemoryStore {
    spaces: Mutex<HashMap<Id, Space>>,
    acls: Mutex<HashMap<Id, Vec<AccessControlEntry>>>,
    statements: Mutex<HashMap<Id, StatementResponse>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn validate_serialized(raw: &str) -> Result<()> {
        let doc = ConfigDocument::from_serialized(raw)
            .map_err(|e| ApiError::Validation(format!("malformed serialized config: {e}")))?;

        if !merge::is_normalized(&doc) {
            return Err(ApiError::Conflict(
                "identifier-keyed lists must be sorted ascending by their key".to_string(),
            ));
        }

        if let Some(instructions) = doc.instructions.as_ref() {
            if let Some(texts) = instructions.text_instructions.as_ref() {
                if texts.len() > 1 {
                    return Err(ApiError::Validation(
                        "at most one text instruction is allowed".to_string(),
                    ));
                }
                Self::check_unique_keys(texts)?;
            }
            if let Some(examples) = instructions.example_question_sqls.as_ref() {
                Self::check_unique_keys(examples)?;
            }
            if let Some(snippets) = instructions.sql_snippets.as_ref() {
                for list in [&snippets.filters, &snippets.expressions, &snippets.measures]
                    .into_iter()
                    .flatten()
                {
                    Self::check_unique_keys(list)?;
                }
            }
        }
        if let Some(tables) = doc.data_sources.as_ref().and_then(|ds| ds.tables.as_ref()) {
            Self::check_unique_keys(tables)?;
        }
        if let Some(questions) = doc
            .config
            .as_ref()
            .and_then(|settings| settings.sample_questions.as_ref())
        {
            Self::check_unique_keys(questions)?;
        }
        Ok(())
    }

    fn check_unique_keys<T: SortKeyed>(list: &[T]) -> Result<()> {
        // Lists arrive sorted, so duplicates are adjacent.
        for (a, b) in list.iter().tuple_windows() {
            if a.sort_key() == b.sort_key() {
                return Err(ApiError::Validation(format!(
                    "duplicate key: {}",
                    a.sort_key()
                )));
            }
        }
        Ok(())
    }

    fn same_principal(entry: &AccessControlEntry, request: &AccessControlRequest) -> bool {
        entry.user_name == request.user_name
            && entry.group_name == request.group_name
            && entry.service_principal_name == request.service_principal_name
    }

    fn entry_from_request(request: &AccessControlRequest) -> Result<AccessControlEntry> {
        let level = request
            .permission_level
            .ok_or_else(|| ApiError::Validation("permission_level is required".to_string()))?;
        Ok(AccessControlEntry {
            user_name: request.user_name.clone(),
            group_name: request.group_name.clone(),
            service_principal_name: request.service_principal_name.clone(),
            all_permissions: vec![PermissionGrant {
                permission_level: level,
                inherited: Some(false),
            }],
        })
    }

    fn permissions_response(&self, space_id: &Id) -> ObjectPermissions {
        ObjectPermissions {
            object_id: Some(format!("/genie/{space_id}")),
            object_type: Some("genie".to_string()),
            access_control_list: self.acls.lock().get(space_id).cloned().unwrap_or_default(),
        }
    }

    fn ensure_space(&self, space_id: &Id) -> Result<()> {
        if !self.spaces.lock().contains_key(space_id) {
            return Err(ApiError::NotFound(format!("space not found: {space_id}")));
        }
        Ok(())
    }
}

impl SpaceStore for MemoryStore {
    fn create_space(&self, space: &NewSpace) -> Result<Space> {
        if let Some(raw) = space.serialized_space.as_deref() {
            Self::validate_serialized(raw)?;
        }
        let created = Space {
            space_id: generate_id(),
            title: space.title.clone(),
            description: space.description.clone(),
            warehouse_id: space.warehouse_id.clone(),
            serialized_space: space.serialized_space.clone(),
            extra: serde_json::Map::new(),
        };
        self.spaces
            .lock()
            .insert(created.space_id.clone(), created.clone());
        Ok(created)
    }

    fn get_space(&self, space_id: &Id, include_serialized: bool) -> Result<Space> {
        let spaces = self.spaces.lock();
        let mut space = spaces
            .get(space_id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("space not found: {space_id}")))?;
        if !include_serialized {
            space.serialized_space = None;
        }
        Ok(space)
    }

    fn update_space(&self, space_id: &Id, update: &SpaceUpdate) -> Result<Space> {
        if let Some(raw) = update.serialized_space.as_deref() {
            Self::validate_serialized(raw)?;
        }
        let mut spaces = self.spaces.lock();
        let space = spaces
            .get_mut(space_id)
            .ok_or_else(|| ApiError::NotFound(format!("space not found: {space_id}")))?;
        if let Some(title) = update.title.clone() {
            space.title = title;
        }
        if let Some(description) = update.description.clone() {
            space.description = Some(description);
        }
        if let Some(warehouse_id) = update.warehouse_id.clone() {
            space.warehouse_id = Some(warehouse_id);
        }
        if let Some(raw) = update.serialized_space.clone() {
            space.serialized_space = Some(raw);
        }
        Ok(space.clone())
    }

    fn delete_space(&self, space_id: &Id) -> Result<()> {
        if self.spaces.lock().remove(space_id).is_none() {
            return Err(ApiError::NotFound(format!("space not found: {space_id}")));
        }
        self.acls.lock().remove(space_id);
        Ok(())
    }

    fn list_spaces(&self) -> Result<Vec<Space>> {
        let mut spaces: Vec<Space> = self
            .spaces
            .lock()
            .values()
            .map(|s| Space {
                // The list endpoint never includes the config document.
                serialized_space: None,
                ..s.clone()
            })
            .collect();
        spaces.sort_by(|a, b| a.space_id.cmp(&b.space_id));
        Ok(spaces)
    }
}

impl PermissionStore for MemoryStore {
    fn get_permission_levels(&self, space_id: &Id) -> Result<Vec<PermissionLevelInfo>> {
        self.ensure_space(space_id)?;
        Ok(vec![
            PermissionLevelInfo {
                permission_level: PermissionLevel::CanRead,
                description: "Ask questions, view responses, provide feedback".to_string(),
            },
            PermissionLevelInfo {
                permission_level: PermissionLevel::CanRun,
                description: "Same as CAN_READ".to_string(),
            },
            PermissionLevelInfo {
                permission_level: PermissionLevel::CanEdit,
                description: "Also add/edit instructions, sample questions, tables, context"
                    .to_string(),
            },
            PermissionLevelInfo {
                permission_level: PermissionLevel::CanManage,
                description: "Also monitor usage, modify permissions, delete the space"
                    .to_string(),
            },
        ])
    }

    fn get_permissions(&self, space_id: &Id) -> Result<ObjectPermissions> {
        self.ensure_space(space_id)?;
        Ok(self.permissions_response(space_id))
    }

    fn grant_permissions(
        &self,
        space_id: &Id,
        entries: &[AccessControlRequest],
    ) -> Result<ObjectPermissions> {
        self.ensure_space(space_id)?;
        {
            let mut acls = self.acls.lock();
            let acl = acls.entry(space_id.clone()).or_default();
            for request in entries {
                let level = request.permission_level.ok_or_else(|| {
                    ApiError::Validation("permission_level is required".to_string())
                })?;
                match acl.iter_mut().find(|e| Self::same_principal(e, request)) {
                    Some(existing) => {
                        if !existing
                            .all_permissions
                            .iter()
                            .any(|g| g.permission_level == level)
                        {
                            existing.all_permissions.push(PermissionGrant {
                                permission_level: level,
                                inherited: Some(false),
                            });
                        }
                    }
                    None => acl.push(Self::entry_from_request(request)?),
                }
            }
        }
        Ok(self.permissions_response(space_id))
    }

    fn replace_permissions(
        &self,
        space_id: &Id,
        entries: &[AccessControlRequest],
    ) -> Result<ObjectPermissions> {
        self.ensure_space(space_id)?;
        let replacement: Result<Vec<_>> =
            entries.iter().map(Self::entry_from_request).collect();
        self.acls.lock().insert(space_id.clone(), replacement?);
        Ok(self.permissions_response(space_id))
    }
}

impl StatementStore for MemoryStore {
    fn execute_statement(&self, request: &StatementRequest) -> Result<StatementResponse> {
        if request.statement.trim().is_empty() {
            return Err(ApiError::Validation("statement must not be empty".to_string()));
        }
        let response = StatementResponse {
            statement_id: Some(generate_id()),
            status: Some(StatementStatus {
                state: StatementState::Succeeded,
                error: None,
            }),
        };
        if let Some(id) = response.statement_id.clone() {
            self.statements.lock().insert(id, response.clone());
        }
        Ok(response)
    }

    fn get_statement(&self, statement_id: &Id) -> Result<StatementResponse> {
        self.statements
            .lock()
            .get(statement_id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("statement not found: {statement_id}")))
    }
}
