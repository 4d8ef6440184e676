use serde::{Deserialize, Serialize};

/// Permission levels valid on a space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PermissionLevel {
    /// Ask questions, view responses, provide feedback.
    CanRead,
    /// Same rights as CAN_READ.
    CanRun,
    /// Also add/edit instructions, sample questions, tables, context.
    CanEdit,
    /// Also monitor usage, modify permissions, delete the space.
    CanManage,
}

/// One grant request: exactly one principal field should be set.
///
/// The update endpoint takes `permission_level` directly on the entry,
/// not nested under `all_permissions`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccessControlRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_principal_name: Option<String>,
    pub permission_level: Option<PermissionLevel>,
}

impl AccessControlRequest {
    pub fn user(name: impl Into<String>, level: PermissionLevel) -> Self {
        Self {
            user_name: Some(name.into()),
            permission_level: Some(level),
            ..Self::default()
        }
    }

    pub fn group(name: impl Into<String>, level: PermissionLevel) -> Self {
        Self {
            group_name: Some(name.into()),
            permission_level: Some(level),
            ..Self::default()
        }
    }

    pub fn service_principal(name: impl Into<String>, level: PermissionLevel) -> Self {
        Self {
            service_principal_name: Some(name.into()),
            permission_level: Some(level),
            ..Self::default()
        }
    }

    /// The principal this entry names, whichever field is set.
    pub fn principal(&self) -> &str {
        self.user_name
            .as_deref()
            .or(self.group_name.as_deref())
            .or(self.service_principal_name.as_deref())
            .unwrap_or("unknown")
    }
}

/// One permission held by a principal, as reported by the get endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PermissionGrant {
    pub permission_level: PermissionLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inherited: Option<bool>,
}

/// Response-side ACL entry: a principal plus all levels it holds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccessControlEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_principal_name: Option<String>,
    #[serde(default)]
    pub all_permissions: Vec<PermissionGrant>,
}

impl AccessControlEntry {
    pub fn principal(&self) -> &str {
        self.user_name
            .as_deref()
            .or(self.group_name.as_deref())
            .or(self.service_principal_name.as_deref())
            .unwrap_or("unknown")
    }

    pub fn levels(&self) -> Vec<PermissionLevel> {
        self.all_permissions
            .iter()
            .map(|p| p.permission_level)
            .collect()
    }
}

/// Full access-control state of one space.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ObjectPermissions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object_type: Option<String>,
    #[serde(default)]
    pub access_control_list: Vec<AccessControlEntry>,
}

/// One valid permission level with its human-readable description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PermissionLevelInfo {
    pub permission_level: PermissionLevel,
    #[serde(default)]
    pub description: String,
}
