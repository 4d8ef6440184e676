use crate::model::{
    AccessControlRequest, Id, NewSpace, ObjectPermissions, PermissionLevelInfo, Space, SpaceUpdate,
    StatementRequest, StatementResponse,
};
use crate::Result;

/// Space CRUD against the remote workspace API.
pub trait SpaceStore: Send + Sync {
    fn create_space(&self, space: &NewSpace) -> Result<Space>;
    /// `include_serialized` controls whether the full config document is
    /// returned alongside the space metadata.
    fn get_space(&self, space_id: &Id, include_serialized: bool) -> Result<Space>;
    fn update_space(&self, space_id: &Id, update: &SpaceUpdate) -> Result<Space>;
    fn delete_space(&self, space_id: &Id) -> Result<()>;
    fn list_spaces(&self) -> Result<Vec<Space>>;
}

/// Access-control management for spaces.
pub trait PermissionStore: Send + Sync {
    fn get_permission_levels(&self, space_id: &Id) -> Result<Vec<PermissionLevelInfo>>;
    fn get_permissions(&self, space_id: &Id) -> Result<ObjectPermissions>;
    /// Additive: existing grants for other principals are kept.
    fn grant_permissions(
        &self,
        space_id: &Id,
        entries: &[AccessControlRequest],
    ) -> Result<ObjectPermissions>;
    /// Destructive: replaces the entire access-control list.
    fn replace_permissions(
        &self,
        space_id: &Id,
        entries: &[AccessControlRequest],
    ) -> Result<ObjectPermissions>;
}

/// SQL statement submission and polling.
pub trait StatementStore: Send + Sync {
    fn execute_statement(&self, request: &StatementRequest) -> Result<StatementResponse>;
    fn get_statement(&self, statement_id: &Id) -> Result<StatementResponse>;
}

pub trait Store: SpaceStore + PermissionStore + StatementStore {}
impl<T: SpaceStore + PermissionStore + StatementStore> Store for T {}
