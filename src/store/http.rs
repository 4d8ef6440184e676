use crate::config::AppConfig;
use crate::model::{
    AccessControlRequest, Id, NewSpace, ObjectPermissions, PermissionLevelInfo, Space, SpaceList,
    SpaceUpdate, StatementRequest, StatementResponse,
};
use crate::store::traits::{PermissionStore, SpaceStore, StatementStore};
use crate::{ApiError, Result};
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

const SPACES_PATH: &str = "/api/2.0/genie/spaces";
const PERMISSIONS_PATH: &str = "/api/2.0/permissions/genie";
const STATEMENTS_PATH: &str = "/api/2.0/sql/statements/";

/// Blocking HTTP client for the workspace REST API.
///
/// One network call per operation, no retries, no pagination. Failures map
/// onto [`ApiError`] by HTTP status; everything else propagates as a
/// transport error.
pub struct HttpStore {
    config: AppConfig,
    client: Client,
}

impl HttpStore {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }

    fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&impl Serialize>,
        query: &[(&str, &str)],
    ) -> Result<Value> {
        let url = format!("{}{}", self.config.host, path);
        log::debug!("{} {}", method, url);

        let mut builder: RequestBuilder = self
            .client
            .request(method, &url)
            .bearer_auth(&self.config.token);
        if !query.is_empty() {
            builder = builder.query(query);
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let response = builder.send()?;
        let status = response.status();
        let text = response.text()?;
        if !status.is_success() {
            return Err(Self::status_error(status, text));
        }
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&text)?)
    }

    fn status_error(status: StatusCode, message: String) -> ApiError {
        match status {
            StatusCode::NOT_FOUND => ApiError::NotFound(message),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ApiError::Unauthorized(message),
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                ApiError::Validation(message)
            }
            StatusCode::CONFLICT => ApiError::Conflict(message),
            _ => ApiError::Api {
                status: status.as_u16(),
                message,
            },
        }
    }

    fn decode<T: DeserializeOwned>(value: Value) -> Result<T> {
        Ok(serde_json::from_value(value)?)
    }
}

impl SpaceStore for HttpStore {
    fn create_space(&self, space: &NewSpace) -> Result<Space> {
        let value = self.request(Method::POST, SPACES_PATH, Some(space), &[])?;
        Self::decode(value)
    }

    fn get_space(&self, space_id: &Id, include_serialized: bool) -> Result<Space> {
        let path = format!("{SPACES_PATH}/{space_id}");
        let query: &[(&str, &str)] = if include_serialized {
            &[("include_serialized_space", "true")]
        } else {
            &[]
        };
        let value = self.request(Method::GET, &path, None::<&Value>, query)?;
        Self::decode(value)
    }

    fn update_space(&self, space_id: &Id, update: &SpaceUpdate) -> Result<Space> {
        let path = format!("{SPACES_PATH}/{space_id}");
        let value = self.request(Method::PATCH, &path, Some(update), &[])?;
        Self::decode(value)
    }

    fn delete_space(&self, space_id: &Id) -> Result<()> {
        let path = format!("{SPACES_PATH}/{space_id}");
        self.request(Method::DELETE, &path, None::<&Value>, &[])?;
        Ok(())
    }

    fn list_spaces(&self) -> Result<Vec<Space>> {
        let value = self.request(Method::GET, SPACES_PATH, None::<&Value>, &[])?;
        let list: SpaceList = Self::decode(value)?;
        Ok(list.spaces)
    }
}

#[derive(Debug, Serialize)]
struct AclPayload<'a> {
    access_control_list: &'a [AccessControlRequest],
}

#[derive(Debug, serde::Deserialize)]
struct PermissionLevelsResponse {
    #[serde(default)]
    permission_levels: Vec<PermissionLevelInfo>,
}

impl PermissionStore for HttpStore {
    fn get_permission_levels(&self, space_id: &Id) -> Result<Vec<PermissionLevelInfo>> {
        let path = format!("{PERMISSIONS_PATH}/{space_id}/permissionLevels");
        let value = self.request(Method::GET, &path, None::<&Value>, &[])?;
        let response: PermissionLevelsResponse = Self::decode(value)?;
        Ok(response.permission_levels)
    }

    fn get_permissions(&self, space_id: &Id) -> Result<ObjectPermissions> {
        let path = format!("{PERMISSIONS_PATH}/{space_id}");
        let value = self.request(Method::GET, &path, None::<&Value>, &[])?;
        Self::decode(value)
    }

    fn grant_permissions(
        &self,
        space_id: &Id,
        entries: &[AccessControlRequest],
    ) -> Result<ObjectPermissions> {
        let path = format!("{PERMISSIONS_PATH}/{space_id}");
        let payload = AclPayload {
            access_control_list: entries,
        };
        let value = self.request(Method::PATCH, &path, Some(&payload), &[])?;
        Self::decode(value)
    }

    fn replace_permissions(
        &self,
        space_id: &Id,
        entries: &[AccessControlRequest],
    ) -> Result<ObjectPermissions> {
        let path = format!("{PERMISSIONS_PATH}/{space_id}");
        let payload = AclPayload {
            access_control_list: entries,
        };
        let value = self.request(Method::PUT, &path, Some(&payload), &[])?;
        Self::decode(value)
    }
}

impl StatementStore for HttpStore {
    fn execute_statement(&self, request: &StatementRequest) -> Result<StatementResponse> {
        let value = self.request(Method::POST, STATEMENTS_PATH, Some(request), &[])?;
        Self::decode(value)
    }

    fn get_statement(&self, statement_id: &Id) -> Result<StatementResponse> {
        let path = format!("{STATEMENTS_PATH}{statement_id}");
        let value = self.request(Method::GET, &path, None::<&Value>, &[])?;
        Self::decode(value)
    }
}
