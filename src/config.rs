use serde::{Deserialize, Serialize};
use std::process::Command;

/// Client configuration: workspace host, bearer token, and defaults used
/// by the demo binaries.
///
/// Constructed once at startup and passed into [`crate::store::HttpStore`];
/// never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub token: String,
    pub warehouse_id: Option<String>,
    pub catalog: String,
    pub schema: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            token: String::new(),
            warehouse_id: None,
            catalog: "demo".to_string(),
            schema: "finance".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CliToken {
    access_token: String,
}

impl AppConfig {
    /// Load configuration from environment variables and an optional
    /// config file. Environment variables use the `DATABRICKS_` prefix:
    /// `DATABRICKS_HOST`, `DATABRICKS_TOKEN`, `DATABRICKS_WAREHOUSE_ID`,
    /// `DATABRICKS_CATALOG`, `DATABRICKS_SCHEMA`.
    pub fn load() -> anyhow::Result<Self> {
        let mut config = config::Config::builder();

        config = config.add_source(config::Config::try_from(&AppConfig::default())?);
        config = config.add_source(config::File::with_name("config").required(false));
        config = config.add_source(config::Environment::with_prefix("DATABRICKS"));

        let config = config.build()?;
        let app_config: AppConfig = config.try_deserialize()?;

        Ok(app_config)
    }

    /// Replace the token with one obtained from the workspace CLI
    /// (`databricks auth token --profile=<profile>`). The CLI is treated
    /// as an opaque credential provider; its output is expected to be a
    /// JSON object carrying `access_token`.
    pub fn with_cli_token(mut self, profile: &str) -> anyhow::Result<Self> {
        let output = Command::new("databricks")
            .args(["auth", "token", &format!("--profile={profile}")])
            .output()?;
        if !output.status.success() {
            anyhow::bail!(
                "databricks auth token failed: {}",
                String::from_utf8_lossy(&output.stderr)
            );
        }
        let token: CliToken = serde_json::from_slice(&output.stdout)?;
        self.token = token.access_token;
        Ok(self)
    }

    /// Three-level namespace for a table in the configured catalog/schema.
    pub fn table(&self, name: &str) -> String {
        format!("{}.{}.{}", self.catalog, self.schema, name)
    }
}
