use crate::adapters::atlas::DEFAULT_ATLAS_ENDPOINT;
use crate::adapters::gcp::DEFAULT_SECRET_MANAGER_ENDPOINT;
use crate::app::reports::query_report::QueryRequest;
use crate::config::toml_config::FileConfig;
use crate::utils::error::{ReporterError, Result};
use crate::utils::validation::*;

pub const DEFAULT_OUTPUT_PATH: &str = "./output";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum Command {
    RotateCredentials,
    #[default]
    ClusterReport,
    DatabaseReport,
    UserReport,
    GridfsReport,
    ExecuteQuery,
}

impl Command {
    pub fn name(self) -> &'static str {
        match self {
            Command::RotateCredentials => "rotate-credentials",
            Command::ClusterReport => "cluster-report",
            Command::DatabaseReport => "database-report",
            Command::UserReport => "user-report",
            Command::GridfsReport => "gridfs-report",
            Command::ExecuteQuery => "execute-query",
        }
    }

    fn needs_atlas(self) -> bool {
        matches!(
            self,
            Command::RotateCredentials | Command::ClusterReport | Command::UserReport
        )
    }

    fn needs_mongo(self) -> bool {
        matches!(
            self,
            Command::DatabaseReport | Command::GridfsReport | Command::ExecuteQuery
        )
    }
}

/// Values given on the command line. They win over the configuration file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub project_name: Option<String>,
    pub cluster: Option<String>,
    pub database: Option<String>,
    pub collection: Option<String>,
    pub atlas_public_key: Option<String>,
    pub atlas_private_key: Option<String>,
    pub connection_string: Option<String>,
    pub gcp_project_id: Option<String>,
    pub query: Option<String>,
    pub output_path: Option<String>,
}

/// Resolved run configuration, built once at startup and passed by reference.
#[derive(Clone, Default)]
pub struct Settings {
    pub command: Command,
    pub project_name: Option<String>,
    pub cluster: Option<String>,
    pub database: Option<String>,
    pub collection: Option<String>,
    pub atlas_endpoint: String,
    pub atlas_public_key: Option<String>,
    pub atlas_private_key: Option<String>,
    pub connection_string: Option<String>,
    pub gcp_project_id: Option<String>,
    pub gcp_access_token: Option<String>,
    pub gcp_secret_endpoint: String,
    pub query: Option<String>,
    pub output_path: String,
    pub monitor: bool,
}

impl Settings {
    pub fn resolve(command: Command, overrides: Overrides, file: FileConfig) -> Self {
        Self {
            command,
            project_name: overrides.project_name.or(file.atlas.project_name),
            cluster: overrides.cluster,
            database: overrides.database,
            collection: overrides.collection,
            atlas_endpoint: file
                .atlas
                .endpoint
                .unwrap_or_else(|| DEFAULT_ATLAS_ENDPOINT.to_string()),
            atlas_public_key: overrides.atlas_public_key.or(file.atlas.public_key),
            atlas_private_key: overrides.atlas_private_key.or(file.atlas.private_key),
            connection_string: overrides.connection_string.or(file.mongo.connection_string),
            gcp_project_id: overrides.gcp_project_id.or(file.gcp.project_id),
            gcp_access_token: file.gcp.access_token,
            gcp_secret_endpoint: file
                .gcp
                .secret_endpoint
                .unwrap_or_else(|| DEFAULT_SECRET_MANAGER_ENDPOINT.to_string()),
            query: overrides.query,
            output_path: overrides
                .output_path
                .or(file.output.path)
                .unwrap_or_else(|| DEFAULT_OUTPUT_PATH.to_string()),
            monitor: false,
        }
    }

    pub fn with_monitoring(mut self, enabled: bool) -> Self {
        self.monitor = enabled;
        self
    }

    /// The parsed `--query`, with `--db`/`--collection` as fallbacks.
    pub fn query_request(&self) -> Result<QueryRequest> {
        let query = validate_required_field("query", &self.query)?;
        QueryRequest::parse(query, self.database.as_deref(), self.collection.as_deref())
    }
}

// 金鑰與 token 不輸出
impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redact = |v: &Option<String>| v.as_ref().map(|_| "<redacted>");
        f.debug_struct("Settings")
            .field("command", &self.command)
            .field("project_name", &self.project_name)
            .field("cluster", &self.cluster)
            .field("database", &self.database)
            .field("collection", &self.collection)
            .field("atlas_endpoint", &self.atlas_endpoint)
            .field("atlas_public_key", &self.atlas_public_key)
            .field("atlas_private_key", &redact(&self.atlas_private_key))
            .field("connection_string", &redact(&self.connection_string))
            .field("gcp_project_id", &self.gcp_project_id)
            .field("gcp_access_token", &redact(&self.gcp_access_token))
            .field("gcp_secret_endpoint", &self.gcp_secret_endpoint)
            .field("query", &self.query)
            .field("output_path", &self.output_path)
            .field("monitor", &self.monitor)
            .finish()
    }
}

impl Validate for Settings {
    fn validate(&self) -> Result<()> {
        validate_path("output_path", &self.output_path)?;

        if self.command.needs_atlas() {
            validate_url("atlas.endpoint", &self.atlas_endpoint)?;
            validate_required_field("atlas_pub_key", &self.atlas_public_key)?;
            validate_required_field("atlas_private_key", &self.atlas_private_key)?;
            validate_required_field("project_name", &self.project_name)?;
        }

        if self.command.needs_mongo() {
            let uri = validate_required_field("mongo.connection_string", &self.connection_string)?;
            validate_mongo_uri("mongo.connection_string", uri)?;
            validate_required_field("cluster", &self.cluster)?;
        }

        match self.command {
            Command::RotateCredentials => {
                validate_url("gcp.secret_endpoint", &self.gcp_secret_endpoint)?;
                validate_required_field("gcp.project_id", &self.gcp_project_id)?;
                validate_required_field("gcp.access_token", &self.gcp_access_token)?;
            }
            Command::GridfsReport => {
                if self.collection.is_some() && self.database.is_none() {
                    return Err(ReporterError::InvalidConfigValueError {
                        field: "collection".to_string(),
                        value: self.collection.clone().unwrap_or_default(),
                        reason: "--collection needs --db".to_string(),
                    });
                }
            }
            Command::ExecuteQuery => {
                self.query_request()?;
            }
            _ => {}
        }

        tracing::debug!("✅ Configuration for {} passed validation", self.command.name());
        Ok(())
    }
}
