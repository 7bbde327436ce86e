use crate::domain::model::{ColumnPolicy, Record, ReportKind};
use crate::utils::error::Result;
use async_trait::async_trait;
use serde::Deserialize;

pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<String>> + Send;
}

/// A report driver: where the records come from and how they become columns.
#[async_trait]
pub trait ReportSource: Send + Sync {
    async fn fetch(&self) -> Result<Vec<Record>>;
    fn column_policy(&self) -> ColumnPolicy;
    fn kind(&self) -> ReportKind;
    /// Project or cluster name used as the file name prefix.
    fn context(&self) -> &str;
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub org_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseUser {
    pub username: String,
    pub database_name: String,
    pub group_id: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cluster {
    pub name: String,
    #[serde(default)]
    pub group_id: Option<String>,
    #[serde(default)]
    pub cluster_type: Option<String>,
    #[serde(default, rename = "diskSizeGB")]
    pub disk_size_gb: Option<f64>,
    #[serde(default)]
    pub num_shards: Option<i64>,
    #[serde(default)]
    pub replication_factor: Option<i64>,
    #[serde(default)]
    pub create_date: Option<String>,
    #[serde(default)]
    pub backup_enabled: Option<bool>,
    #[serde(default, rename = "mongoDBMajorVersion")]
    pub mongodb_major_version: Option<String>,
    #[serde(default, rename = "mongoDBVersion")]
    pub mongodb_version: Option<String>,
    #[serde(default)]
    pub state_name: Option<String>,
}

/// Cloud provider management API (projects, clusters, database users).
#[async_trait]
pub trait ManagementApi: Send + Sync {
    async fn project_by_name(&self, name: &str) -> Result<Project>;
    async fn list_clusters(&self, project_id: &str) -> Result<Vec<Cluster>>;
    async fn list_database_users(&self, project_id: &str) -> Result<Vec<DatabaseUser>>;
    async fn update_password(&self, project_id: &str, user: &DatabaseUser, password: &str) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseInfo {
    pub name: String,
    pub size_on_disk: u64,
    pub empty: bool,
}

/// The document database's query interface.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn list_databases(&self) -> Result<Vec<DatabaseInfo>>;
    async fn list_collections(&self, database: &str) -> Result<Vec<String>>;
    async fn aggregate(
        &self,
        database: &str,
        collection: &str,
        pipeline: &[serde_json::Value],
    ) -> Result<Vec<Record>>;
}

#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Stores `payload` as the newest version of `secret_id`, creating the secret if needed.
    async fn save_secret(&self, secret_id: &str, payload: &str) -> Result<()>;
}
