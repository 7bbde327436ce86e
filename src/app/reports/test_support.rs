use crate::core::{
    Cluster, DatabaseInfo, DatabaseUser, DocumentStore, ManagementApi, Project, Record,
};
use crate::utils::error::{ReporterError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Default)]
pub struct MockApi {
    clusters: Vec<Cluster>,
    users: Vec<DatabaseUser>,
}

impl MockApi {
    pub fn project() -> Project {
        Project {
            id: "5f1a".to_string(),
            name: "billing".to_string(),
            org_id: None,
        }
    }

    pub fn with_clusters(clusters: Vec<Cluster>) -> Self {
        Self {
            clusters,
            ..Default::default()
        }
    }

    pub fn with_users(users: Vec<DatabaseUser>) -> Self {
        Self {
            users,
            ..Default::default()
        }
    }
}

#[async_trait]
impl ManagementApi for MockApi {
    async fn project_by_name(&self, _name: &str) -> Result<Project> {
        Ok(Self::project())
    }

    async fn list_clusters(&self, _project_id: &str) -> Result<Vec<Cluster>> {
        Ok(self.clusters.clone())
    }

    async fn list_database_users(&self, _project_id: &str) -> Result<Vec<DatabaseUser>> {
        Ok(self.users.clone())
    }

    async fn update_password(&self, _project_id: &str, _user: &DatabaseUser, _password: &str) -> Result<()> {
        Ok(())
    }
}

/// In-memory document store; aggregation results are keyed by `db.collection`.
#[derive(Default)]
pub struct MockStore {
    pub databases: Vec<DatabaseInfo>,
    pub collections: HashMap<String, Vec<String>>,
    pub results: HashMap<String, Vec<Record>>,
    pub fail_aggregate_on: Option<String>,
    pub aggregated: Mutex<Vec<(String, Vec<serde_json::Value>)>>,
}

#[async_trait]
impl DocumentStore for MockStore {
    async fn list_databases(&self) -> Result<Vec<DatabaseInfo>> {
        Ok(self.databases.clone())
    }

    async fn list_collections(&self, database: &str) -> Result<Vec<String>> {
        Ok(self.collections.get(database).cloned().unwrap_or_default())
    }

    async fn aggregate(
        &self,
        database: &str,
        collection: &str,
        pipeline: &[serde_json::Value],
    ) -> Result<Vec<Record>> {
        let namespace = format!("{}.{}", database, collection);
        if self.fail_aggregate_on.as_deref() == Some(namespace.as_str()) {
            return Err(ReporterError::ApiStatusError {
                status: 503,
                body: "cluster unavailable".to_string(),
            });
        }
        self.aggregated
            .lock()
            .unwrap()
            .push((namespace.clone(), pipeline.to_vec()));
        Ok(self.results.get(&namespace).cloned().unwrap_or_default())
    }
}
