use crate::core::{ColumnPolicy, DocumentStore, FieldValue, Record, ReportKind, ReportSource};
use crate::utils::error::Result;
use async_trait::async_trait;
use serde_json::{json, Value};

pub const GRIDFS_COLUMNS: [&str; 5] = ["Database", "Collection", "ContentType", "FileCount", "TotalSize"];

const SYSTEM_DATABASES: [&str; 3] = ["admin", "local", "config"];

/// Content type 分組統計
pub fn gridfs_pipeline() -> Vec<Value> {
    vec![json!({
        "$group": {
            "_id": "$contentType",
            "totalSize": { "$sum": "$length" },
            "fileCount": { "$sum": 1 }
        }
    })]
}

/// One `(database, collection)` pair to aggregate over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub database: String,
    pub collection: String,
}

pub struct GridFsReport<'a, D: DocumentStore> {
    store: &'a D,
    cluster: &'a str,
    database: Option<&'a str>,
    collection: Option<&'a str>,
}

impl<'a, D: DocumentStore> GridFsReport<'a, D> {
    pub fn new(
        store: &'a D,
        cluster: &'a str,
        database: Option<&'a str>,
        collection: Option<&'a str>,
    ) -> Self {
        Self {
            store,
            cluster,
            database,
            collection,
        }
    }

    /// Database and collection given: just that one. Database only: its file
    /// collections. Neither: the file collections of every user database.
    pub async fn targets(&self) -> Result<Vec<Target>> {
        match (self.database, self.collection) {
            (Some(database), Some(collection)) => Ok(vec![Target {
                database: database.to_string(),
                collection: collection.to_string(),
            }]),
            (Some(database), None) => self.file_collections(database).await,
            (None, _) => {
                let mut targets = Vec::new();
                for db in self.store.list_databases().await? {
                    if SYSTEM_DATABASES.contains(&db.name.as_str()) {
                        continue;
                    }
                    targets.extend(self.file_collections(&db.name).await?);
                }
                Ok(targets)
            }
        }
    }

    async fn file_collections(&self, database: &str) -> Result<Vec<Target>> {
        let collections = self.store.list_collections(database).await?;
        Ok(collections
            .into_iter()
            .filter(|name| name.ends_with(".files"))
            .map(|collection| Target {
                database: database.to_string(),
                collection,
            })
            .collect())
    }
}

fn stats_record(target: &Target, group: &Record) -> Record {
    let content_type = group.get("_id").cloned().unwrap_or(FieldValue::Null);
    let file_count = group.get("fileCount").cloned().unwrap_or(FieldValue::Null);
    let total_size = group.get("totalSize").cloned().unwrap_or(FieldValue::Null);

    Record::new()
        .with("Database", target.database.as_str())
        .with("Collection", target.collection.as_str())
        .with("ContentType", content_type)
        .with("FileCount", file_count)
        .with("TotalSize", total_size)
}

#[async_trait]
impl<D: DocumentStore> ReportSource for GridFsReport<'_, D> {
    async fn fetch(&self) -> Result<Vec<Record>> {
        let pipeline = gridfs_pipeline();
        let mut records = Vec::new();

        for target in self.targets().await? {
            tracing::debug!("Aggregating {}.{}", target.database, target.collection);
            let groups = self
                .store
                .aggregate(&target.database, &target.collection, &pipeline)
                .await?;
            records.extend(groups.iter().map(|group| stats_record(&target, group)));
        }

        Ok(records)
    }

    fn column_policy(&self) -> ColumnPolicy {
        ColumnPolicy::Fixed(GRIDFS_COLUMNS.iter().map(|c| c.to_string()).collect())
    }

    fn kind(&self) -> ReportKind {
        ReportKind::GridFsInfo
    }

    fn context(&self) -> &str {
        self.cluster
    }
}
