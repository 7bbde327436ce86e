use crate::core::{DatabaseInfo, DocumentStore, Record};
use crate::utils::error::{ReporterError, Result};
use async_trait::async_trait;
use mongodb::bson::Document;
use mongodb::Client;

/// Document store backed by the MongoDB driver.
pub struct MongoStore {
    client: Client,
}

impl MongoStore {
    pub async fn connect(connection_string: &str) -> Result<Self> {
        let client = Client::with_uri_str(connection_string).await?;
        Ok(Self { client })
    }
}

/// Converts a JSON pipeline into BSON stages. Every stage must be an object.
pub fn to_bson_pipeline(pipeline: &[serde_json::Value]) -> Result<Vec<Document>> {
    pipeline
        .iter()
        .enumerate()
        .map(|(index, stage)| {
            if !stage.is_object() {
                return Err(ReporterError::ValidationError {
                    message: format!("pipeline stage {} is not an object", index),
                });
            }
            mongodb::bson::to_document(stage).map_err(|e| ReporterError::ValidationError {
                message: format!("pipeline stage {} cannot be converted: {}", index, e),
            })
        })
        .collect()
}

#[async_trait]
impl DocumentStore for MongoStore {
    async fn list_databases(&self) -> Result<Vec<DatabaseInfo>> {
        let specs = self.client.list_databases().await?;
        Ok(specs
            .into_iter()
            .map(|spec| DatabaseInfo {
                name: spec.name,
                size_on_disk: spec.size_on_disk,
                empty: spec.empty,
            })
            .collect())
    }

    async fn list_collections(&self, database: &str) -> Result<Vec<String>> {
        let mut names = self.client.database(database).list_collection_names().await?;
        names.sort();
        Ok(names)
    }

    async fn aggregate(
        &self,
        database: &str,
        collection: &str,
        pipeline: &[serde_json::Value],
    ) -> Result<Vec<Record>> {
        let stages = to_bson_pipeline(pipeline)?;
        tracing::debug!("Aggregating {}.{} with {} stages", database, collection, stages.len());

        let mut cursor = self
            .client
            .database(database)
            .collection::<Document>(collection)
            .aggregate(stages)
            .await?;

        let mut records = Vec::new();
        while cursor.advance().await? {
            let doc: Document = cursor.deserialize_current()?;
            records.push(Record::from(doc));
        }
        Ok(records)
    }
}
