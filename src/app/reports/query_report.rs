use crate::core::{ColumnPolicy, DocumentStore, Record, ReportKind, ReportSource};
use crate::utils::error::{ReporterError, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawQuery {
    #[serde(default)]
    database: Option<String>,
    #[serde(default)]
    collection: Option<String>,
    pipeline: Option<Value>,
    // 舊版 Data API 的欄位，接受但不使用
    #[serde(default)]
    #[allow(dead_code)]
    data_source: Option<String>,
}

/// An ad-hoc aggregation: the pipeline is passed to the store verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryRequest {
    pub database: String,
    pub collection: String,
    pub pipeline: Vec<Value>,
}

impl QueryRequest {
    /// Parses the `--query` JSON. `database` and `collection` fall back to the
    /// values given on the command line.
    pub fn parse(
        query: &str,
        default_database: Option<&str>,
        default_collection: Option<&str>,
    ) -> Result<Self> {
        let raw: RawQuery = serde_json::from_str(query).map_err(|e| ReporterError::ValidationError {
            message: format!("query is not a valid JSON object: {}", e),
        })?;

        let database = raw
            .database
            .filter(|d| !d.trim().is_empty())
            .or_else(|| default_database.map(str::to_string))
            .ok_or_else(|| ReporterError::MissingConfigError {
                field: "db".to_string(),
            })?;
        let collection = raw
            .collection
            .filter(|c| !c.trim().is_empty())
            .or_else(|| default_collection.map(str::to_string))
            .ok_or_else(|| ReporterError::MissingConfigError {
                field: "collection".to_string(),
            })?;

        let pipeline = match raw.pipeline {
            Some(Value::Array(stages)) => stages,
            Some(other) => {
                return Err(ReporterError::ValidationError {
                    message: format!("pipeline must be an array, got {}", other),
                })
            }
            None => {
                return Err(ReporterError::ValidationError {
                    message: "query has no pipeline".to_string(),
                })
            }
        };

        Ok(Self {
            database,
            collection,
            pipeline,
        })
    }
}

pub struct QueryReport<'a, D: DocumentStore> {
    store: &'a D,
    cluster: &'a str,
    request: QueryRequest,
}

impl<'a, D: DocumentStore> QueryReport<'a, D> {
    pub fn new(store: &'a D, cluster: &'a str, request: QueryRequest) -> Self {
        Self {
            store,
            cluster,
            request,
        }
    }
}

#[async_trait]
impl<D: DocumentStore> ReportSource for QueryReport<'_, D> {
    async fn fetch(&self) -> Result<Vec<Record>> {
        tracing::info!(
            "Running {}-stage pipeline on {}.{}",
            self.request.pipeline.len(),
            self.request.database,
            self.request.collection
        );
        self.store
            .aggregate(&self.request.database, &self.request.collection, &self.request.pipeline)
            .await
    }

    fn column_policy(&self) -> ColumnPolicy {
        ColumnPolicy::DeriveFromFirst
    }

    fn kind(&self) -> ReportKind {
        ReportKind::QueryResults
    }

    fn context(&self) -> &str {
        self.cluster
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::reports::test_support::MockStore;
    use crate::core::tabulator;
    use std::collections::HashMap;

    #[test]
    fn test_parse_full_query() {
        let request = QueryRequest::parse(
            r#"{"dataSource":"zebra","database":"shop","collection":"orders","pipeline":[{"$limit":5}]}"#,
            None,
            None,
        )
        .unwrap();

        assert_eq!(request.database, "shop");
        assert_eq!(request.collection, "orders");
        assert_eq!(request.pipeline, vec![serde_json::json!({"$limit": 5})]);
    }

    #[test]
    fn test_parse_falls_back_to_flags() {
        let request = QueryRequest::parse(r#"{"pipeline":[]}"#, Some("shop"), Some("orders")).unwrap();

        assert_eq!(request.database, "shop");
        assert_eq!(request.collection, "orders");
        assert!(request.pipeline.is_empty());
    }

    #[test]
    fn test_parse_errors() {
        let missing_db = QueryRequest::parse(r#"{"collection":"orders","pipeline":[]}"#, None, None);
        assert!(matches!(missing_db, Err(ReporterError::MissingConfigError { ref field }) if field == "db"));

        let not_array = QueryRequest::parse(
            r#"{"database":"shop","collection":"orders","pipeline":{"$match":{}}}"#,
            None,
            None,
        );
        assert!(matches!(not_array, Err(ReporterError::ValidationError { .. })));

        assert!(QueryRequest::parse("not json", Some("shop"), Some("orders")).is_err());
    }

    #[tokio::test]
    async fn test_columns_follow_first_document() {
        let mut results = HashMap::new();
        results.insert(
            "shop.orders".to_string(),
            vec![
                Record::new().with("_id", "a1").with("total", 3i64),
                Record::new().with("_id", "a2").with("total", 5i64).with("note", "late"),
                Record::new().with("_id", "a3"),
            ],
        );
        let store = MockStore {
            results,
            ..Default::default()
        };
        let request = QueryRequest::parse(
            r#"{"database":"shop","collection":"orders","pipeline":[{"$sort":{"_id":1}}]}"#,
            None,
            None,
        )
        .unwrap();
        let report = QueryReport::new(&store, "zebra", request);

        let table = tabulator::build(&report.fetch().await.unwrap(), &report.column_policy());

        assert_eq!(table.header, vec!["_id", "total"]);
        assert_eq!(table.rows, vec![vec!["a1", "3"], vec!["a2", "5"], vec!["a3", ""]]);
        assert_eq!(report.kind(), ReportKind::QueryResults);
    }
}
