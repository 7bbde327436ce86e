use crate::core::{ColumnPolicy, DocumentStore, Record, ReportKind, ReportSource};
use crate::utils::error::Result;
use async_trait::async_trait;

pub const DATABASE_COLUMNS: [&str; 3] = ["Name", "SizeOnDisk", "Empty"];

/// Databases of a cluster with their on-disk size in bytes.
pub struct DatabaseReport<'a, D: DocumentStore> {
    store: &'a D,
    cluster: &'a str,
}

impl<'a, D: DocumentStore> DatabaseReport<'a, D> {
    pub fn new(store: &'a D, cluster: &'a str) -> Self {
        Self { store, cluster }
    }
}

#[async_trait]
impl<D: DocumentStore> ReportSource for DatabaseReport<'_, D> {
    async fn fetch(&self) -> Result<Vec<Record>> {
        let databases = self.store.list_databases().await?;
        Ok(databases
            .into_iter()
            .map(|db| {
                // sizeOnDisk 不會超過 i64，超過時退回文字
                let size = i64::try_from(db.size_on_disk)
                    .map(crate::core::FieldValue::Integer)
                    .unwrap_or_else(|_| db.size_on_disk.to_string().into());
                Record::new()
                    .with("Name", db.name)
                    .with("SizeOnDisk", size)
                    .with("Empty", db.empty)
            })
            .collect())
    }

    fn column_policy(&self) -> ColumnPolicy {
        ColumnPolicy::Fixed(DATABASE_COLUMNS.iter().map(|c| c.to_string()).collect())
    }

    fn kind(&self) -> ReportKind {
        ReportKind::DatabaseInfo
    }

    fn context(&self) -> &str {
        self.cluster
    }
}
