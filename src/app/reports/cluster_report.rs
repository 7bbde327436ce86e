use crate::core::{Cluster, ColumnPolicy, ManagementApi, Project, Record, ReportKind, ReportSource};
use crate::utils::error::Result;
use async_trait::async_trait;

/// 欄位順序固定，和既有報表保持一致
pub const CLUSTER_COLUMNS: [&str; 10] = [
    "Name",
    "GroupId",
    "ClusterType",
    "DiskSizeGB",
    "NumShards",
    "ReplicationFactor",
    "CreatedDate",
    "BackupEnabled",
    "mongoDBMajorVersion",
    "mongoDBVersion",
];

pub struct ClusterReport<'a, A: ManagementApi> {
    api: &'a A,
    project: &'a Project,
}

impl<'a, A: ManagementApi> ClusterReport<'a, A> {
    pub fn new(api: &'a A, project: &'a Project) -> Self {
        Self { api, project }
    }
}

pub fn cluster_record(cluster: Cluster) -> Record {
    Record::new()
        .with("Name", cluster.name)
        .with("GroupId", cluster.group_id)
        .with("ClusterType", cluster.cluster_type)
        .with("DiskSizeGB", cluster.disk_size_gb)
        .with("NumShards", cluster.num_shards)
        .with("ReplicationFactor", cluster.replication_factor)
        .with("CreatedDate", cluster.create_date)
        .with("BackupEnabled", cluster.backup_enabled)
        .with("mongoDBMajorVersion", cluster.mongodb_major_version)
        .with("mongoDBVersion", cluster.mongodb_version)
}

#[async_trait]
impl<A: ManagementApi> ReportSource for ClusterReport<'_, A> {
    async fn fetch(&self) -> Result<Vec<Record>> {
        let clusters = self.api.list_clusters(&self.project.id).await?;
        tracing::debug!("{} clusters in project {}", clusters.len(), self.project.name);
        Ok(clusters.into_iter().map(cluster_record).collect())
    }

    fn column_policy(&self) -> ColumnPolicy {
        ColumnPolicy::Fixed(CLUSTER_COLUMNS.iter().map(|c| c.to_string()).collect())
    }

    fn kind(&self) -> ReportKind {
        ReportKind::ClusterInfo
    }

    fn context(&self) -> &str {
        &self.project.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::reports::test_support::MockApi;
    use crate::core::tabulator;

    #[tokio::test]
    async fn test_cluster_rows() {
        let api = MockApi::with_clusters(vec![
            Cluster {
                name: "zebra".to_string(),
                group_id: Some("5f1a".to_string()),
                cluster_type: Some("REPLICASET".to_string()),
                disk_size_gb: Some(10.5),
                num_shards: Some(1),
                replication_factor: Some(3),
                create_date: Some("2021-06-01T12:00:00Z".to_string()),
                backup_enabled: Some(true),
                mongodb_major_version: Some("6.0".to_string()),
                mongodb_version: Some("6.0.8".to_string()),
                state_name: Some("IDLE".to_string()),
            },
            Cluster {
                name: "sparse".to_string(),
                group_id: None,
                cluster_type: None,
                disk_size_gb: None,
                num_shards: None,
                replication_factor: None,
                create_date: None,
                backup_enabled: None,
                mongodb_major_version: None,
                mongodb_version: None,
                state_name: None,
            },
        ]);
        let project = MockApi::project();
        let report = ClusterReport::new(&api, &project);

        let records = report.fetch().await.unwrap();
        let table = tabulator::build(&records, &report.column_policy());

        assert_eq!(table.header, CLUSTER_COLUMNS.to_vec());
        assert_eq!(
            table.rows[0],
            vec![
                "zebra", "5f1a", "REPLICASET", "10.500000", "1", "3",
                "2021-06-01T12:00:00Z", "true", "6.0", "6.0.8"
            ]
        );
        assert_eq!(table.rows[1][0], "sparse");
        assert!(table.rows[1][1..].iter().all(String::is_empty));
        assert_eq!(report.context(), "billing");
        assert_eq!(report.kind(), ReportKind::ClusterInfo);
    }
}
