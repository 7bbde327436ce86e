pub mod cluster_report;
pub mod database_report;
pub mod gridfs_report;
pub mod query_report;
pub mod user_report;

#[cfg(test)]
pub(crate) mod test_support;

pub use cluster_report::ClusterReport;
pub use database_report::DatabaseReport;
pub use gridfs_report::GridFsReport;
pub use query_report::{QueryReport, QueryRequest};
pub use user_report::UserReport;
