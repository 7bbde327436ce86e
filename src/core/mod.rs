pub mod csv_sink;
pub mod engine;
pub mod rotation;
pub mod tabulator;

pub use crate::domain::model::{ColumnPolicy, FieldValue, Record, ReportKind, ReportOutcome, Table};
pub use crate::domain::ports::{
    Cluster, DatabaseInfo, DatabaseUser, DocumentStore, ManagementApi, Project, ReportSource,
    SecretStore, Storage,
};
pub use crate::utils::error::Result;
