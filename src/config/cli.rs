use crate::config::settings::{Command, Overrides};
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "atlas-reporter")]
#[command(about = "Reports and credential rotation for MongoDB Atlas projects")]
pub struct CliArgs {
    #[arg(long, value_enum, default_value_t = Command::ClusterReport)]
    pub command: Command,

    #[arg(long)]
    pub project_name: Option<String>,

    #[arg(long)]
    pub cluster: Option<String>,

    #[arg(long = "db")]
    pub database: Option<String>,

    #[arg(long)]
    pub collection: Option<String>,

    #[arg(long, env = "ATLAS_PUB_KEY")]
    pub atlas_pub_key: Option<String>,

    #[arg(long, env = "ATLAS_PRIVATE_KEY", hide_env_values = true)]
    pub atlas_private_key: Option<String>,

    #[arg(long, env = "MONGODB_URI", hide_env_values = true)]
    pub connection_string: Option<String>,

    #[arg(long, env = "GCP_PROJECT_ID")]
    pub gcp_project_id: Option<String>,

    /// Aggregation request as JSON: {"database", "collection", "pipeline"}
    #[arg(long)]
    pub query: Option<String>,

    #[arg(long, default_value = "config.toml")]
    pub config: PathBuf,

    #[arg(long)]
    pub output_path: Option<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log CPU and memory usage per phase")]
    pub monitor: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub log_json: bool,
}

impl CliArgs {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            project_name: self.project_name.clone(),
            cluster: self.cluster.clone(),
            database: self.database.clone(),
            collection: self.collection.clone(),
            atlas_public_key: self.atlas_pub_key.clone(),
            atlas_private_key: self.atlas_private_key.clone(),
            connection_string: self.connection_string.clone(),
            gcp_project_id: self.gcp_project_id.clone(),
            query: self.query.clone(),
            output_path: self.output_path.clone(),
        }
    }
}
