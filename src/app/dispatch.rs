use crate::adapters::{AtlasClient, GcpSecretManager, LocalStorage, MongoStore};
use crate::app::reports::{ClusterReport, DatabaseReport, GridFsReport, QueryReport, UserReport};
use crate::config::{Command, Settings};
use crate::core::engine::ReportEngine;
use crate::core::rotation::{CredentialRotator, RotationSummary};
use crate::core::{ManagementApi, ReportOutcome, ReportSource, Storage};
use crate::utils::error::{ReporterError, Result};

#[derive(Debug)]
pub enum CommandOutcome {
    Report(ReportOutcome),
    Rotation(RotationSummary),
}

/// Builds the collaborators the command needs and runs it once.
pub async fn run_command(settings: &Settings) -> Result<CommandOutcome> {
    tracing::info!("🚀 Running {}", settings.command.name());
    let engine = ReportEngine::new_with_monitoring(
        LocalStorage::new(settings.output_path.clone()),
        settings.monitor,
    );

    match settings.command {
        Command::RotateCredentials => {
            let api = atlas_client(settings)?;
            let project = api.project_by_name(required(&settings.project_name, "project_name")?).await?;
            let secrets = GcpSecretManager::new(
                &settings.gcp_secret_endpoint,
                required(&settings.gcp_project_id, "gcp.project_id")?.to_string(),
                required(&settings.gcp_access_token, "gcp.access_token")?.to_string(),
            );
            let summary = CredentialRotator::new(&api, &secrets).rotate_project(&project).await?;
            tracing::info!(
                "Rotation finished: {} rotated, {} failed",
                summary.rotated(),
                summary.failed()
            );
            Ok(CommandOutcome::Rotation(summary))
        }
        Command::ClusterReport => {
            let api = atlas_client(settings)?;
            let project = api.project_by_name(required(&settings.project_name, "project_name")?).await?;
            report(&engine, &ClusterReport::new(&api, &project)).await
        }
        Command::UserReport => {
            let api = atlas_client(settings)?;
            let project = api.project_by_name(required(&settings.project_name, "project_name")?).await?;
            report(&engine, &UserReport::new(&api, &project)).await
        }
        Command::DatabaseReport => {
            let store = mongo_store(settings).await?;
            let cluster = required(&settings.cluster, "cluster")?;
            report(&engine, &DatabaseReport::new(&store, cluster)).await
        }
        Command::GridfsReport => {
            let store = mongo_store(settings).await?;
            let cluster = required(&settings.cluster, "cluster")?;
            let source = GridFsReport::new(
                &store,
                cluster,
                settings.database.as_deref(),
                settings.collection.as_deref(),
            );
            report(&engine, &source).await
        }
        Command::ExecuteQuery => {
            let request = settings.query_request()?;
            let store = mongo_store(settings).await?;
            let cluster = required(&settings.cluster, "cluster")?;
            report(&engine, &QueryReport::new(&store, cluster, request)).await
        }
    }
}

async fn report<S: Storage, R: ReportSource>(engine: &ReportEngine<S>, source: &R) -> Result<CommandOutcome> {
    engine.run(source).await.map(CommandOutcome::Report)
}

fn required<'a>(value: &'a Option<String>, field: &str) -> Result<&'a str> {
    value.as_deref().ok_or_else(|| ReporterError::MissingConfigError {
        field: field.to_string(),
    })
}

fn atlas_client(settings: &Settings) -> Result<AtlasClient> {
    AtlasClient::new(
        &settings.atlas_endpoint,
        required(&settings.atlas_public_key, "atlas_pub_key")?.to_string(),
        required(&settings.atlas_private_key, "atlas_private_key")?.to_string(),
    )
}

async fn mongo_store(settings: &Settings) -> Result<MongoStore> {
    MongoStore::connect(required(&settings.connection_string, "mongo.connection_string")?).await
}
