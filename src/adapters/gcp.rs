use crate::core::SecretStore;
use crate::utils::error::{ReporterError, Result};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::{Client, StatusCode};

pub const DEFAULT_SECRET_MANAGER_ENDPOINT: &str = "https://secretmanager.googleapis.com";

/// GCP Secret Manager over its REST API, authenticated with an OAuth access token.
pub struct GcpSecretManager {
    client: Client,
    endpoint: String,
    project_id: String,
    access_token: String,
}

impl GcpSecretManager {
    pub fn new(endpoint: &str, project_id: String, access_token: String) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            project_id,
            access_token,
        }
    }

    fn secrets_url(&self) -> String {
        format!("{}/v1/projects/{}/secrets", self.endpoint, self.project_id)
    }

    /// Creates the secret with automatic replication; an existing secret is fine.
    async fn ensure_secret(&self, secret_id: &str) -> Result<()> {
        let response = self
            .client
            .post(self.secrets_url())
            .query(&[("secretId", secret_id)])
            .bearer_auth(&self.access_token)
            .json(&serde_json::json!({ "replication": { "automatic": {} } }))
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => {
                tracing::debug!("Created secret {}", secret_id);
                Ok(())
            }
            StatusCode::CONFLICT => {
                tracing::debug!("Secret {} already exists", secret_id);
                Ok(())
            }
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(ReporterError::secret_store(format!(
                    "creating secret {} returned {}: {}",
                    secret_id, status, body
                )))
            }
        }
    }

    async fn add_version(&self, secret_id: &str, payload: &str) -> Result<()> {
        let url = format!("{}/{}:addVersion", self.secrets_url(), secret_id);
        let response = self
            .client
            .post(url)
            .bearer_auth(&self.access_token)
            .json(&serde_json::json!({ "payload": { "data": STANDARD.encode(payload) } }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ReporterError::secret_store(format!(
                "adding a version to {} returned {}: {}",
                secret_id, status, body
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl SecretStore for GcpSecretManager {
    async fn save_secret(&self, secret_id: &str, payload: &str) -> Result<()> {
        self.ensure_secret(secret_id).await?;
        self.add_version(secret_id, payload).await
    }
}
