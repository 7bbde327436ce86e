use crate::adapters::digest::{new_cnonce, DigestChallenge};
use crate::core::{Cluster, DatabaseUser, ManagementApi, Project};
use crate::utils::error::{ReporterError, Result};
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, WWW_AUTHENTICATE};
use reqwest::{Client, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use url::Url;

pub const DEFAULT_ATLAS_ENDPOINT: &str = "https://cloud.mongodb.com/api/atlas/v1.0";

const ITEMS_PER_PAGE: usize = 500;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Page<T> {
    #[serde(default = "Vec::new")]
    results: Vec<T>,
    #[serde(default)]
    total_count: Option<usize>,
}

/// Atlas Admin API client authenticated with a programmatic API key pair.
pub struct AtlasClient {
    client: Client,
    endpoint: Url,
    public_key: String,
    private_key: String,
}

impl AtlasClient {
    pub fn new(endpoint: &str, public_key: String, private_key: String) -> Result<Self> {
        let endpoint = Url::parse(endpoint).map_err(|e| ReporterError::InvalidConfigValueError {
            field: "atlas.endpoint".to_string(),
            value: endpoint.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client: Client::new(),
            endpoint,
            public_key,
            private_key,
        })
    }

    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|_| ReporterError::config("atlas.endpoint cannot be a base URL"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Sends the request, answering a digest challenge if the server returns one.
    async fn send(&self, method: Method, url: Url, body: Option<&serde_json::Value>) -> Result<Response> {
        let response = self.request(method.clone(), url.clone(), body).send().await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return check_status(response).await;
        }

        let header = response
            .headers()
            .get(WWW_AUTHENTICATE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let challenge = match header {
            Some(header) => DigestChallenge::parse(&header)?,
            None => return check_status(response).await,
        };

        let uri = match url.query() {
            Some(query) => format!("{}?{}", url.path(), query),
            None => url.path().to_string(),
        };
        let authorization = challenge.authorization(
            &self.public_key,
            &self.private_key,
            method.as_str(),
            &uri,
            &new_cnonce(),
            1,
        );

        let response = self
            .request(method, url, body)
            .header(AUTHORIZATION, authorization)
            .send()
            .await?;
        check_status(response).await
    }

    fn request(&self, method: Method, url: Url, body: Option<&serde_json::Value>) -> reqwest::RequestBuilder {
        tracing::debug!("Atlas {} {}", method, url.path());
        let builder = self
            .client
            .request(method, url)
            .header(CONTENT_TYPE, "application/json");
        match body {
            Some(body) => builder.json(body),
            None => builder,
        }
    }

    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        let response = self.send(Method::GET, url, None).await?;
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn get_all<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<Vec<T>> {
        let mut items = Vec::new();
        let mut page_num = 1;

        loop {
            let mut url = self.url(segments)?;
            url.query_pairs_mut()
                .append_pair("pageNum", &page_num.to_string())
                .append_pair("itemsPerPage", &ITEMS_PER_PAGE.to_string());

            let page: Page<T> = self.get(url).await?;
            let received = page.results.len();
            items.extend(page.results);

            let done = match page.total_count {
                Some(total) => items.len() >= total,
                None => received < ITEMS_PER_PAGE,
            };
            if done || received == 0 {
                break;
            }
            page_num += 1;
        }

        Ok(items)
    }
}

async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    match status {
        StatusCode::UNAUTHORIZED => Err(ReporterError::AuthorizationError {
            status: status.as_u16(),
            message: "the Atlas API key pair was rejected".to_string(),
        }),
        StatusCode::FORBIDDEN => Err(ReporterError::AuthorizationError {
            status: status.as_u16(),
            message: "forbidden, check whether this machine IP is allowed to access the project"
                .to_string(),
        }),
        _ => Err(ReporterError::ApiStatusError {
            status: status.as_u16(),
            body,
        }),
    }
}

#[async_trait]
impl ManagementApi for AtlasClient {
    async fn project_by_name(&self, name: &str) -> Result<Project> {
        let url = self.url(&["groups", "byName", name])?;
        self.get(url).await
    }

    async fn list_clusters(&self, project_id: &str) -> Result<Vec<Cluster>> {
        self.get_all(&["groups", project_id, "clusters"]).await
    }

    async fn list_database_users(&self, project_id: &str) -> Result<Vec<DatabaseUser>> {
        self.get_all(&["groups", project_id, "databaseUsers"]).await
    }

    async fn update_password(&self, project_id: &str, user: &DatabaseUser, password: &str) -> Result<()> {
        let url = self.url(&[
            "groups",
            project_id,
            "databaseUsers",
            &user.database_name,
            &user.username,
        ])?;
        let body = serde_json::json!({ "password": password });

        self.send(Method::PATCH, url, Some(&body)).await?;
        Ok(())
    }
}
