use idm_core::ApiError;
use reqwest::{Client, Url};
use serde::Deserialize;
use tracing::debug;

use crate::net::{decode_json, endpoint, map_reqwest_error, normalize_base};

/// Source of the caller's granted permission strings for one application.
#[async_trait::async_trait]
pub trait AccessApi: Send + Sync + 'static {
    async fn permissions(&self, application: &str) -> Result<Vec<String>, ApiError>;
}

#[derive(Debug, Deserialize)]
struct AccessEntry {
    permission: String,
}

#[derive(Debug, Deserialize)]
struct AccessPage {
    #[serde(default)]
    data: Vec<AccessEntry>,
}

/// Reads `GET {rbac}/access/?application=<app>&limit=1000`.
pub struct HttpAccessApi {
    client: Client,
    base: Url,
    bearer: Option<String>,
}

impl HttpAccessApi {
    pub fn new(client: Client, base_url: &str) -> Result<Self, ApiError> {
        Ok(Self {
            client,
            base: normalize_base(base_url)?,
            bearer: None,
        })
    }

    pub fn with_bearer(mut self, token: Option<String>) -> Self {
        self.bearer = token.filter(|t| !t.is_empty());
        self
    }
}

#[async_trait::async_trait]
impl AccessApi for HttpAccessApi {
    async fn permissions(&self, application: &str) -> Result<Vec<String>, ApiError> {
        let mut url = endpoint(&self.base, &["access", ""])?;
        url.query_pairs_mut()
            .append_pair("application", application)
            .append_pair("limit", "1000");
        debug!("GET {}", url);
        let mut req = self.client.get(url);
        if let Some(token) = &self.bearer {
            req = req.bearer_auth(token);
        }
        let resp = req.send().await.map_err(map_reqwest_error)?;
        let page: AccessPage = decode_json(resp).await?;
        Ok(page.data.into_iter().map(|e| e.permission).collect())
    }
}

/// Grants a fixed permission set without asking a server.
#[derive(Debug, Clone, Default)]
pub struct StaticAccess {
    granted: Vec<String>,
}

impl StaticAccess {
    pub fn new(granted: Vec<String>) -> Self {
        Self { granted }
    }

    /// Every permission of `application`.
    pub fn allow_all(application: &str) -> Self {
        Self::new(vec![format!("{application}:*:*")])
    }
}

#[async_trait::async_trait]
impl AccessApi for StaticAccess {
    async fn permissions(&self, _application: &str) -> Result<Vec<String>, ApiError> {
        Ok(self.granted.clone())
    }
}
