use idm_core::{
    ApiError, Domain, DomainRegToken, DomainRegTokenRequest, DomainType, ListDomainsResponse, Page,
    UpdateDomainUserRequest,
};
use reqwest::{Client, RequestBuilder, Url};
use tracing::debug;

use crate::net::{check_status, decode_json, endpoint, map_reqwest_error, normalize_base};

/// The idmsvc resources consumed by the console.
#[async_trait::async_trait]
pub trait DomainsApi: Send + Sync + 'static {
    async fn list_domains(&self, page: Page) -> Result<ListDomainsResponse, ApiError>;
    async fn read_domain(&self, domain_id: &str) -> Result<Domain, ApiError>;
    async fn update_domain(
        &self,
        domain_id: &str,
        patch: &UpdateDomainUserRequest,
    ) -> Result<Domain, ApiError>;
    async fn delete_domain(&self, domain_id: &str) -> Result<(), ApiError>;
    async fn create_domain_token(&self, domain_type: DomainType)
        -> Result<DomainRegToken, ApiError>;
}

/// HTTP-based implementation rooted at the idmsvc API base, e.g.
/// `https://console.example.com/api/idmsvc/v1`.
pub struct HttpDomainsApi {
    client: Client,
    base: Url,
    bearer: Option<String>,
}

impl HttpDomainsApi {
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

    pub fn base(&self) -> &Url {
        &self.base
    }

    fn authorize(&self, req: RequestBuilder) -> RequestBuilder {
        match &self.bearer {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    async fn send(&self, req: RequestBuilder) -> Result<reqwest::Response, ApiError> {
        self.authorize(req).send().await.map_err(map_reqwest_error)
    }
}

#[async_trait::async_trait]
impl DomainsApi for HttpDomainsApi {
    async fn list_domains(&self, page: Page) -> Result<ListDomainsResponse, ApiError> {
        let url = endpoint(&self.base, &["domains"])?;
        debug!("GET {} offset={} limit={}", url, page.offset(), page.limit());
        let req = self
            .client
            .get(url)
            .query(&[("offset", page.offset()), ("limit", page.limit())]);
        decode_json(self.send(req).await?).await
    }

    async fn read_domain(&self, domain_id: &str) -> Result<Domain, ApiError> {
        let url = endpoint(&self.base, &["domains", domain_id])?;
        debug!("GET {}", url);
        decode_json(self.send(self.client.get(url)).await?).await
    }

    async fn update_domain(
        &self,
        domain_id: &str,
        patch: &UpdateDomainUserRequest,
    ) -> Result<Domain, ApiError> {
        let url = endpoint(&self.base, &["domains", domain_id])?;
        let body = serde_json::to_vec(patch).map_err(|e| ApiError::Builder(e.to_string()))?;
        debug!("PATCH {}", url);
        let req = self
            .client
            .patch(url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body);
        decode_json(self.send(req).await?).await
    }

    async fn delete_domain(&self, domain_id: &str) -> Result<(), ApiError> {
        let url = endpoint(&self.base, &["domains", domain_id])?;
        debug!("DELETE {}", url);
        check_status(self.send(self.client.delete(url)).await?).await?;
        Ok(())
    }

    async fn create_domain_token(
        &self,
        domain_type: DomainType,
    ) -> Result<DomainRegToken, ApiError> {
        let url = endpoint(&self.base, &["domains", "token"])?;
        let body = serde_json::to_vec(&DomainRegTokenRequest { domain_type })
            .map_err(|e| ApiError::Builder(e.to_string()))?;
        debug!("POST {}", url);
        let req = self
            .client
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body);
        decode_json(self.send(req).await?).await
    }
}
