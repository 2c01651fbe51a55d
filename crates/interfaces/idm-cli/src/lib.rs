pub mod commands;

use anyhow::Context;
use clap::ValueEnum;
use idm_app_core::{AppKernel, AppStore, PollerConfig};
use idm_core::{ApiError, SortColumn};
use idm_infra::{AccessApi, HttpAccessApi, HttpDomainsApi, StaticAccess};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api/idmsvc/v1";

#[derive(ValueEnum, Clone, Debug, Copy)]
pub enum CliSortColumn {
    Name,
    Type,
    AutoJoin,
}

impl From<CliSortColumn> for SortColumn {
    fn from(c: CliSortColumn) -> Self {
        match c {
            CliSortColumn::Name => SortColumn::Name,
            CliSortColumn::Type => SortColumn::Type,
            CliSortColumn::AutoJoin => SortColumn::AutoJoin,
        }
    }
}

#[derive(ValueEnum, Clone, Debug, Copy, PartialEq, Eq)]
pub enum Toggle {
    Enable,
    Disable,
}

impl From<Toggle> for bool {
    fn from(t: Toggle) -> Self {
        t == Toggle::Enable
    }
}

/// Where permissions come from: the RBAC service, or a local grant of
/// everything when no RBAC endpoint is configured.
pub enum CliAccess {
    Remote(HttpAccessApi),
    Static(StaticAccess),
}

#[async_trait::async_trait]
impl AccessApi for CliAccess {
    async fn permissions(&self, application: &str) -> Result<Vec<String>, ApiError> {
        match self {
            CliAccess::Remote(api) => api.permissions(application).await,
            CliAccess::Static(access) => access.permissions(application).await,
        }
    }
}

pub type Console = AppKernel<HttpDomainsApi, CliAccess>;

/// Connection settings shared by every subcommand.
#[derive(Debug, Clone)]
pub struct ConsoleConfig {
    pub base_url: String,
    pub rbac_url: Option<String>,
    pub token: Option<String>,
    pub poller: PollerConfig,
}

impl ConsoleConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            rbac_url: None,
            token: None,
            poller: PollerConfig::default(),
        }
    }

    pub fn connect(&self) -> anyhow::Result<Console> {
        let client = idm_infra::default_http_client().context("Failed to build HTTP client")?;
        let api = HttpDomainsApi::new(client.clone(), &self.base_url)
            .with_context(|| format!("Invalid API base URL {}", self.base_url))?
            .with_bearer(self.token.clone());
        let access = match &self.rbac_url {
            Some(url) => CliAccess::Remote(
                HttpAccessApi::new(client, url)
                    .with_context(|| format!("Invalid RBAC base URL {url}"))?
                    .with_bearer(self.token.clone()),
            ),
            None => CliAccess::Static(StaticAccess::allow_all(idm_config::RBAC_APPLICATION)),
        };
        Ok(AppKernel::new(AppStore::default(), api, access).with_poller_config(self.poller))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_maps_to_bool() {
        assert!(bool::from(Toggle::Enable));
        assert!(!bool::from(Toggle::Disable));
    }

    #[test]
    fn bad_base_url_is_reported() {
        let err = ConsoleConfig::new("not a url").connect().err().unwrap();
        assert!(err.to_string().contains("not a url"));
    }
}
