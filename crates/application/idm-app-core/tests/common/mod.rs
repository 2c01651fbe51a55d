#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use idm_app_core::{AppKernel, AppState, AppStore, PollerConfig};
use idm_core::{
    ApiError, Domain, DomainRegToken, DomainType, ListDomainsResponse, Page, PaginationMeta,
    UpdateDomainUserRequest,
};
use idm_infra::{DomainsApi, StaticAccess};

pub const PROVISIONAL_ID: &str = "prov-1";

#[derive(Default)]
pub struct Backend {
    pub domains: Mutex<BTreeMap<String, Domain>>,
    /// Reads of [`PROVISIONAL_ID`] answered with 404 before the record
    /// shows up.
    pub pending_probes: AtomicU32,
    /// What the agent side registration will have filled in.
    pub registered: Mutex<Option<Domain>>,
    pub updates: Mutex<Vec<(String, UpdateDomainUserRequest)>>,
    pub deletes: Mutex<Vec<String>>,
    pub tokens_issued: AtomicU32,
    pub fail_updates: AtomicBool,
    pub fail_reads: AtomicBool,
    pub fail_lists: AtomicBool,
}

#[derive(Clone, Default)]
pub struct MockApi(pub Arc<Backend>);

impl MockApi {
    pub fn with_domains(domains: Vec<Domain>) -> Self {
        let api = Self::default();
        {
            let mut map = api.0.domains.lock().unwrap();
            for d in domains {
                map.insert(d.domain_id.clone(), d);
            }
        }
        api
    }

    pub fn register_after(&self, probes: u32, domain: Domain) {
        self.0.pending_probes.store(probes, Ordering::SeqCst);
        *self.0.registered.lock().unwrap() = Some(domain);
    }

    pub fn updates(&self) -> Vec<(String, UpdateDomainUserRequest)> {
        self.0.updates.lock().unwrap().clone()
    }

    pub fn deletes(&self) -> Vec<String> {
        self.0.deletes.lock().unwrap().clone()
    }
}

#[async_trait]
impl DomainsApi for MockApi {
    async fn list_domains(&self, page: Page) -> Result<ListDomainsResponse, ApiError> {
        if self.0.fail_lists.load(Ordering::SeqCst) {
            return Err(ApiError::status(503, "unavailable"));
        }
        let map = self.0.domains.lock().unwrap();
        let data = map
            .values()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .cloned()
            .collect();
        Ok(ListDomainsResponse {
            data,
            meta: PaginationMeta {
                count: map.len() as i64,
                offset: page.offset() as i64,
                limit: page.limit() as i64,
            },
            ..Default::default()
        })
    }

    async fn read_domain(&self, id: &str) -> Result<Domain, ApiError> {
        if self.0.fail_reads.load(Ordering::SeqCst) {
            return Err(ApiError::status(500, "boom"));
        }
        if id == PROVISIONAL_ID {
            let left = self.0.pending_probes.load(Ordering::SeqCst);
            if left > 0 {
                self.0.pending_probes.store(left - 1, Ordering::SeqCst);
                return Err(ApiError::status(404, "not registered yet"));
            }
            if let Some(d) = self.0.registered.lock().unwrap().clone() {
                return Ok(d);
            }
        }
        self.0
            .domains
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| ApiError::status(404, "no such domain"))
    }

    async fn update_domain(
        &self,
        id: &str,
        req: &UpdateDomainUserRequest,
    ) -> Result<Domain, ApiError> {
        self.0
            .updates
            .lock()
            .unwrap()
            .push((id.to_string(), req.clone()));
        if self.0.fail_updates.load(Ordering::SeqCst) {
            return Err(ApiError::status(500, "boom"));
        }
        let mut map = self.0.domains.lock().unwrap();
        let d = map.entry(id.to_string()).or_insert_with(|| Domain {
            domain_id: id.to_string(),
            ..Default::default()
        });
        if let Some(t) = &req.title {
            d.title = Some(t.clone());
        }
        if let Some(t) = &req.description {
            d.description = Some(t.clone());
        }
        if let Some(v) = req.auto_enrollment_enabled {
            d.auto_enrollment_enabled = Some(v);
        }
        Ok(d.clone())
    }

    async fn delete_domain(&self, id: &str) -> Result<(), ApiError> {
        self.0.deletes.lock().unwrap().push(id.to_string());
        match self.0.domains.lock().unwrap().remove(id) {
            Some(_) => Ok(()),
            None => Err(ApiError::status(404, "no such domain")),
        }
    }

    async fn create_domain_token(
        &self,
        domain_type: DomainType,
    ) -> Result<DomainRegToken, ApiError> {
        self.0.tokens_issued.fetch_add(1, Ordering::SeqCst);
        Ok(DomainRegToken {
            domain_token: "tok-123".into(),
            domain_id: PROVISIONAL_ID.into(),
            domain_type,
            expiration: 1_700_000_000,
        })
    }
}

pub fn domain(id: &str, title: &str) -> Domain {
    Domain {
        domain_id: id.into(),
        title: Some(title.into()),
        auto_enrollment_enabled: Some(false),
        ..Default::default()
    }
}

pub fn fast_poller() -> PollerConfig {
    PollerConfig {
        interval: Duration::from_millis(10),
        timeout: Duration::from_secs(2),
    }
}

pub fn kernel(api: MockApi, access: StaticAccess) -> AppKernel<MockApi, StaticAccess> {
    AppKernel::new(AppStore::new(AppState::default()), api, access).with_poller_config(fast_poller())
}

pub fn admin() -> StaticAccess {
    StaticAccess::allow_all("idmsvc")
}

/// Drives `kernel` until `done` holds, failing the test after a few seconds.
pub async fn settle(
    kernel: &mut AppKernel<MockApi, StaticAccess>,
    done: impl FnMut(&AppState) -> bool,
) {
    tokio::time::timeout(Duration::from_secs(5), kernel.run_until(done))
        .await
        .expect("kernel did not reach the expected state");
}
