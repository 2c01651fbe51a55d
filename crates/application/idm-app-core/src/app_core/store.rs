use std::sync::{Arc, Mutex, MutexGuard};

use idm_core::Domain;

use crate::domain::AppState;

use super::{events::DomainEvent, reducer::reduce};

/// Cloneable handle on the single writable copy of [`AppState`].
#[derive(Clone, Default)]
pub struct AppStore {
    inner: Arc<Mutex<AppState>>,
}

impl AppStore {
    pub fn new(state: AppState) -> Self {
        Self {
            inner: Arc::new(Mutex::new(state)),
        }
    }

    // A panic while holding the lock leaves a fully reduced state behind, so
    // the guard is still usable.
    fn lock(&self) -> MutexGuard<'_, AppState> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn state(&self) -> AppState {
        self.lock().clone()
    }

    pub fn apply(&self, ev: DomainEvent) {
        let mut guard = self.lock();
        let next = reduce(guard.clone(), ev);
        *guard = next;
    }

    /// Back to the default state.
    pub fn reset(&self) {
        *self.lock() = AppState::default();
    }

    pub fn update_domain(&self, domain: Domain) {
        self.apply(DomainEvent::DomainUpdated(domain));
    }

    pub fn delete_domain(&self, id: &str) {
        self.apply(DomainEvent::DomainDeleted(id.to_string()));
    }

    pub fn get_domain(&self, id: &str) -> Option<Domain> {
        self.lock().get_domain(id).cloned()
    }

    pub(crate) fn with_state<R>(&self, f: impl FnOnce(&AppState) -> R) -> R {
        f(&self.lock())
    }
}
