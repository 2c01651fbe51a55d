use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use idm_core::{Domain, VerifyState};
use tokio::time::{interval, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::ports::DomainsApi;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollerConfig {
    pub interval: Duration,
    /// Hard ceiling measured from the start of a run.
    pub timeout: Duration,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval: idm_config::VERIFY_POLL_INTERVAL,
            timeout: idm_config::VERIFY_TIMEOUT,
        }
    }
}

/// A change of the reported state. `domain` is only set for `completed`.
#[derive(Debug, Clone, PartialEq)]
pub struct VerifyTransition {
    pub state: VerifyState,
    pub domain: Option<Domain>,
}

/// Probes `read_domain` until the record shows up, the backend gives a
/// definitive refusal or the ceiling elapses.
pub struct VerificationPoller<A: ?Sized> {
    api: Arc<A>,
    config: PollerConfig,
}

impl<A> VerificationPoller<A>
where
    A: DomainsApi + ?Sized,
{
    pub fn new(api: Arc<A>, config: PollerConfig) -> Self {
        Self { api, config }
    }

    /// Runs one verification and returns the last state reached.
    ///
    /// The first probe fires immediately. A probe is awaited before the next
    /// tick is taken, so responses can never arrive out of order. Network
    /// failures are reported as `timed-out` but polling goes on, so a later
    /// answer can still complete the run.
    /// `on_change` is invoked once per transition away from the current
    /// state, starting from `start`. Once `cancel` fires no further probe is
    /// issued and nothing more is reported.
    pub async fn run<F, Fut>(
        &self,
        domain_id: &str,
        start: VerifyState,
        cancel: CancellationToken,
        mut on_change: F,
    ) -> VerifyState
    where
        F: FnMut(VerifyTransition) -> Fut,
        Fut: Future<Output = ()>,
    {
        let started = Instant::now();
        let mut ticker = interval(self.config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut state = start;
        let mut probes: u64 = 0;
        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    debug!("verification of {domain_id} cancelled after {probes} probes");
                    return state;
                }
                _ = ticker.tick() => {}
            }

            if started.elapsed() >= self.config.timeout {
                info!(
                    "verification of {domain_id} gave up after {:?}",
                    started.elapsed()
                );
                if state != VerifyState::TimedOut {
                    state = VerifyState::TimedOut;
                    on_change(VerifyTransition {
                        state,
                        domain: None,
                    })
                    .await;
                }
                return state;
            }

            probes += 1;
            debug!("verification probe #{probes} for {domain_id}");
            let res = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    debug!("verification of {domain_id} cancelled during probe #{probes}");
                    return state;
                }
                res = self.api.read_domain(domain_id) => res,
            };

            let (next, domain, last) = match res {
                Ok(domain) => (VerifyState::Completed, Some(domain), true),
                Err(e) => {
                    let next = VerifyState::from_probe_error(&e);
                    debug!("probe #{probes} for {domain_id} failed ({e}), classified {next}");
                    (next, None, e.kind().is_definitive())
                }
            };

            if next != state {
                info!("verification of {domain_id}: {state} -> {next}");
                state = next;
                on_change(VerifyTransition {
                    state,
                    domain,
                })
                .await;
            }

            if last {
                return state;
            }
        }
    }
}
