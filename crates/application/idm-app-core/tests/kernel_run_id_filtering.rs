mod common;

use idm_app_core::{AppKernel, AppState, AppStore, DomainEvent, VerifyRunId};
use idm_core::VerifyState;

use common::{admin, domain, MockApi};

#[tokio::test]
async fn stale_verification_events_are_ignored_in_tick() {
    let current: VerifyRunId = uuid::Uuid::new_v4();
    let stale: VerifyRunId = uuid::Uuid::new_v4();

    let mut state = AppState::default();
    state.wizard.verify_run = Some(current);
    state.wizard.verify = VerifyState::Waiting;

    let store = AppStore::new(state);
    let mut kernel = AppKernel::new(store.clone(), MockApi::default(), admin());

    kernel
        .sender()
        .send(DomainEvent::Verification {
            run_id: stale,
            state: VerifyState::Completed,
            domain: Some(domain("abc", "stale")),
        })
        .await
        .unwrap();

    kernel.tick();

    let after = store.state();
    assert_eq!(after.wizard.verify, VerifyState::Waiting);
    assert_eq!(after.wizard.verify_run, Some(current));
    assert!(after.wizard.domain.title.is_none());
}

#[tokio::test]
async fn current_run_is_applied_but_completed_wins() {
    let current: VerifyRunId = uuid::Uuid::new_v4();

    let mut state = AppState::default();
    state.wizard.verify_run = Some(current);

    let store = AppStore::new(state);
    let mut kernel = AppKernel::new(store.clone(), MockApi::default(), admin());
    let tx = kernel.sender();

    tx.send(DomainEvent::Verification {
        run_id: current,
        state: VerifyState::Completed,
        domain: Some(domain("abc", "first")),
    })
    .await
    .unwrap();
    tx.send(DomainEvent::Verification {
        run_id: current,
        state: VerifyState::Completed,
        domain: Some(domain("abc", "second")),
    })
    .await
    .unwrap();
    tx.send(DomainEvent::Verification {
        run_id: current,
        state: VerifyState::Waiting,
        domain: None,
    })
    .await
    .unwrap();

    kernel.tick();

    let after = store.state();
    assert_eq!(after.wizard.verify, VerifyState::Completed);
    assert_eq!(after.wizard.domain.title_or_empty(), "first");
    assert_eq!(after.wizard.domain.auto_enrollment_enabled, Some(true));
}

#[tokio::test]
async fn only_the_current_run_finishing_clears_it() {
    let current: VerifyRunId = uuid::Uuid::new_v4();
    let stale: VerifyRunId = uuid::Uuid::new_v4();

    let mut state = AppState::default();
    state.wizard.verify_run = Some(current);
    state.wizard.verify = VerifyState::TimedOut;

    let store = AppStore::new(state);
    let mut kernel = AppKernel::new(store.clone(), MockApi::default(), admin());
    let tx = kernel.sender();

    tx.send(DomainEvent::VerificationFinished { run_id: stale })
        .await
        .unwrap();
    kernel.tick();
    assert_eq!(store.state().wizard.verify_run, Some(current));

    tx.send(DomainEvent::VerificationFinished { run_id: current })
        .await
        .unwrap();
    kernel.tick();
    let after = store.state();
    assert!(after.wizard.verify_run.is_none());
    assert_eq!(after.wizard.verify, VerifyState::TimedOut);
}
