mod common;

use std::time::{Duration, Instant};

use idm_app_core::{AppCommand, PermissionsState};

use common::{admin, domain, kernel, MockApi};

#[test]
fn dispatch_does_not_panic_without_tokio_runtime() {
    let api = MockApi::with_domains(vec![domain("abc", "Lab")]);
    let mut k = kernel(api, admin());

    k.dispatch(AppCommand::LoadPermissions);
    k.dispatch(AppCommand::LoadDomains);

    let deadline = Instant::now() + Duration::from_secs(3);
    while Instant::now() < deadline {
        k.tick();
        let state = k.store.state();
        if matches!(state.permissions, PermissionsState::Loaded(_))
            && !state.list.loading
            && state.list.total == 1
        {
            return;
        }
        std::thread::sleep(Duration::from_millis(10));
    }

    panic!("the domain list never arrived");
}
