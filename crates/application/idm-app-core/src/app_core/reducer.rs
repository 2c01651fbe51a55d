use crate::domain::{AppState, Route};
use crate::notifications;
use crate::permissions::PermissionsState;
use crate::wizard::WizardDraft;

use super::events::DomainEvent;

pub fn reduce(mut state: AppState, ev: DomainEvent) -> AppState {
    match ev {
        DomainEvent::PermissionsLoaded(p) => state.permissions = PermissionsState::Loaded(p),

        DomainEvent::RouteChanged(r) => {
            if !matches!(r, Route::DomainDetail(_)) {
                state.editing = None;
            }
            state.route = r;
        }

        DomainEvent::PageChanged(page) => state.list.page = page,

        DomainEvent::ListLoading { page } => {
            if page == state.list.page {
                state.list.loading = true;
                state.list.error = None;
            }
        }

        // Answers for a page the user already left are dropped.
        DomainEvent::ListLoaded {
            page,
            domains,
            total,
        } => {
            if page == state.list.page {
                state.list.domains = domains;
                state.list.total = total;
                state.list.loading = false;
                state.list.error = None;
            }
        }

        DomainEvent::ListFailed { page, message } => {
            if page == state.list.page {
                state.list.loading = false;
                state.list.error = Some(message);
            }
        }

        DomainEvent::SortChanged(sort) => state.list.sort = sort,

        DomainEvent::DomainUpdated(d) => state.update_domain(d),
        DomainEvent::DomainDeleted(id) => {
            state.delete_domain(&id);
            if state.route == Route::DomainDetail(id) {
                state.route = Route::DomainList;
            }
        }

        DomainEvent::EditingChanged(d) => state.editing = d,

        DomainEvent::DetailLoaded(d) => {
            let on_page = state.route == Route::DomainDetail(d.domain_id.clone());
            state.update_domain(d.clone());
            if on_page {
                state.editing = Some(d);
            }
        }

        DomainEvent::DetailLoadFailed { id } => {
            if state.route == Route::DomainDetail(id) {
                state.route = Route::DomainList;
                state.editing = None;
            }
        }

        DomainEvent::WizardOpened => state.wizard = WizardDraft::fresh(),

        DomainEvent::WizardTokenIssued(tok) => {
            if state.route == Route::Wizard && state.wizard.needs_token() {
                state.wizard.apply_token(tok);
            }
        }

        DomainEvent::TokenRequestFailed { message } => {
            let n = notifications::token_request_failed(&message);
            state.notifications.push(n);
        }

        DomainEvent::VerificationStarted { run_id } => state.wizard.restart_verification(run_id),

        DomainEvent::Verification {
            run_id: _,
            state: verify,
            domain,
        } => {
            state.wizard.on_verify(verify, domain);
        }

        DomainEvent::VerificationFinished { .. } | DomainEvent::VerificationStopped => {
            state.wizard.verify_run = None
        }

        DomainEvent::WizardTitleChanged(t) => state.wizard.set_title(t),
        DomainEvent::WizardDescriptionChanged(d) => state.wizard.set_description(d),
        DomainEvent::WizardAutoJoinChanged(v) => state.wizard.set_auto_join(v),

        DomainEvent::WizardStepChanged(step) => {
            state.wizard.go_to(step);
        }

        DomainEvent::WizardClosed => state.wizard = WizardDraft::default(),

        DomainEvent::ProvisionalDiscarding(id) => state.discarding.push(id),
        DomainEvent::ProvisionalDiscarded(id) => state.discarding.retain(|x| *x != id),

        DomainEvent::Notified(n) => {
            state.notifications.retain(|x| x.id != n.id);
            state.notifications.push(n);
        }

        DomainEvent::NotificationDismissed(id) => state.notifications.retain(|x| x.id != id),
    }
    state
}

#[cfg(test)]
mod tests {
    use idm_core::{Domain, Page};

    use super::*;

    fn domain(id: &str) -> Domain {
        Domain {
            domain_id: id.into(),
            ..Default::default()
        }
    }

    #[test]
    fn list_answer_for_another_page_is_dropped() {
        let mut state = AppState::default();
        state.list.page = Page::new(2, 10);

        let state = reduce(
            state,
            DomainEvent::ListLoaded {
                page: Page::new(1, 10),
                domains: vec![domain("a")],
                total: 1,
            },
        );
        assert!(state.list.domains.is_empty());

        let state = reduce(
            state,
            DomainEvent::ListLoaded {
                page: Page::new(2, 10),
                domains: vec![domain("b")],
                total: 11,
            },
        );
        assert_eq!(state.list.domains.len(), 1);
        assert_eq!(state.list.total, 11);
    }

    #[test]
    fn detail_failure_only_redirects_the_matching_page() {
        let mut state = AppState::default();
        state.route = Route::DomainDetail("x".into());

        let state = reduce(state, DomainEvent::DetailLoadFailed { id: "y".into() });
        assert_eq!(state.route, Route::DomainDetail("x".into()));

        let state = reduce(state, DomainEvent::DetailLoadFailed { id: "x".into() });
        assert_eq!(state.route, Route::DomainList);
    }

    #[test]
    fn detail_load_fills_cache_and_editing() {
        let mut state = AppState::default();
        state.route = Route::DomainDetail("x".into());
        let state = reduce(state, DomainEvent::DetailLoaded(domain("x")));
        assert!(state.get_domain("x").is_some());
        assert_eq!(state.editing.as_ref().map(|d| d.domain_id.as_str()), Some("x"));
    }

    #[test]
    fn token_is_ignored_outside_the_wizard() {
        let tok = idm_core::DomainRegToken {
            domain_token: "t".into(),
            domain_id: "abc".into(),
            domain_type: Default::default(),
            expiration: 0,
        };
        let state = reduce(AppState::default(), DomainEvent::WizardTokenIssued(tok.clone()));
        assert!(state.wizard.token.is_empty());

        let state = reduce(state, DomainEvent::RouteChanged(Route::Wizard));
        let state = reduce(state, DomainEvent::WizardTokenIssued(tok));
        assert_eq!(state.wizard.token, "t");
    }

    #[test]
    fn notification_with_same_id_is_replaced() {
        let state = reduce(
            AppState::default(),
            DomainEvent::Notified(notifications::registration_not_completed()),
        );
        let state = reduce(
            state,
            DomainEvent::Notified(notifications::registration_not_completed()),
        );
        assert_eq!(state.notifications.len(), 1);

        let id = state.notifications[0].id.clone();
        let state = reduce(state, DomainEvent::NotificationDismissed(id));
        assert!(state.notifications.is_empty());
    }
}
