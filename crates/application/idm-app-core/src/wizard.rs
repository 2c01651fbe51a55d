//! Registration wizard draft and the gates between its steps.
//!
//! Gates are derived from the draft on every read, never stored, so a
//! mutation of the token, the verification status or the title is visible
//! to the very next render.

use idm_core::{Domain, DomainRegToken, VerifyState};
use tracing::{debug, info};
use uuid::Uuid;

pub type VerifyRunId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WizardStep {
    #[default]
    Preparation,
    Registration,
    Details,
    Review,
}

impl WizardStep {
    pub const ALL: [WizardStep; 4] = [
        WizardStep::Preparation,
        WizardStep::Registration,
        WizardStep::Details,
        WizardStep::Review,
    ];

    pub fn next(self) -> Option<WizardStep> {
        match self {
            WizardStep::Preparation => Some(WizardStep::Registration),
            WizardStep::Registration => Some(WizardStep::Details),
            WizardStep::Details => Some(WizardStep::Review),
            WizardStep::Review => None,
        }
    }

    pub fn previous(self) -> Option<WizardStep> {
        match self {
            WizardStep::Preparation => None,
            WizardStep::Registration => Some(WizardStep::Preparation),
            WizardStep::Details => Some(WizardStep::Registration),
            WizardStep::Review => Some(WizardStep::Details),
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            WizardStep::Preparation => "Preparation",
            WizardStep::Registration => "Registration",
            WizardStep::Details => "Details",
            WizardStep::Review => "Review",
        }
    }
}

/// In-progress registration. Lives only as long as the session.
#[derive(Debug, Clone, Default)]
pub struct WizardDraft {
    /// Empty until the backend issued one.
    pub token: String,
    pub token_expiration: Option<i64>,
    pub verify: VerifyState,
    /// Run whose transitions are currently accepted.
    pub verify_run: Option<VerifyRunId>,
    pub domain: Domain,
    pub step: WizardStep,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WizardGates {
    pub preparation: bool,
    pub registration: bool,
    pub details: bool,
    pub review: bool,
}

impl WizardGates {
    pub fn derive(draft: &WizardDraft) -> Self {
        let preparation = true;
        let registration =
            preparation && !draft.token.is_empty() && !draft.domain.domain_id.is_empty();
        let details = registration && draft.verify == VerifyState::Completed;
        let review = details && draft.domain.has_title();
        Self {
            preparation,
            registration,
            details,
            review,
        }
    }

    pub fn can_enter(&self, step: WizardStep) -> bool {
        match step {
            WizardStep::Preparation => self.preparation,
            WizardStep::Registration => self.registration,
            WizardStep::Details => self.details,
            WizardStep::Review => self.review,
        }
    }
}

/// Command the user runs on the IdM server to register the domain.
pub fn registration_command(token: &str) -> String {
    format!("ipa-hcc register {token}")
}

impl WizardDraft {
    /// A blank draft, as set up when the wizard is opened.
    pub fn fresh() -> Self {
        Self {
            domain: Domain {
                domain_id: String::new(),
                title: Some(String::new()),
                description: Some(String::new()),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    pub fn gates(&self) -> WizardGates {
        WizardGates::derive(self)
    }

    /// Whether entering the preparation step must ask the backend for a
    /// token.
    pub fn needs_token(&self) -> bool {
        self.token.is_empty() || self.domain.domain_id.is_empty()
    }

    pub fn apply_token(&mut self, tok: DomainRegToken) {
        self.token = tok.domain_token;
        self.token_expiration = Some(tok.expiration);
        self.domain = Domain {
            domain_id: tok.domain_id,
            domain_name: Some(idm_config::PROVISIONAL_DOMAIN_NAME.to_string()),
            domain_type: tok.domain_type,
            ..Default::default()
        };
    }

    /// Accept a transition reported by the poller.
    ///
    /// Once `completed` has been accepted, later reports are ignored until
    /// [`WizardDraft::restart_verification`] is called, so that user edits
    /// made on the following steps survive a stray report. Returns whether
    /// the draft changed.
    pub fn on_verify(&mut self, state: VerifyState, domain: Option<Domain>) -> bool {
        if self.verify == VerifyState::Completed {
            debug!("ignoring verification report {state}: already completed");
            return false;
        }
        match (state, domain) {
            (VerifyState::Completed, Some(mut domain)) => {
                domain.auto_enrollment_enabled = Some(true);
                info!(
                    "registration of {} verified, title {:?}",
                    domain.domain_id,
                    domain.title_or_empty()
                );
                self.domain = domain;
                self.verify = VerifyState::Completed;
            }
            (VerifyState::Completed, None) => {
                debug!("completed report without payload ignored");
                return false;
            }
            (state, _) => self.verify = state,
        }
        true
    }

    pub fn restart_verification(&mut self, run: VerifyRunId) {
        self.verify = VerifyState::Initial;
        self.verify_run = Some(run);
    }

    pub fn set_title(&mut self, title: String) {
        self.domain.title = Some(title);
    }

    pub fn set_description(&mut self, description: String) {
        self.domain.description = Some(description);
    }

    pub fn set_auto_join(&mut self, enabled: bool) {
        self.domain.auto_enrollment_enabled = Some(enabled);
    }

    /// Move to `step` if its gate is open.
    pub fn go_to(&mut self, step: WizardStep) -> bool {
        if !self.gates().can_enter(step) {
            debug!("wizard step {:?} is not enterable yet", step);
            return false;
        }
        self.step = step;
        true
    }

    pub fn registration_command(&self) -> String {
        registration_command(&self.token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use idm_core::DomainType;

    fn token() -> DomainRegToken {
        DomainRegToken {
            domain_token: "tok".into(),
            domain_id: "abc".into(),
            domain_type: DomainType::RhelIdm,
            expiration: 0,
        }
    }

    fn verified(title: &str) -> Domain {
        Domain {
            domain_id: "abc".into(),
            title: Some(title.into()),
            auto_enrollment_enabled: Some(false),
            ..Default::default()
        }
    }

    #[test]
    fn registration_gate_needs_token_and_id() {
        let mut draft = WizardDraft::fresh();
        assert!(draft.gates().preparation);
        assert!(!draft.gates().registration);

        draft.token = "tok".into();
        assert!(!draft.gates().registration);

        draft.apply_token(token());
        assert!(draft.gates().registration);
        assert!(!draft.gates().details);
        assert_eq!(draft.domain.domain_name.as_deref(), Some("My domain"));
    }

    #[test]
    fn details_gate_opens_only_on_completed() {
        let mut draft = WizardDraft::fresh();
        draft.apply_token(token());
        for s in [
            VerifyState::Initial,
            VerifyState::Waiting,
            VerifyState::TimedOut,
            VerifyState::NotFound,
        ] {
            draft.on_verify(s, None);
            assert!(!draft.gates().details, "{s} must not open details");
        }
        draft.on_verify(VerifyState::Completed, Some(verified("t")));
        assert!(draft.gates().details);
    }

    #[test]
    fn review_gate_tracks_title() {
        let mut draft = WizardDraft::fresh();
        draft.apply_token(token());
        draft.on_verify(VerifyState::Completed, Some(verified("")));
        assert!(draft.gates().details);
        assert!(!draft.gates().review);

        draft.set_title("Lab".into());
        assert!(draft.gates().review);
        draft.set_title(String::new());
        assert!(!draft.gates().review);
    }

    #[test]
    fn completed_seeds_auto_join_and_wins_until_restart() {
        let mut draft = WizardDraft::fresh();
        draft.apply_token(token());
        assert!(draft.on_verify(VerifyState::Completed, Some(verified("first"))));
        assert_eq!(draft.domain.auto_enrollment_enabled, Some(true));

        draft.set_title("edited".into());
        assert!(!draft.on_verify(VerifyState::Completed, Some(verified("second"))));
        assert!(!draft.on_verify(VerifyState::Waiting, None));
        assert_eq!(draft.domain.title_or_empty(), "edited");
        assert_eq!(draft.verify, VerifyState::Completed);

        draft.restart_verification(Uuid::new_v4());
        assert_eq!(draft.verify, VerifyState::Initial);
        assert!(draft.on_verify(VerifyState::Completed, Some(verified("second"))));
        assert_eq!(draft.domain.title_or_empty(), "second");
    }

    #[test]
    fn go_to_respects_gates() {
        let mut draft = WizardDraft::fresh();
        assert!(!draft.go_to(WizardStep::Review));
        assert_eq!(draft.step, WizardStep::Preparation);
        draft.apply_token(token());
        assert!(draft.go_to(WizardStep::Registration));
        assert_eq!(draft.step, WizardStep::Registration);
    }

    #[test]
    fn command_embeds_token() {
        let mut draft = WizardDraft::fresh();
        draft.apply_token(token());
        assert_eq!(draft.registration_command(), "ipa-hcc register tok");
    }
}
