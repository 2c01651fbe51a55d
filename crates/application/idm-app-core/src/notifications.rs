//! User-visible notifications. Rendering and auto-dismissal belong to the
//! host; the store only keeps the queue.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationVariant {
    Success,
    Warning,
    Danger,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: String,
    pub variant: NotificationVariant,
    pub title: String,
    pub description: Option<String>,
    pub dismissable: bool,
}

pub const REGISTRATION_CANCELLED_ID: &str = "domain-registration-cancelled-notification";

impl Notification {
    fn new(variant: NotificationVariant, title: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            variant,
            title: title.into(),
            description: None,
            dismissable: true,
        }
    }

    pub fn success(title: impl Into<String>) -> Self {
        Self::new(NotificationVariant::Success, title)
    }

    pub fn warning(title: impl Into<String>) -> Self {
        Self::new(NotificationVariant::Warning, title)
    }

    pub fn error(title: impl Into<String>) -> Self {
        Self::new(NotificationVariant::Danger, title)
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

pub fn registration_not_completed() -> Notification {
    Notification::error("Identity domain registration could not be completed")
        .with_id(REGISTRATION_CANCELLED_ID)
        .with_description("You will need to re-launch the \"Register identity domain\" wizard.")
}

pub fn registration_finished(auto_join: bool) -> Notification {
    if auto_join {
        Notification::success("Identity domain registration created and enabled")
    } else {
        Notification::warning("Identity domain registration created but not enabled")
            .with_description(
                "You can enable \"Domain auto-join on launch\" in the registry list.",
            )
    }
}

pub fn registration_failed() -> Notification {
    Notification::error("Issue occurred when finishing the domain registration")
        .with_description("Check domain in the registry list.")
}

pub fn token_request_failed(reason: &str) -> Notification {
    Notification::error("Could not request a registration token").with_description(reason)
}

pub fn title_edited() -> Notification {
    Notification::success("Identity domain title edited.")
}

pub fn title_edit_failed() -> Notification {
    Notification::error("Identity domain title could not be edited.")
}

pub fn description_edited() -> Notification {
    Notification::success("Identity domain description edited.")
}

pub fn description_edit_failed() -> Notification {
    Notification::error("Identity domain description could not be edited.")
}

pub fn auto_join_change_failed(title: &str) -> Notification {
    Notification::error(format!(
        "Domain auto-join on launch could not be changed for {title}"
    ))
}

pub fn delete_succeeded(title: &str) -> Notification {
    Notification::success(format!("Domain {title} deleted successfully."))
}

pub fn delete_failed(title: &str) -> Notification {
    Notification::error(format!("Failed to delete domain {title}"))
}

pub fn list_load_failed(reason: &str) -> Notification {
    Notification::error("Identity domains could not be loaded").with_description(reason)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancelled_notification_has_fixed_id() {
        let n = registration_not_completed();
        assert_eq!(n.id, REGISTRATION_CANCELLED_ID);
        assert_eq!(n.variant, NotificationVariant::Danger);
    }

    #[test]
    fn finish_variant_follows_auto_join() {
        assert_eq!(
            registration_finished(true).variant,
            NotificationVariant::Success
        );
        assert_eq!(
            registration_finished(false).variant,
            NotificationVariant::Warning
        );
    }

    #[test]
    fn generated_ids_are_unique() {
        assert_ne!(title_edited().id, title_edited().id);
    }
}
