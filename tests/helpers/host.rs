//! Host double that records every side effect

use parking_lot::Mutex;

use event_admin::state::{Host, Notification, NotificationLevel, Route};

/// Records prompts, notifications and navigation; answers confirmations with a fixed value
#[derive(Debug, Default)]
pub struct RecordingHost {
    confirm_answer: bool,
    pub prompts: Mutex<Vec<String>>,
    pub notifications: Mutex<Vec<Notification>>,
    pub routes: Mutex<Vec<Route>>,
}

impl RecordingHost {
    /// Host that confirms every prompt
    pub fn confirming() -> Self {
        Self {
            confirm_answer: true,
            ..Self::default()
        }
    }

    /// Host that declines every prompt
    pub fn declining() -> Self {
        Self::default()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications.lock().clone()
    }

    pub fn last_notification(&self) -> Option<Notification> {
        self.notifications.lock().last().cloned()
    }

    pub fn errors(&self) -> Vec<String> {
        self.notifications
            .lock()
            .iter()
            .filter(|n| n.level == NotificationLevel::Error)
            .map(|n| n.message.clone())
            .collect()
    }

    pub fn routes(&self) -> Vec<Route> {
        self.routes.lock().clone()
    }
}

impl Host for RecordingHost {
    fn confirm(&self, prompt: &str) -> bool {
        self.prompts.lock().push(prompt.to_string());
        self.confirm_answer
    }

    fn notify(&self, notification: Notification) {
        self.notifications.lock().push(notification);
    }

    fn navigate(&self, route: Route) {
        self.routes.lock().push(route);
    }
}
