//! Side-effect ports
//!
//! Services never prompt, print or navigate themselves; they ask the
//! [`Host`] that drives them.

use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Success,
    Error,
}

/// Transient message for the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            message: message.into(),
        }
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.level {
            NotificationLevel::Success => "ok",
            NotificationLevel::Error => "error",
        };
        write!(f, "[{}] {}", tag, self.message)
    }
}

/// Navigable screens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Route {
    Events,
    EventDetail(i64),
    EventCreate,
    EventEdit(i64),
    Participants,
    ParticipantCreate,
    ParticipantEdit(i64),
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Events => write!(f, "/events"),
            Route::EventDetail(id) => write!(f, "/events/{}", id),
            Route::EventCreate => write!(f, "/events/create"),
            Route::EventEdit(id) => write!(f, "/events/edit/{}", id),
            Route::Participants => write!(f, "/participants"),
            Route::ParticipantCreate => write!(f, "/participants/create"),
            Route::ParticipantEdit(id) => write!(f, "/participants/edit/{}", id),
        }
    }
}

/// Interprets the confirmation, notification and navigation requests
pub trait Host: Send + Sync {
    /// Ask the user to confirm a destructive action
    fn confirm(&self, prompt: &str) -> bool;

    fn notify(&self, notification: Notification);

    fn navigate(&self, route: Route);
}
