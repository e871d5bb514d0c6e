//! Terminal host for the command-line console

use std::io::{self, BufRead, Write};

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::state::{Host, Notification, NotificationLevel, Route};

/// Answers confirmations on stdin and prints notifications to stdout
#[derive(Debug, Default)]
pub struct ConsoleHost {
    assume_yes: bool,
    location: Mutex<Option<Route>>,
}

impl ConsoleHost {
    pub fn new(assume_yes: bool) -> Self {
        Self {
            assume_yes,
            location: Mutex::new(None),
        }
    }

    /// Screen the last action navigated to
    pub fn location(&self) -> Option<Route> {
        *self.location.lock()
    }
}

impl Host for ConsoleHost {
    fn confirm(&self, prompt: &str) -> bool {
        if self.assume_yes {
            debug!(prompt = prompt, "Confirmation pre-answered");
            return true;
        }

        print!("{} [y/N] ", prompt);
        if let Err(e) = io::stdout().flush() {
            warn!(error = %e, "Failed to flush prompt");
        }

        let mut answer = String::new();
        match io::stdin().lock().read_line(&mut answer) {
            Ok(_) => is_yes(&answer),
            Err(e) => {
                warn!(error = %e, "Failed to read confirmation");
                false
            }
        }
    }

    fn notify(&self, notification: Notification) {
        match notification.level {
            NotificationLevel::Error => eprintln!("{}", notification),
            NotificationLevel::Success => println!("{}", notification),
        }
    }

    fn navigate(&self, route: Route) {
        debug!(route = %route, "Navigating");
        *self.location.lock() = Some(route);
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}
