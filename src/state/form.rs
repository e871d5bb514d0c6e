//! Validated form controller
//!
//! Holds the draft for one entity form and serializes its submission:
//!
//! ```text
//! Clean -> Editing -> Validating -> Submitting -> Clean    (write succeeded)
//!                         |              `-----> Editing  (write failed, draft kept)
//!                         `--------------------> Editing  (invalid, no write)
//! ```

use std::fmt;
use std::future::Future;

use parking_lot::Mutex;
use serde::Serialize;
use tracing::debug;

use super::schema::{Schema, ValidationErrors};
use crate::utils::errors::{AdminError, Result};
use crate::utils::logging::log_form_submission;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FormState {
    Clean,
    Editing,
    Validating,
    Submitting,
}

impl fmt::Display for FormState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormState::Clean => write!(f, "Clean"),
            FormState::Editing => write!(f, "Editing"),
            FormState::Validating => write!(f, "Validating"),
            FormState::Submitting => write!(f, "Submitting"),
        }
    }
}

/// Result of one submit attempt
#[derive(Debug)]
pub enum SubmitOutcome<T> {
    /// The write succeeded; the form is back to Clean
    Submitted(T),
    /// Rules failed; nothing was sent
    Invalid(ValidationErrors),
    /// The write failed; the draft is unchanged
    Failed(AdminError),
    /// Another submission of this form is still in flight
    Busy,
}

impl<T> SubmitOutcome<T> {
    pub fn is_submitted(&self) -> bool {
        matches!(self, SubmitOutcome::Submitted(_))
    }

    pub fn label(&self) -> &'static str {
        match self {
            SubmitOutcome::Submitted(_) => "submitted",
            SubmitOutcome::Invalid(_) => "invalid",
            SubmitOutcome::Failed(_) => "failed",
            SubmitOutcome::Busy => "busy",
        }
    }
}

struct FormInner<D> {
    state: FormState,
    defaults: D,
    draft: D,
    errors: ValidationErrors,
    submit_error: Option<String>,
}

/// Returns an abandoned submission to `Editing`, draft kept
struct InFlightSubmit<'a, D> {
    form: &'static str,
    inner: &'a Mutex<FormInner<D>>,
    settled: bool,
}

impl<D> Drop for InFlightSubmit<'_, D> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }

        let mut inner = self.inner.lock();
        if inner.state == FormState::Submitting {
            inner.state = FormState::Editing;
        }
        log_form_submission(self.form, "abandoned", None);
    }
}

pub struct FormController<D> {
    name: &'static str,
    schema: Schema<D>,
    inner: Mutex<FormInner<D>>,
}

impl<D: Clone> FormController<D> {
    pub fn new(name: &'static str, schema: Schema<D>, defaults: D) -> Self {
        Self {
            name,
            schema,
            inner: Mutex::new(FormInner {
                state: FormState::Clean,
                draft: defaults.clone(),
                defaults,
                errors: ValidationErrors::default(),
                submit_error: None,
            }),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn state(&self) -> FormState {
        self.inner.lock().state
    }

    pub fn draft(&self) -> D {
        self.inner.lock().draft.clone()
    }

    /// Values the form was opened with and resets to after a successful write
    pub fn defaults(&self) -> D {
        self.inner.lock().defaults.clone()
    }

    pub fn errors(&self) -> ValidationErrors {
        self.inner.lock().errors.clone()
    }

    /// Message of the last failed write, if any
    pub fn submit_error(&self) -> Option<String> {
        self.inner.lock().submit_error.clone()
    }

    /// Controls are disabled while a write is in flight
    pub fn is_disabled(&self) -> bool {
        self.state() == FormState::Submitting
    }

    /// Change draft fields
    pub fn edit(&self, change: impl FnOnce(&mut D)) -> Result<()> {
        let mut inner = self.inner.lock();
        if inner.state == FormState::Submitting {
            return Err(AdminError::InvalidStateTransition {
                from: inner.state.to_string(),
                to: FormState::Editing.to_string(),
            });
        }

        change(&mut inner.draft);
        inner.state = FormState::Editing;
        Ok(())
    }

    /// Load new defaults (for example an entity fetched for editing) and discard the draft
    pub fn reset(&self, defaults: D) -> Result<()> {
        let mut inner = self.inner.lock();
        if inner.state == FormState::Submitting {
            return Err(AdminError::InvalidStateTransition {
                from: inner.state.to_string(),
                to: FormState::Clean.to_string(),
            });
        }

        inner.draft = defaults.clone();
        inner.defaults = defaults;
        inner.errors = ValidationErrors::default();
        inner.submit_error = None;
        inner.state = FormState::Clean;
        Ok(())
    }

    /// Check the current draft without changing state
    pub fn validate(&self) -> ValidationErrors {
        let inner = self.inner.lock();
        self.schema.validate(&inner.draft)
    }

    /// Validate the draft and, if it passes, hand it to `write` exactly once
    pub async fn submit<T, W, Fut>(&self, write: W) -> SubmitOutcome<T>
    where
        W: FnOnce(D) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let draft = {
            let mut inner = self.inner.lock();
            if inner.state == FormState::Submitting {
                debug!(form = self.name, "Submission already in flight");
                log_form_submission(self.name, "busy", None);
                return SubmitOutcome::Busy;
            }

            inner.state = FormState::Validating;
            let errors = self.schema.validate(&inner.draft);
            if !errors.is_empty() {
                inner.state = FormState::Editing;
                inner.errors = errors.clone();
                log_form_submission(self.name, "invalid", Some(&errors.to_string()));
                return SubmitOutcome::Invalid(errors);
            }

            inner.errors = ValidationErrors::default();
            inner.submit_error = None;
            inner.state = FormState::Submitting;
            inner.draft.clone()
        };

        let mut in_flight = InFlightSubmit {
            form: self.name,
            inner: &self.inner,
            settled: false,
        };
        let result = write(draft).await;
        in_flight.settled = true;

        let mut inner = self.inner.lock();
        match result {
            Ok(value) => {
                inner.draft = inner.defaults.clone();
                inner.state = FormState::Clean;
                log_form_submission(self.name, "submitted", None);
                SubmitOutcome::Submitted(value)
            }
            Err(error) => {
                if let AdminError::Validation(errors) = &error {
                    inner.errors = errors.clone();
                }
                inner.submit_error = Some(error.to_string());
                inner.state = FormState::Editing;
                log_form_submission(self.name, "failed", Some(&error.to_string()));
                SubmitOutcome::Failed(error)
            }
        }
    }
}

impl<D> fmt::Debug for FormController<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormController")
            .field("name", &self.name)
            .field("state", &self.inner.lock().state)
            .finish()
    }
}
