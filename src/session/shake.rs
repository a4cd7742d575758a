use std::cell::Cell;
use std::time::Duration;

use serde::Deserialize;
use tokio::time::{Instant, sleep_until};

use crate::form::DraftForm;

pub const DEFAULT_SHAKE_DURATION: Duration = Duration::from_millis(500);

/// How the host tried to close the editor without an explicit button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DismissReason {
    Outside,
    Escape,
    Backdrop,
}

/// Unsaved manual edits block dismissal. Auto-save drafts are never dirty.
pub fn is_dirty(auto_save: bool, draft: Option<&DraftForm>) -> bool {
    !auto_save && draft.is_some_and(DraftForm::modified)
}

/// Transient refusal pulse shown when a dirty editor resists dismissal.
///
/// Holds a single deadline; triggering again moves it instead of queueing a
/// second reset.
#[derive(Debug)]
pub struct ShakeSignal {
    duration: Duration,
    deadline: Cell<Option<Instant>>,
}

impl Default for ShakeSignal {
    fn default() -> Self {
        Self::new(DEFAULT_SHAKE_DURATION)
    }
}

impl ShakeSignal {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            deadline: Cell::new(None),
        }
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn trigger(&self) {
        self.deadline.set(Some(Instant::now() + self.duration));
    }

    pub fn reset(&self) {
        self.deadline.set(None);
    }

    pub fn is_active(&self) -> bool {
        self.active_deadline().is_some()
    }

    pub fn active_deadline(&self) -> Option<Instant> {
        let deadline = self.deadline.get()?;
        if Instant::now() < deadline {
            Some(deadline)
        } else {
            self.deadline.set(None);
            None
        }
    }

    /// Resolves once the pulse has reset, following any re-trigger that
    /// happens while waiting.
    pub async fn settled(&self) {
        while let Some(deadline) = self.active_deadline() {
            sleep_until(deadline).await;
        }
    }
}
