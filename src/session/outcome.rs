use crate::{
    collection::ItemAddress,
    form::{DraftError, FieldIssue},
};

/// Explicit form of the `(is_new, creation_mode)` combinations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Closed,
    OpenExisting,
    OpenNewInserted,
    OpenNewDraftOnly,
}

impl SessionState {
    pub fn is_open(self) -> bool {
        !matches!(self, SessionState::Closed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpenOutcome {
    Opened {
        state: SessionState,
        address: ItemAddress,
    },
    /// The request did not name a usable item.
    Ignored,
    /// The placeholder insertion was rejected; nothing was opened.
    Failed,
    /// Another transition ran while the placeholder was being inserted.
    Superseded,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Committed (or, for auto-save, closed). `index` is the slot that now
    /// holds the item.
    Saved { index: Option<usize> },
    Invalid { issues: Vec<FieldIssue> },
    /// Validation finished after the session was cancelled or replaced.
    Superseded,
    NoSession,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CancelOutcome {
    Cancelled { removed: Option<usize> },
    NoSession,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DismissOutcome {
    Closed(CancelOutcome),
    /// Unsaved edits blocked the dismissal and the shake pulse fired.
    Refused,
    NoSession,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    Applied { revision: u64 },
    Rejected(DraftError),
    NoSession,
}
