//! Host actions described as data, replayed against a controller.
//!
//! ```json
//! [
//!   {"kind": "openNew"},
//!   {"kind": "set", "pointer": "/path", "value": "/health"},
//!   {"kind": "save"}
//! ]
//! ```

use std::fmt;

use serde::Deserialize;
use serde_json::Value;

use crate::{
    collection::{ItemAddress, SourceCollection},
    form::ItemValidator,
    session::{
        CancelOutcome, DismissOutcome, DismissReason, EditOutcome, EditSessionController,
        OpenOutcome, SaveOutcome,
    },
};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ScriptStep {
    OpenExisting { index: usize },
    OpenNew,
    Set { pointer: String, value: Value },
    Replace { value: Value },
    Remove { pointer: String },
    Save,
    Cancel,
    Dismiss { reason: DismissReason },
    AutoSave { enabled: bool },
}

pub fn parse_script(value: &Value) -> Result<Vec<ScriptStep>, serde_json::Error> {
    Vec::<ScriptStep>::deserialize(value)
}

#[derive(Debug, Clone, PartialEq)]
pub enum StepResult {
    Open(OpenOutcome),
    Edit(EditOutcome),
    Save(SaveOutcome),
    Cancel(CancelOutcome),
    Dismiss(DismissOutcome),
    AutoSave(bool),
}

/// Replays `steps` in order; every step runs to completion before the next.
pub async fn run_script<C, V>(
    controller: &EditSessionController<C, V>,
    steps: &[ScriptStep],
) -> Vec<StepResult>
where
    C: SourceCollection,
    V: ItemValidator,
{
    let mut results = Vec::with_capacity(steps.len());
    for step in steps {
        let result = match step {
            ScriptStep::OpenExisting { index } => {
                StepResult::Open(controller.open_existing(*index))
            }
            ScriptStep::OpenNew => StepResult::Open(controller.open_new().await),
            ScriptStep::Set { pointer, value } => {
                StepResult::Edit(controller.edit_pointer(pointer, value.clone()).await)
            }
            ScriptStep::Replace { value } => {
                StepResult::Edit(controller.replace_draft(value.clone()).await)
            }
            ScriptStep::Remove { pointer } => {
                StepResult::Edit(controller.remove_pointer(pointer).await)
            }
            ScriptStep::Save => StepResult::Save(controller.save().await),
            ScriptStep::Cancel => StepResult::Cancel(controller.cancel().await),
            ScriptStep::Dismiss { reason } => {
                StepResult::Dismiss(controller.dismiss(*reason).await)
            }
            ScriptStep::AutoSave { enabled } => {
                controller.set_auto_save(*enabled);
                StepResult::AutoSave(*enabled)
            }
        };
        results.push(result);
    }
    results
}

impl fmt::Display for StepResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepResult::Open(OpenOutcome::Opened { state, address }) => {
                write!(f, "opened {state:?} at {}", describe_address(*address))
            }
            StepResult::Open(OpenOutcome::Ignored) => write!(f, "open ignored"),
            StepResult::Open(OpenOutcome::Failed) => write!(f, "open failed"),
            StepResult::Open(OpenOutcome::Superseded) => write!(f, "open superseded"),
            StepResult::Edit(EditOutcome::Applied { revision }) => {
                write!(f, "edit applied (revision {revision})")
            }
            StepResult::Edit(EditOutcome::Rejected(error)) => write!(f, "edit rejected: {error}"),
            StepResult::Edit(EditOutcome::NoSession) => write!(f, "edit ignored: no session"),
            StepResult::Save(SaveOutcome::Saved { index: Some(index) }) => {
                write!(f, "saved #{}", index + 1)
            }
            StepResult::Save(SaveOutcome::Saved { index: None }) => write!(f, "saved"),
            StepResult::Save(SaveOutcome::Invalid { issues }) => {
                write!(f, "save blocked by {} issue(s)", issues.len())?;
                for issue in issues {
                    write!(f, "\n  {issue}")?;
                }
                Ok(())
            }
            StepResult::Save(SaveOutcome::Superseded) => write!(f, "save superseded"),
            StepResult::Save(SaveOutcome::NoSession) => write!(f, "save ignored: no session"),
            StepResult::Cancel(CancelOutcome::Cancelled { removed: Some(index) }) => {
                write!(f, "cancelled; removed placeholder #{}", index + 1)
            }
            StepResult::Cancel(CancelOutcome::Cancelled { removed: None }) => {
                write!(f, "cancelled")
            }
            StepResult::Cancel(CancelOutcome::NoSession) => {
                write!(f, "cancel ignored: no session")
            }
            StepResult::Dismiss(DismissOutcome::Refused) => {
                write!(f, "dismiss refused: unsaved changes")
            }
            StepResult::Dismiss(DismissOutcome::Closed(outcome)) => {
                write!(f, "dismissed -> {}", StepResult::Cancel(outcome.clone()))
            }
            StepResult::Dismiss(DismissOutcome::NoSession) => {
                write!(f, "dismiss ignored: no session")
            }
            StepResult::AutoSave(enabled) => write!(f, "auto-save {}", on_off(*enabled)),
        }
    }
}

fn describe_address(address: ItemAddress) -> String {
    match address {
        ItemAddress::Slot(index) => format!("#{}", index + 1),
        ItemAddress::Pending => "<draft>".to_string(),
    }
}

fn on_off(enabled: bool) -> &'static str {
    if enabled { "on" } else { "off" }
}
