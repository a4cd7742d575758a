mod active;
mod controller;
mod labels;
mod options;
mod outcome;
mod shake;
mod view;

pub use active::{ActiveItem, ActiveItemManager, CreationMethod, CreationMode};
pub use controller::EditSessionController;
pub use labels::{LabelResolver, NEW_ITEM_TITLE, SessionLabels};
pub use options::{HostKind, SessionOptions};
pub use outcome::{
    CancelOutcome, DismissOutcome, EditOutcome, OpenOutcome, SaveOutcome, SessionState,
};
pub use shake::{DEFAULT_SHAKE_DURATION, DismissReason, ShakeSignal, is_dirty};
pub use view::SessionView;
