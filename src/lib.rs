//! Headless draft-edit sessions for JSON Schema array fields.

#![deny(rust_2018_idioms)]

pub mod collection;
mod domain;
mod form;
mod io;
pub mod script;
pub mod session;


pub use collection::{ArrayField, CollectionId, ItemAddress, SourceCollection};
pub use domain::{EDITOR_EXTENSION, ItemSchema};
pub use form::{
    CollectionError, DraftChange, DraftError, DraftForm, DraftFormFactory, DraftKey, FieldIssue,
    ItemValidator, SchemaError, SchemaValidator,
};
pub use io::{
    DocumentFormat, FormatProbe, OutputDestination, OutputOptions, emit, load_document,
    parse_document_str, serialize_value,
};
pub use session::{
    ActiveItem, ActiveItemManager, CancelOutcome, CreationMethod, CreationMode, DismissOutcome,
    DismissReason, EditOutcome, EditSessionController, HostKind, LabelResolver, OpenOutcome,
    SaveOutcome, SessionLabels, SessionOptions, SessionState, SessionView, ShakeSignal,
};

pub mod prelude {
    pub use super::{
        ArrayField, ActiveItemManager, EditSessionController, ItemSchema, SchemaValidator,
        SessionOptions, SourceCollection,
    };
}
