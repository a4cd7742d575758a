mod draft;
mod error;
mod factory;
mod pointer;
mod validation;

pub use draft::{DraftChange, DraftForm};
pub use error::{CollectionError, DraftError, SchemaError};
pub use factory::{DraftFormFactory, DraftKey};
pub use validation::{FieldIssue, ItemValidator, SchemaValidator};
