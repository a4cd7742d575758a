use thiserror::Error;

/// Failure reported by a [`SourceCollection`](crate::collection::SourceCollection) mutation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CollectionError {
    #[error("index {index} is out of bounds for collection of length {len}")]
    OutOfBounds { index: usize, len: usize },

    #[error("collection rejected the value at {pointer}: {message}")]
    Rejected { pointer: String, message: String },

    #[error("{0}")]
    Other(String),
}

/// Failure applying an edit to a draft value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DraftError {
    #[error("invalid JSON pointer '{0}': must be empty or start with '/'")]
    InvalidPointer(String),

    #[error("cannot descend into {pointer}: parent is not an object or array")]
    NotAContainer { pointer: String },

    #[error("array index '{segment}' is not valid at {pointer}")]
    BadIndex { pointer: String, segment: String },

    #[error("nothing to remove at {0}")]
    Missing(String),
}

/// Failure reading editor configuration out of a schema document.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("array schema must be a JSON object")]
    NotAnObject,

    #[error("schema at {pointer} does not describe an array (type = {found})")]
    NotAnArray { pointer: String, found: String },

    #[error("invalid x-item-editor metadata: {0}")]
    EditorMetadata(#[source] serde_json::Error),

    #[error("failed to compile item schema: {0}")]
    Compile(String),
}
