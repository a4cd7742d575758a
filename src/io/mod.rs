mod format;
mod input;
mod output;

pub use format::{DocumentFormat, FormatProbe};
pub use input::{load_document, parse_document_str};
pub use output::{OutputDestination, OutputOptions, emit, serialize_value};
