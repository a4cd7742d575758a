mod item;
mod metadata;

pub use item::ItemSchema;
pub use metadata::{EDITOR_EXTENSION, non_blank_str};
