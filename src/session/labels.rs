use serde_json::Value;

use crate::domain::non_blank_str;

pub const NEW_ITEM_TITLE: &str = "Add New Item";

const NEW_MANUAL_DESCRIPTION: &str = "Fill in the details below, then save to add this item.";
const NEW_AUTO_DESCRIPTION: &str = "Changes are saved automatically as you fill in the details.";
const EDIT_MANUAL_DESCRIPTION: &str = "Update the details below, then save to apply your changes.";
const EDIT_AUTO_DESCRIPTION: &str = "Changes are saved automatically as you edit.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionLabels {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct LabelResolver;

impl LabelResolver {
    pub fn resolve(
        schema_title: Option<&Value>,
        schema_description: Option<&Value>,
        is_new: bool,
        auto_save: bool,
        item_index: Option<usize>,
    ) -> SessionLabels {
        let title = match (non_blank_str(schema_title), is_new) {
            (Some(title), true) => format!("Add {title}"),
            (Some(title), false) => format!("Edit {title}"),
            (None, true) => NEW_ITEM_TITLE.to_string(),
            (None, false) => format!("Edit Item #{}", item_index.unwrap_or(0) + 1),
        };
        let description = non_blank_str(schema_description)
            .map(str::to_string)
            .unwrap_or_else(|| default_description(is_new, auto_save).to_string());
        SessionLabels { title, description }
    }
}

fn default_description(is_new: bool, auto_save: bool) -> &'static str {
    match (is_new, auto_save) {
        (true, false) => NEW_MANUAL_DESCRIPTION,
        (true, true) => NEW_AUTO_DESCRIPTION,
        (false, false) => EDIT_MANUAL_DESCRIPTION,
        (false, true) => EDIT_AUTO_DESCRIPTION,
    }
}
