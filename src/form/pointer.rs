use serde_json::{Map, Value};

use super::error::DraftError;

/// Splits an RFC 6901 pointer into unescaped reference tokens.
pub(crate) fn split_pointer(pointer: &str) -> Result<Vec<String>, DraftError> {
    if pointer.is_empty() {
        return Ok(Vec::new());
    }
    let Some(rest) = pointer.strip_prefix('/') else {
        return Err(DraftError::InvalidPointer(pointer.to_string()));
    };
    Ok(rest
        .split('/')
        .map(|token| token.replace("~1", "/").replace("~0", "~"))
        .collect())
}

/// Writes `value` at `pointer`, creating intermediate objects for missing
/// or null parents. `-` (or the current length) appends to an array.
pub(crate) fn set_at(root: &mut Value, pointer: &str, value: Value) -> Result<(), DraftError> {
    let mut segments = split_pointer(pointer)?;
    let Some(last) = segments.pop() else {
        *root = value;
        return Ok(());
    };

    let mut current = root;
    for (depth, segment) in segments.iter().enumerate() {
        if current.is_null() {
            *current = Value::Object(Map::new());
        }
        current = match current {
            Value::Object(map) => map.entry(segment.clone()).or_insert(Value::Null),
            Value::Array(items) => {
                let index = existing_index(items.len(), segment, &segments, depth)?;
                &mut items[index]
            }
            _ => {
                return Err(DraftError::NotAContainer {
                    pointer: join(&segments[..depth]),
                });
            }
        };
    }

    if current.is_null() {
        *current = Value::Object(Map::new());
    }
    match current {
        Value::Object(map) => {
            map.insert(last, value);
            Ok(())
        }
        Value::Array(items) => {
            if last == "-" || last == items.len().to_string() {
                items.push(value);
                return Ok(());
            }
            let index = existing_index(items.len(), &last, &segments, segments.len())?;
            items[index] = value;
            Ok(())
        }
        _ => Err(DraftError::NotAContainer {
            pointer: join(&segments),
        }),
    }
}

/// Removes and returns the value at `pointer`.
pub(crate) fn remove_at(root: &mut Value, pointer: &str) -> Result<Value, DraftError> {
    let mut segments = split_pointer(pointer)?;
    let Some(last) = segments.pop() else {
        return Ok(std::mem::take(root));
    };
    let parent = root
        .pointer_mut(&join(&segments))
        .ok_or_else(|| DraftError::Missing(pointer.to_string()))?;
    match parent {
        Value::Object(map) => map
            .remove(&last)
            .ok_or_else(|| DraftError::Missing(pointer.to_string())),
        Value::Array(items) => {
            let index = existing_index(items.len(), &last, &segments, segments.len())?;
            Ok(items.remove(index))
        }
        _ => Err(DraftError::Missing(pointer.to_string())),
    }
}

/// True when `pointer` is `base` or lies underneath it.
pub(crate) fn is_within(pointer: &str, base: &str) -> bool {
    base.is_empty()
        || pointer == base
        || pointer
            .strip_prefix(base)
            .is_some_and(|rest| rest.starts_with('/'))
}

fn existing_index(
    len: usize,
    segment: &str,
    segments: &[String],
    depth: usize,
) -> Result<usize, DraftError> {
    segment
        .parse::<usize>()
        .ok()
        .filter(|index| *index < len)
        .ok_or_else(|| DraftError::BadIndex {
            pointer: join(&segments[..depth]),
            segment: segment.to_string(),
        })
}

fn join(segments: &[String]) -> String {
    segments
        .iter()
        .map(|segment| format!("/{}", segment.replace('~', "~0").replace('/', "~1")))
        .collect()
}
