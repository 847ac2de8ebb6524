//! Field path resolution.
//!
//! A field path is a dot-separated list of segments. Each segment looks up a
//! member of the current value:
//!
//! | Current value | Segment | Result |
//! |---------------|---------|--------|
//! | object | any name | the member with that key |
//! | array | `length` | number of elements |
//! | array | decimal index | the element at that index |
//! | string | `length` | number of characters |
//! | string | decimal index | the character at that index |
//! | anything else | any | absent |
//!
//! Resolution stops at the first absent step. An empty or missing path
//! resolves to the record itself.

use serde_json::Value;

use crate::value::FieldValue;

/// Segment name that reads the size of an array or string.
pub const LENGTH_SEGMENT: &str = "length";

/// Resolves `path` against `record`.
///
/// Stored values are returned by reference, never cloned, so resolving the
/// same path twice yields the same reference.
///
/// # Example
///
/// ```
/// use datafilter::resolve;
/// use serde_json::json;
///
/// let record = json!({ "data": { "author": { "age": 30 } } });
///
/// assert_eq!(resolve(&record, Some("data.author.age")).as_json(), Some(&json!(30)));
/// assert!(std::ptr::eq(resolve(&record, None).stored().unwrap(), &record));
/// assert!(std::ptr::eq(resolve(&record, Some("")).stored().unwrap(), &record));
/// ```
pub fn resolve<'a>(record: &'a Value, path: Option<&str>) -> FieldValue<'a> {
    let path = match path {
        Some(path) if !path.is_empty() => path,
        _ => return FieldValue::Ref(record),
    };

    let mut current = FieldValue::Ref(record);
    for segment in path.split('.') {
        current = match current {
            FieldValue::Ref(value) => member(value, segment),
            FieldValue::Derived(value) => member(&value, segment).detach(),
            FieldValue::Absent => break,
        };
    }
    current
}

fn member<'a>(value: &'a Value, segment: &str) -> FieldValue<'a> {
    match value {
        Value::Object(map) => map.get(segment).map_or(FieldValue::Absent, FieldValue::Ref),
        Value::Array(items) if segment == LENGTH_SEGMENT => {
            FieldValue::Derived(Value::from(items.len()))
        }
        Value::Array(items) => parse_index(segment)
            .and_then(|index| items.get(index))
            .map_or(FieldValue::Absent, FieldValue::Ref),
        Value::String(s) if segment == LENGTH_SEGMENT => {
            FieldValue::Derived(Value::from(s.chars().count()))
        }
        Value::String(s) => parse_index(segment)
            .and_then(|index| s.chars().nth(index))
            .map_or(FieldValue::Absent, |c| {
                FieldValue::Derived(Value::String(c.to_string()))
            }),
        Value::Number(_) | Value::Bool(_) | Value::Null => FieldValue::Absent,
    }
}

/// Parses a canonical decimal index (`"0"`, `"12"`, not `"012"` or `"+1"`).
fn parse_index(segment: &str) -> Option<usize> {
    let canonical = !segment.is_empty()
        && segment.bytes().all(|b| b.is_ascii_digit())
        && (segment == "0" || !segment.starts_with('0'));
    if canonical {
        segment.parse().ok()
    } else {
        None
    }
}
