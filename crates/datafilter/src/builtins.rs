//! Built-in operators.
//!
//! | Name | Alias | Test |
//! |------|-------|------|
//! | `greater than` | `>` | field orders after value |
//! | `greater than or equal` | `>=` | field orders after or equal to value |
//! | `less than` | `<` | field orders before value |
//! | `less than or equal` | `<=` | field orders before or equal to value |
//! | `equal` | `==` | coercing equality ([`loose_eq`]) |
//! | `strict equal` | `===` | type-and-value equality ([`strict_eq`]) |
//! | `contains` | | string field contains the value as a substring |
//! | `has` | `array contains` | array field has an element strictly equal to the value |
//! | `matches` | `regexp` | field text matches the value compiled as a regex |
//! | `starts with` | | field text starts with value text |
//! | `ends with` | | field text ends with value text |
//!
//! Ordering follows [`compare`]; text coercion follows [`to_text`].
//! Patterns used by `matches` are compiled once per registry and reused.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use regex::Regex;
use serde_json::Value;

use crate::error::Result;
use crate::op::Predicate;
use crate::registry::OperatorRegistry;
use crate::value::{compare, loose_eq, strict_eq, to_text};

const ALIASES: &[(&str, &str)] = &[
    ("greater than", ">"),
    ("greater than or equal", ">="),
    ("less than", "<"),
    ("less than or equal", "<="),
    ("equal", "=="),
    ("strict equal", "==="),
    ("has", "array contains"),
    ("matches", "regexp"),
];

/// Seeds `registry` with the built-in operators and their aliases.
pub(crate) fn install(registry: &OperatorRegistry) {
    let operators = [
        ("greater than", Predicate::new(greater_than)),
        ("greater than or equal", Predicate::new(greater_than_or_equal)),
        ("less than", Predicate::new(less_than)),
        ("less than or equal", Predicate::new(less_than_or_equal)),
        ("equal", Predicate::new(loose_eq)),
        ("strict equal", Predicate::new(strict_eq)),
        ("contains", Predicate::new(contains)),
        ("has", Predicate::new(has)),
        ("matches", {
            let patterns = PatternCache::default();
            Predicate::fallible(move |field, value| patterns.matches(field, value))
        }),
        ("starts with", Predicate::new(starts_with)),
        ("ends with", Predicate::new(ends_with)),
    ];
    for (name, predicate) in operators {
        registry.register(name, predicate);
    }
    for (name, alias) in ALIASES {
        registry.alias(name, alias);
    }
}

fn greater_than(field: Option<&Value>, value: &Value) -> bool {
    compare(field, value) == Some(Ordering::Greater)
}

fn greater_than_or_equal(field: Option<&Value>, value: &Value) -> bool {
    matches!(
        compare(field, value),
        Some(Ordering::Greater | Ordering::Equal)
    )
}

fn less_than(field: Option<&Value>, value: &Value) -> bool {
    compare(field, value) == Some(Ordering::Less)
}

fn less_than_or_equal(field: Option<&Value>, value: &Value) -> bool {
    matches!(compare(field, value), Some(Ordering::Less | Ordering::Equal))
}

fn contains(field: Option<&Value>, value: &Value) -> bool {
    match (field, to_text(Some(value))) {
        (Some(Value::String(haystack)), Some(needle)) => haystack.contains(needle.as_ref()),
        _ => false,
    }
}

fn has(field: Option<&Value>, value: &Value) -> bool {
    match field {
        Some(Value::Array(items)) => items.iter().any(|item| strict_eq(Some(item), value)),
        _ => false,
    }
}

/// Upper bound on cached patterns; the cache starts over once reached.
const PATTERN_CACHE_LIMIT: usize = 256;

/// Compiled `matches` patterns, keyed by their source.
#[derive(Default)]
struct PatternCache {
    compiled: RwLock<HashMap<String, Regex>>,
}

impl PatternCache {
    fn matches(&self, field: Option<&Value>, value: &Value) -> Result<bool> {
        let Value::String(pattern) = value else {
            return Ok(false);
        };
        let regex = self.get(pattern)?;
        Ok(to_text(field).is_some_and(|text| regex.is_match(&text)))
    }

    fn get(&self, pattern: &str) -> Result<Regex> {
        let cached = self
            .compiled
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(pattern)
            .cloned();
        if let Some(regex) = cached {
            return Ok(regex);
        }

        let regex = Regex::new(pattern)?;
        let mut compiled = self.compiled.write().unwrap_or_else(PoisonError::into_inner);
        if compiled.len() >= PATTERN_CACHE_LIMIT {
            compiled.clear();
        }
        compiled.insert(pattern.to_string(), regex.clone());
        Ok(regex)
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.compiled.read().unwrap_or_else(PoisonError::into_inner).len()
    }
}

fn starts_with(field: Option<&Value>, value: &Value) -> bool {
    match (to_text(field), to_text(Some(value))) {
        (Some(text), Some(prefix)) => text.starts_with(prefix.as_ref()),
        _ => false,
    }
}

fn ends_with(field: Option<&Value>, value: &Value) -> bool {
    match (to_text(field), to_text(Some(value))) {
        (Some(text), Some(suffix)) => text.ends_with(suffix.as_ref()),
        _ => false,
    }
}
