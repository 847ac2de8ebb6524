//! Operators: binary predicates and the way conditions name them.
//!
//! A condition refers to its operator either by name, looked up in an
//! [`OperatorRegistry`](crate::OperatorRegistry) at evaluation time, or by
//! carrying a [`Predicate`] directly. Names may carry a negation marker: a
//! leading `!` or a leading `not ` (any case), as in `"!contains"` or
//! `"not equal"`.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::error::Result;

/// Signature shared by all predicates.
///
/// The first argument is the resolved field value (`None` when absent), the
/// second is one candidate condition value.
pub type PredicateFn = dyn Fn(Option<&Value>, &Value) -> Result<bool> + Send + Sync;

/// A binary predicate comparing a field value with a condition value.
///
/// Predicates are cheap to clone; clones share the underlying function and
/// compare equal under [`Predicate::same`].
///
/// # Example
///
/// ```
/// use datafilter::Predicate;
/// use serde_json::json;
///
/// let is_even = Predicate::new(|field, _| {
///     field.and_then(|v| v.as_i64()).is_some_and(|n| n % 2 == 0)
/// });
///
/// assert!(is_even.call(Some(&json!(4)), &json!(null)).unwrap());
/// assert!(!is_even.call(None, &json!(null)).unwrap());
/// ```
#[derive(Clone)]
pub struct Predicate(Arc<PredicateFn>);

impl Predicate {
    /// Wraps an infallible predicate.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(Option<&Value>, &Value) -> bool + Send + Sync + 'static,
    {
        Predicate::fallible(move |field, condition| Ok(f(field, condition)))
    }

    /// Wraps a predicate that may fail, such as one compiling its condition value.
    pub fn fallible<F>(f: F) -> Self
    where
        F: Fn(Option<&Value>, &Value) -> Result<bool> + Send + Sync + 'static,
    {
        Predicate(Arc::new(f))
    }

    /// Applies the predicate.
    pub fn call(&self, field: Option<&Value>, condition: &Value) -> Result<bool> {
        (self.0)(field, condition)
    }

    /// Returns `true` if both handles share the same function.
    pub fn same(&self, other: &Predicate) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.0), Arc::as_ptr(&other.0))
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Predicate({:p})", Arc::as_ptr(&self.0))
    }
}

/// How a condition refers to its operator.
#[derive(Debug, Clone)]
pub enum OperatorSpec {
    /// An operator name, optionally negated, resolved through the registry.
    Named(String),
    /// A predicate used directly, bypassing the registry.
    Function(Predicate),
}

impl OperatorSpec {
    /// Builds a function operator from a closure.
    pub fn function<F>(f: F) -> Self
    where
        F: Fn(Option<&Value>, &Value) -> bool + Send + Sync + 'static,
    {
        OperatorSpec::Function(Predicate::new(f))
    }

    /// Returns the operator name, if this is a named operator.
    pub fn name(&self) -> Option<&str> {
        match self {
            OperatorSpec::Named(name) => Some(name),
            OperatorSpec::Function(_) => None,
        }
    }
}

impl PartialEq for OperatorSpec {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (OperatorSpec::Named(a), OperatorSpec::Named(b)) => a == b,
            (OperatorSpec::Function(a), OperatorSpec::Function(b)) => a.same(b),
            _ => false,
        }
    }
}

impl From<&str> for OperatorSpec {
    fn from(name: &str) -> Self {
        OperatorSpec::Named(name.to_string())
    }
}

impl From<String> for OperatorSpec {
    fn from(name: String) -> Self {
        OperatorSpec::Named(name)
    }
}

impl From<Predicate> for OperatorSpec {
    fn from(predicate: Predicate) -> Self {
        OperatorSpec::Function(predicate)
    }
}

impl fmt::Display for OperatorSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperatorSpec::Named(name) => f.write_str(name),
            OperatorSpec::Function(_) => f.write_str("<function>"),
        }
    }
}

/// An operator name split into its negation flag and the name to look up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedOperator<'a> {
    /// Registry name, trimmed, without the negation marker.
    pub name: &'a str,
    /// Whether the operator result is inverted.
    pub negated: bool,
}

const NOT_PREFIX: &str = "not ";

/// Splits a raw operator name into its registry name and negation flag.
///
/// ```
/// use datafilter::parse_operator;
///
/// let parsed = parse_operator("  NOT contains ");
/// assert_eq!(parsed.name, "contains");
/// assert!(parsed.negated);
///
/// assert!(!parse_operator(">=").negated);
/// ```
pub fn parse_operator(raw: &str) -> ParsedOperator<'_> {
    let trimmed = raw.trim();
    match strip_negation(trimmed) {
        Some(rest) => ParsedOperator {
            name: rest.trim(),
            negated: true,
        },
        None => ParsedOperator {
            name: trimmed,
            negated: false,
        },
    }
}

/// Returns `true` if `name` starts with a negation marker once trimmed.
pub fn is_negated(name: &str) -> bool {
    strip_negation(name.trim()).is_some()
}

fn strip_negation(name: &str) -> Option<&str> {
    if let Some(rest) = name.strip_prefix('!') {
        return Some(rest);
    }
    match name.get(..NOT_PREFIX.len()) {
        Some(head) if head.eq_ignore_ascii_case(NOT_PREFIX) => name.get(NOT_PREFIX.len()..),
        _ => None,
    }
}
