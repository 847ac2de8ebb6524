//! Conditions: a field path, an operator and a condition value.

use serde_json::Value;

use crate::error::Result;
use crate::eval::evaluate;
use crate::op::OperatorSpec;
use crate::path::resolve;
use crate::registry::OperatorRegistry;
use crate::value::strict_eq;

/// A single filter predicate.
///
/// A condition consists of:
/// - A field path (empty for the record itself)
/// - An operator, named or functional
/// - A value, or a list of candidate values any of which may match
///
/// Conditions are immutable once built.
///
/// # Example
///
/// ```
/// use datafilter::{Condition, OperatorRegistry};
/// use serde_json::json;
///
/// let registry = OperatorRegistry::with_builtins();
/// let adult = Condition::new("author.age", ">=", 18);
///
/// assert!(adult.matches(&json!({ "author": { "age": 30 } }), &registry).unwrap());
/// assert!(!adult.matches(&json!({ "author": {} }), &registry).unwrap());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    field: String,
    operator: OperatorSpec,
    value: ConditionValue,
}

impl Condition {
    /// Creates a new condition.
    pub fn new(
        field: impl Into<String>,
        operator: impl Into<OperatorSpec>,
        value: impl Into<ConditionValue>,
    ) -> Self {
        Condition {
            field: field.into(),
            operator: operator.into(),
            value: value.into(),
        }
    }

    /// The field path; empty means the record itself.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// The operator.
    pub fn operator(&self) -> &OperatorSpec {
        &self.operator
    }

    /// The condition value.
    pub fn value(&self) -> &ConditionValue {
        &self.value
    }

    /// Evaluates this condition against a record.
    pub fn matches(&self, record: &Value, registry: &OperatorRegistry) -> Result<bool> {
        let field = resolve(record, Some(self.field.as_str()));
        evaluate(registry, field.as_json(), &self.operator, &self.value)
    }
}

impl<F, O, V> From<(F, O, V)> for Condition
where
    F: Into<String>,
    O: Into<OperatorSpec>,
    V: Into<ConditionValue>,
{
    fn from((field, operator, value): (F, O, V)) -> Self {
        Condition::new(field, operator, value)
    }
}

/// The value side of a condition.
///
/// A JSON array converts to [`ConditionValue::Any`]: each element is a
/// candidate and the condition holds if any candidate matches. Use
/// [`ConditionValue::One`] explicitly to hand a whole array to a predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum ConditionValue {
    /// A single value.
    One(Value),
    /// Candidate values, tried in order.
    Any(Vec<Value>),
}

impl ConditionValue {
    /// Returns the candidates in evaluation order.
    pub fn candidates(&self) -> &[Value] {
        match self {
            ConditionValue::One(value) => std::slice::from_ref(value),
            ConditionValue::Any(values) => values,
        }
    }

    /// Returns `true` if both hold the same candidates in the same order.
    ///
    /// Candidates compare as in [`strict_eq`](crate::strict_eq), so `30`
    /// and `30.0` are the same value.
    pub fn same_candidates(&self, other: &ConditionValue) -> bool {
        let (ours, theirs) = (self.candidates(), other.candidates());
        ours.len() == theirs.len()
            && ours
                .iter()
                .zip(theirs)
                .all(|(a, b)| strict_eq(Some(a), b))
    }
}

impl From<Value> for ConditionValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Array(values) => ConditionValue::Any(values),
            other => ConditionValue::One(other),
        }
    }
}

impl<T: Into<Value>> From<Vec<T>> for ConditionValue {
    fn from(values: Vec<T>) -> Self {
        ConditionValue::Any(values.into_iter().map(Into::into).collect())
    }
}

impl From<String> for ConditionValue {
    fn from(s: String) -> Self {
        ConditionValue::One(Value::String(s))
    }
}

impl From<&str> for ConditionValue {
    fn from(s: &str) -> Self {
        ConditionValue::One(Value::from(s))
    }
}

impl From<bool> for ConditionValue {
    fn from(b: bool) -> Self {
        ConditionValue::One(Value::Bool(b))
    }
}

impl From<i32> for ConditionValue {
    fn from(n: i32) -> Self {
        ConditionValue::One(Value::from(n))
    }
}

impl From<i64> for ConditionValue {
    fn from(n: i64) -> Self {
        ConditionValue::One(Value::from(n))
    }
}

impl From<u32> for ConditionValue {
    fn from(n: u32) -> Self {
        ConditionValue::One(Value::from(n))
    }
}

impl From<u64> for ConditionValue {
    fn from(n: u64) -> Self {
        ConditionValue::One(Value::from(n))
    }
}

impl From<usize> for ConditionValue {
    fn from(n: usize) -> Self {
        ConditionValue::One(Value::from(n))
    }
}

impl From<f64> for ConditionValue {
    fn from(n: f64) -> Self {
        ConditionValue::One(Value::from(n))
    }
}
