//! Expression evaluation: one operator against one field value.

use serde_json::Value;
use tracing::trace;

use crate::condition::ConditionValue;
use crate::error::Result;
use crate::op::{parse_operator, OperatorSpec, Predicate};
use crate::registry::OperatorRegistry;

/// Evaluates `operator` against a resolved field value.
///
/// The condition value's candidates are tried in order and the first match
/// wins (logical OR). A negated operator inverts the whole OR group, so
/// `"not equal"` against `["a", "b"]` holds only if the field equals neither.
/// An operator name missing from `registry` never matches, before negation.
///
/// Errors come only from predicates themselves, such as an invalid regex.
///
/// # Example
///
/// ```
/// use datafilter::{evaluate, ConditionValue, OperatorRegistry};
/// use serde_json::json;
///
/// let registry = OperatorRegistry::with_builtins();
/// let field = json!(100);
///
/// let either = ConditionValue::from(json!([1000, 90]));
/// assert!(evaluate(&registry, Some(&field), &">".into(), &either).unwrap());
///
/// let spam = ConditionValue::from(json!(["newsletter", "spam"]));
/// let kind = json!("newsletter");
/// assert!(!evaluate(&registry, Some(&kind), &"not equal".into(), &spam).unwrap());
/// ```
pub fn evaluate(
    registry: &OperatorRegistry,
    field: Option<&Value>,
    operator: &OperatorSpec,
    value: &ConditionValue,
) -> Result<bool> {
    let (predicate, negated) = match operator {
        OperatorSpec::Function(predicate) => (Some(predicate.clone()), false),
        OperatorSpec::Named(raw) => {
            let parsed = parse_operator(raw);
            let predicate = registry.lookup(parsed.name);
            if predicate.is_none() {
                trace!(operator = parsed.name, "unknown operator evaluates to false");
            }
            (predicate, parsed.negated)
        }
    };

    let matched = match predicate {
        Some(predicate) => any_candidate(&predicate, field, value)?,
        None => false,
    };
    Ok(matched != negated)
}

fn any_candidate(
    predicate: &Predicate,
    field: Option<&Value>,
    value: &ConditionValue,
) -> Result<bool> {
    for candidate in value.candidates() {
        if predicate.call(field, candidate)? {
            return Ok(true);
        }
    }
    Ok(false)
}
