//! Filter builder and executor.
//!
//! A [`Filter`] owns an ordered list of [`Condition`]s combined with AND and
//! runs them against records:
//!
//! ```text
//! test(record) = condition₁(record) ∧ condition₂(record) ∧ …
//! ```
//!
//! Conditions run in insertion order and evaluation stops at the first one
//! that fails. An empty filter accepts every record.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::condition::{Condition, ConditionValue};
use crate::error::Result;
use crate::eval::evaluate;
use crate::op::OperatorSpec;
use crate::path::resolve;
use crate::registry::OperatorRegistry;
use crate::value::FieldValue;

/// Polarity value keeping records that pass the filter.
pub const WHITELIST: bool = true;
/// Polarity value keeping records that fail the filter.
pub const BLACKLIST: bool = false;

/// Which records a collection operation keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Polarity {
    /// Keep records that pass.
    #[default]
    Whitelist,
    /// Keep records that fail.
    Blacklist,
}

impl Polarity {
    /// Returns the boolean form ([`WHITELIST`] or [`BLACKLIST`]).
    pub fn as_bool(self) -> bool {
        matches!(self, Polarity::Whitelist)
    }

    /// Returns `true` if a record with this test result is kept.
    pub fn keeps(self, passed: bool) -> bool {
        passed == self.as_bool()
    }
}

impl From<bool> for Polarity {
    fn from(whitelist: bool) -> Self {
        if whitelist {
            Polarity::Whitelist
        } else {
            Polarity::Blacklist
        }
    }
}

/// An ordered set of conditions combined by logical AND.
///
/// # Example
///
/// ```
/// use datafilter::{Filter, Polarity};
/// use serde_json::json;
///
/// let records = vec![
///     json!({ "id": 1, "tags": ["a", "b"] }),
///     json!({ "id": 2, "tags": ["b"] }),
/// ];
///
/// let mut filter = Filter::new();
/// filter.add("tags", "has", "a");
///
/// let kept = filter.matching(&records, Polarity::Whitelist).unwrap();
/// assert_eq!(kept, vec![&records[0]]);
///
/// let dropped = filter.matching(&records, Polarity::Blacklist).unwrap();
/// assert_eq!(dropped, vec![&records[1]]);
/// ```
#[derive(Debug, Clone)]
pub struct Filter {
    conditions: Vec<Condition>,
    registry: Arc<OperatorRegistry>,
}

impl Default for Filter {
    fn default() -> Self {
        Filter::new()
    }
}

impl Filter {
    /// Creates an empty filter using the global operator registry.
    ///
    /// An empty filter matches all records.
    pub fn new() -> Self {
        Filter::with_registry(OperatorRegistry::global())
    }

    /// Creates an empty filter resolving named operators in `registry`.
    pub fn with_registry(registry: Arc<OperatorRegistry>) -> Self {
        Filter {
            conditions: Vec::new(),
            registry,
        }
    }

    /// Creates a filter from `(field, operator, value)` triples, in order.
    ///
    /// ```
    /// use datafilter::Filter;
    ///
    /// let filter = Filter::from_conditions([
    ///     ("age", "less than", 30),
    ///     ("age", "greater than", 20),
    /// ]);
    /// assert_eq!(filter.len(), 2);
    /// ```
    pub fn from_conditions<I, C>(conditions: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Condition>,
    {
        let mut filter = Filter::new();
        filter.extend(conditions.into_iter().map(Into::into));
        filter
    }

    /// Returns the global operator registry.
    ///
    /// Operators registered here become visible to every filter built with
    /// [`Filter::new`].
    pub fn operators() -> Arc<OperatorRegistry> {
        OperatorRegistry::global()
    }

    // ========================================================================
    // Condition set mutation
    // ========================================================================

    /// Appends a condition.
    pub fn add(
        &mut self,
        field: impl Into<String>,
        operator: impl Into<OperatorSpec>,
        value: impl Into<ConditionValue>,
    ) -> &mut Self {
        self.conditions.push(Condition::new(field, operator, value));
        self
    }

    /// Appends a condition, builder style.
    pub fn and(
        mut self,
        field: impl Into<String>,
        operator: impl Into<OperatorSpec>,
        value: impl Into<ConditionValue>,
    ) -> Self {
        self.add(field, operator, value);
        self
    }

    /// Appends an already built condition.
    pub fn push(&mut self, condition: Condition) -> &mut Self {
        self.conditions.push(condition);
        self
    }

    /// Removes every condition matching all the given criteria.
    ///
    /// A `None` criterion matches any condition, so `remove(None, None, None)`
    /// clears the filter. Named operators compare by their exact text,
    /// function operators by identity, values structurally with numbers
    /// compared numerically ([`ConditionValue::same_candidates`]).
    ///
    /// ```
    /// use datafilter::Filter;
    ///
    /// let mut filter = Filter::new()
    ///     .and("age", ">", 20)
    ///     .and("age", "<", 30)
    ///     .and("name", "contains", "a");
    ///
    /// filter.remove(Some("age"), None, None);
    /// assert_eq!(filter.len(), 1);
    ///
    /// filter.remove(None, Some(&"contains".into()), Some(&"b".into()));
    /// assert_eq!(filter.len(), 1);
    /// ```
    pub fn remove(
        &mut self,
        field: Option<&str>,
        operator: Option<&OperatorSpec>,
        value: Option<&ConditionValue>,
    ) -> &mut Self {
        self.conditions.retain(|condition| {
            let selected = field.is_none_or(|field| condition.field() == field)
                && operator.is_none_or(|operator| condition.operator() == operator)
                && value.is_none_or(|value| condition.value().same_candidates(value));
            !selected
        });
        self
    }

    /// Removes every condition for which `selector` returns `true`.
    pub fn remove_where<F>(&mut self, mut selector: F) -> &mut Self
    where
        F: FnMut(&Condition) -> bool,
    {
        self.conditions.retain(|condition| !selector(condition));
        self
    }

    /// Removes all conditions.
    pub fn clear(&mut self) -> &mut Self {
        self.conditions.clear();
        self
    }

    // ========================================================================
    // Introspection
    // ========================================================================

    /// Returns the conditions in evaluation order.
    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    /// Returns the number of conditions.
    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    /// Returns `true` if this filter has no conditions (matches everything).
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Returns the registry named operators are resolved in.
    pub fn registry(&self) -> &Arc<OperatorRegistry> {
        &self.registry
    }

    // ========================================================================
    // Evaluation
    // ========================================================================

    /// Resolves a field path against a record.
    pub fn evaluate_field_value<'a>(&self, record: &'a Value, path: Option<&str>) -> FieldValue<'a> {
        resolve(record, path)
    }

    /// Evaluates an operator against a field value with this filter's registry.
    pub fn evaluate_expression(
        &self,
        field: Option<&Value>,
        operator: impl Into<OperatorSpec>,
        value: impl Into<ConditionValue>,
    ) -> Result<bool> {
        evaluate(&self.registry, field, &operator.into(), &value.into())
    }

    /// Tests if a single record passes every condition.
    pub fn test(&self, record: &Value) -> Result<bool> {
        for condition in &self.conditions {
            if !condition.matches(record, &self.registry)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Returns references to the records kept under `polarity`, in order.
    pub fn matching<'a>(
        &self,
        records: &'a [Value],
        polarity: impl Into<Polarity>,
    ) -> Result<Vec<&'a Value>> {
        let polarity = polarity.into();
        let mut kept = Vec::new();
        for record in records {
            if polarity.keeps(self.test(record)?) {
                kept.push(record);
            }
        }
        debug!(
            records = records.len(),
            kept = kept.len(),
            ?polarity,
            conditions = self.conditions.len(),
            "filtered records"
        );
        Ok(kept)
    }

    /// Returns the first record kept under `polarity`.
    pub fn first<'a>(
        &self,
        records: &'a [Value],
        polarity: impl Into<Polarity>,
    ) -> Result<Option<&'a Value>> {
        let polarity = polarity.into();
        for record in records {
            if polarity.keeps(self.test(record)?) {
                return Ok(Some(record));
            }
        }
        Ok(None)
    }

    /// Like [`matching`](Self::matching), for a collection held in a JSON value.
    ///
    /// Anything but a JSON array yields an empty result.
    pub fn matching_json<'a>(
        &self,
        records: &'a Value,
        polarity: impl Into<Polarity>,
    ) -> Result<Vec<&'a Value>> {
        match records {
            Value::Array(items) => self.matching(items, polarity),
            _ => Ok(Vec::new()),
        }
    }

    /// Like [`first`](Self::first), for a collection held in a JSON value.
    ///
    /// Anything but a JSON array yields `None`.
    pub fn first_json<'a>(
        &self,
        records: &'a Value,
        polarity: impl Into<Polarity>,
    ) -> Result<Option<&'a Value>> {
        match records {
            Value::Array(items) => self.first(items, polarity),
            _ => Ok(None),
        }
    }

    /// Builds a transient filter from triples and returns the kept records.
    ///
    /// ```
    /// use datafilter::{Filter, BLACKLIST};
    /// use serde_json::json;
    ///
    /// let records = vec![json!({ "age": 25 }), json!({ "age": 40 })];
    /// let young = Filter::filter(&records, [("age", "<", 30)], BLACKLIST).unwrap();
    /// assert_eq!(young, vec![&records[1]]);
    /// ```
    pub fn filter<'a, I, C>(
        records: &'a [Value],
        conditions: I,
        polarity: impl Into<Polarity>,
    ) -> Result<Vec<&'a Value>>
    where
        I: IntoIterator<Item = C>,
        C: Into<Condition>,
    {
        Filter::from_conditions(conditions).matching(records, polarity)
    }
}

impl Extend<Condition> for Filter {
    fn extend<T: IntoIterator<Item = Condition>>(&mut self, iter: T) {
        self.conditions.extend(iter);
    }
}

impl FromIterator<Condition> for Filter {
    fn from_iter<T: IntoIterator<Item = Condition>>(iter: T) -> Self {
        let mut filter = Filter::new();
        filter.extend(iter);
        filter
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FilterError;
    use crate::op::Predicate;
    use serde_json::json;

    fn sample_records() -> Vec<Value> {
        vec![
            json!({ "name": "Task A", "priority": 1, "archived": false }),
            json!({ "name": "Task B", "priority": 2, "archived": false }),
            json!({ "name": "Urgent Task", "priority": 5, "archived": false }),
            json!({ "name": "Critical Task", "priority": 5, "archived": true }),
            json!({ "name": "Done Task", "priority": 3, "archived": true }),
        ]
    }

    fn isolated() -> Filter {
        Filter::with_registry(Arc::new(OperatorRegistry::with_builtins()))
    }

    #[test]
    fn empty_filter_matches_all() {
        let records = sample_records();
        let filter = Filter::new();

        let results = filter.matching(&records, Polarity::Whitelist).unwrap();
        assert_eq!(results.len(), 5);
        assert!(results.iter().zip(&records).all(|(a, b)| std::ptr::eq(*a, b)));
        assert!(filter.test(&json!(null)).unwrap());
    }

    #[test]
    fn single_condition() {
        let records = sample_records();
        let filter = Filter::new().and("priority", "==", 5);

        let results = filter.matching(&records, WHITELIST).unwrap();
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r["priority"] == 5));
    }

    #[test]
    fn conditions_are_anded() {
        let records = sample_records();
        let filter = Filter::new()
            .and("priority", "==", 5)
            .and("archived", "===", false);

        let results = filter.matching(&records, WHITELIST).unwrap();
        assert_eq!(results, vec![&records[2]]);
    }

    #[test]
    fn add_chains() {
        let mut filter = Filter::new();
        filter.add("a", "==", 1).add("b", "==", 2).add("c", "==", 3);
        assert_eq!(filter.len(), 3);
        assert_eq!(filter.conditions()[1].field(), "b");
    }

    #[test]
    fn blacklist_keeps_failures() {
        let records = sample_records();
        let filter = Filter::new().and("archived", "==", true);

        let results = filter.matching(&records, BLACKLIST).unwrap();
        assert_eq!(results.len(), 3);
        assert!(results.iter().all(|r| r["archived"] == false));
    }

    #[test]
    fn first_match() {
        let records = sample_records();
        let filter = Filter::new().and("name", "contains", "Task");

        let found = filter.first(&records, WHITELIST).unwrap();
        assert!(std::ptr::eq(found.unwrap(), &records[0]));

        let found = filter.first(&records, BLACKLIST).unwrap();
        assert!(found.is_none());
    }

    #[test]
    fn first_blacklisted() {
        let records = sample_records();
        let filter = Filter::new().and("priority", "<", 3);
        let found = filter.first(&records, Polarity::Blacklist).unwrap();
        assert_eq!(found, Some(&records[2]));
    }

    #[test]
    fn non_array_collections_yield_nothing() {
        let filter = Filter::new();
        for input in [json!(null), json!({"a": 1}), json!("abc"), json!(3)] {
            assert!(filter.matching_json(&input, WHITELIST).unwrap().is_empty());
            assert!(filter.first_json(&input, WHITELIST).unwrap().is_none());
        }
        let records = json!([1, 2]);
        assert_eq!(filter.matching_json(&records, WHITELIST).unwrap().len(), 2);
        assert_eq!(
            filter.first_json(&records, WHITELIST).unwrap(),
            Some(&json!(1))
        );
    }

    #[test]
    fn remove_by_field() {
        let mut filter = Filter::new()
            .and("age", ">", 20)
            .and("age", "<", 30)
            .and("name", "contains", "a");

        filter.remove(Some("age"), None, None);
        assert_eq!(filter.len(), 1);
        assert_eq!(filter.conditions()[0].field(), "name");
    }

    #[test]
    fn remove_requires_every_given_criterion() {
        let mut filter = Filter::new()
            .and("age", ">", 20)
            .and("age", "<", 30)
            .and("size", "<", 30);

        filter.remove(Some("age"), Some(&"<".into()), None);
        assert_eq!(filter.len(), 2);
        assert_eq!(filter.conditions()[0].operator(), &OperatorSpec::from(">"));
        assert_eq!(filter.conditions()[1].field(), "size");

        filter.remove(None, None, Some(&30.into()));
        assert_eq!(filter.len(), 1);

        filter.remove(Some("age"), Some(&">".into()), Some(&21.into()));
        assert_eq!(filter.len(), 1);
    }

    #[test]
    fn remove_matches_numbers_numerically() {
        let mut filter = Filter::new().and("age", ">", 30).and("age", "<", json!([40, 50]));

        filter.remove(None, None, Some(&30.0.into()));
        assert_eq!(filter.len(), 1);

        filter.remove(None, None, Some(&json!([40.0, 50]).into()));
        assert!(filter.is_empty());
    }

    #[test]
    fn remove_with_no_criteria_clears() {
        let mut filter = Filter::new().and("a", "==", 1).and("b", "==", 2);
        filter.remove(None, None, None);
        assert!(filter.is_empty());
    }

    #[test]
    fn remove_function_operator_by_identity() {
        let predicate = Predicate::new(|_, _| true);
        let other = Predicate::new(|_, _| true);
        let mut filter = Filter::new()
            .and("a", predicate.clone(), 1)
            .and("a", other, 1);

        filter.remove(None, Some(&predicate.into()), None);
        assert_eq!(filter.len(), 1);
    }

    #[test]
    fn remove_where_and_clear() {
        let mut filter = Filter::new().and("a", "==", 1).and("b", "==", 2);
        filter.remove_where(|c| c.field() == "b");
        assert_eq!(filter.len(), 1);
        filter.clear();
        assert!(filter.is_empty());
    }

    #[test]
    fn test_short_circuits_in_order() {
        let mut filter = Filter::new();
        filter
            .add("kind", "==", "article")
            .add("title", "matches", "(");

        // The first condition fails, so the invalid pattern never compiles.
        assert!(!filter.test(&json!({ "kind": "newsletter" })).unwrap());

        let err = filter.test(&json!({ "kind": "article", "title": "x" }));
        assert!(matches!(err, Err(FilterError::InvalidRegex(_))));
    }

    #[test]
    fn predicate_errors_abort_matching() {
        let records = vec![json!({ "title": "x" })];
        let filter = Filter::new().and("title", "regexp", "[");
        assert!(filter.matching(&records, WHITELIST).is_err());
        assert!(filter.first(&records, WHITELIST).is_err());
    }

    #[test]
    fn unknown_operator_rejects_records() {
        let records = sample_records();
        let filter = Filter::new().and("priority", "approximately", 5);
        assert!(filter.matching(&records, WHITELIST).unwrap().is_empty());
    }

    #[test]
    fn isolated_registries() {
        let mut filter = isolated();
        assert!(filter
            .registry()
            .register("is task", Predicate::new(|field, _| {
                field
                    .and_then(Value::as_str)
                    .is_some_and(|s| s.ends_with("Task"))
            })));
        filter.add("name", "is task", json!(null));

        let records = sample_records();
        assert_eq!(filter.matching(&records, WHITELIST).unwrap().len(), 3);

        // Not visible through the global registry.
        let global = Filter::new().and("name", "is task", json!(null));
        assert!(global.matching(&records, WHITELIST).unwrap().is_empty());
    }

    #[test]
    fn static_filter() {
        let records = sample_records();
        let results = Filter::filter(
            &records,
            [("priority", ">=", 3), ("archived", "==", 0)],
            WHITELIST,
        )
        .unwrap();
        assert_eq!(results, vec![&records[2]]);
    }

    #[test]
    fn collect_conditions() {
        let filter: Filter = vec![
            Condition::new("a", "==", 1),
            Condition::new("b", "==", 2),
        ]
        .into_iter()
        .collect();
        assert_eq!(filter.len(), 2);
    }

    #[test]
    fn evaluate_helpers() {
        let filter = Filter::new();
        let record = json!({ "user": { "age": 20 } });

        let age = filter.evaluate_field_value(&record, Some("user.age"));
        assert_eq!(age.as_json(), Some(&json!(20)));
        assert!(filter
            .evaluate_expression(age.as_json(), "equal", 20)
            .unwrap());
        assert!(!filter
            .evaluate_expression(Some(&json!("test")), "equal", vec!["testyou", "testme"])
            .unwrap());
    }

    #[test]
    fn polarity_conversions() {
        assert_eq!(Polarity::from(WHITELIST), Polarity::Whitelist);
        assert_eq!(Polarity::from(BLACKLIST), Polarity::Blacklist);
        assert!(Polarity::Whitelist.keeps(true));
        assert!(Polarity::Blacklist.keeps(false));
        assert_eq!(Polarity::default(), Polarity::Whitelist);
    }

    #[test]
    fn polarity_serde_names() {
        assert_eq!(serde_json::to_value(Polarity::Blacklist).unwrap(), json!("blacklist"));
        let parsed: Polarity = serde_json::from_value(json!("whitelist")).unwrap();
        assert_eq!(parsed, Polarity::Whitelist);
    }
}
