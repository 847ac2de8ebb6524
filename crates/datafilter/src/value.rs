//! Runtime values and the coercion rules shared by the built-in operators.
//!
//! Records are plain [`serde_json::Value`]s. Resolving a field path yields a
//! [`FieldValue`], which either borrows the stored value, carries a value
//! computed while navigating (such as a `length`), or marks the path absent.
//!
//! The free functions in this module ([`loose_eq`], [`strict_eq`],
//! [`compare`], [`to_number`], [`to_text`]) define how values of different
//! JSON types are compared. They are public so that user-registered
//! predicates can follow the same rules as the built-ins.

use std::borrow::Cow;
use std::cmp::Ordering;

use serde_json::Value;

/// The value found at a field path.
///
/// # Example
///
/// ```
/// use datafilter::{resolve, FieldValue};
/// use serde_json::json;
///
/// let record = json!({ "tags": ["a", "b"] });
///
/// let tags = resolve(&record, Some("tags"));
/// assert!(std::ptr::eq(tags.stored().unwrap(), &record["tags"]));
///
/// assert_eq!(resolve(&record, Some("tags.length")), FieldValue::Derived(json!(2)));
/// assert!(resolve(&record, Some("missing.deeper")).is_absent());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue<'a> {
    /// A value stored in the record, borrowed as is.
    Ref(&'a Value),
    /// A value computed during resolution (`length`, a character of a string).
    Derived(Value),
    /// Nothing exists at the path.
    Absent,
}

impl<'a> FieldValue<'a> {
    /// Returns `true` if nothing exists at the path.
    pub fn is_absent(&self) -> bool {
        matches!(self, FieldValue::Absent)
    }

    /// Returns the value, stored or derived, if present.
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            FieldValue::Ref(value) => Some(value),
            FieldValue::Derived(value) => Some(value),
            FieldValue::Absent => None,
        }
    }

    /// Returns the stored value with the record's lifetime.
    ///
    /// Derived values are not part of the record and yield `None`.
    pub fn stored(&self) -> Option<&'a Value> {
        match self {
            FieldValue::Ref(value) => Some(value),
            _ => None,
        }
    }

    /// Converts into an owned value, cloning stored values.
    pub fn into_owned(self) -> Option<Value> {
        match self {
            FieldValue::Ref(value) => Some(value.clone()),
            FieldValue::Derived(value) => Some(value),
            FieldValue::Absent => None,
        }
    }

    /// Detaches the value from the record it was borrowed from.
    pub(crate) fn detach(self) -> FieldValue<'static> {
        match self.into_owned() {
            Some(value) => FieldValue::Derived(value),
            None => FieldValue::Absent,
        }
    }
}

/// Numeric value used for cross-type comparisons.
///
/// Numbers are stored in one of three variants to preserve precision:
/// - `I64` for signed integers
/// - `U64` for unsigned integers
/// - `F64` for floating point
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    /// Signed 64-bit integer.
    I64(i64),
    /// Unsigned 64-bit integer.
    U64(u64),
    /// 64-bit floating point.
    F64(f64),
}

impl Number {
    /// Converts the number to f64 for comparison.
    pub fn to_f64(self) -> f64 {
        match self {
            Number::I64(n) => n as f64,
            Number::U64(n) => n as f64,
            Number::F64(n) => n,
        }
    }

    /// Compares two numbers, handling mixed types.
    ///
    /// Returns `None` when either side is NaN.
    pub fn compare(self, other: Number) -> Option<Ordering> {
        match (self, other) {
            (Number::I64(a), Number::I64(b)) => Some(a.cmp(&b)),
            (Number::U64(a), Number::U64(b)) => Some(a.cmp(&b)),
            (Number::I64(a), Number::U64(b)) => Some(compare_signed_unsigned(a, b)),
            (Number::U64(a), Number::I64(b)) => Some(compare_signed_unsigned(b, a).reverse()),
            _ => self.to_f64().partial_cmp(&other.to_f64()),
        }
    }

    /// Formats the number the way it reads in text comparisons.
    ///
    /// Integral floats drop their fractional part (`2.0` reads as `"2"`).
    pub fn to_text(self) -> String {
        match self {
            Number::I64(n) => n.to_string(),
            Number::U64(n) => n.to_string(),
            Number::F64(n) if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 => {
                (n as i64).to_string()
            }
            Number::F64(n) => n.to_string(),
        }
    }
}

fn compare_signed_unsigned(a: i64, b: u64) -> Ordering {
    match u64::try_from(a) {
        Ok(a) => a.cmp(&b),
        Err(_) => Ordering::Less,
    }
}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.compare(*other)
    }
}

impl From<&serde_json::Number> for Number {
    fn from(n: &serde_json::Number) -> Self {
        if let Some(i) = n.as_i64() {
            Number::I64(i)
        } else if let Some(u) = n.as_u64() {
            Number::U64(u)
        } else {
            Number::F64(n.as_f64().unwrap_or(f64::NAN))
        }
    }
}

impl From<i64> for Number {
    fn from(n: i64) -> Self {
        Number::I64(n)
    }
}

impl From<u64> for Number {
    fn from(n: u64) -> Self {
        Number::U64(n)
    }
}

impl From<f64> for Number {
    fn from(n: f64) -> Self {
        Number::F64(n)
    }
}

impl From<bool> for Number {
    fn from(b: bool) -> Self {
        Number::I64(i64::from(b))
    }
}

/// Converts a value to a number for ordering and loose equality.
///
/// Numbers convert as is, booleans to 1/0, `null` to 0, and strings are
/// parsed after trimming (a blank string reads as 0). Unsigned `0x`, `0o`
/// and `0b` literals read in their radix. Arrays, objects, unparseable
/// strings and absent values have no numeric reading.
pub fn to_number(value: Option<&Value>) -> Option<Number> {
    match value? {
        Value::Number(n) => Some(Number::from(n)),
        Value::Bool(b) => Some(Number::from(*b)),
        Value::Null => Some(Number::I64(0)),
        Value::String(s) => parse_number(s),
        Value::Array(_) | Value::Object(_) => None,
    }
}

fn parse_number(s: &str) -> Option<Number> {
    let s = s.trim();
    if s.is_empty() {
        return Some(Number::I64(0));
    }
    if let Ok(i) = s.parse::<i64>() {
        return Some(Number::I64(i));
    }
    if let Ok(u) = s.parse::<u64>() {
        return Some(Number::U64(u));
    }
    if let Some(n) = parse_radix_literal(s) {
        return Some(n);
    }
    // Rust's float grammar also accepts "inf" and "nan"; those are not numbers here.
    if !s.bytes().any(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse::<f64>().ok().map(Number::F64)
}

/// Parses `0x1A`, `0o17` or `0b101` (prefix in either case, no sign).
fn parse_radix_literal(s: &str) -> Option<Number> {
    let prefix = s.get(..2)?;
    let radix = match prefix {
        "0x" | "0X" => 16,
        "0o" | "0O" => 8,
        "0b" | "0B" => 2,
        _ => return None,
    };
    let digits = &s[2..];
    // from_str_radix would accept a leading sign.
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return None;
    }
    let n = u64::from_str_radix(digits, radix).ok()?;
    Some(i64::try_from(n).map_or(Number::U64(n), Number::I64))
}

/// Converts a scalar value to text.
///
/// Strings are borrowed, numbers and booleans are formatted, `null` reads as
/// `"null"`. Arrays, objects and absent values do not convert.
pub fn to_text(value: Option<&Value>) -> Option<Cow<'_, str>> {
    match value? {
        Value::String(s) => Some(Cow::Borrowed(s.as_str())),
        Value::Number(n) => Some(Cow::Owned(Number::from(n).to_text())),
        Value::Bool(b) => Some(Cow::Borrowed(if *b { "true" } else { "false" })),
        Value::Null => Some(Cow::Borrowed("null")),
        Value::Array(_) | Value::Object(_) => None,
    }
}

/// Orders a field value against a condition value.
///
/// Two strings compare lexicographically; any other pair compares through
/// [`to_number`]. Returns `None` when the pair has no ordering.
pub fn compare(field: Option<&Value>, condition: &Value) -> Option<Ordering> {
    match (field, condition) {
        (Some(Value::String(a)), Value::String(b)) => Some(a.as_str().cmp(b.as_str())),
        _ => to_number(field)?.compare(to_number(Some(condition))?),
    }
}

/// Type-and-value equality.
///
/// Numbers compare numerically (`1` equals `1.0`); arrays and objects compare
/// structurally. An absent field equals nothing.
pub fn strict_eq(field: Option<&Value>, condition: &Value) -> bool {
    field.is_some_and(|field| json_eq(field, condition))
}

/// Coercing equality.
///
/// Values of the same type compare as in [`strict_eq`]. `null` equals `null`
/// and an absent field, and nothing else. Mixed scalar pairs (number, string,
/// boolean) compare through [`to_number`].
pub fn loose_eq(field: Option<&Value>, condition: &Value) -> bool {
    match (field, condition) {
        (None, Value::Null) | (Some(Value::Null), Value::Null) => true,
        (None, _) | (Some(Value::Null), _) | (_, Value::Null) => false,
        (Some(Value::String(a)), Value::String(b)) => a == b,
        (Some(Value::Bool(a)), Value::Bool(b)) => a == b,
        (Some(Value::Number(_)), Value::Number(_))
        | (Some(Value::Array(_)), Value::Array(_))
        | (Some(Value::Object(_)), Value::Object(_)) => strict_eq(field, condition),
        (Some(Value::Array(_) | Value::Object(_)), _) | (_, Value::Array(_) | Value::Object(_)) => {
            false
        }
        _ => compare(field, condition) == Some(Ordering::Equal),
    }
}

fn json_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            Number::from(x).compare(Number::from(y)) == Some(Ordering::Equal)
        }
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| json_eq(x, y))
        }
        (Value::Object(xs), Value::Object(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .all(|(key, x)| ys.get(key).is_some_and(|y| json_eq(x, y)))
        }
        _ => a == b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn field_value_accessors() {
        let stored = json!("hello");
        assert_eq!(FieldValue::Ref(&stored).as_json(), Some(&stored));
        assert_eq!(FieldValue::Ref(&stored).stored(), Some(&stored));
        assert_eq!(FieldValue::Derived(json!(3)).as_json(), Some(&json!(3)));
        assert_eq!(FieldValue::Derived(json!(3)).stored(), None);
        assert_eq!(FieldValue::Absent.as_json(), None);
        assert!(FieldValue::Absent.is_absent());
        assert!(!FieldValue::Ref(&stored).is_absent());
    }

    #[test]
    fn number_comparisons_mixed_types() {
        assert_eq!(
            Number::I64(5).compare(Number::U64(10)),
            Some(Ordering::Less)
        );
        assert_eq!(
            Number::I64(-1).compare(Number::U64(u64::MAX)),
            Some(Ordering::Less)
        );
        assert_eq!(
            Number::U64(u64::MAX).compare(Number::I64(-1)),
            Some(Ordering::Greater)
        );
        assert_eq!(
            Number::I64(5).compare(Number::F64(5.0)),
            Some(Ordering::Equal)
        );
    }

    #[test]
    fn number_nan_comparison() {
        assert_eq!(Number::F64(f64::NAN).compare(Number::F64(1.0)), None);
        assert_eq!(Number::F64(1.0).compare(Number::F64(f64::NAN)), None);
    }

    #[test]
    fn number_text() {
        assert_eq!(Number::I64(-4).to_text(), "-4");
        assert_eq!(Number::F64(2.0).to_text(), "2");
        assert_eq!(Number::F64(2.5).to_text(), "2.5");
    }

    #[test]
    fn numeric_readings() {
        assert_eq!(to_number(Some(&json!(7))), Some(Number::I64(7)));
        assert_eq!(to_number(Some(&json!(true))), Some(Number::I64(1)));
        assert_eq!(to_number(Some(&json!(null))), Some(Number::I64(0)));
        assert_eq!(to_number(Some(&json!(" 12 "))), Some(Number::I64(12)));
        assert_eq!(to_number(Some(&json!("1.5"))), Some(Number::F64(1.5)));
        assert_eq!(to_number(Some(&json!(""))), Some(Number::I64(0)));
        assert_eq!(to_number(Some(&json!("abc"))), None);
        assert_eq!(to_number(Some(&json!("inf"))), None);
        assert_eq!(to_number(Some(&json!([1]))), None);
    }

    #[test]
    fn radix_literals() {
        assert_eq!(to_number(Some(&json!("0x1A"))), Some(Number::I64(26)));
        assert_eq!(to_number(Some(&json!(" 0XfF "))), Some(Number::I64(255)));
        assert_eq!(to_number(Some(&json!("0o17"))), Some(Number::I64(15)));
        assert_eq!(to_number(Some(&json!("0b101"))), Some(Number::I64(5)));
        assert_eq!(
            to_number(Some(&json!("0xFFFFFFFFFFFFFFFF"))),
            Some(Number::U64(u64::MAX))
        );
        assert_eq!(to_number(Some(&json!("0x"))), None);
        assert_eq!(to_number(Some(&json!("0x+1"))), None);
        assert_eq!(to_number(Some(&json!("-0x1A"))), None);
        assert_eq!(to_number(Some(&json!("0b102"))), None);
        assert_eq!(to_number(Some(&json!("0x1é"))), None);

        assert!(loose_eq(Some(&json!("0x1A")), &json!(26)));
        assert_eq!(compare(Some(&json!("0x10")), &json!(15)), Some(Ordering::Greater));
        assert_eq!(to_number(None), None);
    }

    #[test]
    fn text_readings() {
        assert_eq!(to_text(Some(&json!("x"))).as_deref(), Some("x"));
        assert_eq!(to_text(Some(&json!(10))).as_deref(), Some("10"));
        assert_eq!(to_text(Some(&json!(false))).as_deref(), Some("false"));
        assert_eq!(to_text(Some(&json!(null))).as_deref(), Some("null"));
        assert_eq!(to_text(Some(&json!({}))), None);
        assert_eq!(to_text(None), None);
    }

    #[test]
    fn ordering_strings_and_numbers() {
        assert_eq!(
            compare(Some(&json!("apple")), &json!("banana")),
            Some(Ordering::Less)
        );
        assert_eq!(
            compare(Some(&json!("10")), &json!(9)),
            Some(Ordering::Greater)
        );
        // Two strings never go through numbers.
        assert_eq!(
            compare(Some(&json!("10")), &json!("9")),
            Some(Ordering::Less)
        );
        assert_eq!(compare(None, &json!(1)), None);
        assert_eq!(compare(Some(&json!({"a": 1})), &json!(1)), None);
    }

    #[test]
    fn strict_equality() {
        assert!(strict_eq(Some(&json!("1")), &json!("1")));
        assert!(!strict_eq(Some(&json!("1")), &json!(1)));
        assert!(strict_eq(Some(&json!(1)), &json!(1.0)));
        assert!(strict_eq(Some(&json!([1, {"a": 2}])), &json!([1.0, {"a": 2}])));
        assert!(!strict_eq(None, &json!(null)));
    }

    #[test]
    fn loose_equality() {
        assert!(loose_eq(Some(&json!("1")), &json!(1)));
        assert!(!loose_eq(Some(&json!("1")), &json!(0)));
        assert!(loose_eq(Some(&json!(true)), &json!(1)));
        assert!(loose_eq(Some(&json!(false)), &json!("0")));
        assert!(loose_eq(None, &json!(null)));
        assert!(loose_eq(Some(&json!(null)), &json!(null)));
        assert!(!loose_eq(Some(&json!(0)), &json!(null)));
        assert!(!loose_eq(Some(&json!("newsletter")), &json!("Newsletter")));
        assert!(!loose_eq(Some(&json!([1])), &json!(1)));
    }
}
