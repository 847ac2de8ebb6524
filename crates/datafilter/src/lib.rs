//! Datafilter - declarative condition engine for in-memory JSON records.
//!
//! Datafilter evaluates a list of `(field, operator, value)` conditions
//! against [`serde_json::Value`] records and returns the records that match.
//! It supports:
//!
//! - Dotted field paths into nested objects, arrays and strings
//! - Built-in comparison, string, collection and regex operators
//! - Negation (`"not equal"`, `"!contains"`) and OR over candidate values
//! - User-registered operators and ad-hoc function operators
//! - Whitelist and blacklist selection
//!
//! # Quick Start
//!
//! ```rust
//! use datafilter::{Filter, Polarity};
//! use serde_json::json;
//!
//! let articles = vec![
//!     json!({ "id": 1, "type": "article", "data": { "author": { "age": 30 } } }),
//!     json!({ "id": 2, "type": "article", "data": { "author": { "age": 40 } } }),
//!     json!({ "id": 3, "type": "newsletter", "data": { "author": { "age": 50 } } }),
//! ];
//!
//! let mut filter = Filter::new();
//! filter
//!     .add("type", "not equal", json!(["newsletter", "spam"]))
//!     .add("data.author.age", ">", 35);
//!
//! let results = filter.matching(&articles, Polarity::Whitelist).unwrap();
//! assert_eq!(results.len(), 1);
//! assert_eq!(results[0]["id"], 2);
//! ```
//!
//! # Filter Semantics
//!
//! ```text
//! test(record)  = every condition holds, checked in insertion order
//! condition     = polarity XOR (any candidate value satisfies the operator)
//! ```
//!
//! - An empty filter accepts every record.
//! - An unknown operator name never holds (so its negation always does).
//! - Type mismatches evaluate to `false` rather than failing.
//! - Only a predicate that cannot run, such as a `matches` condition with an
//!   invalid regex, returns an error.
//!
//! # Operators
//!
//! | Name | Alias | Field type |
//! |------|-------|------------|
//! | `greater than`, `greater than or equal` | `>`, `>=` | any ordered |
//! | `less than`, `less than or equal` | `<`, `<=` | any ordered |
//! | `equal` | `==` | any, coercing |
//! | `strict equal` | `===` | any, same type |
//! | `contains` | | string |
//! | `has` | `array contains` | array |
//! | `matches` | `regexp` | text |
//! | `starts with`, `ends with` | | text |
//!
//! New operators are added with [`OperatorRegistry::register`] and
//! [`OperatorRegistry::alias`], on the global registry
//! ([`Filter::operators`]) or on an isolated one passed to
//! [`Filter::with_registry`].

mod builtins;
mod condition;
mod error;
mod eval;
mod filter;
mod op;
mod path;
mod registry;
mod value;

// Re-export public API
pub use condition::{Condition, ConditionValue};
pub use error::{FilterError, Result};
pub use eval::evaluate;
pub use filter::{Filter, Polarity, BLACKLIST, WHITELIST};
pub use op::{is_negated, parse_operator, OperatorSpec, ParsedOperator, Predicate, PredicateFn};
pub use path::{resolve, LENGTH_SEGMENT};
pub use registry::OperatorRegistry;
pub use value::{compare, loose_eq, strict_eq, to_number, to_text, FieldValue, Number};
