//! Operator registry.
//!
//! [`OperatorRegistry`] maps operator names to [`Predicate`]s. Every
//! [`Filter`](crate::Filter) evaluates named operators against a registry;
//! unless given one explicitly it uses the process-wide instance returned by
//! [`OperatorRegistry::global`], seeded once with the built-in operators.
//!
//! # Naming Rules
//!
//! - Names are case-sensitive and trimmed of surrounding whitespace.
//! - A name starting with a negation marker (`!`, `not `) is never
//!   registered: negation is applied at evaluation time.
//! - Existing names are never overwritten, by registration or aliasing.
//!
//! Conflicts are reported through the `bool` return value rather than an
//! error.
//!
//! # Example
//!
//! ```
//! use datafilter::{OperatorRegistry, Predicate};
//! use serde_json::json;
//!
//! let registry = OperatorRegistry::with_builtins();
//!
//! assert!(registry.register("divisible by", Predicate::new(|field, divisor| {
//!     match (field.and_then(|v| v.as_i64()), divisor.as_i64()) {
//!         (Some(n), Some(d)) if d != 0 => n % d == 0,
//!         _ => false,
//!     }
//! })));
//! assert!(registry.alias("divisible by", "%"));
//!
//! assert!(!registry.register("equal", Predicate::new(|_, _| true)));
//! assert!(!registry.register("not foo", Predicate::new(|_, _| true)));
//!
//! let modulo = registry.lookup("%").unwrap();
//! assert!(modulo.call(Some(&json!(9)), &json!(3)).unwrap());
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use once_cell::sync::Lazy;
use tracing::debug;

use crate::builtins;
use crate::op::{is_negated, Predicate};

static GLOBAL: Lazy<Arc<OperatorRegistry>> =
    Lazy::new(|| Arc::new(OperatorRegistry::with_builtins()));

/// Why a registration or alias was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rejection {
    EmptyName,
    NegatedName,
    AlreadyRegistered,
    UnknownSource,
}

/// Table of named operators.
///
/// The table is internally synchronized, so a registry can be shared behind
/// an [`Arc`] and extended while filters hold it.
#[derive(Default)]
pub struct OperatorRegistry {
    operators: RwLock<HashMap<String, Predicate>>,
}

impl OperatorRegistry {
    /// Creates an empty registry with no operators at all.
    pub fn new() -> Self {
        OperatorRegistry::default()
    }

    /// Creates an isolated registry seeded with the built-in operators.
    pub fn with_builtins() -> Self {
        let registry = OperatorRegistry::new();
        builtins::install(&registry);
        registry
    }

    /// Returns the process-wide registry.
    ///
    /// It is seeded with the built-ins on first use and never reset;
    /// operators registered on it are visible to every filter using it.
    pub fn global() -> Arc<OperatorRegistry> {
        Arc::clone(&GLOBAL)
    }

    /// Registers `predicate` under `name`.
    ///
    /// Returns `false`, leaving the registry unchanged, if the name is empty,
    /// carries a negation marker, or is already registered.
    pub fn register(&self, name: &str, predicate: Predicate) -> bool {
        let name = name.trim();
        let mut operators = self.write();
        match check_new_name(&operators, name) {
            Ok(()) => {
                operators.insert(name.to_string(), predicate);
                true
            }
            Err(reason) => {
                debug!(operator = name, ?reason, "operator registration rejected");
                false
            }
        }
    }

    /// Registers the operator currently named `existing` under `alias` too.
    ///
    /// The alias captures the predicate at call time. Returns `false` if
    /// `existing` is unknown or `alias` is refused as in [`register`](Self::register).
    pub fn alias(&self, existing: &str, alias: &str) -> bool {
        let (existing, alias) = (existing.trim(), alias.trim());
        let mut operators = self.write();
        let result = match operators.get(existing) {
            None => Err(Rejection::UnknownSource),
            Some(predicate) => {
                let predicate = predicate.clone();
                check_new_name(&operators, alias).map(|()| predicate)
            }
        };
        match result {
            Ok(predicate) => {
                operators.insert(alias.to_string(), predicate);
                true
            }
            Err(reason) => {
                debug!(operator = existing, alias, ?reason, "operator alias rejected");
                false
            }
        }
    }

    /// Looks up an operator by (trimmed) name.
    pub fn lookup(&self, name: &str) -> Option<Predicate> {
        self.read().get(name.trim()).cloned()
    }

    /// Returns `true` if `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.read().contains_key(name.trim())
    }

    /// Returns all registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Returns the number of registered names, aliases included.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Returns `true` if no operator is registered.
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Predicate>> {
        self.operators.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Predicate>> {
        self.operators.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn check_new_name(operators: &HashMap<String, Predicate>, name: &str) -> Result<(), Rejection> {
    if name.is_empty() {
        Err(Rejection::EmptyName)
    } else if is_negated(name) {
        Err(Rejection::NegatedName)
    } else if operators.contains_key(name) {
        Err(Rejection::AlreadyRegistered)
    } else {
        Ok(())
    }
}

impl fmt::Debug for OperatorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperatorRegistry")
            .field("operators", &self.names())
            .finish()
    }
}
